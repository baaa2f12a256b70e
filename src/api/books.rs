//! Book API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};

use super::default_limit;
use super::error::{ApiError, or_not_found};
use crate::domain::{Author, Book, BookPatch, NewBook, Page};
use crate::infrastructure::AppState;

pub const BOOK_NOT_FOUND: &str = "Book not found";

/// Distinguish an explicit `null` (`Some(None)`) from an absent field (`None`).
/// Pair with `#[serde(default)]`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for creating a book
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    #[serde(rename = "titulo", alias = "title")]
    pub title: String,
    #[serde(rename = "ISBN", alias = "isbn")]
    pub isbn: String,
    #[serde(rename = "anio_publicacion", alias = "publication_year", default)]
    pub publication_year: Option<i32>,
    #[serde(rename = "copias_disponibles", alias = "copies_available", default)]
    pub copies_available: Option<i32>,
    /// Ids of existing authors, e.g. `[1, 2, 3]`
    #[serde(rename = "autor_ids", alias = "author_ids", default)]
    pub author_ids: Option<Vec<i32>>,
}

/// Request body for a partial book update. Absent fields are left untouched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    #[serde(rename = "titulo", alias = "title", default)]
    pub title: Option<String>,
    #[serde(rename = "ISBN", alias = "isbn", default)]
    pub isbn: Option<String>,
    /// `null` clears the stored year
    #[serde(
        rename = "anio_publicacion",
        alias = "publication_year",
        default,
        deserialize_with = "present"
    )]
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<Option<i32>>,
    /// `null` clears the stored count
    #[serde(
        rename = "copias_disponibles",
        alias = "copies_available",
        default,
        deserialize_with = "present"
    )]
    #[schema(value_type = Option<i32>)]
    pub copies_available: Option<Option<i32>>,
    /// Replaces the whole author set when given; `[]` clears it
    #[serde(rename = "autor_ids", alias = "author_ids", default)]
    pub author_ids: Option<Vec<i32>>,
}

impl From<UpdateBookRequest> for BookPatch {
    fn from(req: UpdateBookRequest) -> Self {
        Self {
            title: req.title,
            isbn: req.isbn,
            publication_year: req.publication_year,
            copies_available: req.copies_available,
            author_ids: req.author_ids,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookListQuery {
    /// Exact publication year
    pub anio_publicacion: Option<i32>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[utoipa::path(
    post,
    path = "/libros",
    tag = "libros",
    request_body = CreateBookRequest,
    responses(
        (status = 200, description = "Book created", body = Book),
        (status = 400, description = "Duplicate ISBN or no matching authors")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    let input = NewBook {
        title: payload.title,
        isbn: payload.isbn,
        publication_year: payload.publication_year,
        copies_available: payload.copies_available,
    };
    let author_ids = payload.author_ids.unwrap_or_default();

    let book = state.book_repo.create(input, author_ids).await?;
    Ok(Json(book))
}

#[utoipa::path(
    get,
    path = "/libros",
    tag = "libros",
    params(BookListQuery),
    responses((status = 200, description = "Page of books", body = [Book]))
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<BookListQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let page = Page::new(params.skip, params.limit);
    // A year of 0 means no filter.
    let books = match params.anio_publicacion {
        Some(year) if year != 0 => state.book_repo.find_by_year(year, page).await?,
        _ => state.book_repo.find_all(page).await?,
    };
    Ok(Json(books))
}

#[utoipa::path(
    get,
    path = "/libros/{id}",
    tag = "libros",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Book>, ApiError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(BOOK_NOT_FOUND))
}

#[utoipa::path(
    put,
    path = "/libros/{id}",
    tag = "libros",
    params(("id" = i32, Path, description = "Book id")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Duplicate ISBN or no matching authors"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    state
        .book_repo
        .update(id, payload.into())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(BOOK_NOT_FOUND))
}

#[utoipa::path(
    delete,
    path = "/libros/{id}",
    tag = "libros",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Deleted book as it was", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Book>, ApiError> {
    state
        .book_repo
        .delete(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(BOOK_NOT_FOUND))
}

#[utoipa::path(
    get,
    path = "/libros/{id}/autores",
    tag = "libros",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Authors of the book", body = [Author]),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_book_authors(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Author>>, ApiError> {
    let authors = state
        .book_repo
        .find_authors(id)
        .await
        .map_err(or_not_found(BOOK_NOT_FOUND))?;
    Ok(Json(authors))
}
