//! Author API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::default_limit;
use super::error::{ApiError, or_not_found};
use crate::domain::{Author, Book, NewAuthor, Page};
use crate::infrastructure::AppState;

pub const AUTHOR_NOT_FOUND: &str = "Author not found";

/// Request body for creating or replacing an author
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthorRequest {
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "pais_origen", alias = "country", default)]
    pub country_of_origin: Option<String>,
    #[serde(rename = "anio_nacimiento", alias = "birth_year", default)]
    pub birth_year: Option<i32>,
}

impl From<AuthorRequest> for NewAuthor {
    fn from(req: AuthorRequest) -> Self {
        Self {
            name: req.name,
            country_of_origin: req.country_of_origin,
            birth_year: req.birth_year,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorListQuery {
    /// Exact country of origin
    pub pais: Option<String>,
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

#[utoipa::path(
    post,
    path = "/autores",
    tag = "autores",
    request_body = AuthorRequest,
    responses((status = 200, description = "Author created", body = Author))
)]
pub async fn create_author(
    State(state): State<AppState>,
    Json(payload): Json<AuthorRequest>,
) -> Result<Json<Author>, ApiError> {
    let author = state.author_repo.create(payload.into()).await?;
    Ok(Json(author))
}

#[utoipa::path(
    get,
    path = "/autores",
    tag = "autores",
    params(AuthorListQuery),
    responses((status = 200, description = "Page of authors", body = [Author]))
)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(params): Query<AuthorListQuery>,
) -> Result<Json<Vec<Author>>, ApiError> {
    let page = Page::new(params.skip, params.limit);
    let authors = state.author_repo.find_all(params.pais, page).await?;
    Ok(Json(authors))
}

#[utoipa::path(
    get,
    path = "/autores/{id}",
    tag = "autores",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Author found", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Author>, ApiError> {
    state
        .author_repo
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(AUTHOR_NOT_FOUND))
}

#[utoipa::path(
    put,
    path = "/autores/{id}",
    tag = "autores",
    params(("id" = i32, Path, description = "Author id")),
    request_body = AuthorRequest,
    responses(
        (status = 200, description = "Author replaced", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<AuthorRequest>,
) -> Result<Json<Author>, ApiError> {
    state
        .author_repo
        .update(id, payload.into())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(AUTHOR_NOT_FOUND))
}

#[utoipa::path(
    delete,
    path = "/autores/{id}",
    tag = "autores",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Deleted author as it was", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Author>, ApiError> {
    state
        .author_repo
        .delete(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(AUTHOR_NOT_FOUND))
}

#[utoipa::path(
    get,
    path = "/autores/{id}/libros",
    tag = "autores",
    params(("id" = i32, Path, description = "Author id")),
    responses(
        (status = 200, description = "Books written by the author", body = [Book]),
        (status = 404, description = "Author not found")
    )
)]
pub async fn list_author_books(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = state
        .author_repo
        .find_books(id)
        .await
        .map_err(or_not_found(AUTHOR_NOT_FOUND))?;
    Ok(Json(books))
}
