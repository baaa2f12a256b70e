use crate::api;
use crate::domain::{Author, Book};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        description = "Library catalogue: authors, books and authorship"
    ),
    paths(
        api::health::root,
        api::health::health_check,
        api::author::create_author,
        api::author::list_authors,
        api::author::get_author,
        api::author::update_author,
        api::author::delete_author,
        api::author::list_author_books,
        api::books::create_book,
        api::books::list_books,
        api::books::get_book,
        api::books::update_book,
        api::books::delete_book,
        api::books::list_book_authors,
    ),
    components(schemas(
        Author,
        Book,
        api::author::AuthorRequest,
        api::books::CreateBookRequest,
        api::books::UpdateBookRequest,
    )),
    tags(
        (name = "autores", description = "Authors"),
        (name = "libros", description = "Books"),
        (name = "biblioteca", description = "Service endpoints")
    )
)]
pub struct ApiDoc;
