pub mod author;
pub mod books;
pub mod error;
pub mod health;

use axum::{Router, routing::get};

use crate::domain::Page;
use crate::infrastructure::AppState;

pub use error::ApiError;

pub(crate) fn default_limit() -> u64 {
    Page::DEFAULT_LIMIT
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        // Health check
        .route("/health", get(health::health_check))
        // Authors
        .route(
            "/autores",
            get(author::list_authors).post(author::create_author),
        )
        .route(
            "/autores/:id",
            get(author::get_author)
                .put(author::update_author)
                .delete(author::delete_author),
        )
        .route("/autores/:id/libros", get(author::list_author_books))
        // Books
        .route("/libros", get(books::list_books).post(books::create_book))
        .route(
            "/libros/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/libros/:id/autores", get(books::list_book_authors))
        .with_state(state)
}
