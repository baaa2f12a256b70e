//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{AuthorRepository, BookRepository};
use crate::infrastructure::{SeaOrmAuthorRepository, SeaOrmBookRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Author repository
    pub author_repo: Arc<dyn AuthorRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories sharing one connection pool
    pub fn new(db: DatabaseConnection) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let author_repo = Arc::new(SeaOrmAuthorRepository::new(db));

        Self {
            book_repo,
            author_repo,
        }
    }

    /// Assemble state from arbitrary repository implementations
    pub fn with_repositories(
        author_repo: Arc<dyn AuthorRepository>,
        book_repo: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            book_repo,
            author_repo,
        }
    }
}
