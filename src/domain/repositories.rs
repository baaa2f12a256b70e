//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DomainError;

/// Message returned when none of the supplied author ids exist.
pub const NO_MATCHING_AUTHORS: &str = "No authors found for the supplied ids";

/// Message returned when an ISBN is already taken.
pub const DUPLICATE_ISBN: &str = "ISBN is already registered to another book";

/// Offset/limit window over an insertion-ordered listing.
///
/// Both bounds are capped at `i64::MAX`, the largest value SQLite binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    skip: u64,
    limit: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_BOUND: u64 = i64::MAX as u64;

    pub fn new(skip: u64, limit: u64) -> Self {
        Self {
            skip: skip.min(Self::MAX_BOUND),
            limit: limit.min(Self::MAX_BOUND),
        }
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Author projection. Related books appear by title only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: i32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "pais_origen")]
    pub country_of_origin: Option<String>,
    #[serde(rename = "anio_nacimiento")]
    pub birth_year: Option<i32>,
    #[serde(rename = "libros")]
    pub books: Vec<String>,
}

/// Book projection. Related authors appear by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    #[serde(rename = "anio_publicacion")]
    pub publication_year: Option<i32>,
    #[serde(rename = "copias_disponibles")]
    pub copies_available: Option<i32>,
    #[serde(rename = "autores")]
    pub authors: Vec<String>,
}

/// Input for creating an author, or fully replacing one
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthor {
    pub name: String,
    pub country_of_origin: Option<String>,
    pub birth_year: Option<i32>,
}

/// Input for creating a book
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub publication_year: Option<i32>,
    pub copies_available: Option<i32>,
}

/// Partial book update.
///
/// `None` leaves a field untouched. For the nullable columns `Some(None)`
/// clears the stored value. `author_ids: Some(ids)` replaces the whole
/// author set, and `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub publication_year: Option<Option<i32>>,
    pub copies_available: Option<Option<i32>>,
    pub author_ids: Option<Vec<i32>>,
}

/// Repository trait for Author entity
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Insert a new author. The result has an empty book list.
    async fn create(&self, input: NewAuthor) -> Result<Author, DomainError>;

    /// Find an author by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError>;

    /// List authors in insertion order, optionally restricted to an exact country
    async fn find_all(&self, country: Option<String>, page: Page)
    -> Result<Vec<Author>, DomainError>;

    /// Replace name, country and birth year. Book links are left alone.
    async fn update(&self, id: i32, input: NewAuthor) -> Result<Option<Author>, DomainError>;

    /// Delete an author and its join rows, returning the pre-deletion projection
    async fn delete(&self, id: i32) -> Result<Option<Author>, DomainError>;

    /// Books linked to an author. `NotFound` only when the author is missing.
    async fn find_books(&self, id: i32) -> Result<Vec<Book>, DomainError>;
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book and link it to the resolvable subset of `author_ids`.
    ///
    /// Fails with `Validation` when ids are given but none resolve, and with
    /// `Conflict` when the ISBN is taken. Nothing is written on failure.
    async fn create(&self, input: NewBook, author_ids: Vec<i32>) -> Result<Book, DomainError>;

    /// List books in insertion order
    async fn find_all(&self, page: Page) -> Result<Vec<Book>, DomainError>;

    /// List books published in exactly `year`
    async fn find_by_year(&self, year: i32, page: Page) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Apply the fields present in `patch`
    async fn update(&self, id: i32, patch: BookPatch) -> Result<Option<Book>, DomainError>;

    /// Delete a book and its join rows, returning the pre-deletion projection
    async fn delete(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Authors linked to a book. `NotFound` only when the book is missing.
    async fn find_authors(&self, id: i32) -> Result<Vec<Author>, DomainError>;
}
