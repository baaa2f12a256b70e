//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::domain::{
    Author, Book, BookPatch, BookRepository, DomainError, NewBook, Page, DUPLICATE_ISBN,
    NO_MATCHING_AUTHORS,
};
use crate::models::author::{self, Entity as AuthorEntity};
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};
use crate::models::book_authors::{self, Entity as BookAuthorEntity};

use super::projection::book_projection;
use super::relations::{
    author_names_by_book, hydrate_authors, hydrate_book, hydrate_books, unlink_book,
};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map a failed book write, turning an ISBN uniqueness violation into a conflict
fn isbn_conflict(err: DbErr) -> DomainError {
    let unique_violation = matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("UNIQUE constraint failed");

    if unique_violation {
        tracing::warn!("Rejected book write with duplicate ISBN: {}", err);
        DomainError::Conflict(DUPLICATE_ISBN.to_string())
    } else {
        DomainError::from(err)
    }
}

/// Fetch the authors among `ids` that exist. Unknown ids are skipped.
async fn resolve_authors<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
) -> Result<Vec<author::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    AuthorEntity::find()
        .filter(author::Column::Id.is_in(ids.iter().copied()))
        .order_by_asc(author::Column::Id)
        .all(conn)
        .await
}

async fn link_authors<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    authors: &[author::Model],
) -> Result<(), DbErr> {
    if authors.is_empty() {
        return Ok(());
    }

    let links = authors.iter().map(|a| book_authors::ActiveModel {
        book_id: Set(book_id),
        author_id: Set(a.id),
    });

    BookAuthorEntity::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn create(&self, input: NewBook, author_ids: Vec<i32>) -> Result<Book, DomainError> {
        let txn = self.db.begin().await?;

        // Partial resolution is accepted: only an all-unknown id list is rejected.
        let authors = resolve_authors(&txn, &author_ids).await?;
        if !author_ids.is_empty() && authors.is_empty() {
            return Err(DomainError::Validation(NO_MATCHING_AUTHORS.to_string()));
        }

        let new_book = ActiveModel {
            title: Set(input.title),
            isbn: Set(input.isbn),
            publication_year: Set(input.publication_year),
            copies_available: Set(input.copies_available),
            ..Default::default()
        };

        let result = new_book.insert(&txn).await.map_err(isbn_conflict)?;
        link_authors(&txn, result.id, &authors).await?;
        txn.commit().await?;

        tracing::info!(
            book_id = result.id,
            authors = authors.len(),
            requested = author_ids.len(),
            "Book created"
        );

        let names = authors.into_iter().map(|a| a.name).collect();
        Ok(book_projection(result, names))
    }

    async fn find_all(&self, page: Page) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .order_by_asc(Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(hydrate_books(&self.db, books).await?)
    }

    async fn find_by_year(&self, year: i32, page: Page) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .filter(Column::PublicationYear.eq(year))
            .order_by_asc(Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        tracing::debug!(count = books.len(), year, "Listed books by year");

        Ok(hydrate_books(&self.db, books).await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        match BookEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(hydrate_book(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: i32, patch: BookPatch) -> Result<Option<Book>, DomainError> {
        let txn = self.db.begin().await?;

        let Some(existing) = BookEntity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        // An explicit empty list clears the association.
        let replacement = match &patch.author_ids {
            Some(ids) => {
                let authors = resolve_authors(&txn, ids).await?;
                if !ids.is_empty() && authors.is_empty() {
                    return Err(DomainError::Validation(NO_MATCHING_AUTHORS.to_string()));
                }
                Some(authors)
            }
            None => None,
        };

        let mut active: ActiveModel = existing.clone().into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(isbn) = patch.isbn {
            active.isbn = Set(isbn);
        }
        if let Some(year) = patch.publication_year {
            active.publication_year = Set(year);
        }
        if let Some(copies) = patch.copies_available {
            active.copies_available = Set(copies);
        }

        let result = if active.is_changed() {
            active.update(&txn).await.map_err(isbn_conflict)?
        } else {
            existing
        };

        let authors = match replacement {
            Some(authors) => {
                unlink_book(&txn, id).await?;
                link_authors(&txn, id, &authors).await?;
                authors.into_iter().map(|a| a.name).collect()
            }
            None => author_names_by_book(&txn, &[id])
                .await?
                .remove(&id)
                .unwrap_or_default(),
        };

        txn.commit().await?;
        tracing::info!(book_id = id, "Book updated");

        Ok(Some(book_projection(result, authors)))
    }

    async fn delete(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let txn = self.db.begin().await?;

        let Some(existing) = BookEntity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let projection = hydrate_book(&txn, existing.clone()).await?;
        let unlinked = unlink_book(&txn, id).await?;
        existing.delete(&txn).await?;
        txn.commit().await?;

        tracing::info!(book_id = id, unlinked, "Book deleted");

        Ok(Some(projection))
    }

    async fn find_authors(&self, id: i32) -> Result<Vec<Author>, DomainError> {
        BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let authors = AuthorEntity::find()
            .inner_join(BookAuthorEntity)
            .filter(book_authors::Column::BookId.eq(id))
            .order_by_asc(author::Column::Id)
            .all(&self.db)
            .await?;

        Ok(hydrate_authors(&self.db, authors).await?)
    }
}
