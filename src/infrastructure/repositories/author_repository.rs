//! SeaORM implementation of AuthorRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::domain::{Author, AuthorRepository, Book, DomainError, NewAuthor, Page};
use crate::models::author::{ActiveModel, Column, Entity as AuthorEntity};
use crate::models::book::{self, Entity as BookEntity};
use crate::models::book_authors;

use super::projection::author_projection;
use super::relations::{hydrate_author, hydrate_authors, hydrate_books, unlink_author};

/// SeaORM-based implementation of AuthorRepository
pub struct SeaOrmAuthorRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuthorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthorRepository for SeaOrmAuthorRepository {
    async fn create(&self, input: NewAuthor) -> Result<Author, DomainError> {
        let author = ActiveModel {
            name: Set(input.name),
            country_of_origin: Set(input.country_of_origin),
            birth_year: Set(input.birth_year),
            ..Default::default()
        };

        let result = author.insert(&self.db).await?;
        tracing::info!(author_id = result.id, "Author created");

        Ok(author_projection(result, Vec::new()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, DomainError> {
        match AuthorEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(hydrate_author(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_all(
        &self,
        country: Option<String>,
        page: Page,
    ) -> Result<Vec<Author>, DomainError> {
        let mut query = AuthorEntity::find();

        if let Some(country) = &country
            && !country.is_empty()
        {
            query = query.filter(Column::CountryOfOrigin.eq(country.as_str()));
        }

        let authors = query
            .order_by_asc(Column::Id)
            .offset(page.skip())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        tracing::debug!(count = authors.len(), ?country, "Listed authors");

        Ok(hydrate_authors(&self.db, authors).await?)
    }

    async fn update(&self, id: i32, input: NewAuthor) -> Result<Option<Author>, DomainError> {
        let Some(existing) = AuthorEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: ActiveModel = existing.into();
        active.name = Set(input.name);
        active.country_of_origin = Set(input.country_of_origin);
        active.birth_year = Set(input.birth_year);

        let result = active.update(&self.db).await?;
        tracing::info!(author_id = id, "Author updated");

        Ok(Some(hydrate_author(&self.db, result).await?))
    }

    async fn delete(&self, id: i32) -> Result<Option<Author>, DomainError> {
        let txn = self.db.begin().await?;

        let Some(existing) = AuthorEntity::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };

        let projection = hydrate_author(&txn, existing.clone()).await?;
        let unlinked = unlink_author(&txn, id).await?;
        existing.delete(&txn).await?;
        txn.commit().await?;

        tracing::info!(author_id = id, unlinked, "Author deleted");

        Ok(Some(projection))
    }

    async fn find_books(&self, id: i32) -> Result<Vec<Book>, DomainError> {
        AuthorEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let books = BookEntity::find()
            .inner_join(book_authors::Entity)
            .filter(book_authors::Column::AuthorId.eq(id))
            .order_by_asc(book::Column::Id)
            .all(&self.db)
            .await?;

        Ok(hydrate_books(&self.db, books).await?)
    }
}
