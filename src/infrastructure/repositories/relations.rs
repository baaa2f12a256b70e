//! Eager loading of the book/author association
//!
//! Each loader issues two explicit queries for a whole batch of rows: one over
//! the join table and one over the related table. Display keys come back
//! ordered by the related row's id.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::domain::{Author, Book};
use crate::models::author::{self, Entity as AuthorEntity};
use crate::models::book::{self, Entity as BookEntity};
use crate::models::book_authors::{self, Entity as BookAuthorEntity};

use super::projection::{author_projection, book_projection};

/// Author names keyed by book id
pub async fn author_names_by_book<C: ConnectionTrait>(
    conn: &C,
    book_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr> {
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = BookAuthorEntity::find()
        .filter(book_authors::Column::BookId.is_in(book_ids.iter().copied()))
        .order_by_asc(book_authors::Column::AuthorId)
        .all(conn)
        .await?;

    let names: HashMap<i32, String> = AuthorEntity::find()
        .filter(author::Column::Id.is_in(links.iter().map(|l| l.author_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let mut by_book: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(name) = names.get(&link.author_id) {
            by_book.entry(link.book_id).or_default().push(name.clone());
        }
    }

    Ok(by_book)
}

/// Book titles keyed by author id
pub async fn book_titles_by_author<C: ConnectionTrait>(
    conn: &C,
    author_ids: &[i32],
) -> Result<HashMap<i32, Vec<String>>, DbErr> {
    if author_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = BookAuthorEntity::find()
        .filter(book_authors::Column::AuthorId.is_in(author_ids.iter().copied()))
        .order_by_asc(book_authors::Column::BookId)
        .all(conn)
        .await?;

    let titles: HashMap<i32, String> = BookEntity::find()
        .filter(book::Column::Id.is_in(links.iter().map(|l| l.book_id)))
        .all(conn)
        .await?
        .into_iter()
        .map(|b| (b.id, b.title))
        .collect();

    let mut by_author: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(title) = titles.get(&link.book_id) {
            by_author
                .entry(link.author_id)
                .or_default()
                .push(title.clone());
        }
    }

    Ok(by_author)
}

/// Project a batch of book rows, keeping their order
pub async fn hydrate_books<C: ConnectionTrait>(
    conn: &C,
    books: Vec<book::Model>,
) -> Result<Vec<Book>, DbErr> {
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    let mut names = author_names_by_book(conn, &ids).await?;

    Ok(books
        .into_iter()
        .map(|b| {
            let authors = names.remove(&b.id).unwrap_or_default();
            book_projection(b, authors)
        })
        .collect())
}

/// Project a batch of author rows, keeping their order
pub async fn hydrate_authors<C: ConnectionTrait>(
    conn: &C,
    authors: Vec<author::Model>,
) -> Result<Vec<Author>, DbErr> {
    let ids: Vec<i32> = authors.iter().map(|a| a.id).collect();
    let mut titles = book_titles_by_author(conn, &ids).await?;

    Ok(authors
        .into_iter()
        .map(|a| {
            let books = titles.remove(&a.id).unwrap_or_default();
            author_projection(a, books)
        })
        .collect())
}

pub async fn hydrate_book<C: ConnectionTrait>(
    conn: &C,
    book: book::Model,
) -> Result<Book, DbErr> {
    let authors = author_names_by_book(conn, &[book.id])
        .await?
        .remove(&book.id)
        .unwrap_or_default();
    Ok(book_projection(book, authors))
}

pub async fn hydrate_author<C: ConnectionTrait>(
    conn: &C,
    author: author::Model,
) -> Result<Author, DbErr> {
    let books = book_titles_by_author(conn, &[author.id])
        .await?
        .remove(&author.id)
        .unwrap_or_default();
    Ok(author_projection(author, books))
}

/// Delete every join row touching the given book
pub async fn unlink_book<C: ConnectionTrait>(conn: &C, book_id: i32) -> Result<u64, DbErr> {
    let result = BookAuthorEntity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Delete every join row touching the given author
pub async fn unlink_author<C: ConnectionTrait>(conn: &C, author_id: i32) -> Result<u64, DbErr> {
    let result = BookAuthorEntity::delete_many()
        .filter(book_authors::Column::AuthorId.eq(author_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
