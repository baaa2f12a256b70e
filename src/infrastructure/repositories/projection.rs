//! Entity-to-wire projections
//!
//! Pure mappings from a hydrated row to its API representation. Related
//! entities are reduced to their display key so responses never expand the
//! association graph. Callers load the relation first (see `relations`).

use crate::domain::{Author, Book};
use crate::models::{author, book};

pub fn author_projection(model: author::Model, book_titles: Vec<String>) -> Author {
    Author {
        id: model.id,
        name: model.name,
        country_of_origin: model.country_of_origin,
        birth_year: model.birth_year,
        books: book_titles,
    }
}

pub fn book_projection(model: book::Model, author_names: Vec<String>) -> Book {
    Book {
        id: model.id,
        title: model.title,
        isbn: model.isbn,
        publication_year: model.publication_year,
        copies_available: model.copies_available,
        authors: author_names,
    }
}
