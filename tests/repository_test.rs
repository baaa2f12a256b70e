use biblioteca::db;
use biblioteca::domain::{
    AuthorRepository, BookPatch, BookRepository, DUPLICATE_ISBN, DomainError, NO_MATCHING_AUTHORS,
    NewAuthor, NewBook, Page,
};
use biblioteca::infrastructure::{SeaOrmAuthorRepository, SeaOrmBookRepository};
use biblioteca::models::{author, book_authors};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite for testing
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn setup_repos() -> (
    DatabaseConnection,
    SeaOrmAuthorRepository,
    SeaOrmBookRepository,
) {
    let db = setup_test_db().await;
    let authors = SeaOrmAuthorRepository::new(db.clone());
    let books = SeaOrmBookRepository::new(db.clone());
    (db, authors, books)
}

fn new_author(name: &str, country: Option<&str>, birth_year: Option<i32>) -> NewAuthor {
    NewAuthor {
        name: name.to_string(),
        country_of_origin: country.map(str::to_string),
        birth_year,
    }
}

fn new_book(title: &str, isbn: &str, year: Option<i32>) -> NewBook {
    NewBook {
        title: title.to_string(),
        isbn: isbn.to_string(),
        publication_year: year,
        copies_available: Some(1),
    }
}

async fn link_count(db: &DatabaseConnection) -> u64 {
    book_authors::Entity::find()
        .count(db)
        .await
        .expect("Failed to count links")
}

#[tokio::test]
async fn test_create_then_get_author() {
    let (_db, authors, _books) = setup_repos().await;

    let created = authors
        .create(new_author("Mario Vargas Llosa", Some("Peru"), Some(1936)))
        .await
        .expect("Failed to create author");

    assert!(created.books.is_empty());

    let fetched = authors
        .find_by_id(created.id)
        .await
        .expect("Failed to fetch author")
        .expect("Author should exist");

    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_get_missing_author_is_none() {
    let (_db, authors, books) = setup_repos().await;

    assert_eq!(authors.find_by_id(42).await.unwrap(), None);
    assert_eq!(books.find_by_id(42).await.unwrap(), None);
}

#[tokio::test]
async fn test_duplicate_isbn_is_a_conflict() {
    let (db, _authors, books) = setup_repos().await;

    books
        .create(new_book("La ciudad y los perros", "978-0-00-000001-1", Some(1963)), vec![])
        .await
        .expect("First create should succeed");

    let err = books
        .create(new_book("Another title", "978-0-00-000001-1", None), vec![])
        .await
        .expect_err("Second create should fail");

    assert_eq!(err, DomainError::Conflict(DUPLICATE_ISBN.to_string()));

    let stored = biblioteca::models::book::Entity::find()
        .filter(biblioteca::models::book::Column::Isbn.eq("978-0-00-000001-1"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn test_duplicate_isbn_rolls_back_author_links() {
    let (db, authors, books) = setup_repos().await;
    let a = authors.create(new_author("Borges", None, None)).await.unwrap();

    books
        .create(new_book("Ficciones", "isbn-1", None), vec![a.id])
        .await
        .unwrap();
    assert_eq!(link_count(&db).await, 1);

    let err = books
        .create(new_book("El Aleph", "isbn-1", None), vec![a.id])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(link_count(&db).await, 1);

    let author = authors.find_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(author.books, vec!["Ficciones"]);
}

#[tokio::test]
async fn test_book_authors_and_cascade_on_author_delete() {
    let (_db, authors, books) = setup_repos().await;
    let a1 = authors.create(new_author("Ana", None, None)).await.unwrap();
    let a2 = authors.create(new_author("Beto", None, None)).await.unwrap();

    let book = books
        .create(new_book("Coauthored", "isbn-co", Some(2001)), vec![a2.id, a1.id])
        .await
        .unwrap();

    // Names come back ordered by author id regardless of request order
    assert_eq!(book.authors, vec!["Ana", "Beto"]);

    let deleted = authors.delete(a1.id).await.unwrap().expect("Author existed");
    assert_eq!(deleted.books, vec!["Coauthored"]);

    let still_there = books.find_by_id(book.id).await.unwrap().expect("Book survives");
    assert_eq!(still_there.authors, vec!["Beto"]);

    let remaining = books.find_authors(book.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, a2.id);
    assert_eq!(remaining[0].books, vec!["Coauthored"]);
}

#[tokio::test]
async fn test_schema_cascade_removes_links_on_raw_author_delete() {
    let (db, authors, books) = setup_repos().await;
    let a1 = authors.create(new_author("Ana", None, None)).await.unwrap();
    let a2 = authors.create(new_author("Beto", None, None)).await.unwrap();
    let book = books
        .create(new_book("Coauthored", "isbn-raw", None), vec![a1.id, a2.id])
        .await
        .unwrap();
    assert_eq!(link_count(&db).await, 2);

    // Bypasses the repository so only the foreign key can clean up the join row
    let result = author::Entity::delete_by_id(a1.id)
        .exec(&db)
        .await
        .expect("Failed to delete author row");
    assert_eq!(result.rows_affected, 1);

    assert_eq!(link_count(&db).await, 1);
    let survivor = books.find_by_id(book.id).await.unwrap().expect("Book survives");
    assert_eq!(survivor.authors, vec!["Beto"]);
}

#[tokio::test]
async fn test_create_book_with_only_unknown_authors_fails() {
    let (_db, _authors, books) = setup_repos().await;

    let err = books
        .create(new_book("Orphan", "isbn-orphan", None), vec![98, 99])
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Validation(NO_MATCHING_AUTHORS.to_string()));

    assert!(books.find_all(Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_book_with_partially_known_authors_keeps_valid_subset() {
    let (_db, authors, books) = setup_repos().await;
    let a = authors.create(new_author("Known", None, None)).await.unwrap();

    // Unknown ids are dropped without error as long as one id resolves.
    let book = books
        .create(new_book("Mixed", "isbn-mixed", None), vec![a.id, 999])
        .await
        .unwrap();

    assert_eq!(book.authors, vec!["Known"]);
}

#[tokio::test]
async fn test_partial_update_only_touches_given_fields() {
    let (_db, _authors, books) = setup_repos().await;
    let book = books
        .create(new_book("Rayuela", "isbn-rayuela", Some(1963)), vec![])
        .await
        .unwrap();

    let updated = books
        .update(
            book.id,
            BookPatch {
                copies_available: Some(Some(5)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Book exists");

    assert_eq!(updated.title, "Rayuela");
    assert_eq!(updated.isbn, "isbn-rayuela");
    assert_eq!(updated.publication_year, Some(1963));
    assert_eq!(updated.copies_available, Some(5));

    let cleared = books
        .update(
            book.id,
            BookPatch {
                publication_year: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.publication_year, None);
    assert_eq!(cleared.copies_available, Some(5));
}

#[tokio::test]
async fn test_empty_patch_returns_book_unchanged() {
    let (_db, authors, books) = setup_repos().await;
    let a = authors.create(new_author("Cortázar", None, None)).await.unwrap();
    let book = books
        .create(new_book("Bestiario", "isbn-bestiario", Some(1951)), vec![a.id])
        .await
        .unwrap();

    let same = books
        .update(book.id, BookPatch::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(same, book);
}

#[tokio::test]
async fn test_update_replaces_or_clears_author_set() {
    let (_db, authors, books) = setup_repos().await;
    let a1 = authors.create(new_author("First", None, None)).await.unwrap();
    let a2 = authors.create(new_author("Second", None, None)).await.unwrap();
    let book = books
        .create(new_book("Shared", "isbn-shared", None), vec![a1.id])
        .await
        .unwrap();

    let replaced = books
        .update(
            book.id,
            BookPatch {
                author_ids: Some(vec![a2.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.authors, vec!["Second"]);
    assert!(authors.find_books(a1.id).await.unwrap().is_empty());

    let err = books
        .update(
            book.id,
            BookPatch {
                title: Some("Should not persist".to_string()),
                author_ids: Some(vec![404]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Validation(NO_MATCHING_AUTHORS.to_string()));

    let unchanged = books.find_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "Shared");
    assert_eq!(unchanged.authors, vec!["Second"]);

    let cleared = books
        .update(
            book.id,
            BookPatch {
                author_ids: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.authors.is_empty());
}

#[tokio::test]
async fn test_update_with_partially_known_authors_keeps_valid_subset() {
    let (db, authors, books) = setup_repos().await;
    let a1 = authors.create(new_author("First", None, None)).await.unwrap();
    let a2 = authors.create(new_author("Second", None, None)).await.unwrap();
    let book = books
        .create(new_book("Mixed", "isbn-mixed", None), vec![a2.id])
        .await
        .unwrap();

    let updated = books
        .update(
            book.id,
            BookPatch {
                author_ids: Some(vec![a1.id, 404]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("Book exists");
    assert_eq!(updated.authors, vec!["First"]);
    assert_eq!(link_count(&db).await, 1);

    let fetched = books.find_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(fetched.authors, vec!["First"]);
    assert!(authors.find_books(a2.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_to_taken_isbn_is_a_conflict() {
    let (_db, _authors, books) = setup_repos().await;
    books
        .create(new_book("One", "isbn-one", None), vec![])
        .await
        .unwrap();
    let two = books
        .create(new_book("Two", "isbn-two", None), vec![])
        .await
        .unwrap();

    let err = books
        .update(
            two.id,
            BookPatch {
                isbn: Some("isbn-one".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let two_again = books.find_by_id(two.id).await.unwrap().unwrap();
    assert_eq!(two_again.isbn, "isbn-two");
}

#[tokio::test]
async fn test_update_missing_book_is_none() {
    let (_db, _authors, books) = setup_repos().await;
    let result = books.update(77, BookPatch::default()).await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_update_author_keeps_book_links() {
    let (_db, authors, books) = setup_repos().await;
    let a = authors
        .create(new_author("Gabriel García Márquez", Some("Colombia"), Some(1927)))
        .await
        .unwrap();
    books
        .create(new_book("Cien años de soledad", "isbn-cien", Some(1967)), vec![a.id])
        .await
        .unwrap();

    let updated = authors
        .update(a.id, new_author("Gabo", None, None))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Gabo");
    assert_eq!(updated.country_of_origin, None);
    assert_eq!(updated.birth_year, None);
    assert_eq!(updated.books, vec!["Cien años de soledad"]);

    assert_eq!(authors.update(999, new_author("x", None, None)).await.unwrap(), None);
}

#[tokio::test]
async fn test_list_authors_by_country() {
    let (_db, authors, _books) = setup_repos().await;
    authors
        .create(new_author("Vallejo", Some("Peru"), Some(1892)))
        .await
        .unwrap();
    authors
        .create(new_author("Neruda", Some("Chile"), Some(1904)))
        .await
        .unwrap();
    authors
        .create(new_author("Arguedas", Some("Peru"), Some(1911)))
        .await
        .unwrap();
    authors
        .create(new_author("Anonymous", None, None))
        .await
        .unwrap();

    let peruvians = authors
        .find_all(Some("Peru".to_string()), Page::default())
        .await
        .unwrap();
    let names: Vec<&str> = peruvians.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Vallejo", "Arguedas"]);

    // Exact match only
    assert!(authors
        .find_all(Some("peru".to_string()), Page::default())
        .await
        .unwrap()
        .is_empty());
    assert!(authors
        .find_all(Some("Bolivia".to_string()), Page::default())
        .await
        .unwrap()
        .is_empty());

    assert_eq!(authors.find_all(None, Page::default()).await.unwrap().len(), 4);
    assert_eq!(authors.find_all(None, Page::new(1, 2)).await.unwrap().len(), 2);
    assert_eq!(
        authors
            .find_all(None, Page::new(0, u64::MAX))
            .await
            .unwrap()
            .len(),
        4
    );
}

#[tokio::test]
async fn test_delete_author_then_fetch_is_none() {
    let (_db, authors, _books) = setup_repos().await;

    assert_eq!(authors.delete(1234).await.unwrap(), None);

    let a = authors
        .create(new_author("Short-lived", Some("Peru"), None))
        .await
        .unwrap();
    let deleted = authors.delete(a.id).await.unwrap().expect("Existed");
    assert_eq!(deleted, a);
    assert_eq!(authors.find_by_id(a.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_book_keeps_authors() {
    let (db, authors, books) = setup_repos().await;
    let a = authors.create(new_author("Keeper", None, None)).await.unwrap();
    let book = books
        .create(new_book("Gone", "isbn-gone", None), vec![a.id])
        .await
        .unwrap();

    let deleted = books.delete(book.id).await.unwrap().expect("Existed");
    assert_eq!(deleted.authors, vec!["Keeper"]);
    assert_eq!(books.find_by_id(book.id).await.unwrap(), None);
    assert_eq!(link_count(&db).await, 0);

    let author = authors.find_by_id(a.id).await.unwrap().expect("Author survives");
    assert!(author.books.is_empty());

    assert_eq!(books.delete(book.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_pages_partition_books() {
    let (_db, _authors, books) = setup_repos().await;
    let first = books
        .create(new_book("First", "isbn-a", None), vec![])
        .await
        .unwrap();
    let second = books
        .create(new_book("Second", "isbn-b", None), vec![])
        .await
        .unwrap();

    let page_one = books.find_all(Page::new(0, 1)).await.unwrap();
    let page_two = books.find_all(Page::new(1, 1)).await.unwrap();

    assert_eq!(page_one, vec![first]);
    assert_eq!(page_two, vec![second]);
    assert!(books.find_all(Page::new(2, 1)).await.unwrap().is_empty());

    // Oversized bounds are capped instead of overflowing the SQLite binding
    assert_eq!(books.find_all(Page::new(0, u64::MAX)).await.unwrap().len(), 2);
    assert!(books.find_all(Page::new(u64::MAX, 1)).await.unwrap().is_empty());
    assert!(
        books
            .find_by_year(2000, Page::new(u64::MAX, u64::MAX))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_books_by_year() {
    let (_db, _authors, books) = setup_repos().await;
    books
        .create(new_book("Old", "isbn-old", Some(1950)), vec![])
        .await
        .unwrap();
    books
        .create(new_book("New", "isbn-new", Some(2020)), vec![])
        .await
        .unwrap();
    books
        .create(new_book("Undated", "isbn-undated", None), vec![])
        .await
        .unwrap();

    let from_1950 = books.find_by_year(1950, Page::default()).await.unwrap();
    assert_eq!(from_1950.len(), 1);
    assert_eq!(from_1950[0].title, "Old");

    assert!(books.find_by_year(1999, Page::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_association_lookups() {
    let (_db, authors, books) = setup_repos().await;
    let lonely = authors.create(new_author("No books", None, None)).await.unwrap();
    let prolific = authors.create(new_author("Prolific", None, None)).await.unwrap();
    let b1 = books
        .create(new_book("Alpha", "isbn-alpha", None), vec![prolific.id])
        .await
        .unwrap();
    books
        .create(new_book("Beta", "isbn-beta", None), vec![prolific.id])
        .await
        .unwrap();
    let unauthored = books
        .create(new_book("Gamma", "isbn-gamma", None), vec![])
        .await
        .unwrap();

    assert!(authors.find_books(lonely.id).await.unwrap().is_empty());

    let titles: Vec<String> = authors
        .find_books(prolific.id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);

    let listed = authors.find_by_id(prolific.id).await.unwrap().unwrap();
    assert_eq!(listed.books, vec!["Alpha", "Beta"]);

    assert_eq!(books.find_authors(b1.id).await.unwrap()[0].name, "Prolific");
    assert!(books.find_authors(unauthored.id).await.unwrap().is_empty());

    assert_eq!(authors.find_books(999).await.unwrap_err(), DomainError::NotFound);
    assert_eq!(books.find_authors(999).await.unwrap_err(), DomainError::NotFound);
}
