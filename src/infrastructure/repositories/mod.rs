//! Repository implementations using SeaORM

pub mod author_repository;
pub mod book_repository;
pub mod projection;
pub mod relations;

pub use author_repository::SeaOrmAuthorRepository;
pub use book_repository::SeaOrmBookRepository;
