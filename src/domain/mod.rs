//! Domain layer - Pure business abstractions
//!
//! This layer holds no storage or HTTP code: only the catalogue's
//! read-facing types, write inputs, repository traits and error types.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
