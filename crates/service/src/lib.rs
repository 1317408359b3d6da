//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Keeps product rows and stored images consistent.
//! - Ships in-memory collaborators for tests and doc examples.

pub mod errors;
pub mod pagination;
pub mod storage;
pub mod category;
pub mod product;
pub mod auth;
