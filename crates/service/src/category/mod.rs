//! Categories: the read-only lookup products depend on, plus the small
//! management service behind `/categories`.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::Category;
pub use repository::{CategoryLookup, CategoryRepository};
pub use service::CategoryService;
