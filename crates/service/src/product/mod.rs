//! Product management: domain values, persistence contract and the
//! orchestrating service that keeps rows and images consistent.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod repo;
pub mod service;

pub use errors::ProductError;
pub use service::ProductService;
