//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Signup, signin and bearer token verification for back-office users.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::AuthError;
pub use service::{AuthConfig, AuthService};
