//! SeaORM entities for the automart schema plus thin create/update helpers.

pub mod errors;
pub mod db;
pub mod category;
pub mod product;
pub mod user;
pub mod user_credentials;

#[cfg(test)]
mod tests;
