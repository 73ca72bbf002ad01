//! PostgreSQL document store
//!
//! Each collection is one table holding the record as JSONB alongside the
//! columns it is filtered and ordered by.

pub mod client;
pub mod models;
pub mod repository;

pub use client::PostgreSQLClient;
pub use models::DocumentRow;
pub use repository::PostgresRepository;
