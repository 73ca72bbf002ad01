//! External system integrations for medrecord.
//!
//! This module provides adapters for the collaborators the services are
//! written against:
//!
//! - [`database`] - Repository port, in-memory store and backend factory
//! - [`postgresql`] - PostgreSQL JSONB document store
//! - [`audit`] - Audit sinks and the audit payload serializer
//! - [`identity`] - Current-user resolution
//! - [`registry`] - NPPES NPI provider registry client
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. Every collaborator is a
//! trait object injected into the services at construction time.
//!
//! ```rust
//! use medrecord::adapters::database::Repositories;
//! use medrecord::adapters::identity::{CurrentUserResolver, StaticUserResolver};
//!
//! let repos = Repositories::in_memory();
//! let user = StaticUserResolver::new("system").current_user().unwrap();
//! assert_eq!(user.user_id, "system");
//! # let _ = repos;
//! ```

pub mod audit;
pub mod database;
pub mod identity;
pub mod postgresql;
pub mod registry;
