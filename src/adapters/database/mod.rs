//! Document store abstraction layer
//!
//! This module provides the trait-based repository port that every service
//! is written against, an in-memory implementation and the factory that
//! builds one repository per collection for the configured backend.

pub mod factory;
pub mod memory;
pub mod traits;

pub use factory::{create_repositories, Repositories, SharedRepository};
pub use memory::MemoryRepository;
pub use traits::{DateRange, Page, PageRequest, Repository};
