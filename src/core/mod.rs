//! Core business logic for medrecord.
//!
//! # Modules
//!
//! - [`context`] - Injected capabilities shared by every service
//! - [`service`] - Generic CRUD service used for every collection
//! - [`profile`] - Patient profiles with unique national health ids
//! - [`provider`] - Providers verified against the NPI registry
//! - [`medical_record`] - Medical record export requests and imports
//! - [`aggregator`] - Reconciliation of medical record aggregates
//!
//! # Medical Record Workflow
//!
//! 1. **Request**: an `Export` aggregate is created from the patient profile
//! 2. **Process**: the aggregator snapshots all thirteen collections
//! 3. **Complete**: the aggregate can now be read
//!
//! Imports run the other way: the staged aggregate's items are written back
//! into their collections, skipping ids that already exist.
//!
//! # Example
//!
//! ```rust
//! use medrecord::adapters::audit::MemoryAuditSink;
//! use medrecord::adapters::database::Repositories;
//! use medrecord::adapters::identity::StaticUserResolver;
//! use medrecord::core::{MedicalRecordAggregator, ServiceContext};
//! use std::sync::Arc;
//!
//! let context = ServiceContext::new(
//!     Arc::new(StaticUserResolver::new("system")),
//!     Arc::new(MemoryAuditSink::new()),
//! );
//! let aggregator = MedicalRecordAggregator::new(Repositories::in_memory(), context);
//! # let _ = aggregator;
//! ```

pub mod aggregator;
pub mod context;
pub mod medical_record;
pub mod profile;
pub mod provider;
pub mod service;

pub use aggregator::{ExportReport, ImportReport, KindTally, MedicalRecordAggregator, ProcessOutcome};
pub use context::ServiceContext;
pub use medical_record::MedicalRecordService;
pub use profile::ProfileService;
pub use provider::ProviderService;
pub use service::{ListQuery, ListResponse, RecordService};
