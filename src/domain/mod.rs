//! Domain models and types for medrecord.
//!
//! This module contains the entity models, wire messages and error types
//! shared by every layer of the crate.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Identifiers** ([`Identifier`]) for every stored document
//! - **Wire messages** ([`wire`]) exchanged with RPC callers
//! - **Entity models** ([`records`]) and their [`WireCodec`] conversions
//! - **The generic document abstraction** ([`Record`])
//! - **Error types** ([`MedrecordError`], [`ErrorKind`]) and the [`Result`] alias
//!
//! # Conversions
//!
//! Models are built from wire messages and rendered back:
//!
//! ```rust
//! use medrecord::domain::records::Allergy;
//! use medrecord::domain::{wire, WireCodec};
//!
//! # fn example() -> medrecord::domain::Result<()> {
//! let incoming = wire::Allergy {
//!     allergen: Some("peanut".to_string()),
//!     ..Default::default()
//! };
//! let allergy = Allergy::from_wire(&incoming)?;
//! assert_eq!(allergy.to_wire().allergen.as_deref(), Some("peanut"));
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod errors;
pub mod ids;
pub mod record;
pub mod records;
pub mod result;
pub mod wire;

// Re-export commonly used types for convenience
pub use codec::WireCodec;
pub use errors::{ErrorKind, MedrecordError};
pub use ids::Identifier;
pub use record::{AuditFields, ListPolicy, Record};
pub use records::SubRecordKind;
pub use result::Result;
