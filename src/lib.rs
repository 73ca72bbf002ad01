// Medrecord - Healthcare record service layer and medical record aggregation
// Copyright (c) 2025 Medrecord Contributors
// Licensed under the MIT License

//! # Medrecord - Healthcare Record Services
//!
//! Medrecord is the service layer of a personal health record system. It
//! stores patient profiles, providers and thirteen kinds of clinical
//! sub-records, and assembles them into medical record aggregates that can
//! be exported or imported as a unit.
//!
//! ## Overview
//!
//! This library provides:
//! - **CRUD services** for every record collection with audit trail entries
//! - **Filtered listing** by patient, tags and date range with pagination
//! - **Medical record aggregation** that snapshots or writes back a patient's
//!   records with idempotent retries
//! - **Provider verification** against the NPPES NPI registry
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Services and the medical record aggregator
//! - [`adapters`] - Document stores, audit sinks, identity and registry
//! - [`domain`] - Record entities, wire messages and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use medrecord::adapters::database::create_repositories;
//! use medrecord::config::load_config;
//! use medrecord::core::{RecordService, ServiceContext};
//! use medrecord::domain::records::Allergy;
//! use medrecord::domain::wire;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("medrecord.toml")?;
//!     let repos = create_repositories(&config).await?;
//!     let context = ServiceContext::from_config(&config)?;
//!
//!     let allergies: RecordService<Allergy> =
//!         RecordService::new(repos.allergies.clone(), repos.profiles.clone(), context);
//!
//!     let request = wire::Allergy {
//!         patient_id: "65f0c0ffee0123456789abcd".to_string(),
//!         allergen: Some("Peanuts".to_string()),
//!         ..Default::default()
//!     };
//!     let created = allergies.create(&request).await?;
//!     println!("Created allergy {}", created.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::MedrecordError`]; its
//! [`kind`](domain::MedrecordError::kind) is what callers map to their
//! transport status codes.
//!
//! ## Logging
//!
//! Medrecord uses structured logging with the `tracing` crate; see
//! [`logging::init_logging`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
