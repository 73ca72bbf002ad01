//! Configuration management for medrecord.
//!
//! medrecord reads a TOML file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MEDRECORD_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [postgresql]
//! connection_string = "${MEDRECORD_PG_URL}"
//! max_connections = 10
//!
//! [service]
//! default_page_size = 20
//! max_page_size = 500
//! system_user = "system"
//!
//! [audit]
//! enabled = true
//! log_path = "/var/log/medrecord/audit.log"
//!
//! [registry]
//! enabled = true
//! base_url = "https://npiregistry.cms.hhs.gov/api/"
//!
//! [aggregation]
//! process_on_request = true
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use medrecord::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("medrecord.toml")?;
//! println!("Page size: {}", config.service.default_page_size);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AggregationConfig, ApplicationConfig, AuditConfig, DatabaseTarget, LoggingConfig,
    MedrecordConfig, PostgreSQLConfig, RegistryConfig, ServiceConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
