//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted log files with rotation
//! - Configurable log levels
//! - Helper macros giving aggregation and service events consistent fields
//!
//! # Example
//!
//! ```no_run
//! use medrecord::logging::init_logging;
//! use medrecord::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a medical record processing run
///
/// # Example
///
/// ```
/// use medrecord::log_aggregation_start;
///
/// log_aggregation_start!("65226c30a1b2c3d4e5f60718", "Export");
/// ```
#[macro_export]
macro_rules! log_aggregation_start {
    ($record_id:expr, $status:expr) => {
        tracing::info!(
            record_id = %$record_id,
            status = ?$status,
            "Processing medical record"
        );
    };
}

/// Log the completion of a medical record processing run
///
/// # Example
///
/// ```
/// use medrecord::log_aggregation_complete;
/// use std::time::Duration;
///
/// log_aggregation_complete!("65226c30a1b2c3d4e5f60718", 12, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_aggregation_complete {
    ($record_id:expr, $items:expr, $duration:expr) => {
        tracing::info!(
            record_id = %$record_id,
            items = $items,
            duration_ms = $duration.as_millis() as u64,
            "Medical record complete"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```
/// use medrecord::log_error_with_context;
/// use medrecord::domain::MedrecordError;
///
/// let error = MedrecordError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
