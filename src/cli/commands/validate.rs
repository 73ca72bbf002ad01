//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the medrecord configuration file.

use crate::cli::{EXIT_INVALID, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use crate::config::MedrecordConfig;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print_summary(&config);
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_INVALID)
            }
        }
    }
}

fn print_summary(config: &MedrecordConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);

    match config.database_target {
        DatabaseTarget::Memory => println!("  Database Target: in-memory"),
        DatabaseTarget::PostgreSQL => {
            if let Some(ref pg_config) = config.postgresql {
                use secrecy::ExposeSecret;
                println!("  Database Target: PostgreSQL");
                println!(
                    "  PostgreSQL Host: {}",
                    pg_config
                        .connection_string
                        .expose_secret()
                        .split('@')
                        .next_back()
                        .unwrap_or("***")
                );
                println!("  Max Connections: {}", pg_config.max_connections);
            }
        }
    }

    println!(
        "  Page Size: {} (max {})",
        config.service.default_page_size, config.service.max_page_size
    );
    println!(
        "  Audit Log: {}",
        if config.audit.enabled {
            config.audit.log_path.as_str()
        } else {
            "disabled"
        }
    );
    println!(
        "  NPI Registry: {}",
        if config.registry.enabled {
            config.registry.base_url.as_str()
        } else {
            "disabled"
        }
    );
    println!(
        "  Process On Request: {}",
        config.aggregation.process_on_request
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_file_exits_ok() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"memory\"\n[audit]\nenabled = false").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_invalid_file_exits_with_validation_code() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "database_target = \"postgresql\"").unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_INVALID);
    }

    #[tokio::test]
    async fn test_missing_file_exits_with_validation_code() {
        let code = ValidateArgs {}
            .execute("/nonexistent/medrecord.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_INVALID);
    }
}
