//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_FATAL, EXIT_INVALID, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "medrecord.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing medrecord configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_INVALID);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set database_target to 'memory' or 'postgresql'");
                println!("  3. For PostgreSQL, export MEDRECORD_PG_URL (or put it in .env)");
                println!("  4. Validate configuration: medrecord validate-config");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# medrecord configuration

database_target = "memory"

[application]
log_level = "info"

[service]
default_page_size = 20
max_page_size = 500
system_user = "system"

[audit]
enabled = true
log_path = "/var/log/medrecord/audit.log"

[registry]
enabled = false

[aggregation]
process_on_request = true

[logging]
local_enabled = true
local_path = "/var/log/medrecord"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# medrecord configuration
#
# Values may reference environment variables as ${VAR_NAME}, and any key can
# be overridden with MEDRECORD_<SECTION>_<KEY>, e.g. MEDRECORD_SERVICE_MAX_PAGE_SIZE.

# Document store: "memory" (testing) or "postgresql"
database_target = "memory"

[application]
# trace, debug, info, warn, error
log_level = "info"

# Required when database_target = "postgresql"
# [postgresql]
# connection_string = "${MEDRECORD_PG_URL}"
# max_connections = 10
# connection_timeout_seconds = 30
# statement_timeout_seconds = 60
# ssl_mode = "prefer"   # disable, allow, prefer, require, verify-ca, verify-full

[service]
# Used when a list request asks for page size 0
default_page_size = 20
# Larger requested page sizes are clamped to this value
max_page_size = 500
# Identity stamped as creator/modifier
system_user = "system"

[audit]
enabled = true
log_path = "/var/log/medrecord/audit.log"
# false writes one plain-text line per event
json_format = true

[registry]
# Verify provider NPIs against the NPPES registry
enabled = false
base_url = "https://npiregistry.cms.hhs.gov/api/"
timeout_seconds = 10

[aggregation]
# Process requested and imported medical records immediately
process_on_request = true

[logging]
local_enabled = true
local_path = "/var/log/medrecord"
# daily or hourly
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "medrecord.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "medrecord.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_are_valid() {
        let minimal = parse_config(&InitArgs::generate_minimal_config()).unwrap();
        assert!(minimal.aggregation.process_on_request);

        let examples = parse_config(&InitArgs::generate_config_with_examples()).unwrap();
        assert_eq!(examples.service.max_page_size, 500);
        assert!(!examples.registry.enabled);
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("medrecord.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_INVALID);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("database_target"));
    }
}
