//! Process-record command implementation
//!
//! Runs the medical record aggregator once against the configured store.

use crate::adapters::database::create_repositories;
use crate::cli::{EXIT_INVALID, EXIT_OK};
use crate::config::load_config;
use crate::core::{MedicalRecordAggregator, ProcessOutcome, ServiceContext};
use crate::domain::ids::Identifier;
use clap::Args;

/// Arguments for the process-record command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Medical record id (24 hex characters)
    #[arg(long)]
    pub id: String,
}

impl ProcessArgs {
    /// Execute the process-record command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let id = match Identifier::parse(&self.id) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_INVALID);
            }
        };

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("❌ Failed to load configuration: {e}");
                return Ok(EXIT_INVALID);
            }
        };

        let repos = create_repositories(&config).await?;
        let context = ServiceContext::from_config(&config)?;
        let aggregator = MedicalRecordAggregator::new(repos, context);

        tracing::info!(record_id = %id, "Processing medical record");
        let outcome = aggregator.process_medical_record(&id).await?;

        match outcome {
            ProcessOutcome::Missing => {
                println!("❌ Medical record {id} not found");
                Ok(EXIT_INVALID)
            }
            ProcessOutcome::AlreadyComplete => {
                println!("✅ Medical record {id} is already complete");
                Ok(EXIT_OK)
            }
            ProcessOutcome::Exported(report) => {
                println!("✅ Exported {} items into medical record {id}", report.total());
                Ok(EXIT_OK)
            }
            ProcessOutcome::Imported(report) => {
                println!(
                    "✅ Imported medical record {id}: {} inserted, {} already present",
                    report.inserted(),
                    report.skipped()
                );
                Ok(EXIT_OK)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_loading_config() {
        let args = ProcessArgs {
            id: "nope".to_string(),
        };
        let code = args.execute("/nonexistent/medrecord.toml").await.unwrap();
        assert_eq!(code, EXIT_INVALID);
    }
}
