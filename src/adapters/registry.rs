//! Provider registry integration
//!
//! Providers are verified against the NPPES NPI registry before they are
//! stored. Transport failures surface as `ServiceUnavailable` so callers
//! never see reqwest errors.

use crate::config::schema::RegistryConfig;
use crate::domain::{MedrecordError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// NPPES API version requested
const API_VERSION: &str = "2.1";

/// Registry data for one provider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryEntry {
    pub npi: String,
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    /// Description of the primary taxonomy
    pub specialty: String,
}

/// Lookup of providers by NPI
#[async_trait]
pub trait ProviderRegistry: Send + Sync {
    /// Look up one NPI; `None` if the registry does not know it
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed NPI and `ServiceUnavailable` if
    /// the registry cannot be reached.
    async fn lookup_npi(&self, npi: &str) -> Result<Option<RegistryEntry>>;
}

/// Checks the NPI shape: exactly ten ASCII digits
pub fn validate_npi(npi: &str) -> Result<()> {
    if npi.len() == 10 && npi.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(MedrecordError::Validation(format!(
            "NPI must be 10 digits, got '{npi}'"
        )))
    }
}

#[derive(Debug, Deserialize)]
struct NppesResponse {
    #[serde(default)]
    result_count: u32,
    #[serde(default)]
    results: Vec<NppesResult>,
}

#[derive(Debug, Deserialize)]
struct NppesResult {
    #[serde(default)]
    number: serde_json::Value,
    #[serde(default)]
    basic: NppesBasic,
    #[serde(default)]
    taxonomies: Vec<NppesTaxonomy>,
}

#[derive(Debug, Default, Deserialize)]
struct NppesBasic {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NppesTaxonomy {
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    primary: bool,
}

impl NppesResult {
    fn into_entry(self, requested: &str) -> RegistryEntry {
        let npi = match self.number {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => requested.to_string(),
        };
        let specialty = self
            .taxonomies
            .iter()
            .find(|t| t.primary)
            .or_else(|| self.taxonomies.first())
            .and_then(|t| t.desc.clone())
            .unwrap_or_default();

        RegistryEntry {
            npi,
            first_name: self.basic.first_name.unwrap_or_default(),
            last_name: self.basic.last_name.unwrap_or_default(),
            organization: self.basic.organization_name.unwrap_or_default(),
            specialty,
        }
    }
}

/// HTTP client for the NPPES NPI registry
pub struct NpiRegistryClient {
    base_url: String,
    client: Client,
}

impl NpiRegistryClient {
    /// Create a registry client
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                MedrecordError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }
}

#[async_trait]
impl ProviderRegistry for NpiRegistryClient {
    async fn lookup_npi(&self, npi: &str) -> Result<Option<RegistryEntry>> {
        validate_npi(npi)?;

        tracing::debug!(npi = %npi, "Looking up provider in NPI registry");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("version", API_VERSION), ("number", npi)])
            .send()
            .await
            .map_err(|e| {
                MedrecordError::ServiceUnavailable(format!("NPI registry unreachable: {e}"))
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(MedrecordError::ServiceUnavailable(format!(
                "NPI registry returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MedrecordError::NotAcceptable(format!(
                "NPI registry rejected lookup with {status}: {body}"
            )));
        }

        let body: NppesResponse = response.json().await.map_err(|e| {
            MedrecordError::ServiceUnavailable(format!("Unreadable NPI registry response: {e}"))
        })?;

        if body.result_count == 0 {
            tracing::info!(npi = %npi, "NPI not found in registry");
            return Ok(None);
        }

        Ok(body.results.into_iter().next().map(|r| r.into_entry(npi)))
    }
}

/// Registry used when verification is switched off; knows every valid NPI
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRegistry;

#[async_trait]
impl ProviderRegistry for DisabledRegistry {
    async fn lookup_npi(&self, npi: &str) -> Result<Option<RegistryEntry>> {
        validate_npi(npi)?;
        Ok(Some(RegistryEntry {
            npi: npi.to_string(),
            ..Default::default()
        }))
    }
}

/// Registry selected by `registry.enabled`
///
/// # Errors
///
/// Returns `Configuration` if the HTTP client cannot be built.
pub fn create_registry(config: &RegistryConfig) -> Result<Arc<dyn ProviderRegistry>> {
    if config.enabled {
        tracing::info!(base_url = %config.base_url, "NPI registry verification enabled");
        Ok(Arc::new(NpiRegistryClient::new(config)?))
    } else {
        tracing::info!("NPI registry verification disabled");
        Ok(Arc::new(DisabledRegistry))
    }
}
