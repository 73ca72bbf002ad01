//! Provider service
//!
//! Providers are verified against the NPI registry on create, and again on
//! update when the NPI changes. Registry data fills any name, specialty or
//! organization the caller left out.

use crate::adapters::database::factory::SharedRepository;
use crate::adapters::registry::{ProviderRegistry, RegistryEntry};
use crate::core::context::ServiceContext;
use crate::core::service::{ListResponse, RecordService};
use crate::domain::ids::Identifier;
use crate::domain::records::{Profile, Provider};
use crate::domain::wire::{self, DeleteResponse, ListRecordsRequest};
use crate::domain::{MedrecordError, Result};
use std::sync::Arc;

/// CRUD on providers with NPI verification
pub struct ProviderService {
    records: RecordService<Provider>,
    registry: Arc<dyn ProviderRegistry>,
}

fn fill(field: &mut Option<String>, registry_value: &str) {
    let missing = field.as_deref().map_or(true, |v| v.trim().is_empty());
    if missing && !registry_value.is_empty() {
        *field = Some(registry_value.to_string());
    }
}

impl ProviderService {
    pub fn new(
        providers: SharedRepository<Provider>,
        profiles: SharedRepository<Profile>,
        registry: Arc<dyn ProviderRegistry>,
        context: ServiceContext,
    ) -> Self {
        Self {
            records: RecordService::new(providers, profiles, context),
            registry,
        }
    }

    /// Creates a provider after verifying its NPI
    ///
    /// # Errors
    ///
    /// `NotAcceptable` for a missing, malformed or unregistered NPI;
    /// `ServiceUnavailable` if the registry cannot be reached.
    pub async fn create(&self, provider: &wire::Provider) -> Result<wire::Provider> {
        let npi = provider.npi.as_deref().unwrap_or_default();
        let entry = self.verify(npi).await?;

        let mut enriched = provider.clone();
        fill(&mut enriched.first_name, &entry.first_name);
        fill(&mut enriched.last_name, &entry.last_name);
        fill(&mut enriched.specialty, &entry.specialty);
        fill(&mut enriched.organization, &entry.organization);

        self.records.create(&enriched).await
    }

    pub async fn get(&self, id: &str) -> Result<wire::Provider> {
        self.records.get(id).await
    }

    /// Updates a provider, re-verifying a changed NPI
    pub async fn update(&self, provider: &wire::Provider) -> Result<wire::Provider> {
        if let Some(npi) = provider.npi.as_deref() {
            let id = Identifier::parse_optional(&provider.id)?;
            let current = match id {
                Some(id) => self.records.repository().find_by_id(&id).await?,
                None => None,
            };
            if current.map_or(true, |p| p.npi != npi) {
                self.verify(npi).await?;
            }
        }
        self.records.update(provider).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        self.records.delete(id).await
    }

    pub async fn list(&self, request: &ListRecordsRequest) -> Result<ListResponse<wire::Provider>> {
        self.records.list(request).await
    }

    async fn verify(&self, npi: &str) -> Result<RegistryEntry> {
        let entry = self.registry.lookup_npi(npi).await?;
        entry.ok_or_else(|| {
            MedrecordError::NotAcceptable(format!("NPI {npi} is not in the provider registry"))
        })
    }
}
