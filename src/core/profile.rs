//! Patient profile service
//!
//! Profiles are plain records with one extra rule: a national health id
//! belongs to at most one profile.

use crate::adapters::database::factory::SharedRepository;
use crate::core::context::ServiceContext;
use crate::core::service::{ListResponse, RecordService};
use crate::domain::codec::WireCodec;
use crate::domain::ids::Identifier;
use crate::domain::record::Record;
use crate::domain::records::Profile;
use crate::domain::wire::{self, DeleteResponse, ListRecordsRequest};
use crate::domain::{MedrecordError, Result};

/// CRUD on patient profiles
pub struct ProfileService {
    records: RecordService<Profile>,
}

impl ProfileService {
    pub fn new(profiles: SharedRepository<Profile>, context: ServiceContext) -> Self {
        Self {
            records: RecordService::new(profiles.clone(), profiles, context),
        }
    }

    /// Creates a profile
    ///
    /// # Errors
    ///
    /// `Conflict` if another profile already uses the national health id.
    pub async fn create(&self, profile: &wire::Profile) -> Result<wire::Profile> {
        ensure_national_health_id_free(
            self.records.repository(),
            profile.national_health_id.as_deref(),
            None,
        )
        .await?;
        self.records.create(profile).await
    }

    pub async fn get(&self, id: &str) -> Result<wire::Profile> {
        self.records.get(id).await
    }

    /// Updates a profile
    ///
    /// # Errors
    ///
    /// `Conflict` if the new national health id belongs to another profile.
    pub async fn update(&self, profile: &wire::Profile) -> Result<wire::Profile> {
        let own_id = Profile::from_wire(profile)?.id;
        ensure_national_health_id_free(
            self.records.repository(),
            profile.national_health_id.as_deref(),
            own_id,
        )
        .await?;
        self.records.update(profile).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        self.records.delete(id).await
    }

    pub async fn list(&self, request: &ListRecordsRequest) -> Result<ListResponse<wire::Profile>> {
        self.records.list(request).await
    }

    /// Looks a profile up by national health id
    ///
    /// # Errors
    ///
    /// `NotFound` if no profile carries it.
    pub async fn find_by_national_health_id(&self, national_health_id: &str) -> Result<wire::Profile> {
        let matches = self
            .records
            .repository()
            .find_all_by_national_health_id(national_health_id)
            .await?;
        let profile = matches.into_iter().next().ok_or_else(|| {
            MedrecordError::NotFound(format!("profile with national health id {national_health_id}"))
        })?;
        let id = profile
            .id()
            .map(|id| id.to_hex())
            .ok_or_else(|| MedrecordError::Database("Stored profile has no id".to_string()))?;
        self.records.get(&id).await
    }
}

/// Fails when a profile other than `own_id` already holds the national health id
///
/// # Errors
///
/// `Conflict` when the id is taken; store errors propagate.
pub(crate) async fn ensure_national_health_id_free(
    profiles: &SharedRepository<Profile>,
    national_health_id: Option<&str>,
    own_id: Option<Identifier>,
) -> Result<()> {
    let Some(nhid) = national_health_id.filter(|n| !n.trim().is_empty()) else {
        return Ok(());
    };
    let holders = profiles.find_all_by_national_health_id(nhid).await?;
    if holders.iter().any(|p| p.id() != own_id) {
        return Err(MedrecordError::Conflict(format!(
            "National health id {nhid} is already registered"
        )));
    }
    Ok(())
}
