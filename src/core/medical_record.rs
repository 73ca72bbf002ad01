//! Medical record request service
//!
//! Callers request exports and stage imports here; the
//! [`MedicalRecordAggregator`] does the work, either immediately on the
//! runtime (`aggregation.process_on_request`) or when an operator runs it.

use crate::adapters::audit::AuditEventKind;
use crate::adapters::database::factory::Repositories;
use crate::core::aggregator::{MedicalRecordAggregator, ProcessOutcome};
use crate::core::context::ServiceContext;
use crate::core::service::ListResponse;
use crate::domain::codec::WireCodec;
use crate::domain::ids::Identifier;
use crate::domain::records::{MedicalRecord, RecordStatus};
use crate::domain::wire::{self, DeleteResponse, MedicalRecordRequest, Pagination};
use crate::domain::{MedrecordError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Lifecycle entry points of medical record aggregates
pub struct MedicalRecordService {
    repos: Repositories,
    context: ServiceContext,
    aggregator: Arc<MedicalRecordAggregator>,
    process_on_request: bool,
}

impl MedicalRecordService {
    pub fn new(
        repos: Repositories,
        context: ServiceContext,
        aggregator: Arc<MedicalRecordAggregator>,
        process_on_request: bool,
    ) -> Self {
        Self {
            repos,
            context,
            aggregator,
            process_on_request,
        }
    }

    /// Starts an export for a patient
    ///
    /// The new aggregate is in `Export` status with the current profile as
    /// its snapshot and empty sub-lists.
    ///
    /// # Errors
    ///
    /// `NotFound` if the patient has no profile.
    pub async fn request_medical_record(
        &self,
        request: &MedicalRecordRequest,
    ) -> Result<wire::MedicalRecord> {
        let patient_id = Identifier::parse(&request.patient_id)?;
        let profile = self
            .repos
            .profiles
            .find_by_id(&patient_id)
            .await?
            .ok_or_else(|| MedrecordError::NotFound(format!("profiles/{patient_id}")))?;

        let record = MedicalRecord::from_profile(&profile, RecordStatus::Export);
        let saved = self.stage(record, AuditEventKind::Export).await?;

        tracing::info!(
            record_id = %saved.id.map(|id| id.to_hex()).unwrap_or_default(),
            patient_id = %patient_id,
            "Medical record requested"
        );
        Ok(saved.to_wire())
    }

    /// Stages an aggregate for idempotent write-back into its collections
    ///
    /// # Errors
    ///
    /// `NotAcceptable` without a profile snapshot.
    pub async fn import_medical_record(
        &self,
        incoming: &wire::MedicalRecord,
    ) -> Result<wire::MedicalRecord> {
        let mut record = MedicalRecord::from_wire(incoming)?;
        if record.user_profile.is_none() {
            return Err(MedrecordError::NotAcceptable(
                "Imported medical record has no user profile".to_string(),
            ));
        }
        record.status = RecordStatus::Import;
        record.audit = Default::default();

        let saved = self.stage(record, AuditEventKind::Import).await?;
        tracing::info!(
            record_id = %saved.id.map(|id| id.to_hex()).unwrap_or_default(),
            items = saved.item_count(),
            "Medical record import staged"
        );
        Ok(saved.to_wire())
    }

    /// Loads a complete aggregate
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id; `Forbidden` while the aggregate is
    /// still being exported or imported.
    pub async fn get_medical_record(&self, id: &str) -> Result<wire::MedicalRecord> {
        let record = self.load(id).await?;
        if !record.status.is_complete() {
            return Err(MedrecordError::Forbidden(format!(
                "Medical record {id} is not complete"
            )));
        }

        let actor = self.context.actor()?;
        let payload = self.context.render(&record)?;
        self.context
            .record_event(AuditEventKind::Read, &actor, Some(&record), payload)
            .await?;
        Ok(record.to_wire())
    }

    /// Lists a patient's aggregates, newest first by default
    pub async fn list_medical_records(
        &self,
        patient_id: &str,
        pagination: Option<&Pagination>,
    ) -> Result<ListResponse<wire::MedicalRecord>> {
        let patient_id = Identifier::parse(patient_id)?;
        let page_request = self.context.page_request(pagination);
        let page = self
            .repos
            .medical_records
            .find_all_by_patient_id(&patient_id, &page_request)
            .await?;

        let actor = self.context.actor()?;
        let payloads = page
            .items
            .iter()
            .map(|r| self.context.render(r))
            .collect::<Result<Vec<_>>>()?;
        self.context
            .record_event::<MedicalRecord>(
                AuditEventKind::List,
                &actor,
                None,
                format!("[{}]", payloads.join(",")),
            )
            .await?;

        Ok(ListResponse {
            pagination: Pagination {
                page_number: page.page_number,
                page_size: page.page_size,
                sort: page_request.sort_field.clone(),
                sort_ascending: page_request.sort_ascending,
                total_items: page.total_items,
            },
            items: page.items.iter().map(|r| r.to_wire()).collect(),
        })
    }

    /// Deletes an aggregate; the source collections are not touched
    pub async fn delete_medical_record(&self, id: &str) -> Result<DeleteResponse> {
        let record = self.load(id).await?;
        let actor = self.context.actor()?;
        let payload = self.context.render(&record)?;

        let record_id = record.id.ok_or_else(|| {
            MedrecordError::Database("Stored medical record has no id".to_string())
        })?;
        self.repos.medical_records.delete_by_id(&record_id).await?;
        self.context
            .record_event(AuditEventKind::Delete, &actor, Some(&record), payload)
            .await?;

        Ok(DeleteResponse {
            success: true,
            id: record_id.to_hex(),
        })
    }

    /// Runs the aggregator for one aggregate in the calling task
    pub async fn process_medical_record(&self, id: &str) -> Result<ProcessOutcome> {
        let id = Identifier::parse(id)?;
        self.aggregator.process_medical_record(&id).await
    }

    async fn load(&self, id: &str) -> Result<MedicalRecord> {
        let id = Identifier::parse(id)?;
        self.repos
            .medical_records
            .find_by_id(&id)
            .await?
            .ok_or_else(|| MedrecordError::NotFound(format!("medical_records/{id}")))
    }

    /// Stamps, audits and saves a new aggregate, then schedules processing
    async fn stage(&self, mut record: MedicalRecord, kind: AuditEventKind) -> Result<MedicalRecord> {
        let actor = self.context.actor()?;
        record.id = Some(Identifier::generate());
        record.audit.stamp_created(&actor, Utc::now());

        let payload = self.context.render(&record)?;
        let saved = self.repos.medical_records.save(record).await?;
        self.context
            .record_event(kind, &actor, Some(&saved), payload)
            .await?;

        if self.process_on_request {
            if let Some(id) = saved.id {
                self.spawn_processing(id);
            }
        }
        Ok(saved)
    }

    fn spawn_processing(&self, id: Identifier) {
        let aggregator = Arc::clone(&self.aggregator);
        tokio::spawn(async move {
            match aggregator.process_medical_record(&id).await {
                Ok(outcome) => {
                    tracing::debug!(record_id = %id, outcome = ?outcome, "Background processing finished");
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, "Background medical record processing failed");
                }
            }
        });
    }
}
