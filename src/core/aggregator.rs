//! Medical record aggregator
//!
//! Moves a medical record aggregate from `Export` or `Import` to
//! `Complete`:
//!
//! - **Export** reads the patient's records from all thirteen collections
//!   concurrently and snapshots them into the aggregate, refreshing the
//!   profile snapshot at the same time.
//! - **Import** writes every snapshot item back into its home collection
//!   unless a document with the same id already exists. Items without an id
//!   get one, and the aggregate is saved with those ids before anything is
//!   inserted, so an interrupted import can be re-run without duplicates.
//!   Items without a patient are given the aggregate's patient; items owned
//!   by another patient are left out and counted.
//!
//! A missing aggregate is not an error and a complete one is left alone.

use crate::adapters::audit::AuditEventKind;
use crate::adapters::database::factory::{Repositories, SharedRepository};
use crate::adapters::database::traits::{PageRequest, DEFAULT_SORT_FIELD};
use crate::core::context::ServiceContext;
use crate::core::profile::ensure_national_health_id_free;
use crate::domain::codec::WireCodec;
use crate::domain::ids::Identifier;
use crate::domain::record::Record;
use crate::domain::records::{
    Allergy, Bpm, ConnectedLab, Diagnosis, DoctorNotes, HeartRpm, HeightMeasurement,
    MedicalHistory, MedicalRecord, Medication, MedicationAdministration, Profile, RecordStatus,
    SubRecordKind, TemperatureMeasurement, Vaccine, WeightMeasurement,
};
use crate::domain::{MedrecordError, Result};
use crate::{log_aggregation_complete, log_aggregation_start};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;

/// Result of importing one sub-record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTally {
    /// Items written to the collection
    pub inserted: usize,
    /// Items whose id already existed
    pub skipped: usize,
    /// Items owned by another patient
    pub foreign: usize,
}

/// Summary of an export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Items snapshotted per kind
    pub counts: HashMap<SubRecordKind, usize>,
    /// The profile snapshot was replaced with the stored profile
    pub profile_refreshed: bool,
}

impl ExportReport {
    pub fn count(&self, kind: SubRecordKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Summary of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub kinds: HashMap<SubRecordKind, KindTally>,
    /// The owning profile did not exist and was created from the snapshot
    pub profile_restored: bool,
}

impl ImportReport {
    pub fn tally(&self, kind: SubRecordKind) -> KindTally {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn inserted(&self) -> usize {
        self.kinds.values().map(|t| t.inserted).sum()
    }

    pub fn skipped(&self) -> usize {
        self.kinds.values().map(|t| t.skipped).sum()
    }

    pub fn foreign(&self) -> usize {
        self.kinds.values().map(|t| t.foreign).sum()
    }
}

/// What `process_medical_record` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No aggregate with that id
    Missing,
    /// Already complete; nothing changed
    AlreadyComplete,
    Exported(ExportReport),
    Imported(ImportReport),
}

/// Builds and reconciles medical record aggregates
pub struct MedicalRecordAggregator {
    repos: Repositories,
    context: ServiceContext,
}

/// Wire snapshots of every record the patient has in one collection, oldest first
async fn snapshot<E: Record>(
    repo: &SharedRepository<E>,
    patient_id: &Identifier,
) -> Result<Vec<E::Wire>> {
    let everything = PageRequest::new(0, u32::MAX, DEFAULT_SORT_FIELD, true);
    let page = repo.find_all_by_patient_id(patient_id, &everything).await?;
    Ok(page.items.iter().map(|r| r.to_wire()).collect())
}

/// Gives every id-less item a fresh id and every owner-less item `owner`;
/// returns how many items changed
fn stage_items<E: Record>(items: &mut [E::Wire], owner: &Identifier) -> Result<usize> {
    let mut changed = 0;
    for item in items.iter_mut() {
        let mut record = E::from_wire(item)?;
        let missing_id = record.id().is_none();
        let missing_owner = record.patient_id().is_none();
        if missing_id {
            record.set_id(Identifier::generate());
        }
        if missing_owner {
            record.set_patient_id(*owner);
        }
        if missing_id || missing_owner {
            *item = record.to_wire();
            changed += 1;
        }
    }
    Ok(changed)
}

/// Inserts the items owned by `owner` whose id is not yet in `repo`
async fn reconcile<E: Record>(
    repo: &SharedRepository<E>,
    items: &[E::Wire],
    owner: &Identifier,
    actor: &str,
) -> Result<KindTally> {
    let mut tally = KindTally::default();
    for item in items {
        let mut record = E::from_wire(item)?;
        let id = record.id().ok_or_else(|| {
            MedrecordError::Database(format!("Staged {} item has no id", E::COLLECTION))
        })?;

        if record.patient_id() != Some(*owner) {
            tracing::warn!(
                collection = E::COLLECTION,
                item_id = %id,
                patient_id = %owner,
                "Skipping imported item owned by another patient"
            );
            tally.foreign += 1;
            continue;
        }

        if repo.exists_by_id(&id).await? {
            tally.skipped += 1;
            continue;
        }

        if record.audit().created.is_none() {
            record.audit_mut().stamp_created(actor, Utc::now());
        }
        repo.save(record).await?;
        tally.inserted += 1;
    }

    tracing::debug!(
        collection = E::COLLECTION,
        inserted = tally.inserted,
        skipped = tally.skipped,
        foreign = tally.foreign,
        "Collection reconciled"
    );
    Ok(tally)
}

impl MedicalRecordAggregator {
    pub fn new(repos: Repositories, context: ServiceContext) -> Self {
        Self { repos, context }
    }

    /// Brings one aggregate to `Complete`
    ///
    /// # Errors
    ///
    /// Store failures propagate unmodified; a failed run leaves the aggregate
    /// in its previous status so it can be retried.
    pub async fn process_medical_record(&self, id: &Identifier) -> Result<ProcessOutcome> {
        let started = Instant::now();
        let Some(mut record) = self.repos.medical_records.find_by_id(id).await? else {
            tracing::warn!(record_id = %id, "Medical record to process does not exist");
            return Ok(ProcessOutcome::Missing);
        };

        log_aggregation_start!(id, record.status);

        let (outcome, event) = match record.status {
            RecordStatus::Complete => {
                tracing::debug!(record_id = %id, "Medical record already complete");
                return Ok(ProcessOutcome::AlreadyComplete);
            }
            RecordStatus::Export => (
                ProcessOutcome::Exported(self.export(&mut record).await?),
                AuditEventKind::Export,
            ),
            RecordStatus::Import => (
                ProcessOutcome::Imported(self.import(&mut record).await?),
                AuditEventKind::Import,
            ),
        };

        let actor = self.context.actor()?;
        record.status = RecordStatus::Complete;
        record.audit.stamp_modified(&actor, Utc::now());

        let payload = self.context.render(&record)?;
        let saved = self.repos.medical_records.save(record).await?;
        self.context
            .record_event(event, &actor, Some(&saved), payload)
            .await?;

        log_aggregation_complete!(id, saved.item_count(), started.elapsed());
        Ok(outcome)
    }

    async fn export(&self, record: &mut MedicalRecord) -> Result<ExportReport> {
        let patient_id = record.patient_id.ok_or_else(|| {
            MedrecordError::NotAcceptable(format!(
                "Medical record {} has no patient",
                record.id.map(|id| id.to_hex()).unwrap_or_default()
            ))
        })?;
        let r = &self.repos;

        let (
            medications,
            allergies,
            vaccines,
            bpm,
            heart_rpm,
            heights,
            weights,
            temperatures,
            doctor_notes,
            administrations,
            histories,
            diagnoses,
            labs,
            profile,
        ) = futures::try_join!(
            snapshot::<Medication>(&r.medications, &patient_id),
            snapshot::<Allergy>(&r.allergies, &patient_id),
            snapshot::<Vaccine>(&r.vaccines, &patient_id),
            snapshot::<Bpm>(&r.bpm, &patient_id),
            snapshot::<HeartRpm>(&r.heart_rpm, &patient_id),
            snapshot::<HeightMeasurement>(&r.heights, &patient_id),
            snapshot::<WeightMeasurement>(&r.weights, &patient_id),
            snapshot::<TemperatureMeasurement>(&r.temperatures, &patient_id),
            snapshot::<DoctorNotes>(&r.doctor_notes, &patient_id),
            snapshot::<MedicationAdministration>(&r.medication_administrations, &patient_id),
            snapshot::<MedicalHistory>(&r.medical_histories, &patient_id),
            snapshot::<Diagnosis>(&r.diagnoses, &patient_id),
            snapshot::<ConnectedLab>(&r.connected_labs, &patient_id),
            r.profiles.find_by_id(&patient_id),
        )?;

        record.medication_list = medications;
        record.known_allergy_list = allergies;
        record.vaccine_list = vaccines;
        record.bpm_list = bpm;
        record.heart_rpm_list = heart_rpm;
        record.height_list = heights;
        record.weight_list = weights;
        record.temperature_list = temperatures;
        record.doctor_notes_list = doctor_notes;
        record.medication_administration_list = administrations;
        record.medical_history_list = histories;
        record.diagnosis_list = diagnoses;
        record.connected_lab_list = labs;

        let profile_refreshed = match profile {
            Some(profile) => {
                record.set_profile_snapshot(&profile);
                true
            }
            None => {
                tracing::warn!(
                    patient_id = %patient_id,
                    "Patient profile missing; keeping the existing snapshot"
                );
                false
            }
        };

        Ok(ExportReport {
            counts: SubRecordKind::ALL
                .iter()
                .map(|kind| (*kind, record.list_len(*kind)))
                .collect(),
            profile_refreshed,
        })
    }

    async fn import(&self, record: &mut MedicalRecord) -> Result<ImportReport> {
        let actor = self.context.actor()?;

        let staged = self.stage_ids(record)?;
        if staged > 0 {
            *record = self.repos.medical_records.save(record.clone()).await?;
            tracing::debug!(staged, "Assigned ids to imported items");
        }

        let owner = record.patient_id.ok_or_else(|| {
            MedrecordError::NotAcceptable("Imported medical record has no patient".to_string())
        })?;
        let profile_restored = self.restore_profile(record, &actor).await?;
        let r = &self.repos;
        let rec = &*record;
        let o = &owner;

        let tallies = futures::try_join!(
            reconcile::<Medication>(&r.medications, &rec.medication_list, o, &actor),
            reconcile::<Allergy>(&r.allergies, &rec.known_allergy_list, o, &actor),
            reconcile::<Vaccine>(&r.vaccines, &rec.vaccine_list, o, &actor),
            reconcile::<Bpm>(&r.bpm, &rec.bpm_list, o, &actor),
            reconcile::<HeartRpm>(&r.heart_rpm, &rec.heart_rpm_list, o, &actor),
            reconcile::<HeightMeasurement>(&r.heights, &rec.height_list, o, &actor),
            reconcile::<WeightMeasurement>(&r.weights, &rec.weight_list, o, &actor),
            reconcile::<TemperatureMeasurement>(&r.temperatures, &rec.temperature_list, o, &actor),
            reconcile::<DoctorNotes>(&r.doctor_notes, &rec.doctor_notes_list, o, &actor),
            reconcile::<MedicationAdministration>(
                &r.medication_administrations,
                &rec.medication_administration_list,
                o,
                &actor
            ),
            reconcile::<MedicalHistory>(&r.medical_histories, &rec.medical_history_list, o, &actor),
            reconcile::<Diagnosis>(&r.diagnoses, &rec.diagnosis_list, o, &actor),
            reconcile::<ConnectedLab>(&r.connected_labs, &rec.connected_lab_list, o, &actor),
        )?;

        let (a, b, c, d, e, f, g, h, i, j, k, l, m) = tallies;
        let kinds: HashMap<SubRecordKind, KindTally> = SubRecordKind::ALL
            .iter()
            .copied()
            .zip([a, b, c, d, e, f, g, h, i, j, k, l, m])
            .collect();

        for (kind, tally) in &kinds {
            tracing::info!(
                collection = kind.collection(),
                inserted = tally.inserted,
                skipped = tally.skipped,
                foreign = tally.foreign,
                "Imported medical record items"
            );
        }

        Ok(ImportReport {
            kinds,
            profile_restored,
        })
    }

    /// Assigns ids to the profile snapshot and every sub-list item lacking
    /// one, and the aggregate's patient to items without an owner
    fn stage_ids(&self, record: &mut MedicalRecord) -> Result<usize> {
        let mut staged = 0;

        if let Some(snapshot) = record.user_profile.as_mut() {
            let mut profile = Profile::from_wire(snapshot)?;
            if profile.id.is_none() {
                profile.id = Some(Identifier::generate());
                *snapshot = profile.to_wire();
                record.patient_id = profile.id;
                staged += 1;
            }
        }

        let Some(owner) = record.patient_id else {
            return Err(MedrecordError::NotAcceptable(
                "Imported medical record has no patient".to_string(),
            ));
        };
        let owner = &owner;

        staged += stage_items::<Medication>(&mut record.medication_list, owner)?;
        staged += stage_items::<Allergy>(&mut record.known_allergy_list, owner)?;
        staged += stage_items::<Vaccine>(&mut record.vaccine_list, owner)?;
        staged += stage_items::<Bpm>(&mut record.bpm_list, owner)?;
        staged += stage_items::<HeartRpm>(&mut record.heart_rpm_list, owner)?;
        staged += stage_items::<HeightMeasurement>(&mut record.height_list, owner)?;
        staged += stage_items::<WeightMeasurement>(&mut record.weight_list, owner)?;
        staged += stage_items::<TemperatureMeasurement>(&mut record.temperature_list, owner)?;
        staged += stage_items::<DoctorNotes>(&mut record.doctor_notes_list, owner)?;
        staged += stage_items::<MedicationAdministration>(
            &mut record.medication_administration_list,
            owner,
        )?;
        staged += stage_items::<MedicalHistory>(&mut record.medical_history_list, owner)?;
        staged += stage_items::<Diagnosis>(&mut record.diagnosis_list, owner)?;
        staged += stage_items::<ConnectedLab>(&mut record.connected_lab_list, owner)?;

        Ok(staged)
    }

    /// Creates the owning profile from the snapshot when it does not exist
    async fn restore_profile(&self, record: &MedicalRecord, actor: &str) -> Result<bool> {
        let Some(snapshot) = record.user_profile.as_ref() else {
            return Ok(false);
        };
        let mut profile = Profile::from_wire(snapshot)?;
        let Some(id) = profile.id else {
            return Ok(false);
        };
        if self.repos.profiles.exists_by_id(&id).await? {
            return Ok(false);
        }
        ensure_national_health_id_free(
            &self.repos.profiles,
            profile.national_health_id.as_deref(),
            Some(id),
        )
        .await?;

        if profile.audit.created.is_none() {
            profile.audit.stamp_created(actor, Utc::now());
        }
        self.repos.profiles.save(profile).await?;
        tracing::info!(patient_id = %id, "Restored patient profile from medical record");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::MemoryAuditSink;
    use crate::adapters::identity::StaticUserResolver;
    use crate::domain::wire;
    use std::sync::Arc;

    fn aggregator(repos: &Repositories) -> MedicalRecordAggregator {
        let context = ServiceContext::new(
            Arc::new(StaticUserResolver::new("system")),
            Arc::new(MemoryAuditSink::new()),
        );
        MedicalRecordAggregator::new(repos.clone(), context)
    }

    #[tokio::test]
    async fn test_missing_record_is_soft_noop() {
        let repos = Repositories::in_memory();
        let outcome = aggregator(&repos)
            .process_medical_record(&Identifier::generate())
            .await
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Missing);
    }

    #[tokio::test]
    async fn test_export_without_patient_fails_and_keeps_status() {
        let repos = Repositories::in_memory();
        let record = MedicalRecord {
            status: RecordStatus::Export,
            ..Default::default()
        };
        let saved = repos.medical_records.save(record).await.unwrap();
        let id = saved.id.unwrap();

        let err = aggregator(&repos).process_medical_record(&id).await.unwrap_err();
        assert!(matches!(err, MedrecordError::NotAcceptable(_)));

        let stored = repos.medical_records.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, RecordStatus::Export);
    }

    #[test]
    fn test_stage_items_only_fills_missing() {
        let owner = Identifier::generate();
        let stranger = Identifier::generate();
        let existing = Identifier::generate();
        let mut items = vec![
            wire::Allergy {
                id: existing.to_hex(),
                patient_id: owner.to_hex(),
                ..Default::default()
            },
            wire::Allergy::default(),
            wire::Allergy {
                id: Identifier::generate().to_hex(),
                patient_id: stranger.to_hex(),
                ..Default::default()
            },
        ];
        assert_eq!(stage_items::<Allergy>(&mut items, &owner).unwrap(), 1);
        assert_eq!(items[0].id, existing.to_hex());
        assert!(Identifier::parse(&items[1].id).is_ok());
        assert_eq!(items[1].patient_id, owner.to_hex());
        assert_eq!(items[2].patient_id, stranger.to_hex());
        assert_eq!(stage_items::<Allergy>(&mut items, &owner).unwrap(), 0);
    }

    #[test]
    fn test_import_report_totals() {
        let mut report = ImportReport::default();
        report.kinds.insert(
            SubRecordKind::Allergy,
            KindTally {
                inserted: 2,
                skipped: 1,
                foreign: 0,
            },
        );
        report.kinds.insert(
            SubRecordKind::Vaccine,
            KindTally {
                inserted: 1,
                skipped: 0,
                foreign: 2,
            },
        );
        assert_eq!(report.inserted(), 3);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.foreign(), 2);
        assert_eq!(report.tally(SubRecordKind::Bpm), KindTally::default());
    }
}
