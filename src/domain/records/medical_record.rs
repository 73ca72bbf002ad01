//! Medical record aggregate
//!
//! A consolidated, point-in-time snapshot of everything known about one
//! patient. The thirteen sub-lists hold wire-form copies of the source
//! records so that an aggregate can be exported or imported as a single
//! message. Only the aggregator moves an aggregate out of `Export` or
//! `Import`, and nothing moves it out of `Complete`.

use super::profile::Profile;
use super::SubRecordKind;
use crate::domain::codec::WireCodec;
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire;
use crate::record_envelope;
use serde::{Deserialize, Serialize};

pub use crate::domain::wire::MedicalRecordStatus as RecordStatus;

impl RecordStatus {
    /// Whether the aggregate may be disclosed to callers
    pub fn is_complete(&self) -> bool {
        matches!(self, RecordStatus::Complete)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Option<Identifier>,
    /// Copied from the profile snapshot
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub status: RecordStatus,
    /// Identity/demographics at aggregation time
    pub user_profile: Option<wire::Profile>,
    pub medication_list: Vec<wire::Medication>,
    pub known_allergy_list: Vec<wire::Allergy>,
    pub vaccine_list: Vec<wire::Vaccine>,
    pub bpm_list: Vec<wire::Bpm>,
    pub heart_rpm_list: Vec<wire::HeartRpm>,
    pub height_list: Vec<wire::Measurement>,
    pub weight_list: Vec<wire::Measurement>,
    pub temperature_list: Vec<wire::TemperatureMeasurement>,
    pub doctor_notes_list: Vec<wire::DoctorNotes>,
    pub medication_administration_list: Vec<wire::MedicationAdministration>,
    pub medical_history_list: Vec<wire::MedicalHistory>,
    pub diagnosis_list: Vec<wire::Diagnosis>,
    pub connected_lab_list: Vec<wire::ConnectedLab>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl MedicalRecord {
    /// Starts an aggregate for `profile` with empty sub-lists
    pub fn from_profile(profile: &Profile, status: RecordStatus) -> Self {
        Self {
            patient_id: profile.id,
            national_health_id: profile.national_health_id.clone(),
            status,
            user_profile: Some(profile.to_wire()),
            ..Default::default()
        }
    }

    /// Replaces the profile snapshot and the patient fields derived from it
    pub fn set_profile_snapshot(&mut self, profile: &Profile) {
        self.patient_id = profile.id;
        self.national_health_id = profile.national_health_id.clone();
        self.user_profile = Some(profile.to_wire());
    }

    /// Number of items held for one sub-record kind
    pub fn list_len(&self, kind: SubRecordKind) -> usize {
        match kind {
            SubRecordKind::Medication => self.medication_list.len(),
            SubRecordKind::Allergy => self.known_allergy_list.len(),
            SubRecordKind::Vaccine => self.vaccine_list.len(),
            SubRecordKind::Bpm => self.bpm_list.len(),
            SubRecordKind::HeartRpm => self.heart_rpm_list.len(),
            SubRecordKind::Height => self.height_list.len(),
            SubRecordKind::Weight => self.weight_list.len(),
            SubRecordKind::Temperature => self.temperature_list.len(),
            SubRecordKind::DoctorNotes => self.doctor_notes_list.len(),
            SubRecordKind::MedicationAdministration => self.medication_administration_list.len(),
            SubRecordKind::MedicalHistory => self.medical_history_list.len(),
            SubRecordKind::Diagnosis => self.diagnosis_list.len(),
            SubRecordKind::ConnectedLab => self.connected_lab_list.len(),
        }
    }

    /// Total number of sub-list items
    pub fn item_count(&self) -> usize {
        SubRecordKind::ALL.iter().map(|k| self.list_len(*k)).sum()
    }
}

fn patient_from_snapshot(profile: Option<&wire::Profile>) -> Result<Option<Identifier>> {
    let Some(profile) = profile else {
        return Ok(None);
    };
    match Identifier::parse_optional(&profile.patient_id)? {
        Some(id) => Ok(Some(id)),
        None => Identifier::parse_optional(&profile.id),
    }
}

impl WireCodec for MedicalRecord {
    type Wire = wire::MedicalRecord;

    fn from_wire(w: &wire::MedicalRecord) -> Result<Self> {
        Ok(Self {
            id: Identifier::parse_optional(&w.id)?,
            patient_id: patient_from_snapshot(w.user_profile.as_ref())?,
            national_health_id: w
                .user_profile
                .as_ref()
                .and_then(|p| p.national_health_id.clone()),
            status: w.status(),
            user_profile: w.user_profile.clone(),
            medication_list: w.medication_list.clone(),
            known_allergy_list: w.known_allergy_list.clone(),
            vaccine_list: w.vaccine_list.clone(),
            bpm_list: w.bpm_list.clone(),
            heart_rpm_list: w.heart_rpm_list.clone(),
            height_list: w.height_list.clone(),
            weight_list: w.weight_list.clone(),
            temperature_list: w.temperature_list.clone(),
            doctor_notes_list: w.doctor_notes_list.clone(),
            medication_administration_list: w.medication_administration_list.clone(),
            medical_history_list: w.medical_history_list.clone(),
            diagnosis_list: w.diagnosis_list.clone(),
            connected_lab_list: w.connected_lab_list.clone(),
            audit: AuditFields::from_wire(
                w.created.as_ref(),
                w.modified.as_ref(),
                &w.creator,
                &w.modifier,
            )?,
        })
    }

    fn to_wire(&self) -> wire::MedicalRecord {
        wire::MedicalRecord {
            id: optional_hex(self.id.as_ref()),
            status: self.status as i32,
            user_profile: self.user_profile.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            medication_list: self.medication_list.clone(),
            known_allergy_list: self.known_allergy_list.clone(),
            vaccine_list: self.vaccine_list.clone(),
            bpm_list: self.bpm_list.clone(),
            heart_rpm_list: self.heart_rpm_list.clone(),
            height_list: self.height_list.clone(),
            weight_list: self.weight_list.clone(),
            temperature_list: self.temperature_list.clone(),
            doctor_notes_list: self.doctor_notes_list.clone(),
            medication_administration_list: self.medication_administration_list.clone(),
            medical_history_list: self.medical_history_list.clone(),
            diagnosis_list: self.diagnosis_list.clone(),
            connected_lab_list: self.connected_lab_list.clone(),
        }
    }

    /// Only the profile snapshot is caller-updatable; status and sub-lists
    /// belong to the aggregator
    fn apply_update(&mut self, w: &wire::MedicalRecord) -> Result<()> {
        if let Some(profile) = &w.user_profile {
            let patient_id = patient_from_snapshot(Some(profile))?;
            self.patient_id = patient_id.or(self.patient_id);
            self.national_health_id = profile.national_health_id.clone();
            self.user_profile = Some(profile.clone());
        }
        Ok(())
    }
}

impl Record for MedicalRecord {
    const COLLECTION: &'static str = "medical_records";
    const LIST_POLICY: ListPolicy = ListPolicy::plain();
    const PATIENT_SCOPED: bool = false;

    record_envelope!();
}
