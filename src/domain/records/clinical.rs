//! Medical history entries and diagnoses

use crate::domain::codec::{
    enum_from_wire, merge, merge_timestamp, optional_timestamp_from_wire,
    optional_timestamp_to_wire, WireCodec,
};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire::{self, DiagnosisStatus};
use crate::record_envelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A past or ongoing condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub condition: String,
    pub note: String,
    pub diagnosed_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for MedicalHistory {
    type Wire = wire::MedicalHistory;

    fn from_wire(w: &wire::MedicalHistory) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            condition: w.condition.clone().unwrap_or_default(),
            note: w.note.clone().unwrap_or_default(),
            diagnosed_at: optional_timestamp_from_wire(w.diagnosed_at.as_ref())?,
            resolved_at: optional_timestamp_from_wire(w.resolved_at.as_ref())?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::MedicalHistory {
        wire::MedicalHistory {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            condition: Some(self.condition.clone()),
            note: Some(self.note.clone()),
            diagnosed_at: optional_timestamp_to_wire(self.diagnosed_at.as_ref()),
            resolved_at: optional_timestamp_to_wire(self.resolved_at.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::MedicalHistory) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.diagnosed_at, w.diagnosed_at.as_ref())?;
        merge_timestamp(&mut next.resolved_at, w.resolved_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.condition, &w.condition);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for MedicalHistory {
    const COLLECTION: &'static str = "medical_histories";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("diagnosed_at");

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.diagnosed_at
    }
}

/// A coded diagnosis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnosis {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    /// Classification code, e.g. ICD-10
    pub code: String,
    pub description: String,
    pub status: DiagnosisStatus,
    pub diagnosed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Diagnosis {
    type Wire = wire::Diagnosis;

    fn from_wire(w: &wire::Diagnosis) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            code: w.code.clone().unwrap_or_default(),
            description: w.description.clone().unwrap_or_default(),
            status: enum_from_wire(w.status),
            diagnosed_at: optional_timestamp_from_wire(w.diagnosed_at.as_ref())?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::Diagnosis {
        wire::Diagnosis {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            code: Some(self.code.clone()),
            description: Some(self.description.clone()),
            status: Some(self.status as i32),
            diagnosed_at: optional_timestamp_to_wire(self.diagnosed_at.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::Diagnosis) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.diagnosed_at, w.diagnosed_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        if w.status.is_some() {
            next.status = enum_from_wire(w.status);
        }
        merge(&mut next.code, &w.code);
        merge(&mut next.description, &w.description);
        *self = next;
        Ok(())
    }
}

impl Record for Diagnosis {
    const COLLECTION: &'static str = "diagnoses";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("diagnosed_at");

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.diagnosed_at
    }
}
