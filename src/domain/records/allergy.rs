//! Allergy records

use crate::domain::codec::{
    merge, merge_timestamp, optional_timestamp_from_wire, optional_timestamp_to_wire, WireCodec,
};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire;
use crate::record_envelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known allergy of a patient
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Allergy {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub allergen: String,
    pub reaction: String,
    pub category: String,
    pub is_severe: bool,
    pub onset_date: Option<DateTime<Utc>>,
    pub note: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Allergy {
    type Wire = wire::Allergy;

    fn from_wire(w: &wire::Allergy) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            allergen: w.allergen.clone().unwrap_or_default(),
            reaction: w.reaction.clone().unwrap_or_default(),
            category: w.category.clone().unwrap_or_default(),
            is_severe: w.is_severe.unwrap_or_default(),
            onset_date: optional_timestamp_from_wire(w.onset_date.as_ref())?,
            note: w.note.clone().unwrap_or_default(),
            audit,
        })
    }

    fn to_wire(&self) -> wire::Allergy {
        wire::Allergy {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            allergen: Some(self.allergen.clone()),
            reaction: Some(self.reaction.clone()),
            category: Some(self.category.clone()),
            is_severe: Some(self.is_severe),
            onset_date: optional_timestamp_to_wire(self.onset_date.as_ref()),
            note: Some(self.note.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::Allergy) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.onset_date, w.onset_date.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.allergen, &w.allergen);
        merge(&mut next.reaction, &w.reaction);
        merge(&mut next.category, &w.category);
        merge(&mut next.is_severe, &w.is_severe);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for Allergy {
    const COLLECTION: &'static str = "allergies";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("onset_date");

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.onset_date
    }
}
