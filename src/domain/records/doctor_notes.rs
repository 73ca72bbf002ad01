//! Doctor notes
//!
//! Free-text notes written by a provider. Notes carry tags, filter on
//! `note_datetime` and only list in descending order.

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

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DoctorNotes {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub title: String,
    pub note: String,
    pub tags: Vec<String>,
    pub note_datetime: Option<DateTime<Utc>>,
    pub provider_id: Option<Identifier>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for DoctorNotes {
    type Wire = wire::DoctorNotes;

    fn from_wire(w: &wire::DoctorNotes) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            title: w.title.clone().unwrap_or_default(),
            note: w.note.clone().unwrap_or_default(),
            tags: w.tags.clone(),
            note_datetime: optional_timestamp_from_wire(w.note_datetime.as_ref())?,
            provider_id: Identifier::parse_optional(&w.provider_id)?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::DoctorNotes {
        wire::DoctorNotes {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            title: Some(self.title.clone()),
            note: Some(self.note.clone()),
            tags: self.tags.clone(),
            note_datetime: optional_timestamp_to_wire(self.note_datetime.as_ref()),
            provider_id: optional_hex(self.provider_id.as_ref()),
        }
    }

    /// An empty tag list or provider id on the wire means "unchanged"
    fn apply_update(&mut self, w: &wire::DoctorNotes) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.note_datetime, w.note_datetime.as_ref())?;
        if let Some(provider_id) = Identifier::parse_optional(&w.provider_id)? {
            next.provider_id = Some(provider_id);
        }
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        if !w.tags.is_empty() {
            next.tags = w.tags.clone();
        }
        merge(&mut next.title, &w.title);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for DoctorNotes {
    const COLLECTION: &'static str = "doctor_notes";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("note_datetime")
        .with_tags()
        .descending_only();

    record_envelope!();

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.note_datetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::test_support::{assert_round_trip, text, ts, OTHER};
    use test_case::test_case;

    #[test]
    fn test_tags_and_provider_survive_round_trip() {
        let w = wire::DoctorNotes {
            title: Some("Follow-up".to_string()),
            tags: vec!["cardio".to_string(), "urgent".to_string()],
            provider_id: "65228f30a1b2c3d4e5f60718".to_string(),
            ..Default::default()
        };
        let notes = DoctorNotes::from_wire(&w).unwrap();
        assert_eq!(notes.tags(), ["cardio", "urgent"]);
        assert!(notes.provider_id.is_some());
        assert_eq!(notes.to_wire().provider_id, w.provider_id);
    }

    #[test]
    fn test_empty_tags_on_update_keep_existing() {
        let mut notes = DoctorNotes {
            tags: vec!["cardio".to_string()],
            ..Default::default()
        };
        notes
            .apply_update(&wire::DoctorNotes {
                note: Some("stable".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(notes.tags, vec!["cardio".to_string()]);
        assert_eq!(notes.note, "stable");
    }

    #[test]
    fn test_policy() {
        let policy = DoctorNotes::LIST_POLICY;
        assert!(policy.tags);
        assert!(!policy.allow_ascending);
        assert_eq!(policy.date_field, Some("note_datetime"));
    }
    fn full_notes() -> wire::DoctorNotes {
        full_wire!(wire::DoctorNotes {
            title: text("Follow-up"),
            note: text("BP improving"),
            tags: vec!["cardio".to_string()],
            note_datetime: ts(1_696_800_000),
            provider_id: OTHER.to_string(),
        })
    }

    #[test_case(full_notes(), true; "all fields present")]
    #[test_case(wire::DoctorNotes::default(), false; "all fields absent")]
    fn test_doctor_notes_round_trip(msg: wire::DoctorNotes, all_present: bool) {
        assert_round_trip::<DoctorNotes>(&msg, all_present);
    }
}
