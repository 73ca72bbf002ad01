//! Lab results received from connected laboratories

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
pub struct ConnectedLab {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub lab_name: String,
    pub test_name: String,
    pub result_value: String,
    pub unit: String,
    pub reference_range: String,
    pub tags: Vec<String>,
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for ConnectedLab {
    type Wire = wire::ConnectedLab;

    fn from_wire(w: &wire::ConnectedLab) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            lab_name: w.lab_name.clone().unwrap_or_default(),
            test_name: w.test_name.clone().unwrap_or_default(),
            result_value: w.result_value.clone().unwrap_or_default(),
            unit: w.unit.clone().unwrap_or_default(),
            reference_range: w.reference_range.clone().unwrap_or_default(),
            tags: w.tags.clone(),
            collected_at: optional_timestamp_from_wire(w.collected_at.as_ref())?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::ConnectedLab {
        wire::ConnectedLab {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            lab_name: Some(self.lab_name.clone()),
            test_name: Some(self.test_name.clone()),
            result_value: Some(self.result_value.clone()),
            unit: Some(self.unit.clone()),
            reference_range: Some(self.reference_range.clone()),
            tags: self.tags.clone(),
            collected_at: optional_timestamp_to_wire(self.collected_at.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::ConnectedLab) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.collected_at, w.collected_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        if !w.tags.is_empty() {
            next.tags = w.tags.clone();
        }
        merge(&mut next.lab_name, &w.lab_name);
        merge(&mut next.test_name, &w.test_name);
        merge(&mut next.result_value, &w.result_value);
        merge(&mut next.unit, &w.unit);
        merge(&mut next.reference_range, &w.reference_range);
        *self = next;
        Ok(())
    }
}

impl Record for ConnectedLab {
    const COLLECTION: &'static str = "connected_labs";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("collected_at").with_tags();

    record_envelope!();

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.collected_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::test_support::{assert_round_trip, text, ts};
    use test_case::test_case;

    #[test]
    fn test_lab_accepts_ascending_sort() {
        assert!(ConnectedLab::LIST_POLICY.allow_ascending);
        assert!(ConnectedLab::LIST_POLICY.tags);
    }

    #[test]
    fn test_result_value_update() {
        let mut lab = ConnectedLab::from_wire(&wire::ConnectedLab {
            test_name: Some("HbA1c".to_string()),
            result_value: Some("6.1".to_string()),
            unit: Some("%".to_string()),
            tags: vec!["diabetes".to_string()],
            ..Default::default()
        })
        .unwrap();
        lab.apply_update(&wire::ConnectedLab {
            result_value: Some("5.9".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(lab.result_value, "5.9");
        assert_eq!(lab.unit, "%");
        assert_eq!(lab.tags(), ["diabetes"]);
    }
    fn full_lab() -> wire::ConnectedLab {
        full_wire!(wire::ConnectedLab {
            lab_name: text("North Lab"),
            test_name: text("HbA1c"),
            result_value: text("5.6"),
            unit: text("%"),
            reference_range: text("4.0-5.6"),
            tags: vec!["diabetes".to_string(), "annual".to_string()],
            collected_at: ts(1_696_800_000),
        })
    }

    #[test_case(full_lab(), true; "all fields present")]
    #[test_case(wire::ConnectedLab::default(), false; "all fields absent")]
    fn test_connected_lab_round_trip(msg: wire::ConnectedLab, all_present: bool) {
        assert_round_trip::<ConnectedLab>(&msg, all_present);
    }
}
