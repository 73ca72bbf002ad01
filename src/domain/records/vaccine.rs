//! Vaccination records

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

/// One administered vaccine dose
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub name: String,
    pub manufacturer: String,
    pub lot_number: String,
    pub dose_number: i32,
    pub administered_at: Option<DateTime<Utc>>,
    /// Administering provider
    pub provider_id: Option<Identifier>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Vaccine {
    type Wire = wire::Vaccine;

    fn from_wire(w: &wire::Vaccine) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            name: w.name.clone().unwrap_or_default(),
            manufacturer: w.manufacturer.clone().unwrap_or_default(),
            lot_number: w.lot_number.clone().unwrap_or_default(),
            dose_number: w.dose_number.unwrap_or_default(),
            administered_at: optional_timestamp_from_wire(w.administered_at.as_ref())?,
            provider_id: Identifier::parse_optional(&w.provider_id)?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::Vaccine {
        wire::Vaccine {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            name: Some(self.name.clone()),
            manufacturer: Some(self.manufacturer.clone()),
            lot_number: Some(self.lot_number.clone()),
            dose_number: Some(self.dose_number),
            administered_at: optional_timestamp_to_wire(self.administered_at.as_ref()),
            provider_id: optional_hex(self.provider_id.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::Vaccine) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.administered_at, w.administered_at.as_ref())?;
        if let Some(provider_id) = Identifier::parse_optional(&w.provider_id)? {
            next.provider_id = Some(provider_id);
        }
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.name, &w.name);
        merge(&mut next.manufacturer, &w.manufacturer);
        merge(&mut next.lot_number, &w.lot_number);
        merge(&mut next.dose_number, &w.dose_number);
        *self = next;
        Ok(())
    }
}

impl Record for Vaccine {
    const COLLECTION: &'static str = "vaccines";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("administered_at");

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.administered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::test_support::{assert_round_trip, text, ts, OTHER};
    use test_case::test_case;

    #[test]
    fn test_zero_dose_number_is_explicit_on_wire() {
        let vaccine = Vaccine::from_wire(&wire::Vaccine {
            name: Some("MMR".to_string()),
            ..Default::default()
        })
        .unwrap();
        let w = vaccine.to_wire();
        assert_eq!(w.dose_number, Some(0));
        assert_eq!(w.provider_id, "");
    }

    #[test]
    fn test_update_dose_number() {
        let mut vaccine = Vaccine {
            name: "MMR".to_string(),
            dose_number: 1,
            ..Default::default()
        };
        vaccine
            .apply_update(&wire::Vaccine {
                dose_number: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(vaccine.dose_number, 2);
        assert_eq!(vaccine.name, "MMR");
    }
    fn full_vaccine() -> wire::Vaccine {
        full_wire!(wire::Vaccine {
            name: text("MMR"),
            manufacturer: text("Merck"),
            lot_number: text("L-2231"),
            dose_number: Some(2),
            administered_at: ts(1_696_800_000),
            provider_id: OTHER.to_string(),
        })
    }

    #[test_case(full_vaccine(), true; "all fields present")]
    #[test_case(wire::Vaccine::default(), false; "all fields absent")]
    fn test_vaccine_round_trip(msg: wire::Vaccine, all_present: bool) {
        assert_round_trip::<Vaccine>(&msg, all_present);
    }
}
