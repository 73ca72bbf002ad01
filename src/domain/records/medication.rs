//! Medications and their administrations

use crate::domain::codec::{
    enum_from_wire, merge, merge_timestamp, optional_timestamp_from_wire,
    optional_timestamp_to_wire, WireCodec,
};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire::{self, AdministrationStatus};
use crate::record_envelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prescribed medication
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Medication {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: String,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Prescribing provider
    pub prescribed_by: Option<Identifier>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Medication {
    type Wire = wire::Medication;

    fn from_wire(w: &wire::Medication) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            name: w.name.clone().unwrap_or_default(),
            dosage: w.dosage.clone().unwrap_or_default(),
            frequency: w.frequency.clone().unwrap_or_default(),
            route: w.route.clone().unwrap_or_default(),
            is_active: w.is_active.unwrap_or_default(),
            start_date: optional_timestamp_from_wire(w.start_date.as_ref())?,
            end_date: optional_timestamp_from_wire(w.end_date.as_ref())?,
            prescribed_by: Identifier::parse_optional(&w.prescribed_by)?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::Medication {
        wire::Medication {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            name: Some(self.name.clone()),
            dosage: Some(self.dosage.clone()),
            frequency: Some(self.frequency.clone()),
            route: Some(self.route.clone()),
            is_active: Some(self.is_active),
            start_date: optional_timestamp_to_wire(self.start_date.as_ref()),
            end_date: optional_timestamp_to_wire(self.end_date.as_ref()),
            prescribed_by: optional_hex(self.prescribed_by.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::Medication) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.start_date, w.start_date.as_ref())?;
        merge_timestamp(&mut next.end_date, w.end_date.as_ref())?;
        if let Some(prescriber) = Identifier::parse_optional(&w.prescribed_by)? {
            next.prescribed_by = Some(prescriber);
        }
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.name, &w.name);
        merge(&mut next.dosage, &w.dosage);
        merge(&mut next.frequency, &w.frequency);
        merge(&mut next.route, &w.route);
        merge(&mut next.is_active, &w.is_active);
        *self = next;
        Ok(())
    }
}

impl Record for Medication {
    const COLLECTION: &'static str = "medications";
    const LIST_POLICY: ListPolicy = ListPolicy::dated("start_date");

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }
}

/// One administration event of a medication
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MedicationAdministration {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub medication_id: Option<Identifier>,
    pub dose: String,
    pub status: AdministrationStatus,
    pub administered_at: Option<DateTime<Utc>>,
    pub note: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for MedicationAdministration {
    type Wire = wire::MedicationAdministration;

    fn from_wire(w: &wire::MedicationAdministration) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            medication_id: Identifier::parse_optional(&w.medication_id)?,
            dose: w.dose.clone().unwrap_or_default(),
            status: enum_from_wire(w.status),
            administered_at: optional_timestamp_from_wire(w.administered_at.as_ref())?,
            note: w.note.clone().unwrap_or_default(),
            audit,
        })
    }

    fn to_wire(&self) -> wire::MedicationAdministration {
        wire::MedicationAdministration {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            medication_id: optional_hex(self.medication_id.as_ref()),
            dose: Some(self.dose.clone()),
            status: Some(self.status as i32),
            administered_at: optional_timestamp_to_wire(self.administered_at.as_ref()),
            note: Some(self.note.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::MedicationAdministration) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.administered_at, w.administered_at.as_ref())?;
        if let Some(medication_id) = Identifier::parse_optional(&w.medication_id)? {
            next.medication_id = Some(medication_id);
        }
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        if w.status.is_some() {
            next.status = enum_from_wire(w.status);
        }
        merge(&mut next.dose, &w.dose);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for MedicationAdministration {
    const COLLECTION: &'static str = "medication_administrations";
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
    fn test_unknown_status_number_falls_back() {
        let admin = MedicationAdministration::from_wire(&wire::MedicationAdministration {
            status: Some(99),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(admin.status, AdministrationStatus::Unspecified);
    }

    #[test]
    fn test_status_round_trip() {
        let admin = MedicationAdministration::from_wire(&wire::MedicationAdministration {
            status: Some(AdministrationStatus::Refused as i32),
            dose: Some("5mg".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(admin.status, AdministrationStatus::Refused);
        assert_eq!(admin.to_wire().status, Some(3));
    }

    #[test]
    fn test_medication_update_end_date() {
        let mut medication = Medication {
            name: "Lisinopril".to_string(),
            is_active: true,
            ..Default::default()
        };
        medication
            .apply_update(&wire::Medication {
                is_active: Some(false),
                end_date: Some(wire::Timestamp {
                    seconds: 1_700_000_000,
                    nanos: 0,
                }),
                ..Default::default()
            })
            .unwrap();
        assert!(!medication.is_active);
        assert_eq!(medication.end_date.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(medication.name, "Lisinopril");
    }

    #[test]
    fn test_malformed_prescriber_rejected() {
        let result = Medication::from_wire(&wire::Medication {
            prescribed_by: "dr-house".to_string(),
            ..Default::default()
        });
        assert!(result.is_err());
    }
    fn full_medication() -> wire::Medication {
        full_wire!(wire::Medication {
            name: text("Metformin"),
            dosage: text("500 mg"),
            frequency: text("twice daily"),
            route: text("oral"),
            is_active: Some(true),
            start_date: ts(1_690_000_000),
            end_date: ts(1_700_000_000),
            prescribed_by: OTHER.to_string(),
        })
    }

    fn full_administration() -> wire::MedicationAdministration {
        full_wire!(wire::MedicationAdministration {
            medication_id: OTHER.to_string(),
            dose: text("500 mg"),
            status: Some(AdministrationStatus::Held as i32),
            administered_at: ts(1_695_000_000),
            note: text("held for procedure"),
        })
    }

    #[test_case(full_medication(), true; "all fields present")]
    #[test_case(wire::Medication::default(), false; "all fields absent")]
    fn test_medication_round_trip(msg: wire::Medication, all_present: bool) {
        assert_round_trip::<Medication>(&msg, all_present);
    }

    #[test_case(full_administration(), true; "all fields present")]
    #[test_case(wire::MedicationAdministration::default(), false; "all fields absent")]
    fn test_administration_round_trip(msg: wire::MedicationAdministration, all_present: bool) {
        assert_round_trip::<MedicationAdministration>(&msg, all_present);
    }
}
