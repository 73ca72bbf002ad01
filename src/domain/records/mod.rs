//! Clinical record models
//!
//! One module per entity family. The thirteen kinds collected into a
//! medical record aggregate are listed in [`SubRecordKind`]; profiles and
//! providers are top-level documents that are not aggregated.

/// Reads the generic envelope fields of a wire message
///
/// Expands to `(id, patient_id, national_health_id, audit)` and propagates
/// identifier/timestamp errors with `?`.
macro_rules! envelope_from_wire {
    ($wire:expr) => {{
        let source = $wire;
        (
            $crate::domain::ids::Identifier::parse_optional(&source.id)?,
            $crate::domain::ids::Identifier::parse_optional(&source.patient_id)?,
            source.national_health_id.clone(),
            $crate::domain::record::AuditFields::from_wire(
                source.created.as_ref(),
                source.modified.as_ref(),
                &source.creator,
                &source.modifier,
            )?,
        )
    }};
}

/// Builds a wire message with every envelope field populated
#[cfg(test)]
macro_rules! full_wire {
    ($($ty:ident)::+ { $($field:ident: $value:expr),* $(,)? }) => {
        $($ty)::+ {
            id: $crate::domain::records::test_support::ID.to_string(),
            patient_id: $crate::domain::records::test_support::PATIENT.to_string(),
            national_health_id: Some("NH-1".to_string()),
            created: $crate::domain::records::test_support::ts(1_696_733_104),
            modified: $crate::domain::records::test_support::ts(1_696_740_000),
            creator: "creator-1".to_string(),
            modifier: "modifier-2".to_string(),
            $($field: $value),*
        }
    };
}

pub mod allergy;
pub mod clinical;
pub mod connected_lab;
pub mod doctor_notes;
pub mod medical_record;
pub mod medication;
pub mod profile;
pub mod provider;
pub mod vaccine;
pub mod vitals;

pub use allergy::Allergy;
pub use clinical::{Diagnosis, MedicalHistory};
pub use connected_lab::ConnectedLab;
pub use doctor_notes::DoctorNotes;
pub use medical_record::{MedicalRecord, RecordStatus};
pub use medication::{Medication, MedicationAdministration};
pub use profile::Profile;
pub use provider::Provider;
pub use vaccine::Vaccine;
pub use vitals::{Bpm, HeartRpm, HeightMeasurement, TemperatureMeasurement, WeightMeasurement};

/// The thirteen sub-record kinds of a medical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubRecordKind {
    Medication,
    Allergy,
    Vaccine,
    Bpm,
    HeartRpm,
    Height,
    Weight,
    Temperature,
    DoctorNotes,
    MedicationAdministration,
    MedicalHistory,
    Diagnosis,
    ConnectedLab,
}

impl SubRecordKind {
    /// All kinds, in aggregate list order
    pub const ALL: [SubRecordKind; 13] = [
        SubRecordKind::Medication,
        SubRecordKind::Allergy,
        SubRecordKind::Vaccine,
        SubRecordKind::Bpm,
        SubRecordKind::HeartRpm,
        SubRecordKind::Height,
        SubRecordKind::Weight,
        SubRecordKind::Temperature,
        SubRecordKind::DoctorNotes,
        SubRecordKind::MedicationAdministration,
        SubRecordKind::MedicalHistory,
        SubRecordKind::Diagnosis,
        SubRecordKind::ConnectedLab,
    ];

    /// Collection backing this kind
    pub fn collection(&self) -> &'static str {
        use crate::domain::record::Record;
        match self {
            SubRecordKind::Medication => Medication::COLLECTION,
            SubRecordKind::Allergy => Allergy::COLLECTION,
            SubRecordKind::Vaccine => Vaccine::COLLECTION,
            SubRecordKind::Bpm => Bpm::COLLECTION,
            SubRecordKind::HeartRpm => HeartRpm::COLLECTION,
            SubRecordKind::Height => HeightMeasurement::COLLECTION,
            SubRecordKind::Weight => WeightMeasurement::COLLECTION,
            SubRecordKind::Temperature => TemperatureMeasurement::COLLECTION,
            SubRecordKind::DoctorNotes => DoctorNotes::COLLECTION,
            SubRecordKind::MedicationAdministration => MedicationAdministration::COLLECTION,
            SubRecordKind::MedicalHistory => MedicalHistory::COLLECTION,
            SubRecordKind::Diagnosis => Diagnosis::COLLECTION,
            SubRecordKind::ConnectedLab => ConnectedLab::COLLECTION,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sub_record_collections_are_distinct() {
        let names: HashSet<_> = SubRecordKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(names.len(), 13);
    }
}
