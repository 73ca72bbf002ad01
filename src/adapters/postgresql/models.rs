//! PostgreSQL document rows
//!
//! Every collection is a table of `(id, patient_id, national_health_id,
//! data, created, modified)`. The full record lives in `data`; the other
//! columns are copies used for indexing and ordering.

use crate::domain::record::Record;
use crate::domain::{MedrecordError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;

/// One stored document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRow {
    /// Document id, hex
    pub id: String,

    /// Owning patient, hex
    pub patient_id: Option<String>,

    /// Alternate patient identifier
    pub national_health_id: Option<String>,

    /// Serialized record
    pub data: Value,

    /// First save
    pub created: Option<DateTime<Utc>>,

    /// Last save
    pub modified: Option<DateTime<Utc>>,
}

impl DocumentRow {
    /// Builds the row for a record that already has an id
    ///
    /// # Errors
    ///
    /// Returns `Database` if the record has no id and `Serialization` if it
    /// cannot be rendered as JSON.
    pub fn from_record<E: Record>(record: &E) -> Result<Self> {
        let id = record.id().ok_or_else(|| {
            MedrecordError::Database(format!(
                "Cannot store a {} document without an id",
                E::COLLECTION
            ))
        })?;
        Ok(Self {
            id: id.to_hex(),
            patient_id: record.patient_id().map(|p| p.to_hex()),
            national_health_id: record.national_health_id().map(str::to_string),
            data: serde_json::to_value(record)?,
            created: record.audit().created,
            modified: record.audit().modified,
        })
    }
}

/// Decodes the `data` column of a query row
pub fn record_from_row<E: Record>(row: &Row) -> Result<E> {
    let data: Value = row
        .try_get("data")
        .map_err(|e| MedrecordError::Database(format!("Missing data column: {e}")))?;
    decode_document(data)
}

fn decode_document<E: Record>(data: Value) -> Result<E> {
    serde_json::from_value(data).map_err(|e| {
        MedrecordError::Database(format!("Corrupt {} document: {}", E::COLLECTION, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::Identifier;
    use crate::domain::records::{Allergy, Profile};

    #[test]
    fn test_row_requires_id() {
        assert!(DocumentRow::from_record(&Allergy::default()).is_err());
    }

    #[test]
    fn test_row_copies_envelope_columns() {
        let patient = Identifier::generate();
        let mut allergy = Allergy {
            id: Some(Identifier::generate()),
            patient_id: Some(patient),
            national_health_id: Some("NHS-9".to_string()),
            allergen: "pollen".to_string(),
            ..Default::default()
        };
        allergy.audit.stamp_created("u1", Utc::now());

        let row = DocumentRow::from_record(&allergy).unwrap();
        assert_eq!(row.patient_id, Some(patient.to_hex()));
        assert_eq!(row.national_health_id.as_deref(), Some("NHS-9"));
        assert_eq!(row.created, allergy.audit.created);
        assert_eq!(row.data["allergen"], "pollen");

        let back: Allergy = decode_document(row.data).unwrap();
        assert_eq!(back, allergy);
    }

    #[test]
    fn test_profile_row_patient_is_self() {
        let id = Identifier::generate();
        let profile = Profile {
            id: Some(id),
            ..Default::default()
        };
        let row = DocumentRow::from_record(&profile).unwrap();
        assert_eq!(row.patient_id, Some(id.to_hex()));
    }
}
