//! Patient profiles
//!
//! A profile is the patient. Its `patient_id` is its own `id`, so the
//! profile collection is what patient-scoped records are checked against.

use crate::domain::codec::{
    merge, merge_timestamp, optional_timestamp_from_wire, optional_timestamp_to_wire, WireCodec,
};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity and demographic data of a patient
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub id: Option<Identifier>,
    /// Unique across profiles when set
    pub national_health_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub gender: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Profile {
    type Wire = wire::Profile;

    /// A non-empty wire `patient_id` is accepted as the id when `id` is empty
    fn from_wire(w: &wire::Profile) -> Result<Self> {
        let id = match Identifier::parse_optional(&w.id)? {
            Some(id) => Some(id),
            None => Identifier::parse_optional(&w.patient_id)?,
        };
        Ok(Self {
            id,
            national_health_id: w.national_health_id.clone(),
            first_name: w.first_name.clone().unwrap_or_default(),
            last_name: w.last_name.clone().unwrap_or_default(),
            date_of_birth: optional_timestamp_from_wire(w.date_of_birth.as_ref())?,
            gender: w.gender.clone().unwrap_or_default(),
            email: w.email.clone().unwrap_or_default(),
            phone: w.phone.clone().unwrap_or_default(),
            audit: AuditFields::from_wire(
                w.created.as_ref(),
                w.modified.as_ref(),
                &w.creator,
                &w.modifier,
            )?,
        })
    }

    fn to_wire(&self) -> wire::Profile {
        wire::Profile {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            date_of_birth: optional_timestamp_to_wire(self.date_of_birth.as_ref()),
            gender: Some(self.gender.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::Profile) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.date_of_birth, w.date_of_birth.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.first_name, &w.first_name);
        merge(&mut next.last_name, &w.last_name);
        merge(&mut next.gender, &w.gender);
        merge(&mut next.email, &w.email);
        merge(&mut next.phone, &w.phone);
        *self = next;
        Ok(())
    }
}

impl Record for Profile {
    const COLLECTION: &'static str = "profiles";
    const LIST_POLICY: ListPolicy = ListPolicy::plain();
    const PATIENT_SCOPED: bool = false;

    fn id(&self) -> Option<Identifier> {
        self.id
    }

    fn set_id(&mut self, id: Identifier) {
        self.id = Some(id);
    }

    fn patient_id(&self) -> Option<Identifier> {
        self.id
    }

    /// A profile is its own patient
    fn set_patient_id(&mut self, patient_id: Identifier) {
        self.id = Some(patient_id);
    }

    fn national_health_id(&self) -> Option<&str> {
        self.national_health_id.as_deref()
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::test_support::{assert_round_trip, text, ts, ID};
    use test_case::test_case;

    fn full_profile() -> wire::Profile {
        wire::Profile {
            id: ID.to_string(),
            patient_id: ID.to_string(),
            national_health_id: text("NH-1"),
            created: ts(1_696_733_104),
            modified: ts(1_696_740_000),
            creator: "creator-1".to_string(),
            modifier: "modifier-2".to_string(),
            first_name: text("Ada"),
            last_name: text("Lovelace"),
            date_of_birth: ts(-4_844_649_600),
            gender: text("female"),
            email: text("ada@example.org"),
            phone: text("+44 20 7946 0000"),
        }
    }

    #[test_case(full_profile(), true; "all fields present")]
    #[test_case(wire::Profile::default(), false; "all fields absent")]
    fn test_profile_round_trip(msg: wire::Profile, all_present: bool) {
        assert_round_trip::<Profile>(&msg, all_present);
    }

    #[test]
    fn test_patient_id_is_own_id() {
        let mut profile = Profile::default();
        assert_eq!(Record::patient_id(&profile), None);
        let id = Identifier::generate();
        profile.set_id(id);
        assert_eq!(Record::patient_id(&profile), Some(id));
        assert_eq!(profile.to_wire().patient_id, id.to_hex());
    }

    #[test]
    fn test_wire_patient_id_fills_missing_id() {
        let profile = Profile::from_wire(&wire::Profile {
            patient_id: "65228f30a1b2c3d4e5f60718".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            profile.id.map(|id| id.to_hex()).as_deref(),
            Some("65228f30a1b2c3d4e5f60718")
        );
        assert_eq!(profile.first_name, "Ada");
    }

    #[test]
    fn test_clearing_national_health_id_requires_explicit_value() {
        let mut profile = Profile {
            national_health_id: Some("NHS-1".to_string()),
            ..Default::default()
        };
        profile.apply_update(&wire::Profile::default()).unwrap();
        assert_eq!(profile.national_health_id.as_deref(), Some("NHS-1"));
    }
}
