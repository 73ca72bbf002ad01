//! Care providers

use crate::domain::codec::{merge, WireCodec};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire;
use crate::record_envelope;
use serde::{Deserialize, Serialize};

/// A clinician or organisation identified by an NPI number
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Provider {
    pub id: Option<Identifier>,
    /// Unused for providers, kept for the shared envelope
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    /// National Provider Identifier, ten digits
    pub npi: String,
    pub first_name: String,
    pub last_name: String,
    pub specialty: String,
    pub organization: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Provider {
    type Wire = wire::Provider;

    fn from_wire(w: &wire::Provider) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            npi: w.npi.clone().unwrap_or_default(),
            first_name: w.first_name.clone().unwrap_or_default(),
            last_name: w.last_name.clone().unwrap_or_default(),
            specialty: w.specialty.clone().unwrap_or_default(),
            organization: w.organization.clone().unwrap_or_default(),
            audit,
        })
    }

    fn to_wire(&self) -> wire::Provider {
        wire::Provider {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            npi: Some(self.npi.clone()),
            first_name: Some(self.first_name.clone()),
            last_name: Some(self.last_name.clone()),
            specialty: Some(self.specialty.clone()),
            organization: Some(self.organization.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::Provider) -> Result<()> {
        if w.national_health_id.is_some() {
            self.national_health_id = w.national_health_id.clone();
        }
        merge(&mut self.npi, &w.npi);
        merge(&mut self.first_name, &w.first_name);
        merge(&mut self.last_name, &w.last_name);
        merge(&mut self.specialty, &w.specialty);
        merge(&mut self.organization, &w.organization);
        Ok(())
    }
}

impl Record for Provider {
    const COLLECTION: &'static str = "providers";
    const LIST_POLICY: ListPolicy = ListPolicy::plain();
    const PATIENT_SCOPED: bool = false;

    record_envelope!();
}
