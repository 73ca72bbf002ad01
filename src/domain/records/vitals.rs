//! Vital sign readings
//!
//! Blood pressure, heart rate, height, weight and temperature. All five
//! filter by `measured_at` and only list in descending order.

use crate::domain::codec::{
    finite_from_wire, merge, merge_timestamp, optional_timestamp_from_wire,
    optional_timestamp_to_wire, WireCodec,
};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::{AuditFields, ListPolicy, Record};
use crate::domain::result::Result;
use crate::domain::wire;
use crate::record_envelope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const VITALS_POLICY: ListPolicy = ListPolicy::dated("measured_at").descending_only();

/// Blood pressure reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bpm {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub systolic: i32,
    pub diastolic: i32,
    pub pulse: i32,
    pub unit: String,
    pub measured_at: Option<DateTime<Utc>>,
    pub note: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for Bpm {
    type Wire = wire::Bpm;

    fn from_wire(w: &wire::Bpm) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            systolic: w.systolic.unwrap_or_default(),
            diastolic: w.diastolic.unwrap_or_default(),
            pulse: w.pulse.unwrap_or_default(),
            unit: w.unit.clone().unwrap_or_default(),
            measured_at: optional_timestamp_from_wire(w.measured_at.as_ref())?,
            note: w.note.clone().unwrap_or_default(),
            audit,
        })
    }

    fn to_wire(&self) -> wire::Bpm {
        wire::Bpm {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            systolic: Some(self.systolic),
            diastolic: Some(self.diastolic),
            pulse: Some(self.pulse),
            unit: Some(self.unit.clone()),
            measured_at: optional_timestamp_to_wire(self.measured_at.as_ref()),
            note: Some(self.note.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::Bpm) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.measured_at, w.measured_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.systolic, &w.systolic);
        merge(&mut next.diastolic, &w.diastolic);
        merge(&mut next.pulse, &w.pulse);
        merge(&mut next.unit, &w.unit);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for Bpm {
    const COLLECTION: &'static str = "bpm";
    const LIST_POLICY: ListPolicy = VITALS_POLICY;

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.measured_at
    }
}

/// Heart rate reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeartRpm {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub rate: i32,
    pub unit: String,
    pub measured_at: Option<DateTime<Utc>>,
    pub note: String,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for HeartRpm {
    type Wire = wire::HeartRpm;

    fn from_wire(w: &wire::HeartRpm) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            rate: w.rate.unwrap_or_default(),
            unit: w.unit.clone().unwrap_or_default(),
            measured_at: optional_timestamp_from_wire(w.measured_at.as_ref())?,
            note: w.note.clone().unwrap_or_default(),
            audit,
        })
    }

    fn to_wire(&self) -> wire::HeartRpm {
        wire::HeartRpm {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            rate: Some(self.rate),
            unit: Some(self.unit.clone()),
            measured_at: optional_timestamp_to_wire(self.measured_at.as_ref()),
            note: Some(self.note.clone()),
        }
    }

    fn apply_update(&mut self, w: &wire::HeartRpm) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.measured_at, w.measured_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.rate, &w.rate);
        merge(&mut next.unit, &w.unit);
        merge(&mut next.note, &w.note);
        *self = next;
        Ok(())
    }
}

impl Record for HeartRpm {
    const COLLECTION: &'static str = "heart_rpm";
    const LIST_POLICY: ListPolicy = VITALS_POLICY;

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.measured_at
    }
}

/// Declares a value+unit measurement backed by [`wire::Measurement`]
macro_rules! scalar_measurement {
    ($(#[$meta:meta])* $name:ident, $collection:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name {
            pub id: Option<Identifier>,
            pub patient_id: Option<Identifier>,
            pub national_health_id: Option<String>,
            pub value: f64,
            pub unit: String,
            pub measured_at: Option<DateTime<Utc>>,
            #[serde(flatten)]
            pub audit: AuditFields,
        }

        impl WireCodec for $name {
            type Wire = wire::Measurement;

            fn from_wire(w: &wire::Measurement) -> Result<Self> {
                let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
                Ok(Self {
                    id,
                    patient_id,
                    national_health_id,
                    value: finite_from_wire("value", w.value)?.unwrap_or_default(),
                    unit: w.unit.clone().unwrap_or_default(),
                    measured_at: optional_timestamp_from_wire(w.measured_at.as_ref())?,
                    audit,
                })
            }

            fn to_wire(&self) -> wire::Measurement {
                wire::Measurement {
                    id: optional_hex(self.id.as_ref()),
                    patient_id: optional_hex(self.patient_id.as_ref()),
                    national_health_id: self.national_health_id.clone(),
                    created: self.audit.created_wire(),
                    modified: self.audit.modified_wire(),
                    creator: self.audit.creator.clone(),
                    modifier: self.audit.modifier.clone(),
                    value: Some(self.value),
                    unit: Some(self.unit.clone()),
                    measured_at: optional_timestamp_to_wire(self.measured_at.as_ref()),
                }
            }

            fn apply_update(&mut self, w: &wire::Measurement) -> Result<()> {
                let mut next = self.clone();
                merge_timestamp(&mut next.measured_at, w.measured_at.as_ref())?;
                if w.national_health_id.is_some() {
                    next.national_health_id = w.national_health_id.clone();
                }
                merge(&mut next.value, &finite_from_wire("value", w.value)?);
                merge(&mut next.unit, &w.unit);
                *self = next;
                Ok(())
            }
        }

        impl Record for $name {
            const COLLECTION: &'static str = $collection;
            const LIST_POLICY: ListPolicy = VITALS_POLICY;

            record_envelope!();

            fn event_time(&self) -> Option<DateTime<Utc>> {
                self.measured_at
            }
        }
    };
}

scalar_measurement!(
    /// Body height reading
    HeightMeasurement,
    "height_measurements"
);

scalar_measurement!(
    /// Body weight reading
    WeightMeasurement,
    "weight_measurements"
);

/// Body temperature reading
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureMeasurement {
    pub id: Option<Identifier>,
    pub patient_id: Option<Identifier>,
    pub national_health_id: Option<String>,
    pub value: f64,
    pub unit: String,
    pub site: String,
    pub measured_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl WireCodec for TemperatureMeasurement {
    type Wire = wire::TemperatureMeasurement;

    fn from_wire(w: &wire::TemperatureMeasurement) -> Result<Self> {
        let (id, patient_id, national_health_id, audit) = envelope_from_wire!(w);
        Ok(Self {
            id,
            patient_id,
            national_health_id,
            value: finite_from_wire("value", w.value)?.unwrap_or_default(),
            unit: w.unit.clone().unwrap_or_default(),
            site: w.site.clone().unwrap_or_default(),
            measured_at: optional_timestamp_from_wire(w.measured_at.as_ref())?,
            audit,
        })
    }

    fn to_wire(&self) -> wire::TemperatureMeasurement {
        wire::TemperatureMeasurement {
            id: optional_hex(self.id.as_ref()),
            patient_id: optional_hex(self.patient_id.as_ref()),
            national_health_id: self.national_health_id.clone(),
            created: self.audit.created_wire(),
            modified: self.audit.modified_wire(),
            creator: self.audit.creator.clone(),
            modifier: self.audit.modifier.clone(),
            value: Some(self.value),
            unit: Some(self.unit.clone()),
            site: Some(self.site.clone()),
            measured_at: optional_timestamp_to_wire(self.measured_at.as_ref()),
        }
    }

    fn apply_update(&mut self, w: &wire::TemperatureMeasurement) -> Result<()> {
        let mut next = self.clone();
        merge_timestamp(&mut next.measured_at, w.measured_at.as_ref())?;
        if w.national_health_id.is_some() {
            next.national_health_id = w.national_health_id.clone();
        }
        merge(&mut next.value, &finite_from_wire("value", w.value)?);
        merge(&mut next.unit, &w.unit);
        merge(&mut next.site, &w.site);
        *self = next;
        Ok(())
    }
}

impl Record for TemperatureMeasurement {
    const COLLECTION: &'static str = "temperature_measurements";
    const LIST_POLICY: ListPolicy = VITALS_POLICY;

    record_envelope!();

    fn event_time(&self) -> Option<DateTime<Utc>> {
        self.measured_at
    }
}
