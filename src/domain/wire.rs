//! Protobuf wire messages
//!
//! The messages exchanged with RPC callers. They are declared directly with
//! `prost` derives instead of being generated from `.proto` files, and also
//! derive `serde` so that aggregate snapshots can be persisted as JSON.
//!
//! Conventions shared by every entity message:
//! - tags 1-7 carry the generic document fields (`id`, `patient_id`,
//!   `national_health_id`, and the audit quartet)
//! - domain fields start at tag 10
//! - identifiers are hex strings, the empty string meaning "unset"
//! - domain scalars are proto3 `optional` so presence survives the wire

use serde::{Deserialize, Serialize};

/// Point in time as seconds and nanoseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize, Deserialize)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

/// Pagination block carried by list requests and responses
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    #[prost(uint32, tag = "1")]
    pub page_number: u32,
    #[prost(uint32, tag = "2")]
    pub page_size: u32,
    #[prost(string, tag = "3")]
    pub sort: String,
    #[prost(bool, tag = "4")]
    pub sort_ascending: bool,
    #[prost(uint64, tag = "5")]
    pub total_items: u64,
}

/// Filtered list request shared by every entity kind
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRecordsRequest {
    #[prost(string, optional, tag = "1")]
    pub patient_id: Option<String>,
    #[prost(string, repeated, tag = "2")]
    pub tags: Vec<String>,
    #[prost(message, optional, tag = "3")]
    pub start: Option<Timestamp>,
    #[prost(message, optional, tag = "4")]
    pub end: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub pagination: Option<Pagination>,
}

/// Acknowledgement returned by delete operations
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub id: String,
}

/// Request for a new medical record export
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
pub struct MedicalRecordRequest {
    #[prost(string, tag = "1")]
    pub patient_id: String,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum MedicalRecordStatus {
    Export = 0,
    Import = 1,
    Complete = 2,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum AdministrationStatus {
    Unspecified = 0,
    Completed = 1,
    Missed = 2,
    Refused = 3,
    Held = 4,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum DiagnosisStatus {
    Unspecified = 0,
    Active = 1,
    Remission = 2,
    Resolved = 3,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Allergy {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub allergen: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub reaction: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub category: Option<String>,
    #[prost(bool, optional, tag = "13")]
    pub is_severe: Option<bool>,
    #[prost(message, optional, tag = "14")]
    pub onset_date: Option<Timestamp>,
    #[prost(string, optional, tag = "15")]
    pub note: Option<String>,
}

/// Blood pressure reading
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Bpm {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(int32, optional, tag = "10")]
    pub systolic: Option<i32>,
    #[prost(int32, optional, tag = "11")]
    pub diastolic: Option<i32>,
    #[prost(int32, optional, tag = "12")]
    pub pulse: Option<i32>,
    #[prost(string, optional, tag = "13")]
    pub unit: Option<String>,
    #[prost(message, optional, tag = "14")]
    pub measured_at: Option<Timestamp>,
    #[prost(string, optional, tag = "15")]
    pub note: Option<String>,
}

/// Heart rate reading
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRpm {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(int32, optional, tag = "10")]
    pub rate: Option<i32>,
    #[prost(string, optional, tag = "11")]
    pub unit: Option<String>,
    #[prost(message, optional, tag = "12")]
    pub measured_at: Option<Timestamp>,
    #[prost(string, optional, tag = "13")]
    pub note: Option<String>,
}

/// Scalar body measurement (height, weight)
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Measurement {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(double, optional, tag = "10")]
    pub value: Option<f64>,
    #[prost(string, optional, tag = "11")]
    pub unit: Option<String>,
    #[prost(message, optional, tag = "12")]
    pub measured_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureMeasurement {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(double, optional, tag = "10")]
    pub value: Option<f64>,
    #[prost(string, optional, tag = "11")]
    pub unit: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub site: Option<String>,
    #[prost(message, optional, tag = "13")]
    pub measured_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorNotes {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub title: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub note: Option<String>,
    #[prost(string, repeated, tag = "12")]
    pub tags: Vec<String>,
    #[prost(message, optional, tag = "13")]
    pub note_datetime: Option<Timestamp>,
    #[prost(string, tag = "14")]
    pub provider_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Vaccine {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub manufacturer: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub lot_number: Option<String>,
    #[prost(int32, optional, tag = "13")]
    pub dose_number: Option<i32>,
    #[prost(message, optional, tag = "14")]
    pub administered_at: Option<Timestamp>,
    #[prost(string, tag = "15")]
    pub provider_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub dosage: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub frequency: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub route: Option<String>,
    #[prost(bool, optional, tag = "14")]
    pub is_active: Option<bool>,
    #[prost(message, optional, tag = "15")]
    pub start_date: Option<Timestamp>,
    #[prost(message, optional, tag = "16")]
    pub end_date: Option<Timestamp>,
    #[prost(string, tag = "17")]
    pub prescribed_by: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationAdministration {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, tag = "10")]
    pub medication_id: String,
    #[prost(string, optional, tag = "11")]
    pub dose: Option<String>,
    #[prost(enumeration = "AdministrationStatus", optional, tag = "12")]
    pub status: Option<i32>,
    #[prost(message, optional, tag = "13")]
    pub administered_at: Option<Timestamp>,
    #[prost(string, optional, tag = "14")]
    pub note: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistory {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub condition: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub note: Option<String>,
    #[prost(message, optional, tag = "12")]
    pub diagnosed_at: Option<Timestamp>,
    #[prost(message, optional, tag = "13")]
    pub resolved_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnosis {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub code: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub description: Option<String>,
    #[prost(enumeration = "DiagnosisStatus", optional, tag = "12")]
    pub status: Option<i32>,
    #[prost(message, optional, tag = "13")]
    pub diagnosed_at: Option<Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectedLab {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub lab_name: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub test_name: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub result_value: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub unit: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub reference_range: Option<String>,
    #[prost(string, repeated, tag = "15")]
    pub tags: Vec<String>,
    #[prost(message, optional, tag = "16")]
    pub collected_at: Option<Timestamp>,
}

/// Patient profile. `patient_id` mirrors `id`.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub first_name: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub last_name: Option<String>,
    #[prost(message, optional, tag = "12")]
    pub date_of_birth: Option<Timestamp>,
    #[prost(string, optional, tag = "13")]
    pub gender: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub email: Option<String>,
    #[prost(string, optional, tag = "15")]
    pub phone: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Provider {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub patient_id: String,
    #[prost(string, optional, tag = "3")]
    pub national_health_id: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(string, optional, tag = "10")]
    pub npi: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub first_name: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub last_name: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub specialty: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub organization: Option<String>,
}

/// Aggregated medical record
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalRecord {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(enumeration = "MedicalRecordStatus", tag = "2")]
    pub status: i32,
    #[prost(message, optional, tag = "3")]
    pub user_profile: Option<Profile>,
    #[prost(message, optional, tag = "4")]
    pub created: Option<Timestamp>,
    #[prost(message, optional, tag = "5")]
    pub modified: Option<Timestamp>,
    #[prost(string, tag = "6")]
    pub creator: String,
    #[prost(string, tag = "7")]
    pub modifier: String,
    #[prost(message, repeated, tag = "10")]
    pub medication_list: Vec<Medication>,
    #[prost(message, repeated, tag = "11")]
    pub known_allergy_list: Vec<Allergy>,
    #[prost(message, repeated, tag = "12")]
    pub vaccine_list: Vec<Vaccine>,
    #[prost(message, repeated, tag = "13")]
    pub bpm_list: Vec<Bpm>,
    #[prost(message, repeated, tag = "14")]
    pub heart_rpm_list: Vec<HeartRpm>,
    #[prost(message, repeated, tag = "15")]
    pub height_list: Vec<Measurement>,
    #[prost(message, repeated, tag = "16")]
    pub weight_list: Vec<Measurement>,
    #[prost(message, repeated, tag = "17")]
    pub temperature_list: Vec<TemperatureMeasurement>,
    #[prost(message, repeated, tag = "18")]
    pub doctor_notes_list: Vec<DoctorNotes>,
    #[prost(message, repeated, tag = "19")]
    pub medication_administration_list: Vec<MedicationAdministration>,
    #[prost(message, repeated, tag = "20")]
    pub medical_history_list: Vec<MedicalHistory>,
    #[prost(message, repeated, tag = "21")]
    pub diagnosis_list: Vec<Diagnosis>,
    #[prost(message, repeated, tag = "22")]
    pub connected_lab_list: Vec<ConnectedLab>,
}
