//! Repository factory
//!
//! This module builds the full set of collection repositories for the
//! backend selected by `database_target`.

use crate::adapters::database::memory::MemoryRepository;
use crate::adapters::database::traits::Repository;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::repository::PostgresRepository;
use crate::config::schema::{DatabaseTarget, MedrecordConfig};
use crate::domain::record::Record;
use crate::domain::records::{
    Allergy, Bpm, ConnectedLab, Diagnosis, DoctorNotes, HeartRpm, HeightMeasurement,
    MedicalHistory, MedicalRecord, Medication, MedicationAdministration, Profile, Provider,
    TemperatureMeasurement, Vaccine, WeightMeasurement,
};
use crate::domain::{MedrecordError, Result};
use std::sync::Arc;

/// Shared handle to one collection's repository
pub type SharedRepository<E> = Arc<dyn Repository<E>>;

/// One repository per collection
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone)]
pub struct Repositories {
    pub profiles: SharedRepository<Profile>,
    pub providers: SharedRepository<Provider>,
    pub medical_records: SharedRepository<MedicalRecord>,
    pub medications: SharedRepository<Medication>,
    pub allergies: SharedRepository<Allergy>,
    pub vaccines: SharedRepository<Vaccine>,
    pub bpm: SharedRepository<Bpm>,
    pub heart_rpm: SharedRepository<HeartRpm>,
    pub heights: SharedRepository<HeightMeasurement>,
    pub weights: SharedRepository<WeightMeasurement>,
    pub temperatures: SharedRepository<TemperatureMeasurement>,
    pub doctor_notes: SharedRepository<DoctorNotes>,
    pub medication_administrations: SharedRepository<MedicationAdministration>,
    pub medical_histories: SharedRepository<MedicalHistory>,
    pub diagnoses: SharedRepository<Diagnosis>,
    pub connected_labs: SharedRepository<ConnectedLab>,
}

fn memory<E: Record>() -> SharedRepository<E> {
    Arc::new(MemoryRepository::<E>::new())
}

async fn postgres<E: Record>(client: &Arc<PostgreSQLClient>) -> Result<SharedRepository<E>> {
    let repository = PostgresRepository::<E>::new(Arc::clone(client));
    repository.ensure_table().await?;
    Ok(Arc::new(repository))
}

impl Repositories {
    /// Fresh, empty in-memory collections
    pub fn in_memory() -> Self {
        Self {
            profiles: memory(),
            providers: memory(),
            medical_records: memory(),
            medications: memory(),
            allergies: memory(),
            vaccines: memory(),
            bpm: memory(),
            heart_rpm: memory(),
            heights: memory(),
            weights: memory(),
            temperatures: memory(),
            doctor_notes: memory(),
            medication_administrations: memory(),
            medical_histories: memory(),
            diagnoses: memory(),
            connected_labs: memory(),
        }
    }

    /// PostgreSQL collections sharing one pool; missing tables are created
    ///
    /// # Errors
    ///
    /// Returns an error if a table cannot be created.
    pub async fn postgresql(client: Arc<PostgreSQLClient>) -> Result<Self> {
        Ok(Self {
            profiles: postgres(&client).await?,
            providers: postgres(&client).await?,
            medical_records: postgres(&client).await?,
            medications: postgres(&client).await?,
            allergies: postgres(&client).await?,
            vaccines: postgres(&client).await?,
            bpm: postgres(&client).await?,
            heart_rpm: postgres(&client).await?,
            heights: postgres(&client).await?,
            weights: postgres(&client).await?,
            temperatures: postgres(&client).await?,
            doctor_notes: postgres(&client).await?,
            medication_administrations: postgres(&client).await?,
            medical_histories: postgres(&client).await?,
            diagnoses: postgres(&client).await?,
            connected_labs: postgres(&client).await?,
        })
    }
}

/// Create the repositories for the configured backend
///
/// # Errors
///
/// Returns an error if the PostgreSQL section is missing or the pool cannot
/// reach the server.
pub async fn create_repositories(config: &MedrecordConfig) -> Result<Repositories> {
    match config.database_target {
        DatabaseTarget::Memory => {
            tracing::info!("Creating in-memory document store");
            Ok(Repositories::in_memory())
        }
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                MedrecordError::Configuration(
                    "postgresql section is required when database_target = \"postgresql\""
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL document store");
            let client = Arc::new(PostgreSQLClient::new(pg_config.clone()).await?);
            client.test_connection().await?;
            Repositories::postgresql(client).await
        }
    }
}
