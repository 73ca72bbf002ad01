//! Integration tests for medical record export, import and completion

use medrecord::adapters::audit::{AuditEventKind, MemoryAuditSink};
use medrecord::adapters::database::{PageRequest, Repositories};
use medrecord::adapters::identity::StaticUserResolver;
use medrecord::core::{
    MedicalRecordAggregator, MedicalRecordService, ProcessOutcome, ProfileService, RecordService,
    ServiceContext,
};
use medrecord::domain::ids::Identifier;
use medrecord::domain::records::{Allergy, Medication, RecordStatus};
use medrecord::domain::wire::{self, MedicalRecordRequest, Timestamp};
use medrecord::domain::{ErrorKind, SubRecordKind};
use std::sync::Arc;

struct Harness {
    repos: Repositories,
    audit: Arc<MemoryAuditSink>,
    service: MedicalRecordService,
}

fn harness() -> Harness {
    let repos = Repositories::in_memory();
    let audit = Arc::new(MemoryAuditSink::new());
    let context = ServiceContext::new(Arc::new(StaticUserResolver::new("u1")), audit.clone());
    let aggregator = Arc::new(MedicalRecordAggregator::new(repos.clone(), context.clone()));
    let service = MedicalRecordService::new(repos.clone(), context, aggregator, false);
    Harness {
        repos,
        audit,
        service,
    }
}

impl Harness {
    fn context(&self) -> ServiceContext {
        ServiceContext::new(Arc::new(StaticUserResolver::new("u1")), self.audit.clone())
    }

    /// Patient P2: one medication, one allergy, no vaccines
    async fn seed_patient(&self) -> String {
        let profiles = ProfileService::new(self.repos.profiles.clone(), self.context());
        let patient = profiles
            .create(&wire::Profile {
                first_name: Some("Grace".to_string()),
                national_health_id: Some("NH-P2".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;

        let medications: RecordService<Medication> = RecordService::new(
            self.repos.medications.clone(),
            self.repos.profiles.clone(),
            self.context(),
        );
        medications
            .create(&wire::Medication {
                patient_id: patient.clone(),
                name: Some("Metformin".to_string()),
                dosage: Some("500mg".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let allergies: RecordService<Allergy> = RecordService::new(
            self.repos.allergies.clone(),
            self.repos.profiles.clone(),
            self.context(),
        );
        allergies
            .create(&wire::Allergy {
                patient_id: patient.clone(),
                allergen: Some("peanut".to_string()),
                onset_date: Some(Timestamp {
                    seconds: 1_696_733_104,
                    nanos: 0,
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        patient
    }
}

#[tokio::test]
async fn test_export_scenario_completes_with_patient_records() {
    let h = harness();
    let patient = h.seed_patient().await;

    let requested = h
        .service
        .request_medical_record(&MedicalRecordRequest {
            patient_id: patient.clone(),
        })
        .await
        .unwrap();
    assert_eq!(requested.status, wire::MedicalRecordStatus::Export as i32);
    assert!(requested.medication_list.is_empty());
    assert_eq!(
        requested.user_profile.as_ref().map(|p| p.id.clone()),
        Some(patient.clone())
    );

    // not disclosable until processed
    let err = h.service.get_medical_record(&requested.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let outcome = h.service.process_medical_record(&requested.id).await.unwrap();
    let report = match outcome {
        ProcessOutcome::Exported(report) => report,
        other => panic!("expected an export, got {other:?}"),
    };
    assert_eq!(report.count(SubRecordKind::Medication), 1);
    assert_eq!(report.count(SubRecordKind::Allergy), 1);
    assert_eq!(report.count(SubRecordKind::Vaccine), 0);
    assert_eq!(report.total(), 2);
    assert!(report.profile_refreshed);

    let complete = h.service.get_medical_record(&requested.id).await.unwrap();
    assert_eq!(complete.status, wire::MedicalRecordStatus::Complete as i32);
    assert_eq!(complete.medication_list.len(), 1);
    assert_eq!(complete.known_allergy_list.len(), 1);
    assert!(complete.vaccine_list.is_empty());
    assert_eq!(
        complete.known_allergy_list[0].allergen.as_deref(),
        Some("peanut")
    );

    assert_eq!(h.audit.count(AuditEventKind::Export), 2);
}

#[tokio::test]
async fn test_complete_record_is_never_reprocessed() {
    let h = harness();
    let patient = h.seed_patient().await;
    let requested = h
        .service
        .request_medical_record(&MedicalRecordRequest {
            patient_id: patient,
        })
        .await
        .unwrap();

    h.service.process_medical_record(&requested.id).await.unwrap();
    let first = h.service.get_medical_record(&requested.id).await.unwrap();

    let again = h.service.process_medical_record(&requested.id).await.unwrap();
    assert_eq!(again, ProcessOutcome::AlreadyComplete);

    let second = h.service.get_medical_record(&requested.id).await.unwrap();
    assert_eq!(second.status, wire::MedicalRecordStatus::Complete as i32);
    assert_eq!(second.modified, first.modified);
}

#[tokio::test]
async fn test_missing_record_is_soft_noop() {
    let h = harness();
    let outcome = h
        .service
        .process_medical_record(&Identifier::generate().to_hex())
        .await
        .unwrap();
    assert_eq!(outcome, ProcessOutcome::Missing);
}

#[tokio::test]
async fn test_request_for_unknown_patient_is_not_found() {
    let h = harness();
    let err = h
        .service
        .request_medical_record(&MedicalRecordRequest {
            patient_id: Identifier::generate().to_hex(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_import_is_idempotent() {
    // Export from one store...
    let source = harness();
    let patient = source.seed_patient().await;
    let requested = source
        .service
        .request_medical_record(&MedicalRecordRequest {
            patient_id: patient.clone(),
        })
        .await
        .unwrap();
    source
        .service
        .process_medical_record(&requested.id)
        .await
        .unwrap();
    let exported = source
        .service
        .get_medical_record(&requested.id)
        .await
        .unwrap();

    // ...and import into an empty one
    let target = harness();
    let staged = target
        .service
        .import_medical_record(&exported)
        .await
        .unwrap();
    assert_eq!(staged.status, wire::MedicalRecordStatus::Import as i32);

    let outcome = target
        .service
        .process_medical_record(&staged.id)
        .await
        .unwrap();
    let report = match outcome {
        ProcessOutcome::Imported(report) => report,
        other => panic!("expected an import, got {other:?}"),
    };
    assert!(report.profile_restored);
    assert_eq!(report.inserted(), 2);
    assert_eq!(report.skipped(), 0);
    assert_eq!(report.tally(SubRecordKind::Allergy).inserted, 1);

    // Force a second pass over the same aggregate
    let id = Identifier::parse(&staged.id).unwrap();
    let mut record = target
        .repos
        .medical_records
        .find_by_id(&id)
        .await
        .unwrap()
        .unwrap();
    record.status = RecordStatus::Import;
    target.repos.medical_records.save(record).await.unwrap();

    let outcome = target
        .service
        .process_medical_record(&staged.id)
        .await
        .unwrap();
    let report = match outcome {
        ProcessOutcome::Imported(report) => report,
        other => panic!("expected an import, got {other:?}"),
    };
    assert!(!report.profile_restored);
    assert_eq!(report.inserted(), 0);
    assert_eq!(report.skipped(), 2);

    let patient_id = Identifier::parse(&patient).unwrap();
    let allergies = target
        .repos
        .allergies
        .find_all_by_patient_id(&patient_id, &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(allergies.total_items, 1);
    assert!(target.repos.profiles.exists_by_id(&patient_id).await.unwrap());
}

#[tokio::test]
async fn test_import_without_profile_is_not_acceptable() {
    let h = harness();
    let err = h
        .service
        .import_medical_record(&wire::MedicalRecord::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAcceptable);
}

#[tokio::test]
async fn test_list_and_delete_medical_records() {
    let h = harness();
    let patient = h.seed_patient().await;
    for _ in 0..2 {
        h.service
            .request_medical_record(&MedicalRecordRequest {
                patient_id: patient.clone(),
            })
            .await
            .unwrap();
    }

    let listed = h.service.list_medical_records(&patient, None).await.unwrap();
    assert_eq!(listed.items.len(), 2);
    assert_eq!(listed.pagination.total_items, 2);

    let deleted = h
        .service
        .delete_medical_record(&listed.items[0].id)
        .await
        .unwrap();
    assert!(deleted.success);

    let listed = h.service.list_medical_records(&patient, None).await.unwrap();
    assert_eq!(listed.items.len(), 1);

    // source collections are untouched
    let patient_id = Identifier::parse(&patient).unwrap();
    let allergies = h
        .repos
        .allergies
        .find_all_by_patient_id(&patient_id, &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(allergies.total_items, 1);
}

fn aggregate_for(
    patient: &Identifier,
    nhid: &str,
    allergies: Vec<wire::Allergy>,
) -> wire::MedicalRecord {
    wire::MedicalRecord {
        user_profile: Some(wire::Profile {
            id: patient.to_hex(),
            patient_id: patient.to_hex(),
            national_health_id: Some(nhid.to_string()),
            first_name: Some("Grace".to_string()),
            ..Default::default()
        }),
        known_allergy_list: allergies,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_import_keeps_items_with_their_patient() {
    let h = harness();
    let patient = Identifier::generate();
    let stranger = Identifier::generate();
    let incoming = aggregate_for(
        &patient,
        "NH-OWN",
        vec![
            wire::Allergy {
                patient_id: stranger.to_hex(),
                allergen: Some("latex".to_string()),
                ..Default::default()
            },
            wire::Allergy {
                allergen: Some("peanut".to_string()),
                ..Default::default()
            },
        ],
    );

    let staged = h.service.import_medical_record(&incoming).await.unwrap();
    let outcome = h.service.process_medical_record(&staged.id).await.unwrap();
    let report = match outcome {
        ProcessOutcome::Imported(report) => report,
        other => panic!("expected an import, got {other:?}"),
    };
    let tally = report.tally(SubRecordKind::Allergy);
    assert_eq!(tally.inserted, 1);
    assert_eq!(tally.foreign, 1);
    assert_eq!(report.foreign(), 1);

    let owned = h
        .repos
        .allergies
        .find_all_by_patient_id(&patient, &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(owned.total_items, 1);
    assert_eq!(owned.items[0].allergen, "peanut");

    let strays = h
        .repos
        .allergies
        .find_all_by_patient_id(&stranger, &PageRequest::unpaged())
        .await
        .unwrap();
    assert_eq!(strays.total_items, 0);
    assert!(!h.repos.profiles.exists_by_id(&stranger).await.unwrap());
}

#[tokio::test]
async fn test_import_profile_with_taken_national_health_id_conflicts() {
    let h = harness();
    let existing = h.seed_patient().await;
    let newcomer = Identifier::generate();

    let staged = h
        .service
        .import_medical_record(&aggregate_for(&newcomer, "NH-P2", Vec::new()))
        .await
        .unwrap();
    let err = h
        .service
        .process_medical_record(&staged.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert!(!h.repos.profiles.exists_by_id(&newcomer).await.unwrap());
    let existing = Identifier::parse(&existing).unwrap();
    assert!(h.repos.profiles.exists_by_id(&existing).await.unwrap());

    let id = Identifier::parse(&staged.id).unwrap();
    let stored = h
        .repos
        .medical_records
        .find_by_id(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, RecordStatus::Import);
}
