//! Generic per-entity CRUD service
//!
//! One [`RecordService`] serves every collection. Each operation follows
//! the same pattern: validate, load or convert, render the audit payload,
//! persist, append the audit event, return the wire form.
//!
//! The audit payload is rendered before anything is written, so a
//! rendering failure (`NotAcceptable`) never leaves a half-audited write.

use crate::adapters::audit::AuditEventKind;
use crate::adapters::database::factory::SharedRepository;
use crate::adapters::database::traits::{DateRange, Page, PageRequest};
use crate::core::context::ServiceContext;
use crate::domain::codec::{optional_timestamp_from_wire, WireCodec};
use crate::domain::ids::{optional_hex, Identifier};
use crate::domain::record::Record;
use crate::domain::records::Profile;
use crate::domain::wire::{DeleteResponse, ListRecordsRequest, Pagination};
use crate::domain::{MedrecordError, Result};
use chrono::Utc;

/// One page of wire messages plus the paging block to return
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<W> {
    pub items: Vec<W>,
    pub pagination: Pagination,
}

impl<W> ListResponse<W> {
    fn from_page(page: Page<W>, request: &PageRequest) -> Self {
        Self {
            pagination: Pagination {
                page_number: page.page_number,
                page_size: page.page_size,
                sort: request.sort_field.clone(),
                sort_ascending: request.sort_ascending,
                total_items: page.total_items,
            },
            items: page.items,
        }
    }
}

/// Repository query chosen for a list request
#[derive(Debug, Clone, PartialEq)]
pub enum ListQuery {
    PatientTagsAndDates {
        patient_id: Identifier,
        tags: Vec<String>,
        range: DateRange,
    },
    PatientAndTags {
        patient_id: Identifier,
        tags: Vec<String>,
    },
    PatientAndDates {
        patient_id: Identifier,
        range: DateRange,
    },
    Patient {
        patient_id: Identifier,
    },
    All,
}

impl ListQuery {
    /// Picks the narrowest query the request allows for records of kind `E`
    ///
    /// Priority: patient + tags + dates, patient + tags, patient + dates,
    /// patient only, everything. Without a patient id the filters are not
    /// applied.
    ///
    /// # Errors
    ///
    /// `NotAcceptable` when tags or dates are requested for a kind that
    /// does not support them; `InvalidIdentifier` for a bad patient id.
    pub fn for_request<E: Record>(request: &ListRecordsRequest) -> Result<Self> {
        let patient_id =
            Identifier::parse_optional(request.patient_id.as_deref().unwrap_or_default())?;
        let Some(patient_id) = patient_id else {
            return Ok(ListQuery::All);
        };

        let tags: Vec<String> = request
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if !tags.is_empty() && !E::LIST_POLICY.tags {
            return Err(MedrecordError::NotAcceptable(format!(
                "{} cannot be filtered by tags",
                E::COLLECTION
            )));
        }

        let range = if request.start.is_some() || request.end.is_some() {
            if E::LIST_POLICY.date_field.is_none() {
                return Err(MedrecordError::NotAcceptable(format!(
                    "{} cannot be filtered by date",
                    E::COLLECTION
                )));
            }
            Some(DateRange {
                start: optional_timestamp_from_wire(request.start.as_ref())?,
                end: optional_timestamp_from_wire(request.end.as_ref())?,
            })
        } else {
            None
        };

        Ok(match (tags.is_empty(), range) {
            (false, Some(range)) => ListQuery::PatientTagsAndDates {
                patient_id,
                tags,
                range,
            },
            (false, None) => ListQuery::PatientAndTags { patient_id, tags },
            (true, Some(range)) => ListQuery::PatientAndDates { patient_id, range },
            (true, None) => ListQuery::Patient { patient_id },
        })
    }
}

/// CRUD operations for one collection
pub struct RecordService<E: Record> {
    repository: SharedRepository<E>,
    profiles: SharedRepository<Profile>,
    context: ServiceContext,
}

impl<E: Record> RecordService<E> {
    /// `profiles` is used to check the owning patient of patient-scoped kinds
    pub fn new(
        repository: SharedRepository<E>,
        profiles: SharedRepository<Profile>,
        context: ServiceContext,
    ) -> Self {
        Self {
            repository,
            profiles,
            context,
        }
    }

    /// The backing repository
    pub fn repository(&self) -> &SharedRepository<E> {
        &self.repository
    }

    /// Creates a record; the store assigns a fresh id
    ///
    /// # Errors
    ///
    /// `NotAcceptable` when the owning patient is missing or unknown, or the
    /// audit payload cannot be rendered.
    pub async fn create(&self, wire: &E::Wire) -> Result<E::Wire> {
        let mut record = E::from_wire(wire)?;
        let actor = self.context.actor()?;

        if E::PATIENT_SCOPED {
            self.check_patient(&record).await?;
        }

        record.set_id(Identifier::generate());
        record.audit_mut().stamp_created(&actor, Utc::now());

        let payload = self.context.render(&record)?;
        let saved = self.repository.save(record).await?;
        self.context
            .record_event(AuditEventKind::Create, &actor, Some(&saved), payload)
            .await?;

        tracing::info!(
            collection = E::COLLECTION,
            id = %optional_hex(saved.id().as_ref()),
            patient_id = %optional_hex(saved.patient_id().as_ref()),
            "Record created"
        );
        Ok(saved.to_wire())
    }

    /// Loads one record
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `NotAcceptable` if the audit payload
    /// cannot be rendered.
    pub async fn get(&self, id: &str) -> Result<E::Wire> {
        let record = self.load(id).await?;
        let actor = self.context.actor()?;
        let payload = self.context.render(&record)?;
        self.context
            .record_event(AuditEventKind::Read, &actor, Some(&record), payload)
            .await?;
        Ok(record.to_wire())
    }

    /// Applies the fields present in `wire` to the stored record
    ///
    /// # Errors
    ///
    /// `NotAcceptable` if `wire` has no id, `NotFound` for an unknown id.
    pub async fn update(&self, wire: &E::Wire) -> Result<E::Wire> {
        let incoming = E::from_wire(wire)?;
        let id = incoming.id().ok_or_else(|| {
            MedrecordError::NotAcceptable(format!("{} update without an id", E::COLLECTION))
        })?;
        let mut record = self.find(&id).await?;
        let actor = self.context.actor()?;

        record.apply_update(wire)?;
        record.audit_mut().stamp_modified(&actor, Utc::now());

        let payload = self.context.render(&record)?;
        let saved = self.repository.save(record).await?;
        self.context
            .record_event(AuditEventKind::Update, &actor, Some(&saved), payload)
            .await?;

        tracing::info!(collection = E::COLLECTION, id = %id, "Record updated");
        Ok(saved.to_wire())
    }

    /// Deletes one record
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `NotAcceptable` if the pre-delete audit
    /// payload cannot be rendered.
    pub async fn delete(&self, id: &str) -> Result<DeleteResponse> {
        let record = self.load(id).await?;
        let actor = self.context.actor()?;
        let payload = self.context.render(&record)?;

        let id = record.id().ok_or_else(|| {
            MedrecordError::Database(format!("Stored {} document has no id", E::COLLECTION))
        })?;
        let deleted = self.repository.delete_by_id(&id).await?;
        if !deleted {
            return Err(MedrecordError::NotFound(format!("{}/{}", E::COLLECTION, id)));
        }
        self.context
            .record_event(AuditEventKind::Delete, &actor, Some(&record), payload)
            .await?;

        tracing::info!(collection = E::COLLECTION, id = %id, "Record deleted");
        Ok(DeleteResponse {
            success: true,
            id: id.to_hex(),
        })
    }

    /// Lists records using the narrowest query the request allows
    ///
    /// # Errors
    ///
    /// `NotAcceptable` for an ascending sort on a descending-only kind, for
    /// unsupported filters, or if any item's audit payload cannot be
    /// rendered (no partial pages).
    pub async fn list(&self, request: &ListRecordsRequest) -> Result<ListResponse<E::Wire>> {
        let page_request = self.context.page_request(request.pagination.as_ref());
        if page_request.sort_ascending && !E::LIST_POLICY.allow_ascending {
            return Err(MedrecordError::NotAcceptable(format!(
                "{} can only be listed in descending order",
                E::COLLECTION
            )));
        }

        let query = ListQuery::for_request::<E>(request)?;
        let page = self.run_query(&query, &page_request).await?;

        let actor = self.context.actor()?;
        let payloads = page
            .items
            .iter()
            .map(|r| self.context.render(r))
            .collect::<Result<Vec<_>>>()?;
        self.context
            .record_event::<E>(
                AuditEventKind::List,
                &actor,
                None,
                format!("[{}]", payloads.join(",")),
            )
            .await?;

        tracing::debug!(
            collection = E::COLLECTION,
            query = ?query,
            returned = page.items.len(),
            total = page.total_items,
            "Records listed"
        );
        Ok(ListResponse::from_page(
            page.map(|r| r.to_wire()),
            &page_request,
        ))
    }

    async fn run_query(&self, query: &ListQuery, page: &PageRequest) -> Result<Page<E>> {
        match query {
            ListQuery::PatientTagsAndDates {
                patient_id,
                tags,
                range,
            } => {
                self.repository
                    .find_all_by_patient_id_and_tags_and_date_between(patient_id, tags, range, page)
                    .await
            }
            ListQuery::PatientAndTags { patient_id, tags } => {
                self.repository
                    .find_all_by_patient_id_and_tags(patient_id, tags, page)
                    .await
            }
            ListQuery::PatientAndDates { patient_id, range } => {
                self.repository
                    .find_all_by_patient_id_and_date_between(patient_id, range, page)
                    .await
            }
            ListQuery::Patient { patient_id } => {
                self.repository
                    .find_all_by_patient_id(patient_id, page)
                    .await
            }
            ListQuery::All => self.repository.find_all(page).await,
        }
    }

    async fn load(&self, id: &str) -> Result<E> {
        let id = Identifier::parse(id)?;
        self.find(&id).await
    }

    async fn find(&self, id: &Identifier) -> Result<E> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| MedrecordError::NotFound(format!("{}/{}", E::COLLECTION, id)))
    }

    /// The owning profile must exist
    async fn check_patient(&self, record: &E) -> Result<()> {
        let patient_id = record.patient_id().ok_or_else(|| {
            MedrecordError::NotAcceptable(format!("{} requires a patient_id", E::COLLECTION))
        })?;
        if !self.profiles.exists_by_id(&patient_id).await? {
            return Err(MedrecordError::NotAcceptable(format!(
                "Unknown patient {patient_id}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{Allergy, DoctorNotes};
    use crate::domain::wire::Timestamp;
    use test_case::test_case;

    const PATIENT: &str = "65226c30a1b2c3d4e5f60718";

    fn request(patient: bool, tags: bool, dates: bool) -> ListRecordsRequest {
        ListRecordsRequest {
            patient_id: patient.then(|| PATIENT.to_string()),
            tags: if tags { vec!["cardio".to_string()] } else { Vec::new() },
            start: dates.then_some(Timestamp {
                seconds: 1_696_733_104,
                nanos: 0,
            }),
            end: None,
            pagination: None,
        }
    }

    fn kind(query: &ListQuery) -> &'static str {
        match query {
            ListQuery::PatientTagsAndDates { .. } => "composite",
            ListQuery::PatientAndTags { .. } => "tags",
            ListQuery::PatientAndDates { .. } => "dates",
            ListQuery::Patient { .. } => "patient",
            ListQuery::All => "all",
        }
    }

    #[test_case(true, true, true => "composite"; "patient tags and dates")]
    #[test_case(true, true, false => "tags"; "patient and tags")]
    #[test_case(true, false, true => "dates"; "patient and dates")]
    #[test_case(true, false, false => "patient"; "patient only")]
    #[test_case(false, true, true => "all"; "filters without patient")]
    #[test_case(false, false, false => "all"; "nothing")]
    fn test_doctor_notes_query_priority(patient: bool, tags: bool, dates: bool) -> &'static str {
        kind(&ListQuery::for_request::<DoctorNotes>(&request(patient, tags, dates)).unwrap())
    }

    #[test]
    fn test_blank_tags_are_ignored() {
        let mut req = request(true, false, false);
        req.tags = vec!["  ".to_string(), String::new()];
        let query = ListQuery::for_request::<DoctorNotes>(&req).unwrap();
        assert_eq!(kind(&query), "patient");
    }

    #[test]
    fn test_tags_rejected_for_untagged_kind() {
        let err = ListQuery::for_request::<Allergy>(&request(true, true, false)).unwrap_err();
        assert!(matches!(err, MedrecordError::NotAcceptable(_)));
    }

    #[test]
    fn test_bad_patient_id() {
        let mut req = request(false, false, false);
        req.patient_id = Some("not-hex".to_string());
        let err = ListQuery::for_request::<Allergy>(&req).unwrap_err();
        assert!(matches!(err, MedrecordError::InvalidIdentifier(_)));
    }
}
