//! Generic document record abstraction
//!
//! Every persisted entity, whatever its clinical content, shares the same
//! envelope: an identifier assigned on first save, the owning patient, an
//! optional national health id and the audit quartet. [`Record`] exposes
//! that envelope so that one repository port and one CRUD service can serve
//! every collection.

use super::codec::{optional_timestamp_from_wire, optional_timestamp_to_wire, WireCodec};
use super::ids::Identifier;
use super::result::Result;
use super::wire::Timestamp;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Creation/modification stamps carried by every document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuditFields {
    /// First save
    pub created: Option<DateTime<Utc>>,
    /// Last save
    pub modified: Option<DateTime<Utc>>,
    /// Acting user on first save
    pub creator: String,
    /// Acting user on last save
    pub modifier: String,
}

impl AuditFields {
    /// Stamps a first save; `modified` equals `created`
    pub fn stamp_created(&mut self, actor: &str, at: DateTime<Utc>) {
        self.created = Some(at);
        self.modified = Some(at);
        self.creator = actor.to_string();
        self.modifier = actor.to_string();
    }

    /// Stamps an update, keeping `modified >= created`
    pub fn stamp_modified(&mut self, actor: &str, at: DateTime<Utc>) {
        let at = match self.created {
            Some(created) if at < created => created,
            _ => at,
        };
        self.modified = Some(at);
        self.modifier = actor.to_string();
    }

    /// Builds the quartet from wire fields
    pub fn from_wire(
        created: Option<&Timestamp>,
        modified: Option<&Timestamp>,
        creator: &str,
        modifier: &str,
    ) -> Result<Self> {
        Ok(Self {
            created: optional_timestamp_from_wire(created)?,
            modified: optional_timestamp_from_wire(modified)?,
            creator: creator.to_string(),
            modifier: modifier.to_string(),
        })
    }

    /// Wire form of `created`
    pub fn created_wire(&self) -> Option<Timestamp> {
        optional_timestamp_to_wire(self.created.as_ref())
    }

    /// Wire form of `modified`
    pub fn modified_wire(&self) -> Option<Timestamp> {
        optional_timestamp_to_wire(self.modified.as_ref())
    }
}

/// Which list filters and sort directions an entity kind accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPolicy {
    /// Records carry tags and honour tag filters
    pub tags: bool,
    /// Model field used for date-range filters, if any
    pub date_field: Option<&'static str>,
    /// `sort_ascending = true` is accepted
    pub allow_ascending: bool,
}

impl ListPolicy {
    /// Date-range filtering on `date_field`, both sort directions accepted
    pub const fn dated(date_field: &'static str) -> Self {
        Self {
            tags: false,
            date_field: Some(date_field),
            allow_ascending: true,
        }
    }

    /// Enables tag filters
    pub const fn with_tags(mut self) -> Self {
        self.tags = true;
        self
    }

    /// Rejects ascending sorts with `NotAcceptable`
    pub const fn descending_only(mut self) -> Self {
        self.allow_ascending = false;
        self
    }

    /// No filters beyond patient scoping
    pub const fn plain() -> Self {
        Self {
            tags: false,
            date_field: None,
            allow_ascending: true,
        }
    }
}

/// A persisted document with the generic envelope
pub trait Record:
    WireCodec + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection (table) name
    const COLLECTION: &'static str;

    /// List filtering policy
    const LIST_POLICY: ListPolicy;

    /// Whether creation requires an existing owning profile
    const PATIENT_SCOPED: bool = true;

    /// Document id, absent before the first save
    fn id(&self) -> Option<Identifier>;

    /// Assigns the document id
    fn set_id(&mut self, id: Identifier);

    /// Owning patient
    fn patient_id(&self) -> Option<Identifier>;

    /// Assigns the owning patient
    fn set_patient_id(&mut self, patient_id: Identifier);

    /// Alternate patient identifier
    fn national_health_id(&self) -> Option<&str>;

    /// Audit stamps
    fn audit(&self) -> &AuditFields;

    /// Mutable audit stamps
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Tags used by tag filters
    fn tags(&self) -> &[String] {
        &[]
    }

    /// Instant used by date-range filters
    fn event_time(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Implements the envelope accessors of [`Record`] for a model struct
///
/// The struct must have `id: Option<Identifier>`, `patient_id:
/// Option<Identifier>`, `national_health_id: Option<String>` and
/// `audit: AuditFields` fields.
#[macro_export]
macro_rules! record_envelope {
    () => {
        fn id(&self) -> Option<$crate::domain::ids::Identifier> {
            self.id
        }

        fn set_id(&mut self, id: $crate::domain::ids::Identifier) {
            self.id = Some(id);
        }

        fn patient_id(&self) -> Option<$crate::domain::ids::Identifier> {
            self.patient_id
        }

        fn set_patient_id(&mut self, patient_id: $crate::domain::ids::Identifier) {
            self.patient_id = Some(patient_id);
        }

        fn national_health_id(&self) -> Option<&str> {
            self.national_health_id.as_deref()
        }

        fn audit(&self) -> &$crate::domain::record::AuditFields {
            &self.audit
        }

        fn audit_mut(&mut self) -> &mut $crate::domain::record::AuditFields {
            &mut self.audit
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stamp_created_sets_quartet() {
        let now = Utc::now();
        let mut audit = AuditFields::default();
        audit.stamp_created("u1", now);
        assert_eq!(audit.created, Some(now));
        assert_eq!(audit.modified, Some(now));
        assert_eq!(audit.creator, "u1");
        assert_eq!(audit.modifier, "u1");
    }

    #[test]
    fn test_stamp_modified_is_monotonic() {
        let now = Utc::now();
        let mut audit = AuditFields::default();
        audit.stamp_created("u1", now);
        audit.stamp_modified("u2", now - Duration::seconds(30));
        assert_eq!(audit.modified, Some(now));
        assert_eq!(audit.creator, "u1");
        assert_eq!(audit.modifier, "u2");
    }

    #[test]
    fn test_list_policy_builders() {
        let policy = ListPolicy::dated("note_datetime")
            .with_tags()
            .descending_only();
        assert!(policy.tags);
        assert!(!policy.allow_ascending);
        assert_eq!(policy.date_field, Some("note_datetime"));
        assert_eq!(ListPolicy::plain().date_field, None);
    }
}
