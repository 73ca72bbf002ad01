//! Repository port
//!
//! This module defines the document store contract that every service in
//! medrecord is written against, plus the pagination types it uses.

use crate::domain::ids::Identifier;
use crate::domain::record::Record;
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Default sort field when a request leaves it empty
pub const DEFAULT_SORT_FIELD: &str = "created";

/// Page number, size and sort order of a list query
///
/// Page numbers are zero based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page_number: u32,

    /// Maximum items per page
    pub page_size: u32,

    /// Model field to sort by
    pub sort_field: String,

    /// Sort direction
    pub sort_ascending: bool,
}

impl PageRequest {
    /// Creates a page request
    pub fn new(
        page_number: u32,
        page_size: u32,
        sort_field: impl Into<String>,
        sort_ascending: bool,
    ) -> Self {
        Self {
            page_number,
            page_size,
            sort_field: sort_field.into(),
            sort_ascending,
        }
    }

    /// A single page holding everything, newest first
    pub fn unpaged() -> Self {
        Self::new(0, u32::MAX, DEFAULT_SORT_FIELD, false)
    }

    /// Number of items to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::unpaged()
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<E> {
    /// Items on this page
    pub items: Vec<E>,

    /// Zero-based page index
    pub page_number: u32,

    /// Requested page size
    pub page_size: u32,

    /// Matching items across all pages
    pub total_items: u64,
}

impl<E> Page<E> {
    /// Empty page for `request`
    pub fn empty(request: &PageRequest) -> Self {
        Self {
            items: Vec::new(),
            page_number: request.page_number,
            page_size: request.page_size,
            total_items: 0,
        }
    }

    /// Converts every item, keeping the paging metadata
    pub fn map<T, F>(self, f: F) -> Page<T>
    where
        F: FnMut(E) -> T,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}

/// Inclusive time window for date-range filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Lower bound, unbounded when `None`
    pub start: Option<DateTime<Utc>>,

    /// Upper bound, unbounded when `None`
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Whether `instant` falls inside the window
    ///
    /// Records without an instant never match a bounded window.
    pub fn contains(&self, instant: Option<DateTime<Utc>>) -> bool {
        let Some(instant) = instant else {
            return self.start.is_none() && self.end.is_none();
        };
        self.start.map_or(true, |start| instant >= start)
            && self.end.map_or(true, |end| instant <= end)
    }
}

/// Document store contract for one collection
///
/// Implementations never stamp audit fields; that is the service's job.
/// `save` assigns a fresh [`Identifier`] when the record has none.
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    /// Look up one document
    ///
    /// # Errors
    ///
    /// Returns `Database` if the store cannot be queried.
    async fn find_by_id(&self, id: &Identifier) -> Result<Option<E>>;

    /// Documents owned by one patient
    async fn find_all_by_patient_id(
        &self,
        patient_id: &Identifier,
        page: &PageRequest,
    ) -> Result<Page<E>>;

    /// Documents owned by one patient carrying at least one of `tags`
    async fn find_all_by_patient_id_and_tags(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        page: &PageRequest,
    ) -> Result<Page<E>>;

    /// Documents owned by one patient whose date field falls in `range`
    async fn find_all_by_patient_id_and_date_between(
        &self,
        patient_id: &Identifier,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>>;

    /// Tag and date-range filters combined
    async fn find_all_by_patient_id_and_tags_and_date_between(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>>;

    /// Documents carrying the given national health id
    async fn find_all_by_national_health_id(&self, national_health_id: &str) -> Result<Vec<E>>;

    /// Unscoped listing
    async fn find_all(&self, page: &PageRequest) -> Result<Page<E>>;

    /// Insert or replace a document, assigning an id if absent
    ///
    /// # Returns
    ///
    /// The stored document, with its id set.
    async fn save(&self, record: E) -> Result<E>;

    /// Whether a document with this id exists
    async fn exists_by_id(&self, id: &Identifier) -> Result<bool>;

    /// Remove a document
    ///
    /// # Returns
    ///
    /// `true` if a document was removed.
    async fn delete_by_id(&self, id: &Identifier) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unpaged_request() {
        let page = PageRequest::unpaged();
        assert_eq!(page.page_number, 0);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.sort_field, "created");
        assert!(!page.sort_ascending);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 20, "created", false).offset(), 60);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let t0 = Utc.timestamp_opt(1_000, 0).unwrap();
        let t1 = Utc.timestamp_opt(2_000, 0).unwrap();
        let range = DateRange {
            start: Some(t0),
            end: Some(t1),
        };
        assert!(range.contains(Some(t0)));
        assert!(range.contains(Some(t1)));
        assert!(!range.contains(Some(Utc.timestamp_opt(2_001, 0).unwrap())));
        assert!(!range.contains(None));
    }

    #[test]
    fn test_open_ended_range() {
        let range = DateRange {
            start: Some(Utc.timestamp_opt(1_000, 0).unwrap()),
            end: None,
        };
        assert!(range.contains(Some(Utc.timestamp_opt(9_999_999, 0).unwrap())));
    }

    #[test]
    fn test_page_map() {
        let page = Page {
            items: vec![1, 2, 3],
            page_number: 1,
            page_size: 3,
            total_items: 6,
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total_items, 6);
    }
}
