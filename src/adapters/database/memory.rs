//! In-memory document store
//!
//! Backs the `memory` database target and the test suites. Documents live
//! in a `HashMap` behind a `tokio::sync::RwLock`; sorting works on the JSON
//! form of each document so any serialized field name can be used.

use crate::adapters::database::traits::{DateRange, Page, PageRequest, Repository};
use crate::domain::ids::Identifier;
use crate::domain::record::Record;
use crate::domain::{MedrecordError, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// `HashMap`-backed repository for one collection
pub struct MemoryRepository<E> {
    documents: RwLock<HashMap<Identifier, E>>,
}

impl<E: Record> MemoryRepository<E> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    async fn query<F>(&self, filter: F, page: &PageRequest) -> Result<Page<E>>
    where
        F: Fn(&E) -> bool + Send,
    {
        let matches: Vec<E> = {
            let documents = self.documents.read().await;
            documents.values().filter(|r| filter(*r)).cloned().collect()
        };
        paginate(matches, page)
    }
}

impl<E: Record> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn has_any_tag<E: Record>(record: &E, tags: &[String]) -> bool {
    record.tags().iter().any(|t| tags.contains(t))
}

fn paginate<E: Record>(records: Vec<E>, page: &PageRequest) -> Result<Page<E>> {
    let total_items = records.len() as u64;

    let mut keyed = records
        .into_iter()
        .map(|record| {
            let json = serde_json::to_value(&record).map_err(|e| {
                MedrecordError::Database(format!("Failed to index document for sorting: {e}"))
            })?;
            let key = json.get(&page.sort_field).cloned().unwrap_or(Value::Null);
            Ok((key, record))
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|(a_key, a), (b_key, b)| {
        let ordering = compare_json(a_key, b_key).then_with(|| a.id().cmp(&b.id()));
        if page.sort_ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });

    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let items = keyed
        .into_iter()
        .skip(skip)
        .take(page.page_size as usize)
        .map(|(_, record)| record)
        .collect();

    Ok(Page {
        items,
        page_number: page.page_number,
        page_size: page.page_size,
        total_items,
    })
}

/// Orders JSON scalars; nulls first, RFC 3339 strings chronologically
fn compare_json(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[async_trait]
impl<E: Record> Repository<E> for MemoryRepository<E> {
    async fn find_by_id(&self, id: &Identifier) -> Result<Option<E>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn find_all_by_patient_id(
        &self,
        patient_id: &Identifier,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        let patient_id = *patient_id;
        self.query(move |r| r.patient_id() == Some(patient_id), page)
            .await
    }

    async fn find_all_by_patient_id_and_tags(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        page: &PageRequest,
    ) -> Result<Page<E>> {
        let patient_id = *patient_id;
        self.query(
            move |r| r.patient_id() == Some(patient_id) && has_any_tag(r, tags),
            page,
        )
        .await
    }

    async fn find_all_by_patient_id_and_date_between(
        &self,
        patient_id: &Identifier,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        let patient_id = *patient_id;
        let range = *range;
        self.query(
            move |r| r.patient_id() == Some(patient_id) && range.contains(r.event_time()),
            page,
        )
        .await
    }

    async fn find_all_by_patient_id_and_tags_and_date_between(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        let patient_id = *patient_id;
        let range = *range;
        self.query(
            move |r| {
                r.patient_id() == Some(patient_id)
                    && has_any_tag(r, tags)
                    && range.contains(r.event_time())
            },
            page,
        )
        .await
    }

    async fn find_all_by_national_health_id(&self, national_health_id: &str) -> Result<Vec<E>> {
        let documents = self.documents.read().await;
        Ok(documents
            .values()
            .filter(|r| r.national_health_id() == Some(national_health_id))
            .cloned()
            .collect())
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<E>> {
        self.query(|_| true, page).await
    }

    async fn save(&self, mut record: E) -> Result<E> {
        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = Identifier::generate();
                record.set_id(id);
                id
            }
        };
        self.documents.write().await.insert(id, record.clone());
        Ok(record)
    }

    async fn exists_by_id(&self, id: &Identifier) -> Result<bool> {
        Ok(self.documents.read().await.contains_key(id))
    }

    async fn delete_by_id(&self, id: &Identifier) -> Result<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::{Allergy, DoctorNotes};
    use chrono::{TimeZone, Utc};

    fn note(patient: Identifier, tags: &[&str], at: i64) -> DoctorNotes {
        DoctorNotes {
            patient_id: Some(patient),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            note_datetime: Some(Utc.timestamp_opt(at, 0).unwrap()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_once() {
        let repo = MemoryRepository::<Allergy>::new();
        let saved = repo.save(Allergy::default()).await.unwrap();
        let id = saved.id.unwrap();
        let again = repo.save(saved.clone()).await.unwrap();
        assert_eq!(again.id, Some(id));
        assert_eq!(repo.len().await, 1);
        assert!(repo.exists_by_id(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryRepository::<Allergy>::new();
        let id = repo.save(Allergy::default()).await.unwrap().id.unwrap();
        assert!(repo.delete_by_id(&id).await.unwrap());
        assert!(!repo.delete_by_id(&id).await.unwrap());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tag_filter_matches_any() {
        let repo = MemoryRepository::<DoctorNotes>::new();
        let patient = Identifier::generate();
        repo.save(note(patient, &["cardio"], 10)).await.unwrap();
        repo.save(note(patient, &["neuro"], 20)).await.unwrap();
        repo.save(note(patient, &["derm"], 30)).await.unwrap();
        repo.save(note(Identifier::generate(), &["cardio"], 40))
            .await
            .unwrap();

        let tags = vec!["cardio".to_string(), "neuro".to_string()];
        let page = repo
            .find_all_by_patient_id_and_tags(&patient, &tags, &PageRequest::unpaged())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn test_sort_and_paginate_by_date_field() {
        let repo = MemoryRepository::<DoctorNotes>::new();
        let patient = Identifier::generate();
        for at in [300, 100, 200] {
            repo.save(note(patient, &[], at)).await.unwrap();
        }

        let first = PageRequest::new(0, 2, "note_datetime", false);
        let page = repo.find_all_by_patient_id(&patient, &first).await.unwrap();
        let seconds: Vec<i64> = page
            .items
            .iter()
            .map(|n| n.note_datetime.unwrap().timestamp())
            .collect();
        assert_eq!(seconds, vec![300, 200]);
        assert_eq!(page.total_items, 3);

        let second = PageRequest::new(1, 2, "note_datetime", false);
        let page = repo.find_all_by_patient_id(&patient, &second).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].note_datetime.unwrap().timestamp(), 100);
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let repo = MemoryRepository::<DoctorNotes>::new();
        let patient = Identifier::generate();
        for at in [100, 200, 300] {
            repo.save(note(patient, &["x"], at)).await.unwrap();
        }
        let range = DateRange {
            start: Some(Utc.timestamp_opt(200, 0).unwrap()),
            end: Some(Utc.timestamp_opt(300, 0).unwrap()),
        };
        let page = repo
            .find_all_by_patient_id_and_date_between(&patient, &range, &PageRequest::unpaged())
            .await
            .unwrap();
        assert_eq!(page.total_items, 2);
    }

    #[tokio::test]
    async fn test_find_by_national_health_id() {
        let repo = MemoryRepository::<Allergy>::new();
        repo.save(Allergy {
            national_health_id: Some("NHS-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
        repo.save(Allergy::default()).await.unwrap();
        assert_eq!(
            repo.find_all_by_national_health_id("NHS-1")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_compare_json_timestamps_chronologically() {
        let whole = Value::String("2023-01-01T00:00:00Z".to_string());
        let fractional = Value::String("2023-01-01T00:00:00.500Z".to_string());
        assert_eq!(compare_json(&whole, &fractional), Ordering::Less);
        assert_eq!(compare_json(&Value::Null, &whole), Ordering::Less);
    }
}
