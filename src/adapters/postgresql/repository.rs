//! PostgreSQL repository
//!
//! Implements [`Repository`] for any [`Record`] over the JSONB table named
//! after its collection.

use crate::adapters::database::traits::{DateRange, Page, PageRequest, Repository};
use crate::adapters::postgresql::client::{checked_identifier, PostgreSQLClient};
use crate::adapters::postgresql::models::{record_from_row, DocumentRow};
use crate::domain::ids::Identifier;
use crate::domain::record::Record;
use crate::domain::{MedrecordError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Optional predicates of a list query
#[derive(Debug, Default)]
struct Filter {
    patient_id: Option<String>,
    tags: Option<Vec<String>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl Filter {
    fn patient(patient_id: &Identifier) -> Self {
        Self {
            patient_id: Some(patient_id.to_hex()),
            ..Default::default()
        }
    }

    fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = Some(tags.to_vec());
        self
    }

    fn with_range(mut self, range: &DateRange) -> Self {
        self.start = range.start;
        self.end = range.end;
        self
    }
}

/// Document repository for collection `E::COLLECTION`
pub struct PostgresRepository<E> {
    client: Arc<PostgreSQLClient>,
    _record: PhantomData<fn() -> E>,
}

impl<E: Record> PostgresRepository<E> {
    /// Create a repository sharing `client`'s pool
    pub fn new(client: Arc<PostgreSQLClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    /// Create the backing table if missing
    pub async fn ensure_table(&self) -> Result<()> {
        self.client.ensure_table_exists(E::COLLECTION).await
    }

    fn date_expression() -> Result<String> {
        let field = E::LIST_POLICY.date_field.ok_or_else(|| {
            MedrecordError::NotAcceptable(format!(
                "{} does not support date-range filters",
                E::COLLECTION
            ))
        })?;
        Ok(format!("(data->>'{}')::timestamptz", checked_identifier(field)?))
    }

    /// Date fields sort as instants; JSON strings with uneven fractional
    /// digits do not order chronologically
    fn order_expression(page: &PageRequest) -> Result<String> {
        let column = match page.sort_field.as_str() {
            "created" | "modified" | "id" => page.sort_field.clone(),
            field if E::LIST_POLICY.date_field == Some(field) => {
                format!("(data->>'{}')::timestamptz", checked_identifier(field)?)
            }
            field => format!("data->'{}'", checked_identifier(field)?),
        };
        let direction = if page.sort_ascending { "ASC" } else { "DESC" };
        Ok(format!("{column} {direction} NULLS LAST, id {direction}"))
    }

    async fn select_page(&self, filter: Filter, page: &PageRequest) -> Result<Page<E>> {
        let table = checked_identifier(E::COLLECTION)?;
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(patient_id) = &filter.patient_id {
            params.push(patient_id);
            clauses.push(format!("patient_id = ${}", params.len()));
        }
        if let Some(tags) = &filter.tags {
            params.push(tags);
            clauses.push(format!("data->'tags' ?| ${}", params.len()));
        }
        if let Some(start) = &filter.start {
            params.push(start);
            clauses.push(format!("{} >= ${}", Self::date_expression()?, params.len()));
        }
        if let Some(end) = &filter.end {
            params.push(end);
            clauses.push(format!("{} <= ${}", Self::date_expression()?, params.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count_row = self
            .client
            .query_one(
                &format!("SELECT COUNT(*) FROM {table} {where_clause}"),
                &params,
            )
            .await?;
        let total: i64 = count_row
            .try_get(0)
            .map_err(|e| MedrecordError::Database(format!("Invalid count row: {e}")))?;
        if total == 0 {
            return Ok(Page::empty(page));
        }

        let limit = i64::from(page.page_size);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let mut page_params = params.clone();
        page_params.push(&limit);
        let limit_index = page_params.len();
        page_params.push(&offset);
        let offset_index = page_params.len();

        let query = format!(
            "SELECT data FROM {table} {where_clause} ORDER BY {} LIMIT ${limit_index} OFFSET ${offset_index}",
            Self::order_expression(page)?
        );
        let rows = self.client.query(&query, &page_params).await?;

        let items = rows
            .iter()
            .map(record_from_row::<E>)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            items,
            page_number: page.page_number,
            page_size: page.page_size,
            total_items: u64::try_from(total).unwrap_or(0),
        })
    }
}

#[async_trait]
impl<E: Record> Repository<E> for PostgresRepository<E> {
    async fn find_by_id(&self, id: &Identifier) -> Result<Option<E>> {
        let table = checked_identifier(E::COLLECTION)?;
        let id = id.to_hex();
        let rows = self
            .client
            .query(&format!("SELECT data FROM {table} WHERE id = $1"), &[&id])
            .await?;
        rows.first().map(record_from_row::<E>).transpose()
    }

    async fn find_all_by_patient_id(
        &self,
        patient_id: &Identifier,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        self.select_page(Filter::patient(patient_id), page).await
    }

    async fn find_all_by_patient_id_and_tags(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        page: &PageRequest,
    ) -> Result<Page<E>> {
        self.select_page(Filter::patient(patient_id).with_tags(tags), page)
            .await
    }

    async fn find_all_by_patient_id_and_date_between(
        &self,
        patient_id: &Identifier,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        self.select_page(Filter::patient(patient_id).with_range(range), page)
            .await
    }

    async fn find_all_by_patient_id_and_tags_and_date_between(
        &self,
        patient_id: &Identifier,
        tags: &[String],
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<Page<E>> {
        self.select_page(
            Filter::patient(patient_id).with_tags(tags).with_range(range),
            page,
        )
        .await
    }

    async fn find_all_by_national_health_id(&self, national_health_id: &str) -> Result<Vec<E>> {
        let table = checked_identifier(E::COLLECTION)?;
        let rows = self
            .client
            .query(
                &format!("SELECT data FROM {table} WHERE national_health_id = $1"),
                &[&national_health_id],
            )
            .await?;
        rows.iter().map(record_from_row::<E>).collect()
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<E>> {
        self.select_page(Filter::default(), page).await
    }

    async fn save(&self, mut record: E) -> Result<E> {
        if record.id().is_none() {
            record.set_id(Identifier::generate());
        }
        let row = DocumentRow::from_record(&record)?;
        let table = checked_identifier(E::COLLECTION)?;

        let upsert = format!(
            r#"
            INSERT INTO {table} (id, patient_id, national_health_id, data, created, modified)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                patient_id = EXCLUDED.patient_id,
                national_health_id = EXCLUDED.national_health_id,
                data = EXCLUDED.data,
                modified = EXCLUDED.modified
            "#
        );

        self.client
            .execute(
                &upsert,
                &[
                    &row.id,
                    &row.patient_id,
                    &row.national_health_id,
                    &row.data,
                    &row.created,
                    &row.modified,
                ],
            )
            .await?;

        tracing::debug!(collection = E::COLLECTION, id = %row.id, "Document saved");
        Ok(record)
    }

    async fn exists_by_id(&self, id: &Identifier) -> Result<bool> {
        let table = checked_identifier(E::COLLECTION)?;
        let id = id.to_hex();
        let row = self
            .client
            .query_one(
                &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"),
                &[&id],
            )
            .await?;
        row.try_get(0)
            .map_err(|e| MedrecordError::Database(format!("Invalid exists row: {e}")))
    }

    async fn delete_by_id(&self, id: &Identifier) -> Result<bool> {
        let table = checked_identifier(E::COLLECTION)?;
        let id = id.to_hex();
        let affected = self
            .client
            .execute(&format!("DELETE FROM {table} WHERE id = $1"), &[&id])
            .await?;
        Ok(affected > 0)
    }
}
