//! Capabilities shared by every service
//!
//! Services receive a [`ServiceContext`] at construction; nothing is read
//! from global state.

use crate::adapters::audit::{
    AuditEvent, AuditEventKind, AuditSerializer, AuditSink, JsonAuditSerializer,
    JsonLinesAuditLogger,
};
use crate::adapters::database::traits::{PageRequest, DEFAULT_SORT_FIELD};
use crate::adapters::identity::{CurrentUserResolver, StaticUserResolver};
use crate::config::schema::{MedrecordConfig, ServiceConfig};
use crate::domain::record::Record;
use crate::domain::wire::Pagination;
use crate::domain::{MedrecordError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Injected collaborators and paging defaults
#[derive(Clone)]
pub struct ServiceContext {
    pub users: Arc<dyn CurrentUserResolver>,
    pub audit: Arc<dyn AuditSink>,
    pub serializer: Arc<dyn AuditSerializer>,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl ServiceContext {
    /// Context with the JSON serializer and default page sizes
    pub fn new(users: Arc<dyn CurrentUserResolver>, audit: Arc<dyn AuditSink>) -> Self {
        let defaults = ServiceConfig::default();
        Self {
            users,
            audit,
            serializer: Arc::new(JsonAuditSerializer),
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
        }
    }

    /// Replaces the audit serializer
    pub fn with_serializer(mut self, serializer: Arc<dyn AuditSerializer>) -> Self {
        self.serializer = serializer;
        self
    }

    /// Replaces the paging defaults
    pub fn with_page_sizes(mut self, default_page_size: u32, max_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Builds the context described by `config`
    ///
    /// # Errors
    ///
    /// Returns `Io` if the audit log directory cannot be created.
    pub fn from_config(config: &MedrecordConfig) -> Result<Self> {
        let audit = JsonLinesAuditLogger::new(
            PathBuf::from(&config.audit.log_path),
            config.audit.json_format,
            config.audit.enabled,
        )?;
        Ok(Self::new(
            Arc::new(StaticUserResolver::new(config.service.system_user.clone())),
            Arc::new(audit),
        )
        .with_page_sizes(
            config.service.default_page_size,
            config.service.max_page_size,
        ))
    }

    /// Id of the acting user
    pub fn actor(&self) -> Result<String> {
        Ok(self.users.current_user()?.user_id)
    }

    /// Renders `record` for the audit trail
    ///
    /// # Errors
    ///
    /// Any failure is reported as `NotAcceptable`.
    pub fn render<E: Record>(&self, record: &E) -> Result<String> {
        let document = serde_json::to_value(record).map_err(|e| {
            MedrecordError::NotAcceptable(format!(
                "Cannot serialize {} document for audit: {e}",
                E::COLLECTION
            ))
        })?;
        self.serializer
            .render(E::COLLECTION, &document)
            .map_err(|e| match e {
                MedrecordError::NotAcceptable(_) => e,
                other => MedrecordError::NotAcceptable(format!(
                    "Cannot serialize {} document for audit: {other}",
                    E::COLLECTION
                )),
            })
    }

    /// Appends an audit event for one document
    ///
    /// # Errors
    ///
    /// A sink failure is reported as `NotAcceptable`.
    pub async fn record_event<E: Record>(
        &self,
        kind: AuditEventKind,
        actor: &str,
        record: Option<&E>,
        payload: String,
    ) -> Result<()> {
        let entity_id = record.and_then(|r| r.id()).map(|id| id.to_hex());
        let event = AuditEvent::new(kind, actor, E::COLLECTION, entity_id, payload);
        self.audit.append(event).await.map_err(|e| {
            MedrecordError::NotAcceptable(format!("Audit trail unavailable: {e}"))
        })
    }

    /// Page request for a wire pagination block
    ///
    /// A missing block or zero size uses the default page size; sizes above
    /// the maximum are clamped; an empty sort field sorts by `created`.
    pub fn page_request(&self, pagination: Option<&Pagination>) -> PageRequest {
        let Some(p) = pagination else {
            return PageRequest::new(0, self.default_page_size, DEFAULT_SORT_FIELD, false);
        };
        let page_size = match p.page_size {
            0 => self.default_page_size,
            size => size.min(self.max_page_size),
        };
        let sort_field = if p.sort.trim().is_empty() {
            DEFAULT_SORT_FIELD.to_string()
        } else {
            p.sort.trim().to_string()
        };
        PageRequest::new(p.page_number, page_size, sort_field, p.sort_ascending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::MemoryAuditSink;

    fn context() -> ServiceContext {
        ServiceContext::new(
            Arc::new(StaticUserResolver::new("u1")),
            Arc::new(MemoryAuditSink::new()),
        )
        .with_page_sizes(20, 100)
    }

    #[test]
    fn test_page_request_defaults() {
        let page = context().page_request(None);
        assert_eq!(page.page_number, 0);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.sort_field, "created");
        assert!(!page.sort_ascending);
    }

    #[test]
    fn test_page_request_clamps_and_defaults_size() {
        let ctx = context();
        let big = Pagination {
            page_number: 3,
            page_size: 10_000,
            sort: "onset_date".to_string(),
            ..Default::default()
        };
        let page = ctx.page_request(Some(&big));
        assert_eq!(page.page_size, 100);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.sort_field, "onset_date");

        let zero = Pagination::default();
        assert_eq!(ctx.page_request(Some(&zero)).page_size, 20);
    }

    #[test]
    fn test_actor_comes_from_resolver() {
        assert_eq!(context().actor().unwrap(), "u1");
    }
}
