//! Audit trail
//!
//! Every read disclosure and every mutation is recorded as an
//! [`AuditEvent`]. Rendering the affected document is a separate
//! capability ([`AuditSerializer`]) because a rendering failure fails the
//! whole request.
//!
//! File entries never carry the document itself, only its SHA-256 digest.

use crate::domain::{MedrecordError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// What happened to the audited document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventKind {
    Create,
    Read,
    Update,
    Delete,
    List,
    Import,
    Export,
}

/// One audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub kind: AuditEventKind,
    /// Acting user
    pub actor: String,
    pub collection: String,
    pub entity_id: Option<String>,
    /// Rendered document
    pub payload: String,
    pub payload_sha256: String,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    /// Builds an event stamped now, hashing `payload`
    pub fn new(
        kind: AuditEventKind,
        actor: impl Into<String>,
        collection: impl Into<String>,
        entity_id: Option<String>,
        payload: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            actor: actor.into(),
            collection: collection.into(),
            entity_id,
            payload_sha256: sha256_hex(&payload),
            payload,
            at: Utc::now(),
        }
    }
}

/// Hex SHA-256 of `value`
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Destination of audit events
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one event
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be persisted.
    async fn append(&self, event: AuditEvent) -> Result<()>;
}

/// Renders a document for the audit trail
pub trait AuditSerializer: Send + Sync {
    /// Render `document`, a record of `collection`
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller as `NotAcceptable`.
    fn render(&self, collection: &str, document: &Value) -> Result<String>;
}

/// Compact JSON rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAuditSerializer;

impl AuditSerializer for JsonAuditSerializer {
    fn render(&self, _collection: &str, document: &Value) -> Result<String> {
        Ok(serde_json::to_string(document)?)
    }
}

/// File entry; the payload is replaced by its digest
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    id: String,
    timestamp: String,
    kind: AuditEventKind,
    actor: &'a str,
    collection: &'a str,
    entity_id: Option<&'a str>,
    payload_sha256: &'a str,
}

/// Append-only audit log file
pub struct JsonLinesAuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    write_lock: Mutex<()>,
}

impl JsonLinesAuditLogger {
    /// Create a new audit logger, creating the log directory when enabled
    ///
    /// # Errors
    ///
    /// Returns `Io` if the parent directory cannot be created.
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MedrecordError::Io(format!(
                        "Failed to create audit log directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            write_lock: Mutex::new(()),
        })
    }

    fn format_entry(&self, event: &AuditEvent) -> Result<String> {
        let entry = AuditLogEntry {
            id: event.id.to_string(),
            timestamp: event.at.to_rfc3339(),
            kind: event.kind,
            actor: &event.actor,
            collection: &event.collection,
            entity_id: event.entity_id.as_deref(),
            payload_sha256: &event.payload_sha256,
        };

        if self.json_format {
            Ok(serde_json::to_string(&entry)?)
        } else {
            Ok(format!(
                "[{}] {:?} {}/{} by {} | sha256: {}",
                entry.timestamp,
                entry.kind,
                entry.collection,
                entry.entity_id.unwrap_or("-"),
                entry.actor,
                entry.payload_sha256
            ))
        }
    }
}

#[async_trait]
impl AuditSink for JsonLinesAuditLogger {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let line = self.format_entry(&event)?;
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                MedrecordError::Io(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;
        writeln!(file, "{line}")
            .map_err(|e| MedrecordError::Io(format!("Failed to write audit entry: {e}")))?;

        Ok(())
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of recorded events of `kind`
    pub fn count(&self, kind: AuditEventKind) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, event: AuditEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
        Ok(())
    }
}
