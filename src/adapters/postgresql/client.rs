//! PostgreSQL client implementation
//!
//! Owns the connection pool shared by every collection's repository.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{MedrecordError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::OnceLock;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// Pooled PostgreSQL client for medrecord
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

/// Whether `name` is safe to splice into SQL as a table/field identifier
pub fn is_safe_identifier(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// Rejects identifiers that could not be spliced into SQL safely
pub fn checked_identifier(name: &str) -> Result<&str> {
    if is_safe_identifier(name) {
        Ok(name)
    } else {
        Err(MedrecordError::NotAcceptable(format!(
            "'{name}' is not a valid field name"
        )))
    }
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// `ssl_mode = "disable"` connects in plain text; `verify-ca` and
    /// `verify-full` verify the server certificate; every other mode
    /// encrypts without verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config =
            config.connection_string.expose_secret().parse().map_err(|e| {
                MedrecordError::Configuration(format!(
                    "Invalid PostgreSQL connection string: {}",
                    e
                ))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => Manager::from_config(pg_config, NoTls, manager_config),
            mode => {
                let verify = matches!(mode, "verify-ca" | "verify-full");
                let connector = TlsConnector::builder()
                    .danger_accept_invalid_certs(!verify)
                    .danger_accept_invalid_hostnames(mode != "verify-full")
                    .build()
                    .map_err(|e| {
                        MedrecordError::Configuration(format!("Failed to build TLS connector: {e}"))
                    })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                MedrecordError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        tracing::info!(
            target = %redact_connection_string(config.connection_string.expose_secret()),
            max_connections = config.max_connections,
            "PostgreSQL pool created"
        );

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| {
                MedrecordError::Database(format!(
                    "Connection test against {} failed: {}",
                    self.connection_string_safe(),
                    e
                ))
            })?;

        tracing::info!(
            server = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Create the document table of one collection if it is missing
    ///
    /// # Errors
    ///
    /// Returns an error if the collection name is not a plain identifier or
    /// the DDL fails.
    pub async fn ensure_table_exists(&self, collection: &str) -> Result<()> {
        let table = checked_identifier(collection)?;
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                patient_id TEXT,
                national_health_id TEXT,
                data JSONB NOT NULL,
                created TIMESTAMPTZ,
                modified TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS {table}_patient_id_idx ON {table} (patient_id);
            CREATE INDEX IF NOT EXISTS {table}_national_health_id_idx ON {table} (national_health_id);
            "#
        );

        let client = self.get_connection().await?;
        client.batch_execute(&ddl).await.map_err(|e| {
            MedrecordError::Database(format!("Failed to create table {table}: {}", e))
        })?;

        tracing::debug!(collection = table, "Document table ready");
        Ok(())
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            MedrecordError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    async fn connection_with_timeout(&self) -> Result<deadpool_postgres::Object> {
        let client = self.get_connection().await?;
        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.execute(&timeout_query, &[]).await.map_err(|e| {
            MedrecordError::Database(format!("Failed to set statement timeout: {}", e))
        })?;
        Ok(client)
    }

    /// Execute a query and return rows
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.connection_with_timeout().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| MedrecordError::Database(format!("Query failed: {}", e)))
    }

    /// Execute a query that returns exactly one row
    pub async fn query_one(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row> {
        let client = self.connection_with_timeout().await?;
        client
            .query_one(query, params)
            .await
            .map_err(|e| MedrecordError::Database(format!("Query failed: {}", e)))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.connection_with_timeout().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| MedrecordError::Database(format!("Statement execution failed: {}", e)))
    }

    /// Get the connection string (without credentials)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret())
    }
}

fn redact_connection_string(conn: &str) -> String {
    match conn.rsplit_once('@') {
        Some((_, host)) => format!("postgresql://***@{}", host),
        None => "postgresql://***".to_string(),
    }
}
