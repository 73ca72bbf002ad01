//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, MedrecordConfig};
use super::secret_string;
use crate::domain::errors::MedrecordError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into MedrecordConfig
/// 4. Applies environment variable overrides (MEDRECORD_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use medrecord::config::loader::load_config;
///
/// let config = load_config("medrecord.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MedrecordConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MedrecordError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MedrecordError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration text
///
/// # Errors
///
/// Same as [`load_config`] minus the file access failures.
pub fn parse_config(contents: &str) -> Result<MedrecordConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: MedrecordConfig = toml::from_str(&contents)
        .map_err(|e| MedrecordError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        MedrecordError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| MedrecordError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MedrecordError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Reads and parses an override variable
///
/// A value that does not parse is a configuration error rather than being
/// silently ignored.
fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.parse().map(Some).map_err(|_| {
            MedrecordError::Configuration(format!("Invalid value '{val}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using MEDRECORD_* prefix
///
/// Environment variables follow the pattern: MEDRECORD_<SECTION>_<KEY>
/// For example: MEDRECORD_SERVICE_MAX_PAGE_SIZE, MEDRECORD_AUDIT_ENABLED
fn apply_env_overrides(config: &mut MedrecordConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("MEDRECORD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("MEDRECORD_DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "memory" => DatabaseTarget::Memory,
            "postgresql" => DatabaseTarget::PostgreSQL,
            other => {
                return Err(MedrecordError::Configuration(format!(
                    "Invalid MEDRECORD_DATABASE_TARGET '{other}'. Must be memory or postgresql"
                )));
            }
        };
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("MEDRECORD_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = env_override("MEDRECORD_POSTGRESQL_MAX_CONNECTIONS")? {
            pg_config.max_connections = val;
        }
        if let Some(val) = env_override("MEDRECORD_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS")? {
            pg_config.statement_timeout_seconds = val;
        }
        if let Ok(val) = std::env::var("MEDRECORD_POSTGRESQL_SSL_MODE") {
            pg_config.ssl_mode = val;
        }
    }

    // Service overrides
    if let Some(val) = env_override("MEDRECORD_SERVICE_DEFAULT_PAGE_SIZE")? {
        config.service.default_page_size = val;
    }
    if let Some(val) = env_override("MEDRECORD_SERVICE_MAX_PAGE_SIZE")? {
        config.service.max_page_size = val;
    }
    if let Ok(val) = std::env::var("MEDRECORD_SERVICE_SYSTEM_USER") {
        config.service.system_user = val;
    }

    // Audit overrides
    if let Some(val) = env_override("MEDRECORD_AUDIT_ENABLED")? {
        config.audit.enabled = val;
    }
    if let Ok(val) = std::env::var("MEDRECORD_AUDIT_LOG_PATH") {
        config.audit.log_path = val;
    }
    if let Some(val) = env_override("MEDRECORD_AUDIT_JSON_FORMAT")? {
        config.audit.json_format = val;
    }

    // Registry overrides
    if let Some(val) = env_override("MEDRECORD_REGISTRY_ENABLED")? {
        config.registry.enabled = val;
    }
    if let Ok(val) = std::env::var("MEDRECORD_REGISTRY_BASE_URL") {
        config.registry.base_url = val;
    }
    if let Some(val) = env_override("MEDRECORD_REGISTRY_TIMEOUT_SECONDS")? {
        config.registry.timeout_seconds = val;
    }

    // Aggregation overrides
    if let Some(val) = env_override("MEDRECORD_AGGREGATION_PROCESS_ON_REQUEST")? {
        config.aggregation.process_on_request = val;
    }

    // Logging overrides
    if let Some(val) = env_override("MEDRECORD_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("MEDRECORD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("MEDRECORD_LOADER_TEST_VAR", "test_value");
        let input = "password = \"${MEDRECORD_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("MEDRECORD_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("MEDRECORD_LOADER_MISSING_VAR");
        let input = "password = \"${MEDRECORD_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("MEDRECORD_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitution_skips_comments() {
        let input = "# password = \"${MEDRECORD_NEVER_SET}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
database_target = "memory"

[application]
log_level = "debug"

[service]
default_page_size = 25
max_page_size = 100
system_user = "importer"

[audit]
enabled = false

[aggregation]
process_on_request = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.database_target, DatabaseTarget::Memory);
        assert_eq!(config.service.default_page_size, 25);
        assert_eq!(config.service.system_user, "importer");
        assert!(!config.audit.enabled);
        assert!(config.aggregation.process_on_request);
    }

    #[test]
    fn test_validation_failure_is_configuration_error() {
        let err = parse_config("[application]\nlog_level = \"loud\"\n").unwrap_err();
        assert!(matches!(err, MedrecordError::Configuration(_)));
        assert!(err.to_string().contains("validation failed"));
    }
}
