use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Workspace directory holding the site snapshot and log store.
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub operation: OperationConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("environment variable '{0}' is not set")]
    MissingEnvVar(String),

    #[error("unclosed variable reference '${{' (missing '}}')")]
    UnclosedVarReference,

    #[error(
        "invalid log retention period {0}; allowed values are 0 (keep forever), 7, 15, 30, 60, 90, 180 or 365 days"
    )]
    InvalidRetention(u32),

    #[error("invalid sweep schedule '{expr}': {message}")]
    InvalidSweepSchedule { expr: String, message: String },
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let expanded = expand_env_vars(&contents)?;
        let config: Self = serde_saphyr::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject option values the service would silently misbehave on.
    fn validate(&self) -> Result<(), ConfigError> {
        if !ALLOWED_RETENTION_DAYS.contains(&self.logs.retention_days) {
            return Err(ConfigError::InvalidRetention(self.logs.retention_days));
        }
        if let Err(e) = crate::retention::parse_schedule(&self.logs.sweep_cron) {
            return Err(ConfigError::InvalidSweepSchedule {
                expr: self.logs.sweep_cron.clone(),
                message: e,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for /api/v1 routes. Unset means loopback-only access.
    pub api_token: Option<String>,
    /// Bearer token for /api/admin/v1 routes. Unset means loopback-only access.
    pub admin_token: Option<String>,
    pub request_timeout_seconds: u64,
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            admin_token: None,
            request_timeout_seconds: default_request_timeout(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    /// Path to the site snapshot file. Defaults to `<workspace>/site.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    /// Directory for the activity log store. Defaults to `<workspace>/logs`.
    pub path: Option<PathBuf>,
    /// How many days to keep activity log entries. 0 keeps them forever.
    pub retention_days: u32,
    /// 7-field cron expression for the daily retention sweep.
    pub sweep_cron: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            path: None,
            retention_days: default_retention_days(),
            sweep_cron: default_sweep_cron(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    /// Minutes an unfinished operation's persisted state stays alive.
    pub ttl_minutes: u64,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_operation_ttl_minutes(),
        }
    }
}

/// Resolve a path relative to the config file directory.
///
/// Absolute paths are returned as-is; relative paths are joined with the
/// config file's parent directory so behavior does not depend on the
/// current working directory.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// Defaults
// ============================================================================

/// Default workspace directory (relative to config file).
pub const DEFAULT_WORKSPACE: &str = ".bulksweep";
/// Default site snapshot file name (relative to workspace).
pub const DEFAULT_SITE_FILE: &str = "site.json";
/// Default activity log directory (relative to workspace).
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Retention periods the original tooling accepts, in days.
pub const ALLOWED_RETENTION_DAYS: [u32; 8] = [0, 7, 15, 30, 60, 90, 180, 365];

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8680
}

fn default_request_timeout() -> u64 {
    300
}

fn default_max_connections() -> usize {
    64
}

fn default_retention_days() -> u32 {
    30
}

fn default_sweep_cron() -> String {
    // sec min hour day-of-month month day-of-week year
    "0 0 3 * * * *".to_string()
}

fn default_operation_ttl_minutes() -> u64 {
    60
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in a config file body.
///
/// Shell-compatible syntax:
/// - `${VAR}` - required, errors when unset
/// - `${VAR:-default}` - optional with default (empty default allowed)
/// - `$$` - escaped `$` (only needed before `{`)
///
/// Nested references are not supported; an unclosed `${` is an error.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('{') => {
                chars.next();
                out.push_str(&expand_var_reference(&mut chars)?);
            }
            _ => out.push('$'),
        }
    }

    Ok(out)
}

/// Resolve one `${...}` reference, starting just past the opening brace.
fn expand_var_reference(
    chars: &mut std::iter::Peekable<std::str::Chars>,
) -> Result<String, ConfigError> {
    let mut name = String::new();
    let mut default_value: Option<String> = None;

    loop {
        let Some(c) = chars.next() else {
            return Err(ConfigError::UnclosedVarReference);
        };
        match c {
            '}' => break,
            ':' if default_value.is_none() && chars.peek() == Some(&'-') => {
                chars.next();
                default_value = Some(String::new());
            }
            _ => match default_value.as_mut() {
                Some(d) => d.push(c),
                None => name.push(c),
            },
        }
    }

    match std::env::var(&name) {
        Ok(value) => Ok(value),
        Err(_) => default_value.ok_or(ConfigError::MissingEnvVar(name)),
    }
}

// ============================================================================
// Tests
// ============================================================================
