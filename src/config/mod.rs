use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_HOST: &str = "postgres";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "hello";
const DEFAULT_DB_PASSWORD: &str = "hello";
const DEFAULT_DB_NAME: &str = "hellodb";
const DEFAULT_CONFIG_FILE: &str = "statusd.toml";

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

// ─── DatabaseConfig ───────────────────────────────────────────────────────────

/// PostgreSQL connection parameters (`[database]` in statusd.toml).
///
/// Every field can also be set via `STATUSD_DB_*` environment variables,
/// which take priority over the TOML file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database host (default: "postgres").
    pub host: String,
    /// Database port (default: 5432).
    pub port: u16,
    /// Database user (default: "hello").
    pub user: String,
    /// Database password (default: "hello").
    pub password: String,
    /// Database name (default: "hellodb").
    pub dbname: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            dbname: DEFAULT_DB_NAME.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Display summary for the status page. Never includes credentials.
    pub fn summary(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.dbname)
    }
}

// ─── EgressConfig ─────────────────────────────────────────────────────────────

/// Egress probe options (`[egress]` in statusd.toml).
///
/// The probed endpoints themselves are fixed; only transport behavior is
/// configurable here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EgressConfig {
    /// Accept invalid TLS certificates on the Cloudflare probe.
    ///
    /// Escape hatch for clusters where a sidecar (e.g. ztunnel in ambient
    /// mode) terminates or intercepts TLS and presents a certificate that
    /// does not match the upstream host. Opt-in only — leaving this off keeps
    /// full certificate verification. Also settable via
    /// `STATUSD_CLOUDFLARE_ACCEPT_INVALID_CERTS=1`.
    pub cloudflare_accept_invalid_certs: bool,
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `statusd.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 8000).
    port: Option<u16>,
    /// Bind address (default: "0.0.0.0").
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,statusd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// PostgreSQL connection parameters (`[database]`).
    database: Option<DatabaseConfig>,
    /// Egress probe options (`[egress]`).
    egress: Option<EgressConfig>,
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config file — using defaults");
            None
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

// ─── ServiceConfig ────────────────────────────────────────────────────────────

/// Resolved service configuration, passed to the probes at construction time.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub bind_address: String,
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    pub database: DatabaseConfig,
    pub egress: EgressConfig,
}

impl ServiceConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap, or `STATUSD_*` vars
    ///   2. TOML file (default: ./statusd.toml)
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        config_file: Option<PathBuf>,
    ) -> Self {
        let path = config_file.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let toml = load_toml(&path).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = env_var("STATUSD_LOG_FORMAT")
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let mut database = toml.database.unwrap_or_default();
        if let Some(host) = env_var("STATUSD_DB_HOST") {
            database.host = host;
        }
        if let Some(port) = env_var("STATUSD_DB_PORT").and_then(|s| s.parse().ok()) {
            database.port = port;
        }
        if let Some(user) = env_var("STATUSD_DB_USER") {
            database.user = user;
        }
        if let Some(password) = env_var("STATUSD_DB_PASSWORD") {
            database.password = password;
        }
        if let Some(dbname) = env_var("STATUSD_DB_NAME") {
            database.dbname = dbname;
        }

        let mut egress = toml.egress.unwrap_or_default();
        if let Some(flag) = env_var("STATUSD_CLOUDFLARE_ACCEPT_INVALID_CERTS") {
            egress.cloudflare_accept_invalid_certs = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        Self {
            port,
            bind_address,
            log,
            log_format,
            database,
            egress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Serializes tests that touch process-global environment variables.
    static ENV_TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_TEST_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[test]
    fn defaults_match_the_documented_fallbacks() {
        let _guard = env_lock();
        let config = ServiceConfig::new(None, None, None, Some(PathBuf::from("/nonexistent.toml")));

        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.log, "info");
        assert_eq!(config.log_format, "pretty");
        assert_eq!(config.database.host, "postgres");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "hello");
        assert_eq!(config.database.password, "hello");
        assert_eq!(config.database.dbname, "hellodb");
        assert!(!config.egress.cloudflare_accept_invalid_certs);
    }

    #[test]
    fn toml_file_overrides_defaults_but_not_cli() {
        let _guard = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("statusd.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
port = 9100
log = "debug"

[database]
host = "db.internal"
dbname = "statuspage"

[egress]
cloudflare_accept_invalid_certs = true
"#
        )
        .unwrap();

        // CLI port wins over TOML; TOML wins over defaults for the rest.
        let config = ServiceConfig::new(Some(9999), None, None, Some(path));
        assert_eq!(config.port, 9999);
        assert_eq!(config.log, "debug");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.dbname, "statuspage");
        // Unset TOML fields keep their defaults.
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.user, "hello");
        assert!(config.egress.cloudflare_accept_invalid_certs);
    }

    #[test]
    fn env_vars_override_toml() {
        let _guard = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("statusd.toml");
        std::fs::write(&path, "[database]\nhost = \"from-toml\"\n").unwrap();

        std::env::set_var("STATUSD_DB_HOST", "from-env");
        std::env::set_var("STATUSD_DB_PORT", "6543");
        let config = ServiceConfig::new(None, None, None, Some(path));
        std::env::remove_var("STATUSD_DB_HOST");
        std::env::remove_var("STATUSD_DB_PORT");

        assert_eq!(config.database.host, "from-env");
        assert_eq!(config.database.port, 6543);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let _guard = env_lock();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("statusd.toml");
        std::fs::write(&path, "port = \"not a number").unwrap();

        let config = ServiceConfig::new(None, None, None, Some(path));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn database_summary_excludes_credentials() {
        let config = DatabaseConfig {
            password: "s3cret".to_string(),
            ..DatabaseConfig::default()
        };
        let summary = config.summary();
        assert_eq!(summary, "postgres:5432/hellodb");
        assert!(!summary.contains("s3cret"));
    }
}
