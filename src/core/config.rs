//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.sandpane/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SandpaneConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// 0 = unbounded.
    pub max_entries: Option<usize>,
    pub show_on_start: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigationConfig {
    pub default_url: Option<String>,
    /// 0 disables rollback of unconfirmed back/forward requests.
    pub ack_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub max_entries: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1000;
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_URL: &str = "https://codesandbox.io/";
pub const DEFAULT_LOG_FILE: &str = "sandpane.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// None = unbounded.
    pub max_log_entries: Option<NonZeroUsize>,
    pub show_console: bool,
    pub default_url: String,
    pub ack_timeout: Duration,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with(&SandpaneConfig::default(), &CliOverrides::default(), |_| None)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.sandpane/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".sandpane").join("config.toml"))
}

/// Load config from `~/.sandpane/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `SandpaneConfig::default()`.
pub fn load_config() -> Result<SandpaneConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(SandpaneConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(SandpaneConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path. Unlike `load_config`, a missing file
/// is an error.
pub fn load_config_from(path: &Path) -> Result<SandpaneConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: SandpaneConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# sandpane configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [console]
# max_entries = 1000                 # 0 keeps every line
# show_on_start = true

# [navigation]
# default_url = "https://codesandbox.io/"
# ack_timeout_ms = 3000              # 0 never rolls back back/forward

# [logging]
# file = "sandpane.log"
# level = "info"                     # "off", "error", "warn", "info", "debug", "trace"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &SandpaneConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

fn resolve_with<F>(config: &SandpaneConfig, cli: &CliOverrides, env: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    // Console capacity: CLI → env → config → default
    let max_entries = cli
        .max_entries
        .or_else(|| env("SANDPANE_MAX_LOG_ENTRIES").and_then(|v| parse_env("SANDPANE_MAX_LOG_ENTRIES", &v)))
        .or(config.console.max_entries)
        .unwrap_or(DEFAULT_MAX_LOG_ENTRIES);

    // Default URL: env → config → default
    let default_url = env("SANDPANE_DEFAULT_URL")
        .or_else(|| config.navigation.default_url.clone())
        .filter(|candidate| match Url::parse(candidate) {
            Ok(_) => true,
            Err(e) => {
                warn!("Ignoring invalid default_url {candidate:?}: {e}");
                false
            }
        })
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    // Ack timeout: env → config → default
    let ack_timeout_ms = env("SANDPANE_ACK_TIMEOUT_MS")
        .and_then(|v| parse_env("SANDPANE_ACK_TIMEOUT_MS", &v))
        .or(config.navigation.ack_timeout_ms)
        .unwrap_or(DEFAULT_ACK_TIMEOUT_MS);

    // Log file: CLI → env → config → default
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| env("SANDPANE_LOG_FILE").map(PathBuf::from))
        .or_else(|| config.logging.file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| env("SANDPANE_LOG_LEVEL"))
        .or_else(|| config.logging.level.clone())
        .and_then(|level| parse_env("log level", &level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        max_log_entries: NonZeroUsize::new(max_entries),
        show_console: config.console.show_on_start.unwrap_or(true),
        default_url,
        ack_timeout: Duration::from_millis(ack_timeout_ms),
        log_file,
        log_level,
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {name}: {value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = SandpaneConfig::default();
        assert!(config.console.max_entries.is_none());
        assert!(config.navigation.default_url.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&SandpaneConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.max_log_entries, NonZeroUsize::new(DEFAULT_MAX_LOG_ENTRIES));
        assert!(resolved.show_console);
        assert_eq!(resolved.default_url, DEFAULT_URL);
        assert_eq!(resolved.ack_timeout, Duration::from_millis(DEFAULT_ACK_TIMEOUT_MS));
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(resolved.log_level, LevelFilter::Info);
        assert_eq!(resolved, ResolvedConfig::default());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = SandpaneConfig {
            console: ConsoleConfig {
                max_entries: Some(0),
                show_on_start: Some(false),
            },
            navigation: NavigationConfig {
                default_url: Some("http://localhost:3000/".to_string()),
                ack_timeout_ms: Some(0),
            },
            logging: LoggingConfig {
                file: Some("/tmp/pane.log".to_string()),
                level: Some("debug".to_string()),
            },
        };
        let resolved = resolve_with(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.max_log_entries, None);
        assert!(!resolved.show_console);
        assert_eq!(resolved.default_url, "http://localhost:3000/");
        assert!(resolved.ack_timeout.is_zero());
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/pane.log"));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_resolve_env_beats_file_and_cli_beats_env() {
        let config = SandpaneConfig {
            console: ConsoleConfig {
                max_entries: Some(10),
                ..Default::default()
            },
            navigation: NavigationConfig {
                ack_timeout_ms: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };
        let env: HashMap<&str, &str> = HashMap::from([
            ("SANDPANE_MAX_LOG_ENTRIES", "20"),
            ("SANDPANE_ACK_TIMEOUT_MS", "250"),
            ("SANDPANE_LOG_LEVEL", "warn"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let resolved = resolve_with(&config, &CliOverrides::default(), lookup);
        assert_eq!(resolved.max_log_entries, NonZeroUsize::new(20));
        assert_eq!(resolved.ack_timeout, Duration::from_millis(250));
        assert_eq!(resolved.log_level, LevelFilter::Warn);

        let cli = CliOverrides {
            max_entries: Some(30),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with(&config, &cli, lookup);
        assert_eq!(resolved.max_log_entries, NonZeroUsize::new(30));
        assert_eq!(resolved.log_level, LevelFilter::Trace);
    }

    #[test]
    fn test_resolve_ignores_invalid_values() {
        let config = SandpaneConfig {
            navigation: NavigationConfig {
                default_url: Some("not a url".to_string()),
                ..Default::default()
            },
            logging: LoggingConfig {
                level: Some("chatty".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let lookup = |key: &str| (key == "SANDPANE_MAX_LOG_ENTRIES").then(|| "lots".to_string());
        let resolved = resolve_with(&config, &CliOverrides::default(), lookup);
        assert_eq!(resolved.default_url, DEFAULT_URL);
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(resolved.max_log_entries, NonZeroUsize::new(DEFAULT_MAX_LOG_ENTRIES));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; the rest stays default
        let toml_str = r#"
[navigation]
ack_timeout_ms = 750
"#;
        let config: SandpaneConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.navigation.ack_timeout_ms, Some(750));
        assert!(config.navigation.default_url.is_none());
        assert!(config.console.max_entries.is_none());
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_load_config_from_reports_parse_errors() {
        let path = std::env::temp_dir().join(format!("sandpane_bad_{}.toml", std::process::id()));
        fs::write(&path, "[console]\nmax_entries = \"many\"\n").unwrap();
        let result = load_config_from(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_from_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("sandpane_definitely_missing.toml");
        assert!(matches!(load_config_from(&path), Err(ConfigError::Io(_))));
    }
}
