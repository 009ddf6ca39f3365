//! Server configuration.
//!
//! The configuration is loaded once at start-up and never changes afterwards.
//! Two on-disk formats are accepted:
//!
//! - YAML (`.yaml` / `.yml`), e.g. `port: 8080`
//! - plain `key=value` lines (any other extension), e.g. `port=8080`
//!
//! Both formats use the same keys: `port`, `maxThreads`, `root`,
//! `defaultPage` and the optional `host`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no path is passed on the command line.
pub const CONFIG_ENV: &str = "DOCROOT_CONFIG";

/// Fallback config file name.
pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: i64 = 8080;
const DEFAULT_MAX_THREADS: i64 = 10;
const DEFAULT_PAGE: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Format(#[from] serde_yaml::Error),

    #[error("line {line}: expected `key=value`, found {text:?}")]
    Syntax { line: usize, text: String },

    #[error("missing required key `{0}`")]
    Missing(&'static str),

    #[error("port must be between 1 and 65535, got {0}")]
    InvalidPort(i64),

    #[error("maxThreads must be greater than zero, got {0}")]
    InvalidMaxThreads(i64),

    #[error("document root {0} does not exist or is not a directory")]
    InvalidRoot(PathBuf),

    #[error("defaultPage must be a plain file name, got {0:?}")]
    InvalidDefaultPage(String),
}

/// Keys as they appear in the config file, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    host: Option<String>,
    port: Option<i64>,
    max_threads: Option<i64>,
    root: Option<PathBuf>,
    default_page: Option<String>,
}

/// Validated, read-only server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, `0.0.0.0` unless overridden
    pub host: String,
    pub port: u16,
    /// Canonical absolute path of the served directory
    pub document_root: PathBuf,
    /// File served when a directory is requested
    pub default_page: String,
    /// Upper bound on connections handled at the same time
    pub max_workers: usize,
}

impl ServerConfig {
    /// Loads the configuration from the path given as first CLI argument,
    /// then `DOCROOT_CONFIG`, then `config.ini`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(config_path(std::env::args().nth(1)))
    }

    /// Reads and validates a config file, picking the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        if is_yaml {
            Self::from_yaml_str(&text)
        } else {
            Self::from_key_value_str(&text)
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(text)?;
        Self::validate(raw)
    }

    /// Parses the `key=value` format. Blank lines and lines starting with
    /// `#` or `;` are ignored; later keys override earlier ones.
    pub fn from_key_value_str(text: &str) -> Result<Self, ConfigError> {
        let mut mapping = serde_yaml::Mapping::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Syntax {
                line: index + 1,
                text: line.to_string(),
            })?;

            let key = key.trim();
            mapping.insert(
                serde_yaml::Value::String(key.to_string()),
                scalar(key, value.trim()),
            );
        }

        let raw: RawConfig = serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))?;
        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let port = raw.port.unwrap_or(DEFAULT_PORT);
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p > 0)
            .ok_or(ConfigError::InvalidPort(port))?;

        let max_threads = raw.max_threads.unwrap_or(DEFAULT_MAX_THREADS);
        let max_workers = usize::try_from(max_threads)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::InvalidMaxThreads(max_threads))?;

        let root = raw.root.ok_or(ConfigError::Missing("root"))?;
        let document_root = std::fs::canonicalize(&root)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| ConfigError::InvalidRoot(root.clone()))?;

        let default_page = raw.default_page.unwrap_or_else(|| DEFAULT_PAGE.to_string());
        if !is_plain_file_name(&default_page) {
            return Err(ConfigError::InvalidDefaultPage(default_page));
        }

        Ok(Self {
            host: raw.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            document_root,
            default_page,
            max_workers,
        })
    }

    /// Address the listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Picks the config file: an explicit argument wins over `DOCROOT_CONFIG`,
/// which wins over `config.ini`.
pub fn config_path(cli_arg: Option<String>) -> PathBuf {
    cli_arg
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

const INTEGER_KEYS: [&str; 2] = ["port", "maxThreads"];

// Integer keys stay numeric so `port=8080` and `port: 8080` deserialize
// alike. Every other value is text, even `defaultPage=404`.
fn scalar(key: &str, value: &str) -> serde_yaml::Value {
    if INTEGER_KEYS.contains(&key) {
        if let Ok(n) = value.parse::<i64>() {
            return serde_yaml::Value::Number(n.into());
        }
    }
    serde_yaml::Value::String(value.to_string())
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
