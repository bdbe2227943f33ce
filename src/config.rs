// src/config.rs

use std::{env, fmt, net::SocketAddr, path::PathBuf};

use dotenvy::dotenv;
use validator::Validate;

use crate::models::previewer::PreviewerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub log_dir: PathBuf,
    /// JSON file holding an array of previewer configs. Built-in defaults
    /// are used when unset.
    pub previewers_file: Option<PathBuf>,
    pub frame_stylesheet_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub clipboard_enabled: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, message: String },
    Previewers(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, message } => write!(f, "invalid {}: {}", key, message),
            ConfigError::Previewers(message) => write!(f, "invalid previewers file: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            rust_log: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            previewers_file: None,
            frame_stylesheet_url: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            clipboard_enabled: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let defaults = Self::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?,
            Err(_) => defaults.bind_addr,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or(defaults.rust_log);

        let log_dir = env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let previewers_file = env::var("PREVIEWERS_FILE").ok().map(PathBuf::from);

        let frame_stylesheet_url = match env::var("FRAME_STYLESHEET_URL") {
            Ok(raw) => {
                url::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    key: "FRAME_STYLESHEET_URL",
                    message: e.to_string(),
                })?;
                Some(raw)
            }
            Err(_) => None,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        let clipboard_enabled = match env::var("CLIPBOARD_ENABLED") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "CLIPBOARD_ENABLED",
                message: format!("expected true or false, got '{}'", raw),
            })?,
            Err(_) => defaults.clipboard_enabled,
        };

        Ok(Self {
            bind_addr,
            rust_log,
            log_dir,
            previewers_file,
            frame_stylesheet_url,
            cors_origins,
            clipboard_enabled,
        })
    }

    /// Startup previewer configuration, validated field by field.
    /// Plugin names are resolved later, when the workbench is initialized.
    pub fn load_previewers(&self) -> Result<Vec<PreviewerConfig>, ConfigError> {
        let Some(path) = &self.previewers_file else {
            return Ok(PreviewerConfig::defaults());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Previewers(format!("{}: {}", path.display(), e)))?;
        parse_previewers(&raw)
    }
}

pub fn parse_previewers(raw: &str) -> Result<Vec<PreviewerConfig>, ConfigError> {
    let configs: Vec<PreviewerConfig> =
        serde_json::from_str(raw).map_err(|e| ConfigError::Previewers(e.to_string()))?;
    for config in &configs {
        config
            .validate()
            .map_err(|e| ConfigError::Previewers(format!("{}: {}", config.name, e)))?;
    }
    Ok(configs)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_previewers_file() {
        let configs = parse_previewers(
            r#"[{"name": "one", "sanitizers": ["original", "ammonia"], "frame": "clean"}]"#,
        )
        .unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].sanitizers, vec!["original", "ammonia"]);
        assert_eq!(configs[0].description, "");
    }

    #[test]
    fn rejects_empty_chain_in_file() {
        let err = parse_previewers(r#"[{"name": "one", "sanitizers": [], "frame": "clean"}]"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Previewers(_)));
    }

    #[test]
    fn rejects_names_unsafe_for_ids() {
        let err = parse_previewers(r#"[{"name": "a b", "sanitizers": ["original"], "frame": "clean"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("a b"));
    }

    #[test]
    fn parses_bool_flags() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_without_previewers_file() {
        let config = Config::default();
        assert_eq!(config.load_previewers().unwrap(), PreviewerConfig::defaults());
    }
}
