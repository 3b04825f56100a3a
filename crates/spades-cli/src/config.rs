use serde::Deserialize;
use spades_core::model::variant::RuleVariant;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "spades.yaml";
const DEFAULT_SAVE_PATH: &str = "spades-state.json";
const DEFAULT_LOG_PATH: &str = "spades-log.jsonl";

/// Scorekeeper configuration loaded from YAML. Every field is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CliConfig {
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,
    #[serde(default = "default_variant_name")]
    pub default_variant: String,
    #[serde(default)]
    pub auto_confirm: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            default_variant: default_variant_name(),
            auto_confirm: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let cfg: Option<CliConfig> =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        let mut cfg = cfg.unwrap_or_default();
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Load `path` when it exists, otherwise fall back to defaults. An explicit
    /// path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_path(path),
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_PATH);
                if implicit.exists() {
                    Self::from_path(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.save_path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "save_path".to_string(),
                message: "path must not be empty".to_string(),
            });
        }
        self.variant()?;
        self.logging.normalize();
        if self.logging.level().is_none() {
            return Err(ValidationError::InvalidField {
                field: "logging.tracing_level".to_string(),
                message: format!("unknown level '{}'", self.logging.tracing_level),
            });
        }
        Ok(())
    }

    pub fn variant(&self) -> Result<RuleVariant, ValidationError> {
        RuleVariant::from_str(&self.default_variant).ok_or_else(|| {
            ValidationError::InvalidField {
                field: "default_variant".to_string(),
                message: format!(
                    "unknown variant '{}' (expected regular, short, tournament or tournament_finals)",
                    self.default_variant
                ),
            }
        })
    }
}

fn default_save_path() -> PathBuf {
    PathBuf::from(DEFAULT_SAVE_PATH)
}

fn default_variant_name() -> String {
    RuleVariant::default().as_str().to_string()
}

/// Logging configuration defaults to a quiet stderr writer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_path: default_log_path(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
        if self.log_path.as_os_str().is_empty() {
            self.log_path = default_log_path();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_PATH)
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASIC_YAML: &str = r#"
save_path: "saves/club-night.json"
default_variant: "tournament"
auto_confirm: true
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: CliConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.save_path, PathBuf::from("saves/club-night.json"));
        assert_eq!(cfg.variant().expect("variant"), RuleVariant::Tournament);
        assert!(cfg.auto_confirm);
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.logging.log_path, PathBuf::from(DEFAULT_LOG_PATH));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# nothing configured").expect("write");
        let cfg = CliConfig::from_path(file.path()).expect("load");
        assert_eq!(cfg, CliConfig::default());
        assert_eq!(cfg.variant().expect("variant"), RuleVariant::Regular);
    }

    #[test]
    fn rejects_unknown_variant() {
        let yaml = BASIC_YAML.replace("\"tournament\"", "\"speed\"");
        let mut cfg: CliConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "default_variant"
        ));
    }

    #[test]
    fn rejects_unknown_tracing_level() {
        let yaml = BASIC_YAML.replace("\"debug\"", "\"chatty\"");
        let mut cfg: CliConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "logging.tracing_level"
        ));
    }

    #[test]
    fn blank_tracing_level_is_normalized() {
        let yaml = BASIC_YAML.replace("\"debug\"", "\"\"");
        let mut cfg: CliConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.logging.tracing_level, "warn");
    }

    #[test]
    fn missing_explicit_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.yaml");
        let err = CliConfig::load(Some(missing.as_path())).expect_err("should fail");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.path(), missing.as_path());
    }
}
