//! # Configuration
//!
//! Every section is optional in the YAML file and falls back to the values
//! below, so an empty document is a valid configuration.
//!
//! ```yaml
//! database:
//!   path: var/fairsharing-ont-lite.db
//! logger:
//!   enable: true
//!   level: info
//!   format: compact
//! reasoner:
//!   backend: structural
//! annotations:
//!   alternative_term: http://purl.obolibrary.org/obo/IAO_0000118
//!   preferred_display_name: http://www.fairsharing.org/fairsharing/FAIRO_0000001
//!   extra_synonyms: []
//! mapping:
//!   key_strategy: fragment
//!   representative: oracle
//! categories:
//!   - keyword: disciplines
//!     category: DISCIPLINE
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    mapping::{
        classifier::{self, CategoryRule, LabelClassifier},
        hierarchy::RepresentativePolicy,
        names::KeyStrategy,
    },
    ontology::vocab,
    Error, Result,
};

/// Store location used when neither the command line nor the configuration
/// names one.
pub const DEFAULT_DB_PATH: &str = "var/fairsharing-ont-lite.db";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub logger: Logger,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub annotations: AnnotationConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default = "classifier::default_rules")]
    pub categories: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Database::default(),
            logger: Logger::default(),
            reasoner: ReasonerConfig::default(),
            annotations: AnnotationConfig::default(),
            mapping: MappingConfig::default(),
            categories: classifier::default_rules(),
        }
    }
}

impl Config {
    /// Reads and parses a YAML configuration file.
    ///
    /// # Errors
    ///
    /// When the file cannot be read or is not valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            Error::Message(format!(
                "cannot read configuration `{}`: {err}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parses configuration from YAML text.
    ///
    /// # Errors
    ///
    /// When the text is not valid configuration.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Classifier built from the configured category rules. An empty rule
    /// list falls back to the default keywords.
    #[must_use]
    pub fn classifier(&self) -> LabelClassifier {
        if self.categories.is_empty() {
            LabelClassifier::default()
        } else {
            LabelClassifier::new(self.categories.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Database {
    /// Directory holding the graph store. Recreated empty on every run.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// Logger configuration.
///
/// `RUST_LOG` takes precedence over `level` and `override_filter`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Logger {
    #[serde(default = "default_true")]
    pub enable: bool,

    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: Format,

    /// Raw `EnvFilter` directives replacing the level based default, for
    /// example `owl2graph=trace,sqlx=warn`.
    pub override_filter: Option<String>,

    pub file_appender: Option<LoggerFileAppender>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::default(),
            format: Format::default(),
            override_filter: None,
            file_appender: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggerFileAppender {
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub format: Format,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub filename_prefix: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "owl2graph".to_string()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Rotation {
    #[serde(rename = "minutely")]
    Minutely,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "never")]
    #[default]
    Never,
}

/// Reasoner selection.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReasonerConfig {
    #[serde(default)]
    pub backend: ReasonerBackend,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonerBackend {
    /// Told subclass and equivalence axioms only.
    #[default]
    Structural,
}

/// Annotation properties the mapping pass reads labels from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnnotationConfig {
    /// Property whose literals, and those of its sub-properties, become
    /// alternative names. Matched case-insensitively.
    #[serde(default = "default_alternative_term")]
    pub alternative_term: String,

    /// Alternative-term property whose literal also replaces the display name.
    #[serde(default = "default_preferred_display_name")]
    pub preferred_display_name: String,

    /// Further synonym properties appended to the alternative terms when the
    /// ontology declares them.
    #[serde(default)]
    pub extra_synonyms: Vec<String>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            alternative_term: default_alternative_term(),
            preferred_display_name: default_preferred_display_name(),
            extra_synonyms: Vec::new(),
        }
    }
}

fn default_alternative_term() -> String {
    vocab::OBO_ALTERNATIVE_TERM.to_string()
}

fn default_preferred_display_name() -> String {
    vocab::FAIRSHARING_ALTERNATIVE_TERM.to_string()
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub key_strategy: KeyStrategy,
    #[serde(default)]
    pub representative: RepresentativePolicy,
}

#[cfg(test)]
mod tests {
    use super::{Config, Format, LogLevel, ReasonerBackend, DEFAULT_DB_PATH};
    use crate::{
        mapping::{
            classifier::Category, hierarchy::RepresentativePolicy, names::KeyStrategy,
        },
        ontology::vocab,
    };

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_yaml_str("").expect("config");
        assert_eq!(config.database.path.to_str(), Some(DEFAULT_DB_PATH));
        assert!(config.logger.enable);
        assert_eq!(config.logger.level, LogLevel::Info);
        assert_eq!(config.reasoner.backend, ReasonerBackend::Structural);
        assert_eq!(
            config.annotations.alternative_term,
            vocab::OBO_ALTERNATIVE_TERM
        );
        assert!(config.annotations.extra_synonyms.is_empty());
        assert_eq!(config.mapping.key_strategy, KeyStrategy::Fragment);
        assert_eq!(config.categories.len(), 3);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_yaml_str(
            r"
database:
  path: /tmp/graph.db
logger:
  level: debug
  format: json
mapping:
  key_strategy: local_name
  representative: canonical
categories:
  - keyword: edam
    category: DOMAIN
",
        )
        .expect("config");

        assert_eq!(config.database.path.to_str(), Some("/tmp/graph.db"));
        assert_eq!(config.logger.level, LogLevel::Debug);
        assert_eq!(config.logger.format, Format::Json);
        assert_eq!(config.mapping.key_strategy, KeyStrategy::LocalName);
        assert_eq!(config.mapping.representative, RepresentativePolicy::Canonical);
        assert_eq!(config.classifier().classify("EDAM.owl"), Category::Domain);
        assert_eq!(
            config.classifier().classify("disciplines.owl"),
            Category::Generic
        );
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(Config::from_yaml_str("mapping:\n  key_strategy: hash\n").is_err());
    }

    #[test]
    fn reads_configuration_files() {
        let tree = tree_fs::TreeBuilder::default()
            .add_file("config.yaml", "logger:\n  enable: false\n")
            .create()
            .expect("tree");
        let config = Config::from_file(&tree.root.join("config.yaml")).expect("config");
        assert!(!config.logger.enable);

        assert!(Config::from_file(&tree.root.join("missing.yaml")).is_err());
    }
}
