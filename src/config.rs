use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use msgscope_core::batch::AnalysisKind;
use msgscope_core::group::DEFAULT_GROUP_LIMIT;
use msgscope_core::{AnalysisSettings, CompiledLexicons, Lexicons, ReportTier};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "msgscope.toml";

const PLACEHOLDER_API_ID: &str = "TU_API_ID";
const PLACEHOLDER_API_HASH: &str = "TU_API_HASH";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub api_id: String,
    pub api_hash: String,
    pub session_name: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            api_hash: String::new(),
            session_name: "msgscope".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tier: ReportTier,
    /// Merge the stock Spanish and English stop lists into the vocabulary filter.
    pub use_stock_stopwords: bool,
    /// TOML lexicon table replacing the built-in keyword lists.
    pub lexicon_file: Option<PathBuf>,
    /// Per-analysis message limits, e.g. `sentiment = 800`.
    pub limits: BTreeMap<String, usize>,
    pub topic_samples: Option<usize>,
    pub category_samples: Option<usize>,
    pub top_words: Option<usize>,
    pub group_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tier: ReportTier::Complete,
            use_stock_stopwords: false,
            lexicon_file: None,
            limits: BTreeMap::new(),
            topic_samples: None,
            category_samples: None,
            top_words: None,
            group_limit: DEFAULT_GROUP_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub save: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            save: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub logging: LoggingConfig,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Validated platform credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path`, or `msgscope.toml` when present, or the defaults; then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => {
                tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `MSGSCOPE_API_ID` and `MSGSCOPE_API_HASH` win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("MSGSCOPE_API_ID") {
            self.platform.api_id = id;
        }
        if let Some(hash) = lookup("MSGSCOPE_API_HASH") {
            self.platform.api_hash = hash;
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let id = self.platform.api_id.trim();
        let hash = self.platform.api_hash.trim();

        if id.is_empty() {
            return Err(ConfigError::MissingCredential("api_id"));
        }
        if hash.is_empty() {
            return Err(ConfigError::MissingCredential("api_hash"));
        }
        if id == PLACEHOLDER_API_ID {
            return Err(ConfigError::PlaceholderCredential {
                field: "api_id",
                value: id.to_string(),
            });
        }
        if hash == PLACEHOLDER_API_HASH {
            return Err(ConfigError::PlaceholderCredential {
                field: "api_hash",
                value: hash.to_string(),
            });
        }
        let api_id = id
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidApiId(id.to_string()))?;

        Ok(Credentials {
            api_id,
            api_hash: hash.to_string(),
        })
    }

    pub fn lexicons(&self) -> Result<CompiledLexicons> {
        let mut lexicons = match &self.analysis.lexicon_file {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                Lexicons::from_toml_str(&raw)?
            }
            None => Lexicons::default(),
        };
        if self.analysis.use_stock_stopwords {
            lexicons = lexicons.with_stock_stopwords();
        }
        let compiled = lexicons.compile()?;
        tracing::debug!(version = %compiled.version, "lexicons compiled");
        Ok(compiled)
    }

    /// Settings for one run. A tier given on the command line wins over the
    /// configured one.
    pub fn analysis_settings(
        &self,
        tier: Option<ReportTier>,
        only: &[AnalysisKind],
    ) -> Result<AnalysisSettings> {
        let limits = self
            .analysis
            .limits
            .iter()
            .map(|(name, &limit)| {
                name.parse::<AnalysisKind>()
                    .map(|kind| (kind, limit))
                    .map_err(ConfigError::UnknownAnalysis)
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let mut settings = AnalysisSettings::for_tier(tier.unwrap_or(self.analysis.tier))
            .only(only)
            .with_limits(&limits);
        if let Some(n) = self.analysis.topic_samples {
            settings.topic_samples = n;
        }
        if let Some(n) = self.analysis.category_samples {
            settings.category_samples = n;
        }
        if let Some(n) = self.analysis.top_words {
            settings.top_words = n;
        }
        Ok(settings)
    }
}
