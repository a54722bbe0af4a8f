use std::path::PathBuf;

use msgscope_core::LexiconError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("missing platform credential: {0}")]
    MissingCredential(&'static str),

    #[error("platform credential {field} still holds the placeholder {value:?}")]
    PlaceholderCredential { field: &'static str, value: String },

    #[error("api_id must be numeric, got {0:?}")]
    InvalidApiId(String),

    #[error("{0}")]
    UnknownAnalysis(String),

    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
