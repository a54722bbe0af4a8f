use thiserror::Error;

/// Failure reported by a message source while opening or walking a stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// A single page or item could not be fetched; the pass may continue.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The stream cannot be produced or continued at all.
    #[error("source failure: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("invalid location pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("lexicon parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("analysis panicked: {0}")]
    Panicked(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error("no messages to analyze")]
    Empty,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
