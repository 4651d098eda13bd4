//! Errors of the command-line driver

use std::path::PathBuf;

/// Failures outside the lowering itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// I/O error for a specific file
    #[error("I/O error for file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file
    #[error("failed to parse config '{path:?}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `--function` named something that is not a generator in the input
    #[error("no generator function named `{name}`")]
    MissingFunction { name: String },

    /// The lowering failed and its diagnostic was already printed
    #[error("lowering failed due to previous errors")]
    LoweringFailed,
}

impl CliError {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a diagnostic for this error has already been shown.
    pub fn is_reported(&self) -> bool {
        matches!(self, CliError::LoweringFailed)
    }
}
