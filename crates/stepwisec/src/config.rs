//! Configuration management
//!
//! Options come from `stepwise.toml`, then environment variables, then
//! command-line flags; later sources win.
//!
//! ```toml
//! [lower]
//! class_suffix = "Machine"
//! functions = ["checkout"]
//! resume_param = "input"
//! ```

use crate::cli::Cli;
use crate::error::CliError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stepwise::LowerOptions;

pub const CONFIG_FILE: &str = "stepwise.toml";
pub const CLASS_SUFFIX_ENV: &str = "STEPWISE_CLASS_SUFFIX";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub lower: LowerOptions,
}

impl Config {
    /// Read `explicit`, or `./stepwise.toml` when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path).map_err(|e| CliError::io(&path, e))?;
        let config = Self::parse(&content, &path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment overrides through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(suffix) = var(CLASS_SUFFIX_ENV) {
            self.lower.class_suffix = suffix;
        }
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if !cli.functions.is_empty() {
            self.lower.functions = cli.functions.clone();
        }
        if let Some(suffix) = &cli.class_suffix {
            self.lower.class_suffix = suffix.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(content: &str) -> Result<Config, CliError> {
        Config::parse(content, Path::new(CONFIG_FILE))
    }

    #[test]
    fn reads_the_lower_table() {
        let config = parse("[lower]\nclass_suffix = \"Task\"\nfunctions = [\"a\"]\n").unwrap();
        assert_eq!(config.lower.class_suffix, "Task");
        assert_eq!(config.lower.functions, ["a"]);
        assert_eq!(config.lower.resume_param, "value");
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse("[lower]\nsufix = \"x\"\n").unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(parse("[other]\n").is_err());
    }

    #[test]
    fn file_then_env_then_flags() {
        let mut config = parse("[lower]\nclass_suffix = \"File\"\n").unwrap();
        config.apply_env(|key| (key == CLASS_SUFFIX_ENV).then(|| "Env".to_string()));
        assert_eq!(config.lower.class_suffix, "Env");

        let cli = Cli::parse_from(["stepwisec", "in.ts", "--class-suffix", "Flag"]);
        config.apply_cli(&cli);
        assert_eq!(config.lower.class_suffix, "Flag");

        let cli = Cli::parse_from(["stepwisec", "in.ts"]);
        config.apply_cli(&cli);
        assert_eq!(config.lower.class_suffix, "Flag");
        assert!(config.lower.functions.is_empty());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
