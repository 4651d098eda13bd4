//! Command-line interface definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "stepwisec",
    about = "Lower TypeScript generator functions into serializable state-machine classes",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// TypeScript source file to lower
    pub input: PathBuf,

    /// Write the lowered source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only lower the named generator (repeatable)
    #[arg(long = "function", value_name = "NAME")]
    pub functions: Vec<String>,

    /// Appended to every generated class name (also STEPWISE_CLASS_SUFFIX)
    #[arg(long = "class-suffix", value_name = "SUFFIX")]
    pub class_suffix: Option<String>,

    /// Configuration file; defaults to ./stepwise.toml when present
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Lower without writing anything and report the step counts
    #[arg(long)]
    pub check: bool,

    /// Print debug logs (STEPWISE_LOG overrides)
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(long)]
    pub quiet: bool,
}

impl Cli {
    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_functions() {
        let cli = Cli::try_parse_from([
            "stepwisec",
            "in.ts",
            "--function",
            "a",
            "--function",
            "b",
            "-o",
            "out.ts",
        ])
        .unwrap();
        assert_eq!(cli.functions, ["a", "b"]);
        assert_eq!(cli.output, Some(PathBuf::from("out.ts")));
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["stepwisec", "in.ts", "--verbose", "--quiet"]).is_err());
        let quiet = Cli::try_parse_from(["stepwisec", "in.ts", "--quiet"]).unwrap();
        assert_eq!(quiet.log_level(), "error");
    }
}
