use crate::cli::Cli;
use crate::config::Config;
use crate::diagnostics;
use crate::error::CliError;
use anyhow::Context;
use colored::Colorize;
use std::fs;
use stepwise::{Lowered, LowerOptions};
use tracing::info;

/// Resolve the options for this invocation: config file, then
/// environment, then flags.
pub fn resolve_options(cli: &Cli) -> Result<LowerOptions, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_cli(cli);
    Ok(config.lower)
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = resolve_options(cli)?;
    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let lowered = match stepwise::lower_source(&source, &options) {
        Ok(lowered) => lowered,
        Err(err) => {
            diagnostics::report_lower_error(&cli.input, &source, &err);
            return Err(CliError::LoweringFailed.into());
        }
    };
    check_selection(&lowered, &options)?;

    if lowered.classes.is_empty() && !cli.quiet {
        diagnostics::report_warning(&format!(
            "no generator functions found in {}",
            cli.input.display()
        ));
    }

    if cli.check {
        for class in &lowered.classes {
            println!(
                "{} {} -> {} ({} steps)",
                "ok".green().bold(),
                class.function_name,
                class.class_name,
                class.steps
            );
        }
        return Ok(());
    }

    match &cli.output {
        Some(path) => {
            fs::write(path, &lowered.output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), classes = lowered.classes.len(), "wrote output");
        }
        None => print!("{}", lowered.output),
    }
    Ok(())
}

/// Every name given with `--function` must be a generator in the input.
fn check_selection(lowered: &Lowered, options: &LowerOptions) -> Result<(), CliError> {
    match options
        .functions
        .iter()
        .find(|name| !lowered.classes.iter().any(|c| &c.function_name == *name))
    {
        Some(name) => Err(CliError::MissingFunction { name: name.clone() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_names_must_exist() {
        let options = LowerOptions {
            functions: vec!["counter".into(), "missing".into()],
            ..LowerOptions::default()
        };
        let source = "function* counter(): Generator<number> {\n  yield 1;\n}\n";
        let lowered = stepwise::lower_source(source, &options).unwrap();
        let err = check_selection(&lowered, &options).unwrap_err();
        assert_eq!(err.to_string(), "no generator function named `missing`");

        let options = LowerOptions {
            functions: vec!["counter".into()],
            ..LowerOptions::default()
        };
        assert!(check_selection(&lowered, &options).is_ok());
    }
}
