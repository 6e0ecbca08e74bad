//! slidecat - Convert presentations to PDF and merge them.
//!
//! Without a subcommand the interactive session runs. `convert` and `merge`
//! do one stage each without prompting, for scripts.

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;

use slidecat::batch::{NoProgress, ProgressObserver};
use slidecat::cli::{Cli, Command, expand_inputs, init_logging};
use slidecat::config::{Config, ConverterCommand};
use slidecat::convert::Converter;
use slidecat::error::{Result, SlideCatError};
use slidecat::merge::Merger;
use slidecat::output::{self, ConversionReport, MergeReport, OutputFormatter, ProgressBar};
use slidecat::prompt::TerminalPrompter;
use slidecat::session::Session;
use slidecat::utils::display_name;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(err) => {
            OutputFormatter::default().error(&err.to_string());
            process::exit(err.exit_code());
        }
    }
}

/// Main application logic. Returns the process exit code.
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.to_config()?;
    init_logging(&config.logging)?;

    let command = cli.command();
    let formatter = if command.wants_json() {
        OutputFormatter::quiet()
    } else {
        OutputFormatter::from_config(&config)
    };

    match command {
        Command::Interactive { dir } => interactive(&config, dir, formatter).await,
        Command::Convert {
            inputs,
            outdir,
            json,
        } => convert(&config, &inputs, outdir, json, &formatter).await,
        Command::Merge {
            inputs,
            output,
            json,
        } => merge(&config, &inputs, &output, json, &formatter).await,
    }
}

async fn interactive(
    config: &Config,
    dir: Option<PathBuf>,
    formatter: OutputFormatter,
) -> Result<i32> {
    let converter = match ConverterCommand::resolve(&config.converter) {
        Ok(command) => Some(Converter::new(command, config.converter.timeout())),
        Err(SlideCatError::ConverterNotFound { candidates }) => {
            warn!(?candidates, "no office converter found");
            None
        }
        Err(err) => return Err(err),
    };

    let mut prompter = TerminalPrompter::stdio();
    let mut progress = ProgressBar::new(config.quiet);
    let mut session = Session::new(config, converter, &mut prompter, &mut progress, formatter);
    session.run(dir).await?;

    Ok(0)
}

/// Non-interactive conversion. Exits 1 when any file failed to convert.
async fn convert(
    config: &Config,
    inputs: &[PathBuf],
    outdir: Option<PathBuf>,
    json: bool,
    formatter: &OutputFormatter,
) -> Result<i32> {
    let command = ConverterCommand::resolve(&config.converter)?;
    let converter = Converter::new(command, config.converter.timeout());

    let files = expand_inputs(inputs, config);
    if files.is_empty() {
        formatter.warning("No convertible files found.");
    }
    let outdir = outdir.unwrap_or_else(|| config.output.conversion_dir(Path::new(".")));

    let mut observer = observer_for(json, config);
    let report = converter.convert(&files, &outdir, observer.as_mut()).await?;

    if json {
        print_json(&ConversionReport::new(&outdir, &report))?;
    } else {
        output::display_conversion_report(formatter, &report, &outdir);
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

/// Non-interactive merge in the order given.
async fn merge(
    config: &Config,
    inputs: &[PathBuf],
    output_path: &Path,
    json: bool,
    formatter: &OutputFormatter,
) -> Result<i32> {
    let mut observer = observer_for(json, config);
    let outcome = Merger::new()
        .merge(inputs, output_path, observer.as_mut())
        .await;

    if json {
        print_json(&MergeReport::new(output_path, &outcome))?;
    } else {
        output::display_merge_report(formatter, &outcome, output_path);

        if formatter.is_verbose() && outcome.success {
            formatter.blank_line();
            formatter.section("Merged files");
            for file in &outcome.merged {
                formatter.detail(&display_name(&file.path), &format!("{} page(s)", file.pages));
            }
        }
    }

    outcome.into_result()?;
    Ok(0)
}

fn observer_for(json: bool, config: &Config) -> Box<dyn ProgressObserver> {
    if json {
        Box::new(NoProgress)
    } else {
        Box::new(ProgressBar::new(config.quiet))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| SlideCatError::other(format!("Failed to encode report: {err}")))?;
    println!("{text}");
    Ok(())
}
