//! @ai:module:intent CLI for ONE simulator message-stats reports
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use one_report::{
    input::{ReportLoader, ReportLoaderTrait},
    metrics::{AggregateTable, FlatTable},
    report::{ReportGenerator, ReportOptions},
    Grouper, ReportConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "one-report.toml";

#[derive(Parser)]
#[command(name = "one-report")]
#[command(about = "Charts and summaries for ONE simulator MessageStatsReport files")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (RUST_LOG takes precedence when set)
    #[arg(long, global = true, value_enum, ignore_case = true, default_value = "INFO")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Per-router charts, optionally with cross-router comparisons
    Report {
        /// Directory containing *_MessageStatsReport.txt files
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        /// Output directory for charts
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Also draw one comparison chart per parameter and metric
        #[arg(short, long)]
        comparison: bool,

        /// Also draw bar and trend charts across all routers
        #[arg(short, long)]
        multi_router: bool,
    },

    /// Compare one column across an x-axis parameter using group means
    Compare {
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Parameter for the x axis (default: last parameter of the first report)
        #[arg(short = 'x', long)]
        x_param: Option<String>,

        /// Column whose values become separate lines
        #[arg(short = 'b', long)]
        compare_by: Option<String>,

        /// Metrics to plot (comma-separated, default: all known metrics)
        #[arg(long, value_delimiter = ',')]
        metrics: Vec<String>,
    },

    /// Copy reports into <param>@<value> directories
    Group {
        #[arg(short, long, default_value = "input")]
        input: PathBuf,

        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Parameter to group by (default: last parameter of the first report)
        #[arg(short, long)]
        group_by: Option<String>,
    },

    /// Write the default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("one_report={}", cli.log_level.directive())));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    ExitCode::from(exit_status(&run(cli)))
}

/// @ai:intent Map the outcome of a command to the process exit status
/// @ai:effects log
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{:#}", e);
            1
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Report {
            input,
            output,
            comparison,
            multi_router,
        } => generate_report(
            &load_or_default_config(config_path)?,
            &input,
            &output,
            ReportOptions {
                comparison,
                multi_router,
            },
        ),
        Commands::Compare {
            input,
            output,
            x_param,
            compare_by,
            metrics,
        } => compare(
            &load_or_default_config(config_path)?,
            &input,
            &output,
            x_param,
            compare_by,
            metrics,
        ),
        Commands::Group {
            input,
            output,
            group_by,
        } => group(
            &load_or_default_config(config_path)?,
            &input,
            &output,
            group_by.as_deref(),
        ),
        Commands::Init { output } => init_config(&output),
    }
}

/// @ai:intent Router charts plus requested comparison families
/// @ai:effects fs:read, fs:write
fn generate_report(
    config: &ReportConfig,
    input: &Path,
    output: &Path,
    options: ReportOptions,
) -> Result<()> {
    let reports = ReportLoader::new(config).load_all(input)?;
    if reports.is_empty() {
        tracing::warn!("No report files found in {}", input.display());
        return Ok(());
    }

    let table = AggregateTable::from_reports(reports);
    tracing::info!("Routers: {}", table.routers().join(", "));

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let generator = ReportGenerator::new(config)?;
    let charts = generator.generate_report(&table, options, output)?;

    println!("Generated {} chart(s) in {}", charts.len(), output.display());
    Ok(())
}

/// @ai:intent Flat-table comparison with CSV and JSON exports
/// @ai:effects fs:read, fs:write
fn compare(
    config: &ReportConfig,
    input: &Path,
    output: &Path,
    x_param: Option<String>,
    compare_by: Option<String>,
    metrics: Vec<String>,
) -> Result<()> {
    let reports = ReportLoader::new(config).load_all(input)?;
    let Some(first) = reports.first() else {
        tracing::warn!("No report files found in {}", input.display());
        return Ok(());
    };

    let x_param = match x_param {
        Some(x) => x,
        None => first
            .identity
            .last_param_key()
            .map(str::to_string)
            .with_context(|| format!("{} has no parameter to use as x axis", first.name))?,
    };
    let compare_by = compare_by.unwrap_or_else(|| config.input.routing_key.clone());
    let metrics = if metrics.is_empty() {
        config.metric_keys().into_iter().map(str::to_string).collect()
    } else {
        metrics
    };

    tracing::info!("Comparing {} along {} for {} metric(s)", compare_by, x_param, metrics.len());

    let table = FlatTable::from_reports(&reports);
    let generator = ReportGenerator::new(config)?;
    let charts = generator.generate_compare(&table, &x_param, &compare_by, &metrics, output)?;

    println!(
        "Wrote all_data.csv, summary.json and {} chart(s) to {}",
        charts.len(),
        output.display()
    );
    Ok(())
}

/// @ai:intent Copy reports into per-value directories
/// @ai:effects fs:read, fs:write
fn group(config: &ReportConfig, input: &Path, output: &Path, group_by: Option<&str>) -> Result<()> {
    let summary = Grouper::new(config).group(input, output, group_by)?;

    let copied: usize = summary.groups.values().map(Vec::len).sum();
    println!(
        "Copied {} file(s) into {} group(s) by {}",
        copied,
        summary.groups.len(),
        summary.group_by
    );
    Ok(())
}

/// @ai:intent Write the default vocabulary as TOML
/// @ai:effects fs:write
fn init_config(output: &Path) -> Result<()> {
    let config = ReportConfig::default();
    config
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(p) => ReportConfig::load(p).with_context(|| format!("Failed to load {}", p.display())),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                tracing::debug!("Using {}", default_path.display());
                Ok(ReportConfig::load(default_path)?)
            } else {
                Ok(ReportConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_args(args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("one-report").chain(args.iter().copied()))
            .unwrap();
        run(cli)
    }

    #[test]
    fn test_missing_input_exits_with_one_in_every_mode() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("absent");
        let output = temp.path().join("out");
        let (input, output) = (input.to_str().unwrap(), output.to_str().unwrap());

        for mode in ["report", "compare", "group"] {
            let result = run_args(&[mode, "-i", input, "-o", output]);
            let err = result.as_ref().unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<one_report::Error>(),
                    Some(one_report::Error::InputDirMissing(_))
                ),
                "{mode}: {err:#}"
            );
            assert_eq!(exit_status(&result), 1);
        }
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_group_copies_into_value_directories() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        std::fs::write(
            input.path().join("Epidemic-ttl@300_MessageStatsReport.txt"),
            "h\ndelivered: 1\n",
        )
        .unwrap();

        let result = run_args(&[
            "group",
            "-i",
            input.path().to_str().unwrap(),
            "-o",
            output.path().to_str().unwrap(),
        ]);

        assert_eq!(exit_status(&result), 0);
        assert!(output
            .path()
            .join("ttl@300")
            .join("Epidemic-ttl@300_MessageStatsReport.txt")
            .is_file());
    }

    #[test]
    fn test_log_level_accepts_critical() {
        let cli = Cli::try_parse_from(["one-report", "--log-level", "CRITICAL", "init"]).unwrap();
        assert_eq!(cli.log_level.directive(), "error");
        let cli = Cli::try_parse_from(["one-report", "init", "--log-level", "warning"]).unwrap();
        assert_eq!(cli.log_level.directive(), "warn");
    }
}
