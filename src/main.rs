use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use chronotrend_extract::{Calculator, ExtractionConfig, compare_trends};
use chronotrend_io::{
    ColumnNames, ExperimentName, ResultWriter, SampleDataset, SampleReader, TableLayout,
};
use chronotrend_trend::TimeUnit;

#[derive(Parser)]
#[command(name = "chronotrend")]
#[command(about = "Time-aware linear trend features for irregularly sampled series")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file location and table layout, shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Path to the input CSV file
    #[arg(long)]
    data: PathBuf,

    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: String,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Read a wide table (one column per signal) instead of id,time,kind,value rows
    #[arg(long, default_value_t = false)]
    wide: bool,

    /// Name of the group identifier column
    #[arg(long, default_value = "id")]
    id_column: String,

    /// Name of the timestamp column
    #[arg(long, default_value = "time")]
    time_column: String,

    /// Name of the signal name column (long layout)
    #[arg(long, default_value = "kind")]
    kind_column: String,

    /// Name of the value column (long layout)
    #[arg(long, default_value = "value")]
    value_column: String,

    /// Unit of the elapsed-time axis: "seconds", "minutes", "hours", or "days"
    #[arg(long, default_value = "hours")]
    time_unit: String,
}

#[derive(Subcommand)]
enum Command {
    /// Extract per-group features into a wide table
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Comma-separated calculators (defaults to all)
        #[arg(long, value_delimiter = ',')]
        calculators: Vec<String>,
    },

    /// Fit time-aware and ordinal trends side by side for every series
    Compare {
        #[command(flatten)]
        input: InputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ExtractOutput {
    experiment: String,
    n_samples: usize,
    n_series: usize,
    n_groups: usize,
    n_columns: usize,
    n_undefined: usize,
    calculators: Vec<&'static str>,
    features_csv: PathBuf,
    features_json: PathBuf,
}

#[derive(Serialize)]
struct CompareOutput {
    experiment: String,
    n_series: usize,
    n_undefined_timewise: usize,
    n_undefined_ordinal: usize,
    n_diverging: usize,
    compare_json: PathBuf,
}

fn parse_time_unit(s: &str) -> Result<TimeUnit> {
    match s {
        "seconds" => Ok(TimeUnit::Seconds),
        "minutes" => Ok(TimeUnit::Minutes),
        "hours" => Ok(TimeUnit::Hours),
        "days" => Ok(TimeUnit::Days),
        other => anyhow::bail!("unknown time unit: {other} (expected seconds, minutes, hours, or days)"),
    }
}

fn parse_calculators(names: &[String]) -> Result<Vec<Calculator>> {
    if names.is_empty() {
        return Ok(Calculator::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| name.trim().parse::<Calculator>().map_err(anyhow::Error::from))
        .collect()
}

fn read_dataset(input: &InputArgs) -> Result<SampleDataset> {
    let layout = if input.wide {
        TableLayout::Wide
    } else {
        TableLayout::Long
    };
    let columns = ColumnNames {
        id: input.id_column.clone(),
        time: input.time_column.clone(),
        kind: input.kind_column.clone(),
        value: input.value_column.clone(),
    };
    let dataset = SampleReader::new(&input.data)
        .with_layout(layout)
        .with_columns(columns)
        .read()
        .with_context(|| format!("failed to read input CSV {}", input.data.display()))?;
    info!(
        n_samples = dataset.n_samples,
        n_series = dataset.series.len(),
        n_groups = dataset.n_groups(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn writer_for(output_dir: &Path, experiment: &str) -> Result<ResultWriter> {
    let experiment_name = ExperimentName::new(experiment.to_string())?;
    ResultWriter::new(output_dir, experiment_name).context("failed to prepare output directory")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Extract { input, calculators } => {
            let time_unit = parse_time_unit(&input.time_unit)?;
            let calculators = parse_calculators(&calculators)?;
            let config = ExtractionConfig::new(calculators)?.with_time_unit(time_unit);

            let writer = writer_for(&input.output_dir, &input.experiment)?;
            let dataset = read_dataset(&input)?;

            let table = config
                .fit(&dataset.series)
                .context("feature extraction failed")?;
            writer.write_features(&table)?;

            let output = ExtractOutput {
                experiment: input.experiment,
                n_samples: dataset.n_samples,
                n_series: dataset.series.len(),
                n_groups: table.n_groups(),
                n_columns: table.n_columns(),
                n_undefined: table.n_undefined(),
                calculators: config.calculators().iter().map(|c| c.name()).collect(),
                features_csv: writer.features_csv_path(),
                features_json: writer.features_json_path(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Compare { input } => {
            let time_unit = parse_time_unit(&input.time_unit)?;
            let writer = writer_for(&input.output_dir, &input.experiment)?;
            let dataset = read_dataset(&input)?;

            let comparisons = compare_trends(&dataset.series, time_unit);
            writer.write_comparison(&comparisons)?;

            let output = CompareOutput {
                experiment: input.experiment,
                n_series: comparisons.len(),
                n_undefined_timewise: comparisons.iter().filter(|c| c.timewise.is_err()).count(),
                n_undefined_ordinal: comparisons.iter().filter(|c| c.ordinal.is_err()).count(),
                n_diverging: comparisons
                    .iter()
                    .filter(|c| c.slope_delta().is_some_and(|d| d != 0.0))
                    .count(),
                compare_json: writer.compare_json_path(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
