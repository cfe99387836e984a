use std::{
    path::PathBuf,
    sync::LazyLock,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use regex::Regex;

use crate::{Labels, Prediction, Predictor};

/// Cap on names extracted from a single free-text query. Batch files are
/// not capped.
const DEFAULT_NAME_LIMIT: usize = 10;

#[derive(Parser)]
#[command(name = "boy-or-girl")]
#[command(about = "Check whether first names read as boy's or girl's names", long_about = None)]
pub struct Cli {
    /// Free text to pull names from (if not provided, reads from stdin)
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Read free text from file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Batch process names (one per line)
    #[arg(short, long, value_name = "PATH", conflicts_with_all = ["text", "file"])]
    batch: Option<PathBuf>,

    /// Batch process from JSON array
    #[arg(long, value_name = "PATH", conflicts_with_all = ["text", "file", "batch"])]
    batch_json: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Maximum number of names taken from free text
    #[arg(short = 'n', long, default_value_t = DEFAULT_NAME_LIMIT)]
    limit: usize,

    /// Custom class labels (comma-separated: negative,positive)
    #[arg(long, value_delimiter = ',', num_args = 2,
          default_values = [crate::NEGATIVE_LABEL, crate::POSITIVE_LABEL])]
    labels: Vec<String>,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode (detailed output)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    /// Aligned table with a header row
    Table,
    /// One tab-separated "name gender probability" line per record
    Plain,
    /// JSON array of records
    Json,
}

pub fn run(cli: &Cli) -> Result<()> {
    let names = gather_names(cli)?;

    if names.is_empty() {
        if matches!(cli.format, OutputFormat::Json) {
            println!("[]");
        } else if !cli.quiet {
            eprintln!("No names found in input");
        }
        return Ok(());
    }

    let labels = match (cli.labels.first(), cli.labels.get(1)) {
        (Some(negative), Some(positive)) => Labels::new(negative, positive),
        _ => Labels::default(),
    };
    let predictor = Predictor::new().with_labels(labels);

    let start = cli.verbose.then(Instant::now);
    let predictions = predictor.predict(&names)?;
    if let Some(start_time) = start {
        eprintln!("Inference time: {:?}", start_time.elapsed());
    }

    output_predictions(&predictions, cli)
}

/// Determine the name list from CLI args.
/// Priority: text arg > file > batch > batch_json > stdin.
fn gather_names(cli: &Cli) -> Result<Vec<String>> {
    use std::io::Read;

    if let Some(text) = &cli.text {
        return Ok(extract_names(text, cli.limit));
    }

    if let Some(path) = &cli.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        return Ok(extract_names(&text, cli.limit));
    }

    if let Some(path) = &cli.batch {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
        let names: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        return Ok(names);
    }

    if let Some(path) = &cli.batch_json {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON batch file: {}", path.display()))?;
        let names: Vec<String> =
            serde_json::from_str(&contents).with_context(|| "Failed to parse JSON array")?;
        return Ok(names);
    }

    // Read from stdin
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(extract_names(&buffer, cli.limit))
}

/// Pull word tokens out of free text, capped at `limit` names.
///
/// Splitting on non-word characters means "Joe Biden, Kamala Harris"
/// yields four separate names; the classifier scores first names, not
/// full names.
fn extract_names(text: &str, limit: usize) -> Vec<String> {
    static WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\w+").expect("static word pattern compiles"));

    WORD.find_iter(text)
        .take(limit)
        .map(|m| m.as_str().to_owned())
        .collect()
}

fn output_predictions(predictions: &[Prediction], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(predictions)?);
        }
        OutputFormat::Plain => {
            for prediction in predictions {
                println!(
                    "{}\t{}\t{:.2}",
                    prediction.name, prediction.gender, prediction.probability
                );
            }
        }
        OutputFormat::Table => {
            let name_width = predictions
                .iter()
                .map(|p| p.name.len())
                .chain(["Name".len()])
                .max()
                .unwrap_or(4);
            let gender_width = predictions
                .iter()
                .map(|p| p.gender.len())
                .chain(["Gender".len()])
                .max()
                .unwrap_or(6);

            if !cli.quiet {
                println!(
                    "{:<name_width$}  {:<gender_width$}  Probability",
                    "Name", "Gender"
                );
            }
            for prediction in predictions {
                println!(
                    "{:<name_width$}  {:<gender_width$}  {:.2}",
                    prediction.name, prediction.gender, prediction.probability
                );
            }
        }
    }
    Ok(())
}
