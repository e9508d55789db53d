//! run-deployment - local driver for a deployment package
//!
//! Plays the platform's part once: activates the windspeed export
//! deployment from its package directory, reads a CSV into a split-oriented
//! JSON string, sends one request and prints the result.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use depkit_core::{
    init_tracing, Activation, Context, Dataset, DeploymentHost, Environment, LogFormat, Payload,
    METRICS,
};
use serde_json::json;
use tracing::{debug, info, Level};
use windspeed_export::{
    WindspeedExport, FIELD_ACTION, FIELD_FILE, FIELD_FOLDER, FIELD_INPUT, INPUT_FIELDS,
    OUTPUT_FIELD,
};

const DEFAULT_DEPLOYMENT: &str = "windspeed-export";
const DEFAULT_VERSION: &str = "v1";

#[derive(Parser, Debug)]
#[command(name = "run-deployment")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Activate a deployment package locally and send it one request", long_about = None)]
struct Cli {
    /// Deployment package directory
    #[arg(long, default_value = "deployment_package")]
    base_dir: PathBuf,

    /// Context JSON file (default: structured windspeed-export context)
    #[arg(long)]
    context: Option<PathBuf>,

    /// CSV file sent as the request's `input` field
    #[arg(long, default_value = "short_rws_windspeed_example.csv")]
    input: PathBuf,

    /// CSV field separator
    #[arg(long, default_value = ";", value_parser = parse_separator)]
    separator: u8,

    /// Library folder to upload to or download from
    #[arg(long, default_value = "07 OMM/47 Data Logging/UbiOpsdata/")]
    folder: String,

    /// Remote file name
    #[arg(long, default_value = "rws_windspeed_example.csv")]
    file: String,

    /// upload, download or preview
    #[arg(long)]
    action: Option<String>,

    /// Dotenv file with SharePoint settings; ignored when absent
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

fn parse_separator(raw: &str) -> Result<u8, String> {
    match raw.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("separator must be a single ASCII character, got {raw:?}")),
    }
}

fn default_context() -> Context {
    Context::structured(DEFAULT_DEPLOYMENT, DEFAULT_VERSION)
        .with_input_fields(INPUT_FIELDS)
        .with_output_fields([OUTPUT_FIELD])
}

fn load_context(path: Option<&Path>) -> Result<Context> {
    match path {
        Some(path) => Context::from_json_file(path)
            .with_context(|| format!("Failed to load context from {}", path.display())),
        None => Ok(default_context()),
    }
}

/// Load the dotenv file into the process environment if it exists.
fn load_env_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        debug!(path = %path.display(), "no env file, using process environment");
        return Ok(());
    }
    dotenvy::from_path(path)
        .with_context(|| format!("Failed to load env file {}", path.display()))?;
    info!(path = %path.display(), "loaded env file");
    Ok(())
}

/// Serialize the input CSV the way a caller would ship a data frame.
fn read_input(path: &Path, separator: u8) -> Result<String> {
    let dataset = Dataset::read_csv(path, separator)
        .with_context(|| format!("Failed to read input {}", path.display()))?;
    info!(rows = dataset.len(), columns = dataset.columns().len(), "read input dataset");
    Ok(dataset.to_split_json().to_string())
}

fn build_payload(cli: &Cli, input: String) -> Payload {
    let mut fields = vec![
        (FIELD_INPUT, json!(input)),
        (FIELD_FOLDER, json!(cli.folder)),
        (FIELD_FILE, json!(cli.file)),
    ];
    if let Some(action) = &cli.action {
        fields.push((FIELD_ACTION, json!(action)));
    }
    Payload::structured(fields)
}

async fn run(cli: Cli) -> Result<()> {
    println!("Starting deployment request example");

    load_env_file(&cli.env_file)?;
    let environment = Environment::from_process();
    let context = load_context(cli.context.as_deref())?;

    let activation = Activation::new(&cli.base_dir, context, environment)
        .context("Failed to prepare activation")?;
    let host = DeploymentHost::<WindspeedExport>::activate(activation)
        .context("Failed to activate deployment")?;

    let input = read_input(&cli.input, cli.separator)?;
    let payload = build_payload(&cli, input);

    let result = host
        .dispatch(payload)
        .await
        .context("Deployment request failed")?;
    println!("Deployment request result: {}", result.to_json()?);
    METRICS.flush();

    if let Some(deployment) = host.retire() {
        debug!(rows = deployment.dataset().len(), "deployment retired");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(format, level);

    run(cli).await
}
