use anyhow::Context;
use clap::{Parser, Subcommand};
use dsclient::api::{ApiClient, DataSourceClient};
use dsclient::auth::EnvTokenProvider;
use dsclient::config::ClientConfig;
use iqcore::geotrack::{QualityChecker, QualitySummary};
use iqcore::metadata::{DataSource, RecordingMetadata};
use std::fs;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;

const TOKEN_VAR: &str = "IQENGINE_ACCESS_TOKEN";

#[derive(Parser)]
#[command(author, version, about = "Admin driver for the IQEngine datasource API")]
struct Args {
    /// Load client settings from YAML instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every data source known to the backend
    List,
    /// Fetch a single data source
    Get { account: String, container: String },
    /// Trigger a metadata sync for a data source
    Sync { account: String, container: String },
    /// Query recordings with a raw query string; Ctrl+C cancels
    Query { query_string: String },
    /// Create a data source from a JSON file
    Create { file: PathBuf },
    /// Check local recording metadata files for track-quality issues
    Check { files: Vec<PathBuf> },
}

fn check_recordings(files: &[PathBuf]) -> anyhow::Result<()> {
    let checker = QualityChecker::default();
    let mut summary = QualitySummary::default();
    for file in files {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("reading recording {}", file.display()))?;
        let recording: RecordingMetadata =
            serde_json::from_str(&contents).context("parsing recording JSON")?;
        let quality = checker
            .check(&recording)
            .with_context(|| format!("checking {}", file.display()))?;
        if !quality.is_clean() {
            println!("{}: {:?}", file.display(), quality);
        }
        summary.absorb(&quality);
    }
    println!(
        "checked {} recordings: {} out-of-order, {} time-gap, {} zero-point, {} sharp-turn",
        summary.recordings,
        summary.out_of_order,
        summary.time_gap,
        summary.zero_point,
        summary.sharp_turn
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env(),
    };
    let client = ApiClient::new(&config, Some(EnvTokenProvider::new(TOKEN_VAR)));

    let runtime = TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating client runtime")?;

    runtime.block_on(async {
        match args.command {
            Command::List => match client.list().await? {
                Some(sources) => println!("{}", serde_json::to_string_pretty(&sources)?),
                None => println!("no data sources"),
            },
            Command::Get { account, container } => {
                match client.get(&account, &container).await? {
                    Some(source) => println!("{}", serde_json::to_string_pretty(&source)?),
                    None => println!("{}/{} not found", account, container),
                }
            }
            Command::Sync { account, container } => {
                client.sync(&account, &container).await?;
                println!("sync requested for {}/{}", account, container);
            }
            Command::Query { query_string } => {
                let cancel = async {
                    let _ = signal::ctrl_c().await;
                };
                let origins = client.query(&query_string, cancel).await?;
                println!("{}", serde_json::to_string_pretty(&origins)?);
            }
            Command::Create { file } => {
                let contents = fs::read_to_string(&file)
                    .with_context(|| format!("reading data source {}", file.display()))?;
                let data_source: DataSource =
                    serde_json::from_str(&contents).context("parsing data source JSON")?;
                match client.create(&data_source).await? {
                    Some(created) => println!("{}", serde_json::to_string_pretty(&created)?),
                    None => println!("created (no body returned)"),
                }
            }
            // Purely local, no backend involved.
            Command::Check { files } => check_recordings(&files)?,
        }

        let (requests, failures) = client.metrics();
        log::debug!("session issued {} requests ({} failed)", requests, failures);
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
