mod db;
mod ingest;
mod runs;

#[cfg(test)]
mod tests;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tinfo_core::{load_app_config, RunStatus, DEFAULT_REGION};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tinfo-cli")]
#[command(about = "tinfo Instagram ingestion command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, filter, classify and store posts for one region
    Ingest(IngestArgs),
    /// List recent ingest runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Args)]
pub(crate) struct IngestArgs {
    /// Region whose default targets are fetched (unknown values fall back to the default region)
    #[arg(long, default_value = DEFAULT_REGION)]
    pub country: String,

    /// Only keep posts published within this many days (1-365; anything else means 14)
    #[arg(long, default_value = "14", allow_hyphen_values = true)]
    pub days: String,

    /// Maximum number of posts to keep per run (1-50; anything else means 10)
    #[arg(long, default_value = "10", allow_hyphen_values = true)]
    pub limit: String,

    /// Re-process posts that are already stored
    #[arg(long)]
    pub no_skip_duplicates: bool,

    /// Comma or whitespace separated targets replacing the region defaults,
    /// e.g. "#torontojobs, @blogto"
    #[arg(long)]
    pub targets: Option<String>,

    /// Count posts classified as Ignore but do not store them
    #[arg(long)]
    pub drop_ignored: bool,

    /// Store normalized raw text even when a Gemini key is configured
    #[arg(long)]
    pub passthrough: bool,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    // stdout is reserved for the run report.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let config = load_app_config();
    init_tracing(config.as_ref().map_or("info", |c| c.log_level.as_str()))?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Ingest(args)) => {
            let summary = ingest::run_ingest(config, &args).await;
            print!("{}", tinfo_ingest::render(&summary));
            if summary.status == RunStatus::Error {
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Runs { limit }) => runs::list_runs(&config?, limit).await?,
        Some(Commands::Db { command }) => match command {
            DbCommands::Ping => db::ping(&config?).await?,
            DbCommands::Migrate => db::migrate(&config?).await?,
        },
        None => println!("tinfo-cli ready; run `tinfo-cli --help` for commands"),
    }

    Ok(ExitCode::SUCCESS)
}
