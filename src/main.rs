use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use sheetcrm::{
    config::Config,
    crm::group_by_month,
    process::{self, Calendar, IngestMode, IngestOutcome, Upload},
    store::{MemoryStore, SqliteStore},
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Load spreadsheet workbooks into a month-grouped CRM store")]
struct Args {
    /// YAML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize workbooks and store their rows
    Ingest {
        /// SQLite database (overrides the config file)
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long, value_enum)]
        mode: Option<IngestMode>,
        #[arg(long, value_enum)]
        calendar: Option<Calendar>,
        /// Normalize only; nothing is written
        #[arg(long)]
        dry_run: bool,
        /// Files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,
    },
    /// Print stored records grouped by month
    Crm {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) configure ────────────────────────────────────────────────
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };

    match args.command {
        Command::Ingest {
            db,
            mode,
            calendar,
            dry_run,
            inputs,
        } => {
            if let Some(db) = db {
                config.database = db;
            }
            if let Some(mode) = mode {
                config.mode = mode;
            }
            if let Some(calendar) = calendar {
                config.calendar = calendar;
            }
            run_ingest(config, &inputs, dry_run).await
        }
        Command::Crm { db } => {
            if let Some(db) = db {
                config.database = db;
            }
            let store = SqliteStore::open(&config.database)
                .with_context(|| format!("opening {}", config.database.display()))?;
            let grouped = group_by_month(store.entries()?, &config.no_month_label);
            println!("{}", serde_json::to_string_pretty(&grouped)?);
            Ok(())
        }
    }
}

async fn run_ingest(config: Config, inputs: &[String], dry_run: bool) -> Result<()> {
    // ─── 3) read uploads ─────────────────────────────────────────────
    let paths = expand_inputs(inputs)?;
    if paths.is_empty() {
        bail!("no input files matched");
    }
    let mut uploads = Vec::with_capacity(paths.len());
    for path in &paths {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        uploads.push(Upload::new(filename, content));
    }
    info!(files = uploads.len(), calendar = ?config.calendar, mode = ?config.mode, dry_run, "ingesting");

    // ─── 4) normalize + persist off the async runtime ────────────────
    let options = config.ingest_options();
    let database = config.database.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<IngestOutcome> {
        if dry_run {
            let mut store = MemoryStore::new();
            Ok(process::ingest(uploads, &mut store, &options))
        } else {
            let mut store = SqliteStore::open(&database)
                .with_context(|| format!("opening {}", database.display()))?;
            Ok(process::ingest(uploads, &mut store, &options))
        }
    })
    .await??;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if let IngestOutcome::Error { .. } = outcome {
        bail!("storing records failed; nothing from this batch was saved");
    }
    Ok(())
}

/// Plain paths pass through; anything with glob metacharacters is expanded.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let before = paths.len();
        for entry in glob(input).with_context(|| format!("bad glob pattern {}", input))? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "unreadable glob match"),
            }
        }
        if paths.len() == before {
            warn!(pattern = %input, "pattern matched no files");
        }
    }
    Ok(paths)
}
