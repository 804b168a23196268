use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info, LevelFilter};
use recipe_note_import::{import_export, FetchCascade, ImportConfig, ImportError};

/// Convert note exports into schema.org Recipe records
#[derive(Parser, Debug)]
#[command(name = "recipe-note-import")]
#[command(version)]
#[command(about = "Convert Evernote .enex exports into schema.org Recipe JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// An .enex file or a directory of them
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Only use the notes' own content, never fetch source pages
    #[arg(long)]
    no_web_fetch: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run only the fetch cascade against a URL and report the result
    ProbeUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(args).await {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ImportError> {
    let mut config = ImportConfig::load()?;
    if args.no_web_fetch {
        config.fetch.enabled = false;
    }

    if let Some(Command::ProbeUrl { url }) = args.command {
        return probe_url(&url, &config).await;
    }

    let input = args.input.ok_or_else(|| {
        ImportError::BuilderError("No input given. Pass an .enex file or a directory".to_string())
    })?;

    let report = import_export(&input, &config).await?;
    for skipped in &report.skipped {
        eprintln!("Skipped '{}': {}", skipped.title, skipped.reason);
    }

    let json = serde_json::to_string_pretty(&report.records)?;
    match args.output {
        Some(path) => {
            fs::write(&path, json)?;
            info!("Wrote {} records to {}", report.records.len(), path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn probe_url(url: &str, config: &ImportConfig) -> Result<(), ImportError> {
    let cascade = FetchCascade::new(&config.fetch);
    match cascade.run(url).await {
        Ok(page) => {
            println!(
                "OK {} (HTTP {}, {} bytes)",
                page.url,
                page.status,
                page.body.len()
            );
            Ok(())
        }
        Err(kind) => Err(ImportError::InvalidUrl(format!("{url}: {kind}"))),
    }
}
