//! quizdb-init CLI - Seed the quiz collection from the categories file
//!
//! # Main Command
//!
//! ```bash
//! quizdb-init run                       # Load db.json and reconcile quiz_data
//! quizdb-init run -i ./db.json --data-dir ./data
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! quizdb-init transform -i db.json      # Print the records a run would insert
//! quizdb-init validate -i db.json       # List subjects that would be skipped
//! quizdb-init verify                    # Summarize the current collection
//! ```
//!
//! Exit status is 0 on success (index warnings included) and 1 on any fatal
//! error, which is printed as an `ERROR:` line naming the failing stage.

use clap::{Parser, Subcommand};
use quizdb_init::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use quizdb_init::reconcile::verify;
use quizdb_init::{
    job, load, transform, transform_detailed, InputConfig, JobConfig, StoreConfig,
};
use std::fs;
use std::path::{Path, PathBuf};

type CommandResult = Result<(), (&'static str, Box<dyn std::error::Error>)>;

#[derive(Parser)]
#[command(name = "quizdb-init")]
#[command(about = "Load quiz categories from JSON and reconcile the quiz collection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the categories file and replace the collection with it
    Run {
        #[command(flatten)]
        config: JobConfig,
    },

    /// Load and transform only; print the records as JSON
    Transform {
        #[command(flatten)]
        input: InputConfig,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report subjects that would be skipped, and why
    Validate {
        #[command(flatten)]
        input: InputConfig,
    },

    /// Summarize the current collection without modifying it
    Verify {
        #[command(flatten)]
        store: StoreConfig,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: CommandResult = match cli.command {
        Commands::Run { config } => cmd_run(&config).await,

        Commands::Transform { input, output } => {
            cmd_transform(&input.input, output.as_deref()).map_err(|e| ("transform", e))
        }

        Commands::Validate { input } => cmd_validate(&input.input).map_err(|e| ("validate", e)),

        Commands::Verify { store } => cmd_verify(&store).await.map_err(|e| ("verify", e)),
    };

    if let Err((stage, e)) = result {
        log_error(format!("[{}] {}", stage, e));
        std::process::exit(1);
    }
}

async fn cmd_run(config: &JobConfig) -> CommandResult {
    match job::run_with_config(config).await {
        Ok(report) => {
            // Warnings never fail a run
            if !report.warnings.is_empty() {
                log_warning(format!("Completed with {} warning(s)", report.warnings.len()));
            }
            Ok(())
        }
        Err(e) => Err((e.stage(), e.into())),
    }
}

fn cmd_transform(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let batch = transform(load(input)?);
    batch.ensure_non_empty()?;

    log_success(format!(
        "{} records from {} categories / {} subjects",
        batch.len(),
        batch.categories_seen,
        batch.subjects_seen
    ));

    let json = serde_json::to_string_pretty(&batch.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log_info(format!("Validating: {}", input.display()));

    let outcome = transform_detailed(load(input)?, chrono::Utc::now());
    log_info(outcome.summary());

    for skipped in &outcome.skipped {
        let location = match &skipped.subject {
            Some(subject) => format!("{} / {}", skipped.category, subject),
            None => skipped.category.clone(),
        };
        log_warning(format!("Skipped {}", location));
        for reason in skipped.reasons.iter().take(3) {
            log_info_indent(format!("- {}", reason), 1);
        }
    }

    outcome.batch.ensure_non_empty()?;
    if !outcome.skipped.is_empty() {
        return Err(format!("{} entries would be skipped", outcome.skipped.len()).into());
    }

    log_success(format!("All {} subjects valid", outcome.batch.len()));
    Ok(())
}

async fn cmd_verify(store: &StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    store.validate()?;
    let session = store.open().await?;

    log_info(format!("=== Verification of {}.{} ===", store.database, store.collection));
    let verification = verify(&session).await?;
    verification.log(None);

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
