use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use jobscout_core::{Config, OllamaProvider, Pipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

mod loader;
mod report;

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Match job postings against a candidate profile with local models", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run a matching pass over a jobs CSV and a profile")]
    Run {
        #[arg(long, help = "CSV file of job postings")]
        jobs: PathBuf,

        #[arg(long, help = "Text file with the candidate profile")]
        profile: PathBuf,

        #[arg(long, default_value = ".", help = "Directory the HTML report is written to")]
        out: PathBuf,
    },

    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Delete the persisted vector index")]
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jobscout_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Run { jobs, profile, out } => run_match(&config, &jobs, &profile, &out).await,
        Commands::Show => show_config(&config),
        Commands::Clear => clear_index(&config),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

async fn run_match(config: &Config, jobs: &Path, profile: &Path, out: &Path) -> Result<()> {
    let postings = loader::load_jobs_csv(jobs)
        .with_context(|| format!("Failed to load job postings from {}", jobs.display()))?;
    let profile_text = std::fs::read_to_string(profile)
        .with_context(|| format!("Failed to read profile from {}", profile.display()))?;

    println!(
        "Matching {} postings against the profile...",
        postings.len().to_string().cyan()
    );

    let provider = Arc::new(OllamaProvider::new(&config.llm.base_url));
    let pipeline = Pipeline::new(config, provider);

    // Ctrl-C cancels the run: in-flight calls settle, no new calls start,
    // and whatever was gathered still lands in the report.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("cancellation requested; letting in-flight calls settle");
                cancel.cancel();
            }
        }
    });

    let run_report = pipeline.run(&profile_text, &postings, &cancel).await?;

    let scored = run_report
        .results
        .iter()
        .filter(|r| r.outcome.verdict().is_some())
        .count();
    let failed = run_report.results.len() - scored;
    println!(
        "{} {} scored, {} failed, {} skipped",
        "✓".green().bold(),
        scored.to_string().green(),
        failed.to_string().yellow(),
        run_report.skipped.len().to_string().yellow(),
    );

    let html = report::render(&run_report, &postings);
    let path = report::save(&html, out)
        .with_context(|| format!("Failed to write report under {}", out.display()))?;
    println!(
        "{} Report written to {}",
        "✓".green().bold(),
        path.display().to_string().cyan()
    );

    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    println!("{}", "Current Configuration:".bold().green());
    println!();
    println!("{}", "LLM:".bold());
    println!("  Model:       {}", config.llm.model.cyan());
    println!("  Base URL:    {}", config.llm.base_url);
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max Tokens:  {}", config.llm.max_tokens);
    println!();
    println!("{}", "Embedding:".bold());
    println!("  Model:       {}", config.embedding.model.cyan());
    println!("  Concurrency: {}", config.embedding.concurrency);
    println!();
    println!("{}", "Retrieval:".bold());
    println!("  Top N:       {}", config.retrieval.top_n);
    println!();
    println!("{}", "Scoring:".bold());
    println!("  Concurrency: {}", config.scoring.concurrency);
    println!("  Max Retries: {}", config.scoring.max_retries);
    println!("  Retry Delay: {}ms", config.scoring.retry_delay_ms);
    println!("  Timeout:     {}s", config.scoring.timeout_secs);
    println!();
    println!("{}", "Storage:".bold());
    println!("  Index:       {}", config.storage.index_path);

    Ok(())
}

fn clear_index(config: &Config) -> Result<()> {
    let path = Path::new(&config.storage.index_path);
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
        println!(
            "{} Deleted vector index: {}",
            "✓".green().bold(),
            path.display()
        );
    } else {
        println!("No vector index at {}", path.display());
    }
    Ok(())
}
