//! Shootout - Application Entry Point
//!
//! Loads configuration, builds the runner registry and sample corpus, then
//! runs the benchmark pipeline while streaming progress to the console.

use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shootout::{
    benchmark::{languages, ArtifactStore, PhaseScheduler, ProgressSender, SampleCorpus},
    config::Config,
    reporter,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing; stdout belongs to the console reporter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    print!("{}", reporter::banner());

    let corpus = SampleCorpus::load(
        &config.storage.samples_dir,
        config.storage.samples.as_slice(),
    )
    .await
    .context("Failed to load sample corpus")?;

    let mut registry = languages::default_registry(&config)
        .await
        .context("Failed to build runner registry")?;
    tracing::info!(
        runners = ?registry,
        languages = ?registry.languages(),
        samples = corpus.len(),
        "Registered runners"
    );

    let (progress, rx) = ProgressSender::channel();
    let printer = reporter::spawn(rx);

    let scheduler = PhaseScheduler::new(
        ArtifactStore::new(&config.storage.output_dir),
        config.benchmark,
    )
    .with_progress(progress);

    let result = scheduler.run(&mut registry, &corpus).await;

    // Closing the channel lets the reporter drain and exit
    drop(scheduler);
    printer.await?;

    match result {
        Ok(summary) if summary.is_success() => {
            println!("\n{}", reporter::render_summary(&summary));
            println!("{}", "Benchmark complete!".green().bold());
            println!("Artifacts written to {}", config.storage.output_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        Ok(summary) => {
            eprintln!("\n{}", reporter::render_summary(&summary));
            eprintln!("{}", "Benchmark failed".red().bold());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), "Run aborted: {}", e);
            eprintln!("{} {}", "Benchmark aborted:".red().bold(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}
