//! pdfstage - stage files in order and turn them into one PDF.

use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pdfstage::StageError;
use pdfstage::cli::Cli;
use pdfstage::config::{Config, OverwriteMode, ServiceTarget};
use pdfstage::flavor::{Flavor, FlavorKind, ImagesToPdf, MergePdfs};
use pdfstage::ingest::{IngestSource, candidates_from_paths, collect_paths_for_patterns, read_input_list};
use pdfstage::output::{OutputFormatter, format_file_size};
use pdfstage::session::Session;
use pdfstage::submit::{ConversionService, HttpService, LocalMergeService, SaveToDirectory, SkipReason, SubmitOutcome};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.flavor().1.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pdfstage=debug" } else { "pdfstage=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), StageError> {
    let config = cli.to_config()?;
    let formatter = Arc::new(OutputFormatter::from_config(&config));

    if formatter.should_print() && !config.json {
        formatter.section(&format!("{} v{}", pdfstage::NAME, pdfstage::VERSION));
        formatter.blank_line();
    }

    match config.flavor {
        FlavorKind::Merge => run_session::<MergePdfs>(&config, formatter).await,
        FlavorKind::Convert => run_session::<ImagesToPdf>(&config, formatter).await,
    }
}

async fn run_session<F: Flavor>(config: &Config, formatter: Arc<OutputFormatter>) -> Result<(), StageError> {
    let paths = collect_paths_for_patterns(&config.inputs)?;

    let overwrite = if config.dry_run {
        config.overwrite_mode
    } else {
        handle_output_overwrite(config, &formatter).await?
    };

    let session = Session::<F>::new(
        build_service(config)?,
        Arc::new(SaveToDirectory::new(&config.output_dir, overwrite)),
        formatter.clone(),
        formatter.clone(),
    );

    // Both batches load concurrently; the list file is published second.
    let first = session.ingest(IngestSource::Picker, candidates_from_paths(&paths));
    let second = async {
        match &config.input_list {
            Some(list) => {
                let listed = read_input_list(list).await?;
                session.ingest(IngestSource::Picker, candidates_from_paths(&listed)).await
            }
            None => Ok(Default::default()),
        }
    };
    let (first, second) = tokio::try_join!(first, second)?;

    let dropped = first.dropped + second.dropped;
    if dropped > 0 {
        formatter.warning(&format!(
            "Skipped {dropped} file(s) not accepted for {}",
            F::OPERATION
        ));
    }

    for edit in &config.edits {
        if !session.apply_edit(*edit) {
            formatter.warning(&format!("Edit {edit} left the list unchanged"));
        }
    }

    let rendered = session.rendered();
    if config.json {
        formatter.print_json(&rendered)?;
    } else {
        formatter.section(&format!("Staged files ({})", rendered.items.len()));
        formatter.print_staged(&rendered);
    }

    if config.dry_run {
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        formatter.info(&format!("  Output would be: {}", config.output_path().display()));
        return Ok(());
    }

    formatter.blank_line();
    formatter.info(F::BUSY_LABEL);

    match session.submit().await {
        SubmitOutcome::Delivered(delivery) => {
            formatter.success(&format!(
                "Saved {} ({})",
                delivery.path.display(),
                format_file_size(delivery.bytes)
            ));
            formatter.detail("Parts submitted", &delivery.parts.to_string());
            Ok(())
        }
        SubmitOutcome::Skipped(SkipReason::Empty) => Err(StageError::NothingStaged),
        SubmitOutcome::Skipped(SkipReason::AlreadyInFlight) => {
            Err(StageError::other("A submission is already in progress"))
        }
        SubmitOutcome::Failed(err) => {
            if err.is_recoverable() {
                formatter.info("The staged list was not changed; run the command again to retry");
            }
            Err(err)
        }
    }
}

fn build_service(config: &Config) -> Result<Arc<dyn ConversionService>, StageError> {
    match &config.service {
        ServiceTarget::Local => Ok(Arc::new(LocalMergeService::new())),
        ServiceTarget::Http { timeout, .. } => {
            let url = config
                .server_url()?
                .ok_or_else(|| StageError::invalid_config("No server URL configured"))?;
            Ok(Arc::new(HttpService::new(url, *timeout)?))
        }
    }
}

/// Decide up front whether the artifact may replace an existing file.
///
/// Returns the mode the save step should use: `Force` once replacing is
/// allowed, `NoClobber` otherwise.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<OverwriteMode, StageError> {
    let output = config.output_path();
    if !output.exists() {
        return Ok(match config.overwrite_mode {
            OverwriteMode::Force => OverwriteMode::Force,
            _ => OverwriteMode::NoClobber,
        });
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(OverwriteMode::Force),
        OverwriteMode::NoClobber => Err(StageError::output_exists(output)),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                // In quiet mode, treat as no-clobber
                return Err(StageError::output_exists(output));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| StageError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(OverwriteMode::Force),
                _ => Err(StageError::Cancelled),
            }
        }
    }
}
