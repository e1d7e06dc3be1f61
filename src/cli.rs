//! CLI argument parsing for pdfstage.
//!
//! This module defines the command-line interface using `clap`: one
//! subcommand per flavor, sharing the same staging arguments.
//!
//! # Examples
//!
//! ```no_run
//! use pdfstage::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let config = cli.to_config().expect("Invalid configuration");
//! println!("Staging {} inputs", config.inputs.len());
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS, Edit, OverwriteMode, ServiceTarget};
use crate::error::{Result, StageError};
use crate::flavor::FlavorKind;

/// Stage files in order and turn them into one PDF.
///
/// pdfstage collects PDFs or images into an ordered list, lets you reorder
/// or drop entries, and submits the list to a conversion service that
/// returns a single PDF.
#[derive(Parser, Debug)]
#[command(name = "pdfstage")]
#[command(version)]
#[command(about = "Stage files in order and turn them into one PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// What to build from the staged files.
    #[command(subcommand)]
    pub command: Command,
}

/// Flavor selector.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge PDF files into merged.pdf
    ///
    /// Examples:
    ///   pdfstage merge cover.pdf body.pdf
    ///   pdfstage merge --local chapter*.pdf -o out/
    Merge(StageArgs),

    /// Convert images into converted.pdf
    ///
    /// Examples:
    ///   pdfstage convert scan-*.png
    ///   pdfstage convert a.png b.jpg --edit move=0:1
    Convert(StageArgs),
}

/// Arguments shared by every flavor.
#[derive(Args, Debug, Clone)]
pub struct StageArgs {
    /// Files or glob patterns to stage, in order
    ///
    /// Files whose type does not match the subcommand are skipped.
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Read more inputs from a file (one path per line)
    ///
    /// Lines starting with '#' and blank lines are ignored. These inputs are
    /// staged after the ones given on the command line.
    #[arg(short = 'l', long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Base URL of the conversion service
    #[arg(short, long, value_name = "URL", env = "PDFSTAGE_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Give up on the service after this many seconds
    #[arg(short, long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Merge in-process instead of calling the service (merge only)
    #[arg(long)]
    pub local: bool,

    /// Edit the staged list before submitting (repeatable, applied in order)
    ///
    /// move=FROM:TO drags entry FROM onto entry TO; remove=INDEX deletes an
    /// entry. Indices are 0-based and refer to the list as it is after the
    /// previous edits.
    #[arg(short, long = "edit", value_name = "EDIT")]
    pub edits: Vec<Edit>,

    /// Directory to save the resulting PDF into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Stage and edit, print the list, and stop before submitting
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the staged list as JSON
    #[arg(long)]
    pub json: bool,

    /// Show every staging step
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Selected flavor and its arguments.
    pub fn flavor(&self) -> (FlavorKind, &StageArgs) {
        match &self.command {
            Command::Merge(args) => (FlavorKind::Merge, args),
            Command::Convert(args) => (FlavorKind::Convert, args),
        }
    }

    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidConfig`] if validation fails.
    pub fn to_config(&self) -> Result<Config> {
        let (flavor, args) = self.flavor();

        let service = if args.local {
            ServiceTarget::Local
        } else {
            ServiceTarget::Http {
                base_url: args.server.clone(),
                timeout: Duration::from_secs(args.timeout),
            }
        };

        let config = Config {
            flavor,
            inputs: args.inputs.clone(),
            input_list: args.input_list.clone(),
            service,
            edits: args.edits.clone(),
            output_dir: args.output_dir.clone(),
            overwrite_mode: OverwriteMode::from_flags(args.force, args.no_clobber),
            dry_run: args.dry_run,
            json: args.json,
            verbose: args.verbose,
            quiet: args.quiet,
        };

        config.validate().map_err(|e| {
            StageError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
