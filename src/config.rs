//! Configuration module for pdfstage.
//!
//! This module turns CLI arguments into a validated configuration for one
//! staging session: which flavor to run, what to stage, which edits to apply,
//! where to send the batch and where to save the result.

use anyhow::{Context, Result, bail};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::StageError;
use crate::flavor::FlavorKind;

/// Default service location.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// Default exchange timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Behavior when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Ask before replacing.
    #[default]
    Prompt,
    /// Replace without asking.
    Force,
    /// Never replace; fail instead.
    NoClobber,
}

impl OverwriteMode {
    /// Resolve the mode from the `--force` / `--no-clobber` flags.
    pub fn from_flags(force: bool, no_clobber: bool) -> Self {
        match (force, no_clobber) {
            (true, _) => Self::Force,
            (false, true) => Self::NoClobber,
            (false, false) => Self::Prompt,
        }
    }
}

/// Where batches are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTarget {
    /// Remote service reached over HTTP.
    Http {
        /// Base URL; endpoints are appended to it.
        base_url: String,
        /// Whole-exchange timeout.
        timeout: Duration,
    },
    /// In-process lopdf merge.
    Local,
}

impl Default for ServiceTarget {
    fn default() -> Self {
        Self::Http {
            base_url: DEFAULT_SERVER.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// One edit applied to the staged sequence before submission.
///
/// Parsed from `move=FROM:TO` or `remove=INDEX` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Drag the entry at `from` and drop it on `to`.
    Move {
        /// Source index.
        from: usize,
        /// Drop target index.
        to: usize,
    },
    /// Delete the entry at `index`.
    Remove {
        /// Index to delete.
        index: usize,
    },
}

impl FromStr for Edit {
    type Err = StageError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let invalid = || {
            StageError::invalid_config(format!(
                "Invalid edit: {s}. Expected move=FROM:TO or remove=INDEX"
            ))
        };
        let parse_index = |value: &str| value.trim().parse::<usize>().map_err(|_| invalid());

        let (kind, value) = s.split_once('=').ok_or_else(invalid)?;
        match kind.trim().to_lowercase().as_str() {
            "move" => {
                let (from, to) = value.split_once(':').ok_or_else(invalid)?;
                Ok(Self::Move {
                    from: parse_index(from)?,
                    to: parse_index(to)?,
                })
            }
            "remove" => Ok(Self::Remove {
                index: parse_index(value)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { from, to } => write!(f, "move={from}:{to}"),
            Self::Remove { index } => write!(f, "remove={index}"),
        }
    }
}

/// Validated configuration for one session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which flavor to run.
    pub flavor: FlavorKind,
    /// Input paths or glob patterns, in argument order.
    pub inputs: Vec<String>,
    /// Optional file listing further inputs.
    pub input_list: Option<PathBuf>,
    /// Service to submit to.
    pub service: ServiceTarget,
    /// Edits applied in order after staging.
    pub edits: Vec<Edit>,
    /// Directory the artifact is saved into.
    pub output_dir: PathBuf,
    /// Overwrite policy for the saved artifact.
    pub overwrite_mode: OverwriteMode,
    /// Stage and edit only; skip the exchange.
    pub dry_run: bool,
    /// Print the staged list as JSON.
    pub json: bool,
    /// Verbose output.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Config {
    /// Validate option combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - nothing would be staged
    /// - both verbose and quiet are set
    /// - the timeout is zero
    /// - the local backend is combined with image conversion
    /// - the server URL is malformed
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        match &self.service {
            ServiceTarget::Http { timeout, .. } if timeout.is_zero() => {
                bail!("Timeout must be at least 1 second");
            }
            ServiceTarget::Http { .. } => {
                self.server_url()?;
            }
            ServiceTarget::Local if self.flavor == FlavorKind::Convert => {
                bail!("--local only supports merging PDFs");
            }
            ServiceTarget::Local => {}
        }

        Ok(())
    }

    /// Parsed server URL, if an HTTP service is configured.
    pub fn server_url(&self) -> Result<Option<Url>> {
        let ServiceTarget::Http { base_url, .. } = &self.service else {
            return Ok(None);
        };

        let url = Url::parse(base_url).with_context(|| format!("Invalid server URL: {base_url}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Server URL must use http or https: {base_url}");
        }
        Ok(Some(url))
    }

    /// Full path of the artifact this session would save.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.flavor.output_filename())
    }

    /// Whether regular output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }
}
