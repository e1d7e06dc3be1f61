//! Terminal output for a staging session.
//!
//! [`OutputFormatter`] prints status lines with quiet/verbose handling and
//! doubles as the terminal's [`RenderSink`] and [`Notifier`], so the staging
//! core can drive it directly.
//!
//! # Examples
//!
//! ```
//! use pdfstage::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Staging files...");
//! formatter.success("Saved converted.pdf");
//! ```

use std::io::{self, IsTerminal};

use crate::config::Config;
use crate::error::{Result, StageError};
use crate::view::{Notifier, RenderSink, RenderedList, ViewMode};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning or user notice.
    Warning,
    /// Error message.
    Error,
    /// Verbose-only message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
            Self::Error => "\x1b[31m",
            Self::Debug => "\x1b[36m",
        }
    }

    // Warnings and errors stay visible when stdout is piped.
    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - Suppress non-error output
    /// * `verbose` - Show verbose output
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var("TERM").is_ok(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Create a verbose formatter.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning. Always displayed.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error. Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Format `message` for `level`, with colour when enabled.
    pub fn format_message(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color = level.color();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.format_message(level, message);
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a labelled detail. Verbose only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a blank line. Suppressed in quiet mode.
    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Print the staged list, numbered from 1.
    pub fn print_staged(&self, list: &RenderedList) {
        if list.items.is_empty() {
            self.info("Nothing staged.");
            return;
        }
        for line in staged_lines(list) {
            if !self.quiet {
                println!("{line}");
            }
        }
    }

    /// Print the staged list as JSON. Printed even in quiet mode.
    pub fn print_json(&self, list: &RenderedList) -> Result<()> {
        let json = serde_json::to_string_pretty(list)
            .map_err(|err| StageError::other(format!("failed to serialize staged list: {err}")))?;
        println!("{json}");
        Ok(())
    }

    /// Whether regular output is shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl RenderSink for OutputFormatter {
    fn render(&self, list: &RenderedList) {
        self.debug(&format!("staged ({}): {}", list.items.len(), list.labels().join(", ")));
    }

    fn view_mode_changed(&self, mode: ViewMode) {
        if mode == ViewMode::Picker {
            self.debug("staging list is empty");
        }
    }

    // The terminal shows labels only.
    fn wants_previews(&self) -> bool {
        false
    }
}

impl Notifier for OutputFormatter {
    fn notify(&self, notice: &str) {
        self.warning(notice);
    }
}

/// One line per staged item: `  1. a.png`.
pub fn staged_lines(list: &RenderedList) -> Vec<String> {
    list.items
        .iter()
        .map(|item| format!("  {}. {}", item.index + 1, item.label))
        .collect()
}

/// Format a byte count for humans.
///
/// # Examples
///
/// ```
/// use pdfstage::output::format_file_size;
///
/// assert_eq!(format_file_size(512), "512 B");
/// assert_eq!(format_file_size(1536), "1.50 KB");
/// ```
pub fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = *next;
    }
    format!("{size:.2} {unit}")
}
