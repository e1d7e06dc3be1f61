//! Output formatting.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter, format_file_size, staged_lines};
