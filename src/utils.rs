//! Terminal helpers for the command handlers

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::io::IsTerminal;
use tinify::constants::{PROGRESS_SPINNER_TEMPLATE, SPINNER_TICK};

/// Spinner shown on stderr while waiting for the Tinify API
///
/// # Arguments
/// * `message` - What the tool is waiting for
///
/// # Returns
/// * A ticking spinner, or a hidden one when stderr is not a terminal
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner().with_message(message.to_string());
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(SPINNER_TICK);
    spinner
}

/// Human-readable byte count using binary units ("512 B", "1.5 KB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = *next;
    }
    format!("{:.1} {}", value, unit)
}

/// Uploaded size against the size of the returned image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSummary {
    pub original: u64,
    pub result: u64,
}

impl SizeSummary {
    pub fn new(original: u64, result: u64) -> Self {
        Self { original, result }
    }

    /// Percentage saved; negative when the result grew.
    pub fn saved_percent(&self) -> f64 {
        if self.original == 0 {
            return 0.0;
        }
        (self.original as f64 - self.result as f64) / self.original as f64 * 100.0
    }
}

impl fmt::Display for SizeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let saved = self.saved_percent();
        let direction = if saved < 0.0 { "larger" } else { "smaller" };
        write!(
            f,
            "{} -> {} ({:.1}% {})",
            format_file_size(self.original),
            format_file_size(self.result),
            saved.abs(),
            direction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_size_summary() {
        assert_eq!(SizeSummary::new(1000, 800).saved_percent(), 20.0);
        assert_eq!(SizeSummary::new(1000, 1200).saved_percent(), -20.0);
        assert_eq!(SizeSummary::new(0, 500).saved_percent(), 0.0);

        assert_eq!(
            SizeSummary::new(2048, 1024).to_string(),
            "2.0 KB -> 1.0 KB (50.0% smaller)"
        );
        assert_eq!(
            SizeSummary::new(1000, 1100).to_string(),
            "1000 B -> 1.1 KB (10.0% larger)"
        );
    }
}
