//! CLI output formatting utilities.

use crate::pipeline::{ProgressSink, Stage};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Shows one spinner line per pipeline stage.
pub struct StageSpinner {
    bar: ProgressBar,
}

impl StageSpinner {
    pub fn new() -> Self {
        Self {
            bar: Output::spinner("Starting..."),
        }
    }

    /// Stop the spinner and clear its line.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for StageSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for StageSpinner {
    fn stage_started(&self, stage: Stage) {
        self.bar
            .set_message(format!("[{}/4] {}", stage.number(), stage.activity()));
    }

    fn stage_finished(&self, stage: Stage, elapsed: Duration) {
        self.bar.println(format!(
            "{} {} ({})",
            style("✓").green(),
            stage.label(),
            format_duration(elapsed.as_secs_f64())
        ));
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let minutes = total_seconds / 60;
    let secs = total_seconds % 60;

    if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{:.1}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(2.34), "2.3s");
        assert_eq!(format_duration(125.0), "2m 5s");
    }
}
