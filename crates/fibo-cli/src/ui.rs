//! Terminal styling and the batch progress bar.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Check if color output is disabled via the `NO_COLOR` env var.
#[must_use]
pub fn is_color_disabled() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

/// Prefix for error lines on stderr.
#[must_use]
pub fn error_label(color: bool) -> String {
    if color {
        style("[ERROR]").red().bold().to_string()
    } else {
        "[ERROR]".to_string()
    }
}

/// Header line for a titled block such as cache statistics.
#[must_use]
pub fn header(text: &str, color: bool) -> String {
    let line = format!("=== {text} ===");
    if color {
        style(line).bold().cyan().to_string()
    } else {
        line
    }
}

/// Progress display for a batch run through the worker pool.
///
/// Draws to stderr. A hidden bar is used when nothing should be drawn, so
/// callers never branch on visibility.
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// A visible bar over `total` ordinals.
    #[must_use]
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let template = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(template);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A bar that never draws.
    #[must_use]
    pub fn hidden(total: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total);
        Self { bar }
    }

    /// Record one finished ordinal.
    pub fn completed(&self, ordinal: u64) {
        self.bar.set_message(format!("F({ordinal})"));
        self.bar.inc(1);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
