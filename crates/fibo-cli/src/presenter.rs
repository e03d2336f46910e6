//! Rendering of command results as text or JSON envelopes.

use std::io::{self, Write};
use std::time::Duration;

use fibo_core::{CacheStats, Number};
use fibo_workers::Computed;

use crate::envelope::Response;
use crate::output::{format_count, format_duration};
use crate::ui::{error_label, header};

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Labelled, human-readable lines.
    Text,
    /// Bare values only.
    Quiet,
    /// One JSON `Response` per result.
    Json,
}

impl OutputMode {
    /// Pick the mode from the global flags; `--json` wins over `--quiet`.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            Self::Json
        } else if quiet {
            Self::Quiet
        } else {
            Self::Text
        }
    }
}

/// Writes command results to the given output.
pub struct CliPresenter {
    mode: OutputMode,
    color: bool,
}

impl CliPresenter {
    #[must_use]
    pub fn new(mode: OutputMode, color: bool) -> Self {
        Self { mode, color }
    }

    #[must_use]
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Result of `calculate`.
    pub fn value(&self, out: &mut dyn Write, value: &Number) -> io::Result<()> {
        match self.mode {
            OutputMode::Text => writeln!(out, "Fibonacci number: {value}"),
            OutputMode::Quiet => writeln!(out, "{value}"),
            OutputMode::Json => envelope(out, &Response::ok("", value.to_decimal_string())),
        }
    }

    /// Result of `count`.
    pub fn count(&self, out: &mut dyn Write, count: u64) -> io::Result<()> {
        match self.mode {
            OutputMode::Text => writeln!(out, "Ordinals in this range: {count}"),
            OutputMode::Quiet => writeln!(out, "{count}"),
            OutputMode::Json => envelope(out, &Response::ok("", count.to_string())),
        }
    }

    /// Result of `clear`.
    pub fn cleared(&self, out: &mut dyn Write) -> io::Result<()> {
        match self.mode {
            OutputMode::Text => writeln!(out, "Successfully cleared cache"),
            OutputMode::Quiet => Ok(()),
            OutputMode::Json => envelope(out, &Response::ok("Cache cleared", "")),
        }
    }

    /// Results of `batch`, written in ordinal order.
    pub fn batch(&self, out: &mut dyn Write, results: &mut [Computed]) -> io::Result<()> {
        results.sort_unstable_by_key(|c| c.ordinal);
        for c in results.iter() {
            match self.mode {
                OutputMode::Text => writeln!(out, "F({}) = {}", c.ordinal, c.value)?,
                OutputMode::Quiet => writeln!(out, "{}", c.value)?,
                OutputMode::Json => envelope(
                    out,
                    &Response::ok(format!("F({})", c.ordinal), c.value.to_decimal_string()),
                )?,
            }
        }
        Ok(())
    }

    /// Cache statistics block for `--stats`.
    pub fn stats(
        &self,
        out: &mut dyn Write,
        stats: &CacheStats,
        elapsed: Duration,
    ) -> io::Result<()> {
        writeln!(out, "{}", header("Cache statistics", self.color))?;
        writeln!(out, "Hits:           {}", format_count(stats.hits))?;
        writeln!(out, "Misses:         {}", format_count(stats.misses))?;
        writeln!(out, "Writes:         {}", format_count(stats.writes))?;
        writeln!(out, "Read failures:  {}", format_count(stats.read_failures))?;
        writeln!(out, "Write failures: {}", format_count(stats.write_failures))?;
        writeln!(out, "Hit ratio:      {:.1}%", stats.hit_ratio() * 100.0)?;
        writeln!(out, "Elapsed:        {}", format_duration(elapsed))
    }

    /// A failed command. In JSON mode this is an `ERROR` envelope.
    pub fn error(&self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        match self.mode {
            OutputMode::Json => envelope(out, &Response::error(message)),
            OutputMode::Text | OutputMode::Quiet => {
                writeln!(out, "{} {message}", error_label(self.color))
            }
        }
    }
}

fn envelope(out: &mut dyn Write, response: &Response) -> io::Result<()> {
    let line = response.to_json().map_err(io::Error::other)?;
    writeln!(out, "{line}")
}
