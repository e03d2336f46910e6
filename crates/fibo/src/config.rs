//! Application configuration from CLI flags and environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use fibo_core::constants::DEFAULT_WORKERS;

/// Default location of the journal cache.
pub const DEFAULT_CACHE_PATH: &str = ".fibo-cache.jsonl";

/// Memoized Fibonacci calculator with a persistent cache.
#[derive(Parser, Debug)]
#[command(name = "fibo", version, about)]
pub struct AppConfig {
    /// Cache backend.
    #[arg(long, value_enum, default_value_t = CacheKind::Journal, env = "FIBO_CACHE", global = true)]
    pub cache: CacheKind,

    /// Journal file used by the `journal` backend.
    #[arg(long, default_value = DEFAULT_CACHE_PATH, env = "FIBO_CACHE_PATH", global = true)]
    pub cache_path: PathBuf,

    /// Enable debug logging.
    #[arg(long, env = "FIBO_DEBUG", global = true)]
    pub debug: bool,

    /// Print each result as a JSON response envelope.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print bare values only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print cache statistics to stderr after the command.
    #[arg(long, global = true)]
    pub stats: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Calculate the Fibonacci number for an ordinal.
    Calculate {
        /// Ordinal n of F(n).
        #[arg(allow_negative_numbers = true)]
        ordinal: String,
    },

    /// Count the ordinals whose Fibonacci number lies in [MIN, MAX].
    Count {
        /// Upper bound (inclusive).
        #[arg(allow_negative_numbers = true)]
        max: String,

        /// Lower bound (inclusive).
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        min: String,
    },

    /// Remove every cached value.
    Clear,

    /// Calculate every ordinal in [START, END] through the worker pool.
    Batch {
        #[arg(allow_negative_numbers = true)]
        start: String,
        #[arg(allow_negative_numbers = true)]
        end: String,

        /// Number of worker threads.
        #[arg(long, short, default_value_t = DEFAULT_WORKERS, env = "FIBO_WORKERS")]
        workers: usize,
    },

    /// Generate a shell completion script.
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Selectable cache backends.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// In-process table, discarded on exit.
    Memory,
    /// JSON-lines journal file, kept across runs.
    Journal,
    /// No caching.
    None,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("fibo").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["calculate", "10"]);
        assert_eq!(config.cache, CacheKind::Journal);
        assert_eq!(config.cache_path, PathBuf::from(DEFAULT_CACHE_PATH));
        assert!(!config.json && !config.quiet && !config.stats);
        assert_eq!(
            config.command,
            Command::Calculate {
                ordinal: "10".into()
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let config = parse(&["count", "100", "--cache", "memory", "--json"]);
        assert_eq!(config.cache, CacheKind::Memory);
        assert!(config.json);
        assert_eq!(
            config.command,
            Command::Count {
                max: "100".into(),
                min: "0".into()
            }
        );
    }

    #[test]
    fn count_accepts_negative_min() {
        let config = parse(&["count", "10", "--min", "-5"]);
        assert_eq!(
            config.command,
            Command::Count {
                max: "10".into(),
                min: "-5".into()
            }
        );
    }

    #[test]
    fn batch_workers() {
        let config = parse(&["batch", "0", "20", "--workers", "8"]);
        assert_eq!(
            config.command,
            Command::Batch {
                start: "0".into(),
                end: "20".into(),
                workers: 8
            }
        );
    }

    #[test]
    fn unknown_cache_kind_is_rejected() {
        let result = AppConfig::try_parse_from(["fibo", "--cache", "redis", "clear"]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(AppConfig::try_parse_from(["fibo"]).is_err());
    }
}
