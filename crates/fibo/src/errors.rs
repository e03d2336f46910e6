//! Error reporting and exit codes.

use std::io;

use fibo_cli::presenter::{CliPresenter, OutputMode};
use fibo_cli::ui::is_color_disabled;
use fibo_core::constants::exit_codes;
use fibo_core::{CacheError, FiboError, ParseNumberError};

use crate::config::AppConfig;

/// Map a failed run to the process exit code.
pub fn handle_error(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<FiboError>() {
        return fibo_exit_code(err);
    }
    if err.downcast_ref::<CacheError>().is_some() {
        return exit_codes::ERROR_CACHE;
    }
    if err.downcast_ref::<ParseNumberError>().is_some() {
        return exit_codes::ERROR_INVALID_INPUT;
    }
    exit_codes::ERROR_GENERIC
}

fn fibo_exit_code(err: &FiboError) -> i32 {
    match err {
        FiboError::Parse(_) | FiboError::InvalidOrdinal(_) | FiboError::InvalidArgument(_) => {
            exit_codes::ERROR_INVALID_INPUT
        }
        FiboError::Cache(_) => exit_codes::ERROR_CACHE,
        FiboError::AlreadyRunning
        | FiboError::NotRunning
        | FiboError::WorkerLost
        | FiboError::Spawn(_) => {
            exit_codes::ERROR_GENERIC
        }
    }
}

/// Print a failed run: an `ERROR` envelope on stdout in JSON mode, a
/// labelled line on stderr otherwise.
pub fn report_error(config: &AppConfig, err: &anyhow::Error) {
    let mode = OutputMode::from_flags(config.json, config.quiet);
    let presenter = CliPresenter::new(mode, !is_color_disabled());
    let message = format!("{err:#}");
    // A failed write here has nowhere left to go; the exit code still
    // signals the failure.
    let _ = if mode == OutputMode::Json {
        presenter.error(&mut io::stdout().lock(), &message)
    } else {
        presenter.error(&mut io::stderr().lock(), &message)
    };
}
