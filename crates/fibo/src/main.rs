//! fibo: memoized Fibonacci calculator.

use std::process::ExitCode;

use fibo_lib::{app, config, errors};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = config::AppConfig::parse();

    // RUST_LOG overrides the level picked by --debug.
    let default_level = if config.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            errors::report_error(&config, &err);
            let code = errors::handle_error(&err);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
