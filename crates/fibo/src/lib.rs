//! fibo library: application logic for the `fibo` command.

pub mod app;
pub mod config;
pub mod errors;
