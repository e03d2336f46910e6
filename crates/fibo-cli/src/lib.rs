//! # fibo-cli
//!
//! CLI output, the JSON response envelope, batch progress display and
//! shell completion.

pub mod completion;
pub mod envelope;
pub mod output;
pub mod presenter;
pub mod ui;

pub use envelope::{Response, Status};
pub use presenter::{CliPresenter, OutputMode};
