//! Worker pool for concurrent Fibonacci requests.
//!
//! A `GeneratorPool` runs a fixed number of threads, each owning a
//! generator over one shared cache. Requests and results travel over
//! bounded crossbeam channels.

pub mod pool;

pub use pool::{Computed, GeneratorPool};
