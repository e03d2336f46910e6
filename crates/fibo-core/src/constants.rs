//! Shared constants for the generator, the worker pool and the binaries.

/// Input and output queues hold this many jobs per worker.
pub const QUEUE_SLOTS_PER_WORKER: usize = 4;

/// Default number of pool workers when none is configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// The cache backend failed.
    pub const ERROR_CACHE: i32 = 3;
    /// Malformed input or violated precondition.
    pub const ERROR_INVALID_INPUT: i32 = 4;
}
