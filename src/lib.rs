//! Workspace-level integration tests for fibo.
//!
//! The test suites live under `tests/`; this crate only exists to host them.
