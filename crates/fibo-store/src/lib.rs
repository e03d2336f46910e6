//! # fibo-store
//!
//! Persistent backend for the fibo cache contract: an append-only
//! JSON-lines journal replayed into memory on open.

pub mod journal;

pub use journal::JournalCache;
