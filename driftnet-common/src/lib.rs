//! Shared utilities for the driftnet workspace.
//!
//! Currently this is just the observability setup; anything needed by more
//! than one crate but owned by none of them lands here.

pub mod observability;

pub type Result<T> = anyhow::Result<T>;
