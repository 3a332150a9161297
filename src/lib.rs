//! Session scheduling for multi-runner events.
//!
//! Assigns pre-registered runners, each offering one timed run of known
//! estimated duration, to one of several parallel sessions across a
//! multi-day event window. Per-runner availability is respected,
//! runners sharing a session never overlap, earlier sessions are packed
//! as tightly as possible, and the final session stays loose as an
//! overflow lane.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `TimeWindow`, `Runner`, `Genre`,
//!   `Instance`, `Schedule`, `Assignment`
//! - **`availability`**: Consolidates ragged per-day hour lists into
//!   minimal contiguous eligibility windows
//! - **`mip`**: The session-assignment MIP — variable and constraint
//!   construction, the bounded solve call, and solution decoding
//! - **`io`**: CSV instance reading and schedule-grid writing
//! - **`config`**: Solve settings and timing constants
//! - **`error`**: Crate-wide error type
//!
//! # Pipeline
//!
//! One synchronous batch per invocation: read an instance, build and
//! solve the model under the configured time budget, write the grid.
//! Infeasibility and budget exhaustion are ordinary terminal states
//! surfaced as an empty schedule, never panics.

pub mod availability;
pub mod config;
pub mod error;
pub mod io;
pub mod mip;
pub mod models;
