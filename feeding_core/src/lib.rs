#![forbid(unsafe_code)]

//! Core domain model and business logic for the Neofeed scheduling tool.
//!
//! This crate provides:
//! - Domain types (patients, feed entries, suggestions, visits)
//! - The fixed feeding cycle table
//! - The per-feed volume calculator
//! - The admin unlock gate
//! - Persistence (visit log, CSV archive, board, state)

pub mod types;
pub mod error;
pub mod cycle;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod admin;
pub mod state;
pub mod board;
pub mod visit_log;
pub mod rollup;
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use cycle::{get_default_cycle, FeedCycle, FeedSlot};
pub use config::Config;
pub use schedule::compute_schedule;
pub use admin::is_unlock_request;
pub use board::Board;
pub use visit_log::{JsonlVisitLog, VisitSink};
pub use stats::count_visits;
