//! # lectern-core
//!
//! Caching and refresh logic for the lectern lecture proxy.
//!
//! This crate provides:
//! - **Snapshot cache** - the last good copy of every lecture category
//! - **Refresh cycle** - token, concurrent category fetches, partial commit
//! - **Scheduler** - fixed-interval refresh with optional jitter
//! - **Configuration** - environment-driven settings for the whole process
//!
//! Readers always see the most recent successful data. A failed refresh
//! never clears what is cached.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
mod error;
pub mod service;

pub use cache::{Snapshot, SnapshotStore};
pub use config::{Config, Environment, ServerConfig};
pub use error::{Error, Result};
pub use service::{
    RefreshOutcome, RefreshPolicy, RefreshReport, RefreshState, Refresher, Scheduler,
    SchedulerHandle,
};
