//! Refresh services.
//!
//! [`Refresher`] runs one token + fetch + rewrite cycle and commits the
//! result; [`Scheduler`] fires it on a fixed interval.

pub mod refresh;
pub mod scheduler;

pub use refresh::{RefreshOutcome, RefreshReport, RefreshState, Refresher};
pub use scheduler::{RefreshPolicy, Scheduler, SchedulerHandle};
