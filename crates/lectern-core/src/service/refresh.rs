//! A single refresh cycle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use lectern_upstream::{
    Category, ContentFetcher, Credential, Record, Rewriter, TokenProvider, Transport,
    UpstreamConfig,
};
use tracing::{debug, info, warn};

use crate::cache::SnapshotStore;
use crate::error::Result;

/// Whether a refresh is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh in progress.
    Idle,
    /// A refresh cycle is running.
    Refreshing,
}

/// Per-cycle summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Categories that were replaced, with their new record counts.
    pub updated: Vec<(Category, usize)>,
    /// Categories that kept their previous data, with the failure reason.
    pub failed: Vec<(Category, String)>,
    /// Refresh time recorded in the snapshot.
    pub last_updated: DateTime<Utc>,
}

/// Result of [`Refresher::refresh`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Another cycle was already running; nothing was done.
    Skipped,
    /// No credential could be obtained; the snapshot is untouched.
    Aborted(lectern_upstream::Error),
    /// The cycle ran; see the report for per-category results.
    Completed(RefreshReport),
}

impl RefreshOutcome {
    /// Returns the report of a completed cycle.
    #[must_use]
    pub const fn report(&self) -> Option<&RefreshReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped | Self::Aborted(_) => None,
        }
    }
}

/// Clears the in-flight flag when the cycle ends, including on panic.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs refresh cycles against the upstream and commits them to a store.
///
/// This is the only writer of its [`SnapshotStore`]. Cycles are not
/// reentrant: a call made while another cycle is running returns
/// [`RefreshOutcome::Skipped`].
#[derive(Debug)]
pub struct Refresher<T> {
    tokens: TokenProvider<T>,
    fetcher: ContentFetcher<T>,
    store: SnapshotStore,
    in_flight: AtomicBool,
}

impl<T: Transport> Refresher<T> {
    /// Creates a refresher from its parts.
    #[must_use]
    pub const fn new(
        tokens: TokenProvider<T>,
        fetcher: ContentFetcher<T>,
        store: SnapshotStore,
    ) -> Self {
        Self {
            tokens,
            fetcher,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Creates a refresher that shares `transport` between token and
    /// content requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream configuration is invalid.
    pub fn from_config(
        transport: T,
        config: &UpstreamConfig,
        rewriter: Rewriter,
        store: SnapshotStore,
    ) -> Result<Self>
    where
        T: Clone,
    {
        let tokens = TokenProvider::new(transport.clone(), config)?;
        let fetcher = ContentFetcher::new(transport, config, rewriter)?;
        Ok(Self::new(tokens, fetcher, store))
    }

    /// Returns the store this refresher writes to.
    #[must_use]
    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Returns whether a cycle is running.
    #[must_use]
    pub fn state(&self) -> RefreshState {
        if self.in_flight.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Runs one refresh cycle.
    ///
    /// Failures are logged and reported in the outcome; none of them clear
    /// cached data.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("refresh already in progress, skipping");
            return RefreshOutcome::Skipped;
        };

        info!("Updating lecture data");
        let credential = match self.tokens.get_token().await {
            Ok(credential) => credential,
            Err(err) => {
                warn!(error = %err, "refresh aborted: no credential, keeping cached data");
                return RefreshOutcome::Aborted(err);
            }
        };

        let results = join_all(
            Category::ALL
                .into_iter()
                .map(|category| self.fetch_one(category, &credential)),
        )
        .await;

        let mut updates = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (category, result) in results {
            match result {
                Ok(records) => updates.push((category, records)),
                Err(err) => {
                    warn!(%category, error = %err, "fetch failed, keeping previous data");
                    failed.push((category, err.to_string()));
                }
            }
        }

        let updated: Vec<_> = updates
            .iter()
            .map(|(category, records)| (*category, records.len()))
            .collect();
        let last_updated = self.store.commit(updates, Utc::now());

        info!(
            updated = ?updated,
            failed = failed.len(),
            "Update successful"
        );

        RefreshOutcome::Completed(RefreshReport {
            updated,
            failed,
            last_updated,
        })
    }

    async fn fetch_one(
        &self,
        category: Category,
        credential: &Credential,
    ) -> (Category, lectern_upstream::Result<Vec<Record>>) {
        (
            category,
            self.fetcher.fetch_category(category, credential).await,
        )
    }
}
