//! Main collector that runs one poll cycle against `softnas-cmd`.
//!
//! The `Collector` struct owns the tool and the session handle, runs every
//! metric collector in turn and merges their output.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::collector::session::{Credentials, resolve_session};
use crate::collector::traits::{SessionId, Tool};
use crate::error::PluginError;
use crate::metrics::{MetricMap, merge};

/// Timing information for each collector phase.
///
/// Used for debugging slow appliances.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total poll cycle time, excluding login.
    pub total: Duration,
    /// Time to list pools.
    pub pools: Duration,
    /// Time to collect capacity and cache memory usage.
    pub overview: Duration,
    /// Time to collect ARC counters.
    pub perfmon: Duration,
    /// Time to collect per-pool I/O, all pools together.
    pub pool_io: Duration,
}

/// Result of a successful poll cycle.
#[derive(Debug, Clone, Default)]
pub struct Poll {
    /// Merged metrics from every collector.
    pub metrics: MetricMap,
    /// Pools discovered during the cycle, in appliance order.
    pub pools: Vec<String>,
    pub timing: CollectorTiming,
}

/// Collects SoftNAS metrics through a [`Tool`].
pub struct Collector<T: Tool> {
    pub(crate) tool: T,
    pub(crate) session: SessionId,
}

impl<T: Tool> Collector<T> {
    /// Creates a collector for an already established session.
    pub fn new(tool: T, session: SessionId) -> Self {
        Self { tool, session }
    }

    /// Logs in with `credentials` and creates a collector for the new session.
    pub fn login(tool: T, credentials: &Credentials) -> Result<Self, PluginError> {
        let session = resolve_session(&tool, credentials)?;
        Ok(Self::new(tool, session))
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    /// Runs a full poll cycle.
    ///
    /// Pools are listed first, then overview, perfmon and per-pool I/O are
    /// collected and merged in that order. The first error aborts the cycle
    /// and no metrics are returned.
    pub fn collect_all(&self) -> Result<Poll, PluginError> {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();

        let start = Instant::now();
        let pools = self.list_pools()?;
        timing.pools = start.elapsed();

        let start = Instant::now();
        let overview = self.collect_overview()?;
        timing.overview = start.elapsed();

        let start = Instant::now();
        let perfmon = self.collect_perfmon()?;
        timing.perfmon = start.elapsed();

        let start = Instant::now();
        let pool_io = self.collect_pools(&pools)?;
        timing.pool_io = start.elapsed();

        let metrics = merge([overview, perfmon, pool_io]);
        timing.total = total_start.elapsed();

        debug!(
            "Collected {} metrics for {} pools in {:?} (pools={:?}, overview={:?}, perfmon={:?}, pool_io={:?})",
            metrics.len(),
            pools.len(),
            timing.total,
            timing.pools,
            timing.overview,
            timing.perfmon,
            timing.pool_io
        );

        Ok(Poll {
            metrics,
            pools,
            timing,
        })
    }
}
