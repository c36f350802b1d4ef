//! Collector for `softnas-cmd perfmon` (ARC cache counters).
//!
//! `perfmon` returns one sample per minute. Minutes that have not been
//! sampled yet are reported as zeros, so each counter is reduced with
//! [`average_nonzero`].

use crate::collector::Collector;
use crate::collector::traits::{Request, Tool};
use crate::error::PluginError;
use crate::metrics::MetricMap;
use crate::response::{PerfmonRecord, decode_records};
use crate::series::average_nonzero;

const ACTION: &str = "perfmon";

/// Counters averaged into one metric each.
const COUNTERS: [(&str, fn(&PerfmonRecord) -> Option<f64>); 4] = [
    ("arc_hits", |r: &PerfmonRecord| r.arc_hits),
    ("arc_miss", |r: &PerfmonRecord| r.arc_miss),
    ("arc_read", |r: &PerfmonRecord| r.arc_read),
    ("arc_hitpercent", |r: &PerfmonRecord| r.arc_hitpercent),
];

/// Reduces `perfmon` samples to one value per ARC counter.
///
/// Each series has exactly one entry per received sample; missing counters
/// count as zero.
pub fn perfmon_metrics(records: &[PerfmonRecord]) -> MetricMap {
    let mut metrics = MetricMap::new();
    for (name, counter) in COUNTERS {
        let series: Vec<f64> = records.iter().map(|r| counter(r).unwrap_or(0.0)).collect();
        metrics.insert(name, average_nonzero(&series));
    }
    metrics
}

impl<T: Tool> Collector<T> {
    /// Collects ARC hit, miss and read counters averaged over the sampled minutes.
    pub fn collect_perfmon(&self) -> Result<MetricMap, PluginError> {
        let body = self.tool.invoke(&Request::Perfmon {
            session: self.session,
        })?;
        let records: Vec<PerfmonRecord> = decode_records(ACTION, &body)?;
        Ok(perfmon_metrics(&records))
    }
}
