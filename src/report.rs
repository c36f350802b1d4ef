//! Output in the Mackerel agent plugin format.
//!
//! Values are printed one per line as `<graph>.<metric>\t<value>\t<epoch>`.
//! When the agent asks for plugin metadata it sets
//! `MACKEREL_AGENT_PLUGIN_META`, and the plugin prints a marker line
//! followed by the graph definition as JSON instead.

use std::io::{self, Write};

use tracing::trace;

use crate::graph::GraphDefinition;
use crate::metrics::MetricMap;

/// Environment variable the agent sets to request graph definitions.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

const META_HEADER: &str = "# mackerel-agent-plugin";

/// Returns `true` if the agent requested graph definitions.
pub fn meta_requested() -> bool {
    std::env::var_os(META_ENV).is_some_and(|v| !v.is_empty())
}

/// Writes one line per metric that appears in both `graphs` and `metrics`.
///
/// Non-finite values are skipped. Returns the number of lines written.
pub fn write_values<W: Write>(
    out: &mut W,
    graphs: &GraphDefinition,
    metrics: &MetricMap,
    timestamp: i64,
) -> io::Result<usize> {
    let mut written = 0;
    for (key, graph) in graphs.iter() {
        for metric in &graph.metrics {
            let Some(value) = metrics.get(&metric.name) else {
                continue;
            };
            if !value.is_finite() {
                trace!("Skipping non-finite {} = {}", metric.name, value);
                continue;
            }
            writeln!(out, "{}.{}\t{:.6}\t{}", key, metric.name, value, timestamp)?;
            written += 1;
        }
    }
    Ok(written)
}

/// Writes the plugin metadata marker and graph definition JSON.
pub fn write_meta<W: Write>(out: &mut W, graphs: &GraphDefinition) -> io::Result<()> {
    writeln!(out, "{}", META_HEADER)?;
    serde_json::to_writer(&mut *out, graphs)?;
    writeln!(out)
}
