//! softnas - SoftNAS metrics plugin library.
//!
//! Polls `softnas-cmd` for capacity, ARC cache and pool I/O statistics and
//! renders them for the Mackerel agent:
//! - `collector` - tool invocation, login and metric collectors
//! - `units` / `series` - size token parsing and sample averaging
//! - `metrics` - flat metric maps and merging
//! - `graph` / `report` - graph definitions and plugin output

pub mod collector;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod report;
pub mod response;
pub mod series;
pub mod units;

pub use error::PluginError;
