//! SoftNAS metrics collector.
//!
//! This module runs `softnas-cmd` actions and turns their JSON answers into
//! flat metric maps, with support for mocking the tool for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Collector                           │
//! │  login ─► pooldetails ─► overview ─► perfmon ─► pooldetails  │
//! │  (session)  (pool list)   (usage)    (ARC)      <pool> × N   │
//! │                            │                                 │
//! │                      ┌─────▼─────┐                           │
//! │                      │   Tool    │ (trait)                   │
//! │                      └─────┬─────┘                           │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!         ┌──────▼──────┐             ┌──────▼──────┐
//!         │ SoftnasCmd  │             │  MockTool   │
//!         │ (process)   │             │ (Testing)   │
//!         └─────────────┘             └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use softnas::collector::{Collector, Credentials, SoftnasCmd, ToolConfig};
//!
//! let tool = SoftnasCmd::new(ToolConfig::default());
//! let collector = Collector::login(tool, &Credentials::new("softnas", "secret")).unwrap();
//! let poll = collector.collect_all().unwrap();
//! ```
//!
//! ## Testing (with MockTool)
//!
//! ```
//! use softnas::collector::{Collector, Credentials, MockTool};
//!
//! let tool = MockTool::typical_appliance();
//! let collector = Collector::login(tool, &Credentials::new("softnas", "secret")).unwrap();
//! let poll = collector.collect_all().unwrap();
//! assert!(!poll.metrics.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
mod overview;
mod perfmon;
mod pools;
mod session;
pub mod traits;

pub use collector::{Collector, CollectorTiming, Poll};
pub use mock::MockTool;
pub use overview::overview_metrics;
pub use perfmon::perfmon_metrics;
pub use pools::{is_pool_name, pool_io_metrics, pool_names};
pub use session::{Credentials, resolve_session};
pub use traits::{Request, SessionId, SoftnasCmd, Tool, ToolConfig};
