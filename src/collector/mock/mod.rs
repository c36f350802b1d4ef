//! Mock `softnas-cmd` implementations for testing.
//!
//! This module provides `MockTool` and pre-built appliance scenarios for
//! testing collectors without a real SoftNAS appliance.

mod scenarios;
mod tool;

pub use tool::MockTool;
