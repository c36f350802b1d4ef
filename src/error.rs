//! Error type shared by every stage of a poll cycle.

use std::time::Duration;

use crate::units::SizeParseError;

/// Error type for poll cycle failures.
///
/// Any variant aborts the whole cycle; partial metrics are discarded.
#[derive(Debug)]
pub enum PluginError {
    /// `softnas-cmd` could not be run or exited with a non-zero status.
    Invocation { action: String, message: String },
    /// `softnas-cmd` did not finish within the configured timeout.
    Timeout { action: String, after: Duration },
    /// Output was not the expected JSON envelope.
    Response { action: String, message: String },
    /// The envelope reported `success: false`.
    Rejected { action: String, message: String },
    /// A size token could not be converted to bytes.
    Size {
        field: String,
        source: SizeParseError,
    },
    /// A numeric field could not be parsed.
    Parse { field: String, message: String },
    /// Records did not have the shape a collector relies on.
    Structural { action: String, message: String },
}

impl PluginError {
    /// Returns the `softnas-cmd` action or metric field the error is about.
    pub fn context(&self) -> &str {
        match self {
            PluginError::Invocation { action, .. }
            | PluginError::Timeout { action, .. }
            | PluginError::Response { action, .. }
            | PluginError::Rejected { action, .. }
            | PluginError::Structural { action, .. } => action,
            PluginError::Size { field, .. } | PluginError::Parse { field, .. } => field,
        }
    }

    /// Returns `true` for errors raised while parsing a value.
    pub fn is_parse(&self) -> bool {
        matches!(self, PluginError::Size { .. } | PluginError::Parse { .. })
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginError::Invocation { action, message } => {
                write!(f, "softnas-cmd {} failed: {}", action, message)
            }
            PluginError::Timeout { action, after } => {
                write!(f, "softnas-cmd {} timed out after {:?}", action, after)
            }
            PluginError::Response { action, message } => {
                write!(f, "invalid {} response: {}", action, message)
            }
            PluginError::Rejected { action, message } => {
                if message.is_empty() {
                    write!(f, "softnas-cmd {} reported failure", action)
                } else {
                    write!(f, "softnas-cmd {} reported failure: {}", action, message)
                }
            }
            PluginError::Size { field, source } => write!(f, "{}: {}", field, source),
            PluginError::Parse { field, message } => {
                write!(f, "parse error in {}: {}", field, message)
            }
            PluginError::Structural { action, message } => {
                write!(f, "unexpected {} records: {}", action, message)
            }
        }
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PluginError::Size { source, .. } => Some(source),
            _ => None,
        }
    }
}
