//! In-memory mock of `softnas-cmd`.
//!
//! `MockTool` answers requests from a table of canned outputs, so
//! collectors can be tested without spawning processes.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::collector::traits::{Request, Tool};
use crate::error::PluginError;

#[derive(Debug, Clone)]
enum Answer {
    Output(String),
    Failure(String),
}

/// In-memory `softnas-cmd` for testing.
///
/// Answers are keyed by action name and, for pool-scoped requests, by pool
/// name. Every request is recorded so tests can check what was invoked.
#[derive(Debug, Default)]
pub struct MockTool {
    answers: HashMap<(String, Option<String>), Answer>,
    calls: Mutex<Vec<String>>,
}

impl MockTool {
    /// Creates a mock with no canned answers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output printed for `action`.
    pub fn add_output(&mut self, action: &str, body: impl Into<String>) {
        self.answers
            .insert((action.to_string(), None), Answer::Output(body.into()));
    }

    /// Sets the output printed for `pooldetails <pool>`.
    pub fn add_pool_output(&mut self, pool: &str, body: impl Into<String>) {
        self.answers.insert(
            ("pooldetails".to_string(), Some(pool.to_string())),
            Answer::Output(body.into()),
        );
    }

    /// Makes `action` fail as if `softnas-cmd` exited non-zero.
    pub fn add_failure(&mut self, action: &str, message: impl Into<String>) {
        self.answers
            .insert((action.to_string(), None), Answer::Failure(message.into()));
    }

    /// Makes `pooldetails <pool>` fail as if `softnas-cmd` exited non-zero.
    pub fn add_pool_failure(&mut self, pool: &str, message: impl Into<String>) {
        self.answers.insert(
            ("pooldetails".to_string(), Some(pool.to_string())),
            Answer::Failure(message.into()),
        );
    }

    /// Returns the argument lists of all requests received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Tool for MockTool {
    fn invoke(&self, request: &Request<'_>) -> Result<String, PluginError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.args().join(" "));
        }

        let key = (
            request.action().to_string(),
            request.pool().map(str::to_string),
        );
        match self.answers.get(&key) {
            Some(Answer::Output(body)) => Ok(body.clone()),
            Some(Answer::Failure(message)) => Err(PluginError::Invocation {
                action: request.action().to_string(),
                message: message.clone(),
            }),
            None => Err(PluginError::Invocation {
                action: request.action().to_string(),
                message: "exit status: 1".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::SessionId;

    #[test]
    fn test_mock_tool_answers_by_action_and_pool() {
        let mut tool = MockTool::new();
        tool.add_output("overview", "{}");
        tool.add_pool_output("pool1", "[]");

        let session = SessionId(1);
        assert_eq!(tool.invoke(&Request::Overview { session }).unwrap(), "{}");
        assert_eq!(
            tool.invoke(&Request::PoolDetails {
                session,
                pool: Some("pool1")
            })
            .unwrap(),
            "[]"
        );
        assert!(
            tool.invoke(&Request::PoolDetails {
                session,
                pool: None
            })
            .is_err()
        );
        assert_eq!(tool.calls().len(), 3);
    }

    #[test]
    fn test_mock_tool_failure() {
        let mut tool = MockTool::new();
        tool.add_failure("perfmon", "connection refused");

        let err = tool
            .invoke(&Request::Perfmon {
                session: SessionId(1),
            })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "softnas-cmd perfmon failed: connection refused"
        );
    }
}
