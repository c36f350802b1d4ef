//! Login: exchanges credentials for a `softnas-cmd` session id.

use std::fmt;

use serde::de::IgnoredAny;
use tracing::debug;

use crate::collector::traits::{Request, SessionId, Tool};
use crate::error::PluginError;
use crate::response::decode;

/// User name and password for `softnas-cmd login`.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Logs in and returns the session id to pass to every later action.
///
/// A login answer without `session_id` is an error rather than session `0`.
pub fn resolve_session<T: Tool>(
    tool: &T,
    credentials: &Credentials,
) -> Result<SessionId, PluginError> {
    let request = Request::Login {
        user: &credentials.user,
        password: &credentials.password,
    };
    let body = tool.invoke(&request)?;

    let envelope = decode::<IgnoredAny>(request.action(), &body)?;
    let session = envelope
        .session_id
        .map(SessionId)
        .ok_or_else(|| PluginError::Response {
            action: request.action().to_string(),
            message: "missing session_id".to_string(),
        })?;

    debug!("Logged in as {} (session {})", credentials.user, session);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockTool;

    fn credentials() -> Credentials {
        Credentials::new("softnas", "Pass4W0rd")
    }

    #[test]
    fn test_resolve_session() {
        let tool = MockTool::typical_appliance();
        assert_eq!(
            resolve_session(&tool, &credentials()).unwrap(),
            SessionId(12345)
        );
        assert_eq!(tool.calls(), vec!["login softnas Pass4W0rd".to_string()]);
    }

    #[test]
    fn test_resolve_session_malformed_output() {
        let mut tool = MockTool::new();
        tool.add_output("login", "Login failed: bad password");

        let err = resolve_session(&tool, &credentials()).unwrap_err();
        assert!(matches!(err, PluginError::Response { .. }));
    }

    #[test]
    fn test_resolve_session_missing_id() {
        let mut tool = MockTool::new();
        tool.add_output("login", r#"{"success": true, "result": {}}"#);

        let err = resolve_session(&tool, &credentials()).unwrap_err();
        assert_eq!(err.to_string(), "invalid login response: missing session_id");
    }

    #[test]
    fn test_resolve_session_rejected() {
        let mut tool = MockTool::new();
        tool.add_output("login", r#"{"success": false, "session_id": 0}"#);

        let err = resolve_session(&tool, &credentials()).unwrap_err();
        assert!(matches!(err, PluginError::Rejected { .. }));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let shown = format!("{:?}", credentials());
        assert!(!shown.contains("Pass4W0rd"));
    }
}
