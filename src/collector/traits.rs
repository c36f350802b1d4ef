//! Abstraction over the `softnas-cmd` management tool.
//!
//! The `Tool` trait lets collectors run against the real command-line tool
//! or against an in-memory mock for testing.

use std::fmt;
use std::io::Read;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::PluginError;

/// Opaque session handle returned by `softnas-cmd login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One `softnas-cmd` action with its action-specific arguments.
///
/// `--base_url` is not part of the request; it is supplied by the tool.
#[derive(Clone, Copy)]
pub enum Request<'a> {
    Login { user: &'a str, password: &'a str },
    Overview { session: SessionId },
    Perfmon { session: SessionId },
    /// Lists every pool when `pool` is `None`, otherwise scopes to one pool.
    PoolDetails {
        session: SessionId,
        pool: Option<&'a str>,
    },
}

impl<'a> Request<'a> {
    /// Returns the action name passed as first argument.
    pub fn action(&self) -> &'static str {
        match self {
            Request::Login { .. } => "login",
            Request::Overview { .. } => "overview",
            Request::Perfmon { .. } => "perfmon",
            Request::PoolDetails { .. } => "pooldetails",
        }
    }

    /// Returns the pool a request is scoped to.
    pub fn pool(&self) -> Option<&'a str> {
        match self {
            Request::PoolDetails { pool, .. } => *pool,
            _ => None,
        }
    }

    /// Builds the argument list, without `--base_url`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.action().to_string()];
        match self {
            Request::Login { user, password } => {
                args.push(user.to_string());
                args.push(password.to_string());
            }
            Request::Overview { session } | Request::Perfmon { session } => {
                args.push("--session_id".to_string());
                args.push(session.to_string());
            }
            Request::PoolDetails { session, pool } => {
                if let Some(pool) = pool {
                    args.push(pool.to_string());
                }
                args.push("--session_id".to_string());
                args.push(session.to_string());
            }
        }
        args
    }
}

// Credentials never reach logs through `{:?}`.
impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Login { user, .. } => write!(f, "login user={}", user),
            Request::PoolDetails {
                session,
                pool: Some(pool),
            } => write!(f, "pooldetails {} session={}", pool, session),
            Request::Overview { session }
            | Request::Perfmon { session }
            | Request::PoolDetails { session, .. } => {
                write!(f, "{} session={}", self.action(), session)
            }
        }
    }
}

/// Runs `softnas-cmd` actions.
///
/// Implementations return the raw standard output of a successful run.
/// A run that could not start, exited non-zero or exceeded its deadline is
/// an error.
pub trait Tool: Send + Sync {
    fn invoke(&self, request: &Request<'_>) -> Result<String, PluginError>;
}

impl<T: Tool + ?Sized> Tool for &T {
    fn invoke(&self, request: &Request<'_>) -> Result<String, PluginError> {
        (**self).invoke(request)
    }
}

/// How to reach `softnas-cmd`.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Path of the `softnas-cmd` executable.
    pub command: PathBuf,
    /// Value passed as `--base_url`.
    pub base_url: String,
    /// Hard limit for a single invocation.
    pub timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from(SoftnasCmd::DEFAULT_COMMAND),
            base_url: SoftnasCmd::DEFAULT_BASE_URL.to_string(),
            timeout: SoftnasCmd::DEFAULT_TIMEOUT,
        }
    }
}

/// Real `softnas-cmd` subprocess runner.
#[derive(Debug, Clone)]
pub struct SoftnasCmd {
    config: ToolConfig,
}

impl SoftnasCmd {
    pub const DEFAULT_COMMAND: &'static str = "/usr/local/bin/softnas-cmd";
    pub const DEFAULT_BASE_URL: &'static str = "https://localhost/softnas";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    const POLL_INTERVAL: Duration = Duration::from_millis(10);

    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Reads `pipe` to its end on a helper thread and sends the bytes on `tx`.
    fn read_pipe<R: Read + Send + 'static>(
        pipe: Option<R>,
        stream: Stream,
        tx: Sender<(Stream, Vec<u8>)>,
    ) {
        let Some(mut pipe) = pipe else {
            let _ = tx.send((stream, Vec::new()));
            return;
        };
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send((stream, buf));
        });
    }

    /// Kills the child and every process it started, then reaps the child.
    fn kill(child: &mut Child) {
        #[cfg(unix)]
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: the child was spawned as leader of its own process group,
            // so `-pgid` only addresses processes started for this invocation.
            unsafe { libc::kill(-pgid, libc::SIGKILL) };
        }
        let _ = child.kill();
        let _ = child.wait();
    }

    fn timeout_error(&self, action: &str) -> PluginError {
        PluginError::Timeout {
            action: action.to_string(),
            after: self.config.timeout,
        }
    }
}

/// Output stream of the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Tool for SoftnasCmd {
    fn invoke(&self, request: &Request<'_>) -> Result<String, PluginError> {
        let action = request.action();
        let invocation_error = |message: String| PluginError::Invocation {
            action: action.to_string(),
            message,
        };

        let mut cmd = Command::new(&self.config.command);
        cmd.args(request.args())
            .arg("--base_url")
            .arg(&self.config.base_url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        cmd.process_group(0);

        debug!("Running {} {:?}", self.config.command.display(), request);
        let start = Instant::now();
        let deadline = start + self.config.timeout;

        let mut child = cmd
            .spawn()
            .map_err(|e| invocation_error(format!("{}: {}", self.config.command.display(), e)))?;
        let (tx, rx) = mpsc::channel();
        Self::read_pipe(child.stdout.take(), Stream::Stdout, tx.clone());
        Self::read_pipe(child.stderr.take(), Stream::Stderr, tx);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    Self::kill(&mut child);
                    return Err(invocation_error(e.to_string()));
                }
            }

            if Instant::now() >= deadline {
                Self::kill(&mut child);
                return Err(self.timeout_error(action));
            }

            thread::sleep(Self::POLL_INTERVAL);
        };

        // Processes left behind by the child may still hold the pipes open.
        let mut stdout = None;
        let mut stderr = None;
        while stdout.is_none() || stderr.is_none() {
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok((Stream::Stdout, buf)) => stdout = Some(buf),
                Ok((Stream::Stderr, buf)) => stderr = Some(buf),
                Err(RecvTimeoutError::Timeout) => {
                    Self::kill(&mut child);
                    return Err(self.timeout_error(action));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();
        debug!("{} finished in {:?} ({})", action, start.elapsed(), status);

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let stderr = stderr.trim();
            return Err(invocation_error(if stderr.is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, stderr)
            }));
        }

        let body = String::from_utf8(stdout)
            .map_err(|e| invocation_error(format!("output is not UTF-8: {}", e)))?;
        trace!("{} output: {}", action, body);
        Ok(body)
    }
}
