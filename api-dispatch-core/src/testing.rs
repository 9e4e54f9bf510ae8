//! Test utilities for api-dispatch applications
//!
//! - [`TestHarness`]: state plus an action channel for capturing dispatched actions
//! - [`StubTransport`]: scripted [`Transport`] that records every request
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use api_dispatch::testing::{StubTransport, TestHarness};
//! use api_dispatch::{api_action, api_error, ApiMiddleware, ApiResponse};
//!
//! let mut harness = TestHarness::<(), StandardAction>::new(());
//! let transport = StubTransport::new().reply("/todos", Ok(ApiResponse::ok(json!([]))));
//! let middleware = ApiMiddleware::new(Arc::new(transport), harness.sender());
//!
//! middleware.intercept(api_action(api_error).url("/todos").build(), |a| harness.emit(a));
//!
//! let original = harness.recv_timeout(Duration::from_secs(1)).await;
//! let derived = harness.recv_timeout(Duration::from_secs(1)).await;
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::api::{ApiRequest, ApiResponse};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::Action;

/// Generic test harness for api-dispatch applications.
///
/// Provides:
/// - State management with a simple `state` field
/// - Action channel for capturing emitted and derived actions
/// - Helpers for draining and awaiting actions
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type (must implement [`Action`])
pub struct TestHarness<S, A: Action> {
    /// The application state under test
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    /// Create a new test harness with the given initial state.
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Get a clone of the action sender, usable as a dispatch capability.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Emit an action (simulates a forwarding pipeline stage).
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Drain all actions already in the channel.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Check if any actions were emitted.
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }

    /// Wait for the next action, giving up after `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<A> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[derive(Debug, Clone)]
struct StubReply {
    delay: Option<Duration>,
    result: Result<ApiResponse, ApiError>,
}

/// A [`Transport`] with canned replies keyed by request URL.
///
/// Requests for a URL without a reply fail with [`ApiError::Transport`].
/// Every request is recorded, in arrival order.
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: HashMap<String, StubReply>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    /// A stub with no replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `url` with `result`.
    pub fn reply(mut self, url: impl Into<String>, result: Result<ApiResponse, ApiError>) -> Self {
        self.replies.insert(
            url.into(),
            StubReply {
                delay: None,
                result,
            },
        );
        self
    }

    /// Answer requests for `url` with `result` after `delay`.
    pub fn reply_after(
        mut self,
        url: impl Into<String>,
        delay: Duration,
        result: Result<ApiResponse, ApiError>,
    ) -> Self {
        self.replies.insert(
            url.into(),
            StubReply {
                delay: Some(delay),
                result,
            },
        );
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.recorded().clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Vec<ApiRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let reply = self.replies.get(&request.url).cloned();
        let url = request.url.clone();
        self.recorded().push(request);

        let Some(reply) = reply else {
            return Err(ApiError::transport(format!("no stub reply for {url:?}")));
        };
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        reply.result
    }
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, AppAction::UsersDidLoad(_));
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
///
/// # Example
///
/// ```ignore
/// let actions = harness.drain_emitted();
/// assert_not_emitted!(actions, AppAction::UsersDidError(_));
/// ```
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
