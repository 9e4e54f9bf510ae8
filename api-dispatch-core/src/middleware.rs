//! API middleware: intercepts actions that carry an [`ApiCall`]
//!
//! The middleware never blocks and never fails. Every action is forwarded
//! first; only afterwards is the embedded descriptor (if any) handed to the
//! executor on a detached task. Derived actions come back through the
//! injected [`Dispatch`] capability, so they always arrive after the action
//! that requested them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use api_dispatch::{ApiMiddleware, HttpConfig, HttpTransport, StoreWithMiddleware};
//! use tokio::sync::mpsc;
//!
//! let (action_tx, mut action_rx) = mpsc::unbounded_channel();
//! let transport = Arc::new(HttpTransport::new(HttpConfig::new().with_base_url(base))?);
//! let middleware = ApiMiddleware::new(transport, action_tx);
//! let mut store = StoreWithMiddleware::new(AppState::default(), reducer, middleware);
//!
//! store.dispatch(AppAction::UsersFetch(call));
//! while let Some(derived) = action_rx.recv().await {
//!     store.dispatch(derived);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::action::ApiCarrier;
use crate::api::ApiCall;
use crate::dispatch::Dispatch;
use crate::executor::spawn_api_call;
use crate::store::Middleware;
use crate::transport::Transport;

/// Middleware that performs the network calls embedded in actions.
///
/// Holds the transport and the dispatch capability it was constructed with;
/// there is no global store and no other state.
pub struct ApiMiddleware<T: ?Sized, D> {
    transport: Arc<T>,
    dispatch: D,
}

impl<T, D> ApiMiddleware<T, D>
where
    T: Transport + ?Sized,
{
    /// Create a middleware that sends requests through `transport` and
    /// submits derived actions to `dispatch`.
    pub fn new(transport: Arc<T>, dispatch: D) -> Self {
        Self {
            transport,
            dispatch,
        }
    }

    /// The transport used for every call
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// The capability derived actions are dispatched through
    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }

    /// Forward `action` to `next`, then start its network call if it carries one.
    ///
    /// `next` runs synchronously before any network activity begins, so
    /// everything downstream sees the original action before its derived
    /// action. The call itself is not awaited.
    pub fn intercept<A, N>(&self, action: A, next: N)
    where
        A: ApiCarrier,
        D: Dispatch<A> + Clone,
        N: FnOnce(A),
    {
        let call = action.api_call().cloned();
        next(action);
        if let Some(call) = call {
            self.launch(call);
        }
    }

    fn launch<A>(&self, call: ApiCall<A>)
    where
        A: ApiCarrier,
        D: Dispatch<A> + Clone,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::warn!(url = %call.url(), "no tokio runtime, api call skipped");
            return;
        }
        // Detached: the handle is dropped, the call runs to completion
        let _ = spawn_api_call(call, Arc::clone(&self.transport), self.dispatch.clone());
    }
}

impl<T: ?Sized, D: Clone> Clone for ApiMiddleware<T, D> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<T: ?Sized, D> fmt::Debug for ApiMiddleware<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiMiddleware").finish_non_exhaustive()
    }
}

/// Inside a store the reducer is the "next" stage: `after` runs once the
/// action has been reduced, and only then is the call started.
impl<A, T, D> Middleware<A> for ApiMiddleware<T, D>
where
    A: ApiCarrier,
    T: Transport + ?Sized,
    D: Dispatch<A> + Clone,
{
    fn before(&mut self, _action: &A) {}

    fn after(&mut self, action: &A, _state_changed: bool) {
        if let Some(call) = action.api_call() {
            self.launch(call.clone());
        }
    }
}
