//! Centralized state store with reducer pattern
//!
//! This is the host pipeline the API middleware plugs into: actions go through
//! `Middleware::before`, the reducer, then `Middleware::after`. Derived actions
//! produced by network calls come back over a channel and are fed in again with
//! [`StoreWithMiddleware::dispatch_pending`] or a plain `dispatch`.

use std::marker::PhantomData;

use tokio::sync::mpsc;

use crate::Action;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Centralized state store with Redux-like reducer pattern
///
/// # Example
/// ```ignore
/// #[derive(Default)]
/// struct AppState {
///     users: Option<serde_json::Value>,
///     loading: bool,
/// }
///
/// fn reducer(state: &mut AppState, action: AppAction) -> bool {
///     match action {
///         AppAction::UsersFetch(_) => {
///             state.loading = true;
///             true
///         }
///         AppAction::UsersDidLoad(users) => {
///             state.loading = false;
///             state.users = Some(users);
///             true
///         }
///         AppAction::UsersDidError(_) => {
///             state.loading = false;
///             true
///         }
///     }
/// }
///
/// let mut store = Store::new(AppState::default(), reducer);
/// store.dispatch(AppAction::UsersDidLoad(json!([])));
/// assert!(store.state().users.is_some());
/// ```
pub struct Store<S, A: Action> {
    state: S,
    reducer: Reducer<S, A>,
    _marker: PhantomData<A>,
}

impl<S, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            state,
            reducer,
            _marker: PhantomData,
        }
    }

    /// Run the reducer on `action`. Returns `true` if the state changed.
    pub fn dispatch(&mut self, action: A) -> bool {
        (self.reducer)(&mut self.state, action)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Prefer dispatching actions; this is meant for initialization.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }
}

/// Store with middleware support
///
/// Wraps a `Store` and lets middleware observe every action before and
/// after the reducer runs.
pub struct StoreWithMiddleware<S, A: Action, M: Middleware<A>> {
    store: Store<S, A>,
    middleware: M,
}

impl<S, A: Action, M: Middleware<A>> StoreWithMiddleware<S, A, M> {
    /// Create a new store with middleware
    pub fn new(state: S, reducer: Reducer<S, A>, middleware: M) -> Self {
        Self {
            store: Store::new(state, reducer),
            middleware,
        }
    }

    /// Dispatch an action through middleware and store
    pub fn dispatch(&mut self, action: A) -> bool {
        self.middleware.before(&action);
        let changed = self.store.dispatch(action.clone());
        self.middleware.after(&action, changed);
        changed
    }

    /// Dispatch every action already waiting on `rx` without blocking.
    ///
    /// Returns `true` if any of them changed the state.
    pub fn dispatch_pending(&mut self, rx: &mut mpsc::UnboundedReceiver<A>) -> bool {
        let mut changed = false;
        while let Ok(action) = rx.try_recv() {
            changed |= self.dispatch(action);
        }
        changed
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Get a mutable reference to the state
    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

/// Middleware trait for intercepting actions
///
/// `before` sees the action on its way to the reducer, `after` once the
/// reducer has handled it. [`ApiMiddleware`](crate::ApiMiddleware) starts its
/// network calls from `after`.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _action: &A) {}
    fn after(&mut self, _action: &A, _state_changed: bool) {}
}

/// Middleware that logs actions through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
    /// Action names that are never logged
    pub ignore: Vec<String>,
}

impl LoggingMiddleware {
    /// Log after dispatch only
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
            ignore: Vec::new(),
        }
    }

    /// Log both before and after dispatch
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            ..Self::new()
        }
    }

    /// Skip actions with the given name.
    pub fn ignoring(mut self, name: impl Into<String>) -> Self {
        self.ignore.push(name.into());
        self
    }

    /// Whether an action with this name is logged
    pub fn should_log(&self, name: &str) -> bool {
        !self.ignore.iter().any(|ignored| ignored == name)
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before && self.should_log(action.name()) {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after && self.should_log(action.name()) {
            tracing::debug!(
                action = %action.name(),
                state_changed = state_changed,
                "Action processed"
            );
        }
    }
}

/// Compose multiple middleware into a single middleware
pub struct ComposedMiddleware<A: Action> {
    middlewares: Vec<Box<dyn Middleware<A>>>,
}

impl<A: Action> std::fmt::Debug for ComposedMiddleware<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedMiddleware")
            .field("middlewares_count", &self.middlewares.len())
            .finish()
    }
}

impl<A: Action> Default for ComposedMiddleware<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ComposedMiddleware<A> {
    /// Create a new composed middleware
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the composition
    pub fn add<M: Middleware<A> + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Builder-style [`add`](Self::add)
    pub fn with<M: Middleware<A> + 'static>(mut self, middleware: M) -> Self {
        self.add(middleware);
        self
    }

    /// Number of composed middleware
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Whether nothing has been composed yet
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Action> Middleware<A> for ComposedMiddleware<A> {
    fn before(&mut self, action: &A) {
        for middleware in &mut self.middlewares {
            middleware.before(action);
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        // Reverse order for proper nesting
        for middleware in self.middlewares.iter_mut().rev() {
            middleware.after(action, state_changed);
        }
    }
}
