//! Core traits and types for api-dispatch
//!
//! This crate provides a middleware for Redux-style stores that turns actions
//! carrying a declarative network-call descriptor into HTTP calls, and the
//! outcome of each call into one follow-up action.
//!
//! # Core Concepts
//!
//! - **Action**: Events that describe state changes
//! - **ApiCall**: Descriptor of a pending call (url, method, headers, body)
//!   plus the `on_success`/`on_failure` translations
//! - **ApiMiddleware**: Forwards every action, then runs embedded calls on
//!   detached tasks
//! - **Transport**: Performs the request; [`HttpTransport`] is the reqwest one
//! - **Store**: Centralized state container with reducer pattern
//!
//! # Basic Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use api_dispatch::prelude::*;
//! use tokio::sync::mpsc;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(api)]
//!     UsersFetch(ApiCall<AppAction>),
//!     UsersDidLoad(serde_json::Value),
//!     UsersDidError(ApiError),
//! }
//!
//! let (action_tx, mut action_rx) = mpsc::unbounded_channel();
//! let transport = Arc::new(HttpTransport::new(HttpConfig::new().with_base_url(base))?);
//! let mut store = StoreWithMiddleware::new(
//!     AppState::default(),
//!     reducer,
//!     ApiMiddleware::new(transport, action_tx),
//! );
//!
//! store.dispatch(AppAction::UsersFetch(
//!     ApiCall::builder(AppAction::UsersDidLoad, AppAction::UsersDidError)
//!         .url("/users")
//!         .build(),
//! ));
//!
//! // The derived action arrives once the call completes
//! if let Some(derived) = action_rx.recv().await {
//!     store.dispatch(derived);
//! }
//! ```
//!
//! # String-typed actions
//!
//! Apps without an action enum can use [`StandardAction`] with the
//! [`api_action`] and [`api_error`] helpers:
//!
//! ```ignore
//! let fetch = api_action(api_error)
//!     .url("/users")
//!     .on_success(|users| StandardAction::plain("USERS_LOADED", users))
//!     .build();
//! ```

pub mod action;
pub mod api;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod middleware;
pub mod standard;
pub mod store;
pub mod testing;
pub mod transport;

// Core trait exports
pub use action::{Action, ApiCarrier};

// Descriptor exports
pub use api::{
    merge_headers, ApiCall, ApiCallBuilder, ApiRequest, ApiResponse, FailureFn, Method, SuccessFn,
    CONTENT_TYPE, JSON_CONTENT_TYPE,
};
pub use error::ApiError;

// Execution exports
pub use dispatch::Dispatch;
pub use executor::{perform_api_call, spawn_api_call};
pub use middleware::ApiMiddleware;
pub use transport::{HttpConfig, HttpTransport, Transport};

// Store exports
pub use store::{
    ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store,
    StoreWithMiddleware,
};

// Standard action exports
pub use standard::{
    api_action, api_error, api_error_with, default_on_success, ApiActionBuilder, StandardAction,
    API, API_ERROR, SUCCESS,
};

// Testing exports
pub use testing::{StubTransport, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ApiCarrier};
    pub use crate::api::{ApiCall, ApiResponse, Method};
    pub use crate::dispatch::Dispatch;
    pub use crate::error::ApiError;
    pub use crate::middleware::ApiMiddleware;
    pub use crate::standard::{api_action, api_error, api_error_with, StandardAction};
    pub use crate::store::{
        ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store,
        StoreWithMiddleware,
    };
    pub use crate::transport::{HttpConfig, HttpTransport, Transport};
}
