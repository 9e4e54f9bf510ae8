//! api-dispatch: declarative API calls for Redux-style Rust stores
//!
//! Describe "fetch data and update state" as a single action value. The
//! [`ApiMiddleware`] forwards the action, performs the HTTP call it carries on
//! a detached task, and dispatches exactly one follow-up action built from the
//! response or the failure.
//!
//! # Example
//! ```ignore
//! use api_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(api)]
//!     TodosFetch(ApiCall<AppAction>),
//!     TodosDidLoad(serde_json::Value),
//!     TodosDidError(ApiError),
//! }
//!
//! let fetch = AppAction::TodosFetch(
//!     ApiCall::builder(AppAction::TodosDidLoad, AppAction::TodosDidError)
//!         .url("/todos")
//!         .build(),
//! );
//! ```

// Re-export everything from core
pub use api_dispatch_core::*;

// Re-export derive macros
pub use api_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use api_dispatch_core::{Action, ApiCarrier, Dispatch, Transport};

    // Descriptors and errors
    pub use api_dispatch_core::{ApiCall, ApiError, ApiResponse, Method};

    // Middleware and transport
    pub use api_dispatch_core::{ApiMiddleware, HttpConfig, HttpTransport};

    // Standard actions
    pub use api_dispatch_core::{api_action, api_error, api_error_with, StandardAction};

    // Store
    pub use api_dispatch_core::{
        ComposedMiddleware, LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store,
        StoreWithMiddleware,
    };

    // Derive macros
    pub use api_dispatch_macros::Action;
}
