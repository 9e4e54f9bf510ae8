//! Network-call descriptors
//!
//! An [`ApiCall`] is the declarative description of one pending HTTP call,
//! embedded in an action. It carries the request parts plus two translation
//! callbacks that turn the outcome into the next action to dispatch.
//!
//! # Example
//!
//! ```ignore
//! use api_dispatch::{Action, ApiCall, ApiError, Method};
//! use serde_json::Value;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(api)]
//!     UsersFetch(ApiCall<AppAction>),
//!     UsersDidLoad(Value),
//!     UsersDidError(ApiError),
//! }
//!
//! let fetch = AppAction::UsersFetch(
//!     ApiCall::builder(AppAction::UsersDidLoad, AppAction::UsersDidError)
//!         .url("/users")
//!         .method(Method::GET)
//!         .header("Accept", "application/json")
//!         .build(),
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;

/// Header every request starts with, before caller headers are merged in
pub const CONTENT_TYPE: &str = "Content-Type";
/// Baseline value of [`CONTENT_TYPE`]
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Maps a successful response body to the action to dispatch
pub type SuccessFn<A> = Arc<dyn Fn(Value) -> A + Send + Sync>;
/// Maps a failure to the action to dispatch
pub type FailureFn<A> = Arc<dyn Fn(ApiError) -> A + Send + Sync>;

/// Descriptor of one pending network call.
///
/// Immutable once built: fields are only reachable through accessors, and
/// the executor consumes a clone (callbacks are shared through `Arc`).
pub struct ApiCall<A> {
    url: String,
    method: Option<Method>,
    headers: BTreeMap<String, String>,
    data: Option<Value>,
    on_success: SuccessFn<A>,
    on_failure: FailureFn<A>,
}

impl<A> ApiCall<A> {
    /// Start building a descriptor.
    ///
    /// Both translation callbacks are required: there is no call without a
    /// way to report its outcome.
    pub fn builder<S, F>(on_success: S, on_failure: F) -> ApiCallBuilder<A>
    where
        S: Fn(Value) -> A + Send + Sync + 'static,
        F: Fn(ApiError) -> A + Send + Sync + 'static,
    {
        ApiCallBuilder {
            url: String::new(),
            method: None,
            headers: BTreeMap::new(),
            data: None,
            on_success: Arc::new(on_success),
            on_failure: Arc::new(on_failure),
        }
    }

    /// Target endpoint; may be relative to the transport's base URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// HTTP verb, `None` for the transport default
    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Caller-supplied headers, before merging with the baseline
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Request body
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Headers the request is actually sent with: the baseline
    /// `Content-Type: application/json` with caller entries laid over it.
    pub fn merged_headers(&self) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        merged.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        merge_headers(&mut merged, &self.headers);
        merged
    }

    /// Build the request handed to the transport.
    pub fn request(&self) -> ApiRequest {
        ApiRequest {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.merged_headers(),
            data: self.data.clone(),
        }
    }

    /// Translate a successful response body into the derived action.
    pub fn succeed(&self, body: Value) -> A {
        (self.on_success)(body)
    }

    /// Translate a failure into the derived action.
    pub fn fail(&self, error: ApiError) -> A {
        (self.on_failure)(error)
    }
}

/// Lay `overrides` over `base`. Header names compare case-insensitively and
/// the overriding entry keeps its own spelling.
pub fn merge_headers(base: &mut BTreeMap<String, String>, overrides: &BTreeMap<String, String>) {
    for (name, value) in overrides {
        base.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        base.insert(name.clone(), value.clone());
    }
}

impl<A> Clone for ApiCall<A> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            data: self.data.clone(),
            on_success: Arc::clone(&self.on_success),
            on_failure: Arc::clone(&self.on_failure),
        }
    }
}

impl<A> fmt::Debug for ApiCall<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCall")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// Two descriptors are equal when their request parts match and they share
/// the same callbacks (clones of one descriptor compare equal).
impl<A> PartialEq for ApiCall<A> {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
            && self.method == other.method
            && self.headers == other.headers
            && self.data == other.data
            && Arc::ptr_eq(&self.on_success, &other.on_success)
            && Arc::ptr_eq(&self.on_failure, &other.on_failure)
    }
}

/// Builder for [`ApiCall`]
pub struct ApiCallBuilder<A> {
    url: String,
    method: Option<Method>,
    headers: BTreeMap<String, String>,
    data: Option<Value>,
    on_success: SuccessFn<A>,
    on_failure: FailureFn<A>,
}

impl<A> ApiCallBuilder<A> {
    /// Set the target endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the HTTP verb.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Add one header, replacing an earlier entry with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut single = BTreeMap::new();
        single.insert(name.into(), value.into());
        merge_headers(&mut self.headers, &single);
        self
    }

    /// Add several headers in order. A later entry replaces an earlier one
    /// with the same name, whatever its case.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |builder, (name, value)| builder.header(name, value))
    }

    /// Set the request body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Replace the success translation.
    pub fn on_success<S>(mut self, on_success: S) -> Self
    where
        S: Fn(Value) -> A + Send + Sync + 'static,
    {
        self.on_success = Arc::new(on_success);
        self
    }

    /// Replace the failure translation.
    pub fn on_failure<F>(mut self, on_failure: F) -> Self
    where
        F: Fn(ApiError) -> A + Send + Sync + 'static,
    {
        self.on_failure = Arc::new(on_failure);
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> ApiCall<A> {
        ApiCall {
            url: self.url,
            method: self.method,
            headers: self.headers,
            data: self.data,
            on_success: self.on_success,
            on_failure: self.on_failure,
        }
    }
}

impl<A> fmt::Debug for ApiCallBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCallBuilder")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// A request as handed to a [`Transport`](crate::Transport)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub url: String,
    pub method: Option<Method>,
    pub headers: BTreeMap<String, String>,
    pub data: Option<Value>,
}

impl ApiRequest {
    /// The verb to send, falling back to `GET`.
    pub fn method_or_default(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }
}

/// A successful response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub data: Value,
}

impl ApiResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }
}
