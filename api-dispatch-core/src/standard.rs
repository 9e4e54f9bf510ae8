//! String-typed actions and the convenience helpers built on them
//!
//! [`StandardAction`] is the `{ type, payload }` record shape for apps that do
//! not want a dedicated action enum. [`api_action`] builds one that carries a
//! network call; [`api_error`] builds the conventional failure action.
//!
//! ```ignore
//! use api_dispatch::{api_action, api_error, StandardAction};
//! use serde_json::json;
//!
//! let fetch = api_action(api_error)
//!     .url("/todos")
//!     .payload(json!({ "page": 1 }))
//!     .on_success(|todos| StandardAction::plain("TODOS_LOADED", todos))
//!     .build();
//! ```

use serde_json::{Map, Value};

use crate::action::{Action, ApiCarrier};
use crate::api::{ApiCall, ApiCallBuilder, Method};
use crate::error::ApiError;

/// Default `type` of actions built by [`api_action`]
pub const API: &str = "API";
/// `type` of the default success action
pub const SUCCESS: &str = "SUCCESS";
/// `type` of the action built by [`api_error`]
pub const API_ERROR: &str = "API_ERROR";

/// An action identified by a string `type`, with a JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StandardAction {
    /// Plain state transition
    Plain { kind: String, payload: Value },
    /// State transition that also requests a network call
    Api {
        kind: String,
        payload: Value,
        call: ApiCall<StandardAction>,
    },
}

impl StandardAction {
    /// A plain action.
    pub fn plain(kind: impl Into<String>, payload: Value) -> Self {
        Self::Plain {
            kind: kind.into(),
            payload,
        }
    }

    /// The action's `type`
    pub fn kind(&self) -> &str {
        match self {
            Self::Plain { kind, .. } | Self::Api { kind, .. } => kind,
        }
    }

    /// The action's payload
    pub fn payload(&self) -> &Value {
        match self {
            Self::Plain { payload, .. } | Self::Api { payload, .. } => payload,
        }
    }

    /// Take the payload, dropping the rest.
    pub fn into_payload(self) -> Value {
        match self {
            Self::Plain { payload, .. } | Self::Api { payload, .. } => payload,
        }
    }
}

impl Action for StandardAction {
    fn name(&self) -> &str {
        self.kind()
    }
}

impl ApiCarrier for StandardAction {
    fn api_call(&self) -> Option<&ApiCall<Self>> {
        match self {
            Self::Api { call, .. } => Some(call),
            Self::Plain { .. } => None,
        }
    }
}

/// The default success translation: `{ type: "SUCCESS", payload: body }`.
pub fn default_on_success(body: Value) -> StandardAction {
    StandardAction::plain(SUCCESS, body)
}

/// Start building an action that carries a network call.
///
/// Defaults: `type` is `"API"`, payload is `null`, url is `""` and the
/// success translation is [`default_on_success`]. The failure translation
/// has no default; [`api_error`] is the conventional choice.
pub fn api_action<F>(on_failure: F) -> ApiActionBuilder
where
    F: Fn(ApiError) -> StandardAction + Send + Sync + 'static,
{
    ApiActionBuilder {
        kind: API.to_string(),
        payload: Value::Null,
        call: ApiCall::builder(default_on_success, on_failure),
    }
}

/// Builder returned by [`api_action`]
#[derive(Debug)]
pub struct ApiActionBuilder {
    kind: String,
    payload: Value,
    call: ApiCallBuilder<StandardAction>,
}

impl ApiActionBuilder {
    /// Set the action's `type`.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the action's own payload (not the request body).
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Set the target endpoint.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.call = self.call.url(url);
        self
    }

    /// Set the HTTP verb.
    pub fn method(mut self, method: Method) -> Self {
        self.call = self.call.method(method);
        self
    }

    /// Add one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.call = self.call.header(name, value);
        self
    }

    /// Add several headers in order; see [`ApiCallBuilder::headers`].
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.call = self.call.headers(headers);
        self
    }

    /// Set the request body.
    pub fn data(mut self, data: Value) -> Self {
        self.call = self.call.data(data);
        self
    }

    /// Replace the success translation.
    pub fn on_success<S>(mut self, on_success: S) -> Self
    where
        S: Fn(Value) -> StandardAction + Send + Sync + 'static,
    {
        self.call = self.call.on_success(on_success);
        self
    }

    /// Replace the failure translation.
    pub fn on_failure<F>(mut self, on_failure: F) -> Self
    where
        F: Fn(ApiError) -> StandardAction + Send + Sync + 'static,
    {
        self.call = self.call.on_failure(on_failure);
        self
    }

    /// Finish the action.
    pub fn build(self) -> StandardAction {
        StandardAction::Api {
            kind: self.kind,
            payload: self.payload,
            call: self.call.build(),
        }
    }
}

/// The conventional failure action: `{ type: "API_ERROR", payload: { error } }`.
///
/// Only builds the action; dispatching it is up to the caller.
pub fn api_error(error: ApiError) -> StandardAction {
    let error_value =
        serde_json::to_value(&error).unwrap_or_else(|_| Value::String(error.to_string()));
    let mut payload = Map::new();
    payload.insert("error".to_string(), error_value);
    StandardAction::plain(API_ERROR, Value::Object(payload))
}

/// [`api_error`], after handing the error to `callback` once.
///
/// The callback's return value is discarded.
pub fn api_error_with<F, R>(error: ApiError, callback: F) -> StandardAction
where
    F: FnOnce(&ApiError) -> R,
{
    let _ = callback(&error);
    api_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn test_api_action_defaults() {
        let action = api_action(api_error).payload(json!({ "a": 1 })).build();

        assert_eq!(action.kind(), "API");
        assert_eq!(action.name(), "API");
        assert_eq!(action.payload(), &json!({ "a": 1 }));

        let call = action.api_call().expect("descriptor");
        assert_eq!(call.url(), "");
        assert!(call.method().is_none());
        assert!(call.headers().is_empty());
        assert!(call.data().is_none());

        let body = json!({ "b": [1, 2] });
        assert_eq!(
            call.succeed(body.clone()),
            StandardAction::plain("SUCCESS", body)
        );
    }

    #[test]
    fn test_api_action_keeps_every_field() {
        let action = api_action(api_error)
            .kind("USERS_FETCH")
            .payload(json!("page-1"))
            .url("/users")
            .method(Method::PUT)
            .header("X-Foo", "bar")
            .headers([("accept", "text/csv"), ("Accept", "application/json")])
            .data(json!({ "name": "ada" }))
            .on_success(|users| StandardAction::plain("USERS_LOADED", users))
            .build();

        assert_eq!(action.kind(), "USERS_FETCH");
        assert_eq!(action.payload(), &json!("page-1"));
        assert!(action.is_api_call());

        let call = action.api_call().unwrap();
        assert_eq!(call.url(), "/users");
        assert_eq!(call.method(), Some(&Method::PUT));
        assert_eq!(call.headers()["X-Foo"], "bar");
        assert_eq!(call.headers()["Accept"], "application/json");
        assert_eq!(call.headers().len(), 2);
        assert_eq!(call.data(), Some(&json!({ "name": "ada" })));
        assert_eq!(call.succeed(json!([])).kind(), "USERS_LOADED");
        assert_eq!(call.fail(ApiError::Timeout).kind(), "API_ERROR");
    }

    #[test]
    fn test_plain_action_has_no_descriptor() {
        let action = StandardAction::plain("INCREMENT", json!(1));
        assert!(action.api_call().is_none());
        assert!(!action.is_api_call());
        assert_eq!(action.into_payload(), json!(1));
    }

    #[test]
    fn test_api_error_shape() {
        let action = api_error(ApiError::transport("boom"));
        assert_eq!(
            action,
            StandardAction::plain(
                "API_ERROR",
                json!({ "error": { "kind": "transport", "message": "boom" } })
            )
        );
    }

    #[test]
    fn test_api_error_with_calls_callback_once() {
        let calls = Cell::new(0);
        let action = api_error_with(ApiError::Timeout, |error| {
            assert_eq!(error, &ApiError::Timeout);
            calls.set(calls.get() + 1);
            "ignored"
        });

        assert_eq!(calls.get(), 1);
        assert_eq!(action, api_error(ApiError::Timeout));
    }
}
