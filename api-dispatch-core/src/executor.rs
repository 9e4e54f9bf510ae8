//! Call executor: runs one descriptor and dispatches the derived action

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::ApiCall;
use crate::dispatch::Dispatch;
use crate::transport::Transport;
use crate::Action;

/// Perform the call described by `call` and dispatch exactly one derived action.
///
/// The request goes out with the descriptor's merged headers. A response
/// becomes `on_success(body)`; any failure reported by the transport becomes
/// `on_failure(error)`. There is no retry.
///
/// A panic inside either translation callback is not caught and unwinds out of
/// this future; in that case nothing is dispatched.
pub async fn perform_api_call<A, T, D>(call: ApiCall<A>, transport: &T, dispatch: &D)
where
    A: Action,
    T: Transport + ?Sized,
    D: Dispatch<A> + ?Sized,
{
    let request = call.request();
    tracing::debug!(
        method = %request.method_or_default(),
        url = %request.url,
        "api call started"
    );

    let action = match transport.send(request).await {
        Ok(response) => {
            tracing::debug!(status = response.status, "api call succeeded");
            call.succeed(response.data)
        }
        Err(error) => {
            tracing::warn!(%error, "api call failed");
            call.fail(error)
        }
    };

    dispatch.dispatch(action);
}

/// Run [`perform_api_call`] on a detached tokio task.
///
/// Must be called from within a tokio runtime. The returned handle may be
/// dropped; the task still runs to completion.
pub fn spawn_api_call<A, T, D>(call: ApiCall<A>, transport: Arc<T>, dispatch: D) -> JoinHandle<()>
where
    A: Action,
    T: Transport + ?Sized,
    D: Dispatch<A>,
{
    tokio::spawn(async move {
        perform_api_call(call, transport.as_ref(), &dispatch).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResponse;
    use crate::error::ApiError;
    use crate::standard::StandardAction;
    use crate::testing::{StubTransport, TestHarness};
    use serde_json::json;
    use std::time::Duration;

    fn descriptor(url: &str) -> ApiCall<StandardAction> {
        ApiCall::builder(
            |body| StandardAction::plain("OK", body),
            |error| StandardAction::plain("FAIL", json!({ "error": error })),
        )
        .url(url)
        .build()
    }

    #[tokio::test]
    async fn test_success_dispatches_on_success() {
        let transport = StubTransport::new().reply("/x", Ok(ApiResponse::ok(json!({ "n": 1 }))));
        let mut harness = TestHarness::<(), StandardAction>::new(());

        perform_api_call(descriptor("/x"), &transport, &harness.sender()).await;

        let emitted = harness.drain_emitted();
        assert_eq!(emitted, vec![StandardAction::plain("OK", json!({ "n": 1 }))]);
    }

    #[tokio::test]
    async fn test_failure_dispatches_on_failure() {
        let transport = StubTransport::new().reply("/x", Err(ApiError::transport("boom")));
        let mut harness = TestHarness::<(), StandardAction>::new(());

        perform_api_call(descriptor("/x"), &transport, &harness.sender()).await;

        let emitted = harness.drain_emitted();
        assert_eq!(
            emitted,
            vec![StandardAction::plain(
                "FAIL",
                json!({ "error": { "kind": "transport", "message": "boom" } })
            )]
        );
    }

    #[tokio::test]
    async fn test_request_carries_descriptor() {
        let transport = StubTransport::new().reply("/users", Ok(ApiResponse::ok(json!([]))));
        let harness = TestHarness::<(), StandardAction>::new(());

        let call = ApiCall::builder(
            |body| StandardAction::plain("OK", body),
            |_| StandardAction::plain("FAIL", json!(null)),
        )
        .url("/users")
        .method(crate::Method::POST)
        .headers([("Content-Type", "text/plain"), ("X-Foo", "bar")])
        .data(json!({ "name": "ada" }))
        .build();

        perform_api_call(call, &transport, &harness.sender()).await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "/users");
        assert_eq!(request.method, Some(crate::Method::POST));
        assert_eq!(request.data, Some(json!({ "name": "ada" })));
        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers["Content-Type"], "text/plain");
        assert_eq!(request.headers["X-Foo"], "bar");
    }

    #[tokio::test]
    async fn test_unknown_url_fails_through_on_failure() {
        let transport = StubTransport::new();
        let mut harness = TestHarness::<(), StandardAction>::new(());

        perform_api_call(descriptor("/nowhere"), &transport, &harness.sender()).await;

        let emitted = harness.drain_emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].name(), "FAIL");
    }

    #[tokio::test]
    async fn test_spawned_call_completes_without_awaiting() {
        let transport = Arc::new(
            StubTransport::new().reply("/x", Ok(ApiResponse::ok(json!({ "n": 2 })))),
        );
        let mut harness = TestHarness::<(), StandardAction>::new(());

        let handle = spawn_api_call(descriptor("/x"), transport, harness.sender());
        drop(handle);

        let derived = harness.recv_timeout(Duration::from_secs(1)).await;
        assert_eq!(derived, Some(StandardAction::plain("OK", json!({ "n": 2 }))));
    }

    #[tokio::test]
    async fn test_panicking_failure_translation_is_not_caught() {
        let transport = Arc::new(StubTransport::new().reply("/x", Err(ApiError::Timeout)));
        let mut harness = TestHarness::<(), StandardAction>::new(());

        let call = ApiCall::builder(
            |body| StandardAction::plain("OK", body),
            |_| -> StandardAction { panic!("bad translation") },
        )
        .url("/x")
        .build();

        let result = spawn_api_call(call, transport, harness.sender()).await;
        assert!(result.unwrap_err().is_panic());
        assert!(harness.drain_emitted().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_success_translation_is_not_caught() {
        let transport = Arc::new(
            StubTransport::new().reply("/x", Ok(ApiResponse::ok(json!(null)))),
        );
        let mut harness = TestHarness::<(), StandardAction>::new(());

        let call = ApiCall::builder(
            |_| -> StandardAction { panic!("bad translation") },
            |_| StandardAction::plain("FAIL", json!(null)),
        )
        .url("/x")
        .build();

        let result = spawn_api_call(call, transport, harness.sender()).await;
        assert!(result.unwrap_err().is_panic());
        assert!(harness.drain_emitted().is_empty());
    }
}
