//! Action traits for dispatchable state transitions

use std::fmt::Debug;

use crate::api::ApiCall;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions represent intents to change state. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: Derived actions are produced on spawned tasks
///
/// Use `#[derive(Action)]` from `api-dispatch-macros` to auto-implement this trait,
/// or use [`StandardAction`](crate::StandardAction) for string-typed actions.
pub trait Action: Clone + Debug + Send + 'static {
    /// The action discriminator (its `type`), used for logging and filtering
    fn name(&self) -> &str;
}

/// Capability check for actions that may carry a network-call descriptor
///
/// The API middleware asks every action for its descriptor through this
/// trait. Actions returning `None` are forwarded and otherwise ignored.
///
/// `#[derive(Action)]` implements this trait too: the variant marked
/// `#[action(api)]` must hold a single `ApiCall<Self>`.
pub trait ApiCarrier: Action {
    /// The embedded descriptor, if this action requests a network call
    fn api_call(&self) -> Option<&ApiCall<Self>>;

    /// Whether this action requests a network call
    fn is_api_call(&self) -> bool {
        self.api_call().is_some()
    }
}
