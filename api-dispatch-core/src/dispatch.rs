//! Dispatch capability handed to the API middleware
//!
//! Derived actions are produced on spawned tasks, so they cannot call back into
//! a `&mut` store directly. Instead the middleware is given something that can
//! *send* an action back into the pipeline; the usual choice is the sending half
//! of the main loop's action channel.

use std::sync::Arc;

use tokio::sync::mpsc;

/// Something that accepts derived actions.
pub trait Dispatch<A>: Send + Sync + 'static {
    /// Submit an action into the pipeline.
    fn dispatch(&self, action: A);
}

impl<A: Send + 'static> Dispatch<A> for mpsc::UnboundedSender<A> {
    fn dispatch(&self, action: A) {
        // Receiver gone means the main loop has shut down
        if self.send(action).is_err() {
            tracing::debug!("action channel closed, dropping derived action");
        }
    }
}

impl<A, F> Dispatch<A> for Arc<F>
where
    F: Fn(A) + Send + Sync + ?Sized + 'static,
{
    fn dispatch(&self, action: A) {
        (**self)(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_channel_dispatch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.dispatch(7);
        assert_eq!(rx.try_recv().ok(), Some(7));
    }

    #[test]
    fn test_closed_channel_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel::<i32>();
        drop(rx);
        tx.dispatch(1);
    }

    #[test]
    fn test_closure_dispatch() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let dispatch = Arc::new(move |action: &'static str| sink.lock().unwrap().push(action));

        dispatch.dispatch("first");
        dispatch.dispatch("second");

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }
}
