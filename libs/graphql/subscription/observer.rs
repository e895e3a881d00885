//! Subscription observers
//!
//! A session drives exactly one observer. Callbacks run on the session task,
//! one at a time, in frame order.

use super::session::{SessionState, SubscriptionHandle};
use crate::error::SubscriptionError;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::debug;

/// Receives the event sequence of one subscription
///
/// After `complete` or `error` nothing further is delivered, except that
/// frames which are illegal for the current state are reported through
/// `error` without ending the subscription.
pub trait Observer: Send + 'static {
    /// A `data` frame payload
    fn next(&mut self, payload: Value);

    /// A failure; the default only logs it
    fn error(&mut self, error: SubscriptionError) {
        debug!(%error, "Unhandled subscription error");
    }

    /// The server completed the subscription
    fn complete(&mut self) {}
}

type NextFn = Box<dyn FnMut(Value) + Send>;
type ErrorFn = Box<dyn FnMut(SubscriptionError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// Observer built from closures
///
/// ```
/// use graphql::FnObserver;
///
/// let observer = FnObserver::new(|payload| println!("{payload}"))
///     .on_error(|e| eprintln!("{e}"))
///     .on_complete(|| println!("done"));
/// # drop(observer);
/// ```
pub struct FnObserver {
    on_next: NextFn,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
}

impl FnObserver {
    pub fn new(on_next: impl FnMut(Value) + Send + 'static) -> Self {
        Self {
            on_next: Box::new(on_next),
            on_error: None,
            on_complete: None,
        }
    }

    pub fn on_error(mut self, f: impl FnMut(SubscriptionError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl Observer for FnObserver {
    fn next(&mut self, payload: Value) {
        (self.on_next)(payload)
    }

    fn error(&mut self, error: SubscriptionError) {
        match &mut self.on_error {
            Some(f) => f(error),
            None => debug!(%error, "Unhandled subscription error"),
        }
    }

    fn complete(&mut self) {
        if let Some(f) = &mut self.on_complete {
            f()
        }
    }
}

/// Item yielded by a [`SubscriptionStream`]
pub type StreamItem = Result<Value, SubscriptionError>;

/// Observer that forwards events into an unbounded channel
///
/// The channel closes when the session drops the observer, which happens
/// once the session reaches `Closed`.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<StreamItem>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StreamItem>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Observer for ChannelObserver {
    fn next(&mut self, payload: Value) {
        if self.sender.send(Ok(payload)).is_err() {
            debug!("Subscription stream dropped, discarding payload");
        }
    }

    fn error(&mut self, error: SubscriptionError) {
        let _ = self.sender.send(Err(error));
    }
}

/// A subscription consumed as a [`Stream`]
///
/// Yields every payload (and every reported error) in order, and ends once
/// the session is closed. Dropping the stream does not cancel the
/// subscription; call [`cancel`](Self::cancel) for that.
pub struct SubscriptionStream {
    receiver: mpsc::UnboundedReceiver<StreamItem>,
    handle: SubscriptionHandle,
}

impl SubscriptionStream {
    pub fn new(receiver: mpsc::UnboundedReceiver<StreamItem>, handle: SubscriptionHandle) -> Self {
        Self { receiver, handle }
    }

    /// Cancel the underlying subscription
    pub fn cancel(&self) {
        self.handle.cancel()
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }
}

impl Stream for SubscriptionStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
