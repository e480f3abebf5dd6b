//! Signals, subscribers and subscription handles.
//!
//! A publisher emits zero or more `next` signals followed by at most one
//! terminal signal (`complete` or `error`). Subscribers receive those
//! signals through callbacks; the returned [`Subscription`] reports how the
//! sequence terminated.

use std::panic::{self, AssertUnwindSafe};
use std::task::{Context, Poll};
use std::thread;

use futures::future::{AbortHandle, Abortable};
use futures::task::noop_waker_ref;
use futures::{FutureExt, StreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::blocking::{in_async_context, local_runtime};
use crate::error::StreamError;
use crate::flux::Flux;

/// A borrowed view of one signal, handed to peek operators such as
/// [`Flux::log`].
#[derive(Debug)]
pub enum Signal<'a, T> {
    Next(&'a T),
    Error(&'a StreamError),
    Complete,
}

impl<T> Signal<'_, T> {
    /// Whether this signal ends the sequence.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }
}

/// How a subscription ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The publisher completed normally
    Completed,
    /// The publisher signalled an error
    Failed(StreamError),
    /// The subscription was disposed before the publisher terminated
    Cancelled,
}

impl Termination {
    /// Whether the publisher completed normally.
    pub fn is_completed(&self) -> bool {
        matches!(self, Termination::Completed)
    }

    /// The error the subscription failed with, if any.
    pub fn error(&self) -> Option<&StreamError> {
        match self {
            Termination::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Receives the signals of a publisher.
///
/// `on_next` is invoked once per element in emission order, then exactly
/// one of `on_error` / `on_complete`.
pub trait Subscriber<T>: Send + 'static {
    /// Called for each value.
    fn on_next(&mut self, value: T);

    /// Called once if the publisher fails. Logs at `warn` by default.
    fn on_error(&mut self, error: StreamError) {
        tracing::warn!(%error, "error signal dropped: subscriber has no error handler");
    }

    /// Called once if the publisher completes.
    fn on_complete(&mut self) {}
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(StreamError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// A subscriber assembled from closures.
///
/// # Example
///
/// ```rust
/// use reactive_people::{Flux, LambdaSubscriber};
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let subscription = Flux::from_iterable(vec![1, 2, 3])
///     .subscribe_with(LambdaSubscriber::new(move |v| sink.lock().unwrap().push(v)));
///
/// assert!(subscription.is_finished());
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
/// ```
pub struct LambdaSubscriber<T> {
    on_next: NextFn<T>,
    on_error: Option<ErrorFn>,
    on_complete: Option<CompleteFn>,
}

impl<T> LambdaSubscriber<T> {
    /// A subscriber that only handles values.
    pub fn new<F>(on_next: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        Self {
            on_next: Box::new(on_next),
            on_error: None,
            on_complete: None,
        }
    }

    /// Handle the error signal.
    pub fn with_error<F>(mut self, on_error: F) -> Self
    where
        F: FnMut(StreamError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Handle the completion signal.
    pub fn with_complete<F>(mut self, on_complete: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl<T: 'static> Subscriber<T> for LambdaSubscriber<T> {
    fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    fn on_error(&mut self, error: StreamError) {
        match self.on_error.as_mut() {
            Some(handler) => handler(error),
            None => {
                tracing::warn!(%error, "error signal dropped: subscriber has no error handler")
            }
        }
    }

    fn on_complete(&mut self) {
        if let Some(handler) = self.on_complete.as_mut() {
            handler()
        }
    }
}

impl<T> std::fmt::Debug for LambdaSubscriber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaSubscriber")
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

#[derive(Debug)]
enum SubscriptionState {
    /// Driven by a task on the caller's runtime.
    Running(JoinHandle<Termination>),
    /// Driven on a dedicated thread with its own runtime.
    Detached {
        thread: thread::JoinHandle<()>,
        abort: AbortHandle,
        done: oneshot::Receiver<Termination>,
    },
    Finished(Termination),
}

/// Handle to an active or finished subscription.
///
/// Inside a Tokio runtime the pipeline runs on a spawned task. Outside one,
/// sources that are ready (iterables, repository lookups) deliver every
/// signal before `subscribe` returns; anything still pending, such as a
/// sink-backed Flux, keeps running on a dedicated thread.
#[derive(Debug)]
pub struct Subscription {
    state: SubscriptionState,
}

impl Subscription {
    fn finished(termination: Termination) -> Self {
        Self {
            state: SubscriptionState::Finished(termination),
        }
    }

    /// Stop delivering signals. Has no effect once the publisher terminated.
    pub fn dispose(&self) {
        match &self.state {
            SubscriptionState::Running(handle) => handle.abort(),
            SubscriptionState::Detached { abort, .. } => abort.abort(),
            SubscriptionState::Finished(_) => {}
        }
    }

    /// Whether the publisher has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            SubscriptionState::Running(handle) => handle.is_finished(),
            SubscriptionState::Detached { thread, .. } => thread.is_finished(),
            SubscriptionState::Finished(_) => true,
        }
    }

    /// Wait for the subscription to end and report how it ended.
    ///
    /// Any executor can drive this future, so synchronous callers may use
    /// `futures::executor::block_on`.
    pub async fn completion(self) -> Termination {
        match self.state {
            SubscriptionState::Finished(termination) => termination,
            SubscriptionState::Running(handle) => match handle.await {
                Ok(termination) => termination,
                Err(err) if err.is_cancelled() => Termination::Cancelled,
                Err(err) => Termination::Failed(StreamError::Callback(err.to_string())),
            },
            SubscriptionState::Detached { done, .. } => done.await.unwrap_or_else(|_| {
                Termination::Failed(StreamError::Callback(
                    "subscription thread panicked".to_string(),
                ))
            }),
        }
    }
}

/// Run one subscriber callback, turning a panic into a [`StreamError::Callback`].
fn guarded(callback: impl FnOnce()) -> Result<(), StreamError> {
    panic::catch_unwind(AssertUnwindSafe(callback)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "subscriber panicked".to_string());
        StreamError::Callback(message)
    })
}

/// Feed every signal of `flux` to `subscriber`.
///
/// A panicking `on_next` cancels the upstream and is reported to `on_error`
/// as [`StreamError::Callback`]. A panicking terminal callback only changes
/// the reported [`Termination`].
pub(crate) async fn drive<T, S>(mut flux: Flux<T>, mut subscriber: S) -> Termination
where
    T: Send + 'static,
    S: Subscriber<T>,
{
    while let Some(item) = flux.next().await {
        let error = match item {
            Ok(value) => match guarded(|| subscriber.on_next(value)) {
                Ok(()) => continue,
                Err(error) => {
                    tracing::warn!(%error, "on_next failed, cancelling upstream");
                    error
                }
            },
            Err(error) => error,
        };
        if let Err(panicked) = guarded(|| subscriber.on_error(error.clone())) {
            return Termination::Failed(panicked);
        }
        return Termination::Failed(error);
    }
    match guarded(|| subscriber.on_complete()) {
        Ok(()) => Termination::Completed,
        Err(error) => Termination::Failed(error),
    }
}

/// Start a subscription.
///
/// Inside a runtime the pipeline runs on a spawned task. Outside one it is
/// polled once on the calling thread, so synchronous sources have delivered
/// every signal before this returns. A source that is not ready yet, such as
/// a sink whose producer is still active, continues on a dedicated thread.
pub(crate) fn subscribe<T, S>(flux: Flux<T>, subscriber: S) -> Subscription
where
    T: Send + 'static,
    S: Subscriber<T>,
{
    if in_async_context() {
        tracing::trace!("subscribing on spawned task");
        return Subscription {
            state: SubscriptionState::Running(tokio::spawn(drive(flux, subscriber))),
        };
    }

    let runtime = match local_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return Subscription::finished(Termination::Failed(error)),
    };
    let (abort, registration) = AbortHandle::new_pair();
    let mut pipeline = Abortable::new(drive(flux, subscriber), registration).boxed();

    let first_poll = {
        let _entered = runtime.enter();
        let mut cx = Context::from_waker(noop_waker_ref());
        pipeline.poll_unpin(&mut cx)
    };
    if let Poll::Ready(outcome) = first_poll {
        return Subscription::finished(outcome.unwrap_or(Termination::Cancelled));
    }

    tracing::trace!("source not ready, subscribing on dedicated thread");
    let (tx, done) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("reactive-subscriber".to_string())
        .spawn(move || {
            let termination = runtime
                .block_on(pipeline)
                .unwrap_or(Termination::Cancelled);
            let _ = tx.send(termination);
        });
    match spawned {
        Ok(thread) => Subscription {
            state: SubscriptionState::Detached {
                thread,
                abort,
                done,
            },
        },
        Err(error) => Subscription::finished(Termination::Failed(error.into())),
    }
}
