//! Multi-value publisher.
//!
//! A [`Flux`] is a lazily evaluated sequence of zero or more values that
//! ends either by completing or with a single error. Nothing is emitted
//! after an error.

use std::fmt::{self, Debug};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future;
use futures::ready;
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use futures_core::Stream;

use crate::blocking::block_on;
use crate::error::{StreamError, StreamResult};
use crate::mono::Mono;
use crate::signal::{self, LambdaSubscriber, Signal, Subscriber, Subscription};

/// A lazily evaluated sequence of `T` values.
///
/// # Example
///
/// ```rust
/// use reactive_people::Flux;
///
/// let evens = Flux::from_iterable(1..=6)
///     .filter(|n| n % 2 == 0)
///     .map(|n| n * 10)
///     .collect_list()
///     .block()
///     .unwrap();
///
/// assert_eq!(evens, Some(vec![20, 40, 60]));
/// ```
pub struct Flux<T> {
    inner: BoxStream<'static, StreamResult<T>>,
    done: bool,
}

impl<T: Send + 'static> Flux<T> {
    /// Wrap a stream of signals. The first `Err` terminates the sequence.
    pub fn from_results<S>(stream: S) -> Self
    where
        S: Stream<Item = StreamResult<T>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
            done: false,
        }
    }

    /// Wrap a stream that never fails.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self::from_results(stream.map(Ok))
    }

    /// Emit every item of `iter` in order, then complete.
    ///
    /// The iterator is only advanced while the Flux is being consumed.
    pub fn from_iterable<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::from_stream(stream::iter(iter))
    }

    /// A Flux of one value.
    pub fn just(value: T) -> Self {
        Self::from_iterable(std::iter::once(value))
    }

    /// A Flux that completes without values.
    pub fn empty() -> Self {
        Self::from_results(stream::empty())
    }

    /// A Flux that fails immediately with `error`.
    pub fn error(error: StreamError) -> Self {
        Self::from_results(stream::once(future::ready(Err(error))))
    }

    /// Transform each value.
    pub fn map<U, F>(self, mut f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Flux::from_results(TryStreamExt::map_ok(self, move |value| f(value)))
    }

    /// Keep only the values matching `predicate`, in their original order.
    pub fn filter<F>(self, mut predicate: F) -> Flux<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        Flux::from_results(StreamExt::filter(self, move |item| {
            future::ready(match item {
                Ok(value) => predicate(value),
                Err(_) => true,
            })
        }))
    }

    /// Emit at most the first `n` values, then complete.
    pub fn take(self, n: usize) -> Flux<T> {
        Flux::from_results(StreamExt::take(self, n))
    }

    /// Peek at each value as it passes.
    pub fn do_on_next<F>(self, mut f: F) -> Flux<T>
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.tap(move |signal| {
            if let Signal::Next(value) = signal {
                f(value)
            }
        })
    }

    /// Observe the error signal without consuming it.
    pub fn do_on_error<F>(self, mut f: F) -> Flux<T>
    where
        F: FnMut(&StreamError) + Send + 'static,
    {
        self.tap(move |signal| {
            if let Signal::Error(error) = signal {
                f(error)
            }
        })
    }

    /// Run `f` when the Flux completes normally.
    pub fn do_on_complete<F>(self, mut f: F) -> Flux<T>
    where
        F: FnMut() + Send + 'static,
    {
        self.tap(move |signal| {
            if let Signal::Complete = signal {
                f()
            }
        })
    }

    /// Emit a `tracing` event for every signal under `category`.
    pub fn log(self, category: impl Into<String>) -> Flux<T>
    where
        T: Debug,
    {
        let category = category.into();
        self.tap(move |signal| match signal {
            Signal::Next(value) => tracing::info!(category = %category, "onNext({:?})", value),
            Signal::Error(error) => tracing::warn!(category = %category, %error, "onError"),
            Signal::Complete => tracing::info!(category = %category, "onComplete"),
        })
    }

    fn tap<F>(self, hook: F) -> Flux<T>
    where
        F: FnMut(Signal<'_, T>) + Send + 'static,
    {
        Flux::from_results(Tap {
            source: self,
            hook: Box::new(hook),
            done: false,
        })
    }

    /// Gather every value into one ordered `Vec`.
    pub fn collect_list(self) -> Mono<Vec<T>> {
        Mono::from_future(async move { self.try_collect::<Vec<T>>().await.map(Some) })
    }

    /// Number of values emitted before completion.
    pub fn count(self) -> Mono<usize> {
        Mono::from_future(async move {
            self.try_fold(0usize, |n, _| future::ready(Ok(n + 1)))
                .await
                .map(Some)
        })
    }

    /// The first value, or an empty Mono if the Flux completes without one.
    pub fn first(mut self) -> Mono<T> {
        Mono::from_future(async move { StreamExt::next(&mut self).await.transpose() })
    }

    /// Emits `true` if at least one value arrives.
    pub fn has_elements(self) -> Mono<bool> {
        self.first().has_element()
    }

    /// Expect exactly one value.
    ///
    /// Fails with [`StreamError::NoSuchElement`] when the Flux is empty and
    /// with [`StreamError::TooManyElements`] when it emits a second value.
    pub fn single(self) -> Mono<T> {
        Mono::from_future(async move {
            match take_single(self).await? {
                Some(value) => Ok(Some(value)),
                None => Err(StreamError::NoSuchElement),
            }
        })
    }

    /// Like [`Flux::single`], but an empty Flux yields an empty Mono.
    pub fn single_or_empty(self) -> Mono<T> {
        Mono::from_future(take_single(self))
    }

    /// Block until the first value arrives or the Flux terminates.
    pub fn block_first(self) -> StreamResult<Option<T>> {
        self.first().block()
    }

    /// Block until the Flux completes and return its last value.
    pub fn block_last(self) -> StreamResult<Option<T>> {
        block_on(
            self.try_fold(None, |_, value| future::ready(Ok(Some(value)))),
            None,
        )
    }

    /// Invoke `on_next` for every value.
    ///
    /// See [`Subscription`] for where the pipeline runs.
    pub fn subscribe<F>(self, on_next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(LambdaSubscriber::new(on_next))
    }

    /// Deliver every signal to `subscriber`.
    pub fn subscribe_with<S>(self, subscriber: S) -> Subscription
    where
        S: Subscriber<T>,
    {
        signal::subscribe(self, subscriber)
    }
}

async fn take_single<T: Send + 'static>(mut flux: Flux<T>) -> StreamResult<Option<T>> {
    let first = match flux.next().await {
        None => return Ok(None),
        Some(item) => item?,
    };
    match flux.next().await {
        None => Ok(Some(first)),
        Some(Err(error)) => Err(error),
        Some(Ok(_)) => Err(StreamError::TooManyElements),
    }
}

impl<T> Stream for Flux<T> {
    type Item = StreamResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        let item = ready!(self.inner.poll_next_unpin(cx));
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        Poll::Ready(item)
    }
}

impl<T: Send + 'static> From<Mono<T>> for Flux<T> {
    fn from(mono: Mono<T>) -> Self {
        mono.into_flux()
    }
}

impl<T> Debug for Flux<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flux").field("done", &self.done).finish_non_exhaustive()
    }
}

/// Calls a hook for each signal passing through, including the terminal one.
struct Tap<T> {
    source: Flux<T>,
    hook: Box<dyn FnMut(Signal<'_, T>) + Send>,
    done: bool,
}

impl<T> Stream for Tap<T> {
    type Item = StreamResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        let this = &mut *self;
        let item = ready!(this.source.poll_next_unpin(cx));
        match &item {
            Some(Ok(value)) => (this.hook)(Signal::Next(value)),
            Some(Err(error)) => {
                this.done = true;
                (this.hook)(Signal::Error(error));
            }
            None => {
                this.done = true;
                (this.hook)(Signal::Complete);
            }
        }
        Poll::Ready(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_map_and_filter_preserve_order() {
        let values: Vec<_> = Flux::from_iterable(vec![3, 1, 4, 1, 5])
            .filter(|n| *n != 1)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            values,
            vec![Ok("3".to_string()), Ok("4".to_string()), Ok("5".to_string())]
        );
    }

    #[tokio::test]
    async fn test_nothing_after_error() {
        let source = stream::iter(vec![Ok(1), Err(StreamError::Other("x".into())), Ok(2)]);
        let items: Vec<_> = Flux::from_results(source).collect().await;

        assert_eq!(items, vec![Ok(1), Err(StreamError::Other("x".into()))]);
    }

    #[tokio::test]
    async fn test_single_cardinality() {
        assert_eq!(Flux::just(9).single().await, Ok(Some(9)));
        assert_eq!(
            Flux::<i32>::empty().single().await,
            Err(StreamError::NoSuchElement)
        );
        assert_eq!(
            Flux::from_iterable(vec![1, 2]).single().await,
            Err(StreamError::TooManyElements)
        );
    }

    #[tokio::test]
    async fn test_single_or_empty() {
        assert_eq!(Flux::<i32>::empty().single_or_empty().await, Ok(None));
        assert_eq!(Flux::just(1).single_or_empty().await, Ok(Some(1)));
        assert_eq!(
            Flux::from_iterable(vec![1, 2]).single_or_empty().await,
            Err(StreamError::TooManyElements)
        );
    }

    #[tokio::test]
    async fn test_reductions() {
        assert_eq!(Flux::from_iterable(0..4).count().await, Ok(Some(4)));
        assert_eq!(Flux::from_iterable(5..9).first().await, Ok(Some(5)));
        assert_eq!(Flux::<u8>::empty().first().await, Ok(None));
        assert_eq!(Flux::<u8>::empty().has_elements().await, Ok(Some(false)));
        assert_eq!(Flux::from_iterable(0..10).take(3).count().await, Ok(Some(3)));
    }

    #[tokio::test]
    async fn test_collect_list_propagates_error() {
        let result = Flux::<i32>::error(StreamError::Other("boom".into()))
            .collect_list()
            .await;
        assert_eq!(result, Err(StreamError::Other("boom".into())));
    }

    #[tokio::test]
    async fn test_hooks_see_each_signal_once() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (on_next, on_complete) = (Arc::clone(&events), Arc::clone(&events));

        let _ = Flux::from_iterable(vec![1, 2])
            .do_on_next(move |v| on_next.lock().unwrap().push(format!("next {v}")))
            .do_on_complete(move || on_complete.lock().unwrap().push("complete".into()))
            .collect_list()
            .await;

        assert_eq!(*events.lock().unwrap(), vec!["next 1", "next 2", "complete"]);
    }

    #[tokio::test]
    async fn test_do_on_error_skips_completion() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let (on_error, on_complete) = (Arc::clone(&events), Arc::clone(&events));

        let result = Flux::<i32>::empty()
            .single()
            .into_flux()
            .do_on_error(move |e| on_error.lock().unwrap().push(e.to_string()))
            .do_on_complete(move || on_complete.lock().unwrap().push("complete".to_string()))
            .collect_list()
            .await;

        assert_eq!(result, Err(StreamError::NoSuchElement));
        assert_eq!(*events.lock().unwrap(), vec!["Source was empty"]);
    }

    #[test]
    fn test_block_first_and_last() {
        assert_eq!(Flux::from_iterable(vec!['a', 'b', 'c']).block_first(), Ok(Some('a')));
        assert_eq!(Flux::from_iterable(vec!['a', 'b', 'c']).block_last(), Ok(Some('c')));
        assert_eq!(Flux::<char>::empty().block_last(), Ok(None));
    }
}
