//! Single-value publisher.

use std::fmt::{self, Debug};
use std::future::{Future, IntoFuture};
use std::time::Duration;

use futures::future::{self, BoxFuture};
use futures::stream::{self, StreamExt};

use crate::blocking::block_on;
use crate::error::{StreamError, StreamResult};
use crate::flux::Flux;
use crate::signal::{LambdaSubscriber, Subscriber, Subscription};

/// A lazily evaluated result of at most one value.
///
/// A `Mono` terminates in exactly one of three ways: with a value, empty,
/// or with an error. Empty is a normal outcome and is reported as
/// `Ok(None)` by [`Mono::block`] and by `.await`.
///
/// # Example
///
/// ```rust
/// use reactive_people::Mono;
///
/// # async fn example() {
/// let name = Mono::just("fiona").map(str::to_uppercase).await;
/// assert_eq!(name, Ok(Some("FIONA".to_string())));
///
/// let missing = Mono::<u32>::empty().has_element().await;
/// assert_eq!(missing, Ok(Some(false)));
/// # }
/// ```
pub struct Mono<T> {
    inner: BoxFuture<'static, StreamResult<Option<T>>>,
}

impl<T: Send + 'static> Mono<T> {
    /// Wrap a future resolving to a value, `None` for empty, or an error.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = StreamResult<Option<T>>> + Send + 'static,
    {
        Self {
            inner: Box::pin(fut),
        }
    }

    /// Emits `value` then completes.
    pub fn just(value: T) -> Self {
        Self::just_or_empty(Some(value))
    }

    /// Completes without a value.
    pub fn empty() -> Self {
        Self::just_or_empty(None)
    }

    /// Emits `value` if present, otherwise completes empty.
    pub fn just_or_empty(value: Option<T>) -> Self {
        Self::from_future(future::ready(Ok(value)))
    }

    /// Fails with `error`.
    pub fn error(error: StreamError) -> Self {
        Self::from_future(future::ready(Err(error)))
    }

    /// Transform the value, if any.
    pub fn map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Mono::from_future(async move { Ok(self.inner.await?.map(f)) })
    }

    /// Turns a value failing `predicate` into an empty completion.
    pub fn filter<F>(self, predicate: F) -> Mono<T>
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        Mono::from_future(async move { Ok(self.inner.await?.filter(predicate)) })
    }

    /// Continue with the Mono produced from the value.
    pub fn flat_map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Mono<U> + Send + 'static,
    {
        Mono::from_future(async move {
            match self.inner.await? {
                Some(value) => f(value).inner.await,
                None => Ok(None),
            }
        })
    }

    /// Emits `true` if a value was produced, `false` on empty completion.
    pub fn has_element(self) -> Mono<bool> {
        Mono::from_future(async move { Ok(Some(self.inner.await?.is_some())) })
    }

    /// Emits `fallback` on empty completion.
    pub fn default_if_empty(self, fallback: T) -> Mono<T> {
        Mono::from_future(async move { Ok(Some(self.inner.await?.unwrap_or(fallback))) })
    }

    /// Peek at the value before it is emitted.
    pub fn do_on_next<F>(self, f: F) -> Mono<T>
    where
        F: FnOnce(&T) + Send + 'static,
    {
        Mono::from_future(async move {
            let value = self.inner.await?;
            if let Some(v) = &value {
                f(v);
            }
            Ok(value)
        })
    }

    /// Peek at the error before it is signalled.
    pub fn do_on_error<F>(self, f: F) -> Mono<T>
    where
        F: FnOnce(&StreamError) + Send + 'static,
    {
        Mono::from_future(async move {
            let result = self.inner.await;
            if let Err(error) = &result {
                f(error);
            }
            result
        })
    }

    /// Emit a `tracing` event for each signal under `category`.
    pub fn log(self, category: impl Into<String>) -> Mono<T>
    where
        T: Debug,
    {
        let category = category.into();
        Mono::from_future(async move {
            let result = self.inner.await;
            match &result {
                Ok(Some(value)) => {
                    tracing::info!(category = %category, "onNext({:?})", value);
                    tracing::info!(category = %category, "onComplete");
                }
                Ok(None) => tracing::info!(category = %category, "onComplete"),
                Err(error) => tracing::warn!(category = %category, %error, "onError"),
            }
            result
        })
    }

    /// View as a Flux of zero or one element.
    pub fn into_flux(self) -> Flux<T> {
        Flux::from_results(
            stream::once(self.inner).filter_map(|result| future::ready(result.transpose())),
        )
    }

    /// Wait on the calling thread for the Mono to terminate.
    ///
    /// Allowed outside a runtime and on `spawn_blocking` threads. On a
    /// runtime worker thread it returns
    /// [`StreamError::BlockingInAsyncContext`]; use `.await` there.
    pub fn block(self) -> StreamResult<Option<T>> {
        block_on(self.inner, None)
    }

    /// Like [`Mono::block`], failing with [`StreamError::Timeout`] once
    /// `timeout` elapses.
    pub fn block_timeout(self, timeout: Duration) -> StreamResult<Option<T>> {
        block_on(self.inner, Some(timeout))
    }

    /// Invoke `on_next` with the value, if any.
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
        self.into_flux().subscribe_with(subscriber)
    }
}

impl<T> IntoFuture for Mono<T> {
    type Output = StreamResult<Option<T>>;
    type IntoFuture = BoxFuture<'static, StreamResult<Option<T>>>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

impl<T> Debug for Mono<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mono").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_three_terminal_states() {
        assert_eq!(Mono::just(1).await, Ok(Some(1)));
        assert_eq!(Mono::<i32>::empty().await, Ok(None));
        assert_eq!(
            Mono::<i32>::error(StreamError::NoSuchElement).await,
            Err(StreamError::NoSuchElement)
        );
    }

    #[tokio::test]
    async fn test_filter_turns_value_into_empty() {
        assert_eq!(Mono::just(3).filter(|n| *n > 5).await, Ok(None));
        assert_eq!(Mono::just(7).filter(|n| *n > 5).await, Ok(Some(7)));
    }

    #[tokio::test]
    async fn test_flat_map_and_default() {
        let chained = Mono::just(2).flat_map(|n| Mono::just(n * 21)).await;
        assert_eq!(chained, Ok(Some(42)));

        let skipped = Mono::<i32>::empty().flat_map(|n| Mono::just(n + 1)).await;
        assert_eq!(skipped, Ok(None));

        assert_eq!(Mono::empty().default_if_empty("none").await, Ok(Some("none")));
    }

    #[tokio::test]
    async fn test_has_element_propagates_error() {
        let result = Mono::<i32>::error("broken".into()).has_element().await;
        assert_eq!(result, Err(StreamError::Other("broken".into())));
    }

    #[tokio::test]
    async fn test_do_on_error_observes_without_recovering() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result = Mono::<i32>::error(StreamError::TooManyElements)
            .do_on_error(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Err(StreamError::TooManyElements));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_into_flux_cardinality() {
        assert_eq!(Mono::just('x').into_flux().count().await, Ok(Some(1)));
        assert_eq!(Mono::<char>::empty().into_flux().count().await, Ok(Some(0)));
    }

    #[test]
    fn test_block_outside_runtime() {
        assert_eq!(Mono::just("v").block(), Ok(Some("v")));
        assert_eq!(Mono::<&str>::empty().block(), Ok(None));
    }

    #[test]
    fn test_block_timeout() {
        let slow = Mono::from_future(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(1))
        });
        assert_eq!(
            slow.block_timeout(Duration::from_millis(20)),
            Err(StreamError::Timeout(20))
        );
    }

    #[tokio::test]
    async fn test_block_inside_runtime_is_rejected() {
        assert_eq!(
            Mono::just(1).block(),
            Err(StreamError::BlockingInAsyncContext)
        );
    }

    #[test]
    fn test_subscribe_empty_never_calls_consumer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let subscription = Mono::<i32>::empty().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(subscription.is_finished());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
