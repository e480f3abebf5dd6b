//! Channel-backed programmatic Flux creation.
//!
//! A [`FluxSink`] pushes signals into a bounded channel whose receiving end
//! is exposed as a [`Flux`]. This is the way to bridge callback- or
//! task-driven producers into a publisher.

use std::marker::PhantomData;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::{Config, DEFAULT_BUFFER_SIZE};
use crate::error::{StreamError, StreamResult};
use crate::flux::Flux;

/// Producer half of a sink-backed Flux.
///
/// The Flux completes once every clone of the sink has been dropped or
/// [`complete`](FluxSink::complete)d.
#[derive(Debug)]
pub struct FluxSink<T> {
    tx: mpsc::Sender<StreamResult<T>>,
}

impl<T> FluxSink<T> {
    fn new(tx: mpsc::Sender<StreamResult<T>>) -> Self {
        Self { tx }
    }

    /// Emit a value.
    ///
    /// Returns `Err(value)` if the Flux was dropped.
    pub async fn next(&self, value: T) -> Result<(), T> {
        match self.tx.reserve().await {
            Ok(permit) => {
                permit.send(Ok(value));
                Ok(())
            }
            Err(_) => Err(value),
        }
    }

    /// Emit a value without waiting for channel capacity.
    ///
    /// Returns `Err(value)` if the channel is full or the Flux was dropped.
    pub fn try_next(&self, value: T) -> Result<(), T> {
        match self.tx.try_reserve() {
            Ok(permit) => {
                permit.send(Ok(value));
                Ok(())
            }
            Err(_) => Err(value),
        }
    }

    /// Terminate the Flux with `error`.
    ///
    /// Other clones of this sink can no longer deliver values afterwards.
    pub async fn error(self, error: StreamError) {
        if self.tx.send(Err(error)).await.is_err() {
            tracing::debug!("error signal dropped: flux already gone");
        }
    }

    /// Complete from this producer's side.
    pub fn complete(self) {
        drop(self);
    }

    /// Whether the consuming Flux has been dropped.
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_closed()
    }

    /// Remaining channel capacity.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }
}

impl<T> Clone for FluxSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Builder for sink-backed fluxes.
///
/// # Example
///
/// ```rust
/// use reactive_people::SinkBuilder;
///
/// # async fn example() {
/// let (sink, flux) = SinkBuilder::<u32>::new().buffer_size(8).build();
///
/// tokio::spawn(async move {
///     for n in 0..3 {
///         sink.next(n).await.unwrap();
///     }
/// });
///
/// assert_eq!(flux.collect_list().await, Ok(Some(vec![0, 1, 2])));
/// # }
/// ```
pub struct SinkBuilder<T> {
    buffer_size: usize,
    _marker: PhantomData<T>,
}

impl<T: Send + 'static> SinkBuilder<T> {
    /// Create a builder with the default buffer size.
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            _marker: PhantomData,
        }
    }

    /// Take the buffer size from a configuration.
    pub fn from_config(config: &impl Config) -> Self {
        Self::new().buffer_size(config.buffer_size())
    }

    /// Set the channel capacity. Default is 100; zero is raised to one.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Returns a tuple of (sink, flux).
    pub fn build(self) -> (FluxSink<T>, Flux<T>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        (FluxSink::new(tx), Flux::from_results(ReceiverStream::new(rx)))
    }
}

impl<T: Send + 'static> Default for SinkBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a sink-backed Flux with the default buffer size.
pub fn create_sink<T: Send + 'static>() -> (FluxSink<T>, Flux<T>) {
    SinkBuilder::<T>::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryConfig;

    #[tokio::test]
    async fn test_values_then_completion() {
        let (sink, flux) = SinkBuilder::<&str>::new().buffer_size(4).build();

        sink.next("a").await.unwrap();
        sink.next("b").await.unwrap();
        sink.complete();

        assert_eq!(flux.collect_list().await, Ok(Some(vec!["a", "b"])));
    }

    #[tokio::test]
    async fn test_error_terminates() {
        let (sink, flux) = create_sink::<u8>();
        let other = sink.clone();

        sink.next(1).await.unwrap();
        sink.error(StreamError::Other("producer failed".into())).await;
        drop(other);

        assert_eq!(
            flux.collect_list().await,
            Err(StreamError::Other("producer failed".into()))
        );
    }

    #[tokio::test]
    async fn test_cancelled_when_flux_dropped() {
        let (sink, flux) = create_sink::<u8>();
        drop(flux);

        assert!(sink.is_cancelled());
        assert_eq!(sink.next(3).await, Err(3));
        assert_eq!(sink.try_next(4), Err(4));
    }

    #[tokio::test]
    async fn test_try_next_full_buffer() {
        let (sink, _flux) = SinkBuilder::<u8>::new().buffer_size(1).build();

        assert!(sink.try_next(1).is_ok());
        assert_eq!(sink.try_next(2), Err(2));
        assert_eq!(sink.capacity(), 0);
    }

    #[test]
    fn test_buffer_from_config() {
        let (sink, _flux) =
            SinkBuilder::<u8>::from_config(&RepositoryConfig::new().with_buffer_size(3)).build();
        assert_eq!(sink.capacity(), 3);
    }
}
