//! Driving publishers from synchronous code.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::{Builder, Handle, Runtime};

use crate::error::{StreamError, StreamResult};

/// Whether a Tokio runtime is reachable from the calling thread.
///
/// True on worker threads, on `spawn_blocking` threads and under a
/// `Runtime::enter` guard.
pub(crate) fn in_async_context() -> bool {
    Handle::try_current().is_ok()
}

/// A throwaway current-thread runtime for one blocking call.
pub(crate) fn local_runtime() -> StreamResult<Runtime> {
    Ok(Builder::new_current_thread().enable_time().build()?)
}

/// Run `fut` to completion on the calling thread, optionally bounded by `timeout`.
///
/// Outside any runtime a private current-thread runtime drives the future.
/// On a thread that can see a runtime without running it (`spawn_blocking`,
/// `Runtime::enter`) that runtime's handle drives it. Only runtime worker
/// threads are refused, since blocking there stalls every task they host.
pub(crate) fn block_on<F, R>(fut: F, timeout: Option<Duration>) -> StreamResult<R>
where
    F: Future<Output = StreamResult<R>>,
{
    let bounded = async move {
        match timeout {
            None => fut.await,
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| StreamError::Timeout(limit.as_millis() as u64))?,
        }
    };

    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => return local_runtime()?.block_on(bounded),
    };

    // Handle::block_on panics before polling when called on a worker thread.
    // Panics raised while polling are caught separately and re-raised.
    let polled = AssertUnwindSafe(bounded).catch_unwind();
    match panic::catch_unwind(AssertUnwindSafe(|| handle.block_on(polled))) {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => panic::resume_unwind(payload),
        Err(_) => {
            tracing::debug!("refusing to block a runtime worker thread");
            Err(StreamError::BlockingInAsyncContext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        let value = block_on(async { Ok::<_, StreamError>(7) }, None);
        assert_eq!(value, Ok(7));
    }

    #[test]
    fn test_block_on_times_out() {
        let result = block_on(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StreamError>(())
            },
            Some(Duration::from_millis(10)),
        );
        assert_eq!(result, Err(StreamError::Timeout(10)));
    }

    #[tokio::test]
    async fn test_block_on_refuses_inside_runtime() {
        let result = block_on(async { Ok::<_, StreamError>(1) }, None);
        assert_eq!(result, Err(StreamError::BlockingInAsyncContext));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_on_refuses_on_worker_thread() {
        let result = tokio::spawn(async { block_on(async { Ok::<_, StreamError>(1) }, None) })
            .await
            .unwrap();
        assert_eq!(result, Err(StreamError::BlockingInAsyncContext));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_on_allowed_on_blocking_thread() {
        let result = tokio::task::spawn_blocking(|| {
            block_on(
                async {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok::<_, StreamError>(4)
                },
                Some(Duration::from_secs(5)),
            )
        })
        .await
        .unwrap();
        assert_eq!(result, Ok(4));
    }

    #[test]
    fn test_block_on_under_entered_runtime() {
        let runtime = local_runtime().unwrap();
        let _guard = runtime.enter();

        assert!(in_async_context());
        assert_eq!(block_on(async { Ok::<_, StreamError>(3) }, None), Ok(3));
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn test_block_on_propagates_panics_from_the_future() {
        let runtime = local_runtime().unwrap();
        let _guard = runtime.enter();

        let explode = true;
        let _ = block_on(
            async move {
                if explode {
                    panic!("boom");
                }
                Ok::<_, StreamError>(())
            },
            None,
        );
    }
}
