//! Step-by-step verification of publishers in tests.

use std::fmt::Debug;

use futures::StreamExt;

use crate::error::{StreamError, VerificationError};
use crate::flux::Flux;

type Check<T> = Box<dyn FnOnce(&T) -> Result<(), String> + Send>;

enum Step<T> {
    Next(Check<T>),
    Count(usize),
}

/// Scripted expectations over the signals of a `Mono` or `Flux`.
///
/// Expectations are checked in order when a `verify_*` method is awaited.
///
/// # Example
///
/// ```rust
/// use reactive_people::{Flux, StepVerifier};
///
/// # async fn example() {
/// StepVerifier::create(Flux::from_iterable(vec![1, 2, 3]))
///     .expect_next(1)
///     .expect_next_count(2)
///     .verify_complete()
///     .await
///     .unwrap();
/// # }
/// ```
pub struct StepVerifier<T> {
    source: Flux<T>,
    steps: Vec<Step<T>>,
}

impl<T: Debug + Send + 'static> StepVerifier<T> {
    /// Start verifying a Flux or Mono.
    pub fn create(publisher: impl Into<Flux<T>>) -> Self {
        Self {
            source: publisher.into(),
            steps: Vec::new(),
        }
    }

    /// Expect the next value to equal `expected`.
    pub fn expect_next(self, expected: T) -> Self
    where
        T: PartialEq,
    {
        self.push(Step::Next(Box::new(move |actual: &T| {
            if *actual == expected {
                Ok(())
            } else {
                Err(format!("expected onNext({expected:?}), got onNext({actual:?})"))
            }
        })))
    }

    /// Expect the next value to satisfy `predicate`.
    pub fn expect_next_matches<F>(self, predicate: F) -> Self
    where
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.push(Step::Next(Box::new(move |actual: &T| {
            if predicate(actual) {
                Ok(())
            } else {
                Err(format!("onNext({actual:?}) did not match the predicate"))
            }
        })))
    }

    /// Expect `count` more values, whatever they are.
    pub fn expect_next_count(self, count: usize) -> Self {
        self.push(Step::Count(count))
    }

    fn push(mut self, step: Step<T>) -> Self {
        self.steps.push(step);
        self
    }

    /// Run the expectations, then expect completion.
    pub async fn verify_complete(self) -> Result<(), VerificationError> {
        let (mut source, index) = self.run_steps().await?;
        match source.next().await {
            None => Ok(()),
            Some(Ok(value)) => Err(VerificationError::UnexpectedNext {
                index,
                value: format!("{value:?}"),
            }),
            Some(Err(error)) => Err(VerificationError::UnexpectedError {
                index,
                expected: "onComplete".to_string(),
                error,
            }),
        }
    }

    /// Run the expectations, then expect an error and return it.
    pub async fn verify_error(self) -> Result<StreamError, VerificationError> {
        self.terminal_error().await.map(|(error, _)| error)
    }

    /// Run the expectations, then expect an error satisfying `predicate`.
    pub async fn verify_error_matches<F>(self, predicate: F) -> Result<(), VerificationError>
    where
        F: FnOnce(&StreamError) -> bool,
    {
        let (error, index) = self.terminal_error().await?;
        if predicate(&error) {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                index,
                message: format!("onError({error}) did not match the predicate"),
            })
        }
    }

    async fn terminal_error(self) -> Result<(StreamError, usize), VerificationError> {
        let (mut source, index) = self.run_steps().await?;
        match source.next().await {
            Some(Err(error)) => Ok((error, index)),
            Some(Ok(value)) => Err(VerificationError::UnexpectedNext {
                index,
                value: format!("{value:?}"),
            }),
            None => Err(VerificationError::UnexpectedComplete {
                index,
                expected: "onError".to_string(),
            }),
        }
    }

    async fn run_steps(self) -> Result<(Flux<T>, usize), VerificationError> {
        let mut source = self.source;
        let mut index = 0;
        for step in self.steps {
            match step {
                Step::Next(check) => {
                    let value = pull(&mut source, index, "onNext").await?;
                    check(&value).map_err(|message| VerificationError::Mismatch { index, message })?;
                    index += 1;
                }
                Step::Count(count) => {
                    let expected = format!("{count} onNext signals");
                    for _ in 0..count {
                        pull(&mut source, index, &expected).await?;
                        index += 1;
                    }
                }
            }
        }
        Ok((source, index))
    }
}

async fn pull<T: Send + 'static>(
    source: &mut Flux<T>,
    index: usize,
    expected: &str,
) -> Result<T, VerificationError> {
    match source.next().await {
        Some(Ok(value)) => Ok(value),
        Some(Err(error)) => Err(VerificationError::UnexpectedError {
            index,
            expected: expected.to_string(),
            error,
        }),
        None => Err(VerificationError::UnexpectedComplete {
            index,
            expected: expected.to_string(),
        }),
    }
}
