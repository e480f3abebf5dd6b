//! # Reactive People
//!
//! A read-only person repository whose lookups return reactive publishers:
//! [`Mono`] for at most one value and [`Flux`] for a sequence of values.
//!
//! ## Overview
//!
//! - **Store**: an immutable, ordered set of [`Person`] records with
//!   unique ids, built once and shared by reference
//! - **Repository**: `get_by_id` and `find_all` over the store
//! - **Publishers**: lazily evaluated `Mono`/`Flux` with composition
//!   operators, blocking reads, `.await`, and callback subscription
//!
//! ## Absent versus failed
//!
//! A missing id is not an error. `get_by_id` completes empty, which shows up
//! as `Ok(None)`. Asking a Flux for exactly one element with
//! [`Flux::single`] is different: an empty source fails with
//! [`StreamError::NoSuchElement`] through the error channel.
//!
//! ## Quick Start
//!
//! ```rust
//! use reactive_people::prelude::*;
//!
//! let repository = InMemoryPersonRepository::new();
//!
//! // Single value, blocking read
//! let sam = repository.get_by_id(3).block().unwrap();
//! assert_eq!(sam.map(|p| p.last_name), Some("Axe".to_string()));
//!
//! // Sequence, composed then collected
//! let first_names = repository
//!     .find_all()
//!     .map(|p| p.first_name)
//!     .collect_list()
//!     .block()
//!     .unwrap()
//!     .unwrap_or_default();
//! assert_eq!(first_names.len(), 6);
//!
//! // Exactly-one on an empty selection is an error
//! let nobody = repository.find_all().filter(|p| p.id == 0).single().block();
//! assert_eq!(nobody, Err(StreamError::NoSuchElement));
//! ```

mod blocking;
mod config;
mod error;
mod flux;
mod mono;
mod person;
mod repository;
mod signal;
mod store;
mod verifier;

pub mod prelude;
pub mod sink;

// Re-export core types
pub use config::{Config, RepositoryConfig, DEFAULT_BUFFER_SIZE};
pub use error::{
    ReactiveError, ReactiveResult, StoreError, StoreResult, StreamError, StreamResult,
    VerificationError,
};
pub use flux::Flux;
pub use mono::Mono;
pub use person::Person;
pub use repository::{InMemoryPersonRepository, PersonRepository};
pub use signal::{LambdaSubscriber, Signal, Subscriber, Subscription, Termination};
pub use sink::{create_sink, FluxSink, SinkBuilder};
pub use store::{seed_people, PersonStore};
pub use verifier::StepVerifier;
