//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use reactive_people::prelude::*;
//! ```

// Configuration
pub use crate::config::{Config, RepositoryConfig};

// Domain
pub use crate::person::Person;
pub use crate::repository::{InMemoryPersonRepository, PersonRepository};
pub use crate::store::PersonStore;

// Publishers
pub use crate::flux::Flux;
pub use crate::mono::Mono;
pub use crate::signal::{LambdaSubscriber, Signal, Subscriber, Subscription, Termination};
pub use crate::sink::{create_sink, FluxSink, SinkBuilder};
pub use crate::verifier::StepVerifier;

// Errors
pub use crate::error::{
    ReactiveError, ReactiveResult, StoreError, StoreResult, StreamError, StreamResult,
    VerificationError,
};
