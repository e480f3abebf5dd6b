//! Read-only reactive repository over a [`PersonStore`].
//!
//! Lookups scan the in-memory store synchronously and hand the result back
//! as a publisher. A missing id is an empty [`Mono`], never an error.

use crate::config::{Config, RepositoryConfig};
use crate::error::{ReactiveError, ReactiveResult};
use crate::flux::Flux;
use crate::mono::Mono;
use crate::person::Person;
use crate::store::PersonStore;

/// Reactive read access to people.
///
/// # Example
///
/// ```rust
/// use reactive_people::{InMemoryPersonRepository, PersonRepository};
///
/// let repository = InMemoryPersonRepository::new();
///
/// let fiona = repository.get_by_id(2).block().unwrap();
/// assert_eq!(fiona.map(|p| p.first_name), Some("Fiona".to_string()));
///
/// assert_eq!(repository.get_by_id(8).block(), Ok(None));
/// ```
pub trait PersonRepository: Send + Sync {
    /// The person with `id`, or an empty completion if there is none.
    fn get_by_id(&self, id: i32) -> Mono<Person>;

    /// Every person, in store order.
    ///
    /// Each call returns a fresh Flux that replays the whole store.
    fn find_all(&self) -> Flux<Person>;
}

#[derive(Debug, Clone)]
pub struct InMemoryPersonRepository {
    store: PersonStore,
    config: RepositoryConfig,
}

impl InMemoryPersonRepository {
    /// A repository over the seed data.
    pub fn new() -> Self {
        Self::with_store(PersonStore::new())
    }

    /// A repository over `store` with the default configuration.
    pub fn with_store(store: PersonStore) -> Self {
        Self {
            store,
            config: RepositoryConfig::default(),
        }
    }

    /// Build a repository after validating `config`.
    pub fn with_config(store: PersonStore, config: RepositoryConfig) -> ReactiveResult<Self> {
        config.validate().map_err(ReactiveError::Config)?;
        Ok(Self { store, config })
    }

    /// The backing store.
    pub fn store(&self) -> &PersonStore {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }
}

impl Default for InMemoryPersonRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn get_by_id(&self, id: i32) -> Mono<Person> {
        let found = self.store.find(id).cloned();
        tracing::debug!(id, found = found.is_some(), "get_by_id");

        let mono = Mono::just_or_empty(found);
        if self.config.is_verbose() {
            mono.log(self.config.name())
        } else {
            mono
        }
    }

    fn find_all(&self) -> Flux<Person> {
        let records = self.store.shared();
        tracing::debug!(count = records.len(), "find_all");

        let flux = Flux::from_iterable((0..records.len()).map(move |i| records[i].clone()));
        if self.config.is_verbose() {
            flux.log(self.config.name())
        } else {
            flux
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_by_id_every_seeded_id() {
        let repository = InMemoryPersonRepository::new();
        for id in 1..=6 {
            let person = repository.get_by_id(id).await.unwrap().unwrap();
            assert_eq!(person.id, id);
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_is_empty() {
        let repository = InMemoryPersonRepository::new();
        assert_eq!(repository.get_by_id(0).await, Ok(None));
        assert_eq!(repository.get_by_id(8).await, Ok(None));
    }

    #[tokio::test]
    async fn test_find_all_is_restartable() {
        let repository = InMemoryPersonRepository::new();
        let first = repository.find_all().collect_list().await.unwrap();
        let second = repository.find_all().collect_list().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.map(|people| people.len()), Some(6));
    }

    #[tokio::test]
    async fn test_verbose_repository_still_emits() {
        let repository = InMemoryPersonRepository::with_config(
            PersonStore::new(),
            RepositoryConfig::new().with_name("people").verbose(),
        )
        .unwrap();

        assert_eq!(repository.find_all().count().await, Ok(Some(6)));
        assert!(repository.get_by_id(4).await.unwrap().is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = InMemoryPersonRepository::with_config(
            PersonStore::new(),
            RepositoryConfig::new().with_buffer_size(0),
        );
        assert!(matches!(result, Err(ReactiveError::Config(_))));
    }

    #[test]
    fn test_usable_as_trait_object() {
        let repository: Box<dyn PersonRepository> = Box::new(InMemoryPersonRepository::new());
        assert_eq!(repository.find_all().count().block(), Ok(Some(6)));
    }
}
