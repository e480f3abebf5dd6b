//! Example: consuming the person repository reactively
//!
//! Walks through the ways a caller can consume `Mono` and `Flux` results:
//! blocking reads, callback subscription, composition and the difference
//! between an empty lookup and a failed `single()`.
//!
//! Run with `RUST_LOG=info cargo run --example person_stream` to also see
//! the signal log of the verbose repository.

use reactive_people::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> ReactiveResult<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Reactive Person Repository ===\n");

    let repository = InMemoryPersonRepository::with_config(
        PersonStore::new(),
        RepositoryConfig::new().with_name("people").verbose(),
    )?;

    // Mono: block for the value
    if let Some(person) = repository.get_by_id(2).block()? {
        println!("get_by_id(2).block()      -> {}", person);
    }

    // Mono: subscribe with a callback
    repository
        .get_by_id(1)
        .subscribe(|person| println!("get_by_id(1).subscribe   -> {}", person));

    // Mono: map before consuming
    repository
        .get_by_id(6)
        .map(|person| person.first_name)
        .subscribe(|name| println!("get_by_id(6).map         -> {}", name));

    // Absent ids complete empty
    println!(
        "get_by_id(8).has_element -> {:?}",
        repository.get_by_id(8).has_element().block()?
    );

    // Flux: first element, every element, mapped elements
    if let Some(person) = repository.find_all().block_first()? {
        println!("\nfind_all().block_first()  -> {}", person);
    }

    println!("find_all().subscribe:");
    repository
        .find_all()
        .subscribe(|person| println!("    {}", person));

    let names = repository
        .find_all()
        .map(|person| person.full_name())
        .collect_list()
        .block()?
        .unwrap_or_default();
    println!("find_all().collect_list() -> {}", names.join(", "));

    repository
        .find_all()
        .filter(|person| person.first_name == "Fiona")
        .subscribe(|person| println!("filter(Fiona)             -> {}", person));

    // Exactly-one on an empty selection travels the error channel
    let subscription = repository
        .find_all()
        .filter(|person| person.id == 0)
        .single()
        .do_on_error(|error| println!("\nError occurred in flux: {}", error))
        .subscribe(|person| println!("unexpected: {}", person));

    println!("single() on no match finished: {}", subscription.is_finished());

    Ok(())
}
