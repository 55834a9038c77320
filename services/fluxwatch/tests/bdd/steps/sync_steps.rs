//! BDD step definitions for sync.feature

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio::time::timeout;

use crate::world::FluxwatchWorld;

#[given("the store discards stale responses")]
fn discard_stale(world: &mut FluxwatchWorld) {
    assert!(world.store.is_none(), "store already built");
    world.config.discard_stale_responses = true;
}

#[given("the dashboard has refreshed")]
async fn has_refreshed(world: &mut FluxwatchWorld) {
    let _ = world.store().sync(false).await;
}

#[when("the dashboard refreshes")]
async fn refreshes(world: &mut FluxwatchWorld) {
    let _ = world.store().sync(false).await;
}

#[when("the dashboard syncs silently")]
async fn syncs_silently(world: &mut FluxwatchWorld) {
    let _ = world.store().sync(true).await;
}

#[when("a visible refresh is started and its answer is held")]
async fn held_refresh(world: &mut FluxwatchWorld) {
    let backend = world.backend();
    let store = world.store();
    let before = backend.count("GET");
    world.held_gate = Some(backend.hold_next_list());

    let ticket = store.begin_sync(false).await;
    let task_store = Arc::clone(&store);
    world.held_sync = Some(tokio::spawn(async move {
        task_store.complete_sync(ticket).await
    }));

    while backend.count("GET") == before {
        tokio::task::yield_now().await;
    }
}

#[when("a visible refresh is abandoned before its answer arrives")]
async fn abandoned_refresh(world: &mut FluxwatchWorld) {
    let backend = world.backend();
    let store = world.store();
    let _gate = backend.hold_next_list();

    let abandoned = timeout(Duration::from_millis(50), store.sync(false)).await;
    assert!(abandoned.is_err(), "refresh settled before the timeout");
    tokio::task::yield_now().await;
}

#[when("the held answer is released")]
async fn release_held(world: &mut FluxwatchWorld) {
    world.held_gate.take().expect("no held answer").notify_one();
    let handle = world.held_sync.take().expect("no held sync");
    let _ = handle.await.expect("held sync panicked");
}

#[then(regex = r"^the dashboard lists (\d+) resources?$")]
async fn lists_resources(world: &mut FluxwatchWorld, count: usize) {
    let store = world.store();
    assert_eq!(store.read().await.resources.len(), count);
}

#[then("no error is shown")]
async fn no_error(world: &mut FluxwatchWorld) {
    let store = world.store();
    let error = store.read().await.error.clone();
    assert!(error.is_none(), "unexpected error: {:?}", error);
}

#[then("an error is shown")]
async fn some_error(world: &mut FluxwatchWorld) {
    let store = world.store();
    assert!(store.read().await.error.is_some());
}

#[then(expr = "the error {string} is shown")]
async fn error_is(world: &mut FluxwatchWorld, message: String) {
    let store = world.store();
    assert_eq!(store.read().await.error.as_deref(), Some(message.as_str()));
}

#[then("the loading indicator is shown")]
async fn loading_shown(world: &mut FluxwatchWorld) {
    let store = world.store();
    assert!(store.read().await.loading());
}

#[then("the loading indicator is hidden")]
async fn loading_hidden(world: &mut FluxwatchWorld) {
    let store = world.store();
    assert!(!store.read().await.loading());
}
