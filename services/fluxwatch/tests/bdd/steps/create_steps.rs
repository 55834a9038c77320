//! BDD step definitions for create.feature

use cucumber::{then, when};

use fluxwatch::resource::{Draft, DraftField};

use crate::world::FluxwatchWorld;

#[when(
    expr = "the user fills the form with name {string}, type {string}, url {string} and region {string}"
)]
fn fill_form(world: &mut FluxwatchWorld, name: String, kind: String, url: String, region: String) {
    let mut submitted = Draft::default();
    let view = world.view();
    for (field, value) in [
        (DraftField::Name, &name),
        (DraftField::Type, &kind),
        (DraftField::Url, &url),
        (DraftField::Region, &region),
    ] {
        view.set_field(field, value);
        submitted.set(field, value);
    }
    world.submitted = Some(submitted);
}

#[when("the user submits the form")]
async fn submit_form(world: &mut FluxwatchWorld) {
    let result = world.view().submit().await;
    world.submit_result = Some(result);
}

#[then("the submit fails")]
fn submit_fails(world: &mut FluxwatchWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(result.is_err(), "submit succeeded: {:?}", result);
}

#[then("the dashboard lists a resource matching the submitted form")]
async fn lists_submitted(world: &mut FluxwatchWorld) {
    let submitted = world.submitted.clone().expect("form never filled");
    let store = world.store();
    let state = store.read().await;
    assert!(
        state.resources.iter().any(|r| submitted.matches(r)),
        "{:?} not in {:?}",
        submitted,
        state.resources
    );
}

#[then("the form is reset")]
fn form_reset(world: &mut FluxwatchWorld) {
    assert_eq!(world.view().draft(), &Draft::default());
}

#[then("the form is not busy")]
async fn form_not_busy(world: &mut FluxwatchWorld) {
    assert!(!world.view().adding().await);
}

#[then(expr = "the form still holds name {string} and url {string}")]
fn form_holds(world: &mut FluxwatchWorld, name: String, url: String) {
    let draft = world.view().draft();
    assert_eq!(draft.name, name);
    assert_eq!(draft.url, url);
}
