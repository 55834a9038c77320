//! BDD step definitions for http.feature
//!
//! Runs the production reqwest client against a small axum server that
//! speaks the resource contract.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cucumber::{given, then, when};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use fluxwatch::resource::DraftField;
use fluxwatch::{Fluxwatch, FluxwatchBuilder};

use crate::world::FluxwatchWorld;

#[derive(Clone, Default)]
struct BackendState {
    resources: Arc<Mutex<Vec<Value>>>,
    failing: bool,
}

async fn list_resources(State(state): State<BackendState>) -> Response {
    if state.failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let resources = state.resources.lock().unwrap().clone();
    Json(Value::Array(resources)).into_response()
}

async fn create_resource(
    State(state): State<BackendState>,
    Json(mut body): Json<Value>,
) -> Response {
    if state.failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let mut resources = state.resources.lock().unwrap();
    body["_id"] = json!(format!("{:024x}", resources.len() + 1));
    resources.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

/// A resource backend listening on an ephemeral local port
#[derive(Debug)]
pub struct LiveBackend {
    pub base_url: String,
    shutdown: CancellationToken,
    server: JoinHandle<()>,
}

impl LiveBackend {
    async fn start(failing: bool) -> Self {
        let state = BackendState {
            failing,
            ..BackendState::default()
        };
        let app = Router::new()
            .route("/api/resources", get(list_resources).post(create_resource))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to port 0");
        let addr = listener.local_addr().expect("Failed to read local address");
        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await;
        });

        Self {
            base_url: format!("http://{}", addr),
            shutdown,
            server,
        }
    }
}

impl Drop for LiveBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.server.abort();
    }
}

fn client(world: &FluxwatchWorld) -> Fluxwatch {
    FluxwatchBuilder::new(world.config.clone())
        .build()
        .expect("client should build")
}

async fn start_live(world: &mut FluxwatchWorld, failing: bool) {
    let backend = LiveBackend::start(failing).await;
    world.config.backend_url = backend.base_url.clone();
    world.live_backend = Some(backend);
}

#[given("a live backend with no resources")]
async fn live_backend(world: &mut FluxwatchWorld) {
    start_live(world, false).await;
}

#[given("a live backend that fails every request")]
async fn failing_live_backend(world: &mut FluxwatchWorld) {
    start_live(world, true).await;
}

#[when(expr = "a resource named {string} with url {string} is registered over HTTP")]
async fn register_over_http(world: &mut FluxwatchWorld, name: String, url: String) {
    let mut flow = client(world).onboarding();
    flow.set_field(DraftField::Name, &name);
    flow.set_field(DraftField::Url, &url);
    flow.submit().await.expect("registration should succeed");
}

#[when(expr = "the resources are listed over HTTP with query {string}")]
async fn list_over_http(world: &mut FluxwatchWorld, query: String) {
    let listing = client(world).list(&query).await;
    world.http_listing = Some(listing);
}

#[then(expr = "the HTTP listing holds exactly {string}")]
fn listing_holds(world: &mut FluxwatchWorld, expected: String) {
    let listing = world.http_listing.as_ref().expect("nothing listed");
    let names: Vec<&str> = listing
        .as_ref()
        .expect("listing failed")
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names.join(", "), expected);
}

#[then(expr = "the HTTP listing fails with {string}")]
fn listing_fails(world: &mut FluxwatchWorld, expected: String) {
    let listing = world.http_listing.as_ref().expect("nothing listed");
    match listing {
        Err(e) => assert_eq!(e.user_message(), expected),
        Ok(resources) => panic!("listing succeeded with {:?}", resources),
    }
}
