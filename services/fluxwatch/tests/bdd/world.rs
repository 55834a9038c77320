//! BDD test world for the fluxwatch client

use std::sync::Arc;

use cucumber::World;
use fluxwatch::io::HttpClient;
use fluxwatch::onboarding::Onboarding;
use fluxwatch::resource::{Draft, Resource};
use fluxwatch::store::{ResourceStore, SyncOutcome};
use fluxwatch::view::DashboardView;
use fluxwatch::Config;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::steps::backend_steps::FakeBackend;
use crate::steps::http_steps::LiveBackend;

#[derive(Debug, Default, World)]
pub struct FluxwatchWorld {
    pub config: Config,
    pub backend: Option<Arc<FakeBackend>>,

    // Store and view testing
    pub store: Option<Arc<ResourceStore>>,
    pub view: Option<DashboardView>,
    pub held_gate: Option<Arc<Notify>>,
    pub held_sync: Option<JoinHandle<fluxwatch::Result<SyncOutcome>>>,
    pub list_requests_at_unmount: Option<usize>,

    // Form testing
    pub submitted: Option<Draft>,
    pub submit_result: Option<fluxwatch::Result<Option<Resource>>>,
    pub onboarding: Option<Onboarding>,

    // Live HTTP testing
    pub live_backend: Option<LiveBackend>,
    pub http_listing: Option<fluxwatch::Result<Vec<Resource>>>,
}

impl FluxwatchWorld {
    pub fn backend(&mut self) -> Arc<FakeBackend> {
        Arc::clone(self.backend.get_or_insert_with(Default::default))
    }

    /// The mounted view's store, or a standalone one built on first use
    pub fn store(&mut self) -> Arc<ResourceStore> {
        if let Some(view) = &self.view {
            return Arc::clone(view.store());
        }
        if let Some(store) = &self.store {
            return Arc::clone(store);
        }
        let http: Arc<dyn HttpClient> = self.backend();
        let store = Arc::new(ResourceStore::new(
            &self.config,
            http,
            CancellationToken::new(),
        ));
        self.store = Some(Arc::clone(&store));
        store
    }

    pub fn view(&mut self) -> &mut DashboardView {
        self.view.as_mut().expect("dashboard not mounted")
    }
}
