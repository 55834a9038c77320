//! Dashboard view controller
//!
//! A [`DashboardView`] is one mounted dashboard: it owns the create form,
//! forwards user intent (refresh, search, submit) to its [`ResourceStore`]
//! and keeps the background poll alive for exactly as long as it exists.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::poller::poll_loop;
use crate::resource::{Draft, DraftField, Resource};
use crate::state::SyncState;
use crate::store::{ResourceStore, SyncOutcome};

/// What the dashboard is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// A visible refresh is in flight
    Loading,
    /// The last sync or create failed; earlier resources are still readable
    Error(String),
    Populated,
    /// Nothing is monitored yet; the view invites adding a first resource
    Empty,
}

impl ViewState {
    pub fn of(state: &SyncState) -> Self {
        if state.loading() {
            ViewState::Loading
        } else if let Some(message) = &state.error {
            ViewState::Error(message.clone())
        } else if state.resources.is_empty() {
            ViewState::Empty
        } else {
            ViewState::Populated
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewState::Loading => write!(f, "Loading"),
            ViewState::Error(message) => write!(f, "Error: {}", message),
            ViewState::Populated => write!(f, "Populated"),
            ViewState::Empty => write!(f, "Empty"),
        }
    }
}

pub struct DashboardView {
    store: Arc<ResourceStore>,
    form: Draft,
    cancel: CancellationToken,
    poller: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for DashboardView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardView")
            .field("store", &self.store)
            .field("form", &self.form)
            .finish()
    }
}

impl DashboardView {
    /// Mount a view over `store`: start the initial visible sync and the
    /// silent poll every `poll_interval`.
    ///
    /// The view enters `Loading` before this returns. The store's
    /// cancellation token scopes the poll; [`unmount`](Self::unmount) or
    /// dropping the view fires it.
    pub async fn mount(store: Arc<ResourceStore>, poll_interval: Duration) -> Self {
        tracing::info!(
            "Mounting dashboard view (poll every {}s)",
            poll_interval.as_secs()
        );
        let cancel = store.cancellation_token().clone();
        let initial = store.begin_sync(false).await;
        let poller = tokio::spawn(poll_loop(
            Arc::clone(&store),
            initial,
            poll_interval,
            cancel.clone(),
        ));

        Self {
            store,
            form: Draft::default(),
            cancel,
            poller: Some(poller),
        }
    }

    /// Stop polling and wait for the poll task to wind down
    pub async fn unmount(mut self) {
        tracing::info!("Unmounting dashboard view");
        self.cancel.cancel();
        if let Some(poller) = self.poller.take() {
            let _ = poller.await;
        }
    }

    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    pub async fn snapshot(&self) -> SyncState {
        self.store.snapshot().await
    }

    pub async fn state(&self) -> ViewState {
        ViewState::of(&*self.store.read().await)
    }

    pub async fn loading(&self) -> bool {
        self.store.read().await.loading()
    }

    /// True while a submit from this view (or any holder of the store) is
    /// in flight; the form should be disabled
    pub async fn adding(&self) -> bool {
        self.store.read().await.adding
    }

    /// Revision stream: one notification per state mutation
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Manual refresh; shows the loading indicator
    pub async fn refresh(&self) -> crate::Result<SyncOutcome> {
        self.store.sync(false).await
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        self.store.set_query(query).await;
    }

    pub async fn filtered(&self) -> Vec<Resource> {
        self.store.filtered().await
    }

    /// Resources exist but none matches the query
    pub async fn filtered_is_empty(&self) -> bool {
        let state = self.store.read().await;
        !state.resources.is_empty()
            && crate::filter::filter(&state.resources, &state.query).is_empty()
    }

    pub fn draft(&self) -> &Draft {
        &self.form
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) {
        self.form.set(field, value);
    }

    /// Submit the form. Success resets it to defaults; failure leaves the
    /// user's input in place for correction.
    pub async fn submit(&mut self) -> crate::Result<Option<Resource>> {
        let created = self.store.create(&self.form).await?;
        self.form.reset();
        Ok(created)
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}
