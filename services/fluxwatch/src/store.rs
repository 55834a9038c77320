//! Resource store: owns the synchronized list and every write to it
//!
//! Reads replace the whole list with the backend's answer. Overlapping
//! syncs are neither cancelled nor queued, so the response that settles
//! last wins, unless the store was built with `discard_stale_responses`,
//! in which case each sync carries a sequence number and older answers are
//! dropped. Once the store's cancellation token fires (the view was torn
//! down) responses that settle afterwards leave the state alone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLockReadGuard};
use tokio_util::sync::CancellationToken;

use crate::api::ResourceApi;
use crate::config::Config;
use crate::filter;
use crate::io::HttpClient;
use crate::resource::{Draft, Resource};
use crate::state::{new_state_handle, StateHandle, SyncState};
use crate::FluxwatchError;

/// A sync that has been started but not yet settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    silent: bool,
    seq: u64,
}

impl SyncTicket {
    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

/// How a successful read was reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The list was replaced with `count` resources
    Applied { count: usize },
    /// A newer response had already been applied
    Stale,
    /// The store was torn down before the response arrived
    Detached,
}

/// Undoes a state claim (a raised `loading`, a held `adding`) when the
/// future that made it is dropped before it settles
struct ClaimGuard {
    state: StateHandle,
    changes: Arc<watch::Sender<u64>>,
    cancel: CancellationToken,
    release: Option<fn(&mut SyncState)>,
}

impl ClaimGuard {
    /// The claim was released normally
    fn disarm(mut self) {
        self.release = None;
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let Some(release) = self.release.take() else {
            return;
        };
        if self.cancel.is_cancelled() {
            return;
        }
        tracing::debug!("Request abandoned before it settled, releasing its claim");

        let changes = Arc::clone(&self.changes);
        let apply = move |state: &mut SyncState| {
            release(state);
            let revision = state.touch();
            changes.send_replace(revision);
        };
        if let Ok(mut state) = self.state.try_write() {
            apply(&mut *state);
            return;
        }
        let state = Arc::clone(&self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { apply(&mut *state.write().await) });
            }
            Err(_) => tracing::warn!("No runtime to release an abandoned claim on"),
        }
    }
}

pub struct ResourceStore {
    api: ResourceApi,
    state: StateHandle,
    changes: Arc<watch::Sender<u64>>,
    next_seq: AtomicU64,
    discard_stale: bool,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("api", &self.api)
            .field("discard_stale", &self.discard_stale)
            .field("detached", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ResourceStore {
    pub fn new(config: &Config, http: Arc<dyn HttpClient>, cancel: CancellationToken) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            api: ResourceApi::new(config, http),
            state: new_state_handle(),
            changes: Arc::new(changes),
            next_seq: AtomicU64::new(0),
            discard_stale: config.discard_stale_responses,
            cancel,
        }
    }

    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, SyncState> {
        self.state.read().await
    }

    pub async fn snapshot(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// Receiver that sees the state revision after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// True once the owning view is gone
    pub fn is_detached(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn claim(&self, release: fn(&mut SyncState)) -> ClaimGuard {
        ClaimGuard {
            state: Arc::clone(&self.state),
            changes: Arc::clone(&self.changes),
            cancel: self.cancel.clone(),
            release: Some(release),
        }
    }

    async fn update<R>(&self, f: impl FnOnce(&mut SyncState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = f(&mut state);
        let revision = state.touch();
        drop(state);
        self.changes.send_replace(revision);
        result
    }

    /// Fetch the collection and reconcile it into the state
    ///
    /// A non-silent sync raises `loading` until it settles; a silent one
    /// (background poll) leaves the indicator alone.
    pub async fn sync(&self, silent: bool) -> crate::Result<SyncOutcome> {
        let ticket = self.begin_sync(silent).await;
        self.complete_sync(ticket).await
    }

    /// First half of [`sync`](Self::sync): claim a sequence number and, for
    /// a visible refresh, raise the loading indicator
    pub async fn begin_sync(&self, silent: bool) -> SyncTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        if !silent && !self.is_detached() {
            self.update(SyncState::begin_load).await;
        }
        tracing::debug!("Sync #{} started (silent={})", seq, silent);
        SyncTicket { silent, seq }
    }

    /// Second half of [`sync`](Self::sync): perform the read and apply it
    ///
    /// Dropping the returned future early still lowers the loading
    /// indicator raised by [`begin_sync`](Self::begin_sync).
    pub async fn complete_sync(&self, ticket: SyncTicket) -> crate::Result<SyncOutcome> {
        let load = (!ticket.silent).then(|| self.claim(SyncState::end_load));
        let result = self.api.list().await;

        if self.is_detached() {
            tracing::debug!("Sync #{} settled after teardown, discarding", ticket.seq);
            return result.map(|_| SyncOutcome::Detached);
        }

        let seq = self.discard_stale.then_some(ticket.seq);
        let outcome = self
            .update(|state| {
                if !ticket.silent {
                    state.end_load();
                }
                match result {
                    Ok(resources) => {
                        let count = resources.len();
                        if state.replace_resources(resources, seq) {
                            Ok(SyncOutcome::Applied { count })
                        } else {
                            Ok(SyncOutcome::Stale)
                        }
                    }
                    Err(e) => {
                        if !seq.is_some_and(|seq| state.is_stale(seq)) {
                            state.fail(e.user_message());
                        }
                        Err(e)
                    }
                }
            })
            .await;
        if let Some(load) = load {
            load.disarm();
        }

        match &outcome {
            Ok(SyncOutcome::Applied { count }) => {
                tracing::debug!("Sync #{} applied {} resources", ticket.seq, count);
            }
            Ok(SyncOutcome::Stale) => {
                tracing::debug!("Sync #{} superseded by a newer response", ticket.seq);
            }
            Ok(SyncOutcome::Detached) => {}
            Err(e) => tracing::warn!("Sync #{} failed: {}", ticket.seq, e),
        }
        outcome
    }

    /// Submit a draft, then pull the authoritative list with a silent sync
    ///
    /// `adding` stays raised until the follow-up sync settles, or until the
    /// returned future is dropped, and a second create while one is in
    /// flight is refused without a request. The
    /// draft itself is never modified; on failure the caller still holds
    /// exactly what the user typed.
    pub async fn create(&self, draft: &Draft) -> crate::Result<Option<Resource>> {
        draft.validate()?;

        let claimed = self
            .update(|state| !std::mem::replace(&mut state.adding, true))
            .await;
        if !claimed {
            tracing::debug!("Create of '{}' refused, another is in flight", draft.name);
            return Err(FluxwatchError::CreateInProgress);
        }
        let adding = self.claim(|state| state.adding = false);

        let outcome = match self.api.create(draft).await {
            Ok(created) => {
                tracing::info!("Created resource '{}'", draft.name);
                if !self.is_detached() {
                    // a failed follow-up read reports through `error` itself
                    let _ = self.sync(true).await;
                }
                Ok(created)
            }
            Err(e) => {
                tracing::warn!("Create of '{}' failed: {}", draft.name, e);
                if !self.is_detached() {
                    let message = e.user_message();
                    self.update(|state| state.fail(message)).await;
                }
                Err(e)
            }
        };

        if !self.is_detached() {
            self.update(|state| state.adding = false).await;
        }
        adding.disarm();
        outcome
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|state| state.query = query).await;
    }

    /// Current resources narrowed by the current query
    pub async fn filtered(&self) -> Vec<Resource> {
        let state = self.state.read().await;
        filter::filter_owned(&state.resources, &state.query)
    }
}
