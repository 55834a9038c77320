//! FluxWatch - resource dashboard client
//!
//! Keeps a list of monitored resources in sync with a FluxWatch backend,
//! lets the user register new ones, and filters the synchronized set
//! locally.

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod onboarding;
pub mod poller;
pub mod resource;
pub mod state;
pub mod store;
pub mod view;


pub use config::{load_config, Config};
pub use error::{FluxwatchError, Result};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::api::ResourceApi;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::onboarding::Onboarding;
use crate::resource::Resource;
use crate::store::ResourceStore;
use crate::view::DashboardView;

/// Builder for a [`Fluxwatch`] client, with optional injection of the HTTP
/// client and the root cancellation token
pub struct FluxwatchBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    cancel: Option<CancellationToken>,
}

impl FluxwatchBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            cancel: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<Fluxwatch> {
        self.config.validate()?;
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::with_timeout(
                self.config.request_timeout(),
            )?),
        };
        tracing::debug!("Built fluxwatch client for {}", self.config.backend_url);
        Ok(Fluxwatch {
            config: self.config,
            http,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Entry point: hands out stores, mounted views and onboarding flows that
/// share one HTTP client and one root cancellation token
pub struct Fluxwatch {
    config: Config,
    http: Arc<dyn HttpClient>,
    cancel: CancellationToken,
}

impl Fluxwatch {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn api(&self) -> ResourceApi {
        ResourceApi::new(&self.config, Arc::clone(&self.http))
    }

    /// A fresh store; tearing down the root token tears it down too
    pub fn store(&self) -> Arc<ResourceStore> {
        Arc::new(ResourceStore::new(
            &self.config,
            Arc::clone(&self.http),
            self.cancel.child_token(),
        ))
    }

    /// Mount a dashboard view over a fresh store
    pub async fn mount(&self) -> DashboardView {
        DashboardView::mount(self.store(), self.config.poll_interval()).await
    }

    pub fn onboarding(&self) -> Onboarding {
        Onboarding::new(self.api())
    }

    /// One visible sync, narrowed by `query`
    pub async fn list(&self, query: &str) -> Result<Vec<Resource>> {
        let store = self.store();
        store.sync(false).await?;
        store.set_query(query).await;
        Ok(store.filtered().await)
    }
}
