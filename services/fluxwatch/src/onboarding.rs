//! Standalone "add your first resource" flow
//!
//! Same create request as the dashboard, without a store behind it: the
//! outcome is reported as a one-line message and nothing is re-fetched.

use crate::api::ResourceApi;
use crate::resource::{Draft, DraftField, Resource};

#[derive(Debug)]
pub struct Onboarding {
    api: ResourceApi,
    draft: Draft,
    message: Option<String>,
}

impl Onboarding {
    pub fn new(api: ResourceApi) -> Self {
        Self {
            api,
            draft: Draft::default(),
            message: None,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) {
        self.draft.set(field, value);
    }

    /// Confirmation or failure text of the last submit
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Submit the draft; resets it on success, keeps it on failure
    ///
    /// Success requires the backend to echo the created resource. A success
    /// status with a body that is not one counts as a failure.
    pub async fn submit(&mut self) -> crate::Result<Resource> {
        self.message = None;

        let result = match self.draft.validate() {
            Ok(()) => self.api.create_confirmed(&self.draft).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(created) => {
                let name = if created.name.is_empty() {
                    self.draft.name.clone()
                } else {
                    created.name.clone()
                };
                tracing::info!("Onboarded resource '{}'", name);
                self.message = Some(format!("Added “{}” for monitoring.", name));
                self.draft.reset();
            }
            Err(e) => {
                tracing::warn!("Onboarding of '{}' failed: {}", self.draft.name, e);
                self.message = Some(e.user_message());
            }
        }
        result
    }
}
