//! Typed client for the backend's resource collection

use std::sync::Arc;

use crate::config::Config;
use crate::io::{HttpClient, HttpResponse};
use crate::resource::{Draft, Resource};
use crate::FluxwatchError;

const LOAD_FAILED: &str = "Failed to load resources";
const CREATE_FAILED: &str = "Failed to create resource";

/// `GET`/`POST {backend}/api/resources`
pub struct ResourceApi {
    resources_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ResourceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("resources_url", &self.resources_url)
            .finish()
    }
}

impl ResourceApi {
    pub fn new(config: &Config, http: Arc<dyn HttpClient>) -> Self {
        let resources_url = config.resources_url();
        tracing::debug!("Created ResourceApi at {}", resources_url);
        Self {
            resources_url,
            http,
        }
    }

    pub fn resources_url(&self) -> &str {
        &self.resources_url
    }

    /// Read the whole collection
    ///
    /// Only `200` counts as success. A JSON body that is not an array reads
    /// as an empty collection.
    pub async fn list(&self) -> crate::Result<Vec<Resource>> {
        let response = self.http.get(&self.resources_url).await?;
        if response.status != 200 {
            tracing::debug!(
                "Non-200 response from {}: status={}",
                self.resources_url,
                response.status
            );
            return Err(FluxwatchError::Status {
                status: response.status,
                message: LOAD_FAILED.to_string(),
            });
        }
        decode_collection(&response.body)
    }

    /// Submit a draft; `200` and `201` count as success
    ///
    /// Returns the created resource when the body decodes as one. The
    /// dashboard re-reads the collection afterwards, so the body is optional.
    pub async fn create(&self, draft: &Draft) -> crate::Result<Option<Resource>> {
        let response = self.post_draft(draft).await?;
        match serde_json::from_str::<Resource>(&response.body) {
            Ok(created) => Ok(Some(created)),
            Err(e) => {
                tracing::debug!("Create response is not a resource: {}", e);
                Ok(None)
            }
        }
    }

    /// Like [`create`](Self::create), but the success body must be the
    /// created resource; anything else is a decode error
    pub async fn create_confirmed(&self, draft: &Draft) -> crate::Result<Resource> {
        let response = self.post_draft(draft).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn post_draft(&self, draft: &Draft) -> crate::Result<HttpResponse> {
        let body = draft.to_json()?;
        let response = self.http.post_json(&self.resources_url, &body).await?;
        if !matches!(response.status, 200 | 201) {
            tracing::debug!(
                "Create rejected by {}: status={}",
                self.resources_url,
                response.status
            );
            return Err(FluxwatchError::Status {
                status: response.status,
                message: CREATE_FAILED.to_string(),
            });
        }
        Ok(response)
    }
}

/// Decode a collection body, skipping elements that are not resources
pub fn decode_collection(body: &str) -> crate::Result<Vec<Resource>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let serde_json::Value::Array(items) = value else {
        tracing::debug!("Collection body is not an array, treating as empty");
        return Ok(Vec::new());
    };

    let resources = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Resource>(item) {
            Ok(resource) => Some(resource),
            Err(e) => {
                tracing::warn!("Skipping malformed resource at index {}: {}", index, e);
                None
            }
        })
        .collect();
    Ok(resources)
}
