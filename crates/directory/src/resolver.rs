//! Client-side organization resolver (Auth Service side).
//!
//! Wraps the network call to the Organization Service with a short
//! read-through cache and the fail-closed policy: when the Directory
//! cannot answer, the resolver reports `OrganizationUnreachable` and the
//! dependent operation is rejected. It never optimistically reports
//! "exists".

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::Deserialize;

use netbill_auth::provision::OrganizationGate;
use netbill_core::{Clock, CoreError, CoreResult, OrganizationId};

use crate::cache::TtlCache;
use crate::model::OrganizationSummary;

/// Transport abstraction over the Directory's exists endpoint.
///
/// `Ok(None)` means the Directory answered "no such active organization";
/// any transport-level failure must surface as `OrganizationUnreachable`.
pub trait DirectoryClient: Send + Sync {
    fn fetch(
        &self,
        id: OrganizationId,
    ) -> impl Future<Output = CoreResult<Option<OrganizationSummary>>> + Send;
}

pub struct OrganizationResolver<C> {
    client: C,
    cache: TtlCache<OrganizationId, OrganizationSummary>,
}

impl<C: DirectoryClient> OrganizationResolver<C> {
    /// Default cache TTL: five minutes, matching the staleness window the
    /// platform tolerates for tenant admission.
    pub fn new(client: C, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(client, clock, Duration::minutes(5))
    }

    pub fn with_ttl(client: C, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            client,
            cache: TtlCache::new(ttl, clock),
        }
    }

    /// Fetch an organization summary, read-through cached.
    ///
    /// Only confirmed-active organizations are cached; negative answers
    /// are re-asked so a newly created tenant is visible immediately.
    pub async fn get(&self, id: OrganizationId) -> CoreResult<Option<OrganizationSummary>> {
        if let Some(summary) = self.cache.get(&id) {
            return Ok(Some(summary));
        }

        match self.client.fetch(id).await {
            Ok(Some(summary)) if summary.is_active => {
                self.cache.insert(id, summary.clone());
                Ok(Some(summary))
            }
            Ok(other) => Ok(other),
            Err(e) => {
                tracing::warn!(organization_id = %id, error = %e, "directory lookup failed");
                Err(e)
            }
        }
    }

    /// Does this organization exist and is it active?
    ///
    /// `Err(OrganizationUnreachable)` when the Directory cannot confirm —
    /// callers must treat that as "reject", never as `false` or `true`.
    pub async fn exists(&self, id: OrganizationId) -> CoreResult<bool> {
        Ok(self.get(id).await?.is_some_and(|summary| summary.is_active))
    }

    /// Drop a cached entry (organization deactivated or deleted).
    pub fn invalidate(&self, id: OrganizationId) {
        self.cache.invalidate(&id);
    }
}

impl<C: DirectoryClient> OrganizationGate for OrganizationResolver<C> {
    fn confirm_active(
        &self,
        organization_id: OrganizationId,
    ) -> impl Future<Output = CoreResult<bool>> + Send {
        self.exists(organization_id)
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExistsEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<ExistsData>,
}

#[derive(Debug, Deserialize)]
struct ExistsData {
    exists: bool,
    #[serde(default)]
    organization: Option<OrganizationSummary>,
}

/// `DirectoryClient` over HTTP, talking to the Organization Service's
/// public exists endpoint.
pub struct HttpDirectoryClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDirectoryClient {
    /// `base_url` without a trailing slash, e.g.
    /// `http://organization-service:8002/api/v1`.
    pub fn new(base_url: impl Into<String>, timeout: StdDuration) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::internal(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl DirectoryClient for HttpDirectoryClient {
    async fn fetch(&self, id: OrganizationId) -> CoreResult<Option<OrganizationSummary>> {
        let url = format!("{}/organizations/{}/exists/", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CoreError::unreachable(format!("directory returned {status}")));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CoreError::unreachable(format!(
                "unexpected directory status {status}"
            )));
        }

        let envelope: ExistsEnvelope = response
            .json()
            .await
            .map_err(|e| CoreError::unreachable(format!("malformed directory reply: {e}")))?;

        if !envelope.success {
            return Ok(None);
        }
        Ok(envelope
            .data
            .filter(|data| data.exists)
            .and_then(|data| data.organization))
    }
}
