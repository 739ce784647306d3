//! Transport seam between the navigation layer and the proxy surface.
//!
//! The navigation layer only ever sees the uniform `{message, code}` error
//! contract; upstream-specific shapes never cross this boundary.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use vcsnav_core::{DirectoryEntry, ErrorBody, RepoPath, Repository, VcsConfigEntry};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service answered with its error contract.
    #[error("{message}")]
    Api { message: String, code: u16 },

    #[error("request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        GatewayError::Transport(error.to_string())
    }
}

/// Operations the navigation layer needs from the service. Implemented over
/// HTTP in production and by fakes in tests.
#[async_trait]
pub trait VcsGateway: Send + Sync {
    async fn fetch_config(&self) -> Result<Vec<VcsConfigEntry>, GatewayError>;

    async fn save_token(&self, vcs_id: &str, token: &str) -> Result<(), GatewayError>;

    async fn remove_token(&self, vcs_id: &str) -> Result<(), GatewayError>;

    async fn fetch_repositories(
        &self,
        vcs_id: &str,
    ) -> Result<BTreeMap<String, Repository>, GatewayError>;

    async fn fetch_branches(&self, repository: &Repository) -> Result<Vec<String>, GatewayError>;

    async fn fetch_directory(
        &self,
        repository: &Repository,
        branch: &str,
        path: &RepoPath,
    ) -> Result<Vec<DirectoryEntry>, GatewayError>;

    async fn fetch_file(
        &self,
        repository: &Repository,
        branch: &str,
        path: &RepoPath,
    ) -> Result<String, GatewayError>;
}

/// HTTP implementation against the proxy surface.
pub struct HttpVcsGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpVcsGateway {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn repository_param(repository: &Repository) -> Result<String, GatewayError> {
        let raw = serde_json::to_string(repository)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(urlencoding::encode(&raw).into_owned())
    }

    /// Convert a non-success response into the service's error contract,
    /// falling back to the raw status when the body is not parseable.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match response.json::<ErrorBody>().await {
            Ok(body) => Err(GatewayError::Api {
                message: body.message,
                code: body.code,
            }),
            Err(_) => Err(GatewayError::Api {
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
                code: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl VcsGateway for HttpVcsGateway {
    async fn fetch_config(&self) -> Result<Vec<VcsConfigEntry>, GatewayError> {
        let url = format!("{}/api/vcs/config", self.base_url);
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn save_token(&self, vcs_id: &str, token: &str) -> Result<(), GatewayError> {
        let url = format!("{}/api/token", self.base_url);
        let body = serde_json::json!({"vcsId": vcs_id, "token": token});
        Self::check(self.client.post(&url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn remove_token(&self, vcs_id: &str) -> Result<(), GatewayError> {
        let url = format!("{}/api/token", self.base_url);
        let body = serde_json::json!({"vcsId": vcs_id});
        Self::check(self.client.delete(&url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn fetch_repositories(
        &self,
        vcs_id: &str,
    ) -> Result<BTreeMap<String, Repository>, GatewayError> {
        let url = format!("{}/api/vcs/repositories", self.base_url);
        debug!(%vcs_id, "fetching repository catalog");
        let response = Self::check(
            self.client
                .get(&url)
                .query(&[("vcsId", vcs_id)])
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn fetch_branches(&self, repository: &Repository) -> Result<Vec<String>, GatewayError> {
        let url = format!(
            "{}/api/vcs/branches?repository={}",
            self.base_url,
            Self::repository_param(repository)?
        );
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn fetch_directory(
        &self,
        repository: &Repository,
        branch: &str,
        path: &RepoPath,
    ) -> Result<Vec<DirectoryEntry>, GatewayError> {
        let url = format!(
            "{}/api/vcs?repository={}",
            self.base_url,
            Self::repository_param(repository)?
        );
        let response = Self::check(
            self.client
                .get(&url)
                .query(&[("path", path.to_string()), ("branch", branch.to_string())])
                .send()
                .await?,
        )
        .await?;
        Ok(response.json().await?)
    }

    async fn fetch_file(
        &self,
        repository: &Repository,
        branch: &str,
        path: &RepoPath,
    ) -> Result<String, GatewayError> {
        let url = format!(
            "{}/api/vcs/file?repository={}",
            self.base_url,
            Self::repository_param(repository)?
        );
        let response = Self::check(
            self.client
                .get(&url)
                .query(&[("path", path.to_string()), ("branch", branch.to_string())])
                .send()
                .await?,
        )
        .await?;
        Ok(response.text().await?)
    }
}
