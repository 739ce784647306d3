use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use vcsnav_core::{DirectoryEntry, Repository, VcsApiError, VcsKind, VcsSettings};

/// Typed adapter failures. A 401/403 from the upstream is reported as `Auth`
/// so the caller can substitute a uniform message; everything else that went
/// over the wire is `Upstream` with status and message where available.
/// Adapters never retry.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the credential (upstream status {status})")]
    Auth { status: u16 },

    #[error("upstream request failed")]
    Upstream {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("repository does not belong to this provider")]
    RepositoryMismatch,
}

impl ProviderError {
    /// Map a non-success upstream response. Must only be called when the
    /// status is not a success.
    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => ProviderError::Auth {
                status: status.as_u16(),
            },
            code => ProviderError::Upstream {
                status: Some(code),
                message: status.canonical_reason().map(str::to_string),
            },
        }
    }

    /// Map a transport-level failure (timeout, DNS, connection reset).
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        ProviderError::Upstream {
            status: error.status().map(|s| s.as_u16()),
            message: Some(error.to_string()),
        }
    }
}

impl From<ProviderError> for VcsApiError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Auth { .. } => VcsApiError::Unauthorized,
            ProviderError::Upstream { status, message } => VcsApiError::Upstream {
                status: status.unwrap_or(500),
                message: message.unwrap_or_else(|| "Upstream request failed".to_string()),
            },
            ProviderError::Decode(message) => VcsApiError::Internal(message),
            ProviderError::RepositoryMismatch => {
                VcsApiError::Internal("Repository does not match the provider".to_string())
            }
        }
    }
}

/// Uniform operation set implemented once per provider kind.
#[async_trait]
pub trait VcsProviderService: Send + Sync {
    fn kind(&self) -> VcsKind;

    /// All repositories the credential's principal owns, keyed by name.
    async fn list_repositories(
        &self,
        token: &str,
    ) -> Result<BTreeMap<String, Repository>, ProviderError>;

    /// Branch names for a repository, in provider order.
    async fn list_branches(
        &self,
        token: &str,
        repository: &Repository,
    ) -> Result<Vec<String>, ProviderError>;

    /// Entries of the directory at `path` (empty path = repository root),
    /// normalized to `directory`/`file` in provider return order.
    async fn list_directory(
        &self,
        token: &str,
        repository: &Repository,
        branch: &str,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>, ProviderError>;

    /// Plain-text content of the file at `path` under `branch`.
    async fn get_file_content(
        &self,
        token: &str,
        repository: &Repository,
        branch: &str,
        path: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the adapter for a configured provider. Runtime-selected variant, not
/// a hierarchy: each adapter is a standalone value behind the same contract.
pub fn provider_for(
    settings: &VcsSettings,
    client: reqwest::Client,
) -> Box<dyn VcsProviderService> {
    match settings.kind {
        VcsKind::Github => Box::new(GithubProvider::new(
            settings.id.clone(),
            settings.api.clone(),
            client,
        )),
        VcsKind::Gitlab => Box::new(GitlabProvider::new(
            settings.id.clone(),
            settings.api.clone(),
            client,
        )),
    }
}

use crate::github::GithubProvider;
use crate::gitlab::GitlabProvider;
