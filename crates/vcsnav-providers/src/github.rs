//! GitHub adapter.
//!
//! Speaks the GitHub REST API with `Authorization: token …` and normalizes
//! the responses to the unified shapes: the contents API drives both
//! directory listings and file fetches, file content arrives base64-encoded.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;
use vcsnav_core::{
    DirectoryEntry, EntryKind, GithubRepository, Repository, VcsKind,
};

use crate::provider::{ProviderError, VcsProviderService};

#[derive(Deserialize)]
struct GithubRepo {
    name: String,
    owner: GithubOwner,
    default_branch: String,
}

#[derive(Deserialize)]
struct GithubOwner {
    login: String,
}

#[derive(Deserialize)]
struct GithubBranch {
    name: String,
}

#[derive(Deserialize)]
struct GithubContentEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[derive(Deserialize)]
struct GithubFile {
    content: String,
}

pub struct GithubProvider {
    vcs_id: String,
    api_url: String,
    client: reqwest::Client,
}

impl GithubProvider {
    pub fn new(vcs_id: String, api_url: String, client: reqwest::Client) -> Self {
        Self {
            vcs_id,
            api_url,
            client,
        }
    }

    fn headers(&self, token: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
                ProviderError::Decode("credential contains invalid header characters".to_string())
            })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        Ok(headers)
    }

    fn repo_ref<'a>(&self, repository: &'a Repository) -> Result<&'a GithubRepository, ProviderError> {
        match repository {
            Repository::Github(repo) => Ok(repo),
            Repository::Gitlab(_) => Err(ProviderError::RepositoryMismatch),
        }
    }

    async fn get_contents(
        &self,
        token: &str,
        repo: &GithubRepository,
        branch: &str,
        path: &str,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, repo.owner, repo.name, path
        );
        debug!(provider = %self.vcs_id, %url, "fetching repository contents");

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("ref", branch)])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }
        Ok(response)
    }
}

#[async_trait]
impl VcsProviderService for GithubProvider {
    fn kind(&self) -> VcsKind {
        VcsKind::Github
    }

    async fn list_repositories(
        &self,
        token: &str,
    ) -> Result<BTreeMap<String, Repository>, ProviderError> {
        let url = format!("{}/user/repos", self.api_url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let repos: Vec<GithubRepo> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(provider = %self.vcs_id, count = repos.len(), "fetched repositories");

        Ok(repos
            .into_iter()
            .map(|repo| {
                (
                    repo.name.clone(),
                    Repository::Github(GithubRepository {
                        name: repo.name,
                        owner: repo.owner.login,
                        default_branch: repo.default_branch,
                        vcs_id: self.vcs_id.clone(),
                    }),
                )
            })
            .collect())
    }

    async fn list_branches(
        &self,
        token: &str,
        repository: &Repository,
    ) -> Result<Vec<String>, ProviderError> {
        let repo = self.repo_ref(repository)?;
        let url = format!(
            "{}/repos/{}/{}/branches",
            self.api_url, repo.owner, repo.name
        );

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let branches: Vec<GithubBranch> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(branches.into_iter().map(|branch| branch.name).collect())
    }

    async fn list_directory(
        &self,
        token: &str,
        repository: &Repository,
        branch: &str,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>, ProviderError> {
        let repo = self.repo_ref(repository)?;
        let response = self.get_contents(token, repo, branch, path).await?;

        let entries: Vec<GithubContentEntry> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(entries
            .into_iter()
            .map(|entry| DirectoryEntry {
                name: entry.name,
                kind: EntryKind::from_provider_type(&entry.entry_type),
            })
            .collect())
    }

    async fn get_file_content(
        &self,
        token: &str,
        repository: &Repository,
        branch: &str,
        path: &str,
    ) -> Result<String, ProviderError> {
        let repo = self.repo_ref(repository)?;
        let response = self.get_contents(token, repo, branch, path).await?;

        let file: GithubFile = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        // GitHub wraps the base64 payload at 60 columns; strip the newlines
        // before decoding.
        let packed: String = file.content.split_whitespace().collect();
        let bytes = BASE64
            .decode(packed.as_bytes())
            .map_err(|e| ProviderError::Decode(format!("invalid base64 file content: {}", e)))?;

        String::from_utf8(bytes)
            .map_err(|e| ProviderError::Decode(format!("file content is not valid UTF-8: {}", e)))
    }
}
