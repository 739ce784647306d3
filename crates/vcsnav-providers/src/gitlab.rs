//! GitLab adapter.
//!
//! The configured API URL is the projects endpoint itself (e.g.
//! `https://gitlab.example/api/v4/projects`); repository-scoped calls append
//! the numeric project id. Authenticates with `Authorization: Bearer …` and
//! returns raw file content, no decoding step.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;
use vcsnav_core::{
    DirectoryEntry, EntryKind, GitlabRepository, Repository, VcsKind,
};

use crate::provider::{ProviderError, VcsProviderService};

#[derive(Deserialize)]
struct GitlabProject {
    name: String,
    id: i64,
    web_url: String,
    default_branch: String,
}

#[derive(Deserialize)]
struct GitlabBranch {
    name: String,
}

#[derive(Deserialize)]
struct GitlabTreeEntry {
    name: String,
    #[serde(rename = "type")]
    entry_type: String,
}

pub struct GitlabProvider {
    vcs_id: String,
    api_url: String,
    client: reqwest::Client,
}

impl GitlabProvider {
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
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ProviderError::Decode("credential contains invalid header characters".to_string())
            })?,
        );
        Ok(headers)
    }

    fn repo_ref<'a>(&self, repository: &'a Repository) -> Result<&'a GitlabRepository, ProviderError> {
        match repository {
            Repository::Gitlab(repo) => Ok(repo),
            Repository::Github(_) => Err(ProviderError::RepositoryMismatch),
        }
    }
}

#[async_trait]
impl VcsProviderService for GitlabProvider {
    fn kind(&self) -> VcsKind {
        VcsKind::Gitlab
    }

    async fn list_repositories(
        &self,
        token: &str,
    ) -> Result<BTreeMap<String, Repository>, ProviderError> {
        let response = self
            .client
            .get(&self.api_url)
            .headers(self.headers(token)?)
            .query(&[("owned", "true")])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let projects: Vec<GitlabProject> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(provider = %self.vcs_id, count = projects.len(), "fetched projects");

        Ok(projects
            .into_iter()
            .map(|project| {
                (
                    project.name.clone(),
                    Repository::Gitlab(GitlabRepository {
                        name: project.name,
                        project_id: project.id.to_string(),
                        web_url: project.web_url,
                        default_branch: project.default_branch,
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
        let url = format!("{}/{}/repository/branches", self.api_url, repo.project_id);

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

        let branches: Vec<GitlabBranch> = response
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
        let url = format!("{}/{}/repository/tree", self.api_url, repo.project_id);
        debug!(provider = %self.vcs_id, %url, %path, "fetching repository tree");

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("path", path), ("ref_name", branch)])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        let entries: Vec<GitlabTreeEntry> = response
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
        let encoded_path = urlencoding::encode(path);
        let url = format!(
            "{}/{}/repository/files/{}/raw",
            self.api_url, repo.project_id, encoded_path
        );

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&[("ref_name", branch)])
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GitlabProvider {
        GitlabProvider::new(
            "gl".to_string(),
            format!("{}/api/v4/projects", server.uri()),
            reqwest::Client::new(),
        )
    }

    fn gitlab_repo() -> Repository {
        Repository::Gitlab(GitlabRepository {
            name: "app".to_string(),
            project_id: "42".to_string(),
            web_url: "https://gitlab.example/group/app".to_string(),
            default_branch: "master".to_string(),
            vcs_id: "gl".to_string(),
        })
    }

    #[tokio::test]
    async fn lists_owned_projects_with_stringified_ids() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .and(query_param("owned", "true"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "app", "id": 42, "web_url": "https://gitlab.example/group/app", "default_branch": "master"}
            ])))
            .mount(&server)
            .await;

        let repos = provider(&server).list_repositories("secret").await.unwrap();

        match &repos["app"] {
            Repository::Gitlab(repo) => {
                assert_eq!(repo.project_id, "42");
                assert_eq!(repo.default_branch, "master");
                assert_eq!(repo.vcs_id, "gl");
            }
            other => panic!("expected gitlab repository, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn lists_branches_by_project_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/repository/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "master"},
                {"name": "develop"}
            ])))
            .mount(&server)
            .await;

        let branches = provider(&server)
            .list_branches("secret", &gitlab_repo())
            .await
            .unwrap();

        assert_eq!(branches, vec!["master", "develop"]);
    }

    #[tokio::test]
    async fn normalizes_tree_and_blob_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/repository/tree"))
            .and(query_param("path", "src"))
            .and(query_param("ref_name", "master"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "a1", "mode": "040000", "name": "lib", "path": "src/lib", "type": "tree"},
                {"id": "b2", "mode": "100644", "name": "main.rs", "path": "src/main.rs", "type": "blob"}
            ])))
            .mount(&server)
            .await;

        let entries = provider(&server)
            .list_directory("secret", &gitlab_repo(), "master", "src")
            .await
            .unwrap();

        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].kind, EntryKind::File);
    }

    #[tokio::test]
    async fn returns_raw_file_content_with_encoded_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/42/repository/files/src%2Fquery.sql/raw"))
            .and(query_param("ref_name", "master"))
            .respond_with(ResponseTemplate::new(200).set_body_string("select * from t;"))
            .mount(&server)
            .await;

        let content = provider(&server)
            .get_file_content("secret", &gitlab_repo(), "master", "src/query.sql")
            .await
            .unwrap();

        assert_eq!(content, "select * from t;");
    }

    #[tokio::test]
    async fn upstream_403_maps_to_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = provider(&server)
            .list_repositories("bad")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Auth { status: 403 }));
    }
}
