//! Navigation state and its transition functions.
//!
//! Every transition builds a fully new state value; downstream selections are
//! cleared, never merged, so a listing from a previous branch or repository
//! can never survive a selection change.

use std::collections::BTreeMap;

use vcsnav_core::{DirectoryEntry, RepoPath, Repository, VcsConfigEntry};

/// An open file preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub name: String,
    pub content: String,
}

/// The complete client-held selection: provider, repository catalog,
/// repository, branch, path, current listing and optional preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub config: Vec<VcsConfigEntry>,
    pub selected_vcs: Option<String>,
    pub repositories: BTreeMap<String, Repository>,
    pub selected_repository: Option<String>,
    pub branches: Vec<String>,
    pub selected_branch: Option<String>,
    pub path: RepoPath,
    pub listing: Vec<DirectoryEntry>,
    pub preview: Option<Preview>,
}

impl NavigationState {
    pub fn with_config(self, config: Vec<VcsConfigEntry>) -> Self {
        Self { config, ..self }
    }

    /// Select a provider (or none). Everything downstream of the provider is
    /// cleared; the provider configuration survives.
    pub fn with_provider(self, vcs_id: Option<String>) -> Self {
        Self {
            config: self.config,
            selected_vcs: vcs_id,
            ..Self::default()
        }
    }

    pub fn with_repositories(self, repositories: BTreeMap<String, Repository>) -> Self {
        Self {
            repositories,
            ..self
        }
    }

    /// Select a repository out of the loaded catalog. The branch resets to
    /// the repository's default branch, the path to the root, and any loaded
    /// listing or preview is dropped.
    pub fn with_repository(self, repository: &Repository) -> Self {
        Self {
            selected_repository: Some(repository.name().to_string()),
            selected_branch: Some(repository.default_branch().to_string()),
            branches: Vec::new(),
            path: RepoPath::root(),
            listing: Vec::new(),
            preview: None,
            ..self
        }
    }

    pub fn with_branches(self, branches: Vec<String>) -> Self {
        Self { branches, ..self }
    }

    /// Select a branch. The path is kept so the same directory is re-read
    /// under the new branch; the stale listing and preview are dropped.
    pub fn with_branch(self, branch: String) -> Self {
        Self {
            selected_branch: Some(branch),
            listing: Vec::new(),
            preview: None,
            ..self
        }
    }

    /// Move to a different path. The previous listing is dropped rather than
    /// carried over while the fetch is in flight.
    pub fn with_path(self, path: RepoPath) -> Self {
        Self {
            path,
            listing: Vec::new(),
            preview: None,
            ..self
        }
    }

    pub fn with_listing(self, listing: Vec<DirectoryEntry>) -> Self {
        Self { listing, ..self }
    }

    pub fn with_preview(self, preview: Option<Preview>) -> Self {
        Self { preview, ..self }
    }

    /// Entry names are unique within a listing, so name lookup is exact.
    pub fn entry(&self, name: &str) -> Option<&DirectoryEntry> {
        self.listing.iter().find(|entry| entry.name == name)
    }

    /// Currently selected repository value, if the selection still points
    /// into the loaded catalog.
    pub fn repository(&self) -> Option<&Repository> {
        self.selected_repository
            .as_deref()
            .and_then(|name| self.repositories.get(name))
    }

    /// Browse URL of the current selection on the provider's web UI.
    /// GitHub derives it from the configured API host, GitLab carries the
    /// web URL on the repository itself.
    pub fn repository_web_url(&self) -> Option<String> {
        let repository = self.repository()?;
        let branch = self.selected_branch.as_deref()?;

        match repository {
            Repository::Github(repo) => {
                let config = self
                    .config
                    .iter()
                    .find(|entry| entry.id == repo.vcs_id)?;
                let host = config.api.replacen("://api.", "://", 1);
                Some(format!(
                    "{}/{}/{}/blob/{}/",
                    host.trim_end_matches('/'),
                    repo.owner,
                    repo.name,
                    branch
                ))
            }
            Repository::Gitlab(repo) => Some(format!(
                "{}/-/blob/{}/",
                repo.web_url.trim_end_matches('/'),
                branch
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcsnav_core::{EntryKind, GithubRepository, GitlabRepository, VcsKind};

    fn github_repository() -> Repository {
        Repository::Github(GithubRepository {
            name: "app".to_string(),
            owner: "octocat".to_string(),
            default_branch: "main".to_string(),
            vcs_id: "gh".to_string(),
        })
    }

    fn loaded_state() -> NavigationState {
        let repository = github_repository();
        NavigationState::default()
            .with_config(vec![VcsConfigEntry {
                id: "gh".to_string(),
                name: "GitHub".to_string(),
                kind: VcsKind::Github,
                api: "https://api.github.com".to_string(),
                token: true,
            }])
            .with_provider(Some("gh".to_string()))
            .with_repositories(BTreeMap::from([("app".to_string(), repository.clone())]))
            .with_repository(&repository)
            .with_branches(vec!["main".to_string(), "develop".to_string()])
            .with_path(RepoPath::parse("src"))
            .with_listing(vec![DirectoryEntry {
                name: "lib.rs".to_string(),
                kind: EntryKind::File,
            }])
            .with_preview(Some(Preview {
                name: "lib.rs".to_string(),
                content: "fn main() {}".to_string(),
            }))
    }

    #[test]
    fn selecting_a_repository_resets_branch_and_path() {
        let state = loaded_state().with_repository(&github_repository());

        assert_eq!(state.selected_repository.as_deref(), Some("app"));
        assert_eq!(state.selected_branch.as_deref(), Some("main"));
        assert!(state.branches.is_empty());
        assert!(state.path.is_root());
        assert!(state.listing.is_empty());
        assert!(state.preview.is_none());
        // The catalog itself survives.
        assert!(state.repositories.contains_key("app"));
    }

    #[test]
    fn selecting_a_provider_clears_everything_downstream() {
        let state = loaded_state().with_provider(Some("gl".to_string()));

        assert_eq!(state.selected_vcs.as_deref(), Some("gl"));
        assert!(state.repositories.is_empty());
        assert!(state.selected_repository.is_none());
        assert!(state.selected_branch.is_none());
        assert!(state.path.is_root());
        assert!(state.listing.is_empty());
        assert!(state.preview.is_none());
        assert_eq!(state.config.len(), 1);
    }

    #[test]
    fn selecting_a_branch_keeps_the_path() {
        let state = loaded_state().with_branch("develop".to_string());

        assert_eq!(state.selected_branch.as_deref(), Some("develop"));
        assert_eq!(state.path.to_string(), "src");
        assert!(state.listing.is_empty());
        assert!(state.preview.is_none());
    }

    #[test]
    fn github_browse_url_strips_the_api_host_prefix() {
        let state = loaded_state();
        assert_eq!(
            state.repository_web_url().as_deref(),
            Some("https://github.com/octocat/app/blob/main/")
        );
    }

    #[test]
    fn gitlab_browse_url_comes_from_the_repository() {
        let repository = Repository::Gitlab(GitlabRepository {
            name: "app".to_string(),
            project_id: "42".to_string(),
            web_url: "https://gitlab.example/group/app".to_string(),
            default_branch: "master".to_string(),
            vcs_id: "gl".to_string(),
        });
        let state = NavigationState::default()
            .with_repositories(BTreeMap::from([("app".to_string(), repository.clone())]))
            .with_repository(&repository);

        assert_eq!(
            state.repository_web_url().as_deref(),
            Some("https://gitlab.example/group/app/-/blob/master/")
        );
    }
}
