//! User-intent orchestration over the navigation state.
//!
//! Each action applies its selection change synchronously, then fetches
//! whatever the new selection needs. In-flight requests are not cancelled
//! when superseded; every response carries the selection that triggered it
//! and is discarded if that selection is no longer current.

use std::sync::RwLock;

use tracing::debug;
use vcsnav_core::{RepoPath, Repository};

use crate::files::{QueryFile, QueryFileSink};
use crate::gateway::{GatewayError, VcsGateway};
use crate::state::{NavigationState, Preview};

/// The selection a request was issued under.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    vcs: Option<String>,
    repository: Option<String>,
    branch: Option<String>,
    path: RepoPath,
}

impl Selection {
    fn of(state: &NavigationState) -> Self {
        Self {
            vcs: state.selected_vcs.clone(),
            repository: state.selected_repository.clone(),
            branch: state.selected_branch.clone(),
            path: state.path.clone(),
        }
    }
}

pub struct Navigator<G> {
    gateway: G,
    state: RwLock<NavigationState>,
}

impl<G: VcsGateway> Navigator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: RwLock::new(NavigationState::default()),
        }
    }

    pub fn snapshot(&self) -> NavigationState {
        self.state.read().unwrap().clone()
    }

    fn update(&self, f: impl FnOnce(NavigationState) -> NavigationState) -> Selection {
        let mut guard = self.state.write().unwrap();
        let next = f(std::mem::take(&mut *guard));
        *guard = next;
        Selection::of(&guard)
    }

    /// Apply a state change only if the triggering selection is still the
    /// current one. Responses issued under a superseded selection are dropped.
    fn apply_if_current(
        &self,
        issued: &Selection,
        f: impl FnOnce(NavigationState) -> NavigationState,
    ) {
        let mut guard = self.state.write().unwrap();
        if Selection::of(&guard) != *issued {
            debug!("discarding response for a superseded selection");
            return;
        }
        let next = f(std::mem::take(&mut *guard));
        *guard = next;
    }

    pub async fn load_config(&self) -> Result<(), GatewayError> {
        let config = self.gateway.fetch_config().await?;
        self.update(|state| state.with_config(config));
        Ok(())
    }

    /// Select a provider, clearing everything downstream, then load its
    /// repository catalog.
    pub async fn select_provider(&self, vcs_id: Option<String>) -> Result<(), GatewayError> {
        let issued = self.update(|state| state.with_provider(vcs_id.clone()));

        let Some(vcs_id) = vcs_id else {
            return Ok(());
        };

        let repositories = self.gateway.fetch_repositories(&vcs_id).await?;
        self.apply_if_current(&issued, |state| state.with_repositories(repositories));
        Ok(())
    }

    /// Select a repository from the loaded catalog: branch goes to the
    /// repository's default, path to the root, then branches and the root
    /// listing are fetched. An unknown name is ignored.
    pub async fn select_repository(&self, name: &str) -> Result<(), GatewayError> {
        let Some(repository) = self.state.read().unwrap().repositories.get(name).cloned()
        else {
            return Ok(());
        };

        let issued = self.update(|state| state.with_repository(&repository));

        let branches = self.gateway.fetch_branches(&repository).await?;
        self.apply_if_current(&issued, |state| state.with_branches(branches));

        self.refresh_directory(&issued, &repository).await
    }

    /// Select a branch, keeping the current path, and re-read the directory
    /// under the new branch.
    pub async fn select_branch(&self, branch: String) -> Result<(), GatewayError> {
        let Some(repository) = self.current_repository() else {
            return Ok(());
        };

        let issued = self.update(|state| state.with_branch(branch));
        self.refresh_directory(&issued, &repository).await
    }

    /// Descend into a directory entry of the current listing. Non-directory
    /// or unknown names are ignored.
    pub async fn open_folder(&self, name: &str) -> Result<(), GatewayError> {
        let (repository, child) = {
            let state = self.state.read().unwrap();
            let Some(entry) = state.entry(name) else {
                return Ok(());
            };
            if entry.kind.is_file() {
                return Ok(());
            }
            let Some(repository) = state.repository().cloned() else {
                return Ok(());
            };
            (repository, state.path.child(name))
        };

        let issued = self.update(|state| state.with_path(child));
        self.refresh_directory(&issued, &repository).await
    }

    /// Go up one level. At the root this is a no-op; otherwise the parent
    /// listing is fetched fresh rather than served from any cache.
    pub async fn go_back(&self) -> Result<(), GatewayError> {
        let (repository, parent) = {
            let state = self.state.read().unwrap();
            if state.path.is_root() {
                return Ok(());
            }
            let Some(repository) = state.repository().cloned() else {
                return Ok(());
            };
            (repository, state.path.parent())
        };

        let issued = self.update(|state| state.with_path(parent));
        self.refresh_directory(&issued, &repository).await
    }

    /// Open a file preview. Directory entries and unknown names are ignored.
    pub async fn preview_file(&self, name: &str) -> Result<(), GatewayError> {
        let Some((repository, branch, path)) = self.file_target(name) else {
            return Ok(());
        };

        let issued = Selection::of(&self.state.read().unwrap());
        let content = self.gateway.fetch_file(&repository, &branch, &path).await?;
        self.apply_if_current(&issued, |state| {
            state.with_preview(Some(Preview {
                name: name.to_string(),
                content,
            }))
        });
        Ok(())
    }

    /// Close the open preview. The directory listing is untouched.
    pub fn close_preview(&self) {
        self.update(|state| state.with_preview(None));
    }

    /// Fetch a file and hand it to the query-editing consumer, closing any
    /// open preview. Directory entries and unknown names are ignored.
    pub async fn add_file_to_query(
        &self,
        name: &str,
        sink: &dyn QueryFileSink,
    ) -> Result<(), GatewayError> {
        let Some((repository, branch, path)) = self.file_target(name) else {
            return Ok(());
        };

        let issued = Selection::of(&self.state.read().unwrap());
        let content = self.gateway.fetch_file(&repository, &branch, &path).await?;

        let mut guard = self.state.write().unwrap();
        if Selection::of(&guard) != issued {
            return Ok(());
        }
        sink.append(QueryFile::raw_inline(name, content));
        let next = std::mem::take(&mut *guard).with_preview(None);
        *guard = next;
        Ok(())
    }

    fn current_repository(&self) -> Option<Repository> {
        self.state.read().unwrap().repository().cloned()
    }

    /// Resolve the target of a file operation: the entry must exist in the
    /// current listing and be a file, and a repository and branch must be
    /// selected.
    fn file_target(&self, name: &str) -> Option<(Repository, String, RepoPath)> {
        let state = self.state.read().unwrap();
        let entry = state.entry(name)?;
        if !entry.kind.is_file() {
            return None;
        }
        let repository = state.repository().cloned()?;
        let branch = state.selected_branch.clone()?;
        Some((repository, branch, state.path.child(name)))
    }

    /// Fetch the directory listing for the issued selection and apply it if
    /// that selection is still current.
    async fn refresh_directory(
        &self,
        issued: &Selection,
        repository: &Repository,
    ) -> Result<(), GatewayError> {
        let Some(branch) = issued.branch.clone() else {
            return Ok(());
        };

        let listing = self
            .gateway
            .fetch_directory(repository, &branch, &issued.path)
            .await?;
        self.apply_if_current(issued, |state| state.with_listing(listing));
        Ok(())
    }
}
