//! Shared data model and wire contracts for the VCS navigation service

pub mod error;
pub mod path;
pub mod types;

pub use error::{ErrorBody, VcsApiError};
pub use path::RepoPath;
pub use types::{
    sort_directories_first, DirectoryEntry, EntryKind, GithubRepository, GitlabRepository,
    Repository, VcsConfigEntry, VcsKind, VcsSettings,
};

/// Name of the credential cookie for a provider. One cookie per provider id.
pub fn token_cookie_name(vcs_id: &str) -> String {
    format!("vcs_{}", vcs_id)
}
