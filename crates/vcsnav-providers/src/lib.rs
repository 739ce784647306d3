//! Provider adapters normalizing the GitHub and GitLab REST APIs into one
//! uniform contract.

pub mod github;
pub mod gitlab;
pub mod provider;

pub use github::GithubProvider;
pub use gitlab::GitlabProvider;
pub use provider::{provider_for, ProviderError, VcsProviderService};
