use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};

use vcsnav_core::{
    sort_directories_first, token_cookie_name, DirectoryEntry, ErrorBody, Repository,
    VcsApiError, VcsConfigEntry, VcsSettings,
};
use vcsnav_providers::{provider_for, VcsProviderService};

use super::types::AppState;
use crate::credentials::{CookieCredentialStore, CredentialStore};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub vcs_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTokenRequest {
    pub vcs_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenCreatedResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenRemovedResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RepositoriesQuery {
    /// Provider id to list repositories for.
    pub vcs_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TreeQuery {
    /// URL-encoded JSON of the Repository value.
    pub repository: Option<String>,
    /// Slash-separated path inside the repository; empty means root.
    pub path: Option<String>,
    /// Branch to read from.
    pub branch: Option<String>,
}

fn find_settings<'a>(state: &'a AppState, vcs_id: &str) -> Result<&'a VcsSettings, VcsApiError> {
    if state.providers.is_empty() {
        return Err(VcsApiError::ConfigNotFound);
    }
    state
        .providers
        .iter()
        .find(|settings| settings.id == vcs_id)
        .ok_or(VcsApiError::VcsNotSupported)
}

/// Resolve the adapter and credential for a provider id. Validation order:
/// configuration present, provider known, credential present.
fn resolve_provider(
    state: &AppState,
    store: &dyn CredentialStore,
    vcs_id: &str,
) -> Result<(Box<dyn VcsProviderService>, String), VcsApiError> {
    let settings = find_settings(state, vcs_id)?;
    let token = store.get(&settings.id).ok_or(VcsApiError::TokenRequired)?;
    Ok((provider_for(settings, state.upstream.clone()), token))
}

fn parse_repository(raw: Option<&String>) -> Result<Repository, VcsApiError> {
    let raw = raw
        .filter(|value| !value.is_empty())
        .ok_or(VcsApiError::RepositoryRequired)?;
    serde_json::from_str(raw).map_err(|_| VcsApiError::RepositoryRequired)
}

/// An empty provider id is as missing as an absent one.
fn required_vcs_id(vcs_id: Option<String>) -> Result<String, VcsApiError> {
    vcs_id
        .filter(|value| !value.is_empty())
        .ok_or(VcsApiError::VcsIdRequired)
}

fn required_branch(branch: Option<&String>) -> Result<&str, VcsApiError> {
    branch
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(VcsApiError::BranchRequired)
}

/// List configured providers with their token-presence flags.
#[utoipa::path(
    get,
    path = "/api/vcs/config",
    responses(
        (status = 200, description = "Configured providers", body = [VcsConfigEntry]),
        (status = 404, description = "No provider is configured", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn get_vcs_config(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Vec<VcsConfigEntry>>, VcsApiError> {
    if state.providers.is_empty() {
        return Err(VcsApiError::ConfigNotFound);
    }

    let store = CookieCredentialStore::new(cookies);
    let config = state
        .providers
        .iter()
        .map(|settings| VcsConfigEntry::from_settings(settings, store.has(&settings.id)))
        .collect();

    Ok(Json(config))
}

/// Store a provider credential in the session cookie store.
#[utoipa::path(
    post,
    path = "/api/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token stored", body = TokenCreatedResponse),
        (status = 400, description = "Missing or unknown vcs id, or missing token", body = ErrorBody),
        (status = 404, description = "No provider is configured", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenCreatedResponse>, VcsApiError> {
    let vcs_id = required_vcs_id(request.vcs_id)?;
    let settings = find_settings(&state, &vcs_id)?;
    let token = request
        .token
        .filter(|token| !token.is_empty())
        .ok_or(VcsApiError::TokenRequired)?;

    let store = CookieCredentialStore::new(cookies);
    store.save(&settings.id, &token);

    Ok(Json(TokenCreatedResponse {
        message: format!("{} token created", token_cookie_name(&settings.id)),
    }))
}

/// Remove a provider credential. A missing vcs id is rejected without
/// touching any cookie.
#[utoipa::path(
    delete,
    path = "/api/token",
    request_body = RemoveTokenRequest,
    responses(
        (status = 200, description = "Token removed", body = TokenRemovedResponse),
        (status = 400, description = "Missing vcs id", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn remove_token(
    cookies: Cookies,
    Json(request): Json<RemoveTokenRequest>,
) -> Result<Json<TokenRemovedResponse>, VcsApiError> {
    let vcs_id = required_vcs_id(request.vcs_id)?;

    let store = CookieCredentialStore::new(cookies);
    store.remove(&vcs_id);

    Ok(Json(TokenRemovedResponse { success: true }))
}

/// List all repositories the stored credential owns, keyed by name.
#[utoipa::path(
    get,
    path = "/api/vcs/repositories",
    params(RepositoriesQuery),
    responses(
        (status = 200, description = "Repositories keyed by name"),
        (status = 400, description = "Missing vcs id or token, or unsupported provider", body = ErrorBody),
        (status = 404, description = "No provider is configured", body = ErrorBody),
        (status = 500, description = "Upstream rejected the credential", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn get_repositories(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(query): Query<RepositoriesQuery>,
) -> Result<Json<BTreeMap<String, Repository>>, VcsApiError> {
    let vcs_id = required_vcs_id(query.vcs_id)?;
    let store = CookieCredentialStore::new(cookies);
    let (provider, token) = resolve_provider(&state, &store, &vcs_id)?;

    let repositories = provider.list_repositories(&token).await.map_err(|e| {
        error!("Error getting list of repositories: {}", e);
        VcsApiError::from(e)
    })?;

    Ok(Json(repositories))
}

/// List branch names for a repository.
#[utoipa::path(
    get,
    path = "/api/vcs/branches",
    params(TreeQuery),
    responses(
        (status = 200, description = "Branch names", body = [String]),
        (status = 400, description = "Missing repository or token", body = ErrorBody),
        (status = 404, description = "No provider is configured", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn get_branches(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<String>>, VcsApiError> {
    let repository = parse_repository(query.repository.as_ref())?;
    let store = CookieCredentialStore::new(cookies);
    let (provider, token) = resolve_provider(&state, &store, repository.vcs_id())?;

    let branches = provider
        .list_branches(&token, &repository)
        .await
        .map_err(|e| {
            error!("Error getting list of branches: {}", e);
            VcsApiError::from(e)
        })?;

    Ok(Json(branches))
}

/// List a directory. Directories are sorted before files, tie-broken by the
/// provider's original return order.
#[utoipa::path(
    get,
    path = "/api/vcs",
    params(TreeQuery),
    responses(
        (status = 200, description = "Directory entries", body = [DirectoryEntry]),
        (status = 400, description = "Missing repository, path, branch or token", body = ErrorBody),
        (status = 404, description = "No provider is configured", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn get_directory_content(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, VcsApiError> {
    let repository = parse_repository(query.repository.as_ref())?;
    let store = CookieCredentialStore::new(cookies);
    let (provider, token) = resolve_provider(&state, &store, repository.vcs_id())?;

    // The root path is the empty string, so only absence is an error here.
    let path = query.path.as_deref().ok_or(VcsApiError::PathRequired)?;
    let branch = required_branch(query.branch.as_ref())?;

    let mut entries = provider
        .list_directory(&token, &repository, branch, path)
        .await
        .map_err(|e| {
            error!("Error getting list of directories: {}", e);
            VcsApiError::from(e)
        })?;

    sort_directories_first(&mut entries);
    Ok(Json(entries))
}

/// Fetch one file's content as plain text.
#[utoipa::path(
    get,
    path = "/api/vcs/file",
    params(TreeQuery),
    responses(
        (status = 200, description = "Raw file content", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing repository, path, branch or token", body = ErrorBody),
        (status = 404, description = "No provider is configured", body = ErrorBody)
    ),
    tag = "Vcs"
)]
pub async fn get_file_content(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(query): Query<TreeQuery>,
) -> Result<Response, VcsApiError> {
    let repository = parse_repository(query.repository.as_ref())?;
    let store = CookieCredentialStore::new(cookies);
    let (provider, token) = resolve_provider(&state, &store, repository.vcs_id())?;

    let path = query
        .path
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(VcsApiError::PathRequired)?;
    let branch = required_branch(query.branch.as_ref())?;

    let content = provider
        .get_file_content(&token, &repository, branch, path)
        .await
        .map_err(|e| {
            error!("Error getting file content: {}", e);
            VcsApiError::from(e)
        })?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_vcs_config,
        create_token,
        remove_token,
        get_repositories,
        get_branches,
        get_directory_content,
        get_file_content
    ),
    components(
        schemas(
            VcsConfigEntry,
            DirectoryEntry,
            ErrorBody,
            TokenRequest,
            RemoveTokenRequest,
            TokenCreatedResponse,
            TokenRemovedResponse
        )
    ),
    tags(
        (name = "Vcs", description = "VCS repository browsing endpoints")
    )
)]
pub struct VcsApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::testing::MemoryCredentialStore;
    use vcsnav_core::VcsKind;

    fn state(providers: Vec<VcsSettings>) -> AppState {
        AppState::new(providers)
    }

    fn github_settings() -> VcsSettings {
        VcsSettings {
            id: "gh".to_string(),
            name: "GitHub".to_string(),
            kind: VcsKind::Github,
            api: "https://api.github.example".to_string(),
        }
    }

    // The Ok arm holds a trait object, so collapse it to its kind before
    // unwrapping the error.
    fn resolve_err(state: &AppState, store: &dyn CredentialStore, vcs_id: &str) -> VcsApiError {
        resolve_provider(state, store, vcs_id)
            .map(|(provider, token)| (provider.kind(), token))
            .unwrap_err()
    }

    #[test]
    fn resolve_fails_with_404_when_nothing_is_configured() {
        let state = state(vec![]);
        let store = MemoryCredentialStore::default();
        let err = resolve_err(&state, &store, "gh");
        assert_eq!(err, VcsApiError::ConfigNotFound);
    }

    #[test]
    fn resolve_rejects_unknown_provider_before_checking_the_token() {
        let state = state(vec![github_settings()]);
        let store = MemoryCredentialStore::with_token("bitbucket", "abc");
        let err = resolve_err(&state, &store, "bitbucket");
        assert_eq!(err, VcsApiError::VcsNotSupported);
    }

    #[test]
    fn resolve_requires_a_stored_token() {
        let state = state(vec![github_settings()]);
        let store = MemoryCredentialStore::default();
        let err = resolve_err(&state, &store, "gh");
        assert_eq!(err, VcsApiError::TokenRequired);
    }

    #[test]
    fn resolve_returns_the_matching_adapter_and_token() {
        let state = state(vec![github_settings()]);
        let store = MemoryCredentialStore::with_token("gh", "abc");
        let (provider, token) = resolve_provider(&state, &store, "gh").unwrap();
        assert_eq!(provider.kind(), VcsKind::Github);
        assert_eq!(token, "abc");
    }

    #[test]
    fn repository_param_must_be_present_and_decodable() {
        assert_eq!(
            parse_repository(None).unwrap_err(),
            VcsApiError::RepositoryRequired
        );
        assert_eq!(
            parse_repository(Some(&"not json".to_string())).unwrap_err(),
            VcsApiError::RepositoryRequired
        );

        let raw = r#"{"name":"app","owner":"octocat","defaultBranch":"main","vcsId":"gh"}"#;
        let repository = parse_repository(Some(&raw.to_string())).unwrap();
        assert_eq!(repository.vcs_id(), "gh");
    }

    #[test]
    fn vcs_id_must_be_non_empty() {
        assert_eq!(
            required_vcs_id(None).unwrap_err(),
            VcsApiError::VcsIdRequired
        );
        assert_eq!(
            required_vcs_id(Some(String::new())).unwrap_err(),
            VcsApiError::VcsIdRequired
        );
        assert_eq!(required_vcs_id(Some("gh".to_string())).unwrap(), "gh");
    }

    #[test]
    fn branch_must_be_non_empty() {
        assert_eq!(
            required_branch(None).unwrap_err(),
            VcsApiError::BranchRequired
        );
        assert_eq!(
            required_branch(Some(&String::new())).unwrap_err(),
            VcsApiError::BranchRequired
        );
        assert_eq!(required_branch(Some(&"main".to_string())).unwrap(), "main");
    }
}
