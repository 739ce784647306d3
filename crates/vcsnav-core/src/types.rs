use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported provider kinds. Dispatch over this enum is always exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Github,
    Gitlab,
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VcsKind::Github => write!(f, "github"),
            VcsKind::Gitlab => write!(f, "gitlab"),
        }
    }
}

impl TryFrom<&str> for VcsKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "github" => Ok(VcsKind::Github),
            "gitlab" => Ok(VcsKind::Gitlab),
            _ => Err(format!("Unknown provider kind: {}", value)),
        }
    }
}

/// One configured provider. Loaded at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VcsSettings {
    /// Unique provider id, e.g. `gh`. Repositories reference it back.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VcsKind,
    /// Base API URL. For GitLab this is the projects endpoint itself.
    pub api: String,
}

/// Provider configuration as exposed to clients: settings plus a boolean
/// token-presence flag. The token value itself never leaves the cookie store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VcsConfigEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VcsKind,
    pub api: String,
    pub token: bool,
}

impl VcsConfigEntry {
    pub fn from_settings(settings: &VcsSettings, token: bool) -> Self {
        Self {
            id: settings.id.clone(),
            name: settings.name.clone(),
            kind: settings.kind,
            api: settings.api.clone(),
            token,
        }
    }
}

/// Repository as returned by the GitHub adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepository {
    pub name: String,
    pub owner: String,
    pub default_branch: String,
    /// Id of the provider this repository was fetched from.
    pub vcs_id: String,
}

/// Repository as returned by the GitLab adapter. The numeric project id is
/// carried as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitlabRepository {
    pub name: String,
    pub project_id: String,
    pub web_url: String,
    pub default_branch: String,
    pub vcs_id: String,
}

/// Polymorphic repository value. The variants have disjoint required fields
/// (`owner` vs `projectId`), so the untagged representation round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Repository {
    Github(GithubRepository),
    Gitlab(GitlabRepository),
}

impl Repository {
    pub fn name(&self) -> &str {
        match self {
            Repository::Github(r) => &r.name,
            Repository::Gitlab(r) => &r.name,
        }
    }

    /// Provider id this repository belongs to. A repository is only ever
    /// interpreted against the adapter whose id matches.
    pub fn vcs_id(&self) -> &str {
        match self {
            Repository::Github(r) => &r.vcs_id,
            Repository::Gitlab(r) => &r.vcs_id,
        }
    }

    pub fn default_branch(&self) -> &str {
        match self {
            Repository::Github(r) => &r.default_branch,
            Repository::Gitlab(r) => &r.default_branch,
        }
    }
}

/// Kind of a directory entry. `Directory` orders before `File` so a stable
/// sort by kind lists directories first while keeping provider order for ties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    /// Normalize a provider-reported type. GitHub reports `dir`/`file`, the
    /// GitLab tree API reports `tree`/`blob`; anything unrecognized is a file.
    pub fn from_provider_type(raw: &str) -> Self {
        match raw {
            "tree" | "dir" | "directory" => EntryKind::Directory,
            _ => EntryKind::File,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }
}

/// A named node in a repository tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Sort a listing so all directories precede all files, tie-broken by the
/// provider's original return order.
pub fn sort_directories_first(entries: &mut [DirectoryEntry]) {
    entries.sort_by_key(|entry| entry.kind);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn provider_types_normalize_to_entry_kinds() {
        assert_eq!(EntryKind::from_provider_type("tree"), EntryKind::Directory);
        assert_eq!(EntryKind::from_provider_type("dir"), EntryKind::Directory);
        assert_eq!(EntryKind::from_provider_type("blob"), EntryKind::File);
        assert_eq!(EntryKind::from_provider_type("file"), EntryKind::File);
        assert_eq!(EntryKind::from_provider_type("symlink"), EntryKind::File);
    }

    #[test]
    fn directories_sort_before_files_stably() {
        let mut entries = vec![
            entry("b.ts", EntryKind::File),
            entry("a", EntryKind::Directory),
            entry("a.ts", EntryKind::File),
            entry("z", EntryKind::Directory),
        ];
        sort_directories_first(&mut entries);

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "z", "b.ts", "a.ts"]);
    }

    #[test]
    fn repository_deserializes_by_variant_shape() {
        let github: Repository = serde_json::from_str(
            r#"{"name":"app","owner":"octocat","defaultBranch":"main","vcsId":"gh"}"#,
        )
        .unwrap();
        assert!(matches!(github, Repository::Github(_)));
        assert_eq!(github.vcs_id(), "gh");

        let gitlab: Repository = serde_json::from_str(
            r#"{"name":"app","projectId":"42","webUrl":"https://gitlab.example/g/app","defaultBranch":"master","vcsId":"gl"}"#,
        )
        .unwrap();
        assert!(matches!(gitlab, Repository::Gitlab(_)));
        assert_eq!(gitlab.default_branch(), "master");
    }

    #[test]
    fn directory_entry_wire_shape_uses_kind() {
        let entry = DirectoryEntry {
            name: "src".to_string(),
            kind: EntryKind::Directory,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"name": "src", "kind": "directory"}));
    }
}
