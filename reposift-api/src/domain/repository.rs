use time::OffsetDateTime;

use super::{Language, Provider, RepoKey};

/// Snapshot of a repository as fetched live from its provider, in the
/// shape the store mutations consume.
#[derive(Debug, Clone)]
pub struct ProviderRepoData {
    pub key: RepoKey,
    pub author: String,
    pub name: String,
    pub description: Option<String>,
    pub stars: i64,
    pub last_updated: OffsetDateTime,
    pub languages: Vec<Language>,
}

impl ProviderRepoData {
    pub fn from_github(repo: github_rest::Repo, languages: Vec<String>) -> Self {
        let last_updated = repo.last_activity();

        Self {
            key: RepoKey::new(Provider::Github, repo.id),
            author: repo.owner.login,
            name: repo.name,
            description: repo.description,
            stars: repo.stargazers_count,
            last_updated,
            languages: languages
                .iter()
                .map(|display| Language::from_display(display))
                .collect(),
        }
    }
}

/// A contribution: live provider data plus the labels the suggesting
/// user picked.
#[derive(Debug, Clone)]
pub struct NewIndexedRepo {
    pub data: ProviderRepoData,
    pub primary_label: String,
    pub labels: Vec<String>,
    pub suggested_by: i32,
}

/// Admin edit of a repository's label set and maintain-link.
#[derive(Debug, Clone)]
pub struct RepoModerationEdit {
    pub primary_label: String,
    pub labels: Vec<String>,
    pub maintain_link: Option<String>,
}
