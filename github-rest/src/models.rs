use std::collections::HashMap;

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub login: String,
    pub avatar_url: Option<String>,
}

/// Repository as returned by `GET /repos/{owner}/{repo}` and by the
/// items of `GET /search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub description: Option<String>,
    pub stargazers_count: i64,
    pub html_url: String,
    /// Null for repositories that have never received a push.
    #[serde(with = "time::serde::rfc3339::option")]
    pub pushed_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Repo {
    /// Timestamp of the last meaningful activity on the repository.
    pub fn last_activity(&self) -> OffsetDateTime {
        self.pushed_at.unwrap_or(self.updated_at)
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub total_count: i64,
    pub incomplete_results: bool,
    pub items: Vec<Repo>,
}

/// Order the language map from `GET /repos/{owner}/{repo}/languages`
/// (language -> bytes of code) by descending byte count.
pub(crate) fn languages_by_share(breakdown: HashMap<String, u64>) -> Vec<String> {
    let mut langs: Vec<(String, u64)> = breakdown.into_iter().collect();
    langs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    langs.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO_JSON: &str = r#"
    {
        "id": 10270250,
        "name": "react",
        "full_name": "facebook/react",
        "owner": {
            "login": "facebook",
            "avatar_url": "https://avatars.githubusercontent.com/u/69631?v=4"
        },
        "description": "The library for web and native user interfaces.",
        "stargazers_count": 228000,
        "html_url": "https://github.com/facebook/react",
        "pushed_at": "2024-06-01T12:30:00Z",
        "updated_at": "2024-06-01T13:00:00Z"
    }
    "#;

    #[test]
    fn deserialize_repo() {
        let repo: Repo = serde_json::from_str(REPO_JSON).unwrap();

        assert_eq!(repo.id, 10270250);
        assert_eq!(repo.full_name, "facebook/react");
        assert_eq!(repo.owner.login, "facebook");
        assert_eq!(repo.stargazers_count, 228000);
        assert!(repo.pushed_at.is_some());
    }

    #[test]
    fn deserialize_repo_without_push() {
        let json = REPO_JSON.replace(r#""2024-06-01T12:30:00Z""#, "null");
        let repo: Repo = serde_json::from_str(&json).unwrap();

        assert!(repo.pushed_at.is_none());
        assert_eq!(repo.last_activity(), repo.updated_at);
    }

    #[test]
    fn deserialize_search_response() {
        let json = format!(
            r#"{{ "total_count": 1, "incomplete_results": false, "items": [{}] }}"#,
            REPO_JSON
        );
        let response: SearchResponse = serde_json::from_str(&json).unwrap();

        assert_eq!(response.total_count, 1);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].name, "react");
    }

    #[test]
    fn languages_ordered_by_bytes() {
        let breakdown = HashMap::from([
            ("TypeScript".to_string(), 120_000),
            ("Rust".to_string(), 950_000),
            ("Shell".to_string(), 4_200),
        ]);

        let langs = languages_by_share(breakdown);
        assert_eq!(langs, vec!["Rust", "TypeScript", "Shell"]);
    }

    #[test]
    fn languages_tie_breaks_by_name() {
        let breakdown = HashMap::from([
            ("Go".to_string(), 100),
            ("C".to_string(), 100),
        ]);

        let langs = languages_by_share(breakdown);
        assert_eq!(langs, vec!["C", "Go"]);
    }
}
