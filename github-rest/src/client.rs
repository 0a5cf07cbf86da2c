use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{languages_by_share, Repo, SearchResponse};

const API_BASE: &str = "https://api.github.com";

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: Option<String>,
}

impl GithubClient {
    /// A token raises the rate limit and grants access to private data;
    /// anonymous clients work for public repositories.
    pub fn new(user_agent: &str, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, token }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GithubError> {
        let mut request = self
            .http
            .get(format!("{}{}", API_BASE, path))
            .header("Accept", "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| GithubError::Response(e.to_string()))?;

        match resp.status().as_u16() {
            401 => return Err(GithubError::Unauthorized),
            403 | 429 => return Err(GithubError::RateLimited),
            404 => return Err(GithubError::NotFound),
            status if status >= 400 => {
                return Err(GithubError::Response(format!(
                    "unexpected status {status} for {path}"
                )))
            }
            _ => {}
        }

        resp.json::<T>()
            .await
            .map_err(|e| GithubError::Parsing(format!("Failed to parse response as JSON: {e}")))
    }

    pub async fn get_repository(&self, owner: &str, name: &str) -> Result<Repo, GithubError> {
        self.fetch(&format!("/repos/{owner}/{name}"), &[]).await
    }

    /// Languages of a repository, most-used first.
    pub async fn list_languages(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Vec<String>, GithubError> {
        let breakdown: HashMap<String, u64> = self
            .fetch(&format!("/repos/{owner}/{name}/languages"), &[])
            .await?;

        Ok(languages_by_share(breakdown))
    }

    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u8,
    ) -> Result<SearchResponse, GithubError> {
        let per_page = per_page.to_string();
        self.fetch(
            "/search/repositories",
            &[("q", query), ("per_page", per_page.as_str())],
        )
        .await
    }
}

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Rate limited")]
    RateLimited,
    #[error("Not found")]
    NotFound,
    #[error("ResponseError: {0}")]
    Response(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
}
