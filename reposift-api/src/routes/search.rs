use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    domain::{
        search::{RawSearchParams, SearchError},
        Provider, RepoKey,
    },
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(indexed_search))
        .route("/live", get(live_search))
}

#[instrument(name = "GET /search", skip(app_state))]
async fn indexed_search(
    State(app_state): State<AppState>,
    Query(params): Query<RawSearchParams>,
) -> (StatusCode, Json<serde_json::Value>) {
    match app_state.search.search(&params).await {
        Ok(page) => (StatusCode::OK, Json(json!({ "data": &*page }))),
        Err(SearchError::Validation(messages)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": messages })))
        }
        Err(err) => {
            tracing::error!("Indexed search failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Unexpected error, try again later" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveSearchParams {
    query: String,
    provider: Option<Provider>,
}

/// Results straight from the provider's search API; these repositories
/// are not necessarily indexed, so no label or language associations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveRepoRecord {
    id: String,
    provider: Provider,
    author: String,
    name: String,
    description: Option<String>,
    stars: i64,
    #[serde(with = "time::serde::rfc3339")]
    last_updated: OffsetDateTime,
    url: String,
}

impl From<github_rest::Repo> for LiveRepoRecord {
    fn from(repo: github_rest::Repo) -> Self {
        let last_updated = repo.last_activity();

        Self {
            id: RepoKey::new(Provider::Github, repo.id).to_string(),
            provider: Provider::Github,
            author: repo.owner.login,
            name: repo.name,
            description: repo.description,
            stars: repo.stargazers_count,
            last_updated,
            url: repo.html_url,
        }
    }
}

const LIVE_SEARCH_PAGE_SIZE: u8 = 25;

#[instrument(name = "GET /search/live", skip(app_state))]
async fn live_search(
    State(app_state): State<AppState>,
    Query(params): Query<LiveSearchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match params.provider.unwrap_or(Provider::Github) {
        Provider::Github => {}
        other => {
            return Err(ApiError::bad_request(format!(
                "Provider '{other}' is not supported yet"
            )))
        }
    }

    if params.query.trim().is_empty() {
        return Err(ApiError::bad_request("query: must be non-empty"));
    }

    let response = app_state
        .github
        .search_repositories(&params.query, LIVE_SEARCH_PAGE_SIZE)
        .await?;

    let items: Vec<LiveRepoRecord> = response
        .items
        .into_iter()
        .map(LiveRepoRecord::from)
        .collect();

    Ok(Json(json!({ "data": { "items": items } })))
}
