use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::AuthSession,
    domain::{
        authorize, Action, AuthzContext, NewIndexedRepo, Provider, ProviderRepoData, RepoKey,
    },
    repositories::RepoRepository,
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(contribute_repository))
        .route("/refresh", post(refresh_repository))
}

/// Fetch live repository data from the provider, rejecting providers
/// without a client.
async fn fetch_provider_data(
    app_state: &AppState,
    provider: Provider,
    author: &str,
    name: &str,
) -> Result<ProviderRepoData, ApiError> {
    match provider {
        Provider::Github => {
            let repo = app_state.github.get_repository(author, name).await?;
            let languages = app_state.github.list_languages(author, name).await?;
            Ok(ProviderRepoData::from_github(repo, languages))
        }
        other => Err(ApiError::bad_request(format!(
            "Provider '{other}' is not supported yet"
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributeRepositoryBody {
    provider: Provider,
    author: String,
    name: String,
    primary_label: String,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ContributeRepositoryResponse {
    id: String,
}

#[instrument(
    name = "POST /repositories",
    skip(auth_session, app_state, body),
    fields(author = %body.author, name = %body.name)
)]
async fn contribute_repository(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<ContributeRepositoryBody>,
) -> Result<Json<ContributeRepositoryResponse>, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;
    let ctx = AuthzContext::from(&user);
    authorize(&ctx, Action::ContributeRepository)?;

    let data = fetch_provider_data(&app_state, body.provider, &body.author, &body.name).await?;
    let new_repo = NewIndexedRepo {
        data,
        primary_label: body.primary_label,
        labels: body.labels,
        suggested_by: ctx.user_id,
    };

    let id = app_state
        .repository_repo
        .insert_repository(&new_repo)
        .await?;
    tracing::info!("Indexed new repository: {}", id);

    Ok(Json(ContributeRepositoryResponse { id }))
}

#[derive(Debug, Deserialize)]
struct RefreshRepositoryBody {
    id: String,
}

#[instrument(name = "POST /repositories/refresh", skip(auth_session, app_state))]
async fn refresh_repository(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<RefreshRepositoryBody>,
) -> Result<StatusCode, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;
    let ctx = AuthzContext::from(&user);
    authorize(&ctx, Action::RefreshRepository)?;

    let key: RepoKey = body.id.parse()?;
    let summary = app_state.repository_repo.get_repository(&key).await?;

    let fresh = fetch_provider_data(
        &app_state,
        summary.key.provider,
        &summary.author,
        &summary.name,
    )
    .await?;
    app_state
        .repository_repo
        .refresh_repository(&key, &fresh)
        .await?;

    Ok(StatusCode::OK)
}
