use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    domain::{authorize, Action, AuthzContext, RepoKey, RepoModerationEdit, User},
    repositories::{LabelRepository, RepoRepository, Report, ReportRepository},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repositories", put(update_repository))
        .route("/repositories", delete(delete_repository))
        .route("/labels", delete(delete_label))
        .route("/reports", get(list_reports))
        .route("/reports/resolve", post(resolve_report))
}

fn admin_context(auth_session: &AuthSession, action: Action) -> Result<AuthzContext, ApiError> {
    let user: &User = auth_session
        .user
        .as_ref()
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;

    let ctx = AuthzContext::from(user);
    authorize(&ctx, action)?;

    Ok(ctx)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRepositoryBody {
    id: String,
    primary_label: String,
    #[serde(default)]
    labels: Vec<String>,
    maintain_link: Option<String>,
}

#[instrument(name = "PUT /admin/repositories", skip(auth_session, app_state))]
async fn update_repository(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<UpdateRepositoryBody>,
) -> Result<StatusCode, ApiError> {
    admin_context(&auth_session, Action::ModerateRepository)?;

    let key: RepoKey = body.id.parse()?;
    let edit = RepoModerationEdit {
        primary_label: body.primary_label,
        labels: body.labels,
        maintain_link: body.maintain_link,
    };
    app_state
        .repository_repo
        .update_moderation(&key, &edit)
        .await?;

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
struct DeleteRepositoryBody {
    id: String,
}

#[instrument(name = "DELETE /admin/repositories", skip(auth_session, app_state))]
async fn delete_repository(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<DeleteRepositoryBody>,
) -> Result<StatusCode, ApiError> {
    admin_context(&auth_session, Action::DeleteRepository)?;

    let key: RepoKey = body.id.parse()?;
    app_state.repository_repo.delete_repository(&key).await?;
    tracing::info!("Deleted repository: {}", key);

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
struct DeleteLabelBody {
    name: String,
}

#[instrument(name = "DELETE /admin/labels", skip(auth_session, app_state))]
async fn delete_label(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<DeleteLabelBody>,
) -> Result<StatusCode, ApiError> {
    admin_context(&auth_session, Action::DeleteLabel)?;

    app_state.label_repo.delete_label(&body.name).await?;

    Ok(StatusCode::OK)
}

#[instrument(name = "GET /admin/reports", skip(auth_session, app_state))]
async fn list_reports(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Report>>, ApiError> {
    admin_context(&auth_session, Action::ReviewReports)?;

    let reports = app_state.report_repo.list_open_reports().await?;

    Ok(Json(reports))
}

#[derive(Debug, Deserialize)]
struct ResolveReportBody {
    id: i32,
}

#[instrument(name = "POST /admin/reports/resolve", skip(auth_session, app_state))]
async fn resolve_report(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<ResolveReportBody>,
) -> Result<StatusCode, ApiError> {
    admin_context(&auth_session, Action::ReviewReports)?;

    app_state.report_repo.resolve_report(body.id).await?;

    Ok(StatusCode::OK)
}
