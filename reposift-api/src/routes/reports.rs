use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::AuthSession,
    domain::{authorize, Action, AuthzContext},
    repositories::{NewReport, ReportRepository},
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReportBody {
    category: String,
    description: String,
    repo_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct SubmitReportResponse {
    id: i32,
}

#[instrument(name = "POST /reports", skip(auth_session, app_state, body))]
async fn submit_report(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<SubmitReportBody>,
) -> Result<Json<SubmitReportResponse>, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;
    let ctx = AuthzContext::from(&user);
    authorize(&ctx, Action::SubmitReport)?;

    if body.category.trim().is_empty() {
        return Err(ApiError::bad_request("category: must be non-empty"));
    }
    if body.description.trim().is_empty() {
        return Err(ApiError::bad_request("description: must be non-empty"));
    }

    let new_report = NewReport {
        reporter: ctx.user_id,
        category: body.category,
        description: body.description,
        repo_id: body.repo_id,
    };
    let id = app_state.report_repo.insert_report(&new_report).await?;

    Ok(Json(SubmitReportResponse { id }))
}
