use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    domain::{authorize, safe_name, Action, AuthzContext, Label, LabelKind},
    repositories::{LabelRepository, NewLabel},
    routes::ApiError,
    AppState,
};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(list_labels))
}

pub fn protected_router() -> Router<AppState> {
    Router::new().route("/", post(suggest_label))
}

#[derive(Debug, Deserialize)]
struct ListLabelsParams {
    kind: Option<LabelKind>,
}

#[instrument(name = "GET /labels", skip(app_state))]
async fn list_labels(
    State(app_state): State<AppState>,
    Query(params): Query<ListLabelsParams>,
) -> Result<Json<Vec<Label>>, ApiError> {
    let labels = app_state.label_repo.list_labels(params.kind).await?;

    Ok(Json(labels))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestLabelBody {
    display_name: String,
}

#[instrument(name = "POST /labels", skip(auth_session, app_state))]
async fn suggest_label(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<SuggestLabelBody>,
) -> Result<Json<Label>, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;
    let ctx = AuthzContext::from(&user);
    authorize(&ctx, Action::SuggestLabel)?;

    if safe_name(&body.display_name).is_empty() {
        return Err(ApiError::bad_request(
            "display_name: must contain at least one alphanumeric character",
        ));
    }

    let new_label = NewLabel {
        display_name: body.display_name.trim().to_owned(),
        kind: LabelKind::Regular,
        suggested_by: Some(ctx.user_id),
    };
    let label = app_state.label_repo.insert_label(&new_label).await?;

    Ok(Json(label))
}
