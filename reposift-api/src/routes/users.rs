use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::AuthSession,
    domain::{authorize, Action, AuthzContext, User},
    repositories::UserRepository,
    routes::ApiError,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me", put(update_profile))
}

#[instrument(name = "GET /users/me", skip(auth_session))]
async fn me(auth_session: AuthSession) -> Result<Json<User>, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;

    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileBody {
    display_name: String,
}

#[instrument(name = "PUT /users/me", skip(auth_session, app_state))]
async fn update_profile(
    auth_session: AuthSession,
    State(app_state): State<AppState>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<User>, ApiError> {
    let user = auth_session
        .user
        .ok_or_else(|| ApiError::unauthorized("Not logged in"))?;
    let ctx = AuthzContext::from(&user);
    authorize(&ctx, Action::EditProfile)?;

    if body.display_name.trim().is_empty() {
        return Err(ApiError::bad_request("display_name: must be non-empty"));
    }

    let updated = app_state
        .user_repo
        .update_display_name(ctx.user_id, body.display_name.trim())
        .await?;

    Ok(Json(updated))
}
