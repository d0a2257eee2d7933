use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{normalize_email, LoginForm, MeResponse, RegisterRequest, TokenResponse, UserRead};
use super::extractors::CurrentUser;
use super::services::{authenticate, register_user, validate_registration};
use crate::{
    error::ApiError,
    extract::{ValidForm, ValidJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserRead>), ApiError> {
    let email = validate_registration(&payload.email, &payload.password)?;

    let mut conn = state.db.acquire().await?;
    let user = register_user(&mut conn, &email, &payload.password).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = normalize_email(&form.username);

    let mut conn = state.db.acquire().await?;
    let user = authenticate(&mut conn, &email, &form.password).await?;

    let token = state.keys.issue(&user.id.to_string(), Some(user.email.as_str()), None)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn get_me(current: CurrentUser) -> Json<MeResponse> {
    Json(current.user.into())
}
