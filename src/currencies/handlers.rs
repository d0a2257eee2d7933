use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sqlx::Connection;
use tracing::{info, instrument, warn};

use super::dto::{CurrencyCreate, CurrencyResponse};
use super::repo;
use crate::{
    auth::CurrentUser,
    db::StoreError,
    error::ApiError,
    extract::ValidJson,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/currencies", get(list_currencies).post(create_currency))
        .route("/currencies/", get(list_currencies).post(create_currency))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn list_currencies(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<CurrencyResponse>>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let rows = repo::list_active(&mut conn).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn create_currency(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CurrencyCreate>,
) -> Result<(StatusCode, Json<CurrencyResponse>), ApiError> {
    let currency = body.validate()?;

    let mut conn = state.db.acquire().await?;
    if repo::get(&mut conn, &currency.currency_id).await?.is_some() {
        warn!(code = %currency.currency_id, "currency already exists");
        return Err(already_exists(&currency.currency_id));
    }

    let mut tx = conn.begin().await?;
    let created = match repo::insert(&mut *tx, &currency).await {
        Ok(c) => c,
        Err(StoreError::UniqueViolation) => return Err(already_exists(&currency.currency_id)),
        Err(e) => return Err(e.into()),
    };
    tx.commit().await?;

    info!(code = %created.currency_id, "currency created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

fn already_exists(code: &str) -> ApiError {
    ApiError::Conflict(format!("Currency {code} already exists"))
}
