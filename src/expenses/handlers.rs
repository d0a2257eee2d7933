use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use sqlx::Connection;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ExpenseCreate, ExpenseResponse, ExpenseUpdate, ListQuery};
use super::repo::{self, ListFilter};
use crate::{
    auth::CurrentUser,
    db::StoreError,
    error::ApiError,
    extract::{ValidJson, ValidPath, ValidQuery},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidQuery(q): ValidQuery<ListQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let category = q.validate()?;
    let filter = ListFilter {
        category: category.as_deref(),
        limit: q.limit,
        offset: q.offset,
    };

    let mut conn = state.db.acquire().await?;
    let rows = repo::list_by_user(&mut conn, current.user.id, &filter).await?;
    info!(count = rows.len(), "expenses listed");
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn create_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<ExpenseCreate>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let new = body.validate()?;

    let mut conn = state.db.acquire().await?;
    let mut tx = conn.begin().await?;
    let expense = repo::insert(&mut *tx, current.user.id, &new)
        .await
        .map_err(write_error)?;
    tx.commit().await?;

    info!(expense_id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense.into())))
}

#[instrument(skip_all, fields(user_id = %current.user.id, %id))]
pub async fn get_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let expense = repo::get_owned(&mut conn, current.user.id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(expense.into()))
}

#[instrument(skip_all, fields(user_id = %current.user.id, %id))]
pub async fn update_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<ExpenseUpdate>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let patch = body.validate()?;

    let mut conn = state.db.acquire().await?;
    let mut tx = conn.begin().await?;
    let mut expense = repo::get_owned_for_update(&mut *tx, current.user.id, id)
        .await?
        .ok_or_else(not_found)?;

    if patch.is_empty() {
        return Ok(Json(expense.into()));
    }
    patch.apply(&mut expense);

    let expense = repo::update(&mut *tx, &expense).await.map_err(write_error)?;
    tx.commit().await?;

    info!("expense updated");
    Ok(Json(expense.into()))
}

#[instrument(skip_all, fields(user_id = %current.user.id, %id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut conn = state.db.acquire().await?;
    let mut tx = conn.begin().await?;
    if !repo::delete_owned(&mut *tx, current.user.id, id).await? {
        return Err(not_found());
    }
    tx.commit().await?;

    info!("expense deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn not_found() -> ApiError {
    warn!("expense not found for caller");
    ApiError::NotFound("Expense")
}

fn write_error(e: StoreError) -> ApiError {
    match e {
        StoreError::ForeignKeyViolation => ApiError::Validation("unknown currency".into()),
        other => other.into(),
    }
}
