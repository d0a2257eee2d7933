mod dto;
pub mod handlers;
pub mod repo;

pub(crate) use dto::normalize_currency_code;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
