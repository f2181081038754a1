pub mod dto;
pub mod handlers;
pub mod migrate;
pub mod repo;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::journal_routes())
        .merge(handlers::weight_routes())
}
