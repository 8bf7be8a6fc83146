use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use cafe_catalog::MenuItem;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu))
        .route("/menu/{item_id}", get(get_menu_item))
}

/// GET /menu
async fn list_menu(State(state): State<AppState>) -> Json<Vec<MenuItem>> {
    Json(state.menu.items().to_vec())
}

/// GET /menu/{item_id}
async fn get_menu_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<MenuItem>, AppError> {
    state
        .menu
        .get(&item_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("No menu item '{}'", item_id)))
}
