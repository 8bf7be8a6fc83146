use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use cafe_core::wire::{AddOrderResponse, MessageResponse};
use cafe_core::{PendingOrder, PersistedOrder};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/add_order", post(add_order))
        .route("/get_orders", get(get_orders))
        .route("/clear_orders", post(clear_orders))
}

/// POST /add_order
///
/// Resubmitting the same snapshot answers with the order already stored.
async fn add_order(
    State(state): State<AppState>,
    payload: Result<Json<PendingOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<AddOrderResponse>), AppError> {
    let Json(order) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let receipt = state.orders.submit_order(&order).await?;
    info!(
        "Order {} recorded ({} paise, {})",
        receipt.order_number,
        order.total(),
        order.payment_method()
    );

    Ok((
        StatusCode::CREATED,
        Json(AddOrderResponse {
            message: "Order saved successfully".to_string(),
            order_number: receipt.order_number,
            status: receipt.status,
        }),
    ))
}

/// GET /get_orders
async fn get_orders(State(state): State<AppState>) -> Result<Json<Vec<PersistedOrder>>, AppError> {
    let orders = state.orders.list_orders().await?;
    Ok(Json(orders))
}

/// POST /clear_orders
async fn clear_orders(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    state.orders.clear_orders().await?;
    info!("Order history cleared over HTTP");
    Ok(Json(MessageResponse {
        message: "All orders cleared".to_string(),
    }))
}
