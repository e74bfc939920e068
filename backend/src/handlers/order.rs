//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::OrderView;
use crate::services::order::OrderInput;
use crate::services::OrderService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: OrderView,
}

#[derive(Serialize)]
pub struct OrdersResponse {
    pub message: String,
    pub orders: Vec<OrderView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedOrdersResponse {
    pub message: String,
    pub orders: Vec<OrderView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_orders: i64,
}

/// Create a new pending order
pub async fn add_order(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    let service = OrderService::new(state.db);
    let order = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order created successfully".to_string(),
            order,
        }),
    ))
}

/// List all orders, pending first
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<OrdersResponse>> {
    let service = OrderService::new(state.db);
    let orders = service.list().await?;
    Ok(Json(OrdersResponse {
        message: "Orders retrieved successfully".to_string(),
        orders,
    }))
}

/// List orders with pagination
pub async fn orders_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedOrdersResponse>> {
    let page = normalize_page(query.page);
    let service = OrderService::new(state.db);
    let (orders, total) = service.list_page(page).await?;
    Ok(Json(PagedOrdersResponse {
        message: "Orders retrieved successfully".to_string(),
        orders,
        current_page: page,
        total_pages: total_pages(total),
        total_orders: total,
    }))
}

/// Get an order by id
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let service = OrderService::new(state.db);
    let order = service.get(id).await?;
    Ok(Json(OrderResponse {
        message: "Order retrieved successfully".to_string(),
        order,
    }))
}

/// Mark an order as received, crediting material stock
pub async fn receive_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderResponse>> {
    let service = OrderService::new(state.db);
    let order = service.receive(id).await?;
    Ok(Json(OrderResponse {
        message: "Order received and stock updated successfully".to_string(),
        order,
    }))
}

/// Edit an order
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<OrderInput>,
) -> AppResult<Json<OrderResponse>> {
    let service = OrderService::new(state.db);
    let order = service.update(id, input).await?;
    Ok(Json(OrderResponse {
        message: "Order updated successfully".to_string(),
        order,
    }))
}

/// Delete an order
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = OrderService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
