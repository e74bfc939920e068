//! HTTP handlers for sales endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::SaleView;
use crate::services::sale::SaleInput;
use crate::services::SaleService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct SaleResponse {
    pub message: String,
    pub sale: SaleView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesResponse {
    pub message: String,
    pub sales: Vec<SaleView>,
    pub total_sales_amount: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedSalesResponse {
    pub message: String,
    pub sales: Vec<SaleView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_sales: i64,
}

/// Record a new sale
pub async fn add_sale(
    State(state): State<AppState>,
    Json(input): Json<SaleInput>,
) -> AppResult<(StatusCode, Json<SaleResponse>)> {
    let service = SaleService::new(state.db);
    let sale = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(SaleResponse {
            message: "Sale recorded successfully".to_string(),
            sale,
        }),
    ))
}

/// List all sales with the overall sales amount
pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<SalesResponse>> {
    let service = SaleService::new(state.db);
    let (sales, total_sales_amount) = service.list().await?;
    Ok(Json(SalesResponse {
        message: "Sales retrieved successfully".to_string(),
        sales,
        total_sales_amount,
    }))
}

/// List sales with pagination
pub async fn sales_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedSalesResponse>> {
    let page = normalize_page(query.page);
    let service = SaleService::new(state.db);
    let (sales, total) = service.list_page(page).await?;
    Ok(Json(PagedSalesResponse {
        message: "Sales retrieved successfully".to_string(),
        sales,
        current_page: page,
        total_pages: total_pages(total),
        total_sales: total,
    }))
}

/// Get a sale by id
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SaleResponse>> {
    let service = SaleService::new(state.db);
    let sale = service.get(id).await?;
    Ok(Json(SaleResponse {
        message: "Sale retrieved successfully".to_string(),
        sale,
    }))
}

/// Edit a sale, adjusting product stock by the unit delta
pub async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SaleInput>,
) -> AppResult<Json<SaleResponse>> {
    let service = SaleService::new(state.db);
    let sale = service.update(id, input).await?;
    Ok(Json(SaleResponse {
        message: "Sale updated successfully".to_string(),
        sale,
    }))
}

/// Delete a sale, crediting product stock back
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = SaleService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Sale deleted successfully")))
}
