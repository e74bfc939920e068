//! HTTP handlers for production endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::ProductionView;
use crate::services::production::ProductionInput;
use crate::services::ProductionService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct ProductionResponse {
    pub message: String,
    pub production: ProductionView,
}

#[derive(Serialize)]
pub struct ProductionsResponse {
    pub message: String,
    pub productions: Vec<ProductionView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedProductionsResponse {
    pub message: String,
    pub productions: Vec<ProductionView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_productions: i64,
}

/// Record a new production run
pub async fn add_production(
    State(state): State<AppState>,
    Json(input): Json<ProductionInput>,
) -> AppResult<(StatusCode, Json<ProductionResponse>)> {
    let service = ProductionService::new(state.db);
    let production = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductionResponse {
            message: "Production record created successfully".to_string(),
            production,
        }),
    ))
}

/// List all production records
pub async fn list_productions(
    State(state): State<AppState>,
) -> AppResult<Json<ProductionsResponse>> {
    let service = ProductionService::new(state.db);
    let productions = service.list().await?;
    Ok(Json(ProductionsResponse {
        message: "Productions retrieved successfully".to_string(),
        productions,
    }))
}

/// List production records with pagination
pub async fn production_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedProductionsResponse>> {
    let page = normalize_page(query.page);
    let service = ProductionService::new(state.db);
    let (productions, total) = service.list_page(page).await?;
    Ok(Json(PagedProductionsResponse {
        message: "Productions retrieved successfully".to_string(),
        productions,
        current_page: page,
        total_pages: total_pages(total),
        total_productions: total,
    }))
}

/// Get a production record by id
pub async fn get_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductionResponse>> {
    let service = ProductionService::new(state.db);
    let production = service.get(id).await?;
    Ok(Json(ProductionResponse {
        message: "Production retrieved successfully".to_string(),
        production,
    }))
}

/// Edit a production run, reverting and reapplying its stock effects
pub async fn update_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductionInput>,
) -> AppResult<Json<ProductionResponse>> {
    let service = ProductionService::new(state.db);
    let production = service.update(id, input).await?;
    Ok(Json(ProductionResponse {
        message: "Production record updated successfully".to_string(),
        production,
    }))
}

/// Delete a production run, reverting its stock effects
pub async fn delete_production(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = ProductionService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new(
        "Production record deleted successfully and changes reverted",
    )))
}
