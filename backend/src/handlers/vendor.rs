//! HTTP handlers for vendor endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::VendorView;
use crate::services::vendor::{CreateVendorInput, UpdateVendorInput};
use crate::services::VendorService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct VendorResponse {
    pub message: String,
    pub vendor: VendorView,
}

#[derive(Serialize)]
pub struct VendorsResponse {
    pub message: String,
    pub vendors: Vec<VendorView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedVendorsResponse {
    pub message: String,
    pub vendors: Vec<VendorView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_vendors: i64,
}

/// Add a new vendor
pub async fn add_vendor(
    State(state): State<AppState>,
    Json(input): Json<CreateVendorInput>,
) -> AppResult<(StatusCode, Json<VendorResponse>)> {
    let service = VendorService::new(state.db);
    let vendor = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(VendorResponse {
            message: "Vendor added successfully".to_string(),
            vendor,
        }),
    ))
}

/// List all vendors with their material entries
pub async fn list_vendors(State(state): State<AppState>) -> AppResult<Json<VendorsResponse>> {
    let service = VendorService::new(state.db);
    let vendors = service.list().await?;
    Ok(Json(VendorsResponse {
        message: "Vendors retrieved successfully".to_string(),
        vendors,
    }))
}

/// List vendors with pagination
pub async fn vendors_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedVendorsResponse>> {
    let page = normalize_page(query.page);
    let service = VendorService::new(state.db);
    let (vendors, total) = service.list_page(page).await?;
    Ok(Json(PagedVendorsResponse {
        message: "Vendors retrieved successfully".to_string(),
        vendors,
        current_page: page,
        total_pages: total_pages(total),
        total_vendors: total,
    }))
}

/// Get a vendor by id
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VendorResponse>> {
    let service = VendorService::new(state.db);
    let vendor = service.get(id).await?;
    Ok(Json(VendorResponse {
        message: "Vendor retrieved successfully".to_string(),
        vendor,
    }))
}

/// Edit a vendor
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateVendorInput>,
) -> AppResult<Json<VendorResponse>> {
    let service = VendorService::new(state.db);
    let vendor = service.update(id, input).await?;
    Ok(Json(VendorResponse {
        message: "Vendor updated successfully".to_string(),
        vendor,
    }))
}

/// Delete a vendor
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = VendorService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Vendor deleted successfully")))
}
