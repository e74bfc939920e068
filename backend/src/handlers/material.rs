//! HTTP handlers for material endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::Material;
use crate::services::material::{CreateMaterialInput, UpdateMaterialInput};
use crate::services::MaterialService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct MaterialResponse {
    pub message: String,
    pub material: Material,
}

#[derive(Serialize)]
pub struct MaterialsResponse {
    pub message: String,
    pub materials: Vec<Material>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedMaterialsResponse {
    pub message: String,
    pub materials: Vec<Material>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_materials: i64,
}

/// Add a new material
pub async fn add_material(
    State(state): State<AppState>,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<MaterialResponse>)> {
    let service = MaterialService::new(state.db);
    let material = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MaterialResponse {
            message: "Material added successfully".to_string(),
            material,
        }),
    ))
}

/// List all materials, low stock first
pub async fn list_materials(
    State(state): State<AppState>,
) -> AppResult<Json<MaterialsResponse>> {
    let service = MaterialService::new(state.db);
    let materials = service.list().await?;
    Ok(Json(MaterialsResponse {
        message: "Materials retrieved successfully".to_string(),
        materials,
    }))
}

/// List materials with pagination
pub async fn materials_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedMaterialsResponse>> {
    let page = normalize_page(query.page);
    let service = MaterialService::new(state.db);
    let (materials, total) = service.list_page(page).await?;
    Ok(Json(PagedMaterialsResponse {
        message: "Materials retrieved successfully".to_string(),
        materials,
        current_page: page,
        total_pages: total_pages(total),
        total_materials: total,
    }))
}

/// Get a material by id
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MaterialResponse>> {
    let service = MaterialService::new(state.db);
    let material = service.get(id).await?;
    Ok(Json(MaterialResponse {
        message: "Material fetched successfully".to_string(),
        material,
    }))
}

/// Edit a material
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> AppResult<Json<MaterialResponse>> {
    let service = MaterialService::new(state.db);
    let material = service.update(id, input).await?;
    Ok(Json(MaterialResponse {
        message: "Material updated successfully".to_string(),
        material,
    }))
}

/// Delete a material
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = MaterialService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Material deleted successfully")))
}
