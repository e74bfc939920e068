//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::models::ProductView;
use crate::services::product::{CreateProductInput, UpdateProductInput};
use crate::services::ProductService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct ProductResponse {
    pub message: String,
    pub product: ProductView,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub message: String,
    pub products: Vec<ProductView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedProductsResponse {
    pub message: String,
    pub products: Vec<ProductView>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_products: i64,
}

/// Add a new product
pub async fn add_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product created successfully".to_string(),
            product,
        }),
    ))
}

/// List all available products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<ProductsResponse>> {
    let service = ProductService::new(state.db);
    let products = service.list().await?;
    Ok(Json(ProductsResponse {
        message: "Products retrieved successfully".to_string(),
        products,
    }))
}

/// List products with pagination
pub async fn product_detail(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedProductsResponse>> {
    let page = normalize_page(query.page);
    let service = ProductService::new(state.db);
    let (products, total) = service.list_page(page).await?;
    Ok(Json(PagedProductsResponse {
        message: "Products retrieved successfully".to_string(),
        products,
        current_page: page,
        total_pages: total_pages(total),
        total_products: total,
    }))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db);
    let product = service.get(id).await?;
    Ok(Json(ProductResponse {
        message: "Product retrieved successfully".to_string(),
        product,
    }))
}

/// Edit a product
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db);
    let product = service.update(id, input).await?;
    Ok(Json(ProductResponse {
        message: "Product updated successfully".to_string(),
        product,
    }))
}

/// Soft-delete a product
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = ProductService::new(state.db);
    service.delete(id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
