//! Route definitions for the inventory management platform

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // User and session management
        .nest("/users", user_routes())
        // Protected routes - raw materials
        .nest("/materials", material_routes())
        // Protected routes - vendors
        .nest("/vendors", vendor_routes())
        // Protected routes - products
        .nest("/products", product_routes())
        // Protected routes - production runs
        .nest("/productions", production_routes())
        // Protected routes - purchase orders
        .nest("/orders", order_routes())
        // Protected routes - sales
        .nest("/sales", sale_routes())
}

/// User routes; login and token refresh are public
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/refresh-token", post(handlers::refresh_token))
        .merge(protected_user_routes())
}

/// User routes behind authentication
fn protected_user_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route("/change-password", post(handlers::change_password))
        .route("/current-user", get(handlers::current_user))
        .route("/update-account", patch(handlers::update_account))
        .route("/register", post(handlers::register))
        .route("/user-detail", get(handlers::user_detail))
        .route("/:id", delete(handlers::delete_user))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Raw material routes (protected)
fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/add-material", post(handlers::add_material))
        .route("/", get(handlers::list_materials))
        .route("/materials-detail", get(handlers::materials_detail))
        .route(
            "/:id",
            get(handlers::get_material)
                .put(handlers::update_material)
                .delete(handlers::delete_material),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Vendor routes (protected)
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/add-vendor", post(handlers::add_vendor))
        .route("/", get(handlers::list_vendors))
        .route("/vendors-detail", get(handlers::vendors_detail))
        .route(
            "/:id",
            get(handlers::get_vendor)
                .put(handlers::update_vendor)
                .delete(handlers::delete_vendor),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Product routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/add-product", post(handlers::add_product))
        .route("/", get(handlers::list_products))
        .route("/product-detail", get(handlers::product_detail))
        .route(
            "/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Production routes (protected)
fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/add-production", post(handlers::add_production))
        .route("/", get(handlers::list_productions))
        .route("/production-detail", get(handlers::production_detail))
        .route(
            "/:id",
            get(handlers::get_production)
                .put(handlers::update_production)
                .delete(handlers::delete_production),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/add-order", post(handlers::add_order))
        .route("/", get(handlers::list_orders))
        .route("/orders-detail", get(handlers::orders_detail))
        .route("/receive/:id", post(handlers::receive_order))
        .route(
            "/:id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Sales routes (protected)
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/add-sale", post(handlers::add_sale))
        .route("/", get(handlers::list_sales))
        .route("/sales-detail", get(handlers::sales_detail))
        .route(
            "/:id",
            get(handlers::get_sale)
                .put(handlers::update_sale)
                .delete(handlers::delete_sale),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
