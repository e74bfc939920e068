//! HTTP handlers for user and session endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{MessageResponse, PageQuery};
use crate::middleware::{require_admin, CurrentUser};
use crate::models::User;
use crate::services::auth::{LoginInput, RegisterUserInput};
use crate::services::AuthService;
use crate::AppState;
use shared::types::{normalize_page, total_pages};

#[derive(Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedUsersResponse {
    pub message: String,
    pub users: Vec<User>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_users: i64,
}

/// Register a new user account (admin only)
pub async fn register(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterUserInput>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    require_admin(&current_user.0)?;

    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login with username or email
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let (user, tokens) = service.login(input).await?;
    Ok(Json(LoginResponse {
        message: "User logged in successfully".to_string(),
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    }))
}

/// Logout, invalidating the stored refresh token
pub async fn logout(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<MessageResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    service.logout(current_user.0.user_id).await?;
    Ok(Json(MessageResponse::new("User logged out")))
}

/// Rotate tokens using a refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let tokens = service.refresh(&body.refresh_token).await?;
    Ok(Json(RefreshResponse {
        message: "Access token refreshed".to_string(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    }))
}

/// Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    service
        .change_password(current_user.0.user_id, &body.old_password, &body.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// Get the current user's account
pub async fn current_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service.current_user(current_user.0.user_id).await?;
    Ok(Json(UserResponse {
        message: "User fetched successfully".to_string(),
        user,
    }))
}

/// Update the current user's name and email
pub async fn update_account(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<UpdateAccountRequest>,
) -> AppResult<Json<UserResponse>> {
    let service = AuthService::new(state.db.clone(), &state.config);
    let user = service
        .update_account(current_user.0.user_id, &body.full_name, &body.email)
        .await?;
    Ok(Json(UserResponse {
        message: "Account details updated successfully".to_string(),
        user,
    }))
}

/// List user accounts with pagination (admin only)
pub async fn user_detail(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PagedUsersResponse>> {
    require_admin(&current_user.0)?;

    let page = normalize_page(query.page);
    let service = AuthService::new(state.db.clone(), &state.config);
    let (users, total) = service.list_page(page, current_user.0.user_id).await?;
    Ok(Json(PagedUsersResponse {
        message: "Users retrieved successfully".to_string(),
        users,
        current_page: page,
        total_pages: total_pages(total),
        total_users: total,
    }))
}

/// Delete a user account (admin only, self-deletion rejected)
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    require_admin(&current_user.0)?;

    let service = AuthService::new(state.db.clone(), &state.config);
    service.delete(current_user.0.user_id, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
