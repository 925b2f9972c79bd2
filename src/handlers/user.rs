//! 用户管理的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{ApiJson, ApiPath},
    middleware::AppState,
    models::{auth::ChangePasswordRequest, user::*},
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// 获取用户资料
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    Ok(Json(json!({
        "message": "user profile",
        "user": UserResponse::from(user),
    })))
}

/// 修改当前用户密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    WithRejection(Json(req), _): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth_service
        .change_password(auth_context.user_id, req)
        .await?;

    Ok(Json(json!({"message": "password updated successfully"})))
}

/// 设置管理员标志（仅管理员）
pub async fn set_admin(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(req), _): ApiJson<SetAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.set_admin(id, req.is_admin).await?;

    Ok(Json(json!({
        "message": "user role updated",
        "user": UserResponse::from(user),
    })))
}
