//! 场所（活动）的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::AppState,
    models::place::*,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// 列出场所
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): ApiQuery<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let places = state.places.list(limit, offset).await?;

    Ok(Json(json!({
        "places": places,
        "count": places.len()
    })))
}

/// 获取场所详情
pub async fn get_place(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let place = state
        .places
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("activity not found"))?;

    Ok(Json(json!({ "place": place })))
}

/// 创建场所，所有者为当前用户
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    WithRejection(Json(req), _): ApiJson<CreatePlaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let place = state
        .places
        .create(req.into_new_place(auth_context.user_id))
        .await?;

    tracing::info!(place_id = %place.id, user_id = %auth_context.user_id, "Place created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "activity created successfully",
            "place": place
        })),
    ))
}

/// 更新场所（所有权由路由中间件校验）
pub async fn update_place(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(req), _): ApiJson<UpdatePlaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let mut place = state
        .places
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("activity not found"))?;

    req.apply(&mut place);
    state.places.save(&place).await?;

    tracing::info!(place_id = %place.id, user_id = %auth_context.user_id, "Place updated");

    Ok(Json(json!({
        "message": "activity updated successfully",
        "place": place
    })))
}

/// 删除场所（所有权由路由中间件校验）
pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.places.delete(id).await? {
        return Err(AppError::not_found("activity not found"));
    }

    tracing::info!(place_id = %id, user_id = %auth_context.user_id, "Place deleted");

    Ok(Json(json!({"message": "activity deleted successfully"})))
}
