//! 认证相关的 HTTP 处理器

use crate::{
    auth::{
        cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
        jwt::TokenKind,
        middleware::AuthContext,
    },
    error::AppError,
    extract::ApiJson,
    middleware::AppState,
    models::{auth::*, user::UserResponse},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde_json::json;
use std::sync::Arc;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.signup(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "user registered successfully",
            "user": UserResponse::from(user),
        })),
    ))
}

/// 登录，令牌通过 Cookie 下发
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(req), _): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tokens) = state.auth_service.login(req).await?;

    let policy = &state.cookie_policy;
    let jar = jar
        .add(policy.access_cookie(
            tokens.access_token,
            state.jwt_service.ttl_secs(TokenKind::Access),
        ))
        .add(policy.refresh_cookie(
            tokens.refresh_token,
            state.jwt_service.ttl_secs(TokenKind::Refresh),
        ));

    Ok((
        jar,
        Json(json!({
            "message": "login successful",
            "user": UserResponse::from(user),
            "expires_in": tokens.expires_in,
        })),
    ))
}

/// 登出：令牌无状态，仅让客户端删除 Cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    jar: CookieJar,
) -> impl IntoResponse {
    let policy = &state.cookie_policy;
    let jar = jar
        .add(policy.removal_cookie(ACCESS_TOKEN_COOKIE))
        .add(policy.removal_cookie(REFRESH_TOKEN_COOKIE));

    tracing::info!(user_id = %auth_context.user_id, "User logged out");

    (jar, Json(json!({"message": "logged out successfully"})))
}
