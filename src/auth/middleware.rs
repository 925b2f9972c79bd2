//! JWT 认证中间件
//! 从 Cookie 或 Authorization 头提取访问令牌，过期时使用刷新令牌续签

use crate::{
    auth::{
        cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE},
        jwt::{Claims, JwtService, TokenError, TokenKind},
    },
    error::AppError,
    middleware::AppState,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, SET_COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("authentication required"))
    }
}

/// 从 Authorization 头提取 Bearer 令牌
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// 认证结果
#[derive(Debug)]
pub struct Authenticated {
    pub context: AuthContext,
    /// 访问令牌过期后用刷新令牌续签的新访问令牌
    pub refreshed_access_token: Option<String>,
}

/// 认证流程：校验访问令牌，过期时回退到刷新令牌
pub fn authenticate(
    jwt: &JwtService,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
) -> Result<Authenticated, AppError> {
    let access_token =
        access_token.ok_or_else(|| AppError::unauthorized("access token not provided"))?;

    match jwt.verify(access_token, TokenKind::Access) {
        Ok(claims) => Ok(Authenticated {
            context: claims.into(),
            refreshed_access_token: None,
        }),
        Err(TokenError::Expired) => {
            let refresh_token = refresh_token
                .ok_or_else(|| AppError::unauthorized("refresh token not provided"))?;

            let claims = jwt
                .verify(refresh_token, TokenKind::Refresh)
                .map_err(|e| {
                    tracing::debug!(reason = %e, "Refresh token rejected");
                    AppError::unauthorized("invalid refresh token")
                })?;

            // 新访问令牌的身份取自已验证的刷新令牌
            let token =
                jwt.issue_access_token(&claims.sub, &claims.username, claims.is_admin)?;

            tracing::debug!(user_id = %claims.sub, "Access token refreshed");

            Ok(Authenticated {
                context: claims.into(),
                refreshed_access_token: Some(token),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let cookie_value = |name: &str| {
        jar.get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    };

    let access_token =
        cookie_value(ACCESS_TOKEN_COOKIE).or_else(|| extract_token(req.headers()));
    let refresh_token = cookie_value(REFRESH_TOKEN_COOKIE);

    let Authenticated {
        context,
        refreshed_access_token,
    } = authenticate(
        &state.jwt_service,
        access_token.as_deref(),
        refresh_token.as_deref(),
    )?;

    tracing::debug!(user_id = %context.user_id, is_admin = context.is_admin, "Request authenticated");

    // 附加到请求扩展
    req.extensions_mut().insert(context);

    let response = next.run(req).await;

    match refreshed_access_token {
        // 处理器已设置 access_token（如登出时的删除指令）时以处理器为准
        Some(_) if sets_cookie(&response, ACCESS_TOKEN_COOKIE) => {
            tracing::debug!("Handler set access_token, dropping refreshed token");
            Ok(response)
        }
        Some(token) => {
            let ttl = state.jwt_service.ttl_secs(TokenKind::Access);
            let jar = jar.add(state.cookie_policy.access_cookie(token, ttl));
            Ok((jar, response).into_response())
        }
        None => Ok(response),
    }
}

/// 响应中是否已有名为 `name` 的 Set-Cookie
fn sets_cookie(response: &Response, name: &str) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split_once('='))
        .any(|(cookie_name, _)| cookie_name.trim() == name)
}
