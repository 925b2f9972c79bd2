//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    auth::{auth_middleware, require_admin, require_place_owner},
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 请求体上限（1 MiB）
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/users/register", post(handlers::auth::register))
        .route("/users/login", post(handlers::auth::login))
        .route("/api/activities", get(handlers::place::list_places))
        .route("/api/activities/{id}", get(handlers::place::get_place));

    // 场所修改：所有者或管理员
    let owner_routes = Router::new()
        .route("/api/activities/{id}/edit", put(handlers::place::update_place))
        .route("/api/activities/{id}/delete", delete(handlers::place::delete_place))
        .route_layer(from_fn_with_state(state.clone(), require_place_owner));

    // 仅管理员
    let admin_routes = Router::new()
        .route("/users/{id}/admin", put(handlers::user::set_admin))
        .route_layer(from_fn(require_admin));

    // 需要认证的路由；认证层在最外层，先于所有权与管理员校验执行
    let authenticated_routes = Router::new()
        .route("/users/logout", post(handlers::auth::logout))
        .route("/users/profile/{id}", get(handlers::user::get_profile))
        .route("/users/password", put(handlers::user::change_password))
        .route("/api/activities/new", post(handlers::place::create_place))
        .merge(owner_routes)
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(from_fn(request_tracking_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
