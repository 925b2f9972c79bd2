//! 测试公共模块
//! 提供测试配置、内存存储和请求辅助函数
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use places_service::{
    auth::jwt::{Claims, TokenKind},
    config::{
        AdminConfig, AppConfig, CookieConfig, DatabaseConfig, LoggingConfig, SecurityConfig,
        ServerConfig,
    },
    error::AppError,
    middleware::AppState,
    models::{
        place::{NewPlace, Place},
        user::{NewUser, User},
    },
    repository::{PlaceStore, UserStore},
};
use secrecy::Secret;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "TestPass123";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/places_test".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            access_secret: Secret::new("test-access-secret-for-testing-only".to_string()),
            refresh_secret: Secret::new("test-refresh-secret-for-testing-only".to_string()),
            access_token_exp_secs: 3600,
            refresh_token_exp_secs: 2592000,
            password_min_length: 8,
            // 测试使用低开销参数
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
        cookie: CookieConfig {
            environment: "development".to_string(),
            dev_domain: Some("http://localhost:3000".to_string()),
            dev_secure_cookie: Some("false".to_string()),
            dev_http_only_cookie: Some("true".to_string()),
            prod_domain: None,
            prod_secure_cookie: None,
            prod_http_only_cookie: None,
        },
        admin: AdminConfig {
            username: "admin".to_string(),
            email: "admin@admin.com".to_string(),
            password: None,
        },
    }
}

// ==================== 内存存储 ====================

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn count_by_email(&self, email: &str) -> usize {
        self.users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.email == email)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::conflict(
                "user with this email or username already exists",
            ));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                stored.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AppError::not_found("user not found")),
        }
    }
}

#[derive(Default)]
pub struct MemoryPlaceStore {
    places: Mutex<HashMap<Uuid, Place>>,
}

impl MemoryPlaceStore {
    pub fn get(&self, id: Uuid) -> Option<Place> {
        self.places.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl PlaceStore for MemoryPlaceStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, AppError> {
        Ok(self.places.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Place>, AppError> {
        let mut places: Vec<Place> = self.places.lock().unwrap().values().cloned().collect();
        places.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(places
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn create(&self, place: NewPlace) -> Result<Place, AppError> {
        let now = Utc::now();
        let created = Place {
            id: Uuid::new_v4(),
            name: place.name,
            vicinity: place.vicinity,
            city: place.city,
            postcode: place.postcode,
            phone: place.phone,
            email: place.email,
            website: place.website,
            opening_hours: place.opening_hours,
            place_type: place.place_type,
            description: place.description,
            latitude: place.latitude,
            longitude: place.longitude,
            user_id: place.user_id,
            created_at: now,
            updated_at: now,
        };
        self.places
            .lock()
            .unwrap()
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn save(&self, place: &Place) -> Result<(), AppError> {
        let mut places = self.places.lock().unwrap();
        match places.get_mut(&place.id) {
            Some(stored) => {
                *stored = place.clone();
                Ok(())
            }
            None => Err(AppError::not_found("activity not found")),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.places.lock().unwrap().remove(&id).is_some())
    }
}

/// 所有查询都失败的场所存储
pub struct FailingPlaceStore;

#[async_trait]
impl PlaceStore for FailingPlaceStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Place>, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<Place>, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn create(&self, _place: NewPlace) -> Result<Place, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn save(&self, _place: &Place) -> Result<(), AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: Uuid) -> Result<bool, AppError> {
        Err(AppError::Database(sqlx::Error::PoolTimedOut))
    }
}

// ==================== 应用构建 ====================

pub struct TestApp {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUserStore>,
    pub places: Arc<MemoryPlaceStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::default());
        let places = Arc::new(MemoryPlaceStore::default());
        let state = AppState::new(create_test_config(), users.clone(), places.clone())
            .expect("Failed to build test app state");

        Self {
            state: Arc::new(state),
            users,
            places,
        }
    }

    pub fn router(&self) -> Router {
        places_service::routes::create_router(self.state.clone())
    }

    /// 直接写入用户（绕过注册接口）
    pub async fn create_user(&self, username: &str, email: &str, is_admin: bool) -> User {
        let password_hash = self.state.hasher.hash(TEST_PASSWORD).unwrap();
        self.users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                is_admin,
            })
            .await
            .unwrap()
    }

    pub async fn create_place(&self, owner: Uuid, name: &str) -> Place {
        self.places
            .create(NewPlace {
                name: name.to_string(),
                vicinity: None,
                city: Some("Leeds".to_string()),
                postcode: None,
                phone: "0113000000".to_string(),
                email: None,
                website: None,
                opening_hours: None,
                place_type: Some("gym".to_string()),
                description: "A place".to_string(),
                latitude: None,
                longitude: None,
                user_id: owner,
            })
            .await
            .unwrap()
    }

    pub fn access_token(&self, user: &User) -> String {
        self.state
            .jwt_service
            .issue_access_token(&user.id, &user.username, user.is_admin)
            .unwrap()
    }

    pub fn refresh_token(&self, user: &User) -> String {
        self.state
            .jwt_service
            .issue_refresh_token(&user.id, &user.username, user.is_admin)
            .unwrap()
    }

    /// 签名有效但已过期的访问令牌
    pub fn expired_access_token(&self, user: &User) -> String {
        let mut claims = Claims::new(&user.id, &user.username, user.is_admin, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;
        self.state
            .jwt_service
            .encode_claims(TokenKind::Access, &claims)
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

// ==================== 请求辅助 ====================

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn cookie_header(access: Option<&str>, refresh: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(token) = access {
        parts.push(format!("access_token={}", token));
    }
    if let Some(token) = refresh {
        parts.push(format!("refresh_token={}", token));
    }
    parts.join("; ")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 所有 Set-Cookie 头
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// 指定名称的 Set-Cookie 值
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find_map(|c| {
        c.split(';')
            .next()
            .and_then(|pair| pair.strip_prefix(prefix.as_str()))
            .map(str::to_string)
    })
}
