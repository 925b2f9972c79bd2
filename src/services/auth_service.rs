//! 认证服务：注册、登录、修改密码、管理员初始化

use crate::{
    auth::{
        jwt::{JwtService, TokenPair},
        password::PasswordHasher,
    },
    config::AdminConfig,
    error::AppError,
    models::{auth::*, user::*},
    repository::UserStore,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// 登录失败时的统一提示，不区分邮箱与密码
pub const INVALID_CREDENTIALS: &str = "invalid email or password";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            users,
            hasher,
            jwt_service,
        }
    }

    /// 用户注册
    pub async fn signup(&self, req: SignupRequest) -> Result<User, AppError> {
        req.validate()?;
        self.hasher.validate_password_policy(&req.password)?;

        // 预检查；并发注册由唯一索引兜底
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("email is already registered"));
        }
        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::conflict("username is already taken"));
        }

        let password_hash = self.hash_password(req.password).await?;

        let user = self
            .users
            .create(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                is_admin: false,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<(User, TokenPair), AppError> {
        req.validate()?;

        let user = match self.users.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Login rejected: unknown email");
                return Err(AppError::unauthorized(INVALID_CREDENTIALS));
            }
        };

        if !self.verify_password(req.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let token_pair =
            self.jwt_service
                .issue_token_pair(&user.id, &user.username, user.is_admin)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok((user, token_pair))
    }

    /// 修改密码
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if !self.verify_password(req.old_password, user.password_hash.clone()).await? {
            return Err(AppError::unauthorized("current password is incorrect"));
        }

        self.hasher.validate_password_policy(&req.new_password)?;
        user.password_hash = self.hash_password(req.new_password).await?;

        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// 设置管理员标志
    pub async fn set_admin(&self, user_id: Uuid, is_admin: bool) -> Result<User, AppError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        user.is_admin = is_admin;
        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, is_admin, "Admin flag updated");
        Ok(user)
    }

    /// 初始化管理员账户：不存在则创建，存在则更新用户名、密码与管理员标志
    pub async fn seed_admin(&self, config: &AdminConfig) -> Result<(), AppError> {
        let Some(password) = &config.password else {
            tracing::info!("Admin password not configured, skipping admin seeding");
            return Ok(());
        };

        let password_hash = self.hash_password(password.expose_secret().clone()).await?;

        match self.users.find_by_email(&config.email).await? {
            Some(mut existing) => {
                existing.username = config.username.clone();
                existing.password_hash = password_hash;
                existing.is_admin = true;
                self.users.save(&existing).await?;
                tracing::info!(user_id = %existing.id, "Admin user updated");
            }
            None => {
                let admin = self
                    .users
                    .create(NewUser {
                        username: config.username.clone(),
                        email: config.email.clone(),
                        password_hash,
                        is_admin: true,
                    })
                    .await?;
                tracing::info!(user_id = %admin.id, "Admin user created");
            }
        }

        Ok(())
    }

    /// Argon2 为 CPU 密集型操作，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!("Password hashing task failed: {}", e);
                AppError::internal_error("failed to hash password")
            })?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Password verification task failed: {}", e);
                AppError::internal_error("failed to verify password")
            })
    }
}
