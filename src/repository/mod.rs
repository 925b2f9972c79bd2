//! Database repository layer
//!
//! Handlers and gates depend on the store traits, not on Postgres directly.

pub mod place_repo;
pub mod user_repo;

pub use place_repo::*;
pub use user_repo::*;

use crate::{
    db::HealthStatus,
    error::AppError,
    models::{
        place::{NewPlace, Place},
        user::{NewUser, User},
    },
};
use async_trait::async_trait;
use uuid::Uuid;

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a user. A duplicate email or username fails with `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    /// Persist username, email, password hash and admin flag of an existing user
    async fn save(&self, user: &User) -> Result<(), AppError>;

    /// Reachability of the backing store, reported by `/ready`
    async fn ping(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
}

/// Place persistence
#[async_trait]
pub trait PlaceStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, AppError>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Place>, AppError>;

    async fn create(&self, place: NewPlace) -> Result<Place, AppError>;

    /// Persist every mutable field of an existing place
    async fn save(&self, place: &Place) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
