//! Place repository (场所数据访问)

use super::PlaceStore;
use crate::{error::AppError, models::place::*};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PlaceRepository {
    db: PgPool,
}

impl PlaceRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlaceStore for PlaceRepository {
    /// 获取场所
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, AppError> {
        let place = sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(place)
    }

    /// 列出场所
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Place>, AppError> {
        let places = sqlx::query_as::<_, Place>(
            "SELECT * FROM places ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        Ok(places)
    }

    /// 创建场所
    async fn create(&self, place: NewPlace) -> Result<Place, AppError> {
        let place = sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places (
                name, vicinity, city, postcode, phone, email, website,
                opening_hours, place_type, description, latitude, longitude, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&place.name)
        .bind(&place.vicinity)
        .bind(&place.city)
        .bind(&place.postcode)
        .bind(&place.phone)
        .bind(&place.email)
        .bind(&place.website)
        .bind(&place.opening_hours)
        .bind(&place.place_type)
        .bind(&place.description)
        .bind(place.latitude)
        .bind(place.longitude)
        .bind(place.user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(place)
    }

    /// 更新场所
    async fn save(&self, place: &Place) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE places
            SET
                name = $2,
                vicinity = $3,
                city = $4,
                postcode = $5,
                phone = $6,
                email = $7,
                website = $8,
                opening_hours = $9,
                place_type = $10,
                description = $11,
                latitude = $12,
                longitude = $13,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(place.id)
        .bind(&place.name)
        .bind(&place.vicinity)
        .bind(&place.city)
        .bind(&place.postcode)
        .bind(&place.phone)
        .bind(&place.email)
        .bind(&place.website)
        .bind(&place.opening_hours)
        .bind(&place.place_type)
        .bind(&place.description)
        .bind(place.latitude)
        .bind(place.longitude)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("activity not found"));
        }

        Ok(())
    }

    /// 删除场所
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
