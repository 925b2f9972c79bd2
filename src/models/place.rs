//! Place domain models (gyms, spas, activities)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A listed place, owned by the user who created it
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub vicinity: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Owner reference
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create place request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 255))]
    pub vicinity: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub postcode: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub description: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Update place request; absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub vicinity: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub postcode: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub phone: Option<String>,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub description: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Fields required to insert a place
#[derive(Debug, Clone)]
pub struct NewPlace {
    pub name: String,
    pub vicinity: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub place_type: Option<String>,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub user_id: Uuid,
}

impl CreatePlaceRequest {
    pub fn into_new_place(self, owner: Uuid) -> NewPlace {
        NewPlace {
            name: self.name,
            vicinity: self.vicinity,
            city: self.city,
            postcode: self.postcode,
            phone: self.phone,
            email: self.email,
            website: self.website,
            opening_hours: self.opening_hours,
            place_type: self.place_type,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            user_id: owner,
        }
    }
}

impl UpdatePlaceRequest {
    /// Apply the present fields onto `place`. The owner is never changed.
    pub fn apply(self, place: &mut Place) {
        if let Some(name) = self.name {
            place.name = name;
        }
        if let Some(phone) = self.phone {
            place.phone = phone;
        }
        if let Some(description) = self.description {
            place.description = description;
        }
        if self.vicinity.is_some() {
            place.vicinity = self.vicinity;
        }
        if self.city.is_some() {
            place.city = self.city;
        }
        if self.postcode.is_some() {
            place.postcode = self.postcode;
        }
        if self.email.is_some() {
            place.email = self.email;
        }
        if self.website.is_some() {
            place.website = self.website;
        }
        if self.opening_hours.is_some() {
            place.opening_hours = self.opening_hours;
        }
        if self.place_type.is_some() {
            place.place_type = self.place_type;
        }
        if self.latitude.is_some() {
            place.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            place.longitude = self.longitude;
        }
    }
}
