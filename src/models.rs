use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub iin: Option<String>,
    /// Absolute URL of the uploaded ID card.
    pub id_card_image: Option<String>,
    pub is_superuser: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    /// `price` with a 10% markup.
    pub first_price: Decimal,
    pub category: String,
    pub category_display: String,
    pub image: String,
    /// Author's full name.
    pub author: String,
    pub average_rating: f64,
    pub count_ratings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChapterSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub count_lessons: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: i64,
    /// Reviewer's full name.
    pub user: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Chapter {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Compact course card used by the cart, favorites and order history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseCard {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    pub id: i64,
    pub certificate_number: String,
    pub certificate_image: Option<String>,
    pub is_shipping: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Shipping {
    pub id: i64,
    pub certificates: Vec<Certificate>,
    /// City display name.
    pub city: String,
    pub address: String,
    pub cost: Decimal,
    /// Days left until delivery.
    pub delivery_time: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: i64,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub shipping: Shipping,
    pub courses: Vec<CourseCard>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct City {
    pub key: String,
    pub name: String,
    pub cost: i64,
    pub delivery_time: i32,
}
