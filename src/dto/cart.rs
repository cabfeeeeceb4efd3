use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CourseCard;

/// Body shared by the cart and favorites add/remove endpoints.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CourseIdRequest {
    pub course_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub courses: Vec<CourseCard>,
}
