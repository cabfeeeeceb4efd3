use serde::Serialize;
use utoipa::ToSchema;

use crate::models::CourseCard;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteCourseList {
    #[schema(value_type = Vec<CourseCard>)]
    pub items: Vec<CourseCard>,
}
