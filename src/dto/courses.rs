use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    catalog::CourseCategory,
    error::{AppError, AppResult},
    models::{ChapterSummary, Course, Lesson, Review},
    uploads::{MultipartForm, UploadedFile},
};

/// Largest value `NUMERIC(10,2)` holds is 99 999 999.99.
fn max_price() -> Decimal {
    Decimal::new(10_000_000_000, 2)
}

fn parse_price(raw: &str) -> AppResult<Decimal> {
    let price = Decimal::from_str(raw)
        .map_err(|_| AppError::BadRequest(format!("invalid price '{raw}'")))?;
    if price.is_sign_negative() || price.scale() > 2 || price >= max_price() {
        return Err(AppError::BadRequest(format!("invalid price '{raw}'")));
    }
    Ok(price)
}

fn parse_category(raw: &str) -> AppResult<CourseCategory> {
    raw.parse::<CourseCategory>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

#[derive(Debug, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub price: Decimal,
    pub category: CourseCategory,
    pub image: UploadedFile,
}

impl CreateCourseRequest {
    pub fn from_form(mut form: MultipartForm) -> AppResult<Self> {
        let request = Self {
            title: form.require_text("title")?,
            description: form.require_text("description")?,
            price: parse_price(&form.require_text("price")?)?,
            category: parse_category(&form.require_text("category")?)?,
            image: form.require_file("image")?,
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CreateCourseMultipart {
    title: String,
    description: String,
    #[schema(value_type = String, example = "15000.00")]
    price: String,
    category: CourseCategory,
    #[schema(value_type = String, format = Binary)]
    image: String,
}

#[derive(Debug, Default, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 150))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<CourseCategory>,
    pub image: Option<UploadedFile>,
}

impl UpdateCourseRequest {
    pub fn from_form(mut form: MultipartForm) -> AppResult<Self> {
        let request = Self {
            title: form.text("title"),
            description: form.text("description"),
            price: form.text("price").as_deref().map(parse_price).transpose()?,
            category: form
                .text("category")
                .as_deref()
                .map(parse_category)
                .transpose()?,
            image: form.take_file("image"),
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateCourseMultipart {
    title: Option<String>,
    description: Option<String>,
    #[schema(value_type = Option<String>)]
    price: Option<String>,
    category: Option<CourseCategory>,
    #[schema(value_type = Option<String>, format = Binary)]
    image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateChapterRequest {
    /// Course id.
    pub course: i64,
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLessonRequest {
    /// Chapter id.
    pub chapter: i64,
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    pub description: String,
    #[validate(url)]
    pub video_url: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddReviewRequest {
    /// Course id.
    pub course: i64,
    #[validate(length(min = 1))]
    pub text: String,
    /// 1 to 5.
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CourseList {
    #[schema(value_type = Vec<Course>)]
    pub items: Vec<Course>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub chapters: Vec<ChapterSummary>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChapterLessons {
    pub id: i64,
    pub lessons: Vec<Lesson>,
}

/// Category key to display label.
#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryMap {
    #[schema(value_type = Object)]
    pub items: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CourseQuery {
    pub category: Option<String>,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_two_decimal_places_only() {
        assert_eq!(parse_price("1000").unwrap(), Decimal::from(1000));
        assert_eq!(parse_price("1999.99").unwrap(), Decimal::new(199999, 2));
        assert!(parse_price("10.001").is_err());
        assert!(parse_price("-5").is_err());
        assert!(parse_price("free").is_err());
        assert_eq!(
            parse_price("99999999.99").unwrap(),
            Decimal::new(9_999_999_999, 2)
        );
        assert!(matches!(parse_price("100000000"), Err(AppError::BadRequest(_))));
        assert!(parse_price("1000000000").is_err());
    }

    #[test]
    fn create_course_requires_a_known_category() {
        let form = MultipartForm::default()
            .with_field("title", "Intro")
            .with_field("description", "Basics")
            .with_field("price", "1000")
            .with_field("category", "cooking")
            .with_file(
                "image",
                UploadedFile {
                    file_name: Some("cover.png".into()),
                    content_type: Some("image/png".into()),
                    bytes: vec![1, 2, 3],
                },
            );
        let err = CreateCourseRequest::from_form(form).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
