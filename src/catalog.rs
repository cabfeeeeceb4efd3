use std::{fmt, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CourseCategory {
    #[serde(rename = "adobe photoshop")]
    AdobePhotoshop,
    #[serde(rename = "adobe illustrator")]
    AdobeIllustrator,
    #[serde(rename = "ui/ux design")]
    UiUxDesign,
    #[serde(rename = "web development")]
    WebDevelopment,
    #[serde(rename = "mobile development")]
    MobileDevelopment,
    #[serde(rename = "data science")]
    DataScience,
    #[serde(rename = "Game development")]
    GameDevelopment,
}

impl CourseCategory {
    pub const ALL: [CourseCategory; 7] = [
        CourseCategory::AdobePhotoshop,
        CourseCategory::AdobeIllustrator,
        CourseCategory::UiUxDesign,
        CourseCategory::WebDevelopment,
        CourseCategory::MobileDevelopment,
        CourseCategory::DataScience,
        CourseCategory::GameDevelopment,
    ];

    /// Value stored in `courses.category` and accepted by the list filter.
    pub fn key(self) -> &'static str {
        match self {
            CourseCategory::AdobePhotoshop => "adobe photoshop",
            CourseCategory::AdobeIllustrator => "adobe illustrator",
            CourseCategory::UiUxDesign => "ui/ux design",
            CourseCategory::WebDevelopment => "web development",
            CourseCategory::MobileDevelopment => "mobile development",
            CourseCategory::DataScience => "data science",
            CourseCategory::GameDevelopment => "Game development",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CourseCategory::AdobePhotoshop => "Adobe Photoshop",
            CourseCategory::AdobeIllustrator => "Adobe Illustrator",
            CourseCategory::UiUxDesign => "UI/UX Design",
            CourseCategory::WebDevelopment => "Web Development",
            CourseCategory::MobileDevelopment => "Mobile Development",
            CourseCategory::DataScience => "Data Science",
            CourseCategory::GameDevelopment => "Game Development",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl FromStr for CourseCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        CourseCategory::ALL
            .into_iter()
            .find(|c| c.key().to_lowercase() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Anchor ("was") price shown next to the real one: a 10% markup.
pub fn first_price(price: Decimal) -> Decimal {
    price * Decimal::from(110) / Decimal::from(100)
}

/// Mean rating rounded to one decimal place; 0 for no ratings.
///
/// The mean is a float and the tie-break runs on its exact binary value, so 49 / 20
/// (stored as 2.4500000000000001776) rounds up to 2.5 while 5 / 4 = 1.25 rounds to 1.2.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let avg = sum as f64 / ratings.len() as f64;
    Decimal::from_f64_retain(avg)
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(avg)
}

/// `ILIKE` pattern matching `needle` as a literal substring; `\`, `%` and `_` are escaped.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub fn is_valid_rating(rating: i32) -> bool {
    (1..=5).contains(&rating)
}
