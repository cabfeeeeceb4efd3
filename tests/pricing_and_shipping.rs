use std::str::FromStr;

use chrono::{Duration, Utc};
use course_marketplace_api::{
    catalog::{CourseCategory, average_rating, first_price, is_valid_rating},
    services::order_service::list_cities,
    shipping::{ShippingCity, city_name, remaining_delivery_days, total_cost},
};
use rust_decimal::Decimal;

#[tokio::test]
async fn first_price_adds_ten_percent() {
    assert_eq!(first_price(Decimal::from(1000)), Decimal::from(1100));
    assert_eq!(
        first_price(Decimal::from_str("19.99").unwrap()),
        Decimal::from_str("21.989").unwrap()
    );
}

#[tokio::test]
async fn average_rating_rounds_to_one_decimal() {
    assert_eq!(average_rating(&[]), 0.0);
    assert_eq!(average_rating(&[3, 4, 5]), 4.0);
    assert_eq!(average_rating(&[4, 5]), 4.5);
    // 13 / 3 = 4.333..
    assert_eq!(average_rating(&[4, 4, 5]), 4.3);
    assert!(is_valid_rating(1) && is_valid_rating(5));
    assert!(!is_valid_rating(0) && !is_valid_rating(6));
}

#[tokio::test]
async fn categories_parse_from_their_keys() {
    assert_eq!(
        "UI/UX Design".parse::<CourseCategory>().unwrap(),
        CourseCategory::UiUxDesign
    );
    assert_eq!(CourseCategory::GameDevelopment.key(), "Game development");
    assert!("cooking".parse::<CourseCategory>().is_err());
    assert_eq!(CourseCategory::ALL.len(), 7);
}

#[tokio::test]
async fn total_cost_is_prices_plus_city_shipping() {
    let prices = [Decimal::from(1000), Decimal::from(2500)];
    assert_eq!(total_cost(&prices, ShippingCity::Almaty), Decimal::from(5500));
    assert_eq!(total_cost(&prices, ShippingCity::Astana), Decimal::from(7000));
    assert_eq!(total_cost(&[], ShippingCity::Aktau), Decimal::from(2450));
}

#[tokio::test]
async fn unknown_cities_are_rejected() {
    assert!("atlantis".parse::<ShippingCity>().is_err());
    assert_eq!("Almaty".parse::<ShippingCity>().unwrap(), ShippingCity::Almaty);
    assert_eq!(city_name("kyzylorda"), "Kyzylorda");
    assert_eq!(city_name("atlantis"), "atlantis");
}

#[tokio::test]
async fn city_list_covers_every_city() {
    let cities = list_cities().data.expect("cities").items;
    assert_eq!(cities.len(), 14);
    let uralsk = cities.iter().find(|c| c.key == "uralsk").expect("uralsk");
    assert_eq!(uralsk.cost, 2500);
    assert_eq!(uralsk.delivery_time, 6);
}

#[tokio::test]
async fn remaining_delivery_days_counts_down_to_zero() {
    let now = Utc::now();
    assert_eq!(remaining_delivery_days(5, now, now), 5);
    assert_eq!(remaining_delivery_days(5, now - Duration::hours(47), now), 4);
    assert_eq!(remaining_delivery_days(5, now - Duration::days(2), now), 3);
    assert_eq!(remaining_delivery_days(5, now - Duration::days(30), now), 0);
}
