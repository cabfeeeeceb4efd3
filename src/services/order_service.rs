use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use crate::{
    audit,
    dto::orders::{CheckoutRequest, CityList, PurchaseList, TotalCost},
    entity::{
        course_cart_items::{Column as CartItemCol, Entity as CartItems},
        course_carts::{ActiveModel as CartActive, Column as CartCol, Entity as Carts},
        course_certificates::{ActiveModel as CertificateActive, Entity as Certificates, Model as CertificateModel},
        course_purchases::{ActiveModel as PurchaseActive, Column as PurchaseCol, Entity as Purchases},
        courses::{Column as CourseCol, Entity as Courses, Model as CourseModel},
        shipping_certificate_items::{ActiveModel as ShippingItemActive, Column as ShippingItemCol, Entity as ShippingItems},
        shipping_certificates::{ActiveModel as ShippingActive, Model as ShippingModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    mailer::OutgoingEmail,
    middleware::auth::AuthUser,
    models::{Certificate, City, CourseCard, Purchase, Shipping},
    response::{ApiResponse, Meta},
    services::{cart_service, course_service::course_card_from_entity},
    shipping::{ShippingCity, city_name, remaining_delivery_days, total_cost},
    state::AppState,
};

fn parse_city(raw: &str) -> AppResult<ShippingCity> {
    raw.parse::<ShippingCity>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

pub fn certificate_number(user_id: i64, course_id: i64) -> String {
    format!("CERT-{user_id}-{course_id}")
}

pub fn confirmation_email(
    to: &str,
    total: Decimal,
    address: &str,
    city: ShippingCity,
    courses: &[CourseCard],
) -> OutgoingEmail {
    let lines = courses
        .iter()
        .enumerate()
        .map(|(idx, course)| format!("{}. {} - {} KZT.", idx + 1, course.title, course.price))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "Your purchase has been confirmed.\n\n\
         Total cost: {total} KZT.\n\
         Shipping address: {address}, {city}.\n\
         Delivery time: {days} days.\n\n\
         Courses:\n{lines}\n\n\
         Thank you for your purchase!\n\n\
         Best regards,\nCourses team!\n",
        city = city.name(),
        days = city.delivery_days(),
    );

    OutgoingEmail {
        to: to.to_string(),
        subject: "Purchase confirmation".to_string(),
        body,
    }
}

pub fn list_cities() -> ApiResponse<CityList> {
    let items: Vec<City> = ShippingCity::ALL
        .iter()
        .map(|city| {
            let rate = city.rate();
            City {
                key: city.key().to_string(),
                name: city.name().to_string(),
                cost: rate.cost,
                delivery_time: rate.delivery_days,
            }
        })
        .collect();
    let meta = Meta::total(items.len());
    ApiResponse::success("Cities", CityList { items }, Some(meta))
}

pub async fn get_total_cost(
    state: &AppState,
    user: &AuthUser,
    city: &str,
) -> AppResult<ApiResponse<TotalCost>> {
    let courses = cart_service::cart_courses(&state.pool, &state.config, user.user_id).await?;
    if courses.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let city = parse_city(city)?;

    let prices: Vec<Decimal> = courses.iter().map(|c| c.price).collect();
    Ok(ApiResponse::success(
        "Total cost",
        TotalCost {
            total_cost: total_cost(&prices, city),
        },
        Some(Meta::empty()),
    ))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Purchase>> {
    let txn = state.orm.begin().await?;

    Carts::insert(CartActive {
        id: NotSet,
        user_id: Set(user.user_id),
    })
    .on_conflict(OnConflict::column(CartCol::UserId).do_nothing().to_owned())
    .exec_without_returning(&txn)
    .await?;

    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Cart"))?;

    let courses: Vec<CourseModel> = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.id))
        .find_also_related(Courses)
        .order_by_asc(CartItemCol::Id)
        .all(&txn)
        .await?
        .into_iter()
        .filter_map(|(_, course)| course)
        .collect();

    if courses.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let city = payload.city.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let address = payload.address.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let (Some(city), Some(address)) = (city, address) else {
        return Err(AppError::BadRequest(
            "City and shipping address are required".into(),
        ));
    };
    let city = parse_city(city)?;

    let buyer = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut certificates = Vec::with_capacity(courses.len());
    for course in &courses {
        let certificate = CertificateActive {
            id: NotSet,
            user_id: Set(user.user_id),
            course_id: Set(course.id),
            certificate_number: Set(certificate_number(user.user_id, course.id)),
            certificate_image: Set(None),
            is_shipping: Set(false),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        certificates.push(certificate);
    }

    let shipping = ShippingActive {
        id: NotSet,
        city: Set(city.key().to_string()),
        address: Set(address.to_string()),
        cost: Set(city.cost()),
        delivery_time: Set(city.delivery_days()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for certificate in &certificates {
        ShippingItemActive {
            id: NotSet,
            shipping_certificate_id: Set(shipping.id),
            certificate_id: Set(certificate.id),
        }
        .insert(&txn)
        .await?;
    }

    let prices: Vec<Decimal> = courses.iter().map(|c| c.price).collect();
    let total = total_cost(&prices, city);

    let purchase = PurchaseActive {
        id: NotSet,
        shipping_certificate_id: Set(shipping.id),
        user_id: Set(user.user_id),
        total_cost: Set(total),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let cards: Vec<CourseCard> = courses
        .iter()
        .map(|c| course_card_from_entity(&state.config, c))
        .collect();

    // A failed send drops the transaction, so nothing above is kept.
    state
        .mailer
        .send(confirmation_email(&buyer.email, total, address, city, &cards))
        .await?;

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        user_id = user.user_id,
        purchase_id = purchase.id,
        total = %total,
        city = city.key(),
        "purchase completed"
    );

    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "course_purchases",
        serde_json::json!({ "purchase_id": purchase.id, "total_cost": total.to_string() }),
    )
    .await;

    let now = Utc::now();
    Ok(ApiResponse::success(
        "Purchase completed",
        Purchase {
            id: purchase.id,
            total_cost: purchase.total_cost,
            created_at: purchase.created_at.with_timezone(&Utc),
            shipping: shipping_from_entity(shipping, certificates, now),
            courses: cards,
        },
        Some(Meta::empty()),
    ))
}

fn certificate_from_entity(model: CertificateModel) -> Certificate {
    Certificate {
        id: model.id,
        certificate_number: model.certificate_number,
        certificate_image: model.certificate_image,
        is_shipping: model.is_shipping,
    }
}

fn shipping_from_entity(
    model: ShippingModel,
    certificates: Vec<CertificateModel>,
    now: chrono::DateTime<Utc>,
) -> Shipping {
    Shipping {
        id: model.id,
        certificates: certificates.into_iter().map(certificate_from_entity).collect(),
        city: city_name(&model.city),
        address: model.address,
        cost: model.cost,
        delivery_time: remaining_delivery_days(
            model.delivery_time,
            model.created_at.with_timezone(&Utc),
            now,
        ),
    }
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<PurchaseList>> {
    let rows = Purchases::find()
        .filter(PurchaseCol::UserId.eq(user.user_id))
        .find_also_related(crate::entity::ShippingCertificates)
        .order_by_desc(PurchaseCol::CreatedAt)
        .order_by_desc(PurchaseCol::Id)
        .all(&state.orm)
        .await?;

    let shipping_ids: Vec<i64> = rows.iter().map(|(p, _)| p.shipping_certificate_id).collect();
    let mut certificates_by_shipping: HashMap<i64, Vec<CertificateModel>> = HashMap::new();
    if !shipping_ids.is_empty() {
        for (item, certificate) in ShippingItems::find()
            .filter(ShippingItemCol::ShippingCertificateId.is_in(shipping_ids))
            .find_also_related(Certificates)
            .order_by_asc(ShippingItemCol::Id)
            .all(&state.orm)
            .await?
        {
            if let Some(certificate) = certificate {
                certificates_by_shipping
                    .entry(item.shipping_certificate_id)
                    .or_default()
                    .push(certificate);
            }
        }
    }

    let course_ids: Vec<i64> = certificates_by_shipping
        .values()
        .flatten()
        .map(|c| c.course_id)
        .collect();
    let courses: HashMap<i64, CourseModel> = if course_ids.is_empty() {
        HashMap::new()
    } else {
        Courses::find()
            .filter(CourseCol::Id.is_in(course_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let now = Utc::now();
    let mut items = Vec::with_capacity(rows.len());
    for (purchase, shipping) in rows {
        let Some(shipping) = shipping else {
            continue;
        };
        let certificates = certificates_by_shipping
            .remove(&shipping.id)
            .unwrap_or_default();
        let cards = certificates
            .iter()
            .filter_map(|c| courses.get(&c.course_id))
            .map(|c| course_card_from_entity(&state.config, c))
            .collect();
        items.push(Purchase {
            id: purchase.id,
            total_cost: purchase.total_cost,
            created_at: purchase.created_at.with_timezone(&Utc),
            shipping: shipping_from_entity(shipping, certificates, now),
            courses: cards,
        });
    }

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Orders", PurchaseList { items }, Some(meta)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_email_lists_numbered_courses() {
        let courses = vec![
            CourseCard {
                id: 1,
                title: "Photoshop basics".into(),
                price: Decimal::from(1000),
                image_url: String::new(),
            },
            CourseCard {
                id: 2,
                title: "Rust for web".into(),
                price: Decimal::from(2500),
                image_url: String::new(),
            },
        ];
        let email = confirmation_email(
            "buyer@example.com",
            Decimal::from(5500),
            "Abay 1",
            ShippingCity::Almaty,
            &courses,
        );
        assert_eq!(email.subject, "Purchase confirmation");
        assert!(email.body.contains("Total cost: 5500 KZT."));
        assert!(email.body.contains("Shipping address: Abay 1, Almaty."));
        assert!(email.body.contains("Delivery time: 1 days."));
        assert!(email.body.contains("1. Photoshop basics - 1000 KZT."));
        assert!(email.body.contains("2. Rust for web - 2500 KZT."));
    }

    #[test]
    fn certificate_number_is_deterministic() {
        assert_eq!(certificate_number(7, 42), "CERT-7-42");
    }
}
