mod common;

use std::sync::Arc;

use course_marketplace_api::{
    dto::{cart::CourseIdRequest, orders::CheckoutRequest},
    error::AppError,
    services::{cart_service, order_service},
};
use rust_decimal::Decimal;

use common::{
    FailingMailer, RecordingMailer, create_course, create_user, database_url, setup_state,
    with_mailer,
};

// Integration flow: cart -> total cost -> failed checkout rolls back -> checkout -> orders.
#[tokio::test]
async fn cart_checkout_and_orders_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let mailer = RecordingMailer::default();
    let state = setup_state(&database_url, Arc::new(mailer.clone())).await?;

    let author = create_user(&state, "author@example.com", "+77000000010", true).await?;
    let buyer = create_user(&state, "buyer@example.com", "+77000000011", false).await?;
    let design = create_course(&state, &author, "Figma basics", 1000, "ui/ux design").await?;
    let web = create_course(&state, &author, "Axum in practice", 2500, "web development").await?;

    // Nothing to buy yet.
    let err = order_service::get_total_cost(&state, &buyer, "almaty")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            city: Some("almaty".into()),
            address: Some("Abay 10".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let empty = cart_service::get_cart(&state, &buyer).await?;
    assert!(empty.data.expect("cart").courses.is_empty());

    cart_service::add_to_cart(&state, &buyer, CourseIdRequest { course_id: design }).await?;
    let err = cart_service::add_to_cart(&state, &buyer, CourseIdRequest { course_id: design })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(msg) if msg == "Course is already in the cart"));
    let err = cart_service::add_to_cart(&state, &buyer, CourseIdRequest { course_id: 999_999 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let cart = cart_service::add_to_cart(&state, &buyer, CourseIdRequest { course_id: web })
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.courses.len(), 2);
    assert!(cart.courses[0].image_url.ends_with("/media/uploads/courses/cover.png"));

    // Removing twice is fine.
    cart_service::remove_from_cart(&state, &buyer, CourseIdRequest { course_id: web }).await?;
    let cart = cart_service::remove_from_cart(&state, &buyer, CourseIdRequest { course_id: web })
        .await?
        .data
        .expect("cart");
    assert_eq!(cart.courses.len(), 1);
    cart_service::add_to_cart(&state, &buyer, CourseIdRequest { course_id: web }).await?;

    let total = order_service::get_total_cost(&state, &buyer, "almaty")
        .await?
        .data
        .expect("total");
    assert_eq!(total.total_cost, Decimal::from(5500));
    let err = order_service::get_total_cost(&state, &buyer, "atlantis")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Validation happens before any write.
    let err = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            city: Some("almaty".into()),
            address: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            city: Some("atlantis".into()),
            address: Some("Somewhere 1".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // A failed confirmation email undoes the whole purchase.
    let failing = with_mailer(&state, Arc::new(FailingMailer));
    let err = order_service::checkout(
        &failing,
        &buyer,
        CheckoutRequest {
            city: Some("almaty".into()),
            address: Some("Abay 10".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Mail(_)));
    let orders = order_service::list_orders(&state, &buyer).await?;
    assert!(orders.data.expect("orders").items.is_empty());
    let cart = cart_service::get_cart(&state, &buyer).await?;
    assert_eq!(cart.data.expect("cart").courses.len(), 2);

    let purchase = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            city: Some("almaty".into()),
            address: Some("Abay 10".into()),
        },
    )
    .await?
    .data
    .expect("purchase");
    assert_eq!(purchase.total_cost, Decimal::from(5500));
    assert_eq!(purchase.shipping.cost, Decimal::from(2000));
    assert_eq!(purchase.shipping.city, "Almaty");
    assert_eq!(purchase.shipping.delivery_time, 1);
    let numbers: Vec<_> = purchase
        .shipping
        .certificates
        .iter()
        .map(|c| c.certificate_number.clone())
        .collect();
    assert_eq!(
        numbers,
        vec![
            format!("CERT-{}-{}", buyer.user_id, design),
            format!("CERT-{}-{}", buyer.user_id, web),
        ]
    );
    assert!(purchase.shipping.certificates.iter().all(|c| !c.is_shipping));

    let confirmation = mailer.last().expect("confirmation email");
    assert_eq!(confirmation.to, "buyer@example.com");
    assert_eq!(confirmation.subject, "Purchase confirmation");
    assert!(confirmation.body.contains("Total cost: 5500"));
    assert!(confirmation.body.contains("Shipping address: Abay 10, Almaty."));

    let cart = cart_service::get_cart(&state, &buyer).await?;
    assert!(cart.data.expect("cart").courses.is_empty());

    let orders = order_service::list_orders(&state, &buyer)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, purchase.id);
    assert_eq!(orders[0].courses.len(), 2);
    assert_eq!(orders[0].shipping.certificates.len(), 2);
    assert_eq!(orders[0].shipping.address, "Abay 10");

    // Other users see nothing.
    let orders = order_service::list_orders(&state, &author).await?;
    assert!(orders.data.expect("orders").items.is_empty());

    Ok(())
}
