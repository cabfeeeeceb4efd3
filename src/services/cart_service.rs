use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::{
    audit,
    config::AppConfig,
    db::DbPool,
    dto::cart::{CartView, CourseIdRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CourseCard,
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
pub(crate) struct CourseCardRow {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub image: String,
}

impl CourseCardRow {
    pub fn into_card(self, config: &AppConfig) -> CourseCard {
        CourseCard {
            id: self.id,
            title: self.title,
            price: self.price,
            image_url: config.media_url(&self.image),
        }
    }
}

/// Returns the caller's cart id, creating the cart on first use.
pub async fn ensure_cart(pool: &DbPool, user_id: i64) -> AppResult<i64> {
    sqlx::query("INSERT INTO course_carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await?;

    let cart: (i64,) = sqlx::query_as("SELECT id FROM course_carts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(cart.0)
}

pub(crate) async fn ensure_course_exists(pool: &DbPool, course_id: i64) -> AppResult<()> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found("Course"));
    }
    Ok(())
}

pub async fn cart_courses(pool: &DbPool, config: &AppConfig, user_id: i64) -> AppResult<Vec<CourseCard>> {
    let rows = sqlx::query_as::<_, CourseCardRow>(
        r#"
        SELECT c.id, c.title, c.price, c.image
        FROM course_carts cart
        JOIN course_cart_items ci ON ci.cart_id = cart.id
        JOIN courses c ON c.id = ci.course_id
        WHERE cart.user_id = $1
        ORDER BY ci.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.into_card(config)).collect())
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    ensure_cart(&state.pool, user.user_id).await?;
    let courses = cart_courses(&state.pool, &state.config, user.user_id).await?;
    let meta = Meta::total(courses.len());
    Ok(ApiResponse::success("Cart", CartView { courses }, Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: CourseIdRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_course_exists(&state.pool, payload.course_id).await?;
    let cart_id = ensure_cart(&state.pool, user.user_id).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO course_cart_items (cart_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (cart_id, course_id) DO NOTHING
        "#,
    )
    .bind(cart_id)
    .bind(payload.course_id)
    .execute(&state.pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::BadRequest("Course is already in the cart".into()));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        "course_cart_items",
        serde_json::json!({ "course_id": payload.course_id }),
    )
    .await;

    let courses = cart_courses(&state.pool, &state.config, user.user_id).await?;
    let meta = Meta::total(courses.len());
    Ok(ApiResponse::success("Course added to cart", CartView { courses }, Some(meta)))
}

/// Removing a course that is not in the cart is not an error.
pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    payload: CourseIdRequest,
) -> AppResult<ApiResponse<CartView>> {
    ensure_course_exists(&state.pool, payload.course_id).await?;
    let cart_id = ensure_cart(&state.pool, user.user_id).await?;

    let result = sqlx::query("DELETE FROM course_cart_items WHERE cart_id = $1 AND course_id = $2")
        .bind(cart_id)
        .bind(payload.course_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() > 0 {
        audit::record(
            &state.pool,
            Some(user.user_id),
            "cart_remove",
            "course_cart_items",
            serde_json::json!({ "course_id": payload.course_id }),
        )
        .await;
    }

    let courses = cart_courses(&state.pool, &state.config, user.user_id).await?;
    let meta = Meta::total(courses.len());
    Ok(ApiResponse::success(
        "Course removed from cart",
        CartView { courses },
        Some(meta),
    ))
}
