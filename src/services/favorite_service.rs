use crate::{
    audit,
    dto::{cart::CourseIdRequest, favorites::FavoriteCourseList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cart_service::{CourseCardRow, ensure_course_exists},
    state::AppState,
};

pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FavoriteCourseList>> {
    let rows = sqlx::query_as::<_, CourseCardRow>(
        r#"
        SELECT c.id, c.title, c.price, c.image
        FROM course_likes l
        JOIN courses c ON c.id = l.course_id
        WHERE l.user_id = $1
        ORDER BY l.created_at DESC, l.id DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<_> = rows.into_iter().map(|row| row.into_card(&state.config)).collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Favorites",
        FavoriteCourseList { items },
        Some(meta),
    ))
}

pub async fn add_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: CourseIdRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_course_exists(&state.pool, payload.course_id).await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO course_likes (course_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, course_id) DO NOTHING
        "#,
    )
    .bind(payload.course_id)
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::BadRequest("Course is already in favorites".into()));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "favorite_add",
        "course_likes",
        serde_json::json!({ "course_id": payload.course_id }),
    )
    .await;

    Ok(ApiResponse::message("Course added to favorites"))
}

pub async fn remove_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: CourseIdRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_course_exists(&state.pool, payload.course_id).await?;

    let result = sqlx::query("DELETE FROM course_likes WHERE course_id = $1 AND user_id = $2")
        .bind(payload.course_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() > 0 {
        audit::record(
            &state.pool,
            Some(user.user_id),
            "favorite_remove",
            "course_likes",
            serde_json::json!({ "course_id": payload.course_id }),
        )
        .await;
    }

    Ok(ApiResponse::message("Course removed from favorites"))
}
