use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{cart::CourseIdRequest, favorites::FavoriteCourseList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-favorite/", get(get_favorite))
        .route("/add-to-favorite/", post(add_to_favorite))
        .route("/remove-from-favorite/", post(remove_from_favorite))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-favorite/",
    responses(
        (status = 200, description = "Liked courses, newest first", body = ApiResponse<FavoriteCourseList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn get_favorite(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FavoriteCourseList>>> {
    let resp = favorite_service::list_favorites(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/add-to-favorite/",
    request_body = CourseIdRequest,
    responses(
        (status = 200, description = "Added to favorites", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Already in favorites"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn add_to_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CourseIdRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = favorite_service::add_favorite(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/remove-from-favorite/",
    request_body = CourseIdRequest,
    responses(
        (status = 200, description = "Removed from favorites", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn remove_from_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CourseIdRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = favorite_service::remove_favorite(&state, &user, payload).await?;
    Ok(Json(resp))
}
