use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};

use crate::{
    dto::courses::{
        AddReviewRequest, CategoryMap, ChapterLessons, CourseDetail, CourseList, CourseQuery,
        CreateChapterRequest, CreateCourseMultipart, CreateCourseRequest, CreateLessonRequest,
        UpdateCourseMultipart, UpdateCourseRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Chapter, Course, Lesson, Review},
    response::ApiResponse,
    services::course_service,
    state::AppState,
    uploads::MultipartForm,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-category-list/", get(get_category_list))
        .route("/get-course-list/", get(get_course_list))
        .route("/get-course-detail/{id}/", get(get_course_detail))
        .route("/get-chapter-lessons/{id}/", get(get_chapter_lessons))
        .route("/add-course/", post(add_course))
        .route("/add-course-chapter/", post(add_course_chapter))
        .route("/add-chapter-lesson/", post(add_chapter_lesson))
        .route("/edit-course/{id}", patch(edit_course).put(edit_course))
        .route("/delete-course/{id}", delete(delete_course))
        .route("/add-review-and-rating/", post(add_review_and_rating))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-category-list/",
    responses(
        (status = 200, description = "Category key to label", body = ApiResponse<CategoryMap>)
    ),
    tag = "Courses"
)]
pub async fn get_category_list() -> Json<ApiResponse<CategoryMap>> {
    Json(course_service::list_categories())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-course-list/",
    params(
        ("category" = Option<String>, Query, description = "Exact category key"),
        ("title" = Option<String>, Query, description = "Case-insensitive title substring")
    ),
    responses(
        (status = 200, description = "Courses ordered by id", body = ApiResponse<CourseList>)
    ),
    tag = "Courses"
)]
pub async fn get_course_list(
    State(state): State<AppState>,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<ApiResponse<CourseList>>> {
    let resp = course_service::list_courses(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-course-detail/{id}/",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with chapters and reviews", body = ApiResponse<CourseDetail>),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses"
)]
pub async fn get_course_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<CourseDetail>>> {
    let resp = course_service::get_course_detail(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-chapter-lessons/{id}/",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, description = "Lessons of a chapter", body = ApiResponse<ChapterLessons>),
        (status = 404, description = "Chapter not found")
    ),
    tag = "Courses"
)]
pub async fn get_chapter_lessons(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ChapterLessons>>> {
    let resp = course_service::get_chapter_lessons(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/add-course/",
    request_body(content = CreateCourseMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Course created", body = ApiResponse<Course>),
        (status = 400, description = "Invalid field")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn add_course(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Course>>)> {
    let form = MultipartForm::from_multipart(multipart).await?;
    let payload = CreateCourseRequest::from_form(form)?;
    let resp = course_service::create_course(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/add-course-chapter/",
    request_body = CreateChapterRequest,
    responses(
        (status = 201, description = "Chapter created", body = ApiResponse<Chapter>),
        (status = 403, description = "Not the course author"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn add_course_chapter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateChapterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Chapter>>)> {
    let resp = course_service::create_chapter(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/add-chapter-lesson/",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = ApiResponse<Lesson>),
        (status = 403, description = "Not the course author"),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn add_chapter_lesson(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateLessonRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Lesson>>)> {
    let resp = course_service::create_lesson(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/courses/edit-course/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body(content = UpdateCourseMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Course updated", body = ApiResponse<Course>),
        (status = 403, description = "Not the course author"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn edit_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Course>>> {
    let form = MultipartForm::from_multipart(multipart).await?;
    let payload = UpdateCourseRequest::from_form(form)?;
    let resp = course_service::update_course(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/delete-course/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Not the course author"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = course_service::delete_course(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/add-review-and-rating/",
    request_body = AddReviewRequest,
    responses(
        (status = 201, description = "Review and rating stored", body = ApiResponse<Review>),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
pub async fn add_review_and_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = course_service::add_review_and_rating(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
