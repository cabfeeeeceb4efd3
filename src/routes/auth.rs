use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::auth::{
        AccessToken, CodeRequest, EmailRequest, LoginRequest, RefreshRequest, RegisterMultipart,
        RegisterRequest, ResetPasswordRequest, TokenPair, UpdateProfileMultipart,
        UpdateProfileRequest, UserList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::UserProfile,
    response::ApiResponse,
    routes::params::Pagination,
    services::auth_service,
    state::AppState,
    uploads::MultipartForm,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", post(login))
        .route("/sign-up/", post(sign_up))
        .route("/logout/", post(logout))
        .route("/token/refresh/", post(refresh_token))
        .route("/verify-email/", post(verify_email))
        .route("/send-reset-password-code/", post(send_reset_password_code))
        .route("/check-reset-password-code/", post(check_reset_password_code))
        .route("/reset-password/", post(reset_password))
        .route("/get-user-list", get(get_user_list))
        .route("/get-profile-info", get(get_profile_info))
        .route("/update-profile-info", post(update_profile_info))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up/",
    request_body(content = RegisterMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Inactive user created, activation code emailed", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed or email/phone/IIN taken")
    ),
    tag = "Auth"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<UserProfile>>)> {
    let form = MultipartForm::from_multipart(multipart).await?;
    let payload = RegisterRequest::from_form(form)?;
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-email/",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Account activated", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Invalid code")
    ),
    tag = "Auth"
)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<CodeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::verify_email(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = ApiResponse<TokenPair>),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "User is not active"),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/token/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<AccessToken>),
        (status = 401, description = "Invalid or expired refresh token")
    ),
    tag = "Auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AccessToken>>> {
    let resp = auth_service::refresh_token(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout/",
    responses(
        (status = 200, description = "Logged out", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::logout(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/send-reset-password-code/",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset code emailed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn send_reset_password_code(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::send_reset_password_code(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/check-reset-password-code/",
    request_body = CodeRequest,
    responses(
        (status = 200, description = "Code is valid", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid code")
    ),
    tag = "Auth"
)]
pub async fn check_reset_password_code(
    State(state): State<AppState>,
    Json(payload): Json<CodeRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::check_reset_password_code(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password/",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Passwords do not match or invalid code"),
        (status = 404, description = "User not found")
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::reset_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/get-user-list",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "All users", body = ApiResponse<UserList>),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = auth_service::list_users(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/get-profile-info",
    responses(
        (status = 200, description = "Current user's profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_profile_info(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let resp = auth_service::get_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/update-profile-info",
    request_body(content = UpdateProfileMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<UserProfile>),
        (status = 400, description = "Validation failed or phone/IIN taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile_info(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let form = MultipartForm::from_multipart(multipart).await?;
    let payload = UpdateProfileRequest::from_form(form)?;
    let resp = auth_service::update_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}
