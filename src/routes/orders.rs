use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::orders::{CheckoutRequest, CityList, PurchaseList, TotalCost},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Purchase,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-cities/", get(get_cities))
        .route("/get-total-cost/{city}", get(get_total_cost))
        .route("/checkout/", post(checkout))
        .route("/get-orders/", get(get_orders))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-cities/",
    responses(
        (status = 200, description = "Cities with shipping cost and delivery days", body = ApiResponse<CityList>)
    ),
    tag = "Orders"
)]
pub async fn get_cities() -> Json<ApiResponse<CityList>> {
    Json(order_service::list_cities())
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-total-cost/{city}",
    params(("city" = String, Path, description = "City key, e.g. almaty")),
    responses(
        (status = 200, description = "Cart total plus shipping", body = ApiResponse<TotalCost>),
        (status = 400, description = "Empty cart or unknown city")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_total_cost(
    State(state): State<AppState>,
    user: AuthUser,
    Path(city): Path<String>,
) -> AppResult<Json<ApiResponse<TotalCost>>> {
    let resp = order_service::get_total_cost(&state, &user, &city).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/checkout/",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Purchase created and confirmation emailed", body = ApiResponse<Purchase>),
        (status = 400, description = "Empty cart, missing or unknown city, missing address"),
        (status = 500, description = "Confirmation email could not be sent; nothing was stored")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<Purchase>>> {
    let resp = order_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/get-orders/",
    responses(
        (status = 200, description = "Purchases of the current user, newest first", body = ApiResponse<PurchaseList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PurchaseList>>> {
    let resp = order_service::list_orders(&state, &user).await?;
    Ok(Json(resp))
}
