use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod courses;
pub mod doc;
pub mod favorites;
pub mod health;
pub mod orders;
pub mod params;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let courses = courses::router()
        .merge(cart::router())
        .merge(favorites::router())
        .merge(orders::router());

    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses)
}
