pub mod auth;
pub mod cart;
pub mod courses;
pub mod favorites;
pub mod orders;
