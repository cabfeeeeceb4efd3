use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::UserProfile,
    uploads::{MultipartForm, UploadedFile},
};

/// Fields of the `multipart/form-data` sign-up request.
#[derive(Debug, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "enter a valid email address"), length(max = 150))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 150))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150))]
    pub last_name: String,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    #[validate(length(equal = 12, message = "IIN must be 12 characters"))]
    pub iin: String,
    pub id_card_image: UploadedFile,
}

impl RegisterRequest {
    pub fn from_form(mut form: MultipartForm) -> AppResult<Self> {
        let request = Self {
            email: form.require_text("email")?.to_lowercase(),
            password: form.require_text("password")?,
            first_name: form.require_text("first_name")?,
            last_name: form.require_text("last_name")?,
            phone: form.require_text("phone")?,
            iin: form.require_text("iin")?,
            id_card_image: form.require_file("id_card_image")?,
        };
        request.validate()?;
        Ok(request)
    }
}

/// OpenAPI shape of the sign-up form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct RegisterMultipart {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone: String,
    iin: String,
    #[schema(value_type = String, format = Binary)]
    id_card_image: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

/// Used by both email verification and the reset-code check.
#[derive(Deserialize, Debug, ToSchema)]
pub struct CodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password_confirm: String,
}

/// Partial profile update; `None` leaves the field untouched. Email is read-only.
#[derive(Debug, Default, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 150))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub phone: Option<String>,
    #[validate(length(equal = 12, message = "IIN must be 12 characters"))]
    pub iin: Option<String>,
    pub id_card_image: Option<UploadedFile>,
}

impl UpdateProfileRequest {
    pub fn from_form(mut form: MultipartForm) -> AppResult<Self> {
        if form.text("email").is_some() {
            return Err(AppError::BadRequest("email cannot be changed".into()));
        }
        let request = Self {
            first_name: form.text("first_name"),
            last_name: form.text("last_name"),
            phone: form.text("phone"),
            iin: form.text("iin"),
            id_card_image: form.take_file("id_card_image"),
        };
        request.validate()?;
        Ok(request)
    }
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateProfileMultipart {
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    iin: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    id_card_image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<UserProfile>)]
    pub items: Vec<UserProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub token_type: TokenType,
    pub is_staff: bool,
    pub iat: usize,
    pub exp: usize,
}
