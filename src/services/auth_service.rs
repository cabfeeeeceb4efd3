use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{
        AccessToken, Claims, CodeRequest, EmailRequest, LoginRequest, RefreshRequest,
        RegisterRequest, ResetPasswordRequest, TokenPair, TokenType, UpdateProfileRequest,
        UserList,
    },
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    error::{AppError, AppResult, AuthFailure},
    middleware::auth::{AuthUser, ensure_staff},
    models::UserProfile,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::verification_service::{
        CodePurpose, check_code, code_email, consume_code, issue_code,
    },
    state::AppState,
    uploads::{discard_upload, save_upload},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user: &UserModel, token_type: TokenType) -> AppResult<String> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => Duration::minutes(config.access_token_ttl_minutes),
        TokenType::Refresh => Duration::days(config.refresh_token_ttl_days),
    };
    let expiration = now
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        token_type,
        is_staff: user.is_privileged(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn issue_token_pair(config: &AppConfig, user: &UserModel) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access: issue_token(config, user, TokenType::Access)?,
        refresh: issue_token(config, user, TokenType::Refresh)?,
    })
}

/// Decodes and checks signature, expiry and token type.
pub fn decode_claims(secret: &str, token: &str, expected: TokenType) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    if decoded.claims.token_type != expected {
        return Err(AppError::Unauthorized("Wrong token type".into()));
    }
    Ok(decoded.claims)
}

pub fn profile_from_entity(config: &AppConfig, model: UserModel) -> UserProfile {
    UserProfile {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        phone: model.phone,
        iin: model.iin,
        id_card_image: model.id_card_image.map(|path| config.media_url(&path)),
        is_superuser: model.is_superuser,
    }
}

async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<UserModel>> {
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;
    Ok(user)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
        phone,
        iin,
        id_card_image,
    } = payload;
    let email = email.trim().to_lowercase();

    let taken = Users::find()
        .filter(
            Condition::any()
                .add(UserCol::Email.eq(email.as_str()))
                .add(UserCol::Phone.eq(phone.as_str()))
                .add(UserCol::Iin.eq(iin.as_str())),
        )
        .one(&state.orm)
        .await?;
    if let Some(existing) = taken {
        let field = if existing.email == email {
            "Email"
        } else if existing.phone == phone {
            "Phone"
        } else {
            "IIN"
        };
        return Err(AppError::BadRequest(format!("{field} is already taken")));
    }

    let password_hash = hash_password(&password)?;
    let id_card_path = save_upload(&state.config.media_root, "id_cards", &id_card_image).await?;

    // The account only exists if the activation code actually went out.
    let created: AppResult<UserModel> = async {
        let txn = state.orm.begin().await?;
        let user = UserActive {
            id: NotSet,
            email: Set(email),
            first_name: Set(first_name),
            last_name: Set(last_name),
            phone: Set(phone),
            iin: Set(Some(iin)),
            id_card_image: Set(Some(id_card_path.clone())),
            password_hash: Set(password_hash),
            is_staff: Set(false),
            is_superuser: Set(false),
            is_active: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let code = issue_code(&txn, CodePurpose::VerifyEmail, user.id).await?;
        state
            .mailer
            .send(code_email(CodePurpose::VerifyEmail, &user.email, &code))
            .await?;
        txn.commit().await?;
        Ok(user)
    }
    .await;
    let user = match created {
        Ok(user) => user,
        Err(err) => {
            discard_upload(&state.config.media_root, &id_card_path).await;
            return Err(err);
        }
    };

    audit::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User registered, check your email for the activation code",
        profile_from_entity(&state.config, user),
        Some(Meta::empty()),
    ))
}

pub async fn verify_email(
    state: &AppState,
    payload: CodeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let invalid = || AppError::Forbidden("Invalid code".into());
    let user = find_by_email(state, &payload.email).await?.ok_or_else(invalid)?;

    if !check_code(&state.orm, CodePurpose::VerifyEmail, user.id, &payload.code).await? {
        return Err(invalid());
    }

    let user_id = user.id;
    let txn = state.orm.begin().await?;
    let mut active: UserActive = user.into();
    active.is_active = Set(true);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    consume_code(&txn, CodePurpose::VerifyEmail, user_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user_id),
        "user_verify_email",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::message("Email verified"))
}

pub async fn login_user(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<TokenPair>> {
    let LoginRequest { email, password } = payload;
    let user = find_by_email(state, &email)
        .await?
        .ok_or(AppError::Auth(AuthFailure::UserNotFound))?;

    if !user.is_active {
        return Err(AppError::Auth(AuthFailure::UserNotActive));
    }

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Auth(AuthFailure::BadCredentials));
    }

    let tokens = issue_token_pair(&state.config, &user)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", tokens, Some(Meta::empty())))
}

pub async fn refresh_token(
    state: &AppState,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AccessToken>> {
    let claims = decode_claims(&state.config.jwt_secret, &payload.refresh, TokenType::Refresh)?;
    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User is no longer available".into()))?;

    let access = issue_token(&state.config, &user, TokenType::Access)?;
    Ok(ApiResponse::success(
        "Token refreshed",
        AccessToken { access },
        Some(Meta::empty()),
    ))
}

/// Tokens are stateless; logging out only leaves an audit trail.
pub async fn logout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<serde_json::Value>> {
    audit::record(
        &state.pool,
        Some(user.user_id),
        "user_logout",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;
    Ok(ApiResponse::message("Logged out"))
}

pub async fn send_reset_password_code(
    state: &AppState,
    payload: EmailRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user = find_by_email(state, &payload.email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let txn = state.orm.begin().await?;
    let code = issue_code(&txn, CodePurpose::ResetPassword, user.id).await?;
    state
        .mailer
        .send(code_email(CodePurpose::ResetPassword, &user.email, &code))
        .await?;
    txn.commit().await?;

    Ok(ApiResponse::message(format!(
        "Password reset code sent to {}",
        user.email
    )))
}

pub async fn check_reset_password_code(
    state: &AppState,
    payload: CodeRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let invalid = || AppError::BadRequest("Invalid code".into());
    let user = find_by_email(state, &payload.email).await?.ok_or_else(invalid)?;

    if !check_code(&state.orm, CodePurpose::ResetPassword, user.id, &payload.code).await? {
        return Err(invalid());
    }
    Ok(ApiResponse::message("Code is valid"))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.password != payload.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }
    validator::Validate::validate(&payload)?;

    let user = find_by_email(state, &payload.email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    if !check_code(&state.orm, CodePurpose::ResetPassword, user.id, &payload.code).await? {
        return Err(AppError::BadRequest("Invalid code".into()));
    }

    let user_id = user.id;
    let password_hash = hash_password(&payload.password)?;
    let txn = state.orm.begin().await?;
    let mut active: UserActive = user.into();
    active.password_hash = Set(password_hash);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    consume_code(&txn, CodePurpose::ResetPassword, user_id).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::message("Password changed"))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Users::find().order_by_asc(UserCol::Id);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| profile_from_entity(&state.config, u))
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success(
        "Profile",
        profile_from_entity(&state.config, model),
        Some(Meta::empty()),
    ))
}

pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let mut clash = Condition::any();
    let mut check_clash = false;
    if let Some(phone) = payload.phone.as_ref() {
        clash = clash.add(UserCol::Phone.eq(phone.as_str()));
        check_clash = true;
    }
    if let Some(iin) = payload.iin.as_ref() {
        clash = clash.add(UserCol::Iin.eq(iin.as_str()));
        check_clash = true;
    }
    if check_clash {
        let other = Users::find()
            .filter(clash)
            .filter(UserCol::Id.ne(user.user_id))
            .one(&state.orm)
            .await?;
        if let Some(other) = other {
            let field = if payload.phone.as_deref() == Some(other.phone.as_str()) {
                "Phone"
            } else {
                "IIN"
            };
            return Err(AppError::BadRequest(format!("{field} is already taken")));
        }
    }

    let mut active: UserActive = existing.into();
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(iin) = payload.iin {
        active.iin = Set(Some(iin));
    }
    let mut new_upload = None;
    if let Some(file) = payload.id_card_image.as_ref() {
        let path = save_upload(&state.config.media_root, "id_cards", file).await?;
        active.id_card_image = Set(Some(path.clone()));
        new_upload = Some(path);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = match active.update(&state.orm).await {
        Ok(updated) => updated,
        Err(err) => {
            if let Some(path) = new_upload {
                discard_upload(&state.config.media_root, &path).await;
            }
            return Err(err.into());
        }
    };

    audit::record(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        profile_from_entity(&state.config, updated),
        Some(Meta::empty()),
    ))
}
