mod common;

use std::sync::Arc;

use course_marketplace_api::{
    dto::auth::{
        CodeRequest, EmailRequest, LoginRequest, RefreshRequest, RegisterRequest,
        ResetPasswordRequest, TokenType, UpdateProfileRequest,
    },
    error::{AppError, AuthFailure},
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::auth_service,
    uploads::UploadedFile,
};

use common::{
    FailingMailer, RecordingMailer, database_url, setup_state, upload_count, with_mailer,
};

fn register_request(email: &str, phone: &str, iin: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "supersecret".into(),
        first_name: "Aruzhan".into(),
        last_name: "Bekova".into(),
        phone: phone.to_string(),
        iin: iin.to_string(),
        id_card_image: UploadedFile {
            file_name: Some("card.png".into()),
            content_type: Some("image/png".into()),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        },
    }
}

// Integration flow: sign up -> verify -> login -> refresh -> reset password -> profile.
#[tokio::test]
async fn register_verify_login_and_reset_flow() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        return Ok(());
    };
    let mailer = RecordingMailer::default();
    let state = setup_state(&database_url, Arc::new(mailer.clone())).await?;

    // A failed activation email leaves no account and no stored ID card behind.
    let stored_cards = upload_count(&state, "id_cards");
    let failing = with_mailer(&state, Arc::new(FailingMailer));
    let err = auth_service::register_user(
        &failing,
        register_request("lost@example.com", "+77000000009", "000000000009"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Mail(_)));
    assert_eq!(upload_count(&state, "id_cards"), stored_cards);
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "lost@example.com".into(),
            password: "supersecret".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthFailure::UserNotFound)));

    let created = auth_service::register_user(
        &state,
        register_request("Student@Example.com", "+77000000001", "000000000001"),
    )
    .await?;
    let profile = created.data.expect("profile");
    assert_eq!(profile.email, "student@example.com");
    assert!(
        profile
            .id_card_image
            .as_deref()
            .is_some_and(|url| url.starts_with("http://localhost:3000/media/uploads/id_cards/"))
    );
    let activation = mailer.last().expect("activation email");
    assert_eq!(activation.subject, "User activation code");
    let code = mailer.last_code();
    assert_eq!(code.len(), 6);

    // Same phone is rejected.
    let err = auth_service::register_user(
        &state,
        register_request("other@example.com", "+77000000001", "000000000002"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Inactive accounts cannot log in.
    let login = || LoginRequest {
        email: "Student@Example.com".into(),
        password: "supersecret".into(),
    };
    let err = auth_service::login_user(&state, login()).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthFailure::UserNotActive)));

    let wrong = if code == "999999" { "100000" } else { "999999" };
    let err = auth_service::verify_email(
        &state,
        CodeRequest {
            email: "Student@Example.com".into(),
            code: wrong.into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    auth_service::verify_email(
        &state,
        CodeRequest {
            email: "Student@Example.com".into(),
            code: code.clone(),
        },
    )
    .await?;

    // The code is consumed.
    let err = auth_service::verify_email(
        &state,
        CodeRequest {
            email: "Student@Example.com".into(),
            code,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "Student@Example.com".into(),
            password: "wrong-password".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthFailure::BadCredentials)));

    let tokens = auth_service::login_user(&state, login())
        .await?
        .data
        .expect("tokens");
    let claims = auth_service::decode_claims(
        &state.config.jwt_secret,
        &tokens.access,
        TokenType::Access,
    )?;
    assert_eq!(claims.sub, profile.id.to_string());
    assert!(!claims.is_staff);

    let refreshed = auth_service::refresh_token(
        &state,
        RefreshRequest {
            refresh: tokens.refresh.clone(),
        },
    )
    .await?;
    assert!(refreshed.data.is_some());
    let err = auth_service::refresh_token(
        &state,
        RefreshRequest {
            refresh: tokens.access.clone(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Password reset
    let err = auth_service::send_reset_password_code(
        &state,
        EmailRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    auth_service::send_reset_password_code(
        &state,
        EmailRequest {
            email: "student@example.com".into(),
        },
    )
    .await?;
    assert_eq!(mailer.last().expect("reset email").subject, "Password reset code");
    let reset_code = mailer.last_code();

    auth_service::check_reset_password_code(
        &state,
        CodeRequest {
            email: "student@example.com".into(),
            code: reset_code.clone(),
        },
    )
    .await?;

    let err = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: "student@example.com".into(),
            code: reset_code.clone(),
            password: "brand-new-pass".into(),
            password_confirm: "different-pass".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: "student@example.com".into(),
            code: reset_code.clone(),
            password: "brand-new-pass".into(),
            password_confirm: "brand-new-pass".into(),
        },
    )
    .await?;

    let err = auth_service::check_reset_password_code(
        &state,
        CodeRequest {
            email: "student@example.com".into(),
            code: reset_code,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::login_user(
        &state,
        LoginRequest {
            email: "student@example.com".into(),
            password: "brand-new-pass".into(),
        },
    )
    .await?;

    // Profile
    let me = AuthUser {
        user_id: profile.id,
        is_staff: false,
    };
    let updated = auth_service::update_profile(
        &state,
        &me,
        UpdateProfileRequest {
            first_name: Some("Aru".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("profile");
    assert_eq!(updated.first_name, "Aru");
    assert_eq!(updated.last_name, "Bekova");

    let err = auth_service::list_users(&state, &me, Pagination::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let staff = AuthUser {
        user_id: profile.id,
        is_staff: true,
    };
    let users = auth_service::list_users(&state, &staff, Pagination::default()).await?;
    assert_eq!(users.data.expect("users").items.len(), 1);

    Ok(())
}
