use chrono::{Duration, Utc};
use course_marketplace_api::{
    config::AppConfig,
    dto::auth::TokenType,
    entity::users::Model as UserModel,
    error::AppError,
    services::{
        auth_service::{decode_claims, hash_password, issue_token_pair, verify_password},
        verification_service::{
            CodePurpose, code_email, code_key, code_matches, generate_code,
        },
    },
};

fn config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "unit-secret".into(),
        access_token_ttl_minutes: 60,
        refresh_token_ttl_days: 1,
        app_env: "test".into(),
        smtp_host: String::new(),
        smtp_user: String::new(),
        smtp_password: String::new(),
        email_from: String::new(),
        media_root: "media".into(),
        public_base_url: "http://localhost:3000".into(),
    }
}

fn user(is_staff: bool) -> UserModel {
    let now = Utc::now().into();
    UserModel {
        id: 42,
        email: "staff@example.com".into(),
        first_name: "Dana".into(),
        last_name: "Karim".into(),
        phone: "+77001112233".into(),
        iin: None,
        id_card_image: None,
        password_hash: String::new(),
        is_staff,
        is_superuser: false,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn token_pair_round_trips_and_types_are_enforced() {
    let config = config();
    let pair = issue_token_pair(&config, &user(true)).expect("tokens");

    let access = decode_claims(&config.jwt_secret, &pair.access, TokenType::Access).expect("access");
    assert_eq!(access.sub, "42");
    assert!(access.is_staff);
    assert!(access.exp > access.iat);

    let refresh =
        decode_claims(&config.jwt_secret, &pair.refresh, TokenType::Refresh).expect("refresh");
    assert!(refresh.exp > access.exp);

    let err = decode_claims(&config.jwt_secret, &pair.refresh, TokenType::Access).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    let err = decode_claims("another-secret", &pair.access, TokenType::Access).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn passwords_hash_and_verify() {
    let hash = hash_password("correct horse").expect("hash");
    assert!(verify_password("correct horse", &hash).expect("verify"));
    assert!(!verify_password("battery staple", &hash).expect("verify"));
}

#[tokio::test]
async fn codes_are_six_digits() {
    for _ in 0..100 {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        let n: u32 = code.parse().expect("numeric");
        assert!((100_000..=999_999).contains(&n));
    }
}

#[tokio::test]
async fn codes_expire_and_must_match_exactly() {
    let now = Utc::now();
    let expires = now + Duration::minutes(5);
    assert!(code_matches("123456", expires, "123456", now));
    assert!(code_matches("123456", expires, " 123456 ", now));
    assert!(!code_matches("123456", expires, "654321", now));
    assert!(!code_matches("123456", expires, "123456", now + Duration::minutes(5)));
    assert!(!code_matches("123456", expires, "123456", now + Duration::minutes(6)));
}

#[tokio::test]
async fn code_namespaces_do_not_collide() {
    assert_eq!(code_key(CodePurpose::VerifyEmail, 7), "verify_email_7");
    assert_eq!(code_key(CodePurpose::ResetPassword, 7), "reset_password_7");

    let email = code_email(CodePurpose::ResetPassword, "a@example.com", "111222");
    assert_eq!(email.subject, "Password reset code");
    assert!(email.body.ends_with("111222"));
}
