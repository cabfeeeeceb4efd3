#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use course_marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{courses::ActiveModel as CourseActive, users::ActiveModel as UserActive},
    error::{AppError, AppResult},
    mailer::{Mailer, OutgoingEmail},
    middleware::auth::AuthUser,
    services::auth_service::hash_password,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};

/// Keeps every message so tests can read the codes that were "sent".
#[derive(Default, Clone)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl RecordingMailer {
    pub fn last(&self) -> Option<OutgoingEmail> {
        self.sent.lock().ok().and_then(|sent| sent.last().cloned())
    }

    /// The code at the end of the most recent code email.
    pub fn last_code(&self) -> String {
        let email = self.last().expect("no email recorded");
        email
            .body
            .rsplit(' ')
            .next()
            .expect("code in body")
            .trim()
            .to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> AppResult<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> AppResult<()> {
        Err(AppError::Mail("smtp unavailable".into()))
    }
}

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            None
        }
    }
}

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 3000,
        jwt_secret: "test-secret".into(),
        access_token_ttl_minutes: 60,
        refresh_token_ttl_days: 1,
        app_env: "test".into(),
        smtp_host: "localhost".into(),
        smtp_user: String::new(),
        smtp_password: String::new(),
        email_from: "noreply@example.com".into(),
        media_root: std::env::temp_dir()
            .join("course-marketplace-test-media")
            .to_string_lossy()
            .into_owned(),
        public_base_url: "http://localhost:3000".into(),
    }
}

pub async fn setup_state(
    database_url: &str,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE audit_logs, course_purchases, shipping_certificate_items, \
         shipping_certificates, course_certificates, course_likes, course_cart_items, \
         course_carts, course_ratings, course_reviews, course_lessons, course_chapters, \
         courses, verification_codes, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let pool = create_pool(database_url).await?;
    Ok(AppState {
        pool,
        orm,
        config: Arc::new(test_config(database_url)),
        mailer,
    })
}

/// Number of stored files under `uploads/{folder}` in the test media root.
pub fn upload_count(state: &AppState, folder: &str) -> usize {
    let dir = std::path::Path::new(&state.config.media_root)
        .join("uploads")
        .join(folder);
    std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(Result::ok).count())
        .unwrap_or(0)
}

/// Same database, different mailer; does not truncate.
pub fn with_mailer(state: &AppState, mailer: Arc<dyn Mailer>) -> AppState {
    AppState {
        mailer,
        ..state.clone()
    }
}

pub async fn create_user(state: &AppState, email: &str, phone: &str, is_staff: bool) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: NotSet,
        email: Set(email.to_string()),
        first_name: Set("Test".into()),
        last_name: Set("User".into()),
        phone: Set(phone.to_string()),
        iin: Set(None),
        id_card_image: Set(None),
        password_hash: Set(hash_password("password123")?),
        is_staff: Set(is_staff),
        is_superuser: Set(false),
        is_active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        is_staff,
    })
}

pub async fn create_course(
    state: &AppState,
    author: &AuthUser,
    title: &str,
    price: i64,
    category: &str,
) -> anyhow::Result<i64> {
    let course = CourseActive {
        id: NotSet,
        title: Set(title.to_string()),
        description: Set(format!("About {title}")),
        price: Set(Decimal::from(price)),
        category: Set(category.to_string()),
        image: Set("uploads/courses/cover.png".into()),
        author_id: Set(author.user_id),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(course.id)
}
