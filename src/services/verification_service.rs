use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};

use crate::{
    entity::verification_codes::{ActiveModel, Column, Entity as VerificationCodes},
    error::AppResult,
    mailer::OutgoingEmail,
};

pub const CODE_TTL_MINUTES: i64 = 5;

/// Namespace of a one-time code. Codes of different purposes never collide, even for the
/// same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    VerifyEmail,
    ResetPassword,
}

impl CodePurpose {
    pub fn namespace(self) -> &'static str {
        match self {
            CodePurpose::VerifyEmail => "verify_email",
            CodePurpose::ResetPassword => "reset_password",
        }
    }
}

pub fn code_key(purpose: CodePurpose, user_id: i64) -> String {
    format!("{}_{}", purpose.namespace(), user_id)
}

/// Uniform 6-digit numeric code.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub fn code_matches(
    stored: &str,
    expires_at: DateTime<Utc>,
    supplied: &str,
    now: DateTime<Utc>,
) -> bool {
    now < expires_at && stored == supplied.trim()
}

/// Stores a fresh code for `(purpose, user_id)`, replacing any previous one.
pub async fn issue_code<C: ConnectionTrait>(
    db: &C,
    purpose: CodePurpose,
    user_id: i64,
) -> AppResult<String> {
    let code = generate_code();
    let now = Utc::now();
    let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);

    let active = ActiveModel {
        key: Set(code_key(purpose, user_id)),
        user_id: Set(user_id),
        code: Set(code.clone()),
        expires_at: Set(expires_at.into()),
        created_at: Set(now.into()),
    };
    VerificationCodes::insert(active)
        .on_conflict(
            OnConflict::column(Column::Key)
                .update_columns([
                    Column::UserId,
                    Column::Code,
                    Column::ExpiresAt,
                    Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    tracing::debug!(purpose = purpose.namespace(), user_id, "issued verification code");
    Ok(code)
}

pub async fn check_code<C: ConnectionTrait>(
    db: &C,
    purpose: CodePurpose,
    user_id: i64,
    supplied: &str,
) -> AppResult<bool> {
    let stored = VerificationCodes::find_by_id(code_key(purpose, user_id))
        .one(db)
        .await?;
    Ok(stored.is_some_and(|row| {
        code_matches(
            &row.code,
            row.expires_at.with_timezone(&Utc),
            supplied,
            Utc::now(),
        )
    }))
}

pub async fn consume_code<C: ConnectionTrait>(
    db: &C,
    purpose: CodePurpose,
    user_id: i64,
) -> AppResult<()> {
    VerificationCodes::delete_by_id(code_key(purpose, user_id))
        .exec(db)
        .await?;
    Ok(())
}

pub fn code_email(purpose: CodePurpose, to: &str, code: &str) -> OutgoingEmail {
    let (subject, body) = match purpose {
        CodePurpose::VerifyEmail => (
            "User activation code",
            format!("Your activation code: {code}"),
        ),
        CodePurpose::ResetPassword => (
            "Password reset code",
            format!("Your password reset code: {code}"),
        ),
    };
    OutgoingEmail {
        to: to.to_string(),
        subject: subject.to_string(),
        body,
    }
}
