use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// `dev` and `test` log outgoing mail instead of talking to SMTP.
    pub app_env: String,
    pub smtp_host: String,
    pub smtp_user: String,
    pub smtp_password: String,
    pub email_from: String,
    pub media_root: String,
    pub public_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let access_token_ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);
        let refresh_token_ttl_days = env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1);
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let smtp_user = env::var("SMTP_USER").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let email_from = env::var("EMAIL_FROM").unwrap_or_else(|_| smtp_user.clone());
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            app_env,
            smtp_host,
            smtp_user,
            smtp_password,
            email_from,
            media_root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn is_dev(&self) -> bool {
        self.app_env == "dev" || self.app_env == "test"
    }

    /// Absolute URL for a path stored relative to the media root.
    pub fn media_url(&self, path: &str) -> String {
        format!("{}/media/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}
