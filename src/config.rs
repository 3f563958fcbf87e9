use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    /// Public base URL used to build verification links.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvatarConfig {
    /// Root of publicly served files.
    pub public_dir: String,
    /// Directory under `public_dir` where avatars land; also the URL prefix.
    pub avatar_dir: String,
    /// Staging directory for in-flight uploads.
    pub tmp_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mailer: MailerConfig,
    pub avatars: AvatarConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: std::env::var("JWT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24),
        };
        let mailer = MailerConfig {
            host: std::env::var("MAILER_HOST").unwrap_or_else(|_| "smtp.ukr.net".into()),
            port: std::env::var("MAILER_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(465),
            user: std::env::var("MAILER_USER")?,
            pass: std::env::var("MAILER_PASS")?,
            base_url: std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into()),
        };
        let avatars = AvatarConfig {
            public_dir: std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".into()),
            avatar_dir: std::env::var("AVATAR_DIR").unwrap_or_else(|_| "avatars".into()),
            tmp_dir: std::env::var("TMP_DIR").unwrap_or_else(|_| "tmp".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            mailer,
            avatars,
        })
    }
}
