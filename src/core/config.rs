use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub email: Option<EmailConfig>,
    pub intake: IntakeConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub site_name: String,
    pub site_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Admin authentication settings.
///
/// Tokens are RS256 JWTs checked against a JWKS endpoint. With Firebase
/// Authentication the issuer is `https://securetoken.google.com/<project>`
/// and the audience is the project id.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
    /// Emails that are treated as admins even without an `admin` claim
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// S3-compatible storage configuration for intake attachments and CMS images
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL for publicly accessible files (defaults to endpoint)
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Prefix for public files (CMS images)
    pub public_prefix: String,
    /// Prefix for private files (intake attachments)
    pub private_prefix: String,
    /// Signed URL expiry time in seconds
    pub signed_url_expiry_secs: u32,
}

/// Transactional email (Resend) configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub api_base: String,
    /// Sender, e.g. `"Example <info@example.jp>"`
    pub from: String,
    /// Admin inbox that receives contact and intake notifications
    pub to: Vec<String>,
    /// Optional directory with `.jinja` files overriding the built-in templates
    pub template_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub retention_days: i64,
    pub max_files: usize,
    pub max_file_size: usize,
    pub max_total_size: usize,
    /// Attachments up to this size are inlined into the admin email
    pub inline_attachment_max: usize,
    /// Inlined attachments stop once their total reaches this size
    pub inline_total_max: usize,
    pub admin_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            email: EmailConfig::from_env(),
            intake: IntakeConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = parse_list(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let site_name = env::var("SITE_NAME").unwrap_or_else(|_| "ビジネスサポート".to_string());
        let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            site_name,
            site_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_or("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_or("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;
    const DEFAULT_JWKS_URL: &'static str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?;

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let jwks_url =
            env::var("AUTH_JWKS_URL").unwrap_or_else(|_| Self::DEFAULT_JWKS_URL.to_string());

        let jwks_cache_ttl_secs: u64 =
            parse_or("AUTH_JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs: u64 = parse_or("AUTH_JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        let admin_emails = parse_list(&env::var("ADMIN_EMAILS").unwrap_or_default())
            .into_iter()
            .map(|e| e.to_lowercase())
            .collect();

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
            admin_emails,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Bizsite API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Contact, intake and content API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    const DEFAULT_SIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("STORAGE_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let public_endpoint =
            env::var("STORAGE_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        Ok(Self {
            public_endpoint,
            access_key: env::var("STORAGE_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("STORAGE_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "bizsite-uploads".to_string()),
            region: env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            public_prefix: env::var("STORAGE_PUBLIC_PREFIX")
                .unwrap_or_else(|_| "public".to_string()),
            private_prefix: env::var("STORAGE_PRIVATE_PREFIX")
                .unwrap_or_else(|_| "private".to_string()),
            signed_url_expiry_secs: parse_or(
                "STORAGE_SIGNED_URL_EXPIRY_SECS",
                Self::DEFAULT_SIGNED_URL_EXPIRY_SECS,
            )?,
            endpoint,
        })
    }
}

impl EmailConfig {
    const DEFAULT_API_BASE: &'static str = "https://api.resend.com";

    /// Returns `None` when any of the required Resend variables is missing.
    pub fn from_env() -> Option<Self> {
        let api_key = non_empty_var("RESEND_API_KEY")?;
        let from = non_empty_var("RESEND_FROM")?;
        let to = parse_list(&non_empty_var("RESEND_TO")?);
        if to.is_empty() {
            return None;
        }

        Some(Self {
            api_key,
            from,
            to,
            api_base: env::var("RESEND_API_BASE")
                .unwrap_or_else(|_| Self::DEFAULT_API_BASE.to_string()),
            template_dir: non_empty_var("EMAIL_TEMPLATE_DIR"),
        })
    }
}

impl IntakeConfig {
    pub const DEFAULT_RETENTION_DAYS: i64 = 180;
    pub const DEFAULT_MAX_FILES: usize = 10;
    pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10MB
    pub const DEFAULT_MAX_TOTAL_SIZE: usize = 25 * 1024 * 1024; // 25MB
    pub const DEFAULT_INLINE_ATTACHMENT_MAX: usize = 2 * 1024 * 1024;
    pub const DEFAULT_INLINE_TOTAL_MAX: usize = 5 * 1024 * 1024;
    const DEFAULT_ADMIN_CACHE_TTL_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let admin_cache_ttl_secs: u64 =
            parse_or("ADMIN_CACHE_TTL_SECS", Self::DEFAULT_ADMIN_CACHE_TTL_SECS)?;

        Ok(Self {
            retention_days: parse_or("INTAKE_RETENTION_DAYS", Self::DEFAULT_RETENTION_DAYS)?,
            max_files: parse_or("INTAKE_MAX_FILES", Self::DEFAULT_MAX_FILES)?,
            max_file_size: parse_or("INTAKE_MAX_FILE_SIZE", Self::DEFAULT_MAX_FILE_SIZE)?,
            max_total_size: parse_or("INTAKE_MAX_TOTAL_SIZE", Self::DEFAULT_MAX_TOTAL_SIZE)?,
            inline_attachment_max: parse_or(
                "INTAKE_INLINE_ATTACHMENT_MAX",
                Self::DEFAULT_INLINE_ATTACHMENT_MAX,
            )?,
            inline_total_max: parse_or("INTAKE_INLINE_TOTAL_MAX", Self::DEFAULT_INLINE_TOTAL_MAX)?,
            admin_cache_ttl: Duration::from_secs(admin_cache_ttl_secs),
        })
    }

    /// Upper bound for an intake request body, including multipart overhead
    pub fn body_limit(&self) -> usize {
        self.max_total_size + 1024 * 1024
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            retention_days: Self::DEFAULT_RETENTION_DAYS,
            max_files: Self::DEFAULT_MAX_FILES,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            max_total_size: Self::DEFAULT_MAX_TOTAL_SIZE,
            inline_attachment_max: Self::DEFAULT_INLINE_ATTACHMENT_MAX,
            inline_total_max: Self::DEFAULT_INLINE_TOTAL_MAX,
            admin_cache_ttl: Duration::from_secs(Self::DEFAULT_ADMIN_CACHE_TTL_SECS),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

/// Split a comma-separated variable into trimmed, non-empty entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(
            parse_list(" a@example.jp, ,b@example.jp,"),
            vec!["a@example.jp".to_string(), "b@example.jp".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_intake_defaults() {
        let config = IntakeConfig::default();
        assert_eq!(config.max_files, 10);
        assert_eq!(config.retention_days, 180);
        assert!(config.body_limit() > config.max_total_size);
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }
}
