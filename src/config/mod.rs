use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub tenancy: TenancyConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub redemption: RedemptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Production base domain; tenant slugs are the extra leading label.
    pub base_domain: String,
    /// Hosts (besides loopback) where header/query overrides are honoured.
    pub dev_hosts: Vec<String>,
    pub override_header: String,
    pub override_query_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Postgres role assumed for non-elevated sessions so RLS policies apply.
    pub rls_role: String,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionConfig {
    pub max_issue_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Tenancy overrides
        if let Ok(v) = env::var("TENANCY_BASE_DOMAIN") {
            self.tenancy.base_domain = v.trim().to_ascii_lowercase();
        }
        if let Ok(v) = env::var("TENANCY_DEV_HOSTS") {
            self.tenancy.dev_hosts = split_list(&v);
        }
        if let Ok(v) = env::var("TENANCY_OVERRIDE_HEADER") {
            self.tenancy.override_header = v.trim().to_ascii_lowercase();
        }
        if let Ok(v) = env::var("TENANCY_OVERRIDE_QUERY_PARAM") {
            self.tenancy.override_query_param = v.trim().to_string();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RLS_ROLE") {
            self.database.rls_role = v;
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Redemption overrides
        if let Ok(v) = env::var("REDEMPTION_MAX_ISSUE_ATTEMPTS") {
            self.redemption.max_issue_attempts = v.parse().unwrap_or(self.redemption.max_issue_attempts);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            tenancy: TenancyConfig {
                base_domain: "hunt.example.com".to_string(),
                dev_hosts: vec![],
                override_header: "x-tenant-slug".to_string(),
                override_query_param: "tenant".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                rls_role: "hunt_app".to_string(),
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 60,
                max_page_size: 500,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            redemption: RedemptionConfig {
                max_issue_attempts: 5,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            tenancy: TenancyConfig {
                base_domain: "hunt-staging.example.com".to_string(),
                dev_hosts: vec![],
                override_header: "x-tenant-slug".to_string(),
                override_query_param: "tenant".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                rls_role: "hunt_app".to_string(),
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 30,
                rate_limit_window_secs: 60,
                max_page_size: 200,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://hunt-staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            redemption: RedemptionConfig {
                max_issue_attempts: 5,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            tenancy: TenancyConfig {
                base_domain: "hunt.example.com".to_string(),
                dev_hosts: vec![],
                override_header: "x-tenant-slug".to_string(),
                override_query_param: "tenant".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                rls_role: "hunt_app".to_string(),
                enable_query_logging: false,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 10,
                rate_limit_window_secs: 60,
                max_page_size: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://hunt.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            redemption: RedemptionConfig {
                max_issue_attempts: 5,
            },
        }
    }
}

impl TenancyConfig {
    /// Number of dot-separated labels in the bare production domain.
    pub fn base_domain_labels(&self) -> usize {
        self.base_domain.split('.').filter(|label| !label.is_empty()).count()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

// Helper macros for common checks
#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
