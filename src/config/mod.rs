use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub tenancy: TenancyConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    /// `APP_ENV` value; anything unrecognised is development
    pub fn from_name(name: &str) -> Self {
        match name {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Tenant isolation switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenancyConfig {
    /// Stamp the caller's orgId onto created records
    pub auto_inject_org_id: bool,
    /// Fail with FORBIDDEN instead of overwriting a caller-supplied foreign orgId
    pub reject_caller_org_id: bool,
    pub super_admin_user_ids: Vec<String>,
    /// Exact paths, or prefixes ending in `/*`
    pub public_routes: Vec<String>,
    pub log_bypass_summary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn override_flag(name: &str, target: &mut bool) {
    if let Ok(v) = env::var(name) {
        *target = v.parse().unwrap_or(*target);
    }
}

fn override_list(name: &str, target: &mut Vec<String>) {
    if let Ok(v) = env::var(name) {
        *target = split_list(&v);
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .map(|name| Environment::from_name(&name))
            .unwrap_or(Environment::Development);

        Self::for_environment(environment).with_env_overrides()
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        override_flag("TENANCY_AUTO_INJECT_ORG_ID", &mut self.tenancy.auto_inject_org_id);
        override_flag("TENANCY_REJECT_CALLER_ORG_ID", &mut self.tenancy.reject_caller_org_id);
        override_list("TENANCY_SUPER_ADMIN_USER_IDS", &mut self.tenancy.super_admin_user_ids);
        override_list("TENANCY_PUBLIC_ROUTES", &mut self.tenancy.public_routes);
        override_flag("TENANCY_LOG_BYPASS_SUMMARY", &mut self.tenancy.log_bypass_summary);

        if let Ok(v) = env::var("API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        override_flag("API_ENABLE_REQUEST_LOGGING", &mut self.api.enable_request_logging);

        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        override_flag("SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        override_list("SECURITY_CORS_ORIGINS", &mut self.security.cors_origins);

        self
    }

    /// Strict preset shared by staging and production. No JWT secret: it must
    /// come from SECURITY_JWT_SECRET.
    fn hardened(environment: Environment, origin: &str) -> Self {
        Self {
            environment,
            tenancy: TenancyConfig {
                auto_inject_org_id: true,
                reject_caller_org_id: true,
                super_admin_user_ids: Vec::new(),
                public_routes: vec!["/".into(), "/health".into()],
                log_bypass_summary: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec![origin.to_string()],
            },
        }
    }

    pub fn development() -> Self {
        let mut config = Self::hardened(Environment::Development, "http://localhost:3000");
        config.tenancy.reject_caller_org_id = false;
        config.security.jwt_secret = "development-secret".to_string();
        config.security.cors_origins.push("http://localhost:5173".to_string());
        config
    }

    pub fn staging() -> Self {
        Self::hardened(Environment::Staging, "https://staging.example.com")
    }

    pub fn production() -> Self {
        let mut config = Self::hardened(Environment::Production, "https://app.example.com");
        config.api.enable_request_logging = false;
        config
    }
}

// Read once, on first access
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        $crate::config::CONFIG.environment == $crate::config::Environment::Production
    };
}
