#![allow(dead_code)]

use std::sync::{Arc, Once};

use serde_json::{json, Value};

use saas_tenancy::database::{InMemoryDelegate, RecordData, TenantAwareRepository};
use saas_tenancy::models::Project;
use saas_tenancy::TenantContext;

static INIT: Once = Once::new();

/// Route tracing output through the test writer when RUST_LOG is set
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn context_for(org: &str, user: &str) -> Arc<TenantContext> {
    let context = Arc::new(TenantContext::new());
    context.set_context(org, user, false);
    context
}

pub fn record(value: Value) -> RecordData {
    value.as_object().cloned().unwrap_or_default()
}

/// One project, `r1`, owned by `org-A`
pub fn seeded_projects() -> InMemoryDelegate<Project> {
    InMemoryDelegate::with_records(vec![json!({ "id": "r1", "orgId": "org-A", "name": "roadmap" })])
        .expect("seed projects")
}

pub fn project_repository(
    context: Arc<TenantContext>,
    delegate: &InMemoryDelegate<Project>,
) -> TenantAwareRepository<Project, InMemoryDelegate<Project>> {
    TenantAwareRepository::new(context, delegate.clone())
}

pub mod http {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use saas_tenancy::app::{app, AppState};
    use saas_tenancy::auth::{generate_jwt, Claims};
    use saas_tenancy::config::AppConfig;

    pub const SUPER_ADMIN: &str = "root";

    pub struct TestApp {
        pub state: Arc<AppState>,
        router: Router,
    }

    impl TestApp {
        pub fn new() -> Self {
            let mut config = AppConfig::development();
            config.tenancy.super_admin_user_ids = vec![SUPER_ADMIN.to_string()];
            let state = Arc::new(AppState::new(&config));
            Self {
                router: app(Arc::clone(&state)),
                state,
            }
        }

        pub fn token(&self, user: &str, org: &str) -> String {
            let claims = Claims::new(user, Some(org.to_string()), chrono::Duration::hours(1));
            generate_jwt(&claims, &self.state.jwt_secret).expect("mint token")
        }

        pub async fn send(
            &self,
            method: &str,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> anyhow::Result<(StatusCode, Value)> {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header("authorization", format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body)?))?,
                None => builder.body(Body::empty())?,
            };

            let response = self.router.clone().oneshot(request).await?;
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await?;
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)?
            };
            Ok((status, json))
        }
    }
}
