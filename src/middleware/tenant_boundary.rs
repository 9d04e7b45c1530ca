use std::sync::Arc;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::boundary::{InboundRequest, Principal};
use crate::context::TenantContext;
use crate::error::FailureReport;

/// Create a fresh TenantContext for this request, populate it through the
/// tenant boundary and expose it to handlers as `Extension<Arc<TenantContext>>`.
///
/// Handler failures are detected through the `FailureReport` that
/// `BusinessError` attaches to its response; the response itself is
/// returned untouched.
pub async fn tenant_boundary_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let principal = request.extensions().get::<Principal>().cloned();

    let context = Arc::new(TenantContext::new());
    let outcome = state
        .boundary
        .initialize(&context, &InboundRequest::new(&route, principal.as_ref()));
    tracing::debug!(route = %route, outcome = ?outcome, "Tenant boundary evaluated");

    request.extensions_mut().insert(Arc::clone(&context));
    let response = next.run(request).await;

    match response.extensions().get::<FailureReport>() {
        Some(report) => state.boundary.report_failure(&context, &route, &report.message),
        None => state.boundary.report_success(&context, &route),
    }

    response
}
