// Tenant boundary
//
// Runs once per inbound request: decides whether tenant context applies,
// populates it from the authenticated principal and reports the outcome of
// the request (bypass summary on success, structured error on failure).

pub mod failure;
pub mod policy;
pub mod principal;

pub use failure::{normalize_error_message, RequestFailure, UNKNOWN_ERROR};
pub use policy::{ConfiguredSuperAdmins, NoSuperAdmins, PublicRoutes, RouteExemption, SuperAdminPolicy};
pub use principal::{Identity, Principal, PrincipalOrganization};

use std::future::Future;
use std::sync::Arc;

use crate::config::TenancyConfig;
use crate::context::TenantContext;

/// Inbound request as seen by the boundary
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub route: &'a str,
    pub principal: Option<&'a Principal>,
}

impl<'a> InboundRequest<'a> {
    pub fn new(route: &'a str, principal: Option<&'a Principal>) -> Self {
        Self { route, principal }
    }
}

/// Which branch the boundary took for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryOutcome {
    /// Context populated from a valid principal
    Initialized,
    /// Route is public; context left untouched
    Exempt,
    /// No principal on the request
    Anonymous,
    /// Principal lacks a user or organization id; context left uninitialized
    MalformedPrincipal,
}

#[derive(Clone)]
pub struct TenantBoundary {
    exemption: Arc<dyn RouteExemption>,
    super_admin_policy: Arc<dyn SuperAdminPolicy>,
    log_bypass_summary: bool,
}

impl std::fmt::Debug for TenantBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantBoundary")
            .field("log_bypass_summary", &self.log_bypass_summary)
            .finish_non_exhaustive()
    }
}

impl TenantBoundary {
    pub fn new(exemption: impl RouteExemption + 'static) -> Self {
        Self {
            exemption: Arc::new(exemption),
            super_admin_policy: Arc::new(NoSuperAdmins),
            log_bypass_summary: true,
        }
    }

    /// Public routes and super-admins taken from configuration
    pub fn from_config(config: &TenancyConfig) -> Self {
        Self::new(PublicRoutes::new(config.public_routes.iter().cloned()))
            .with_super_admin_policy(ConfiguredSuperAdmins::new(
                config.super_admin_user_ids.iter().cloned(),
            ))
            .with_bypass_summary(config.log_bypass_summary)
    }

    pub fn with_super_admin_policy(mut self, policy: impl SuperAdminPolicy + 'static) -> Self {
        self.super_admin_policy = Arc::new(policy);
        self
    }

    pub fn with_bypass_summary(mut self, enabled: bool) -> Self {
        self.log_bypass_summary = enabled;
        self
    }

    pub fn is_exempt(&self, route: &str) -> bool {
        self.exemption.is_exempt(route)
    }

    /// Populate `context` for this request, if the route and principal allow it
    pub fn initialize(&self, context: &TenantContext, request: &InboundRequest<'_>) -> BoundaryOutcome {
        if self.is_exempt(request.route) {
            return BoundaryOutcome::Exempt;
        }

        let Some(principal) = request.principal else {
            return BoundaryOutcome::Anonymous;
        };

        let Some(identity) = principal.identity() else {
            tracing::warn!(
                route = request.route,
                user_id = principal.id.as_deref().unwrap_or("-"),
                org_id = principal.organization_id().unwrap_or("-"),
                "Principal is missing user or organization id; tenant context not set"
            );
            return BoundaryOutcome::MalformedPrincipal;
        };

        let is_super_admin = self.super_admin_policy.is_super_admin(&identity);
        context.set_context(identity.organization_id, identity.user_id, is_super_admin);
        BoundaryOutcome::Initialized
    }

    /// Emit the bypass summary for a request that completed normally
    pub fn report_success(&self, context: &TenantContext, route: &str) {
        if !self.log_bypass_summary || !context.has_bypass_operations() {
            return;
        }

        let summary = context.audit_summary();
        tracing::warn!(
            route,
            user_id = context.try_user_id().as_deref().unwrap_or("-"),
            org_id = context.try_organization_id().as_deref().unwrap_or("-"),
            count = summary.count,
            system_operations = summary.system_operations,
            actions = ?summary.actions,
            "Request contains bypass operations"
        );
    }

    /// Log a failed request. Never alters or swallows the failure.
    pub fn report_failure(&self, context: &TenantContext, route: &str, failure: &dyn RequestFailure) {
        tracing::error!(
            route,
            user_id = context.try_user_id().as_deref().unwrap_or("-"),
            org_id = context.try_organization_id().as_deref().unwrap_or("-"),
            error = %failure.failure_message(),
            "Request failed"
        );
    }

    /// Initialize `context`, run `handler`, report its outcome and return it unchanged
    pub async fn intercept<F, Fut, T, E>(
        &self,
        context: &TenantContext,
        request: InboundRequest<'_>,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RequestFailure,
    {
        self.initialize(context, &request);

        let result = handler().await;
        match &result {
            Ok(_) => self.report_success(context, request.route),
            Err(err) => self.report_failure(context, request.route, err),
        }
        result
    }
}
