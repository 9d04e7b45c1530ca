mod common;

use anyhow::Result;
use saas_tenancy::boundary::{ConfiguredSuperAdmins, PrincipalOrganization, PublicRoutes};
use saas_tenancy::{
    BoundaryOutcome, BusinessCode, BusinessError, BypassReason, InboundRequest, Principal,
    TenantBoundary, TenantContext,
};

fn boundary() -> TenantBoundary {
    TenantBoundary::new(PublicRoutes::new(["/", "/health", "/docs/*"]))
}

#[test]
fn valid_principal_on_protected_route_sets_organization() {
    common::init_test_logging();

    for (user, org) in [("u1", "org-1"), ("u2", "org-2"), ("u3", "org-A")] {
        let ctx = TenantContext::new();
        let principal = Principal::new(user, org);
        let outcome = boundary().initialize(&ctx, &InboundRequest::new("/api/projects", Some(&principal)));

        assert_eq!(outcome, BoundaryOutcome::Initialized);
        assert_eq!(ctx.organization_id().unwrap(), org);
        assert_eq!(ctx.user_id().unwrap(), user);
    }
}

#[test]
fn anonymous_or_exempt_requests_leave_context_empty() {
    let principal = Principal::new("u1", "org-1");
    let cases = [
        ("/api/projects", None, BoundaryOutcome::Anonymous),
        ("/health", Some(&principal), BoundaryOutcome::Exempt),
        ("/docs/intro", Some(&principal), BoundaryOutcome::Exempt),
        ("/", None, BoundaryOutcome::Exempt),
    ];

    for (route, principal, expected) in cases {
        let ctx = TenantContext::new();
        let outcome = boundary().initialize(&ctx, &InboundRequest::new(route, principal));
        assert_eq!(outcome, expected, "route {}", route);
        assert_eq!(ctx.try_organization_id(), None);
        assert_eq!(ctx.organization_id().unwrap_err().code, BusinessCode::Unauthorized);
    }
}

#[test]
fn partial_principals_fail_open_to_uninitialized() {
    let partials = [
        Principal { id: None, organization: Some(PrincipalOrganization { id: Some("org-1".into()) }) },
        Principal { id: Some("u1".into()), organization: None },
        Principal { id: Some("u1".into()), organization: Some(PrincipalOrganization { id: None }) },
    ];

    for principal in &partials {
        let ctx = TenantContext::new();
        let outcome = boundary().initialize(&ctx, &InboundRequest::new("/api/projects", Some(principal)));
        assert_eq!(outcome, BoundaryOutcome::MalformedPrincipal);
        assert!(!ctx.is_initialized());
    }
}

#[test]
fn closure_exemption_and_super_admin_policy() {
    let boundary = TenantBoundary::new(|route: &str| route == "/status")
        .with_super_admin_policy(ConfiguredSuperAdmins::new(["root"]));

    let ctx = TenantContext::new();
    let root = Principal::new("root", "org-ops");
    assert_eq!(
        boundary.initialize(&ctx, &InboundRequest::new("/api/projects", Some(&root))),
        BoundaryOutcome::Initialized
    );
    assert!(ctx.is_super_admin_user());
    assert!(ctx.verify_resource_ownership(Some("org-other"), "Project").is_ok());

    let ctx = TenantContext::new();
    assert_eq!(
        boundary.initialize(&ctx, &InboundRequest::new("/status", Some(&root))),
        BoundaryOutcome::Exempt
    );
}

#[tokio::test]
async fn intercept_reraises_and_keeps_audit_trail() -> Result<()> {
    let ctx = TenantContext::new();
    let principal = Principal::new("u1", "org-1");

    let result: Result<(), BusinessError> = boundary()
        .intercept(&ctx, InboundRequest::new("/api/reports", Some(&principal)), || async {
            ctx.run_without_isolation(BypassReason::new("REPORT", "quarterly"), || async {
                Err(BusinessError::forbidden("report export disabled"))
            })
            .await
        })
        .await;

    assert_eq!(result, Err(BusinessError::forbidden("report export disabled")));
    assert_eq!(ctx.audit_log().len(), 1);
    assert!(!ctx.is_bypass_enabled());
    Ok(())
}

#[tokio::test]
async fn intercept_accepts_json_failures() {
    let ctx = TenantContext::new();
    let result: Result<(), serde_json::Value> = boundary()
        .intercept(&ctx, InboundRequest::new("/api/x", None), || async {
            Err(serde_json::json!({ "message": "upstream rejected" }))
        })
        .await;
    assert!(result.is_err());
}
