// Per-request tenant context
//
// One TenantContext is created per inbound request, populated once by the
// tenant boundary and dropped with the request. It is shared by reference
// (usually an Arc) between the boundary, handlers and repositories of that
// single request only.

pub mod audit;
pub mod bypass;

pub use audit::{AuditEntry, AuditSummary, BypassReason};
pub use bypass::BypassGuard;

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{BusinessCode, BusinessError};

#[derive(Debug, Default)]
struct ContextState {
    organization_id: Option<String>,
    user_id: Option<String>,
    is_super_admin: bool,
    bypass_enabled: bool,
    audit_log: Vec<AuditEntry>,
}

/// Tenant identity of the current request plus the isolation-bypass switch.
///
/// The mutex only makes the context `Sync` so it can live in request
/// extensions; a context is never touched by two requests.
#[derive(Debug, Default)]
pub struct TenantContext {
    state: Mutex<ContextState>,
}

impl TenantContext {
    /// Create an empty, uninitialized context
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set organization, user and super-admin flag. Overwrites unconditionally.
    pub fn set_context(
        &self,
        organization_id: impl Into<String>,
        user_id: impl Into<String>,
        is_super_admin: bool,
    ) {
        let organization_id = organization_id.into();
        let user_id = user_id.into();

        tracing::debug!(
            org_id = %organization_id,
            user_id = %user_id,
            is_super_admin,
            "Tenant context set"
        );

        let mut state = self.state();
        state.organization_id = Some(organization_id);
        state.user_id = Some(user_id);
        state.is_super_admin = is_super_admin;
    }

    /// Current organization id; fails with UNAUTHORIZED when the context was never set
    pub fn organization_id(&self) -> Result<String, BusinessError> {
        self.try_organization_id().ok_or_else(|| {
            BusinessError::unauthorized("Organization context is missing for this request")
        })
    }

    /// Current user id; fails with UNAUTHORIZED when the context was never set
    pub fn user_id(&self) -> Result<String, BusinessError> {
        self.try_user_id()
            .ok_or_else(|| BusinessError::unauthorized("User context is missing for this request"))
    }

    pub fn try_organization_id(&self) -> Option<String> {
        self.state().organization_id.clone()
    }

    pub fn try_user_id(&self) -> Option<String> {
        self.state().user_id.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().organization_id.is_some()
    }

    pub fn is_super_admin_user(&self) -> bool {
        self.state().is_super_admin
    }

    pub fn is_bypass_enabled(&self) -> bool {
        self.state().bypass_enabled
    }

    /// Suspend tenant isolation until the returned guard is dropped.
    ///
    /// Records one audit entry before returning. The guard restores the flag
    /// to the value it had on entry, so nested scopes unwind correctly.
    pub fn enter_bypass(&self, reason: BypassReason) -> BypassGuard<'_> {
        let mut state = self.state();
        let previous = state.bypass_enabled;
        state.bypass_enabled = true;

        let entry = AuditEntry::record(
            &reason,
            state.user_id.clone(),
            state.organization_id.clone(),
        );

        tracing::warn!(
            action = %entry.action,
            reason = %entry.reason,
            user_id = entry.user_id.as_deref().unwrap_or("-"),
            org_id = entry.organization_id.as_deref().unwrap_or("-"),
            system = entry.is_system_operation.unwrap_or(false),
            "Tenant isolation bypassed"
        );

        state.audit_log.push(entry);
        drop(state);

        BypassGuard::new(self, previous)
    }

    pub(crate) fn restore_bypass(&self, previous: bool) {
        self.state().bypass_enabled = previous;
    }

    /// Run an async body with tenant isolation suspended.
    ///
    /// The flag stays set across every await inside `body` and is restored
    /// when the body finishes, returns an error, panics or is cancelled.
    pub async fn run_without_isolation<F, Fut, T>(&self, reason: BypassReason, body: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.enter_bypass(reason);
        body().await
    }

    /// Synchronous variant of [`TenantContext::run_without_isolation`]
    pub fn run_without_isolation_sync<F, T>(&self, reason: BypassReason, body: F) -> T
    where
        F: FnOnce() -> T,
    {
        let _guard = self.enter_bypass(reason);
        body()
    }

    /// Check that a fetched resource belongs to the caller's organization.
    ///
    /// Passes for super-admins and inside bypass scopes. A missing resource
    /// org id is treated as a mismatch. Fails with INSUFFICIENT_PERMISSIONS.
    pub fn verify_resource_ownership(
        &self,
        resource_org_id: Option<&str>,
        resource_type: &str,
    ) -> Result<(), BusinessError> {
        self.check_ownership(resource_org_id, resource_type, BusinessCode::InsufficientPermissions)
    }

    pub(crate) fn check_ownership(
        &self,
        resource_org_id: Option<&str>,
        resource_type: &str,
        code: BusinessCode,
    ) -> Result<(), BusinessError> {
        if self.is_super_admin_user() || self.is_bypass_enabled() {
            return Ok(());
        }

        let organization_id = self.organization_id()?;
        match resource_org_id {
            Some(owner) if owner == organization_id => Ok(()),
            owner => {
                tracing::warn!(
                    resource_type,
                    resource_org_id = owner.unwrap_or("-"),
                    org_id = %organization_id,
                    "Cross-tenant access denied"
                );
                Err(BusinessError::new(
                    code,
                    format!("No permission to access this {}", resource_type),
                ))
            }
        }
    }

    /// Copy of the audit log; changes to the returned vector are not reflected here
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.state().audit_log.clone()
    }

    pub fn has_bypass_operations(&self) -> bool {
        !self.state().audit_log.is_empty()
    }

    pub fn audit_summary(&self) -> AuditSummary {
        AuditSummary::from_entries(&self.state().audit_log)
    }

    /// Clear every field back to the uninitialized state
    pub fn reset(&self) {
        *self.state() = ContextState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(action: &str) -> BypassReason {
        BypassReason::new(action, format!("{} for test", action))
    }

    #[test]
    fn test_reads_fail_until_set() {
        let ctx = TenantContext::new();
        assert_eq!(ctx.organization_id().unwrap_err().code, BusinessCode::Unauthorized);
        assert_eq!(ctx.user_id().unwrap_err().code, BusinessCode::Unauthorized);
        assert_eq!(ctx.try_organization_id(), None);
        assert_eq!(ctx.try_user_id(), None);

        ctx.set_context("org-123", "user-1", false);
        assert_eq!(ctx.organization_id().unwrap(), "org-123");
        assert_eq!(ctx.user_id().unwrap(), "user-1");
        assert!(!ctx.is_super_admin_user());
    }

    #[test]
    fn test_set_context_overwrites() {
        let ctx = TenantContext::new();
        ctx.set_context("org-1", "user-1", true);
        ctx.set_context("org-2", "user-2", false);
        assert_eq!(ctx.try_organization_id().as_deref(), Some("org-2"));
        assert_eq!(ctx.try_user_id().as_deref(), Some("user-2"));
        assert!(!ctx.is_super_admin_user());
    }

    #[test]
    fn test_sync_bypass_restores_flag() {
        let ctx = TenantContext::new();
        let seen = ctx.run_without_isolation_sync(reason("READ"), || ctx.is_bypass_enabled());
        assert!(seen);
        assert!(!ctx.is_bypass_enabled());
    }

    #[test]
    fn test_sync_bypass_restores_after_error() {
        let ctx = TenantContext::new();
        let result: Result<(), BusinessError> = ctx.run_without_isolation_sync(reason("FAIL"), || {
            Err(BusinessError::forbidden("nope"))
        });
        assert!(result.is_err());
        assert!(!ctx.is_bypass_enabled());
        assert_eq!(ctx.audit_log().len(), 1);
    }

    #[test]
    fn test_sync_bypass_restores_after_panic() {
        let ctx = TenantContext::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.run_without_isolation_sync(reason("PANIC"), || panic!("boom"))
        }));
        assert!(outcome.is_err());
        assert!(!ctx.is_bypass_enabled());
    }

    #[test]
    fn test_nested_scopes_restore_saved_value() {
        let ctx = TenantContext::new();
        ctx.run_without_isolation_sync(reason("OUTER"), || {
            let inner = ctx.run_without_isolation_sync(reason("INNER"), || ctx.is_bypass_enabled());
            assert!(inner);
            assert!(ctx.is_bypass_enabled());
        });
        assert!(!ctx.is_bypass_enabled());

        let actions: Vec<String> = ctx.audit_log().into_iter().map(|e| e.action).collect();
        assert_eq!(actions, vec!["OUTER", "INNER"]);
    }

    #[tokio::test]
    async fn test_async_bypass_spans_await_points() {
        let ctx = TenantContext::new();
        ctx.set_context("org-1", "user-1", false);

        let seen = ctx
            .run_without_isolation(reason("ASYNC"), || async {
                tokio::task::yield_now().await;
                ctx.is_bypass_enabled()
            })
            .await;

        assert!(seen);
        assert!(!ctx.is_bypass_enabled());
        let entry = &ctx.audit_log()[0];
        assert_eq!(entry.user_id.as_deref(), Some("user-1"));
        assert_eq!(entry.organization_id.as_deref(), Some("org-1"));
    }

    #[tokio::test]
    async fn test_cancelled_bypass_future_restores_flag() {
        let ctx = TenantContext::new();
        {
            let pending = ctx.run_without_isolation(reason("CANCELLED"), || async {
                std::future::pending::<()>().await
            });
            let timed_out =
                tokio::time::timeout(std::time::Duration::from_millis(10), pending).await;
            assert!(timed_out.is_err());
        }
        assert!(!ctx.is_bypass_enabled());
        assert_eq!(ctx.audit_log().len(), 1);
    }

    #[test]
    fn test_verify_resource_ownership() {
        let ctx = TenantContext::new();
        ctx.set_context("org-123", "user-1", false);
        assert!(ctx.verify_resource_ownership(Some("org-123"), "Project").is_ok());

        let err = ctx.verify_resource_ownership(Some("org-456"), "Project").unwrap_err();
        assert_eq!(err.code, BusinessCode::InsufficientPermissions);

        let err = ctx.verify_resource_ownership(None, "Project").unwrap_err();
        assert_eq!(err.code, BusinessCode::InsufficientPermissions);

        ctx.run_without_isolation_sync(reason("ADMIN"), || {
            assert!(ctx.verify_resource_ownership(Some("org-456"), "Project").is_ok());
            assert!(ctx.verify_resource_ownership(None, "Project").is_ok());
        });
    }

    #[test]
    fn test_super_admin_passes_ownership_checks() {
        let ctx = TenantContext::new();
        ctx.set_context("org-123", "root", true);
        assert!(ctx.verify_resource_ownership(Some("org-999"), "Project").is_ok());
    }

    #[test]
    fn test_ownership_check_requires_context() {
        let ctx = TenantContext::new();
        let err = ctx.verify_resource_ownership(Some("org-1"), "Project").unwrap_err();
        assert_eq!(err.code, BusinessCode::Unauthorized);
    }

    #[test]
    fn test_audit_log_is_a_copy() {
        let ctx = TenantContext::new();
        ctx.run_without_isolation_sync(reason("ONE"), || ());
        let mut copy = ctx.audit_log();
        copy.clear();
        assert_eq!(ctx.audit_log().len(), 1);
        assert!(ctx.has_bypass_operations());
    }

    #[test]
    fn test_reset_clears_everything() {
        let ctx = TenantContext::new();
        ctx.set_context("org-1", "user-1", true);
        let guard = ctx.enter_bypass(reason("LEAK"));
        std::mem::forget(guard);
        assert!(ctx.is_bypass_enabled());

        ctx.reset();
        assert!(!ctx.is_initialized());
        assert!(!ctx.is_bypass_enabled());
        assert!(!ctx.is_super_admin_user());
        assert!(ctx.audit_log().is_empty());
    }
}
