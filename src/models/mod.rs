pub mod project;
pub mod system_setting;

pub use project::Project;
pub use system_setting::SystemSetting;

/// Contract for records served through a tenant-aware repository.
///
/// Everything beyond the id and owning organization belongs to the
/// persistence delegate.
pub trait TenantAwareModel: Send + Sync + 'static {
    /// Name used in log events and error messages
    const MODEL_NAME: &'static str;

    /// `false` for intentionally global models (system configuration and
    /// the like): no filter injection, no orgId injection, no ownership checks
    const HAS_TENANT_FIELD: bool = true;

    fn id(&self) -> &str;

    /// Owning organization; `None` for global records
    fn org_id(&self) -> Option<&str>;
}
