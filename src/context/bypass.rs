use super::TenantContext;

/// Scope guard for an isolation bypass.
///
/// Dropping the guard puts the bypass flag back to the value saved when the
/// scope was entered, never to a hard-coded `false`.
#[must_use = "isolation is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct BypassGuard<'a> {
    context: &'a TenantContext,
    previous: bool,
}

impl<'a> BypassGuard<'a> {
    pub(super) fn new(context: &'a TenantContext, previous: bool) -> Self {
        Self { context, previous }
    }

    /// Bypass state that will be restored on drop
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Drop for BypassGuard<'_> {
    fn drop(&mut self) {
        self.context.restore_bypass(self.previous);
    }
}
