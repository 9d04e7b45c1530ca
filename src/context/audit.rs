use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Caller-supplied justification for suspending tenant isolation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BypassReason {
    pub action: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_system_operation: Option<bool>,
}

impl BypassReason {
    pub fn new(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            reason: reason.into(),
            is_system_operation: None,
        }
    }

    /// Mark the bypass as performed by the system rather than on behalf of a user
    pub fn system(mut self) -> Self {
        self.is_system_operation = Some(true);
        self
    }
}

/// One bypass scope entry. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub is_system_operation: Option<bool>,
}

impl AuditEntry {
    pub(crate) fn record(
        reason: &BypassReason,
        user_id: Option<String>,
        organization_id: Option<String>,
    ) -> Self {
        Self {
            action: reason.action.clone(),
            reason: reason.reason.clone(),
            timestamp: Utc::now(),
            user_id,
            organization_id,
            is_system_operation: reason.is_system_operation,
        }
    }
}

/// Condensed view of a request's bypass activity, for the completion log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub count: usize,
    pub actions: Vec<String>,
    pub system_operations: usize,
}

impl AuditSummary {
    pub fn from_entries(entries: &[AuditEntry]) -> Self {
        Self {
            count: entries.len(),
            actions: entries.iter().map(|e| e.action.clone()).collect(),
            system_operations: entries
                .iter()
                .filter(|e| e.is_system_operation == Some(true))
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_camel_case() {
        let reason = BypassReason::new("BATCH_CREATE", "batch create Project").system();
        let value = serde_json::to_value(&reason).unwrap();
        assert_eq!(value["action"], "BATCH_CREATE");
        assert_eq!(value["isSystemOperation"], true);
    }

    #[test]
    fn test_summary_counts_system_operations() {
        let user = BypassReason::new("REPORT", "cross-org report");
        let system = BypassReason::new("BATCH_CREATE", "batch").system();
        let entries = vec![
            AuditEntry::record(&user, Some("u1".into()), Some("org-1".into())),
            AuditEntry::record(&system, None, None),
        ];

        let summary = AuditSummary::from_entries(&entries);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.actions, vec!["REPORT", "BATCH_CREATE"]);
        assert_eq!(summary.system_operations, 1);
    }
}
