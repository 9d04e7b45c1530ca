use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TenantAwareModel;

/// Platform-wide configuration entry, shared by every organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub id: String,
    pub key: String,
    pub value: Value,
}

impl TenantAwareModel for SystemSetting {
    const MODEL_NAME: &'static str = "SystemSetting";
    const HAS_TENANT_FIELD: bool = false;

    fn id(&self) -> &str {
        &self.id
    }

    fn org_id(&self) -> Option<&str> {
        None
    }
}
