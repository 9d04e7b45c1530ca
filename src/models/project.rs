use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TenantAwareModel;

/// A tenant-scoped record owned by exactly one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TenantAwareModel for Project {
    const MODEL_NAME: &'static str = "Project";

    fn id(&self) -> &str {
        &self.id
    }

    fn org_id(&self) -> Option<&str> {
        Some(&self.org_id)
    }
}
