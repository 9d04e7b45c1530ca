use serde_json::Value;

use super::types::Filter;

/// Name of the owning-organization field on every tenant-scoped record
pub const ORG_ID_FIELD: &str = "orgId";

/// Relation key whose presence in a create payload suppresses orgId injection
pub const ORGANIZATION_RELATION_FIELD: &str = "organization";

/// Merge the tenant predicate into a caller filter. The injected value
/// always replaces any caller-supplied `orgId`.
pub fn with_org_id(mut filter: Filter, organization_id: &str) -> Filter {
    filter.insert(ORG_ID_FIELD.to_string(), Value::String(organization_id.to_string()));
    filter
}

/// Caller-supplied `orgId` that disagrees with the current organization
pub fn conflicting_org_id<'a>(filter: &'a Filter, organization_id: &str) -> Option<&'a Value> {
    filter
        .get(ORG_ID_FIELD)
        .filter(|value| value.as_str() != Some(organization_id))
}
