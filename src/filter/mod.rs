pub mod types;
pub mod filter_order;
pub mod tenant;

pub use types::*;
pub use filter_order::FilterOrder;
pub use tenant::{with_org_id, ORG_ID_FIELD, ORGANIZATION_RELATION_FIELD};
