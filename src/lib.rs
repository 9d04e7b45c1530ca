pub mod app;
pub mod auth;
pub mod boundary;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod models;

pub use boundary::{BoundaryOutcome, InboundRequest, Principal, TenantBoundary};
pub use context::{AuditEntry, BypassReason, TenantContext};
pub use database::{PersistenceDelegate, TenantAwareRepository};
pub use error::{BusinessCode, BusinessError};
