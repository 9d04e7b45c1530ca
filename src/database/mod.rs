pub mod delegate;
pub mod memory;
pub mod repository;

pub use delegate::{DelegateError, PersistenceDelegate, RecordData};
pub use memory::InMemoryDelegate;
pub use repository::{CreateOptions, MutationOptions, TenantAwareRepository};
