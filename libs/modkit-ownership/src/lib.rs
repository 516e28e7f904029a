//! Ownership-based access control for admin record editing.
//!
//! Regular subjects see and edit only the records they own; privileged
//! subjects see everything and choose owners. See [`guard::OwnershipGuard`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod error;
pub mod guard;
pub mod memory;
pub mod record;
pub mod redirect;
pub mod store;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use config::{OwnershipConfig, RecordTypeConfig};
pub use error::{OwnershipError, RegistryError, StoreError};
pub use guard::{FormFields, Guarded, OwnerAssignment, OwnershipGuard};
pub use memory::InMemoryStore;
pub use record::{OwnedRecord, RecordType, RecordTypeRegistry, RegisteredType};
pub use redirect::Redirect;
pub use store::{HistoryAction, HistoryEntry, RecordQuery, RecordStore};
