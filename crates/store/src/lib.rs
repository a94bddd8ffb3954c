pub mod collections;
pub mod lenient;
pub mod store;
pub mod types;

pub use store::{CorruptionPolicy, Document, JsonStore, StoreError};
pub use types::*;

/// Eight hex characters from a fresh v4 UUID.
pub fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
