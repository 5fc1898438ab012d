// Record trait for items persisted as a whole list under one key

use serde::{Deserialize, Serialize};

/// Core trait that any persisted list item must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Timestamp when this record was created (milliseconds since epoch)
    fn created_at(&self) -> i64;

    /// Storage key the whole list of this record type lives under.
    /// Carries a schema version suffix so a future layout gets a fresh key.
    fn storage_key() -> &'static str
    where
        Self: Sized;

    /// Whether a decoded record satisfies the type's invariants.
    /// Records failing this check are dropped on load.
    fn is_valid(&self) -> bool {
        !self.id().trim().is_empty()
    }
}
