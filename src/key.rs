//! Storage key construction.
//!
//! Every collection blob lives under `"{collection}_{user_id}"`. The
//! format is a plain concatenation with no collision-proofing beyond the
//! separator; a user id containing an underscore could in principle
//! collide with another key, which is acceptable because ids are
//! system-generated and never contain one. Preserving this exact layout
//! keeps the store readable by (and from) the legacy browser data.

/// Collection name for customers.
pub const CUSTOMERS: &str = "customers";

/// Collection name for events.
pub const EVENTS: &str = "events";

/// Collection name for event line items.
pub const EVENT_DETAILS: &str = "eventDetails";

/// Collection name for payments.
pub const PAYMENTS: &str = "payments";

/// Build the storage key for a collection scoped to one user.
///
/// # Example
///
/// ```
/// use crm_kit::key::{storage_key, EVENTS};
///
/// assert_eq!(storage_key(EVENTS, "u-42"), "events_u-42");
/// ```
pub fn storage_key(collection: &str, user_id: &str) -> String {
    format!("{}_{}", collection, user_id)
}
