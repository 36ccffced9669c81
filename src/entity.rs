//! Core entity trait that all stored record types must implement.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for record types persisted through a
/// [`Repository`](crate::repository::Repository).
///
/// An entity owns its identity and timestamps; the repository injects
/// them at creation time and refreshes `updated_at` on every mutation.
/// Callers never hand a repository a fully-built entity: they supply a
/// [`Draft`](Entity::Draft) (the caller-settable fields) and mutate
/// through a [`Patch`](Entity::Patch) (optional per-field overrides).
///
/// # Example
///
/// ```
/// use chrono::{DateTime, Utc};
/// use serde::{Deserialize, Serialize};
/// use crm_kit::entity::Entity;
///
/// #[derive(Clone, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// pub struct Note {
///     pub id: String,
///     pub body: String,
///     pub created_at: DateTime<Utc>,
///     pub updated_at: DateTime<Utc>,
/// }
///
/// pub struct NoteDraft {
///     pub body: String,
/// }
///
/// #[derive(Default)]
/// pub struct NotePatch {
///     pub body: Option<String>,
/// }
///
/// impl Entity for Note {
///     type Draft = NoteDraft;
///     type Patch = NotePatch;
///
///     fn collection() -> &'static str {
///         "notes"
///     }
///
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn from_draft(draft: NoteDraft, id: String, _user_id: &str, now: DateTime<Utc>) -> Self {
///         Note { id, body: draft.body, created_at: now, updated_at: now }
///     }
///
///     fn apply_patch(&mut self, patch: NotePatch) {
///         if let Some(body) = patch.body {
///             self.body = body;
///         }
///     }
///
///     fn touch(&mut self, at: DateTime<Utc>) {
///         self.updated_at = at;
///     }
/// }
/// ```
pub trait Entity: Send + Sync + Serialize + DeserializeOwned + Clone {
    /// Caller-settable fields for a new record (no id, no timestamps, no
    /// owner).
    type Draft: Send;

    /// Partial update: `None` fields are left unchanged.
    type Patch: Send;

    /// Name of the collection this entity is stored under.
    ///
    /// Used to namespace storage keys. Example: `"customers"`, `"events"`.
    /// Final storage key format: `"{collection}_{user_id}"`.
    fn collection() -> &'static str;

    /// The record's unique id.
    fn id(&self) -> &str;

    /// Build a full record from a draft.
    ///
    /// The repository supplies a freshly generated `id`, the active
    /// user's id, and `now` for both timestamps. Entities without an
    /// owner field ignore `user_id`.
    fn from_draft(draft: Self::Draft, id: String, user_id: &str, now: DateTime<Utc>) -> Self;

    /// Shallow-merge a patch over this record.
    ///
    /// Only fields present in the patch are overwritten. Identity, owner,
    /// and derived fields are not reachable from a patch.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Refresh the `updated_at` timestamp.
    fn touch(&mut self, at: DateTime<Utc>);

    /// Encode a full collection of this entity for storage.
    ///
    /// Delegates to the canonical JSON-array codec. This method is NOT
    /// overridable to keep the persisted layout identical across all
    /// entities.
    ///
    /// See `crate::serialization` for implementation details.
    fn encode_collection(items: &[Self]) -> Result<String> {
        crate::serialization::encode_collection(items)
    }

    /// Decode a stored blob back into a collection of this entity.
    ///
    /// Dates come back as real `DateTime<Utc>` values. This method is NOT
    /// overridable to keep the persisted layout identical across all
    /// entities.
    ///
    /// # Errors
    ///
    /// - `Error::DeserializationError`: malformed blob (repositories
    ///   catch this and fail open to an empty collection)
    fn decode_collection(blob: &str) -> Result<Vec<Self>> {
        crate::serialization::decode_collection(blob)
    }
}
