use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single note, embedded in its owner's [`User`](super::User) record.
///
/// Notes have no lifecycle of their own: they are appended to exactly one
/// user's list, addressed by `id` for later update or removal, and never
/// move between users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Assigned by the store when the note is appended; immutable.
    pub id: Uuid,
    pub title: String,
    pub content: String,
}
