//! # Identity store — users and their embedded notes
//!
//! [`IdentityStore`] is the only shared mutable resource in the system. All
//! note access is scoped through the owning user record: notes are an
//! embedded child collection, so another user's note cannot even be
//! addressed without first holding that user's document.
//!
//! Two implementations:
//!
//! - [`PgIdentityStore`] — PostgreSQL via sqlx; notes live in a JSONB array
//!   on the `users` row and every mutation is a single statement against one
//!   row.
//! - [`MemoryIdentityStore`] — in-memory, for tests.

mod memory;
mod postgres;

pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityStore;

use std::future::Future;

use uuid::Uuid;

use crate::auth::ProviderIdentity;
use crate::error::Error;
use crate::models::{Note, User};

/// Async interface over user/note persistence.
///
/// Mutating operations are atomic per user document: concurrent mutations of
/// different users never block each other, and concurrent mutations of the
/// same user may serialize but cannot corrupt the note list.
pub trait IdentityStore {
    /// Return the user for this provider identity, creating one with an
    /// empty note list on first sight. Idempotent and race-safe: concurrent
    /// calls with the same subject converge on one record. Display fields
    /// are refreshed from the provider profile on every call.
    fn find_or_create_user(
        &self,
        identity: ProviderIdentity,
    ) -> impl Future<Output = Result<User, Error>> + Send;

    fn get_user(&self, id: Uuid) -> impl Future<Output = Result<User, Error>> + Send;

    /// Append a note to the user's list, assigning its id.
    fn append_note(
        &self,
        user_id: Uuid,
        title: String,
        content: String,
    ) -> impl Future<Output = Result<Note, Error>> + Send;

    /// Replace the note with `note.id` in place, preserving list order.
    /// `Ok(None)` when the user holds no note with that id.
    fn update_note(
        &self,
        user_id: Uuid,
        note: Note,
    ) -> impl Future<Output = Result<Option<Note>, Error>> + Send;

    /// Remove at most one note. Returns whether anything was removed;
    /// removing an id that is already gone is `Ok(false)`, not an error.
    fn remove_note(
        &self,
        user_id: Uuid,
        note_id: Uuid,
    ) -> impl Future<Output = Result<bool, Error>> + Send;
}
