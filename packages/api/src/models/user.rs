//! # User model for authenticated users
//!
//! Defines the two representations of a user:
//!
//! ## [`User`]
//!
//! The complete database row from the `users` table. It derives
//! [`sqlx::FromRow`] so it can be loaded directly from queries:
//!
//! - `id` — primary key (`UUID v4`).
//! - `provider` / `provider_id` — the identity-provider key pair. Every user
//!   this backend creates has `provider = "google"`; `provider_id` is the
//!   stable subject identifier the provider vouches for, and the pair is the
//!   sole correlation key for federated login. No password or email is
//!   modeled.
//! - `name`, `avatar_url` — optional display fields from the provider
//!   profile, refreshed on each login. Decorations only, never consulted for
//!   authorization.
//! - `notes` — the embedded note list, stored as a JSONB array on the same
//!   row. Notes belong to exactly one user; there is no way to address a
//!   note without first holding its owner's record.
//! - `created_at` / `updated_at` — audit timestamps.
//!
//! The [`User::to_info`] method projects this into a [`UserInfo`].
//!
//! ## [`UserInfo`]
//!
//! The minimal identity claim held by the session for the lifetime of a
//! login. It carries `{ id, name, avatar_url }` and nothing else — in
//! particular never the note list, so a stale snapshot cannot leak across
//! requests. Handlers needing full user data go back to the store with
//! `claim.id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Note;

/// Full user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub provider: String,
    pub provider_id: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    #[sqlx(json)]
    pub notes: Vec<Note>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Project into the session claim.
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// Minimal identity claim stored in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserInfo {
    /// Display name, falling back to the user id when the provider sent none.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}
