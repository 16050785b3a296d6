use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::auth::ProviderIdentity;
use crate::error::Error;
use crate::models::{Note, User};

use super::IdentityStore;

/// In-memory IdentityStore for testing.
#[derive(Clone, Debug, Default)]
pub struct MemoryIdentityStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    by_subject: HashMap<(String, String), Uuid>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn find_or_create_user(&self, identity: ProviderIdentity) -> Result<User, Error> {
        let mut inner = self.inner.lock().unwrap();
        let key = (identity.provider.clone(), identity.subject.clone());

        if let Some(id) = inner.by_subject.get(&key).copied() {
            let user = inner.users.get_mut(&id).expect("subject index out of sync");
            user.name = identity.name;
            user.avatar_url = identity.avatar_url;
            user.updated_at = Utc::now();
            return Ok(user.clone());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            provider: identity.provider,
            provider_id: identity.subject,
            name: identity.name,
            avatar_url: identity.avatar_url,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        inner.by_subject.insert(key, user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, Error> {
        self.inner
            .lock()
            .unwrap()
            .users
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound("user"))
    }

    async fn append_note(
        &self,
        user_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Note, Error> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.users.get_mut(&user_id).ok_or(Error::NotFound("user"))?;
        let note = Note {
            id: Uuid::new_v4(),
            title,
            content,
        };
        user.notes.push(note.clone());
        user.updated_at = Utc::now();
        Ok(note)
    }

    async fn update_note(&self, user_id: Uuid, note: Note) -> Result<Option<Note>, Error> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.users.get_mut(&user_id).ok_or(Error::NotFound("user"))?;
        match user.notes.iter_mut().find(|n| n.id == note.id) {
            Some(slot) => {
                *slot = note.clone();
                user.updated_at = Utc::now();
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    async fn remove_note(&self, user_id: Uuid, note_id: Uuid) -> Result<bool, Error> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.users.get_mut(&user_id).ok_or(Error::NotFound("user"))?;
        let before = user.notes.len();
        user.notes.retain(|n| n.id != note_id);
        let removed = user.notes.len() < before;
        if removed {
            user.updated_at = Utc::now();
        }
        Ok(removed)
    }
}
