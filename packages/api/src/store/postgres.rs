//! PostgreSQL-backed identity store.
//!
//! Notes are a JSONB array on the `users` row, so each mutation below is a
//! single statement against exactly one row and inherits the database's
//! row-level atomicity. The `remove`/`update` statements compute "was the
//! note there" in the same snapshot that mutates the row, which keeps the
//! idempotent-delete contract honest under concurrent requests.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ProviderIdentity;
use crate::error::Error;
use crate::models::{Note, User};

use super::IdentityStore;

#[derive(Clone, Debug)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl IdentityStore for PgIdentityStore {
    async fn find_or_create_user(&self, identity: ProviderIdentity) -> Result<User, Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (provider, provider_id, name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (provider, provider_id)
            DO UPDATE SET
                name = EXCLUDED.name,
                avatar_url = EXCLUDED.avatar_url,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&identity.provider)
        .bind(&identity.subject)
        .bind(&identity.name)
        .bind(&identity.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User, Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    async fn append_note(
        &self,
        user_id: Uuid,
        title: String,
        content: String,
    ) -> Result<Note, Error> {
        let note = Note {
            id: Uuid::new_v4(),
            title,
            content,
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET notes = notes || jsonb_build_array(
                    jsonb_build_object('id', $2::text, 'title', $3::text, 'content', $4::text)
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(note.id.to_string())
        .bind(&note.title)
        .bind(&note.content)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(note)
    }

    async fn update_note(&self, user_id: Uuid, note: Note) -> Result<Option<Note>, Error> {
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT notes @> jsonb_build_array(jsonb_build_object('id', $2::text)) AS held
                FROM users
                WHERE id = $1
            ),
            patched AS (
                UPDATE users
                SET notes = (
                        SELECT COALESCE(jsonb_agg(
                            CASE WHEN note->>'id' = $2
                                 THEN jsonb_build_object(
                                     'id', $2::text, 'title', $3::text, 'content', $4::text)
                                 ELSE note
                            END), '[]'::jsonb)
                        FROM jsonb_array_elements(notes) AS note
                    ),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id
            )
            SELECT held FROM target
            "#,
        )
        .bind(user_id)
        .bind(note.id.to_string())
        .bind(&note.title)
        .bind(&note.content)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Err(Error::NotFound("user")),
            Some((false,)) => Ok(None),
            Some((true,)) => Ok(Some(note)),
        }
    }

    async fn remove_note(&self, user_id: Uuid, note_id: Uuid) -> Result<bool, Error> {
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT notes @> jsonb_build_array(jsonb_build_object('id', $2::text)) AS held
                FROM users
                WHERE id = $1
            ),
            pruned AS (
                UPDATE users
                SET notes = (
                        SELECT COALESCE(jsonb_agg(note), '[]'::jsonb)
                        FROM jsonb_array_elements(notes) AS note
                        WHERE note->>'id' <> $2
                    ),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING id
            )
            SELECT held FROM target
            "#,
        )
        .bind(user_id)
        .bind(note_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(held,)| held).ok_or(Error::NotFound("user"))
    }
}
