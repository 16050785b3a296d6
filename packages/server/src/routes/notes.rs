//! CRUD over the authenticated user's note list. Every handler takes a
//! [`CurrentUser`], so anonymous requests are rejected before any of this
//! code runs.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use api::auth::OAuthProvider;
use api::store::IdentityStore;
use api::{Error, Note};

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Create/update payload. Both fields are optional; an absent field becomes
/// the empty string — the core performs no content validation.
#[derive(Debug, Default, Deserialize)]
pub struct NotePayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

pub async fn list<S, P>(
    State(state): State<AppState<S, P>>,
    CurrentUser(claim): CurrentUser,
) -> Result<Json<Vec<Note>>, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let user = state.store.get_user(claim.id).await?;
    Ok(Json(user.notes))
}

pub async fn create<S, P>(
    State(state): State<AppState<S, P>>,
    CurrentUser(claim): CurrentUser,
    Json(payload): Json<NotePayload>,
) -> Result<(StatusCode, Json<Note>), AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let note = state
        .store
        .append_note(claim.id, payload.title, payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_one<S, P>(
    State(state): State<AppState<S, P>>,
    CurrentUser(claim): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let user = state.store.get_user(claim.id).await?;
    user.notes
        .into_iter()
        .find(|note| note.id == id)
        .map(Json)
        .ok_or_else(|| Error::NotFound("note").into())
}

pub async fn update<S, P>(
    State(state): State<AppState<S, P>>,
    CurrentUser(claim): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NotePayload>,
) -> Result<Json<Note>, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let note = Note {
        id,
        title: payload.title,
        content: payload.content,
    };
    state
        .store
        .update_note(claim.id, note)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound("note").into())
}

/// Deletion is convergent: removing an id that is already gone is still a
/// success, with the payload reporting whether anything was removed.
pub async fn remove<S, P>(
    State(state): State<AppState<S, P>>,
    CurrentUser(claim): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError>
where
    S: IdentityStore,
    P: OAuthProvider,
{
    let deleted = state.store.remove_note(claim.id, id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
