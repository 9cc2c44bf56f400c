//! File intake routes: multipart uploads, descriptor submission, metadata edits.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crup_common::{CrupError, MetadataField, TrackedFile};
use crup_ingestion::models::UploadedFile;

use crate::error::{ApiError, ApiJson};
use crate::handlers::back_to_dashboard;
use crate::state::{AppState, SharedState};

#[derive(Debug, Deserialize)]
pub struct SubmitFiles {
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataEdit {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

fn parse_file_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid file id '{raw}'")))
}

/// Describe every file part of a multipart body. Contents are drained and
/// discarded; only name, byte length, and declared type are kept. Parts
/// without a file name (an empty file input) are skipped.
async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(mut field) = multipart.next_field().await? {
        let name = match field.file_name() {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => continue,
        };
        let mime = field.content_type().map(str::to_string);
        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
        }
        debug!(file = %name, size, mime = ?mime, "Upload part received");
        files.push(UploadedFile::new(name, size, mime.as_deref()));
    }
    Ok(files)
}

async fn set_fields(
    state: &AppState,
    file_id: Uuid,
    edits: Vec<(String, String)>,
) -> Result<TrackedFile, ApiError> {
    // Parse every key first so a bad key changes nothing.
    let edits = edits
        .into_iter()
        .map(|(k, v)| k.parse::<MetadataField>().map(|field| (field, v)))
        .collect::<Result<Vec<_>, CrupError>>()?;
    let mut updated = state
        .session
        .file(file_id)
        .await
        .ok_or_else(|| CrupError::FileNotFound(file_id.to_string()))?;
    for (field, value) in edits {
        updated = state.session.set_metadata(file_id, field, &value).await?;
    }
    Ok(updated)
}

// ── HTML forms ────────────────────────────────────────────────────────────────

pub async fn upload_form(
    State(state): State<SharedState>,
    Path(domain_id): Path<String>,
    multipart: Multipart,
) -> Redirect {
    let outcome = async {
        let files = read_uploads(multipart).await?;
        Ok::<_, ApiError>(state.session.submit(&domain_id, files).await?)
    }
    .await;
    back_to_dashboard(&state, outcome, |tracked: Vec<TrackedFile>| {
        format!("Queued {} file(s) for {}", tracked.len(), domain_id)
    })
}

pub async fn metadata_form(
    State(state): State<SharedState>,
    Path(file_id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect {
    let outcome = async {
        let id = parse_file_id(&file_id)?;
        set_fields(&state, id, fields).await
    }
    .await;
    back_to_dashboard(&state, outcome, |f| format!("Saved metadata for {}", f.name))
}

// ── JSON API ──────────────────────────────────────────────────────────────────

pub async fn api_list_files(
    State(state): State<SharedState>,
    Path(domain_id): Path<String>,
) -> Result<Json<Vec<TrackedFile>>, ApiError> {
    Ok(Json(state.session.files(&domain_id).await?))
}

pub async fn api_submit_files(
    State(state): State<SharedState>,
    Path(domain_id): Path<String>,
    ApiJson(body): ApiJson<SubmitFiles>,
) -> Result<(StatusCode, Json<Vec<TrackedFile>>), ApiError> {
    let tracked = state.session.submit(&domain_id, body.files).await?;
    Ok((StatusCode::ACCEPTED, Json(tracked)))
}

pub async fn api_set_metadata(
    State(state): State<SharedState>,
    Path(file_id): Path<String>,
    ApiJson(edit): ApiJson<MetadataEdit>,
) -> Result<Json<TrackedFile>, ApiError> {
    let id = parse_file_id(&file_id)?;
    Ok(Json(set_fields(&state, id, vec![(edit.key, edit.value)]).await?))
}
