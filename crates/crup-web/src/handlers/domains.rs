//! Domain registry routes: add and remove, as forms and as JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;

use crup_common::Domain;

use crate::error::{ApiError, ApiJson};
use crate::handlers::back_to_dashboard;
use crate::state::{AppEvent, AppState, SharedState};

#[derive(Debug, Deserialize)]
pub struct NewDomain {
    #[serde(default)]
    pub name: String,
}

async fn add(state: &AppState, name: &str) -> Result<Domain, ApiError> {
    let domain = state.session.add_domain(name).await?;
    state.emit(AppEvent::DomainAdded { id: domain.id.clone(), name: domain.name.clone() });
    Ok(domain)
}

async fn remove(state: &AppState, id: &str) -> Result<Domain, ApiError> {
    let domain = state.session.remove_domain(id).await?;
    // Drop the removed domain from the remembered query selection.
    if let Some(last) = state.last_query.write().await.as_mut() {
        last.selected_domain_ids.remove(&domain.id);
    }
    state.emit(AppEvent::DomainRemoved { id: domain.id.clone() });
    Ok(domain)
}

// ── HTML forms ────────────────────────────────────────────────────────────────

pub async fn add_domain_form(
    State(state): State<SharedState>,
    Form(form): Form<NewDomain>,
) -> Redirect {
    let outcome = add(&state, &form.name).await;
    back_to_dashboard(&state, outcome, |d| format!("Added domain {}", d.name))
}

pub async fn remove_domain_form(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Redirect {
    let outcome = remove(&state, &id).await;
    back_to_dashboard(&state, outcome, |d| format!("Removed domain {} and its files", d.name))
}

// ── JSON API ──────────────────────────────────────────────────────────────────

pub async fn api_list_domains(State(state): State<SharedState>) -> Json<Vec<Domain>> {
    Json(state.session.domains().await)
}

pub async fn api_add_domain(
    State(state): State<SharedState>,
    ApiJson(body): ApiJson<NewDomain>,
) -> Result<(StatusCode, Json<Domain>), ApiError> {
    let domain = add(&state, &body.name).await?;
    Ok((StatusCode::CREATED, Json(domain)))
}

pub async fn api_remove_domain(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Domain>, ApiError> {
    Ok(Json(remove(&state, &id).await?))
}
