//! Liveness endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub domains: Vec<String>,
    pub files: usize,
    pub results: usize,
}

pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    let domains = state.session.domain_ids().await;
    let files = state.session.total_files().await;
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        domains,
        files,
        results: state.results.read().await.len(),
    })
}
