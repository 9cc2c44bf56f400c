//! Correlation query routes.

use axum::{extract::State, response::Redirect, Form, Json};
use tracing::info;

use crup_common::{CrupError, OutputFormat, QueryConfig};
use crup_query::QueryOutcome;

use crate::error::{ApiError, ApiJson};
use crate::handlers::back_to_dashboard;
use crate::state::{AppEvent, AppState, SharedState};

/// Read the query form. `domains` repeats once per ticked checkbox, so the
/// body is taken as raw pairs.
pub fn parse_query_form(pairs: Vec<(String, String)>) -> Result<QueryConfig, ApiError> {
    let mut config = QueryConfig::new(String::new(), Vec::<String>::new(), QueryConfig::DEFAULT_DEPTH, OutputFormat::default());
    for (key, value) in pairs {
        match key.as_str() {
            "text" => config.text = value,
            "domains" => {
                config.selected_domain_ids.insert(value);
            }
            "depth" => {
                config.depth = value
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid depth '{value}'")))?;
            }
            "format" => {
                config.format = value
                    .parse()
                    .map_err(|e: CrupError| ApiError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }
    Ok(config)
}

async fn run_query(state: &AppState, config: QueryConfig) -> Result<QueryOutcome, ApiError> {
    let outcome = state.dispatcher.run(&config).await?;
    *state.last_query.write().await = Some(config);
    *state.results.write().await = outcome.results.clone();
    info!(query = %outcome.query, results = outcome.results.len(), "Results replaced");
    state.emit(AppEvent::QueryComplete { query: outcome.query.clone(), results: outcome.results.len() });
    Ok(outcome)
}

pub async fn query_form(
    State(state): State<SharedState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Redirect {
    let outcome = match parse_query_form(pairs) {
        Ok(config) => run_query(&state, config).await,
        Err(e) => Err(e),
    };
    back_to_dashboard(&state, outcome, |o| match o.results.len() {
        0 => "No hypotheses matched the selected domains".to_string(),
        n => format!("{n} hypothesis(es) generated"),
    })
}

pub async fn api_query(
    State(state): State<SharedState>,
    ApiJson(config): ApiJson<QueryConfig>,
) -> Result<Json<QueryOutcome>, ApiError> {
    Ok(Json(run_query(&state, config).await?))
}
