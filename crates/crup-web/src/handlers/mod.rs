//! HTTP handlers for all web routes.
//!
//! HTML form routes answer with a redirect back to `/` and leave a
//! [`Notice`](crate::state::Notice) for the next render. `/api` routes speak
//! JSON and report failures as `{"error": ...}` with a matching status code.

pub mod dashboard;
pub mod domains;
pub mod files;
pub mod query;
pub mod results;
pub mod system;

use axum::response::Redirect;

use crate::error::ApiError;
use crate::state::{AppState, Notice};

/// Finish a form submission: record success or failure, then go home.
pub(crate) fn back_to_dashboard<T>(
    state: &AppState,
    outcome: Result<T, ApiError>,
    success: impl FnOnce(T) -> String,
) -> Redirect {
    match outcome {
        Ok(value) => state.set_notice(Notice::success(success(value))),
        Err(e) => {
            tracing::warn!(error = %e, status = %e.status(), "Form action rejected");
            state.set_notice(Notice::error(e.to_string()));
        }
    }
    Redirect::to("/")
}
