//! Hypothesis presentation and JSON export.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crup_common::{domain_label, Hypothesis, SourceRef};
use crup_query::dispatcher::sort_by_confidence;
use crup_query::ExportDocument;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize, PartialEq)]
pub struct Check {
    pub title: &'static str,
    pub ok: bool,
    pub note: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ResultCard {
    pub rank: usize,
    pub title: String,
    pub confidence_pct: u32,
    pub domains: Vec<String>,
    pub checks: Vec<Check>,
    pub sources: Vec<SourceRef>,
}

impl ResultCard {
    fn new(rank: usize, h: &Hypothesis) -> Self {
        let v = &h.validation;
        Self {
            rank,
            title: h.title.clone(),
            confidence_pct: h.confidence_pct(),
            domains: h.domain_ids.iter().map(|d| domain_label(d)).collect(),
            checks: vec![
                Check {
                    title: "Physical Laws",
                    ok: v.physical,
                    note: if v.physical { "Pass".to_string() } else { String::new() },
                },
                Check { title: "Technical Feasibility", ok: !v.technical.is_empty(), note: v.technical.clone() },
                Check { title: "Historical Analysis", ok: !v.historical.is_empty(), note: v.historical.clone() },
            ],
            sources: h.sources.clone(),
        }
    }
}

/// Cards in display order: highest confidence first, ranked from 1.
pub fn result_cards(results: &[Hypothesis]) -> Vec<ResultCard> {
    let mut sorted = results.to_vec();
    sort_by_confidence(&mut sorted);
    sorted.iter().enumerate().map(|(i, h)| ResultCard::new(i + 1, h)).collect()
}

/// `GET /export`: the current results as a JSON attachment.
pub async fn export_download(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let body = ExportDocument::new(state.results.read().await.clone()).to_pretty_json()?;
    let disposition = format!("attachment; filename=\"{}\"", state.settings.export_file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// `GET /api/results`
pub async fn api_results(State(state): State<SharedState>) -> Json<ExportDocument> {
    Json(ExportDocument::new(state.results.read().await.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crup_common::Validation;
    use pretty_assertions::assert_eq;

    fn hyp(id: &str, confidence: f64, domains: &[&str]) -> Hypothesis {
        Hypothesis {
            id: id.into(),
            title: format!("Hypothesis {id}"),
            confidence,
            domain_ids: domains.iter().map(|d| d.to_string()).collect(),
            validation: Validation {
                physical: true,
                technical: "Feasible".into(),
                historical: String::new(),
            },
            sources: vec![],
        }
    }

    #[test]
    fn test_cards_sorted_and_ranked() {
        let cards = result_cards(&[hyp("a", 0.76, &["biology"]), hyp("b", 0.95, &["materials-science"])]);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[0].title, "Hypothesis b");
        assert_eq!(cards[0].confidence_pct, 95);
        assert_eq!(cards[0].domains, vec!["Materials Science"]);
        assert_eq!(cards[1].rank, 2);
    }

    #[test]
    fn test_checks_follow_notes() {
        let cards = result_cards(&[hyp("a", 0.5, &[])]);
        let oks: Vec<bool> = cards[0].checks.iter().map(|c| c.ok).collect();
        assert_eq!(oks, vec![true, true, false]);
    }

    #[test]
    fn test_physical_check_notes_pass() {
        let mut failing = hyp("b", 0.4, &[]);
        failing.validation.physical = false;
        let cards = result_cards(&[hyp("a", 0.5, &[]), failing]);
        assert_eq!(cards[0].checks[0].note, "Pass");
        assert!(!cards[1].checks[0].ok);
        assert_eq!(cards[1].checks[0].note, "");
    }

    #[test]
    fn test_no_results_no_cards() {
        assert!(result_cards(&[]).is_empty());
    }
}
