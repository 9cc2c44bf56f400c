//! The single-page dashboard: domains and uploads, the query form, and the
//! hypothesis list.

use axum::{extract::State, response::Html};
use minijinja::context;
use serde::Serialize;

use crup_common::{domain_label, MetadataField, OutputFormat, QueryConfig, TrackedFile, DEFAULT_QUERY_TEXT};
use crup_ingestion::session::DomainView;

use crate::error::ApiError;
use crate::handlers::results::{result_cards, ResultCard};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct DomainCard {
    pub id: String,
    /// `id` percent-encoded for use as a URL path segment.
    pub path_id: String,
    pub name: String,
    pub processed: usize,
    pub total: usize,
    pub files: Vec<FileRow>,
}

#[derive(Debug, Serialize)]
pub struct FileRow {
    pub id: String,
    pub name: String,
    pub size_kb: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub spinning: bool,
    pub fields: Vec<FieldInput>,
}

#[derive(Debug, Serialize)]
pub struct FieldInput {
    pub key: &'static str,
    pub placeholder: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct DomainChoice {
    pub id: String,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct FormatChoice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct QueryForm {
    pub text: String,
    pub depth: u32,
    pub min_depth: u32,
    pub max_depth: u32,
    pub domains: Vec<DomainChoice>,
    pub formats: Vec<FormatChoice>,
}

impl From<DomainView> for DomainCard {
    fn from(view: DomainView) -> Self {
        Self {
            path_id: urlencoding::encode(&view.domain.id).into_owned(),
            id: view.domain.id,
            name: view.domain.name,
            processed: view.stats.processed,
            total: view.stats.total,
            files: view.files.iter().map(FileRow::from).collect(),
        }
    }
}

impl From<&TrackedFile> for FileRow {
    fn from(file: &TrackedFile) -> Self {
        Self {
            id: file.id.to_string(),
            name: file.name.clone(),
            size_kb: format!("{:.1}", file.size_kb()),
            status: file.status.as_str(),
            status_label: file.status.label(),
            spinning: file.status.is_in_flight(),
            fields: MetadataField::ALL
                .iter()
                .map(|&field| FieldInput {
                    key: field.as_str(),
                    placeholder: field.placeholder(),
                    value: file.metadata.get(field).to_string(),
                })
                .collect(),
        }
    }
}

/// Build the query form. Before any query every domain is ticked; after one,
/// the previous selection and settings are kept.
pub fn query_form(domain_ids: &[String], last: Option<&QueryConfig>) -> QueryForm {
    let (text, depth, format) = match last {
        Some(q) => (q.text.clone(), q.depth, q.format),
        None => (DEFAULT_QUERY_TEXT.to_string(), QueryConfig::DEFAULT_DEPTH, OutputFormat::default()),
    };
    QueryForm {
        text,
        depth,
        min_depth: QueryConfig::MIN_DEPTH,
        max_depth: QueryConfig::MAX_DEPTH,
        domains: domain_ids
            .iter()
            .map(|id| DomainChoice {
                id: id.clone(),
                label: domain_label(id),
                checked: last.map_or(true, |q| q.selected_domain_ids.contains(id)),
            })
            .collect(),
        formats: OutputFormat::ALL
            .iter()
            .map(|&f| FormatChoice { value: f.as_str(), label: f.label(), selected: f == format })
            .collect(),
    }
}

pub async fn dashboard_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let (views, total_files) = state.session.snapshot().await;
    let domain_ids: Vec<String> = views.iter().map(|v| v.domain.id.clone()).collect();
    let domains: Vec<DomainCard> = views.into_iter().map(DomainCard::from).collect();

    let query = {
        let last = state.last_query.read().await;
        query_form(&domain_ids, last.as_ref())
    };
    let results: Vec<ResultCard> = result_cards(&state.results.read().await);

    let tmpl = state.templates.get_template("index.html")?;
    let html = tmpl.render(context! {
        notice => state.take_notice(),
        total_files,
        accept => state.session.intake_config().accepted.accept_attr(),
        domains,
        query,
        results,
        export_name => &state.settings.export_file_name,
    })?;
    Ok(Html(html))
}
