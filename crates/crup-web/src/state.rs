//! Shared application state for the web server.

use std::sync::{Arc, Mutex};

use minijinja::Environment;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crup_common::{FileStatus, Hypothesis, QueryConfig};
use crup_ingestion::IntakeSession;
use crup_query::{QueryDispatcher, EXPORT_FILE_NAME};

use crate::templates;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// A tracked file moved to a new intake stage
    FileStatus { domain_id: String, file_id: String, file_name: String, status: FileStatus },
    /// A domain was registered
    DomainAdded { id: String, name: String },
    /// A domain and its files were discarded
    DomainRemoved { id: String },
    /// A correlation query returned
    QueryComplete { query: String, results: usize },
}

impl AppEvent {
    /// The serde tag, also used as the SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppEvent::FileStatus { .. }    => "file_status",
            AppEvent::DomainAdded { .. }   => "domain_added",
            AppEvent::DomainRemoved { .. } => "domain_removed",
            AppEvent::QueryComplete { .. } => "query_complete",
        }
    }
}

/// One-shot message shown on the next dashboard render.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub level: String,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: "success".to_string(), message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: "error".to_string(), message: message.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebSettings {
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,
    /// Request body cap for multipart uploads.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_static_dir() -> String { "static".to_string() }
fn default_export_file_name() -> String { EXPORT_FILE_NAME.to_string() }
fn default_max_upload_bytes() -> usize { 64 * 1024 * 1024 }

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            export_file_name: default_export_file_name(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub session: Arc<IntakeSession>,
    pub dispatcher: QueryDispatcher,
    pub settings: WebSettings,
    /// Results of the most recent query
    pub results: RwLock<Vec<Hypothesis>>,
    /// Configuration of the most recent query, used to prefill the form
    pub last_query: RwLock<Option<QueryConfig>>,
    pub notice: Mutex<Option<Notice>>,
    pub templates: Environment<'static>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    /// Must be called inside a tokio runtime: intake progress is forwarded
    /// onto the SSE channel by a background task.
    pub fn new(session: IntakeSession, dispatcher: QueryDispatcher, settings: WebSettings) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let session = Arc::new(session);
        spawn_progress_forwarder(&session, event_tx.clone());
        Self {
            session,
            dispatcher,
            settings,
            results: RwLock::new(Vec::new()),
            last_query: RwLock::new(None),
            notice: Mutex::new(None),
            templates: templates::environment(),
            event_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    pub fn emit(&self, event: AppEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    pub fn set_notice(&self, notice: Notice) {
        *self.notice.lock().unwrap_or_else(|e| e.into_inner()) = Some(notice);
    }

    pub fn take_notice(&self) -> Option<Notice> {
        self.notice.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

pub type SharedState = Arc<AppState>;

fn spawn_progress_forwarder(session: &IntakeSession, event_tx: broadcast::Sender<AppEvent>) {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(p) => {
                    let _ = event_tx.send(AppEvent::FileStatus {
                        domain_id: p.domain_id,
                        file_id: p.file_id.to_string(),
                        file_name: p.file_name,
                        status: p.status,
                    });
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "SSE forwarder lagged behind intake progress");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Intake progress channel closed");
                    break;
                }
            }
        }
    });
}
