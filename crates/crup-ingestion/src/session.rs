//! Session controller: the single owner of workspace state and the intake
//! scheduler. The web layer holds one of these behind an `Arc`.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crup_common::{CrupError, Domain, MetadataField, Result, TrackedFile};

use crate::models::UploadedFile;
use crate::pipeline::{IntakeConfig, IntakePipeline, IntakeProgress};
use crate::registry::DomainSeed;
use crate::workspace::{DomainStats, SharedWorkspace, Workspace};

/// A domain with its files and counters, as shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainView {
    pub domain: Domain,
    pub files: Vec<TrackedFile>,
    pub stats: DomainStats,
}

pub struct IntakeSession {
    workspace: SharedWorkspace,
    pipeline: IntakePipeline,
}

impl IntakeSession {
    pub fn new(seeds: &[DomainSeed], config: IntakeConfig) -> Self {
        let workspace = Workspace::seeded(seeds).into_shared();
        let pipeline = IntakePipeline::new(workspace.clone(), config);
        Self { workspace, pipeline }
    }

    pub fn intake_config(&self) -> &IntakeConfig {
        self.pipeline.config()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntakeProgress> {
        self.pipeline.subscribe()
    }

    // ── Domain registry ──────────────────────────────────────────────────────

    pub async fn add_domain(&self, name: &str) -> Result<Domain> {
        let domain = self.workspace.write().await.add_domain(name)?;
        info!(id = %domain.id, name = %domain.name, "Domain added");
        Ok(domain)
    }

    /// Remove a domain, its files, and any of its pending intake stages.
    pub async fn remove_domain(&self, id: &str) -> Result<Domain> {
        let mut ws = self.workspace.write().await;
        let (domain, files) = ws.remove_domain(id)?;
        let cancelled = self.pipeline.cancel_domain(id);
        drop(ws);
        info!(id = %domain.id, files = files.len(), cancelled, "Domain removed");
        Ok(domain)
    }

    pub async fn domains(&self) -> Vec<Domain> {
        self.workspace.read().await.domains().to_vec()
    }

    pub async fn domain_ids(&self) -> Vec<String> {
        self.workspace.read().await.registry().ids()
    }

    // ── Files ────────────────────────────────────────────────────────────────

    pub async fn submit(&self, domain_id: &str, files: Vec<UploadedFile>) -> Result<Vec<TrackedFile>> {
        self.pipeline.submit(domain_id, files).await
    }

    pub async fn set_metadata(&self, file_id: Uuid, field: MetadataField, value: &str) -> Result<TrackedFile> {
        let mut ws = self.workspace.write().await;
        ws.set_metadata(file_id, field, value).cloned()
    }

    pub async fn total_files(&self) -> usize {
        self.workspace.read().await.total_files()
    }

    /// Current stored record of a file.
    pub async fn file(&self, file_id: Uuid) -> Option<TrackedFile> {
        self.workspace.read().await.find_file(file_id).map(|(_, f)| f.clone())
    }

    pub async fn files(&self, domain_id: &str) -> Result<Vec<TrackedFile>> {
        let ws = self.workspace.read().await;
        if !ws.registry().contains(domain_id) {
            return Err(CrupError::DomainNotFound(domain_id.to_string()));
        }
        Ok(ws.files(domain_id).to_vec())
    }

    /// Every domain with its files, in registry order, plus the total file count.
    pub async fn snapshot(&self) -> (Vec<DomainView>, usize) {
        let ws = self.workspace.read().await;
        let views = ws
            .domains()
            .iter()
            .map(|d| DomainView {
                domain: d.clone(),
                files: ws.files(&d.id).to_vec(),
                stats: ws.stats(&d.id),
            })
            .collect();
        (views, ws.total_files())
    }
}
