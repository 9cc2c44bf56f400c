//! Simulated document intake.
//!
//! Each submitted file is tracked as a record in the shared [`Workspace`] and
//! walked through the stages of a fixed [`StageTimeline`]:
//!   1. queued      (on submit)
//!   2. extracting
//!   3. embedding   (or failed, when failure injection picks the file)
//!   4. processed
//!
//! No document content is read. One task per file sleeps until each stage
//! deadline and applies the change by id against the current stored record.
//! Applied changes are broadcast as [`IntakeProgress`] events.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crup_common::{CrupError, FileStatus, Result, TrackedFile};

use crate::models::{AcceptedTypes, UploadedFile};
use crate::timeline::StageTimeline;
use crate::workspace::{SharedWorkspace, Transition};

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeConfig {
    #[serde(default)]
    pub timeline: StageTimeline,
    #[serde(default)]
    pub accepted: AcceptedTypes,
    /// Probability in [0, 1] that a file ends in `failed` instead of `processed`.
    #[serde(default)]
    pub failure_rate: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            timeline: StageTimeline::default(),
            accepted: AcceptedTypes::default(),
            failure_rate: 0.0,
        }
    }
}

// ── Progress events ───────────────────────────────────────────────────────────

/// One applied status change (cloneable for broadcast).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeProgress {
    pub domain_id: String,
    pub file_id: Uuid,
    pub file_name: String,
    pub status: FileStatus,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct IntakePipeline {
    workspace: SharedWorkspace,
    config: IntakeConfig,
    progress_tx: broadcast::Sender<IntakeProgress>,
    /// Pending stage tasks per domain, aborted when the domain is removed.
    pending: Mutex<HashMap<String, Vec<AbortHandle>>>,
}

impl IntakePipeline {
    pub fn new(workspace: SharedWorkspace, config: IntakeConfig) -> Self {
        if !config.timeline.is_ordered() {
            warn!("Intake timeline stages overlap; later stages may be refused");
        }
        let (progress_tx, _) = broadcast::channel(256);
        Self {
            workspace,
            config,
            progress_tx,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntakeProgress> {
        self.progress_tx.subscribe()
    }

    /// Track a batch of uploads under `domain_id` and schedule their stages.
    /// The batch is rejected as a whole if it is empty, targets an unknown
    /// domain, or contains an unsupported file type.
    #[instrument(skip(self, files), fields(n = files.len()))]
    pub async fn submit(&self, domain_id: &str, files: Vec<UploadedFile>) -> Result<Vec<TrackedFile>> {
        if files.is_empty() {
            return Err(CrupError::EmptyFileSelection);
        }
        self.config.accepted.check_all(&files)?;

        let tracked: Vec<TrackedFile> = files.into_iter().map(UploadedFile::into_tracked).collect();
        let start = Instant::now();
        // Workspace lock stays held until the batch's abort handles are registered.
        let mut ws = self.workspace.write().await;
        ws.append_files(domain_id, tracked.clone())?;

        let failure_rate = self.config.failure_rate.clamp(0.0, 1.0);
        let handles: Vec<AbortHandle> = {
            let mut rng = rand::thread_rng();
            tracked
                .iter()
                .enumerate()
                .map(|(index, file)| {
                    let fail = rng.gen_bool(failure_rate);
                    self.spawn_stages(domain_id, file, index, start, fail)
                })
                .collect()
        };

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let slot = pending.entry(domain_id.to_string()).or_default();
        slot.retain(|h| !h.is_finished());
        slot.extend(handles);
        drop(pending);
        drop(ws);

        info!(domain = %domain_id, n_files = tracked.len(), "Files queued for intake");
        Ok(tracked)
    }

    /// Abort every pending stage task for a domain. Returns how many were live.
    pub fn cancel_domain(&self, domain_id: &str) -> usize {
        let handles = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(domain_id)
            .unwrap_or_default();
        let live = handles.iter().filter(|h| !h.is_finished()).count();
        for h in &handles {
            h.abort();
        }
        if live > 0 {
            debug!(domain = %domain_id, live, "Pending intake stages cancelled");
        }
        live
    }

    fn spawn_stages(
        &self,
        domain_id: &str,
        file: &TrackedFile,
        index: usize,
        start: Instant,
        fail: bool,
    ) -> AbortHandle {
        let workspace = self.workspace.clone();
        let progress_tx = self.progress_tx.clone();
        let plan = self.config.timeline.plan(index, fail);
        let file_id = file.id;
        let file_name = file.name.clone();
        let domain_id = domain_id.to_string();

        let handle = tokio::spawn(async move {
            for (status, offset) in plan {
                tokio::time::sleep_until(start + offset).await;
                let outcome = workspace.write().await.apply_status(file_id, status);
                match outcome {
                    Transition::Applied { from, .. } => {
                        debug!(file = %file_name, %from, to = %status, "Intake stage");
                        let _ = progress_tx.send(IntakeProgress {
                            domain_id: domain_id.clone(),
                            file_id,
                            file_name: file_name.clone(),
                            status,
                        });
                    }
                    Transition::Refused { current } => {
                        debug!(file = %file_name, %current, to = %status, "Stage refused, stopping");
                        return;
                    }
                    Transition::Missing => {
                        debug!(file = %file_name, "File no longer tracked, stopping");
                        return;
                    }
                }
            }
        });
        handle.abort_handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::registry::DomainSeed;
    use crate::workspace::Workspace;

    fn pipeline(config: IntakeConfig) -> IntakePipeline {
        IntakePipeline::new(Workspace::seeded(&DomainSeed::defaults()).into_shared(), config)
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let p = pipeline(IntakeConfig::default());
        assert!(matches!(p.submit("physics", vec![]).await, Err(CrupError::EmptyFileSelection)));
    }

    #[tokio::test]
    async fn test_unknown_domain_rejected() {
        let p = pipeline(IntakeConfig::default());
        let files = vec![UploadedFile::new("a.pdf", 1, None)];
        assert!(matches!(p.submit("alchemy", files).await, Err(CrupError::DomainNotFound(_))));
    }

    #[tokio::test]
    async fn test_unsupported_type_rejects_whole_batch() {
        let p = pipeline(IntakeConfig::default());
        let files = vec![
            UploadedFile::new("a.pdf", 1, None),
            UploadedFile::new("b.png", 1, Some("image/png")),
        ];
        assert!(matches!(
            p.submit("physics", files).await,
            Err(CrupError::UnsupportedFileType { .. })
        ));
        assert_eq!(p.workspace.read().await.total_files(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events_in_order() {
        let p = pipeline(IntakeConfig::default());
        let mut rx = p.subscribe();
        let tracked = p
            .submit("biology", vec![UploadedFile::new("cells.txt", 12, Some("text/plain"))])
            .await
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            let ev = rx.recv().await.unwrap();
            assert_eq!(ev.file_id, tracked[0].id);
            assert_eq!(ev.domain_id, "biology");
            seen.push(ev.status);
        }
        assert_eq!(seen, vec![FileStatus::Extracting, FileStatus::Embedding, FileStatus::Processed]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_removal_racing_submit_leaves_no_stray_handles() {
        for _ in 0..50 {
            let p = Arc::new(pipeline(IntakeConfig::default()));
            let submitter = {
                let p = p.clone();
                tokio::spawn(async move { p.submit("physics", vec![UploadedFile::new("a.pdf", 1, None)]).await })
            };
            let remover = {
                let p = p.clone();
                tokio::spawn(async move {
                    let mut ws = p.workspace.write().await;
                    let removed = ws.remove_domain("physics").is_ok();
                    p.cancel_domain("physics");
                    removed
                })
            };
            let _ = submitter.await.unwrap();
            assert!(remover.await.unwrap());
            assert!(!p.pending.lock().unwrap().contains_key("physics"));
            assert_eq!(p.workspace.read().await.total_files(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_domain_reports_live_tasks() {
        let p = pipeline(IntakeConfig::default());
        p.submit("physics", vec![UploadedFile::new("a.pdf", 1, None), UploadedFile::new("b.pdf", 1, None)])
            .await
            .unwrap();
        assert_eq!(p.cancel_domain("physics"), 2);
        assert_eq!(p.cancel_domain("physics"), 0);
    }
}
