//! In-memory session state: the domain registry plus one tracked file list
//! per domain. Every mutation addresses records by id against the stored
//! state, so scheduled status changes and user edits never overwrite
//! each other.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crup_common::{CrupError, Domain, FileStatus, MetadataField, Result, TrackedFile};

use crate::registry::{DomainRegistry, DomainSeed};

pub type SharedWorkspace = Arc<RwLock<Workspace>>;

/// Outcome of applying a status change to a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Applied { domain_id: String, from: FileStatus },
    /// The move would regress or leave a terminal status.
    Refused { current: FileStatus },
    /// No file with that id is stored (its domain was removed).
    Missing,
}

/// Processing counters for one domain.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainStats {
    pub total: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub processed: usize,
    pub failed: usize,
}

impl DomainStats {
    fn from_files(files: &[TrackedFile]) -> Self {
        files.iter().fold(Self::default(), |mut acc, f| {
            acc.total += 1;
            match f.status {
                FileStatus::Queued => acc.queued += 1,
                FileStatus::Extracting | FileStatus::Embedding => acc.in_flight += 1,
                FileStatus::Processed => acc.processed += 1,
                FileStatus::Failed => acc.failed += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    registry: DomainRegistry,
    files: HashMap<String, Vec<TrackedFile>>,
}

impl Workspace {
    pub fn new(registry: DomainRegistry) -> Self {
        Self { registry, files: HashMap::new() }
    }

    pub fn seeded(seeds: &[DomainSeed]) -> Self {
        Self::new(DomainRegistry::with_seeds(seeds))
    }

    pub fn into_shared(self) -> SharedWorkspace {
        Arc::new(RwLock::new(self))
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn domains(&self) -> &[Domain] {
        self.registry.list()
    }

    // ── Domains ──────────────────────────────────────────────────────────────

    pub fn add_domain(&mut self, name: &str) -> Result<Domain> {
        self.registry.add(name)
    }

    /// Remove a domain together with its file list.
    pub fn remove_domain(&mut self, id: &str) -> Result<(Domain, Vec<TrackedFile>)> {
        let domain = self.registry.remove(id)?;
        let files = self.files.remove(id).unwrap_or_default();
        Ok((domain, files))
    }

    // ── Files ────────────────────────────────────────────────────────────────

    /// Files of a domain in upload order; empty for unknown domains.
    pub fn files(&self, domain_id: &str) -> &[TrackedFile] {
        self.files.get(domain_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn append_files(&mut self, domain_id: &str, files: Vec<TrackedFile>) -> Result<()> {
        if !self.registry.contains(domain_id) {
            return Err(CrupError::DomainNotFound(domain_id.to_string()));
        }
        self.files.entry(domain_id.to_string()).or_default().extend(files);
        Ok(())
    }

    pub fn find_file(&self, file_id: Uuid) -> Option<(&str, &TrackedFile)> {
        self.files.iter().find_map(|(domain_id, files)| {
            files.iter().find(|f| f.id == file_id).map(|f| (domain_id.as_str(), f))
        })
    }

    fn find_file_mut(&mut self, file_id: Uuid) -> Option<(&str, &mut TrackedFile)> {
        self.files.iter_mut().find_map(|(domain_id, files)| {
            files.iter_mut().find(|f| f.id == file_id).map(|f| (domain_id.as_str(), f))
        })
    }

    /// Move a file to `next` if that is a legal forward step. Only the status
    /// field of the stored record is touched.
    pub fn apply_status(&mut self, file_id: Uuid, next: FileStatus) -> Transition {
        let Some((domain_id, file)) = self.find_file_mut(file_id) else {
            return Transition::Missing;
        };
        if !file.status.can_advance_to(next) {
            return Transition::Refused { current: file.status };
        }
        let from = file.status;
        file.status = next;
        Transition::Applied { domain_id: domain_id.to_string(), from }
    }

    pub fn set_metadata(&mut self, file_id: Uuid, field: MetadataField, value: &str) -> Result<&TrackedFile> {
        let (_, file) = self
            .find_file_mut(file_id)
            .ok_or_else(|| CrupError::FileNotFound(file_id.to_string()))?;
        file.metadata.set(field, value);
        Ok(&*file)
    }

    // ── Stats ────────────────────────────────────────────────────────────────

    pub fn stats(&self, domain_id: &str) -> DomainStats {
        DomainStats::from_files(self.files(domain_id))
    }

    pub fn total_files(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}
