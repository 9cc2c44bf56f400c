//! Data models for the intake pipeline.

use serde::{Deserialize, Serialize};

use crup_common::{CrupError, Result, TrackedFile};

/// MIME type recorded when the client sends none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Describes one uploaded document. Contents are never read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// Lowercased extension including the dot, e.g. `.pdf`.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_lowercase()))
    }

    pub fn effective_mime_type(&self) -> &str {
        match self.mime_type.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => DEFAULT_MIME_TYPE,
        }
    }

    pub fn into_tracked(self) -> TrackedFile {
        let mime = self.effective_mime_type().to_string();
        TrackedFile::queued(self.name, self.size, mime)
    }
}

/// The document types the intake accepts. A file passes when either its
/// extension or its MIME type is listed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptedTypes {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_mime_types")]
    pub mime_types: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".pdf", ".doc", ".docx", ".txt"].iter().map(|s| s.to_string()).collect()
}

fn default_mime_types() -> Vec<String> {
    [
        "application/pdf",
        "application/msword",
        "text/plain",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AcceptedTypes {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            mime_types: default_mime_types(),
        }
    }
}

impl AcceptedTypes {
    pub fn accepts(&self, file: &UploadedFile) -> bool {
        let ext_ok = file
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)));
        let mime_ok = self
            .mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(file.effective_mime_type()));
        ext_ok || mime_ok
    }

    /// Fails on the first file outside the accepted set.
    pub fn check_all(&self, files: &[UploadedFile]) -> Result<()> {
        match files.iter().find(|f| !self.accepts(f)) {
            Some(bad) => Err(CrupError::UnsupportedFileType {
                name: bad.name.clone(),
                mime_type: bad.effective_mime_type().to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Value for an HTML `accept` attribute.
    pub fn accept_attr(&self) -> String {
        self.extensions
            .iter()
            .chain(self.mime_types.iter())
            .cloned()
            .collect::<Vec<_>>()
            .join(",")
    }
}
