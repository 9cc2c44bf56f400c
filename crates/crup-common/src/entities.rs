/// Core record types shared by the intake pipeline, the query dispatcher
/// and the web layer. Serialized field names are camelCase.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CrupError, Result};

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Domain {
    /// Lowercase hyphenated slug, unique within a registry.
    pub id: String,
    pub name: String,
}

impl Domain {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Human label for a domain id: first hyphen becomes a space, every word capitalised.
pub fn domain_label(id: &str) -> String {
    id.replacen('-', " ", 1)
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tracked file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Queued,
    Extracting,
    Embedding,
    Processed,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Queued     => "queued",
            FileStatus::Extracting => "extracting",
            FileStatus::Embedding  => "embedding",
            FileStatus::Processed  => "processed",
            FileStatus::Failed     => "failed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Queued     => "Queued",
            FileStatus::Extracting => "Extracting",
            FileStatus::Embedding  => "Embedding",
            FileStatus::Processed  => "Processed",
            FileStatus::Failed     => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Processed | FileStatus::Failed)
    }

    /// Extracting or embedding: the stages rendered with a spinner.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FileStatus::Extracting | FileStatus::Embedding)
    }

    /// Legal moves: one step forward along queued → extracting → embedding → processed,
    /// or from any non-terminal status into `Failed`.
    pub fn can_advance_to(&self, next: FileStatus) -> bool {
        match (self, next) {
            (FileStatus::Queued, FileStatus::Extracting)
            | (FileStatus::Extracting, FileStatus::Embedding)
            | (FileStatus::Embedding, FileStatus::Processed) => true,
            (from, FileStatus::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user-editable metadata fields of a tracked file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Title,
    Authors,
    Year,
    Tags,
}

impl MetadataField {
    pub const ALL: [MetadataField; 4] = [
        MetadataField::Title,
        MetadataField::Authors,
        MetadataField::Year,
        MetadataField::Tags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::Title   => "title",
            MetadataField::Authors => "authors",
            MetadataField::Year    => "year",
            MetadataField::Tags    => "tags",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            MetadataField::Title   => "Title",
            MetadataField::Authors => "Authors",
            MetadataField::Year    => "Year",
            MetadataField::Tags    => "Domain tags",
        }
    }
}

impl FromStr for MetadataField {
    type Err = CrupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "title"   => Ok(MetadataField::Title),
            "authors" => Ok(MetadataField::Authors),
            "year"    => Ok(MetadataField::Year),
            "tags"    => Ok(MetadataField::Tags),
            other     => Err(CrupError::UnknownMetadataField(other.to_string())),
        }
    }
}

/// Free-text bibliographic fields. Never validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileMetadata {
    pub title: String,
    pub authors: String,
    pub year: String,
    pub tags: String,
}

impl FileMetadata {
    pub fn get(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::Title   => &self.title,
            MetadataField::Authors => &self.authors,
            MetadataField::Year    => &self.year,
            MetadataField::Tags    => &self.tags,
        }
    }

    pub fn set(&mut self, field: MetadataField, value: impl Into<String>) {
        let slot = match field {
            MetadataField::Title   => &mut self.title,
            MetadataField::Authors => &mut self.authors,
            MetadataField::Year    => &mut self.year,
            MetadataField::Tags    => &mut self.tags,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFile {
    pub id: Uuid,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub status: FileStatus,
    pub metadata: FileMetadata,
    pub uploaded_at: DateTime<Utc>,
}

impl TrackedFile {
    /// A freshly uploaded file: queued, empty metadata.
    pub fn queued(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            status: FileStatus::Queued,
            metadata: FileMetadata::default(),
            uploaded_at: Utc::now(),
        }
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}

// ---------------------------------------------------------------------------
// Query configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Ranked,
    Detailed,
    Compact,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Ranked, OutputFormat::Detailed, OutputFormat::Compact];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Ranked   => "ranked",
            OutputFormat::Detailed => "detailed",
            OutputFormat::Compact  => "compact",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Ranked   => "Ranked List",
            OutputFormat::Detailed => "Detailed with Rationale",
            OutputFormat::Compact  => "Compact Summary",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CrupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "ranked"   => Ok(OutputFormat::Ranked),
            "detailed" => Ok(OutputFormat::Detailed),
            "compact"  => Ok(OutputFormat::Compact),
            other      => Err(CrupError::Config(format!("unknown output format: {other}"))),
        }
    }
}

pub const DEFAULT_QUERY_TEXT: &str = "Novel energy storage solutions";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selected_domain_ids: BTreeSet<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_depth() -> u32 { QueryConfig::DEFAULT_DEPTH }

impl QueryConfig {
    pub const MIN_DEPTH: u32 = 1;
    pub const MAX_DEPTH: u32 = 100;
    pub const DEFAULT_DEPTH: u32 = 50;
    /// Depth units that buy one extra result.
    pub const DEPTH_PER_RESULT: u32 = 25;

    pub fn new<I, S>(text: impl Into<String>, domains: I, depth: u32, format: OutputFormat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            selected_domain_ids: domains.into_iter().map(Into::into).collect(),
            depth,
            format,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_DEPTH..=Self::MAX_DEPTH).contains(&self.depth) {
            return Err(CrupError::InvalidQueryDepth {
                depth: self.depth,
                min: Self::MIN_DEPTH,
                max: Self::MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// `ceil(depth / 25)`, never below one.
    pub fn result_limit(&self) -> usize {
        (self.depth.div_ceil(Self::DEPTH_PER_RESULT)).max(1) as usize
    }
}

// ---------------------------------------------------------------------------
// Hypothesis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Validation {
    pub physical: bool,
    pub technical: String,
    pub historical: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    pub title: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: String,
    pub title: String,
    /// In [0.0, 1.0].
    pub confidence: f64,
    pub domain_ids: Vec<String>,
    pub validation: Validation,
    pub sources: Vec<SourceRef>,
}

impl Hypothesis {
    pub fn touches_any(&self, domain_ids: &BTreeSet<String>) -> bool {
        self.domain_ids.iter().any(|d| domain_ids.contains(d))
    }

    /// Confidence as a rounded percentage for display.
    pub fn confidence_pct(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}
