//! crup-common: Shared record types and errors used across all CRUP crates.

pub mod error;
pub mod entities;

// Re-export commonly used types
pub use error::{CrupError, Result};
pub use entities::{
    domain_label, Domain, FileMetadata, FileStatus, Hypothesis, MetadataField, OutputFormat, QueryConfig,
    SourceRef, TrackedFile, Validation, DEFAULT_QUERY_TEXT,
};
