use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrupError {
    #[error("Invalid domain name: {0:?}")]
    InvalidDomainName(String),

    #[error("Domain already exists: {0}")]
    DuplicateDomainId(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("No files selected")]
    EmptyFileSelection,

    #[error("Unsupported file type: {name} ({mime_type})")]
    UnsupportedFileType { name: String, mime_type: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unknown metadata field: {0}")]
    UnknownMetadataField(String),

    #[error("Query depth must be within {min}..={max}, got {depth}")]
    InvalidQueryDepth { depth: u32, min: u32, max: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_message_names_bounds() {
        let e = CrupError::InvalidQueryDepth { depth: 0, min: 1, max: 100 };
        assert_eq!(e.to_string(), "Query depth must be within 1..=100, got 0");
    }
}
