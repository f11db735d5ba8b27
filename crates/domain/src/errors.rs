use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tracker data download failed: {0}")]
    Download(String),

    #[error("Failed to decode tracker data: {0}")]
    Decode(String),

    #[error("Failed to encode rules: {0}")]
    Encode(String),

    #[error("Rule list compilation failed: {0}")]
    Compile(String),

    #[error("Rule list lookup failed: {0}")]
    Lookup(String),

    #[error("Rule list removal failed: {0}")]
    Remove(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),
}

impl DomainError {
    /// Category string reported to the error tracker.
    pub fn category(&self) -> &'static str {
        match self {
            DomainError::Download(_) => "download_error",
            DomainError::Decode(_) => "decode_error",
            DomainError::Encode(_) => "encode_error",
            DomainError::Compile(_) => "compilation_error",
            DomainError::Lookup(_) => "lookup_error",
            DomainError::Remove(_) => "remove_error",
            DomainError::Persistence(_) => "persistence_error",
            DomainError::IoError(_) => "io_error",
            DomainError::InvalidDomainName(_) => "invalid_domain",
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::IoError(err.to_string())
    }
}
