use thiserror::Error;

/// Result type for upload assembly operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur while resolving files and assembling request bodies
#[derive(Error, Debug)]
pub enum UploadError {
    /// A file source was asked for a value it cannot produce
    /// (an upload from a reference, or a reference from an upload).
    #[error("File source does not support {operation}")]
    Unsupported { operation: &'static str },

    #[error("Required file data is missing")]
    MissingData,

    #[error("Upload stream already consumed: {name}")]
    Consumed { name: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to encode multipart body: {source}")]
    Encoding {
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl UploadError {
    /// Create an unsupported operation error
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Create an error for a single-shot stream that was already taken
    pub fn consumed<S: Into<String>>(name: S) -> Self {
        Self::Consumed { name: name.into() }
    }

    /// Create an encoding error from a failed write
    pub fn encoding(source: std::io::Error) -> Self {
        Self::Encoding { source }
    }

    /// Check if this error signals a programming mistake rather than a runtime failure
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
