use crate::types::{MAX_BOUNDARY_BYTES, MIN_BOUNDARY_BYTES};

/// Configuration for multipart body encoding
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Read buffer size used when streaming file content into the body
    pub chunk_size: usize,

    /// Content-Type written on every file-carrying part
    pub file_content_type: String,

    /// Number of random bytes in a boundary (hex encoded on the wire)
    pub boundary_bytes: usize,
}

const ENV_CHUNK_SIZE: &str = "DOG_BOTAPI_MULTIPART_CHUNK_SIZE";
const ENV_FILE_CONTENT_TYPE: &str = "DOG_BOTAPI_MULTIPART_FILE_CONTENT_TYPE";
const ENV_BOUNDARY_BYTES: &str = "DOG_BOTAPI_MULTIPART_BOUNDARY_BYTES";


impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024, // 64KB
            file_content_type: "application/octet-stream".to_string(),
            boundary_bytes: 30,
        }
    }
}

impl MultipartConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `DOG_BOTAPI_MULTIPART_*` environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = std::env::var(ENV_CHUNK_SIZE)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config = config.with_chunk_size(size);
        }

        if let Ok(content_type) = std::env::var(ENV_FILE_CONTENT_TYPE) {
            if !content_type.trim().is_empty() {
                config = config.with_file_content_type(content_type.trim());
            }
        }

        if let Some(bytes) = std::env::var(ENV_BOUNDARY_BYTES)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
        {
            config = config.with_boundary_bytes(bytes);
        }

        config
    }

    /// Set the streaming chunk size (zero is bumped to one byte)
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Set the Content-Type used for file parts
    pub fn with_file_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.file_content_type = content_type.into();
        self
    }

    /// Set the boundary entropy in bytes
    pub fn with_boundary_bytes(mut self, bytes: usize) -> Self {
        self.boundary_bytes = bytes.clamp(MIN_BOUNDARY_BYTES, MAX_BOUNDARY_BYTES);
        self
    }
}
