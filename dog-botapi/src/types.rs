use bytes::Bytes;
use futures_core::Stream;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::fmt::Write as _;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Stream of bytes for an encoded request body
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Owned, closable source of upload content. Dropping it closes the underlying handle.
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boundaries shorter than this are too easy to collide with file content
pub(crate) const MIN_BOUNDARY_BYTES: usize = 16;

/// Boundaries are limited to 70 characters on the wire
pub(crate) const MAX_BOUNDARY_BYTES: usize = 35;

/// Multipart boundary token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(pub String);

impl Boundary {
    /// Generate a fresh boundary from a generator seeded for this call only.
    ///
    /// `random_bytes` is clamped to the range a valid boundary allows.
    pub fn generate(random_bytes: usize) -> Self {
        let random_bytes = random_bytes.clamp(MIN_BOUNDARY_BYTES, MAX_BOUNDARY_BYTES);
        let mut rng = StdRng::from_entropy();
        let mut raw = vec![0u8; random_bytes];
        rng.fill_bytes(&mut raw);

        let mut token = String::with_capacity(random_bytes * 2);
        for byte in raw {
            let _ = write!(token, "{:02x}", byte);
        }
        Self(token)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
