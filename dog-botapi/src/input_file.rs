use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::{ser::Error as _, Serialize, Serializer};
use tokio::io::AsyncRead;

use crate::{
    ByteReader, FileDataRef, FileSource, RequestFileData, UploadDescriptor, UploadError,
    UploadResult,
};

/// A stream that can be taken exactly once, shared between clones of the same file
#[derive(Clone)]
pub struct SharedReader(Arc<Mutex<Option<ByteReader>>>);

impl SharedReader {
    fn new(reader: ByteReader) -> Self {
        Self(Arc::new(Mutex::new(Some(reader))))
    }

    fn take(&self) -> Option<ByteReader> {
        self.0.lock().take()
    }

    pub fn is_consumed(&self) -> bool {
        self.0.lock().is_none()
    }
}

impl fmt::Debug for SharedReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedReader")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// A file attached to a request, in any of the forms the platform accepts
#[derive(Debug, Clone)]
pub enum InputFile {
    /// In-memory content uploaded under `name`
    Bytes { name: String, bytes: Bytes },
    /// Open stream uploaded under `name`; it can be sent once
    Reader { name: String, reader: SharedReader },
    /// Local file, opened when the request is encoded
    Path(PathBuf),
    /// URL the platform downloads itself
    Url(String),
    /// Identifier of a file already stored by the platform
    FileId(String),
    /// Reference to another part of the same multipart request
    Attach(String),
}

impl InputFile {
    pub fn bytes<S: Into<String>, B: Into<Bytes>>(name: S, bytes: B) -> Self {
        Self::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn reader<S, R>(name: S, reader: R) -> Self
    where
        S: Into<String>,
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::Reader {
            name: name.into(),
            reader: SharedReader::new(Box::new(reader)),
        }
    }

    pub fn path<P: Into<PathBuf>>(path: P) -> Self {
        Self::Path(path.into())
    }

    pub fn url<S: Into<String>>(url: S) -> Self {
        Self::Url(url.into())
    }

    pub fn file_id<S: Into<String>>(file_id: S) -> Self {
        Self::FileId(file_id.into())
    }

    pub(crate) fn attach<S: Into<String>>(token: S) -> Self {
        Self::Attach(token.into())
    }

    /// Fresh single-shot source for this file
    pub fn source(&self) -> FileSource {
        match self {
            Self::Bytes { name, bytes } => FileSource::from_bytes(name.clone(), bytes.clone()),
            Self::Reader { name, reader } => {
                let name = name.clone();
                let reader = reader.clone();
                FileSource::upload_with(move || take_shared(name, reader))
            }
            Self::Path(path) => FileSource::from_path(path.clone()),
            Self::Url(url) => FileSource::from_url(url.clone()),
            Self::FileId(file_id) => FileSource::from_file_id(file_id.clone()),
            Self::Attach(token) => FileSource::from_attach(token.clone()),
        }
    }

    pub fn into_ref(self) -> FileDataRef {
        Arc::new(self)
    }
}

async fn take_shared(name: String, reader: SharedReader) -> UploadResult<UploadDescriptor> {
    let stream = reader
        .take()
        .ok_or_else(|| UploadError::consumed(name.clone()))?;
    Ok(UploadDescriptor::new(name, stream))
}

#[async_trait]
impl RequestFileData for InputFile {
    fn needs_upload(&self) -> bool {
        matches!(self, Self::Bytes { .. } | Self::Reader { .. } | Self::Path(_))
    }

    async fn upload_data(&self) -> UploadResult<(String, ByteReader)> {
        let descriptor = self.source().open_upload().await?;
        Ok(descriptor.into_parts())
    }

    fn send_data(&self) -> UploadResult<String> {
        self.source().reference_value()
    }

    fn file_source(&self) -> Option<FileSource> {
        Some(self.source())
    }
}

impl From<InputFile> for FileDataRef {
    fn from(file: InputFile) -> Self {
        file.into_ref()
    }
}

// Upload kinds have no JSON form; media must be rewritten to attach tokens first.
impl Serialize for InputFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.send_data().map_err(|err| {
            S::Error::custom(format!("file must be attached before it can be referenced: {}", err))
        })?;
        serializer.serialize_str(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_upload_variants() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload-1.txt");
        std::fs::write(&path, b"temp-data").unwrap();

        let cases = vec![
            (InputFile::bytes("data.bin", &b"content"[..]), "data.bin", b"content".to_vec()),
            (
                InputFile::reader("reader.dat", std::io::Cursor::new(b"stream".to_vec())),
                "reader.dat",
                b"stream".to_vec(),
            ),
            (InputFile::path(&path), "upload-1.txt", b"temp-data".to_vec()),
        ];

        for (file, expected_name, expected_content) in cases {
            assert!(file.needs_upload());
            assert!(file.send_data().is_err());

            let (name, mut reader) = file.upload_data().await.unwrap();
            assert_eq!(name, expected_name);

            let mut content = Vec::new();
            reader.read_to_end(&mut content).await.unwrap();
            assert_eq!(content, expected_content);
        }
    }

    #[tokio::test]
    async fn test_reference_variants() {
        let cases = vec![
            (InputFile::url("https://example.com/demo"), "https://example.com/demo"),
            (InputFile::file_id("ABC123"), "ABC123"),
            (InputFile::attach("attach://demo"), "attach://demo"),
        ];

        for (file, expected) in cases {
            assert!(!file.needs_upload());
            assert_eq!(file.send_data().unwrap(), expected);
            assert!(matches!(file.upload_data().await, Err(UploadError::Unsupported { .. })));
        }
    }

    #[tokio::test]
    async fn test_reader_is_single_shot_across_clones() {
        let file = InputFile::reader("once.bin", std::io::Cursor::new(b"once".to_vec()));
        let copy = file.clone();

        assert!(file.upload_data().await.is_ok());
        assert!(matches!(copy.upload_data().await, Err(UploadError::Consumed { name }) if name == "once.bin"));
        match &file {
            InputFile::Reader { reader, .. } => assert!(reader.is_consumed()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_serializes_references_only() {
        assert_eq!(serde_json::to_string(&InputFile::file_id("ABC")).unwrap(), "\"ABC\"");
        assert!(serde_json::to_string(&InputFile::bytes("a.bin", &b"a"[..])).is_err());
    }
}
