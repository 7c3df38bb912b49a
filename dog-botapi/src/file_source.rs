use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::AsyncRead;

use crate::{ByteReader, UploadError, UploadResult};

/// Where a file comes from, as far as the request body is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSourceKind {
    /// Content must be streamed as a binary part
    Upload,
    /// Identifier of a file the platform already stores
    FileId,
    /// Remote URL the platform fetches itself
    Url,
    /// `attach://` reference to another part of the same request
    Attach,
    /// Reference produced by a third-party `RequestFileData` implementation
    Inline,
}

/// An opened upload: the file name plus its content stream.
///
/// Whoever holds the descriptor owns the stream; dropping it closes the handle.
pub struct UploadDescriptor {
    name: String,
    reader: ByteReader,
}

impl UploadDescriptor {
    pub fn new<S: Into<String>>(name: S, reader: ByteReader) -> Self {
        Self {
            name: name.into(),
            reader,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_parts(self) -> (String, ByteReader) {
        (self.name, self.reader)
    }
}

impl fmt::Debug for UploadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type UploadFn = Box<dyn FnOnce() -> BoxFuture<'static, UploadResult<UploadDescriptor>> + Send>;
type ReferenceFn = Box<dyn FnOnce() -> UploadResult<String> + Send>;

enum Resolver {
    Upload(UploadFn),
    Reference(ReferenceFn),
}

/// A lazily resolved reference to one file.
///
/// Exactly one resolver is held and it matches the kind. Both accessors consume
/// the source, so a resolver runs at most once.
pub struct FileSource {
    kind: FileSourceKind,
    resolver: Resolver,
}

impl FileSource {
    pub(crate) fn upload_with<F, Fut>(open: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UploadResult<UploadDescriptor>> + Send + 'static,
    {
        Self {
            kind: FileSourceKind::Upload,
            resolver: Resolver::Upload(Box::new(move || open().boxed())),
        }
    }

    fn reference(kind: FileSourceKind, value: String) -> Self {
        Self {
            kind,
            resolver: Resolver::Reference(Box::new(move || Ok(value))),
        }
    }

    /// Upload in-memory bytes under the given file name
    pub fn from_bytes<S, B>(name: S, data: B) -> Self
    where
        S: Into<String>,
        B: Into<Bytes>,
    {
        let name = name.into();
        let data = data.into();
        Self::upload_with(move || {
            let reader: ByteReader = Box::new(std::io::Cursor::new(data));
            futures::future::ready(Ok(UploadDescriptor::new(name, reader)))
        })
    }

    /// Upload an already open stream
    pub fn from_reader<S, R>(name: S, reader: R) -> Self
    where
        S: Into<String>,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let name = name.into();
        Self::upload_with(move || {
            let reader: ByteReader = Box::new(reader);
            futures::future::ready(Ok(UploadDescriptor::new(name, reader)))
        })
    }

    /// Upload a local file. The file is only opened when the upload is.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        Self::upload_with(move || open_path(path))
    }

    pub fn from_url<S: Into<String>>(url: S) -> Self {
        Self::reference(FileSourceKind::Url, url.into())
    }

    pub fn from_file_id<S: Into<String>>(file_id: S) -> Self {
        Self::reference(FileSourceKind::FileId, file_id.into())
    }

    pub fn from_attach<S: Into<String>>(token: S) -> Self {
        Self::reference(FileSourceKind::Attach, token.into())
    }

    pub fn kind(&self) -> FileSourceKind {
        self.kind
    }

    pub fn kind_is_upload(&self) -> bool {
        self.kind == FileSourceKind::Upload
    }

    /// Run the upload resolver and hand its stream to the caller
    pub async fn open_upload(self) -> UploadResult<UploadDescriptor> {
        match self.resolver {
            Resolver::Upload(open) => open().await,
            Resolver::Reference(_) => Err(UploadError::unsupported("uploads")),
        }
    }

    /// Run the reference resolver
    pub fn reference_value(self) -> UploadResult<String> {
        match self.resolver {
            Resolver::Reference(resolve) => resolve(),
            Resolver::Upload(_) => Err(UploadError::unsupported("reference values")),
        }
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

async fn open_path(path: PathBuf) -> UploadResult<UploadDescriptor> {
    let handle = tokio::fs::File::open(&path).await?;
    let reader: ByteReader = Box::new(handle);
    Ok(UploadDescriptor::new(upload_name(&path), reader))
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Data for one file field of a request
#[async_trait]
pub trait RequestFileData: fmt::Debug + Send + Sync {
    /// Whether the content has to travel in the request body
    fn needs_upload(&self) -> bool;

    /// File name and content stream. Only valid when `needs_upload` is true.
    async fn upload_data(&self) -> UploadResult<(String, ByteReader)>;

    /// Inline value (URL, file ID, ...). Only valid when `needs_upload` is false.
    fn send_data(&self) -> UploadResult<String>;

    /// Precise source for implementations that know their own kind
    fn file_source(&self) -> Option<FileSource> {
        None
    }
}

/// Shared handle to request file data
pub type FileDataRef = Arc<dyn RequestFileData>;

/// Turn file data into a `FileSource`.
///
/// Implementations that expose `file_source` are used unchanged. Everything else is
/// adapted through `needs_upload`/`upload_data`/`send_data`, with the inline value
/// captured right away.
pub fn resolve_file_data(data: Option<&FileDataRef>) -> UploadResult<FileSource> {
    let data = data.ok_or(UploadError::MissingData)?;

    if let Some(source) = data.file_source() {
        return Ok(source);
    }

    if data.needs_upload() {
        let data = Arc::clone(data);
        return Ok(FileSource::upload_with(move || open_file_data(data)));
    }

    let value = data.send_data()?;
    Ok(FileSource::reference(FileSourceKind::Inline, value))
}

async fn open_file_data(data: FileDataRef) -> UploadResult<UploadDescriptor> {
    let (name, reader) = data.upload_data().await?;
    Ok(UploadDescriptor::new(name, reader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncReadExt;

    async fn read_all(descriptor: UploadDescriptor) -> Vec<u8> {
        let (_, mut reader) = descriptor.into_parts();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await.unwrap();
        content
    }

    #[derive(Debug)]
    struct GenericData {
        upload: bool,
        opened: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RequestFileData for GenericData {
        fn needs_upload(&self) -> bool {
            self.upload
        }

        async fn upload_data(&self) -> UploadResult<(String, ByteReader)> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(("generic.bin".to_string(), Box::new(std::io::Cursor::new(b"generic".to_vec()))))
        }

        fn send_data(&self) -> UploadResult<String> {
            Ok("generic-ref".to_string())
        }
    }

    #[tokio::test]
    async fn test_bytes_source_uploads_original_content() {
        let source = FileSource::from_bytes("data.bin", &b"content"[..]);
        assert!(source.kind_is_upload());

        let descriptor = source.open_upload().await.unwrap();
        assert_eq!(descriptor.name(), "data.bin");
        assert_eq!(read_all(descriptor).await, b"content");
    }

    #[test]
    fn test_bytes_source_has_no_reference() {
        let result = FileSource::from_bytes("data.bin", &b"content"[..]).reference_value();
        assert!(result.unwrap_err().is_unsupported());
    }

    #[tokio::test]
    async fn test_reference_sources_return_original_string() {
        let cases = vec![
            (FileSource::from_url("https://example.com/demo"), FileSourceKind::Url, "https://example.com/demo"),
            (FileSource::from_file_id("ABC123"), FileSourceKind::FileId, "ABC123"),
            (FileSource::from_attach("attach://demo"), FileSourceKind::Attach, "attach://demo"),
        ];

        for (source, kind, expected) in cases {
            assert_eq!(source.kind(), kind);
            assert!(!source.kind_is_upload());
            assert_eq!(source.reference_value().unwrap(), expected);
        }

        let upload = FileSource::from_file_id("ABC123").open_upload().await;
        assert!(upload.unwrap_err().is_unsupported());
    }

    #[tokio::test]
    async fn test_reader_source() {
        let source = FileSource::from_reader("reader.dat", std::io::Cursor::new(b"stream".to_vec()));
        let descriptor = source.open_upload().await.unwrap();
        assert_eq!(descriptor.name(), "reader.dat");
        assert_eq!(read_all(descriptor).await, b"stream");
    }

    #[tokio::test]
    async fn test_missing_path_fails_only_when_opened() {
        let source = FileSource::from_path("/definitely/not/here/upload.bin");
        assert!(source.kind_is_upload());

        match source.open_upload().await {
            Err(UploadError::Io { source }) => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_path_source_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.txt");
        std::fs::write(&path, b"temp-data").unwrap();

        let descriptor = FileSource::from_path(&path).open_upload().await.unwrap();
        assert_eq!(descriptor.name(), "upload.txt");
        assert_eq!(read_all(descriptor).await, b"temp-data");
    }

    #[test]
    fn test_resolve_missing_data() {
        assert!(matches!(resolve_file_data(None), Err(UploadError::MissingData)));
    }

    #[tokio::test]
    async fn test_resolve_adapts_generic_upload_lazily() {
        let opened = Arc::new(AtomicUsize::new(0));
        let data: FileDataRef = Arc::new(GenericData { upload: true, opened: opened.clone() });

        let source = resolve_file_data(Some(&data)).unwrap();
        assert_eq!(source.kind(), FileSourceKind::Upload);
        assert_eq!(opened.load(Ordering::SeqCst), 0);

        let descriptor = source.open_upload().await.unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(descriptor.name(), "generic.bin");
        assert_eq!(read_all(descriptor).await, b"generic");
    }

    #[test]
    fn test_resolve_adapts_generic_reference_as_inline() {
        let data: FileDataRef = Arc::new(GenericData {
            upload: false,
            opened: Arc::new(AtomicUsize::new(0)),
        });

        let source = resolve_file_data(Some(&data)).unwrap();
        assert_eq!(source.kind(), FileSourceKind::Inline);
        assert_eq!(source.reference_value().unwrap(), "generic-ref");
    }
}
