use std::collections::HashMap;

use tracing::debug;

use crate::{resolve_file_data, FileDataRef, Params, UploadResult};

/// A file field awaiting resolution by the encoder
#[derive(Debug, Clone)]
pub struct NamedFile {
    pub name: String,
    pub data: FileDataRef,
}

impl NamedFile {
    pub fn new<S: Into<String>>(name: S, data: FileDataRef) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// File fields of one request, split into binary attachments and inline values.
///
/// Binary attachments keep their insertion order; the inline map does not.
#[derive(Debug, Clone, Default)]
pub struct UploadPayload {
    files: Vec<NamedFile>,
    inline: HashMap<String, String>,
}

impl UploadPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file field. `None` is skipped.
    ///
    /// Uploads are queued as attachments; references are resolved now and stored
    /// inline, replacing any earlier value for the same field. Resolution errors
    /// are returned rather than dropping the field.
    pub fn add<S: Into<String>>(&mut self, field: S, data: Option<FileDataRef>) -> UploadResult<()> {
        let Some(data) = data else {
            return Ok(());
        };
        let field = field.into();

        let source = resolve_file_data(Some(&data))?;
        if source.kind_is_upload() {
            debug!(field = %field, "queued binary attachment");
            self.files.push(NamedFile::new(field, data));
            return Ok(());
        }

        let kind = source.kind();
        let value = source.reference_value()?;
        debug!(field = %field, kind = ?kind, "folded file reference inline");
        self.inline.insert(field, value);
        Ok(())
    }

    /// Like `add`, but a field that does not need uploading is dropped entirely
    pub fn add_upload_only<S: Into<String>>(
        &mut self,
        field: S,
        data: Option<FileDataRef>,
    ) -> UploadResult<()> {
        let Some(data) = data else {
            return Ok(());
        };
        let field = field.into();

        if resolve_file_data(Some(&data))?.kind_is_upload() {
            debug!(field = %field, "queued binary attachment");
            self.files.push(NamedFile::new(field, data));
        } else {
            debug!(field = %field, "skipped reference for upload-only field");
        }
        Ok(())
    }

    pub fn needs_upload(&self) -> bool {
        !self.files.is_empty()
    }

    /// Binary attachments in insertion order
    pub fn files_slice(&self) -> &[NamedFile] {
        &self.files
    }

    pub fn inline(&self) -> &HashMap<String, String> {
        &self.inline
    }

    /// Merge inline values into `params`, overwriting same-named entries
    pub fn apply_inline(&self, mut params: Params) -> Params {
        if self.inline.is_empty() {
            return params;
        }

        for (key, value) in &self.inline {
            params.insert(key.clone(), value.clone());
        }
        params
    }
}

/// Build a payload from a plain list of file fields
pub fn payload_from_files<I>(files: I) -> UploadResult<UploadPayload>
where
    I: IntoIterator<Item = NamedFile>,
{
    let mut payload = UploadPayload::new();
    for file in files {
        payload.add(file.name, Some(file.data))?;
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByteReader, InputFile, RequestFileData, UploadError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct BrokenReference;

    #[async_trait]
    impl RequestFileData for BrokenReference {
        fn needs_upload(&self) -> bool {
            false
        }

        async fn upload_data(&self) -> UploadResult<(String, ByteReader)> {
            Err(UploadError::unsupported("uploads"))
        }

        fn send_data(&self) -> UploadResult<String> {
            Err(UploadError::MissingData)
        }
    }

    #[test]
    fn test_upload_payload_builder() {
        let mut payload = UploadPayload::new();

        payload.add("photo", Some(InputFile::bytes("pic.jpg", &b"data"[..]).into_ref())).unwrap();
        payload.add("thumb", Some(InputFile::file_id("file-id").into_ref())).unwrap();
        payload.add_upload_only("skip", Some(InputFile::file_id("unused").into_ref())).unwrap();

        assert!(payload.needs_upload());

        let files = payload.files_slice();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "photo");

        let params = payload.apply_inline(Params::new());
        assert_eq!(params.get("thumb"), Some("file-id"));
        assert!(!params.contains_key("skip"));
    }

    #[test]
    fn test_absent_data_is_a_no_op() {
        let mut payload = UploadPayload::new();
        payload.add("thumbnail", None).unwrap();
        payload.add_upload_only("thumbnail", None).unwrap();

        assert!(!payload.needs_upload());
        assert!(payload.files_slice().is_empty());
        assert!(payload.inline().is_empty());
    }

    #[test]
    fn test_interleaved_fields_keep_order_and_last_inline_value() {
        let mut payload = UploadPayload::new();
        payload.add("a", Some(InputFile::bytes("a.bin", &b"a"[..]).into_ref())).unwrap();
        payload.add("ref", Some(InputFile::file_id("first").into_ref())).unwrap();
        payload.add("b", Some(InputFile::path("/tmp/never-opened.bin").into_ref())).unwrap();
        payload.add("url", Some(InputFile::url("https://example.com/x").into_ref())).unwrap();
        payload.add("ref", Some(InputFile::file_id("second").into_ref())).unwrap();
        payload.add("c", Some(InputFile::bytes("c.bin", &b"c"[..]).into_ref())).unwrap();

        let names: Vec<&str> = payload.files_slice().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        assert_eq!(payload.inline().len(), 2);
        assert_eq!(payload.inline().get("ref").map(String::as_str), Some("second"));
        assert_eq!(
            payload.inline().get("url").map(String::as_str),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn test_apply_inline_without_values_keeps_params() {
        let mut params = Params::new();
        params.insert("text", "hello");

        let merged = UploadPayload::new().apply_inline(params.clone());
        assert_eq!(merged, params);
    }

    #[test]
    fn test_resolution_errors_propagate() {
        let mut payload = UploadPayload::new();
        let result = payload.add("broken", Some(Arc::new(BrokenReference) as FileDataRef));

        assert!(matches!(result, Err(UploadError::MissingData)));
        assert!(payload.inline().is_empty());
    }

    #[test]
    fn test_payload_from_files() {
        let payload = payload_from_files(vec![
            NamedFile::new("document", InputFile::bytes("doc.pdf", &b"%PDF"[..]).into_ref()),
            NamedFile::new("thumbnail", InputFile::file_id("thumb-id").into_ref()),
        ])
        .unwrap();

        assert_eq!(payload.files_slice().len(), 1);
        assert_eq!(payload.inline().get("thumbnail").map(String::as_str), Some("thumb-id"));
    }

    #[test]
    #[traced_test]
    fn test_partition_is_logged() {
        let mut payload = UploadPayload::new();
        payload.add("thumb", Some(InputFile::file_id("file-id").into_ref())).unwrap();

        assert!(logs_contain("folded file reference inline"));
        assert!(!logs_contain("file-id"));
    }
}
