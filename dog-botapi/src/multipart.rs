use std::fmt;
use std::io;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument, warn};

use crate::{
    resolve_file_data, Boundary, ByteStream, MultipartConfig, NamedFile, Params, UploadDescriptor,
    UploadError, UploadResult,
};

enum Part {
    Text { name: String, value: String },
    File { name: String, descriptor: UploadDescriptor },
}

/// Encodes params and named files as a `multipart/form-data` body.
///
/// Every named file is resolved during `encode`. Uploads are opened there too, so a
/// missing file fails the call instead of the body. Content is only read as the body
/// is polled, and each descriptor is dropped once its content is streamed or the body
/// is dropped.
#[derive(Debug, Clone, Default)]
pub struct MultipartEncoder {
    config: MultipartConfig,
}

impl MultipartEncoder {
    pub fn new(config: MultipartConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MultipartConfig {
        &self.config
    }

    #[instrument(skip_all, fields(params = params.len(), files = files.len()))]
    pub async fn encode(&self, params: &Params, files: &[NamedFile]) -> UploadResult<MultipartPayload> {
        let boundary = Boundary::generate(self.config.boundary_bytes);
        debug!(boundary = %boundary, "encoding multipart body");

        let mut parts = Vec::with_capacity(params.len() + files.len());
        for (name, value) in params.iter() {
            parts.push(Part::Text {
                name: name.to_string(),
                value: value.to_string(),
            });
        }

        // On any error below, `parts` is dropped and closes what was opened so far.
        for file in files {
            let source = resolve_file_data(Some(&file.data))?;

            if !source.kind_is_upload() {
                parts.push(Part::Text {
                    name: file.name.clone(),
                    value: source.reference_value()?,
                });
                continue;
            }

            let descriptor = match source.open_upload().await {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    warn!(field = %file.name, error = %err, "failed to open upload");
                    return Err(err);
                }
            };
            debug!(field = %file.name, file_name = %descriptor.name(), "opened upload");

            parts.push(Part::File {
                name: file.name.clone(),
                descriptor,
            });
        }

        let content_type = format!("multipart/form-data; boundary={}", boundary);
        let body = encode_parts(parts, boundary.clone(), self.config.clone());

        Ok(MultipartPayload {
            content_type,
            boundary,
            body,
        })
    }
}

/// Encode with the default configuration
pub async fn build_multipart_payload(
    params: &Params,
    files: &[NamedFile],
) -> UploadResult<MultipartPayload> {
    MultipartEncoder::default().encode(params, files).await
}

fn encode_parts(parts: Vec<Part>, boundary: Boundary, config: MultipartConfig) -> ByteStream {
    let stream = async_stream::stream! {
        for part in parts {
            match part {
                Part::Text { name, value } => {
                    yield Ok::<Bytes, io::Error>(Bytes::from(text_part_header(&boundary, &name)));
                    yield Ok(Bytes::from(value));
                }
                Part::File { name, descriptor } => {
                    let (file_name, reader) = descriptor.into_parts();
                    yield Ok(Bytes::from(file_part_header(
                        &boundary,
                        &name,
                        &file_name,
                        &config.file_content_type,
                    )));

                    let mut content = ReaderStream::with_capacity(reader, config.chunk_size.max(1));
                    while let Some(chunk) = content.next().await {
                        match chunk {
                            Ok(chunk) => {
                                yield Ok(chunk);
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }
            }
            yield Ok(Bytes::from_static(b"\r\n"));
        }
        yield Ok(Bytes::from(format!("--{}--\r\n", boundary)));
    };
    Box::pin(stream)
}

/// Percent-encode the characters that would end a quoted header value or the header line
fn escape_header_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            '"' => escaped.push_str("%22"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn text_part_header(boundary: &Boundary, name: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
        boundary,
        escape_header_value(name)
    )
}

fn file_part_header(boundary: &Boundary, name: &str, file_name: &str, content_type: &str) -> String {
    format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        boundary,
        escape_header_value(name),
        escape_header_value(file_name),
        content_type
    )
}

/// An encoded request body and the content type announcing its boundary
pub struct MultipartPayload {
    content_type: String,
    boundary: Boundary,
    body: ByteStream,
}

impl MultipartPayload {
    /// Value for the `Content-Type` header
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }

    /// Stream the body into `writer`, returning the number of bytes written.
    ///
    /// Failures reading file content surface as `Io`, failures writing as `Encoding`.
    pub async fn write_to<W>(self, writer: &mut W) -> UploadResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut body = self.body;
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(UploadError::encoding)?;
            written += chunk.len() as u64;
        }

        writer.flush().await.map_err(UploadError::encoding)?;
        Ok(written)
    }

    /// Collect the whole body in memory
    pub async fn into_bytes(self) -> UploadResult<Bytes> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

impl fmt::Debug for MultipartPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartPayload")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
