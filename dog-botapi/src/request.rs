use tracing::{debug, instrument};

use crate::{Fileable, MultipartEncoder, MultipartPayload, Params, UploadResult};

/// Body handed to the transport
#[derive(Debug)]
pub enum RequestBody {
    /// Plain form fields; nothing needs uploading
    Form(Params),
    Multipart(MultipartPayload),
}

#[derive(Debug)]
pub struct PreparedRequest {
    pub method: &'static str,
    pub body: RequestBody,
}

impl PreparedRequest {
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Assemble the body for `config`.
///
/// Reference-kind files are folded into the params first; a multipart body is only
/// built when at least one file must be uploaded.
#[instrument(skip_all, fields(method = config.method()))]
pub async fn prepare_request<C>(config: &C, encoder: &MultipartEncoder) -> UploadResult<PreparedRequest>
where
    C: Fileable + ?Sized,
{
    let method = config.method();
    let payload = config.file_payload()?;
    let params = payload.apply_inline(config.params()?);

    if !payload.needs_upload() {
        debug!(params = params.len(), "no uploads, sending as form");
        return Ok(PreparedRequest {
            method,
            body: RequestBody::Form(params),
        });
    }

    let multipart = encoder.encode(&params, payload.files_slice()).await?;
    Ok(PreparedRequest {
        method,
        body: RequestBody::Multipart(multipart),
    })
}
