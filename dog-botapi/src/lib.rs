//! # dog-botapi: File uploads and multipart assembly for bot API requests
//!
//! `dog-botapi` turns a request's files into what the transport sends: plain form
//! fields when every file is a reference, or a streamed `multipart/form-data` body
//! when something must be uploaded.
//!
//! ## Key Features
//!
//! - **One file type, many origins**: bytes, open streams, local paths, URLs, file IDs
//! - **Lazy resolution**: paths are opened only when the body is encoded
//! - **Streaming bodies**: file content is read chunk by chunk as the body is polled
//! - **Media groups**: several uploads in one request, cited through `attach://` tokens
//! - **Transport agnostic**: the output is a method name plus a body; sending it is up to you
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_botapi::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> UploadResult<()> {
//! let config = MediaGroupConfig::new(
//!     "@channel",
//!     vec![
//!         InputMedia::Photo(InputMediaPhoto::new(InputFile::bytes("cat.jpg", &b"jpeg"[..]))),
//!         InputMedia::Photo(InputMediaPhoto::new(InputFile::file_id("AgADBAAD"))),
//!     ],
//! );
//!
//! let request = prepare_request(&config, &MultipartEncoder::default()).await?;
//! if let RequestBody::Multipart(payload) = request.body {
//!     let content_type = payload.content_type().to_string();
//!     let body = payload.into_bytes().await?;
//!     # let _ = (content_type, body);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Request config  │  ← params + file fields
//! ├──────────────────┤
//! │  Media rewriter  │  ← attach:// tokens for media lists
//! ├──────────────────┤
//! │  UploadPayload   │  ← uploads vs inline values
//! ├──────────────────┤
//! │ MultipartEncoder │  ← resolves, opens, streams
//! └──────────────────┘
//! ```

mod config;
pub mod configs;
mod error;
mod file_source;
mod input_file;
pub mod media;
mod multipart;
mod params;
mod payload;
mod request;
mod types;

// Re-export main types for clean API
pub use config::MultipartConfig;
pub use configs::{
    BaseChat, DocumentConfig, EditMessageMediaConfig, Fileable, MediaGroupConfig, PaidMediaConfig,
};
pub use error::{UploadError, UploadResult};
pub use file_source::{
    resolve_file_data, FileDataRef, FileSource, FileSourceKind, RequestFileData, UploadDescriptor,
};
pub use input_file::{InputFile, SharedReader};
pub use media::{
    attach_field_name, attach_token, clone_media_list, prepare_input_media,
    prepare_input_media_for_files, prepare_input_media_for_params, InputMedia,
    InputMediaAnimation, InputMediaAudio, InputMediaDocument, InputMediaPhoto, InputMediaVideo,
    InputPaidMedia, MediaSlot, ATTACH_SCHEME,
};
pub use multipart::{build_multipart_payload, MultipartEncoder, MultipartPayload};
pub use params::Params;
pub use payload::{payload_from_files, NamedFile, UploadPayload};
pub use request::{prepare_request, PreparedRequest, RequestBody};
pub use types::{Boundary, ByteReader, ByteStream};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        prepare_request, DocumentConfig, Fileable, InputFile, InputMedia, InputMediaPhoto,
        InputMediaVideo, MediaGroupConfig, MultipartConfig, MultipartEncoder, NamedFile, Params,
        RequestBody, RequestFileData, UploadError, UploadResult,
    };
}
