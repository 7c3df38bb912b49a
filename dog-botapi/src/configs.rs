//! Request configs for the calls that carry files.
//!
//! Each config knows its method, its scalar params and its file fields. Media configs
//! put the rewritten media list into the `media` param and send only the uploads as
//! files.

use crate::media::{media_payload, prepare_input_media_for_files, prepare_input_media_for_params};
use crate::{
    payload_from_files, InputFile, InputMedia, InputPaidMedia, NamedFile, Params, UploadPayload,
    UploadResult,
};

/// A request that may carry files
pub trait Fileable: Send + Sync {
    /// Remote method name
    fn method(&self) -> &'static str;

    fn params(&self) -> UploadResult<Params>;

    fn files(&self) -> Vec<NamedFile>;

    /// Partition `files` into uploads and inline values
    fn file_payload(&self) -> UploadResult<UploadPayload> {
        payload_from_files(self.files())
    }
}

/// Fields shared by every request sent to a chat
#[derive(Debug, Clone, Default)]
pub struct BaseChat {
    pub chat_id: String,
    pub message_thread_id: Option<i64>,
    pub disable_notification: bool,
    pub protect_content: bool,
}

impl BaseChat {
    pub fn new<C: ToString>(chat_id: C) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            ..Default::default()
        }
    }

    pub fn params(&self) -> Params {
        let mut params = Params::new();
        params.add_non_empty("chat_id", &self.chat_id);
        params.add_optional("message_thread_id", self.message_thread_id);
        params.add_bool("disable_notification", self.disable_notification);
        params.add_bool("protect_content", self.protect_content);
        params
    }
}

#[derive(Debug, Clone)]
pub struct DocumentConfig {
    pub base: BaseChat,
    pub document: InputFile,
    pub thumbnail: Option<InputFile>,
    pub caption: Option<String>,
    pub parse_mode: Option<String>,
    pub disable_content_type_detection: bool,
}

impl DocumentConfig {
    pub fn new<C: ToString>(chat_id: C, document: InputFile) -> Self {
        Self {
            base: BaseChat::new(chat_id),
            document,
            thumbnail: None,
            caption: None,
            parse_mode: None,
            disable_content_type_detection: false,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: InputFile) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl Fileable for DocumentConfig {
    fn method(&self) -> &'static str {
        "sendDocument"
    }

    fn params(&self) -> UploadResult<Params> {
        let mut params = self.base.params();
        params.add_optional("caption", self.caption.as_deref());
        params.add_optional("parse_mode", self.parse_mode.as_deref());
        params.add_bool(
            "disable_content_type_detection",
            self.disable_content_type_detection,
        );
        Ok(params)
    }

    fn files(&self) -> Vec<NamedFile> {
        let mut files = vec![NamedFile::new("document", self.document.clone().into_ref())];
        if let Some(thumbnail) = &self.thumbnail {
            files.push(NamedFile::new("thumbnail", thumbnail.clone().into_ref()));
        }
        files
    }
}

#[derive(Debug, Clone)]
pub struct MediaGroupConfig {
    pub base: BaseChat,
    pub media: Vec<InputMedia>,
}

impl MediaGroupConfig {
    pub fn new<C: ToString>(chat_id: C, media: Vec<InputMedia>) -> Self {
        Self {
            base: BaseChat::new(chat_id),
            media,
        }
    }
}

impl Fileable for MediaGroupConfig {
    fn method(&self) -> &'static str {
        "sendMediaGroup"
    }

    fn params(&self) -> UploadResult<Params> {
        let mut params = self.base.params();
        params.add_interface("media", &prepare_input_media_for_params(&self.media))?;
        Ok(params)
    }

    fn files(&self) -> Vec<NamedFile> {
        prepare_input_media_for_files(&self.media)
    }

    fn file_payload(&self) -> UploadResult<UploadPayload> {
        media_payload(&self.media)
    }
}

/// Replaces the media of a sent message, addressed either by chat and message or
/// by inline message
#[derive(Debug, Clone)]
pub struct EditMessageMediaConfig {
    pub chat_id: Option<String>,
    pub message_id: Option<i64>,
    pub inline_message_id: Option<String>,
    pub media: InputMedia,
}

impl EditMessageMediaConfig {
    pub fn new<C: ToString>(chat_id: C, message_id: i64, media: InputMedia) -> Self {
        Self {
            chat_id: Some(chat_id.to_string()),
            message_id: Some(message_id),
            inline_message_id: None,
            media,
        }
    }

    pub fn inline<S: Into<String>>(inline_message_id: S, media: InputMedia) -> Self {
        Self {
            chat_id: None,
            message_id: None,
            inline_message_id: Some(inline_message_id.into()),
            media,
        }
    }

    fn media_list(&self) -> [InputMedia; 1] {
        [self.media.clone()]
    }
}

impl Fileable for EditMessageMediaConfig {
    fn method(&self) -> &'static str {
        "editMessageMedia"
    }

    fn params(&self) -> UploadResult<Params> {
        let mut params = Params::new();
        params.add_optional("chat_id", self.chat_id.as_deref());
        params.add_optional("message_id", self.message_id);
        params.add_optional("inline_message_id", self.inline_message_id.as_deref());

        // A single object, not a list
        if let Some(media) = prepare_input_media_for_params(&self.media_list()).first() {
            params.add_interface("media", media)?;
        }
        Ok(params)
    }

    fn files(&self) -> Vec<NamedFile> {
        prepare_input_media_for_files(&self.media_list())
    }

    fn file_payload(&self) -> UploadResult<UploadPayload> {
        media_payload(&self.media_list())
    }
}

#[derive(Debug, Clone)]
pub struct PaidMediaConfig {
    pub base: BaseChat,
    pub star_count: i64,
    pub media: Vec<InputPaidMedia>,
    pub caption: Option<String>,
    pub parse_mode: Option<String>,
    pub show_caption_above_media: bool,
    /// Bot-defined payload, not shown to the user
    pub payload: Option<String>,
}

impl PaidMediaConfig {
    pub fn new<C: ToString>(chat_id: C, star_count: i64, media: Vec<InputPaidMedia>) -> Self {
        Self {
            base: BaseChat::new(chat_id),
            star_count,
            media,
            caption: None,
            parse_mode: None,
            show_caption_above_media: false,
            payload: None,
        }
    }

    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = Some(caption.into());
        self
    }

    fn media_list(&self) -> Vec<InputMedia> {
        self.media.iter().cloned().map(InputMedia::Paid).collect()
    }
}

impl Fileable for PaidMediaConfig {
    fn method(&self) -> &'static str {
        "sendPaidMedia"
    }

    fn params(&self) -> UploadResult<Params> {
        let mut params = self.base.params();
        params.add_non_zero("star_count", self.star_count);
        params.add_optional("caption", self.caption.as_deref());
        params.add_optional("parse_mode", self.parse_mode.as_deref());
        params.add_bool("show_caption_above_media", self.show_caption_above_media);
        params.add_optional("payload", self.payload.as_deref());
        params.add_interface("media", &prepare_input_media_for_params(&self.media_list()))?;
        Ok(params)
    }

    fn files(&self) -> Vec<NamedFile> {
        prepare_input_media_for_files(&self.media_list())
    }

    fn file_payload(&self) -> UploadResult<UploadPayload> {
        media_payload(&self.media_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InputMediaPhoto, InputMediaVideo, RequestFileData};

    #[test]
    fn test_base_chat_params() {
        let mut base = BaseChat::new(-100123);
        base.message_thread_id = Some(9);
        base.protect_content = true;

        let params = base.params();
        assert_eq!(params.get("chat_id"), Some("-100123"));
        assert_eq!(params.get("message_thread_id"), Some("9"));
        assert_eq!(params.get("protect_content"), Some("true"));
        assert!(!params.contains_key("disable_notification"));
    }

    #[test]
    fn test_document_files_include_optional_thumbnail() {
        let bare = DocumentConfig::new(1, InputFile::file_id("doc-id"));
        assert_eq!(bare.files().len(), 1);

        let config = DocumentConfig::new(1, InputFile::bytes("a.pdf", &b"%PDF"[..]))
            .with_thumbnail(InputFile::url("https://example.com/t.jpg"))
            .with_caption("report");

        let names: Vec<String> = config.files().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["document", "thumbnail"]);
        assert_eq!(config.params().unwrap().get("caption"), Some("report"));
    }

    #[test]
    fn test_edit_media_param_is_a_single_object() {
        let config = EditMessageMediaConfig::inline(
            "inline-1",
            InputMedia::Photo(InputMediaPhoto::new(InputFile::bytes("new.jpg", &b"new"[..]))),
        );

        let params = config.params().unwrap();
        let media: serde_json::Value = serde_json::from_str(params.get("media").unwrap()).unwrap();

        assert_eq!(params.get("inline_message_id"), Some("inline-1"));
        assert!(!params.contains_key("chat_id"));
        assert_eq!(media["type"], "photo");
        assert_eq!(media["media"], "attach://file-0");
        assert_eq!(config.file_payload().unwrap().files_slice()[0].name, "file-0");
    }

    #[test]
    fn test_paid_media_params() {
        let config = PaidMediaConfig::new(
            42,
            25,
            vec![
                InputPaidMedia::photo(InputMediaPhoto::new(InputFile::file_id("photo-id"))),
                InputPaidMedia::video(InputMediaVideo::new(InputFile::bytes("v.mp4", &b"v"[..]))),
            ],
        )
        .with_caption("unlock");

        let params = config.params().unwrap();
        let media: serde_json::Value = serde_json::from_str(params.get("media").unwrap()).unwrap();

        assert_eq!(config.method(), "sendPaidMedia");
        assert_eq!(params.get("star_count"), Some("25"));
        assert_eq!(media[0]["media"], "photo-id");
        assert_eq!(media[1]["media"], "attach://file-1");

        let payload = config.file_payload().unwrap();
        assert_eq!(payload.files_slice().len(), 1);
        assert_eq!(payload.files_slice()[0].name, "file-1");
        assert!(payload.files_slice()[0].data.needs_upload());
    }
}
