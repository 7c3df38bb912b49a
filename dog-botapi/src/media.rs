//! Media items sent in groups, and the rewriting that lets several uploads travel in
//! one request.
//!
//! Structured media values reference their binary parts through `attach://` tokens.
//! The tokens are positional: item `i` uploads its primary file as `file-{i}` and its
//! thumbnail as `file-{i}-thumb`.

use serde::{Serialize, Serializer};

use crate::{FileDataRef, InputFile, NamedFile, RequestFileData, UploadPayload, UploadResult};

/// Scheme prefix the platform resolves against the parts of the same request
pub const ATTACH_SCHEME: &str = "attach://";

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMediaPhoto {
    pub media: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub show_caption_above_media: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub has_spoiler: bool,
}

impl InputMediaPhoto {
    pub fn new(media: InputFile) -> Self {
        Self {
            media,
            caption: None,
            parse_mode: None,
            show_caption_above_media: false,
            has_spoiler: false,
        }
    }

    pub fn with_caption<S: Into<String>>(mut self, caption: S) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_spoiler(mut self) -> Self {
        self.has_spoiler = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMediaVideo {
    pub media: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub show_caption_above_media: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub supports_streaming: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub has_spoiler: bool,
}

impl InputMediaVideo {
    pub fn new(media: InputFile) -> Self {
        Self {
            media,
            thumbnail: None,
            caption: None,
            parse_mode: None,
            show_caption_above_media: false,
            width: None,
            height: None,
            duration: None,
            supports_streaming: false,
            has_spoiler: false,
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

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.supports_streaming = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMediaAnimation {
    pub media: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub show_caption_above_media: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "is_false")]
    pub has_spoiler: bool,
}

impl InputMediaAnimation {
    pub fn new(media: InputFile) -> Self {
        Self {
            media,
            thumbnail: None,
            caption: None,
            parse_mode: None,
            show_caption_above_media: false,
            width: None,
            height: None,
            duration: None,
            has_spoiler: false,
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

#[derive(Debug, Clone, Serialize)]
pub struct InputMediaAudio {
    pub media: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl InputMediaAudio {
    pub fn new(media: InputFile) -> Self {
        Self {
            media,
            thumbnail: None,
            caption: None,
            parse_mode: None,
            duration: None,
            performer: None,
            title: None,
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

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InputMediaDocument {
    pub media: InputFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<InputFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub disable_content_type_detection: bool,
}

impl InputMediaDocument {
    pub fn new(media: InputFile) -> Self {
        Self {
            media,
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

/// One item of a media list
#[derive(Debug, Clone)]
pub enum InputMedia {
    Photo(InputMediaPhoto),
    Video(InputMediaVideo),
    Animation(InputMediaAnimation),
    Audio(InputMediaAudio),
    Document(InputMediaDocument),
    Paid(InputPaidMedia),
}

impl InputMedia {
    /// Value of the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Photo(_) => "photo",
            Self::Video(_) => "video",
            Self::Animation(_) => "animation",
            Self::Audio(_) => "audio",
            Self::Document(_) => "document",
            Self::Paid(paid) => paid.inner().kind(),
        }
    }

    pub fn media(&self) -> &InputFile {
        match self {
            Self::Photo(m) => &m.media,
            Self::Video(m) => &m.media,
            Self::Animation(m) => &m.media,
            Self::Audio(m) => &m.media,
            Self::Document(m) => &m.media,
            Self::Paid(paid) => paid.inner().media(),
        }
    }

    pub fn thumbnail(&self) -> Option<&InputFile> {
        match self {
            Self::Photo(_) => None,
            Self::Video(m) => m.thumbnail.as_ref(),
            Self::Animation(m) => m.thumbnail.as_ref(),
            Self::Audio(m) => m.thumbnail.as_ref(),
            Self::Document(m) => m.thumbnail.as_ref(),
            Self::Paid(paid) => paid.inner().thumbnail(),
        }
    }

    pub fn set_media(&mut self, media: InputFile) {
        match self {
            Self::Photo(m) => m.media = media,
            Self::Video(m) => m.media = media,
            Self::Animation(m) => m.media = media,
            Self::Audio(m) => m.media = media,
            Self::Document(m) => m.media = media,
            Self::Paid(paid) => paid.media.set_media(media),
        }
    }

    /// Replace the thumbnail. Photos carry none, so the value is dropped for them.
    pub fn set_thumbnail(&mut self, thumbnail: InputFile) {
        match self {
            Self::Photo(_) => {}
            Self::Video(m) => m.thumbnail = Some(thumbnail),
            Self::Animation(m) => m.thumbnail = Some(thumbnail),
            Self::Audio(m) => m.thumbnail = Some(thumbnail),
            Self::Document(m) => m.thumbnail = Some(thumbnail),
            Self::Paid(paid) => paid.media.set_thumbnail(thumbnail),
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    item: &'a T,
}

impl Serialize for InputMedia {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Photo(item) => Tagged { kind, item }.serialize(serializer),
            Self::Video(item) => Tagged { kind, item }.serialize(serializer),
            Self::Animation(item) => Tagged { kind, item }.serialize(serializer),
            Self::Audio(item) => Tagged { kind, item }.serialize(serializer),
            Self::Document(item) => Tagged { kind, item }.serialize(serializer),
            Self::Paid(paid) => paid.serialize(serializer),
        }
    }
}

/// Paid media wraps a photo or video. Captions belong to the enclosing request.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct InputPaidMedia {
    media: Box<InputMedia>,
}

impl InputPaidMedia {
    pub fn photo(mut photo: InputMediaPhoto) -> Self {
        photo.caption = None;
        photo.parse_mode = None;
        photo.show_caption_above_media = false;
        photo.has_spoiler = false;
        Self {
            media: Box::new(InputMedia::Photo(photo)),
        }
    }

    pub fn video(mut video: InputMediaVideo) -> Self {
        video.caption = None;
        video.parse_mode = None;
        video.show_caption_above_media = false;
        video.has_spoiler = false;
        Self {
            media: Box::new(InputMedia::Video(video)),
        }
    }

    pub fn inner(&self) -> &InputMedia {
        &self.media
    }
}

impl From<InputPaidMedia> for InputMedia {
    fn from(paid: InputPaidMedia) -> Self {
        Self::Paid(paid)
    }
}

/// Which file of a media item an attachment carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaSlot {
    Primary,
    Thumbnail,
}

/// Part name for the file at `index`. The params rewrite and the file list both use it.
pub fn attach_field_name(index: usize, slot: MediaSlot) -> String {
    match slot {
        MediaSlot::Primary => format!("file-{}", index),
        MediaSlot::Thumbnail => format!("file-{}-thumb", index),
    }
}

pub fn attach_token(index: usize, slot: MediaSlot) -> String {
    format!("{}{}", ATTACH_SCHEME, attach_field_name(index, slot))
}

/// Deep copy of a media list; nested paid media gets its own allocation
pub fn clone_media_list(media: &[InputMedia]) -> Vec<InputMedia> {
    media.to_vec()
}

/// Copy of `media` with every uploadable file replaced by its attach token
pub fn prepare_input_media_for_params(media: &[InputMedia]) -> Vec<InputMedia> {
    let mut rewritten = clone_media_list(media);

    for (index, item) in rewritten.iter_mut().enumerate() {
        if item.media().needs_upload() {
            item.set_media(InputFile::attach(attach_token(index, MediaSlot::Primary)));
        }

        if item.thumbnail().is_some_and(|thumb| thumb.needs_upload()) {
            item.set_thumbnail(InputFile::attach(attach_token(index, MediaSlot::Thumbnail)));
        }
    }

    rewritten
}

/// Uploads of `media`, named after the tokens `prepare_input_media_for_params` mints
pub fn prepare_input_media_for_files(media: &[InputMedia]) -> Vec<NamedFile> {
    let mut files = Vec::new();

    for (index, item) in media.iter().enumerate() {
        if item.media().needs_upload() {
            files.push(NamedFile::new(
                attach_field_name(index, MediaSlot::Primary),
                file_ref(item.media()),
            ));
        }

        if let Some(thumb) = item.thumbnail().filter(|thumb| thumb.needs_upload()) {
            files.push(NamedFile::new(
                attach_field_name(index, MediaSlot::Thumbnail),
                file_ref(thumb),
            ));
        }
    }

    files
}

fn file_ref(file: &InputFile) -> FileDataRef {
    file.clone().into_ref()
}

/// Upload-only payload for a media list
pub fn media_payload(media: &[InputMedia]) -> UploadResult<UploadPayload> {
    let mut payload = UploadPayload::new();
    for file in prepare_input_media_for_files(media) {
        payload.add_upload_only(file.name, Some(file.data))?;
    }
    Ok(payload)
}

/// Rewritten list for the params plus the matching upload payload
pub fn prepare_input_media(media: &[InputMedia]) -> UploadResult<(Vec<InputMedia>, UploadPayload)> {
    let payload = media_payload(media)?;
    Ok((prepare_input_media_for_params(media), payload))
}
