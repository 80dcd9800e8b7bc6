//! Rewrites user and assistant content into canonical input parts.
//!
//! The canonical tags are `input_text`, `input_image` and `input_file`. Legacy
//! encodings (bare strings, `image_url` as string or object, inline audio,
//! linked or inline files) are rewritten; parts that are already canonical or
//! not recognised are copied through unchanged.

use config::CoercionConfig;
use serde_json::{Map, Value, json};

use crate::decode::{Content, FileSource, ImageUrl, Part, decode_or_fallback};

pub(crate) struct ContentNormalizer<'a> {
    config: &'a CoercionConfig,
}

impl<'a> ContentNormalizer<'a> {
    pub fn new(config: &'a CoercionConfig) -> Self {
        Self { config }
    }

    /// Normalizes a raw `content` value.
    ///
    /// Returns `None` when the content is missing or `null`, which is left as is.
    /// A single part object stays a single part and is not wrapped in an array.
    pub fn normalize(&self, content: Option<&Value>) -> Option<Value> {
        match Content::from(content) {
            Content::Absent => None,
            Content::Text(text) => Some(json!([input_text(text)])),
            Content::Parts(parts) => Some(Value::Array(parts.iter().map(|part| self.part(part)).collect())),
            Content::Part(_) | Content::Scalar(_) => content.map(|part| self.part(part)),
        }
    }

    /// Returns a copy of `message` with its content normalized.
    pub fn message(&self, message: &Map<String, Value>) -> Map<String, Value> {
        let mut message = message.clone();

        if let Some(content) = self.normalize(message.get("content")) {
            message.insert("content".to_string(), content);
        }

        message
    }

    fn part(&self, raw: &Value) -> Value {
        decode_or_fallback(raw, Part::decode(raw), |part| match part {
            Part::Text(text) => input_text(text),
            Part::Image(ImageUrl::Url(url)) => json!({"type": "input_image", "image_url": url}),
            Part::Image(ImageUrl::Object { url, detail: None }) => json!({"type": "input_image", "image_url": url}),
            Part::Image(ImageUrl::Object {
                url,
                detail: Some(detail),
            }) => json!({"type": "input_image", "image_url": url, "detail": detail}),
            Part::Audio { data, format } => {
                let mime_type = self.config.audio.mime_type(format);
                json!({"type": "input_file", "file_url": data_url(&mime_type, data)})
            }
            Part::File(source) => self.file(source),
        })
    }

    fn file(&self, source: FileSource<'_>) -> Value {
        match source {
            FileSource::Id(id) => json!({"type": "input_file", "file_id": id}),
            FileSource::Url(url) => json!({"type": "input_file", "file_url": url}),
            FileSource::Inline { data, mime_type } => {
                let mime_type = mime_type.unwrap_or(self.config.files.default_mime_type.as_str());
                json!({"type": "input_file", "file_url": data_url(mime_type, data)})
            }
            FileSource::Missing => json!({"type": "input_file"}),
        }
    }
}

fn input_text(text: &str) -> Value {
    json!({"type": "input_text", "text": text})
}

fn data_url(mime_type: &str, data: &str) -> String {
    format!("data:{mime_type};base64,{data}")
}
