//! Closed views over raw chat JSON.
//!
//! Every raw value is classified into one of the variant sets below before any
//! field is read. Two decoding policies exist side by side:
//!
//! - [`decode_or_fail`] for structural shapes (messages, roles, tool calls):
//!   anything unrecognised rejects the whole coercion.
//! - [`decode_or_fallback`] for content parts: anything unrecognised is passed
//!   through as an untouched copy of the raw value.

use serde_json::{Map, Value};

use crate::error::{ClientPayloadError, Result};

/// Strict decoding. A shape outside the recognised set fails the coercion.
pub(crate) fn decode_or_fail<T>(decoded: Option<T>, error: impl FnOnce() -> ClientPayloadError) -> Result<T> {
    decoded.ok_or_else(|| {
        let error = error();
        log::debug!("Rejecting chat messages: {error}");

        error
    })
}

/// Permissive decoding. A shape outside the recognised set is copied through unchanged.
pub(crate) fn decode_or_fallback<T>(raw: &Value, decoded: Option<T>, encode: impl FnOnce(T) -> Value) -> Value {
    match decoded {
        Some(decoded) => encode(decoded),
        None => {
            log::trace!("Passing through unrecognised content part");
            raw.clone()
        }
    }
}

/// Roles a chat message may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
    Tool,
}

/// A chat message with a recognised role.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Message<'a> {
    pub role: Role,
    pub fields: &'a Map<String, Value>,
}

impl<'a> Message<'a> {
    pub fn decode(value: &'a Value) -> Result<Self> {
        let fields = decode_or_fail(value.as_object(), || ClientPayloadError::InvalidMessageShape)?;
        let role = decode_or_fail(fields.get("role").and_then(Value::as_str), || ClientPayloadError::MissingRole)?;
        let role = decode_or_fail(role.parse().ok(), || ClientPayloadError::UnsupportedRole(role.to_string()))?;

        Ok(Self { role, fields })
    }

    pub fn content(&self) -> Content<'a> {
        Content::from(self.fields.get("content"))
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.get(key)
    }
}

/// The shapes a message `content` field comes in.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Content<'a> {
    /// Missing or `null`.
    Absent,
    Text(&'a str),
    Part(&'a Map<String, Value>),
    Parts(&'a [Value]),
    /// Numbers and booleans.
    Scalar(&'a Value),
}

impl<'a> From<Option<&'a Value>> for Content<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Content::Absent,
            Some(Value::String(text)) => Content::Text(text),
            Some(Value::Object(part)) => Content::Part(part),
            Some(Value::Array(parts)) => Content::Parts(parts),
            Some(scalar) => Content::Scalar(scalar),
        }
    }
}

/// An `image_url` payload: a bare URL or an object carrying one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageUrl<'a> {
    Url(&'a str),
    Object { url: &'a str, detail: Option<&'a str> },
}

impl<'a> ImageUrl<'a> {
    fn decode(value: Option<&'a Value>) -> Option<Self> {
        match value? {
            Value::String(url) => Some(Self::Url(url)),
            Value::Object(image) => Some(Self::Object {
                url: image.get("url")?.as_str()?,
                detail: image.get("detail").and_then(Value::as_str),
            }),
            _ => None,
        }
    }
}

/// Where the bytes of a `file` part come from, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileSource<'a> {
    Id(&'a str),
    Url(&'a str),
    Inline { data: &'a str, mime_type: Option<&'a str> },
    Missing,
}

impl<'a> FileSource<'a> {
    fn decode(value: Option<&'a Value>) -> Self {
        let Some(file) = value.and_then(Value::as_object) else {
            return Self::Missing;
        };

        if let Some(id) = non_empty_str(file.get("file_id")) {
            return Self::Id(id);
        }

        if let Some(url) = non_empty_str(file.get("file_url")) {
            return Self::Url(url);
        }

        let data = file
            .get("file_data")
            .and_then(Value::as_str)
            .or_else(|| file.get("data").and_then(Value::as_str));

        match data {
            Some(data) => Self::Inline {
                data,
                mime_type: non_empty_str(file.get("mime_type")).or_else(|| non_empty_str(file.get("content_type"))),
            },
            None => Self::Missing,
        }
    }
}

/// Content parts the normalizer knows how to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Part<'a> {
    /// A bare string, or a `text`/`input_text` part with string text.
    Text(&'a str),
    Image(ImageUrl<'a>),
    Audio { data: &'a str, format: &'a str },
    File(FileSource<'a>),
}

impl<'a> Part<'a> {
    /// Classifies a content element. `None` means the element passes through
    /// as it is, either because it is already canonical or because its shape
    /// is not recognised.
    pub fn decode(value: &'a Value) -> Option<Self> {
        let part = match value {
            Value::String(text) => return Some(Self::Text(text)),
            Value::Object(part) => part,
            _ => return None,
        };

        match part_tag(part)? {
            "text" | "input_text" => part.get("text").and_then(Value::as_str).map(Self::Text),
            "image_url" => ImageUrl::decode(part.get("image_url")).map(Self::Image),
            "input_audio" => {
                let audio = part.get("input_audio")?.as_object()?;

                Some(Self::Audio {
                    data: audio.get("data")?.as_str()?,
                    format: audio.get("format")?.as_str()?,
                })
            }
            "file" => Some(Self::File(FileSource::decode(part.get("file")))),
            _ => None,
        }
    }
}

/// The tag of a content part object.
///
/// A non-empty string `type` is the tag. A missing, `null`, empty or `false`
/// `type` means `text` when the part has a `text` key, and no tag otherwise.
/// Any other `type` value yields no tag.
fn part_tag(part: &Map<String, Value>) -> Option<&str> {
    match part.get("type") {
        Some(Value::String(tag)) if !tag.is_empty() => Some(tag.as_str()),
        None | Some(Value::Null | Value::String(_) | Value::Bool(false)) => part.contains_key("text").then_some("text"),
        Some(_) => None,
    }
}

/// Tool call `arguments`: absent, pre-encoded, structured JSON or a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arguments<'a> {
    Missing,
    Encoded(&'a str),
    Structured(&'a Value),
    Scalar(&'a Value),
}

impl<'a> From<Option<&'a Value>> for Arguments<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Missing,
            Some(Value::String(encoded)) => Self::Encoded(encoded),
            Some(value @ (Value::Object(_) | Value::Array(_))) => Self::Structured(value),
            Some(scalar) => Self::Scalar(scalar),
        }
    }
}

/// An entry of an assistant message's `tool_calls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ToolCall<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub arguments: Arguments<'a>,
}

impl<'a> ToolCall<'a> {
    pub fn decode(value: &'a Value, index: usize) -> Result<Self> {
        let call = decode_or_fail(value.as_object(), || ClientPayloadError::InvalidToolCall {
            index,
            requirement: "be an object",
        })?;

        let id = decode_or_fail(non_empty_str(call.get("id")), || ClientPayloadError::MissingToolCallId {
            index: Some(index),
        })?;

        let function = decode_or_fail(call.get("function").and_then(Value::as_object), || {
            ClientPayloadError::InvalidToolCall {
                index,
                requirement: "include a 'function' object",
            }
        })?;

        let name = decode_or_fail(non_empty_str(function.get("name")), || {
            ClientPayloadError::MissingFunctionName { index }
        })?;

        Ok(Self {
            id,
            name,
            arguments: Arguments::from(function.get("arguments")),
        })
    }
}

/// Field names a tool message may carry its call identifier under, in precedence order.
const TOOL_CALL_ID_FIELDS: [&str; 3] = ["tool_call_id", "toolCallId", "call_id"];

/// Resolves the call identifier of a tool message.
pub(crate) fn tool_call_id<'a>(message: &Message<'a>) -> Result<&'a str> {
    let id = TOOL_CALL_ID_FIELDS
        .iter()
        .find_map(|field| non_empty_str(message.get(field)));

    decode_or_fail(id, || ClientPayloadError::MissingToolCallId { index: None })
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
