//! Instruction text gathered from system and developer messages.

use serde_json::{Map, Value};

use crate::{
    decode::{Content, Role, decode_or_fail},
    error::{ClientPayloadError, Result},
};

/// Collects instruction text in message order.
#[derive(Debug, Default)]
pub(crate) struct Instructions {
    parts: Vec<String>,
}

impl Instructions {
    /// Validates that `content` is text-only and records its text.
    pub fn push(&mut self, role: Role, content: Content<'_>) -> Result<()> {
        if let Some(text) = text_only(role, content)?.filter(|text| !text.is_empty()) {
            self.parts.push(text);
        }

        Ok(())
    }

    /// Appends the collected text to `existing`, newline separated.
    pub fn merge(self, existing: &str) -> String {
        let extra = self.parts.join("\n");

        match (existing.is_empty(), extra.is_empty()) {
            (_, true) => existing.to_string(),
            (true, false) => extra,
            (false, false) => format!("{existing}\n{extra}"),
        }
    }
}

/// The text of system or developer content, rejecting anything but text parts.
///
/// Array content joins the non-empty texts of its elements with newlines.
fn text_only(role: Role, content: Content<'_>) -> Result<Option<String>> {
    match content {
        Content::Absent => Ok(None),
        Content::Text(text) => Ok(Some(text.to_string())),
        Content::Part(part) => text_part(role, part).map(|text| Some(text.to_string())),
        Content::Parts(parts) => {
            let mut texts = Vec::with_capacity(parts.len());

            for part in parts {
                let text = match part {
                    Value::String(text) => text.as_str(),
                    Value::Object(part) => text_part(role, part)?,
                    _ => return Err(non_text(role)),
                };

                if !text.is_empty() {
                    texts.push(text);
                }
            }

            Ok(Some(texts.join("\n")))
        }
        Content::Scalar(_) => Err(non_text(role)),
    }
}

/// The text of a part whose `type` is absent, `null` or `text`.
fn text_part<'a>(role: Role, part: &'a Map<String, Value>) -> Result<&'a str> {
    let is_text = match part.get("type") {
        None | Some(Value::Null) => true,
        Some(Value::String(tag)) => tag == "text",
        Some(_) => false,
    };

    let text = if is_text {
        part.get("text").and_then(Value::as_str)
    } else {
        None
    };

    decode_or_fail(text, || non_text(role))
}

fn non_text(role: Role) -> ClientPayloadError {
    ClientPayloadError::NonTextContent { role }
}
