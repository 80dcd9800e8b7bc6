//! Assistant tool calls and tool results.

use serde_json::Value;

use crate::{
    content::ContentNormalizer,
    decode::{Arguments, Content, Message, ToolCall, tool_call_id},
    error::Result,
    item::{FunctionCallItem, FunctionCallOutputItem, InputItem},
};

/// Converts a tool message into a function call output item.
pub(crate) fn tool_result(message: &Message<'_>) -> Result<FunctionCallOutputItem> {
    let call_id = tool_call_id(message)?;

    Ok(FunctionCallOutputItem {
        call_id: call_id.to_string(),
        output: tool_output(message.get("content")),
    })
}

/// Expands an assistant message into an optional message item followed by
/// one function call item per entry of `tool_calls`.
pub(crate) fn assistant_items(message: &Message<'_>, normalizer: &ContentNormalizer<'_>) -> Result<Vec<InputItem>> {
    let tool_calls: &[Value] = match message.get("tool_calls") {
        Some(Value::Array(tool_calls)) => tool_calls.as_slice(),
        _ => &[],
    };

    let mut items = Vec::with_capacity(tool_calls.len() + 1);
    let normalized = normalizer.message(message.fields);

    if has_non_empty_content(normalized.get("content")) {
        items.push(InputItem::Message(normalized));
    }

    for (index, tool_call) in tool_calls.iter().enumerate() {
        let ToolCall { id, name, arguments } = ToolCall::decode(tool_call, index)?;

        items.push(InputItem::FunctionCall(FunctionCallItem {
            call_id: id.to_string(),
            name: name.to_string(),
            arguments: encode_arguments(arguments),
        }));
    }

    Ok(items)
}

fn encode_arguments(arguments: Arguments<'_>) -> String {
    match arguments {
        Arguments::Missing => "{}".to_string(),
        Arguments::Encoded(encoded) => encoded.to_string(),
        // Display renders compact JSON.
        Arguments::Structured(value) | Arguments::Scalar(value) => value.to_string(),
    }
}

/// Flattens tool message content into a single output string.
///
/// Textual parts are joined with newlines. Content without any textual part
/// is encoded as compact JSON.
fn tool_output(content: Option<&Value>) -> String {
    match Content::from(content) {
        Content::Absent => String::new(),
        Content::Text(text) => text.to_string(),
        Content::Parts(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(part) => part.get("text").and_then(Value::as_str),
                    _ => None,
                })
                .collect();

            if texts.is_empty() {
                Value::from(parts).to_string()
            } else {
                texts.into_iter().filter(|text| !text.is_empty()).collect::<Vec<_>>().join("\n")
            }
        }
        Content::Part(part) => match part.get("text") {
            Some(Value::String(text)) => text.clone(),
            _ => Value::Object(part.clone()).to_string(),
        },
        Content::Scalar(scalar) => scalar.to_string(),
    }
}

/// Whether normalized assistant content is worth a message item.
///
/// Parts count when they carry non-blank text, are not objects, or are
/// objects without text that still carry some other field.
fn has_non_empty_content(content: Option<&Value>) -> bool {
    match Content::from(content) {
        Content::Absent | Content::Scalar(_) => false,
        Content::Text(text) => !text.trim().is_empty(),
        Content::Parts(parts) => parts.iter().any(|part| match part {
            Value::String(text) => !text.trim().is_empty(),
            Value::Object(part) => match part.get("text") {
                Some(Value::String(text)) => !text.trim().is_empty(),
                None | Some(Value::Null) => !part.is_empty(),
                Some(_) => false,
            },
            _ => true,
        }),
        Content::Part(part) => match part.get("text") {
            Some(Value::String(text)) => !text.trim().is_empty(),
            _ => !part.is_empty(),
        },
    }
}
