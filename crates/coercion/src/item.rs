//! Normalized input items.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// One element of the normalized `input` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InputItem {
    /// A user or assistant turn: the original message with canonical content.
    Message(Map<String, Value>),
    /// A function invocation made by the assistant.
    FunctionCall(FunctionCallItem),
    /// The result of a function invocation.
    FunctionCallOutput(FunctionCallOutputItem),
}

/// A function invocation taken from an assistant message's `tool_calls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "function_call")]
pub struct FunctionCallItem {
    pub call_id: String,
    pub name: String,
    /// JSON-encoded arguments, or the caller's string verbatim.
    pub arguments: String,
}

/// The result of a function invocation, taken from a tool message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "function_call_output")]
pub struct FunctionCallOutputItem {
    pub call_id: String,
    pub output: String,
}

impl From<InputItem> for Value {
    fn from(item: InputItem) -> Self {
        match item {
            InputItem::Message(message) => Value::Object(message),
            InputItem::FunctionCall(call) => json!({
                "type": "function_call",
                "call_id": call.call_id,
                "name": call.name,
                "arguments": call.arguments,
            }),
            InputItem::FunctionCallOutput(output) => json!({
                "type": "function_call_output",
                "call_id": output.call_id,
                "output": output.output,
            }),
        }
    }
}
