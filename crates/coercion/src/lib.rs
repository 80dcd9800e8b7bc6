//! Coercion of chat-completions style `messages` into a merged instruction
//! string and a list of normalized input items.
//!
//! System and developer messages become instruction text. User messages keep
//! their shape with canonical content parts, assistant messages expand into a
//! message item and function call items, and tool messages become function
//! call outputs.
//!
//! ```text
//! messages → role router → instructions (system, developer)
//!                        → content normalizer → user and assistant items
//!                        → tool call normalizer → function_call, function_call_output
//! ```
//!
//! Coercion is a pure function of its input: nothing is mutated, and any
//! structural violation rejects the whole call with a [`ClientPayloadError`].

mod content;
mod decode;
mod error;
mod instructions;
mod item;
mod tools;

use config::CoercionConfig;
use serde::Serialize;
use serde_json::Value;

use crate::{content::ContentNormalizer, decode::Message, instructions::Instructions};

pub use decode::Role;
pub use error::{ClientPayloadError, ErrorResponse, Result};
pub use item::{FunctionCallItem, FunctionCallOutputItem, InputItem};

/// The outcome of a coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coercion {
    /// Existing instructions followed by all system and developer text.
    pub instructions: String,
    /// Input items in message order.
    pub items: Vec<InputItem>,
}

impl Coercion {
    pub fn into_parts(self) -> (String, Vec<InputItem>) {
        (self.instructions, self.items)
    }
}

/// Coerces chat messages using a given configuration.
#[derive(Debug, Clone, Default)]
pub struct MessageCoercer {
    config: CoercionConfig,
}

impl MessageCoercer {
    pub fn new(config: CoercionConfig) -> Self {
        Self { config }
    }

    /// Splits `messages` into instruction text, appended to `existing_instructions`,
    /// and normalized input items.
    pub fn coerce(&self, existing_instructions: &str, messages: &[Value]) -> Result<Coercion> {
        let normalizer = ContentNormalizer::new(&self.config);
        let mut instructions = Instructions::default();
        let mut items = Vec::with_capacity(messages.len());

        for value in messages {
            let message = Message::decode(value)?;

            match message.role {
                Role::System | Role::Developer => instructions.push(message.role, message.content())?,
                Role::Tool => items.push(InputItem::FunctionCallOutput(tools::tool_result(&message)?)),
                Role::Assistant => items.extend(tools::assistant_items(&message, &normalizer)?),
                Role::User => items.push(InputItem::Message(normalizer.message(message.fields))),
            }
        }

        let instructions = instructions.merge(existing_instructions);

        log::debug!(
            "Coerced {} messages into {} input items with {} bytes of instructions",
            messages.len(),
            items.len(),
            instructions.len()
        );

        Ok(Coercion { instructions, items })
    }

    /// Rewrites message content into canonical parts.
    ///
    /// Running this on its own output returns the output unchanged.
    pub fn normalize_content(&self, content: &Value) -> Value {
        ContentNormalizer::new(&self.config)
            .normalize(Some(content))
            .unwrap_or_else(|| content.clone())
    }
}

/// Coerces chat messages with the default configuration.
pub fn coerce_messages(existing_instructions: &str, messages: &[Value]) -> Result<Coercion> {
    MessageCoercer::default().coerce(existing_instructions, messages)
}

/// Rewrites message content into canonical parts with the default configuration.
pub fn normalize_content(content: &Value) -> Value {
    MessageCoercer::default().normalize_content(content)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use insta::assert_json_snapshot;
    use serde_json::json;

    use super::*;

    fn messages(value: Value) -> Vec<Value> {
        match value {
            Value::Array(messages) => messages,
            other => vec![other],
        }
    }

    #[test]
    fn tool_round_trip_conversation() {
        let input = messages(json!([
            {"role": "system", "content": "Be terse."},
            {"role": "user", "content": "Hi"},
            {
                "role": "assistant",
                "content": null,
                "tool_calls": [{"id": "c1", "function": {"name": "lookup", "arguments": {"q": "x"}}}]
            },
            {"role": "tool", "tool_call_id": "c1", "content": "42"}
        ]));

        let coercion = coerce_messages("", &input).unwrap();

        assert_json_snapshot!(coercion, @r#"
        {
          "instructions": "Be terse.",
          "items": [
            {
              "role": "user",
              "content": [
                {
                  "type": "input_text",
                  "text": "Hi"
                }
              ]
            },
            {
              "type": "function_call",
              "call_id": "c1",
              "name": "lookup",
              "arguments": "{\"q\":\"x\"}"
            },
            {
              "type": "function_call_output",
              "call_id": "c1",
              "output": "42"
            }
          ]
        }
        "#);
    }

    #[test]
    fn instructions_never_become_items() {
        let input = messages(json!([
            {"role": "developer", "content": [{"type": "text", "text": "Use metric units."}]},
            {"role": "user", "content": [{"type": "text", "text": "How far?"}]},
            {"role": "system", "content": "Cite sources."},
            {"role": "assistant", "content": "About 5 km."}
        ]));

        let (instructions, items) = coerce_messages("You are a guide.", &input).unwrap().into_parts();

        assert_eq!(instructions, "You are a guide.\nUse metric units.\nCite sources.");

        let roles: Vec<&str> = items
            .iter()
            .map(|item| match item {
                InputItem::Message(message) => message["role"].as_str().unwrap_or_default(),
                InputItem::FunctionCall(_) => "function_call",
                InputItem::FunctionCallOutput(_) => "function_call_output",
            })
            .collect();

        assert_eq!(roles, ["user", "assistant"]);
    }

    #[test]
    fn item_order_follows_message_order() {
        let input = messages(json!([
            {"role": "user", "content": "one"},
            {
                "role": "assistant",
                "content": "two",
                "tool_calls": [
                    {"id": "a", "function": {"name": "first"}},
                    {"id": "b", "function": {"name": "second"}}
                ]
            },
            {"role": "tool", "call_id": "b", "content": {"text": "second done"}},
            {"role": "tool", "tool_call_id": "a", "content": [{"type": "text", "text": "first done"}]},
            {"role": "user", "content": "three"}
        ]));

        let items: Vec<Value> = coerce_messages("", &input)
            .unwrap()
            .items
            .into_iter()
            .map(Value::from)
            .collect();

        assert_eq!(
            items,
            vec![
                json!({"role": "user", "content": [{"type": "input_text", "text": "one"}]}),
                json!({
                    "role": "assistant",
                    "content": [{"type": "input_text", "text": "two"}],
                    "tool_calls": [
                        {"id": "a", "function": {"name": "first"}},
                        {"id": "b", "function": {"name": "second"}}
                    ]
                }),
                json!({"type": "function_call", "call_id": "a", "name": "first", "arguments": "{}"}),
                json!({"type": "function_call", "call_id": "b", "name": "second", "arguments": "{}"}),
                json!({"type": "function_call_output", "call_id": "b", "output": "second done"}),
                json!({"type": "function_call_output", "call_id": "a", "output": "first done"}),
                json!({"role": "user", "content": [{"type": "input_text", "text": "three"}]}),
            ]
        );
    }

    #[test]
    fn user_message_without_content_is_kept_as_is() {
        let input = messages(json!([
            {"role": "user", "name": "alice"},
            {"role": "user", "content": null}
        ]));

        let coercion = coerce_messages("", &input).unwrap();
        let items: Vec<Value> = coercion.items.into_iter().map(Value::from).collect();

        assert_eq!(items, input);
    }

    #[test]
    fn input_is_not_mutated() {
        let input = messages(json!([
            {"role": "user", "content": [{"type": "image_url", "image_url": {"url": "http://x/y.png"}}]},
            {"role": "assistant", "content": "ok", "tool_calls": [{"id": "c1", "function": {"name": "f", "arguments": {}}}]}
        ]));
        let before = input.clone();

        coerce_messages("", &input).unwrap();

        assert_eq!(input, before);
    }

    #[test]
    fn malformed_tool_call_rejects_everything() {
        let input = messages(json!([
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "tool_calls": [{"id": "", "function": {"name": "f"}}]}
        ]));

        let error = coerce_messages("", &input).unwrap_err();

        assert_eq!(error, ClientPayloadError::MissingToolCallId { index: Some(0) });
        assert_eq!(error.param(), "messages");
    }

    #[test]
    fn structural_failures() {
        let cases = [
            (json!("hello"), "Each message must be an object."),
            (json!({"content": "hi"}), "Each message must include a string 'role'."),
            (json!({"role": "function", "content": "hi"}), "Unsupported message role: function"),
            (
                json!({"role": "system", "content": [{"type": "image_url", "image_url": "http://x"}]}),
                "system messages must be text-only.",
            ),
            (
                json!({"role": "tool", "content": "42"}),
                "tool messages must include 'tool_call_id'.",
            ),
            (
                json!({"role": "assistant", "tool_calls": ["c1"]}),
                "assistant tool_calls[0] must be an object.",
            ),
            (
                json!({"role": "assistant", "tool_calls": [{"id": "c1"}]}),
                "assistant tool_calls[0] must include a 'function' object.",
            ),
            (
                json!({"role": "assistant", "tool_calls": [{"id": "c1", "function": {"arguments": "{}"}}]}),
                "assistant tool_calls[0].function must include a non-empty 'name'.",
            ),
        ];

        for (message, expected) in cases {
            let error = coerce_messages("", &[json!({"role": "user", "content": "ok"}), message]).unwrap_err();
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn first_failure_wins() {
        let input = messages(json!([
            {"role": "tool", "content": "orphan"},
            {"role": "critic"}
        ]));

        let error = coerce_messages("", &input).unwrap_err();

        assert_eq!(error, ClientPayloadError::MissingToolCallId { index: None });
    }

    #[test]
    fn empty_input() {
        let coercion = coerce_messages("keep", &[]).unwrap();

        assert_eq!(coercion.instructions, "keep");
        assert!(coercion.items.is_empty());
    }

    #[test]
    fn normalize_content_is_idempotent() {
        let content = json!([
            "hello",
            {"type": "image_url", "image_url": "http://x/y.png"},
            {"type": "input_audio", "input_audio": {"data": "AAAA", "format": "mp3"}},
            {"type": "file", "file": {"file_id": "file-1"}},
            {"type": "unknown", "payload": 1}
        ]);

        let once = normalize_content(&content);

        assert_eq!(normalize_content(&once), once);
        assert_eq!(normalize_content(&Value::Null), Value::Null);
    }

    #[test]
    fn configured_coercer() {
        let config: config::Config = toml::from_str(indoc! {r#"
            [coercion.files]
            default_mime_type = "application/pdf"
        "#})
        .unwrap();

        let coercer = MessageCoercer::new(config.coercion);
        let input = messages(json!({
            "role": "user",
            "content": {"type": "file", "file": {"file_data": "JVBERi0="}}
        }));

        let coercion = coercer.coerce("", &input).unwrap();

        assert_json_snapshot!(coercion.items, @r#"
        [
          {
            "role": "user",
            "content": {
              "type": "input_file",
              "file_url": "data:application/pdf;base64,JVBERi0="
            }
          }
        ]
        "#);
    }
}
