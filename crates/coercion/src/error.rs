use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::decode::Role;

pub type Result<T> = std::result::Result<T, ClientPayloadError>;

/// Request field every coercion failure is reported against.
const PARAM: &str = "messages";

/// A chat payload that cannot be coerced into input items.
///
/// Every variant is a client error: the whole coercion is rejected and no
/// partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientPayloadError {
    /// A message is not a JSON object.
    #[error("Each message must be an object.")]
    InvalidMessageShape,

    /// A message has no `role`, or the role is not a string.
    #[error("Each message must include a string 'role'.")]
    MissingRole,

    /// A message role outside system, developer, user, assistant and tool.
    #[error("Unsupported message role: {0}")]
    UnsupportedRole(String),

    /// System or developer content with parts other than text.
    #[error("{role} messages must be text-only.")]
    NonTextContent { role: Role },

    /// A tool message without a call identifier, or an assistant tool call
    /// at `index` without a non-empty `id`.
    #[error("{}", missing_tool_call_id(.index))]
    MissingToolCallId { index: Option<usize> },

    /// An assistant tool call at `index` that is not an object or carries no
    /// `function` object.
    #[error("assistant tool_calls[{index}] must {requirement}.")]
    InvalidToolCall { index: usize, requirement: &'static str },

    /// An assistant tool call at `index` whose function has no name.
    #[error("assistant tool_calls[{index}].function must include a non-empty 'name'.")]
    MissingFunctionName { index: usize },
}

fn missing_tool_call_id(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("assistant tool_calls[{index}] must include a non-empty 'id'."),
        None => "tool messages must include 'tool_call_id'.".to_string(),
    }
}

impl ClientPayloadError {
    /// The request field the error refers to.
    pub fn param(&self) -> &'static str {
        PARAM
    }

    /// HTTP status for surfacing the error to the client.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// The error type string for the response.
    pub fn error_type(&self) -> &'static str {
        "invalid_request_error"
    }

    /// OpenAI-compatible error body for this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetails {
                message: self.to_string(),
                r#type: self.error_type(),
                param: self.param(),
                code: self.status_code().as_u16(),
            },
        }
    }
}

/// Error response format compatible with the OpenAI API.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: &'static str,
    param: &'static str,
    code: u16,
}
