//! Tunables for message coercion.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Deserialize;

/// Settings applied while rewriting chat messages into input items.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoercionConfig {
    /// Inline file payload handling.
    pub files: FileConfig,
    /// Inline audio payload handling.
    pub audio: AudioConfig,
}

/// Settings for `file` content parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Mime type used for inline file data that names none.
    pub default_mime_type: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            default_mime_type: "application/octet-stream".to_string(),
        }
    }
}

/// Settings for `input_audio` content parts.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Extra or overriding audio format to mime type mappings.
    pub mime_types: IndexMap<String, String>,
}

impl AudioConfig {
    /// Resolves the mime type for an audio format.
    ///
    /// Configured mappings win, then the built-in `wav` and `mp3` mappings,
    /// and anything else becomes `audio/<format>`.
    pub fn mime_type<'a>(&'a self, format: &str) -> Cow<'a, str> {
        if let Some(mime_type) = self.mime_types.get(format) {
            return Cow::Borrowed(mime_type.as_str());
        }

        match format {
            "wav" => Cow::Borrowed("audio/wav"),
            "mp3" => Cow::Borrowed("audio/mpeg"),
            other => Cow::Owned(format!("audio/{other}")),
        }
    }
}
