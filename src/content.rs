//! Content editor: payload text and its semantic type.
//!
//! The editor keeps exactly one canonical value, the raw text shown in the
//! input field, and derives the stored payload from it with the active
//! [`ContentType`]'s rule. For phone numbers the field never shows the
//! `tel:` marker and the stored payload always carries it exactly once.

use serde::{Deserialize, Serialize};

use crate::store::Update;

/// Scheme marker prepended to phone numbers.
pub const TEL_SCHEME: &str = "tel:";

// ============================================================================
// ContentType
// ============================================================================

/// Semantic type of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ContentType {
    #[default]
    Url,
    Text,
    Phone,
    Json,
}

impl ContentType {
    pub const ALL: [Self; 4] = [Self::Url, Self::Text, Self::Phone, Self::Json];

    pub fn label(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Text => "Text",
            Self::Phone => "Phone",
            Self::Json => "JSON",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Url => "https://example.com",
            Self::Text => "Enter your text here",
            Self::Phone => "+1234567890",
            Self::Json => r#"{"name": "value"}"#,
        }
    }

    /// Derives the stored payload from the raw field text.
    pub fn format(self, raw: &str) -> String {
        match self {
            Self::Url | Self::Text | Self::Json => raw.to_string(),
            Self::Phone => format!("{TEL_SCHEME}{}", strip_tel_scheme(raw)),
        }
    }

    /// Derives the field text from a stored payload.
    pub fn display(self, stored: &str) -> String {
        match self {
            Self::Phone => strip_tel_scheme(stored).to_string(),
            Self::Url | Self::Text | Self::Json => stored.to_string(),
        }
    }
}

/// Removes every leading `tel:` marker, ignoring ASCII case.
pub fn strip_tel_scheme(value: &str) -> &str {
    let mut rest = value;
    while rest.len() >= TEL_SCHEME.len()
        && rest.is_char_boundary(TEL_SCHEME.len())
        && rest[..TEL_SCHEME.len()].eq_ignore_ascii_case(TEL_SCHEME)
    {
        rest = &rest[TEL_SCHEME.len()..];
    }
    rest
}

// ============================================================================
// ContentStatus
// ============================================================================

/// Informational check of the current input. Never blocks storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    Ok,
    /// JSON mode with text that does not parse; carries the parser message.
    MalformedJson(String),
}

// ============================================================================
// ContentEditor
// ============================================================================

/// Editor state for the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEditor {
    content_type: ContentType,
    raw: String,
}

impl ContentEditor {
    /// Creates an editor showing `stored` interpreted as `content_type`.
    pub fn new(content_type: ContentType, stored: &str) -> Self {
        Self {
            content_type,
            raw: content_type.display(stored),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Text shown in the input field.
    pub fn display_value(&self) -> &str {
        &self.raw
    }

    /// Payload written to the configuration.
    pub fn stored_value(&self) -> String {
        self.content_type.format(&self.raw)
    }

    /// Handles an edit of the input field.
    pub fn input(&mut self, raw: &str) -> Update {
        self.raw = self.content_type.display(raw);
        Update::Content(self.stored_value())
    }

    /// Switches the content type and re-derives the payload from the field.
    pub fn select_type(&mut self, content_type: ContentType) -> Update {
        self.content_type = content_type;
        self.raw = content_type.display(&self.raw);
        Update::Content(self.stored_value())
    }

    pub fn status(&self) -> ContentStatus {
        if self.content_type != ContentType::Json {
            return ContentStatus::Ok;
        }
        match serde_json::from_str::<serde_json::Value>(&self.raw) {
            Ok(_) => ContentStatus::Ok,
            Err(e) => ContentStatus::MalformedJson(e.to_string()),
        }
    }
}

impl Default for ContentEditor {
    fn default() -> Self {
        Self::new(ContentType::default(), crate::options::DEFAULT_CONTENT)
    }
}

// ============================================================================
// Tests
// ============================================================================
