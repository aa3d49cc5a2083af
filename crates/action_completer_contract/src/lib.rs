//! Shared action-completion contracts used by the lexer, the completion engine, and host prompts.
//!
//! This crate is intentionally behavior-free. It defines serializable fragment metadata,
//! completion payloads, validation outcomes, and cast parameter values without depending on the
//! engine internals or any terminal/editor toolkit.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One whitespace-delimited, escape-aware piece of a prompt buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    /// Fragment text with escapes resolved.
    pub text: String,
    /// Byte offset of the first fragment character in the original buffer.
    pub start: usize,
    /// Byte offset one past the last fragment character in the original buffer.
    pub end: usize,
    /// Whether this is the final fragment of a buffer that does not end in unescaped whitespace.
    pub is_trailing: bool,
}

impl Fragment {
    /// Creates a fragment spanning `start..end`.
    pub fn new(text: impl Into<String>, start: usize, end: usize, is_trailing: bool) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            is_trailing,
        }
    }

    /// Returns the resolved fragment text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns whether the fragment carries no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Node classification inside an action tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Container of named child groups and actions.
    Group,
    /// Executable leaf with positional parameters.
    Action,
}

/// Full name path of a node, from (but excluding) the root group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// Creates a path from ordered segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the ordered path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the final segment, if any.
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Renders the path the way it is typed at the prompt.
    pub fn display(&self) -> String {
        self.0.join(" ")
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// One styled run of display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledSpan {
    /// Opaque style string passed through to the host.
    pub style: String,
    /// Text content.
    pub text: String,
}

impl StyledSpan {
    /// Creates a styled span.
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
        }
    }
}

/// Completion display content: plain text or pre-styled spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum DisplayText {
    /// Unstyled text.
    Plain(String),
    /// Ordered styled spans.
    Styled(Vec<StyledSpan>),
}

impl DisplayText {
    /// Returns the text with styling removed.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Plain(text) => text.clone(),
            Self::Styled(spans) => spans.iter().map(|span| span.text.as_str()).collect(),
        }
    }

    /// Returns whether the display carries no visible text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Plain(text) => text.is_empty(),
            Self::Styled(spans) => spans.iter().all(|span| span.text.is_empty()),
        }
    }
}

impl From<&str> for DisplayText {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for DisplayText {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl From<Vec<StyledSpan>> for DisplayText {
    fn from(value: Vec<StyledSpan>) -> Self {
        Self::Styled(value)
    }
}

/// One completion suggestion for the fragment currently being typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCandidate {
    /// Text written into the buffer (escape-encoded).
    pub value: String,
    /// Text shown in the completion menu.
    pub display: DisplayText,
    /// Optional description shown next to the candidate.
    pub display_meta: Option<DisplayText>,
    /// Style string for the candidate row.
    pub style: String,
    /// Style string for the selected candidate row.
    pub selected_style: String,
}

impl CompletionCandidate {
    /// Creates an unstyled candidate displayed as its own value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: DisplayText::Plain(value.clone()),
            value,
            display_meta: None,
            style: String::new(),
            selected_style: String::new(),
        }
    }
}

/// Completion response for one buffer evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Byte offset where the replaced fragment starts.
    pub start: usize,
    /// Byte offset where the replaced fragment ends.
    pub end: usize,
    /// Ordered candidates.
    pub candidates: Vec<CompletionCandidate>,
}

impl CompletionResponse {
    /// Returns the candidate values in order.
    pub fn values(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .map(|candidate| candidate.value.as_str())
            .collect()
    }

    /// Returns whether no candidates were produced.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Result of validating a finished buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ValidationOutcome {
    /// The buffer names an action with acceptable parameters.
    Valid,
    /// More input is needed; not an error.
    Incomplete {
        /// Buffer offset where input is missing.
        offset: usize,
        /// Optional hint for the user.
        message: Option<String>,
    },
    /// The buffer cannot be executed as typed.
    Invalid {
        /// Buffer offset of the offending fragment.
        offset: usize,
        /// Human-readable message.
        message: String,
    },
}

impl ValidationOutcome {
    /// Returns whether the buffer is executable.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns the error offset for non-valid outcomes.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Valid => None,
            Self::Incomplete { offset, .. } | Self::Invalid { offset, .. } => Some(*offset),
        }
    }

    /// Returns the message for non-valid outcomes, when one exists.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Incomplete { message, .. } => message.as_deref(),
            Self::Invalid { message, .. } => Some(message),
        }
    }
}

/// Cast parameter value handed to action handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ParamValue {
    /// Raw or identity-cast string.
    String(String),
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Arbitrary structured value produced by a custom cast.
    Json(Value),
}

impl ParamValue {
    /// Returns the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the numeric payload, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Returns the boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Converts the value into JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(value) => Value::String(value.clone()),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::Bool(value) => Value::Bool(*value),
            Self::Json(value) => value.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_candidates_display_their_value() {
        let candidate = CompletionCandidate::plain("origin");
        assert_eq!(candidate.display, DisplayText::Plain("origin".to_string()));
        assert_eq!(candidate.display_meta, None);
        assert!(candidate.style.is_empty() && candidate.selected_style.is_empty());
        let response = CompletionResponse {
            start: 0,
            end: 2,
            candidates: vec![candidate],
        };
        assert_eq!(response.values(), vec!["origin"]);
    }

    #[test]
    fn node_path_displays_as_typed() {
        let path = NodePath::from_segments(["remote", "add"]);
        assert_eq!(path.display(), "remote add");
        assert_eq!(path.name(), Some("add"));
        assert!(NodePath::default().is_root());
    }

    #[test]
    fn styled_display_flattens_to_plain_text() {
        let display = DisplayText::Styled(vec![
            StyledSpan::new("fg:red", "hel"),
            StyledSpan::new("", "lo"),
        ]);
        assert_eq!(display.plain_text(), "hello");
        assert!(!display.is_empty());
    }

    #[test]
    fn validation_outcome_serializes_with_kind_tag() {
        let outcome = ValidationOutcome::Invalid {
            offset: 4,
            message: "too many arguments".to_string(),
        };
        let encoded = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(
            encoded,
            json!({"kind": "invalid", "offset": 4, "message": "too many arguments"})
        );
        assert_eq!(outcome.offset(), Some(4));
        assert_eq!(ValidationOutcome::Valid.message(), None);
    }

    #[test]
    fn param_value_accessors_match_variant() {
        assert_eq!(ParamValue::Int(12).as_i64(), Some(12));
        assert_eq!(ParamValue::Int(12).as_f64(), Some(12.0));
        assert_eq!(ParamValue::from("ab").as_str(), Some("ab"));
        assert_eq!(ParamValue::Bool(true).as_i64(), None);
        assert_eq!(ParamValue::Bool(true).to_json(), json!(true));
    }
}
