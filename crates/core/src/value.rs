//! Field values held by a [`FormRecord`](crate::FormRecord).
//!
//! Values serialise untagged, so a persisted record is a flat JSON object such as
//! `{"childName": "Ana", "termsAccepted": false, "childDocFile": {...}}`.

use serde::{Deserialize, Serialize};

/// Reference to an uploaded document that passed the upload constraints.
///
/// Only metadata is kept in the record; the bytes stay with whoever received the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: u64,
    /// Hex SHA-256 digest of the content.
    pub sha256: String,
}

/// The value of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    File(FileRef),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Whether the field counts as filled in for presence checks.
    ///
    /// Blank text, `false` and `Null` are not filled.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(_) | FieldValue::File(_) => true,
            FieldValue::Text(s) => !s.trim().is_empty(),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::File(f) => Some(f),
            _ => None,
        }
    }

    /// Renders the value as a single spreadsheet cell.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(true) => "Sí".into(),
            FieldValue::Bool(false) => "No".into(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::File(f) => f.file_name.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}
