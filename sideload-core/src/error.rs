//! Error types for document serialization with actionable messages.
//!
//! Every failure in this crate is a caller or programmer mistake rather than a
//! transient fault, so errors are never retried and never recovered
//! internally. They abort document construction and reach the caller of
//! [`serialize`](crate::serialize) unchanged.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: J{category}{number}
//! - 1xxx: Primary data shape errors
//! - 2xxx: Include path errors
//! - 3xxx: Serializer resolution errors
//!
//! ```rust
//! use sideload_core::{ErrorCode, SerializeError};
//!
//! let err = SerializeError::invalid_include("tags", "posts");
//! assert_eq!(err.code, ErrorCode::InvalidInclude);
//! assert_eq!(err.code.code(), "J2001");
//! assert!(err.to_string().contains("'tags' is not a valid include"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for serialization operations.
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Primary data errors (1xxx)
    /// Collection-vs-single intent missing or contradicted by the input (J1001).
    AmbiguousCollection = 1001,

    // Include errors (2xxx)
    /// Include path segment is not a declared relationship or is mis-cased (J2001).
    InvalidInclude = 2001,

    // Resolution errors (3xxx)
    /// No serializer registered for a runtime type (J3001).
    SerializerNotFound = 3001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "J2001").
    pub fn code(&self) -> String {
        format!("J{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AmbiguousCollection => "Ambiguous collection",
            Self::InvalidInclude => "Invalid include",
            Self::SerializerNotFound => "Serializer not found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional replacement value (e.g. the corrected include name).
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a replacement value.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The resource type (or runtime type name) involved.
    pub resource_type: Option<String>,
    /// The include segment or field involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building a document.
#[derive(Error, Debug, Clone)]
pub struct SerializeError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl SerializeError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a suggestion carrying a replacement value.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the resource type.
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.context.resource_type = Some(resource_type.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    // ============== Constructor Functions ==============

    /// A collection was passed without `is_collection: true`.
    pub fn missing_collection_flag() -> Self {
        Self::new(
            ErrorCode::AmbiguousCollection,
            "Must provide `is_collection: true` when serializing collections",
        )
        .with_suggestion("Use SerializeOptions::collection() for collection requests")
        .with_help(
            "A missing resource renders as `null` but an empty collection renders as `[]`, \
             so the shape is never inferred",
        )
    }

    /// A single object (or nothing) was passed with `is_collection: true`.
    pub fn single_as_collection() -> Self {
        Self::new(
            ErrorCode::AmbiguousCollection,
            "Attempted to serialize a single object as a collection",
        )
        .with_suggestion("Use SerializeOptions::single() for single-resource requests")
        .with_suggestion("Pass a Vec of resources to serialize a collection")
    }

    /// An include segment does not name a declared relationship.
    pub fn invalid_include(field: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let field = field.into();
        let resource_type = resource_type.into();
        Self::new(
            ErrorCode::InvalidInclude,
            format!("'{}' is not a valid include", field),
        )
        .with_field(&field)
        .with_resource_type(&resource_type)
        .with_suggestion(format!(
            "Declare '{}' as a has-one or has-many relationship on the {} serializer",
            field, resource_type
        ))
    }

    /// An include segment names a relationship but not in its external casing.
    pub fn include_casing(field: impl Into<String>, expected: impl Into<String>) -> Self {
        let field = field.into();
        let expected = expected.into();
        Self::new(
            ErrorCode::InvalidInclude,
            format!(
                "'{}' is not a valid include, did you mean '{}'?",
                field, expected
            ),
        )
        .with_field(&field)
        .with_code_suggestion(format!("Did you mean '{}'?", expected), &expected)
    }

    /// No serializer is registered for a runtime type.
    pub fn serializer_not_found(namespace: Option<&str>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let qualified = match namespace {
            Some(ns) => format!("{}::{}", ns, type_name),
            None => type_name.clone(),
        };
        Self::new(
            ErrorCode::SerializerNotFound,
            format!("No serializer registered for {}", qualified),
        )
        .with_resource_type(&type_name)
        .with_code_suggestion(
            "Register a serializer factory at startup",
            format!("registry.register(\"{}\", MySerializer::default)", type_name),
        )
        .with_help("Serializer lookup never falls back to a default serializer")
    }

    // ============== Error Checks ==============

    /// Check if this is an ambiguous collection error.
    pub fn is_ambiguous_collection(&self) -> bool {
        self.code == ErrorCode::AmbiguousCollection
    }

    /// Check if this is an invalid include error.
    pub fn is_invalid_include(&self) -> bool {
        self.code == ErrorCode::InvalidInclude
    }

    /// Check if this is a serializer resolution error.
    pub fn is_serializer_not_found(&self) -> bool {
        self.code == ErrorCode::SerializerNotFound
    }

    /// The corrected name suggested by a casing error, if any.
    pub fn suggested_name(&self) -> Option<&str> {
        self.context
            .suggestions
            .iter()
            .find_map(|s| s.code.as_deref())
            .filter(|_| self.is_invalid_include())
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref resource_type) = self.context.resource_type {
            output.push_str(&format!("  → Type: {}\n", resource_type));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     {}\n", code));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl miette::Diagnostic for SerializeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.context
            .help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
            .or_else(|| {
                self.context
                    .suggestions
                    .first()
                    .map(|s| Box::new(&s.text) as Box<dyn fmt::Display + 'a>)
            })
    }
}
