//! Error types for manifest loading
//!
//! Every failure carries a closed kind plus optional context: the document
//! path where it happened, a source location when one is known, and an
//! actionable help message. Callers render these directly as diagnostics.

use std::fmt;

use crate::node::NodeKind;

/// Result type alias for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for manifest loading and token substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the document where the error occurred (e.g., "services[0].bindings")
    pub path: Option<String>,
    /// Source location (file, line, column) if available
    pub source_location: Option<SourceLocation>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Location in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

/// Categories of errors that can occur while loading a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source text is not well-formed YAML
    Syntax,
    /// A node's shape does not match what the grammar requires here
    UnexpectedNode { expected: NodeKind, actual: NodeKind },
    /// Like UnexpectedNode, but the key is more diagnostic than the shapes
    ExpectedForKey { key: String, expected: NodeKind },
    /// A mapping contains a key outside its recognized set
    UnrecognizedKey { key: String },
    /// A recognized key holds a scalar that cannot be coerced (integer, bool)
    InvalidValue { key: String },
    /// Error inside a `${...}` substitution token
    Token(TokenErrorKind),
    /// I/O error reading the manifest source
    Io,
}

/// Specific token substitution error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenErrorKind {
    /// A `${` with no closing `}` before the end of the value
    Unterminated { text: String },
    /// A `secret:` token names a configuration entry that does not exist
    UnresolvedSecret { name: String },
    /// The token's provider is unknown, or its structure is malformed
    Unknown { token: String },
}

impl Error {
    /// Create a new syntax error
    pub fn syntax(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an unexpected-node-shape error
    pub fn unexpected_node(expected: NodeKind, actual: NodeKind) -> Self {
        Self {
            kind: ErrorKind::UnexpectedNode { expected, actual },
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create a wrong-shape error that names the offending key
    pub fn expected_for_key(key: impl Into<String>, expected: NodeKind) -> Self {
        Self {
            kind: ErrorKind::ExpectedForKey {
                key: key.into(),
                expected,
            },
            path: None,
            source_location: None,
            help: None,
            cause: None,
        }
    }

    /// Create an unrecognized-key error
    pub fn unrecognized_key(key: impl Into<String>) -> Self {
        let k = key.into();
        Self {
            kind: ErrorKind::UnrecognizedKey { key: k.clone() },
            path: None,
            source_location: None,
            help: Some(format!("Remove '{}' or check it for typos", k)),
            cause: None,
        }
    }

    /// Create an invalid-value error for a recognized key
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidValue { key: key.into() },
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Create an unterminated-token error
    pub fn unterminated_token(text: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Token(TokenErrorKind::Unterminated { text: text.into() }),
            path: None,
            source_location: None,
            help: Some("Close the token with '}'".into()),
            cause: None,
        }
    }

    /// Create an unresolved-secret error
    pub fn unresolved_secret(name: impl Into<String>) -> Self {
        let n = name.into();
        Self {
            kind: ErrorKind::Token(TokenErrorKind::UnresolvedSecret { name: n.clone() }),
            path: None,
            source_location: None,
            help: Some(format!(
                "Add a configuration entry named '{}' to the same service",
                n
            )),
            cause: None,
        }
    }

    /// Create an unknown-token error
    pub fn unknown_token(token: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Token(TokenErrorKind::Unknown {
                token: token.into(),
            }),
            path: None,
            source_location: None,
            help: Some("Supported token forms are ${rand:<label>} and ${secret:<name>}".into()),
            cause: None,
        }
    }

    /// Create an I/O error
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Io,
            path: None,
            source_location: None,
            help: None,
            cause: Some(message.into()),
        }
    }

    /// Add document path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add source location to the error
    pub fn with_source_location(mut self, loc: SourceLocation) -> Self {
        self.source_location = Some(loc);
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Prefix the document path with an enclosing segment
    ///
    /// Parsers call this while unwinding, so the path builds outside-in:
    /// `bindings[1]` nested under `services[0]` reads
    /// `services[0].bindings[1]`.
    pub fn in_segment(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        self.path = Some(match self.path.take() {
            Some(p) => format!("{}.{}", segment, p),
            None => segment,
        });
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Syntax => write!(f, "Unable to parse manifest")?,
            ErrorKind::UnexpectedNode { expected, actual } => {
                write!(f, "Expected YAML {} node, found {}", expected, actual)?
            }
            ErrorKind::ExpectedForKey { key, expected } => {
                write!(f, "Expected YAML {} for key '{}'", expected, key)?
            }
            ErrorKind::UnrecognizedKey { key } => write!(f, "Unrecognized key '{}'", key)?,
            ErrorKind::InvalidValue { key } => write!(f, "Invalid value for key '{}'", key)?,
            ErrorKind::Token(t) => match t {
                TokenErrorKind::Unterminated { text } => {
                    write!(f, "Value contains an unclosed replacement token '{}'", text)?
                }
                TokenErrorKind::UnresolvedSecret { name } => {
                    write!(f, "No substitution found for secret '{}'", name)?
                }
                TokenErrorKind::Unknown { token } => write!(f, "Unknown token '{}'", token)?,
            },
            ErrorKind::Io => write!(f, "I/O error")?,
        }

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(loc) = &self.source_location {
            write!(f, "\n  File: {}", loc.file)?;
            if let Some(line) = loc.line {
                write!(f, ":{}", line)?;
                if let Some(column) = loc.column {
                    write!(f, ":{}", column)?;
                }
            }
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_node_display() {
        let err = Error::unexpected_node(NodeKind::Mapping, NodeKind::Scalar);
        let display = format!("{}", err);

        assert!(display.contains("Expected YAML mapping node, found scalar"));
    }

    #[test]
    fn test_expected_for_key_display() {
        let err = Error::expected_for_key("replicas", NodeKind::Scalar);
        let display = format!("{}", err);

        assert!(display.contains("Expected YAML scalar for key 'replicas'"));
    }

    #[test]
    fn test_unrecognized_key_display() {
        let err = Error::unrecognized_key("color").with_path("secrets[0]");
        let display = format!("{}", err);

        assert!(display.contains("Unrecognized key 'color'"));
        assert!(display.contains("Path: secrets[0]"));
        assert!(display.contains("Help:"));
    }

    #[test]
    fn test_unterminated_token_display() {
        let err = Error::unterminated_token("${unclosed");
        let display = format!("{}", err);

        assert!(display.contains("unclosed replacement token '${unclosed'"));
        assert!(matches!(
            err.kind,
            ErrorKind::Token(TokenErrorKind::Unterminated { .. })
        ));
    }

    #[test]
    fn test_unresolved_secret_error() {
        let err = Error::unresolved_secret("missing");
        let display = format!("{}", err);

        assert!(display.contains("No substitution found for secret 'missing'"));
        assert!(display.contains("Help:"));
        assert_eq!(
            err.kind,
            ErrorKind::Token(TokenErrorKind::UnresolvedSecret {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn test_unknown_token_error() {
        let err = Error::unknown_token("${vault:key}");
        let display = format!("{}", err);

        assert!(display.contains("Unknown token '${vault:key}'"));
        assert!(display.contains("${rand:"));
    }

    #[test]
    fn test_with_source_location() {
        let err = Error::syntax("mapping values are not allowed here").with_source_location(
            SourceLocation {
                file: "flotilla.yaml".into(),
                line: Some(7),
                column: Some(12),
            },
        );
        let display = format!("{}", err);

        assert!(display.contains("flotilla.yaml:7:12"));
        assert!(display.contains("mapping values are not allowed here"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = Error::invalid_value("port", "'banana' must be an integer");
        let display = format!("{}", err);

        assert!(display.contains("Invalid value for key 'port'"));
        assert!(display.contains("must be an integer"));
    }

    #[test]
    fn test_in_segment_builds_outside_in() {
        let err = Error::unrecognized_key("color")
            .in_segment("bindings[1]")
            .in_segment("services[0]");

        assert_eq!(err.path.as_deref(), Some("services[0].bindings[1]"));
    }

    #[test]
    fn test_with_help_overrides() {
        let err = Error::syntax("bad input").with_help("Check the indentation");
        let display = format!("{}", err);

        assert!(display.contains("Help: Check the indentation"));
    }
}
