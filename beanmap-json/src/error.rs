//! Error types shared by the token stream, the codecs and the resolver
use std::string::String;

use beanmap_write::SinkError;

use crate::stream::TokenKind;

/// Result of every fallible operation in this crate
pub type Result<T> = core::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Structural,
    Deserialization,
    Serialization,
    Resolution,
    Sink,
}

/// The error returned from serialization, deserialization and codec construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed JSON text
    #[error("{kind} at offset {offset}")]
    Syntax { kind: SyntaxError, offset: usize },
    /// Misuse of the writer API
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// Well-formed JSON that does not fit the target value
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),
    /// A value that can not be represented in JSON
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    /// Codec construction failed
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// Underlying sink error
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// An error raised while handling the named bean property
    #[error("property `{property}`: {source}")]
    Property { property: String, source: Box<Error> },
}

impl Error {
    pub(crate) fn syntax(kind: SyntaxError, offset: usize) -> Self {
        Error::Syntax { kind, offset }
    }

    /// Attach the name of the bean property being processed
    pub fn in_property(self, property: &str) -> Self {
        Error::Property { property: property.into(), source: Box::new(self) }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::Structural(..) => ErrorKind::Structural,
            Error::Deserialization(..) => ErrorKind::Deserialization,
            Error::Serialization(..) => ErrorKind::Serialization,
            Error::Resolution(..) => ErrorKind::Resolution,
            Error::Sink(..) => ErrorKind::Sink,
            Error::Property { source, .. } => source.kind(),
        }
    }

    /// Strip property context and return the innermost error
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Property { source, .. } => source.root_cause(),
            err => err
        }
    }
}

/// Malformed JSON input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SyntaxError {
    #[error("Unexpected end of JSON input")]
    UnexpectedEof,
    #[error("Invalid JSON string escape sequence")]
    InvalidEscapeSequence,
    #[error("A control ASCII character found in a JSON string")]
    StringControlChar,
    #[error("Expected `':'`")]
    ExpectedColon,
    #[error("Expected `','` or `']'`")]
    ExpectedArrayCommaOrEnd,
    #[error("Expected `','` or `'}}'`")]
    ExpectedObjectCommaOrEnd,
    #[error("JSON content starts with a leading `','`")]
    LeadingComma,
    #[error("JSON content ends with a trailing `','`")]
    TrailingComma,
    #[error("Object key is not a string")]
    KeyMustBeAString,
    #[error("Unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("Expected either `true`, `false`, or `null`")]
    ExpectedToken,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Invalid unicode code point")]
    InvalidUnicodeCodePoint,
    #[error("Input is not valid UTF-8")]
    InvalidUtf8,
    #[error("JSON has non-whitespace trailing character after the value")]
    TrailingCharacters,
    #[error("Expected {expected} but found {found}")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },
    #[error("{0} is only accepted in lenient mode")]
    LenientOnly(&'static str),
}

/// Misuse of the [`JsonWriter`](crate::stream::JsonWriter) API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StructuralError {
    #[error("A member name written outside of an object")]
    NameOutsideObject,
    #[error("A member name written while another name awaits its value")]
    DanglingName,
    #[error("A value written inside of an object without a member name")]
    ValueWithoutName,
    #[error("Closing {requested} while inside of {actual}")]
    MismatchedEnd { requested: &'static str, actual: &'static str },
    #[error("Multiple top-level values require lenient mode")]
    MultipleTopLevelValues,
    #[error("JSON document is incomplete")]
    IncompleteDocument,
}

/// JSON text that does not fit the requested value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DeserializationError {
    #[error("Expected {expected} but found {found}")]
    UnexpectedToken { expected: &'static str, found: TokenKind },
    #[error("Value `{value}` is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("Value `{value}` is not a valid {target}")]
    InvalidValue { value: String, target: &'static str },
    #[error("Unknown constant `{name}` of {target}")]
    UnknownVariant { name: String, target: &'static str },
    #[error("Unknown property `{name}` of {target}")]
    UnknownProperty { name: String, target: String },
    #[error("Missing type tag `{0}`")]
    MissingTypeTag(String),
    #[error("Unknown type tag `{0}`")]
    UnknownTypeTag(String),
}

/// A value that can not be written as JSON
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SerializationError {
    #[error("Map key `{0}` occurs more than once after string conversion")]
    DuplicateKey(String),
    #[error("Null {0} is not allowed here")]
    NullValue(&'static str),
    #[error("Non-finite numbers require lenient mode")]
    NonFiniteNumber,
    #[error("`{0}` is not a valid JSON number")]
    InvalidNumber(String),
    #[error("Invalid date format pattern `{0}`")]
    DateFormat(String),
    #[error("No registered subtype matches the value of {0}")]
    UnmatchedSubtype(&'static str),
}

/// A codec could not be built for a type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("No structural information for type `{0}`")]
    UnknownType(String),
    #[error("Type `{type_name}` expects {expected} type arguments, {found} given")]
    TypeArgumentArity { type_name: String, expected: usize, found: usize },
    #[error("Type `{0}` inherits from itself")]
    CyclicInheritance(String),
    #[error("Property `{property}` of `{type_name}` has no accessor")]
    MissingAccessor { type_name: String, property: String },
    #[error("No codec registered for `{0}`")]
    Unregistered(&'static str),
    #[error("Lazy codec for `{0}` used before it was bound")]
    Unbound(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_display() {
        let err = Error::syntax(SyntaxError::ExpectedColon, 7);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.to_string(), "Expected `':'` at offset 7");

        let err = Error::from(DeserializationError::OutOfRange {
            value: "300".into(), target: "u8"
        }).in_property("age").in_property("owner");
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert_eq!(err.to_string(),
            "property `owner`: property `age`: Value `300` is out of range for u8");
        assert!(matches!(err.root_cause(), Error::Deserialization(..)));

        let err = Error::from(SinkError::BufferFull);
        assert_eq!(err.kind(), ErrorKind::Sink);
        assert_eq!(err.to_string(), "buffer is full");
    }
}
