use core::fmt;

/// The kind of the next lexical token of a JSON document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// A member name of an object
    Name,
    /// A string literal
    String,
    /// A number literal, including lenient `NaN` and `Infinity`
    Number,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
    /// No more tokens
    EndDocument,
}

impl TokenKind {
    /// `true` for tokens that begin or make up a whole value
    pub fn is_value(self) -> bool {
        !matches!(self, TokenKind::EndArray|TokenKind::EndObject|TokenKind::Name|TokenKind::EndDocument)
    }

    /// `true` for string, number, boolean and null literals
    pub fn is_scalar(self) -> bool {
        matches!(self, TokenKind::String|TokenKind::Number|TokenKind::Boolean|TokenKind::Null)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::BeginArray => "`[`",
            TokenKind::EndArray => "`]`",
            TokenKind::BeginObject => "`{`",
            TokenKind::EndObject => "`}`",
            TokenKind::Name => "a member name",
            TokenKind::String => "a string",
            TokenKind::Number => "a number",
            TokenKind::Boolean => "a boolean",
            TokenKind::Null => "`null`",
            TokenKind::EndDocument => "the end of the document",
        })
    }
}
