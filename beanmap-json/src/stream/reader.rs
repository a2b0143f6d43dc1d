//! Pull-style JSON token reader
use std::borrow::Cow;
use std::string::String;
use std::vec::Vec;

use crate::error::{Error, Result, SyntaxError, DeserializationError};
use super::TokenKind;

/* special JSON characters */
const SP: u8 = b' ';
const QU: u8 = b'"';
const AP: u8 = b'\'';
const RS: u8 = b'\\';
const SO: u8 = b'/';
const T_: u8 = 0x09;
const N_: u8 = 0x0A;
const F_: u8 = 0x0C;
const R_: u8 = 0x0D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A member name was read, its value was not
    DanglingName,
    NonEmptyObject,
    EmptyDocument,
    NonEmptyDocument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    True,
    False,
    Null,
    /// Quoted name, the opening quote has been consumed
    QuotedName(u8),
    UnquotedName { len: usize },
    /// Quoted string, the opening quote has been consumed
    Quoted(u8),
    Unquoted { len: usize },
    Number { len: usize },
    EndDocument,
}

impl Peeked {
    fn kind(self) -> TokenKind {
        match self {
            Peeked::BeginObject => TokenKind::BeginObject,
            Peeked::EndObject => TokenKind::EndObject,
            Peeked::BeginArray => TokenKind::BeginArray,
            Peeked::EndArray => TokenKind::EndArray,
            Peeked::True|Peeked::False => TokenKind::Boolean,
            Peeked::Null => TokenKind::Null,
            Peeked::QuotedName(..)|Peeked::UnquotedName { .. } => TokenKind::Name,
            Peeked::Quoted(..)|Peeked::Unquoted { .. } => TokenKind::String,
            Peeked::Number { .. } => TokenKind::Number,
            Peeked::EndDocument => TokenKind::EndDocument,
        }
    }
}

/// Characters that may appear in an unquoted lenient literal
#[inline(always)]
fn is_literal(b: u8) -> bool {
    !matches!(b, SO|RS|b';'|b'#'|b'='|b'{'|b'}'|b'['|b']'|b':'|b','|AP|QU|SP|T_|N_|F_|R_)
}

#[inline(always)]
fn parse_hex_nib(ch: u8) -> Option<u8> {
    match ch {
        n@b'0'..=b'9' => Some(n - b'0'),
        _ => match ch|0x20 {
            n@b'a'..=b'f' => Some(n - b'a' + 10),
            _ => None
        }
    }
}

#[inline(always)]
fn parse_uuuu([a,b,c,d]: [u8;4]) -> Option<u32> {
    Some(u16::from_le_bytes([
        (parse_hex_nib(c)? << 4) + parse_hex_nib(d)?,
        (parse_hex_nib(a)? << 4) + parse_hex_nib(b)?]).into())
}

/// Validate `s` against the RFC 8259 number grammar
pub(crate) fn is_json_number(s: &[u8]) -> bool {
    let digits = |mut i: usize| {
        while matches!(s.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        i
    };
    let mut i = usize::from(s.first() == Some(&b'-'));
    match s.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits(i + 1),
        _ => return false
    }
    if s.get(i) == Some(&b'.') {
        let start = i + 1;
        i = digits(start);
        if i == start {
            return false
        }
    }
    if matches!(s.get(i), Some(b'e'|b'E')) {
        i += 1;
        if matches!(s.get(i), Some(b'+'|b'-')) {
            i += 1;
        }
        let start = i;
        i = digits(start);
        if i == start {
            return false
        }
    }
    i == s.len()
}

/// A pull-style reader of JSON tokens.
///
/// The reader tracks nested array/object scopes and validates the document
/// as it goes, one token at a time. It never materializes a document tree.
///
/// ```
/// use beanmap_json::stream::{JsonReader, TokenKind};
///
/// let mut reader = JsonReader::new(r#"{"a": [1, true]}"#);
/// reader.begin_object()?;
/// assert_eq!(reader.next_name()?, "a");
/// reader.begin_array()?;
/// assert_eq!(reader.next_number()?, "1");
/// assert!(reader.next_bool()?);
/// reader.end_array()?;
/// reader.end_object()?;
/// assert_eq!(reader.peek()?, TokenKind::EndDocument);
/// # Ok::<(), beanmap_json::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonReader<'de> {
    input: &'de str,
    index: usize,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
    lenient: bool,
}

impl<'de> JsonReader<'de> {
    /// Create a strict reader over `input`
    pub fn new(input: &'de str) -> Self {
        let mut stack = Vec::with_capacity(16);
        stack.push(Scope::EmptyDocument);
        JsonReader { input, index: 0, stack, peeked: None, lenient: false }
    }

    /// Create a strict reader over UTF-8 encoded `input`
    pub fn from_slice(input: &'de [u8]) -> Result<Self> {
        match core::str::from_utf8(input) {
            Ok(input) => Ok(Self::new(input)),
            Err(err) => Err(Error::syntax(SyntaxError::InvalidUtf8, err.valid_up_to()))
        }
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Byte offset of the cursor in the input
    pub fn offset(&self) -> usize {
        self.index
    }

    /// Number of currently open arrays and objects
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Return the kind of the next token without consuming it
    pub fn peek(&mut self) -> Result<TokenKind> {
        match self.peeked {
            Some(peeked) => Ok(peeked.kind()),
            None => self.do_peek().map(Peeked::kind)
        }
    }

    /// `true` if the current array or object has more elements
    pub fn has_next(&mut self) -> Result<bool> {
        Ok(!matches!(self.peek()?, TokenKind::EndArray|TokenKind::EndObject|TokenKind::EndDocument))
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.expect(Peeked::BeginArray, TokenKind::BeginArray)?;
        self.stack.push(Scope::EmptyArray);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.expect(Peeked::EndArray, TokenKind::EndArray)?;
        self.stack.pop();
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.expect(Peeked::BeginObject, TokenKind::BeginObject)?;
        self.stack.push(Scope::EmptyObject);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<()> {
        self.expect(Peeked::EndObject, TokenKind::EndObject)?;
        self.stack.pop();
        Ok(())
    }

    /// Consume the next member name
    pub fn next_name(&mut self) -> Result<Cow<'de, str>> {
        let name = match self.peek_token()? {
            Peeked::QuotedName(quote) => self.parse_quoted(quote)?,
            Peeked::UnquotedName { len } => Cow::Borrowed(self.take(len)),
            other => return Err(self.unexpected(TokenKind::Name, other))
        };
        self.peeked = None;
        Ok(name)
    }

    /// Consume the next string literal.
    ///
    /// Number literals are returned as their original text.
    pub fn next_string(&mut self) -> Result<Cow<'de, str>> {
        let string = match self.peek_token()? {
            Peeked::Quoted(quote) => self.parse_quoted(quote)?,
            Peeked::Unquoted { len }|Peeked::Number { len } => Cow::Borrowed(self.take(len)),
            other => return Err(self.unexpected(TokenKind::String, other))
        };
        self.peeked = None;
        Ok(string)
    }

    pub fn next_bool(&mut self) -> Result<bool> {
        let value = match self.peek_token()? {
            Peeked::True => true,
            Peeked::False => false,
            other => return Err(self.unexpected(TokenKind::Boolean, other))
        };
        self.peeked = None;
        Ok(value)
    }

    pub fn next_null(&mut self) -> Result<()> {
        self.expect(Peeked::Null, TokenKind::Null)
    }

    /// Consume the next number literal and return its original text
    pub fn next_number(&mut self) -> Result<&'de str> {
        match self.peek_token()? {
            Peeked::Number { len } => {
                self.peeked = None;
                Ok(self.take(len))
            }
            other => Err(self.unexpected(TokenKind::Number, other))
        }
    }

    /// Consume the next number literal as a signed integer
    pub fn next_i64(&mut self) -> Result<i64> {
        let text = self.next_number()?;
        parse_integer(text, "i64")
    }

    /// Consume the next number literal as an unsigned integer
    pub fn next_u64(&mut self) -> Result<u64> {
        let text = self.next_number()?;
        parse_integer(text, "u64")
    }

    /// Consume the next number literal as a float
    pub fn next_f64(&mut self) -> Result<f64> {
        let text = self.next_number()?;
        parse_float(text)
    }

    /// Skip the next value including all of its nested content
    pub fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.peek_token()? {
                Peeked::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                Peeked::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                Peeked::EndArray if depth != 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                Peeked::EndObject if depth != 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                Peeked::QuotedName(quote) if depth != 0 => {
                    self.skip_quoted(quote)?;
                    self.peeked = None;
                }
                Peeked::Quoted(quote) => {
                    self.skip_quoted(quote)?;
                    self.peeked = None;
                }
                Peeked::UnquotedName { len } if depth != 0 => {
                    self.take(len);
                    self.peeked = None;
                }
                Peeked::Unquoted { len }|Peeked::Number { len } => {
                    self.take(len);
                    self.peeked = None;
                }
                Peeked::True|Peeked::False|Peeked::Null => {
                    self.peeked = None;
                }
                Peeked::EndDocument => {
                    return Err(Error::syntax(SyntaxError::UnexpectedEof, self.index))
                }
                other => return Err(self.unexpected(TokenKind::String, other))
            }
            if depth == 0 {
                return Ok(())
            }
        }
    }

    /// Check that only whitespace follows the last top-level value
    pub fn end(&mut self) -> Result<()> {
        match self.peek()? {
            TokenKind::EndDocument => Ok(()),
            _ => Err(Error::syntax(SyntaxError::TrailingCharacters, self.index))
        }
    }

    fn expect(&mut self, peeked: Peeked, expected: TokenKind) -> Result<()> {
        let found = self.peek_token()?;
        if found == peeked {
            self.peeked = None;
            Ok(())
        }
        else {
            Err(self.unexpected(expected, found))
        }
    }

    fn unexpected(&self, expected: TokenKind, found: Peeked) -> Error {
        Error::syntax(SyntaxError::UnexpectedToken { expected, found: found.kind() }, self.index)
    }

    fn peek_token(&mut self) -> Result<Peeked> {
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => self.do_peek()
        }
    }

    #[inline]
    fn take(&mut self, len: usize) -> &'de str {
        let start = self.index;
        self.index += len;
        &self.input[start..self.index]
    }

    #[inline]
    fn byte(&self, index: usize) -> Option<u8> {
        self.input.as_bytes().get(index).copied()
    }

    /// Advance cursor past any JSON whitespace and peek at the next character
    fn eat_whitespace(&mut self) -> Option<u8> {
        let bytes = self.input.as_bytes();
        let pos = bytes[self.index..].iter()
            .position(|&b| !matches!(b, SP|T_|N_|R_))?;
        self.index += pos;
        Some(bytes[self.index])
    }

    fn next_non_whitespace(&mut self) -> Result<u8> {
        self.eat_whitespace()
            .ok_or_else(|| Error::syntax(SyntaxError::UnexpectedEof, self.index))
    }

    fn check_lenient(&self, construct: &'static str) -> Result<()> {
        if self.lenient {
            Ok(())
        }
        else {
            Err(Error::syntax(SyntaxError::LenientOnly(construct), self.index))
        }
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn do_peek(&mut self) -> Result<Peeked> {
        let top = self.stack.last().copied().unwrap_or(Scope::EmptyDocument);
        let peeked = match top {
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                None
            }
            Scope::NonEmptyArray => match self.next_non_whitespace()? {
                b']' => {
                    self.index += 1;
                    Some(Peeked::EndArray)
                }
                b',' => {
                    self.index += 1;
                    if self.eat_whitespace() == Some(b']') {
                        self.check_trailing_comma()?;
                        self.index += 1;
                        Some(Peeked::EndArray)
                    }
                    else {
                        None
                    }
                }
                _ => return Err(Error::syntax(SyntaxError::ExpectedArrayCommaOrEnd, self.index))
            }
            Scope::EmptyObject|Scope::NonEmptyObject => Some(self.peek_name(top)?),
            Scope::DanglingName => {
                self.set_top(Scope::NonEmptyObject);
                match self.next_non_whitespace()? {
                    b':' => self.index += 1,
                    _ => return Err(Error::syntax(SyntaxError::ExpectedColon, self.index))
                }
                None
            }
            Scope::EmptyDocument => {
                self.set_top(Scope::NonEmptyDocument);
                None
            }
            Scope::NonEmptyDocument => match self.eat_whitespace() {
                None => Some(Peeked::EndDocument),
                Some(..) => {
                    if !self.lenient {
                        return Err(Error::syntax(SyntaxError::TrailingCharacters, self.index))
                    }
                    None
                }
            }
        };
        let peeked = match peeked {
            Some(peeked) => peeked,
            None => self.peek_value(top)?
        };
        self.peeked = Some(peeked);
        Ok(peeked)
    }

    fn check_trailing_comma(&self) -> Result<()> {
        if self.lenient {
            Ok(())
        }
        else {
            Err(Error::syntax(SyntaxError::TrailingComma, self.index))
        }
    }

    fn peek_name(&mut self, top: Scope) -> Result<Peeked> {
        if top == Scope::NonEmptyObject {
            match self.next_non_whitespace()? {
                b'}' => {
                    self.index += 1;
                    return Ok(Peeked::EndObject)
                }
                b',' => self.index += 1,
                _ => return Err(Error::syntax(SyntaxError::ExpectedObjectCommaOrEnd, self.index))
            }
        }
        self.set_top(Scope::DanglingName);
        match self.next_non_whitespace()? {
            QU => {
                self.index += 1;
                Ok(Peeked::QuotedName(QU))
            }
            AP => {
                self.check_lenient("a single-quoted name")?;
                self.index += 1;
                Ok(Peeked::QuotedName(AP))
            }
            b'}' => {
                if top == Scope::NonEmptyObject {
                    self.check_trailing_comma()?;
                }
                self.index += 1;
                Ok(Peeked::EndObject)
            }
            b',' => Err(Error::syntax(SyntaxError::LeadingComma, self.index)),
            c if is_literal(c) => {
                self.check_lenient("an unquoted name")?;
                Ok(Peeked::UnquotedName { len: self.literal_len() })
            }
            _ => Err(Error::syntax(SyntaxError::KeyMustBeAString, self.index))
        }
    }

    fn peek_value(&mut self, top: Scope) -> Result<Peeked> {
        let c = self.next_non_whitespace()?;
        let peeked = match c {
            b']' if top == Scope::EmptyArray => Peeked::EndArray,
            b',' if matches!(top, Scope::EmptyArray|Scope::NonEmptyArray) => {
                return Err(Error::syntax(SyntaxError::LeadingComma, self.index))
            }
            QU => Peeked::Quoted(QU),
            AP => {
                self.check_lenient("a single-quoted string")?;
                Peeked::Quoted(AP)
            }
            b'[' => Peeked::BeginArray,
            b'{' => Peeked::BeginObject,
            c if is_literal(c) => return self.peek_literal(),
            c => return Err(self.unexpected_char(c))
        };
        self.index += 1;
        Ok(peeked)
    }

    fn unexpected_char(&self, c: u8) -> Error {
        let ch = self.input[self.index..].chars().next().unwrap_or(char::from(c));
        Error::syntax(SyntaxError::UnexpectedChar(ch), self.index)
    }

    fn literal_len(&self) -> usize {
        let bytes = &self.input.as_bytes()[self.index..];
        bytes.iter().position(|&b| !is_literal(b)).unwrap_or(bytes.len())
    }

    /// Classify a run of literal characters: keyword, number or lenient string
    fn peek_literal(&mut self) -> Result<Peeked> {
        let len = self.literal_len();
        let word = &self.input[self.index..self.index + len];
        let peeked = match word {
            "true" => Peeked::True,
            "false" => Peeked::False,
            "null" => Peeked::Null,
            "NaN"|"Infinity"|"-Infinity" => {
                self.check_lenient("a non-finite number literal")?;
                return Ok(Peeked::Number { len })
            }
            _ if is_json_number(word.as_bytes()) => return Ok(Peeked::Number { len }),
            _ if self.lenient => return Ok(Peeked::Unquoted { len }),
            _ => {
                let at_end = self.index + len == self.input.len();
                let is_prefix = ["true", "false", "null"].iter().any(|kw| kw.starts_with(word));
                let kind = match word.as_bytes()[0] {
                    _ if at_end && is_prefix => SyntaxError::UnexpectedEof,
                    b't'|b'f'|b'n' => SyntaxError::ExpectedToken,
                    b'-'|b'0'..=b'9' => SyntaxError::InvalidNumber,
                    _ => SyntaxError::LenientOnly("an unquoted literal")
                };
                return Err(Error::syntax(kind, self.index))
            }
        };
        self.index += len;
        Ok(peeked)
    }

    fn parse_hex4(&self, index: usize) -> Result<u32> {
        let code: [u8;4] = self.input.as_bytes().get(index..index+4)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| Error::syntax(SyntaxError::UnexpectedEof, index))?;
        parse_uuuu(code).ok_or_else(|| Error::syntax(SyntaxError::InvalidEscapeSequence, index))
    }

    /// Parse string content until the closing `quote`, call after consuming the opening one.
    ///
    /// Strings without escape sequences are borrowed from the input.
    fn parse_quoted(&mut self, quote: u8) -> Result<Cow<'de, str>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let start = self.index;
        let mut index = start;
        /* search for either the quote, '\' or a control character */
        loop {
            match bytes.get(index).copied() {
                Some(b) if b == quote => {
                    self.index = index + 1;
                    return Ok(Cow::Borrowed(&input[start..index]))
                }
                Some(RS) => break,
                Some(b) if b <= 0x1F => {
                    return Err(Error::syntax(SyntaxError::StringControlChar, index))
                }
                Some(..) => index += 1,
                None => return Err(Error::syntax(SyntaxError::UnexpectedEof, index))
            }
        }
        let mut out = String::with_capacity(index - start + 16);
        let mut run = start;
        loop {
            match bytes.get(index).copied() {
                Some(b) if b == quote => {
                    out.push_str(&input[run..index]);
                    self.index = index + 1;
                    return Ok(Cow::Owned(out))
                }
                Some(RS) => {
                    out.push_str(&input[run..index]);
                    let escape = self.byte(index + 1)
                        .ok_or_else(|| Error::syntax(SyntaxError::UnexpectedEof, index + 1))?;
                    index += 2;
                    let ch = match escape {
                        QU|RS|SO => char::from(escape),
                        AP if self.lenient => char::from(escape),
                        b'b' => '\x08',
                        b't' => '\t',
                        b'n' => '\n',
                        b'f' => '\x0C',
                        b'r' => '\r',
                        b'u' => {
                            let code = self.parse_hex4(index)?;
                            index += 4;
                            self.decode_code_point(code, &mut index)?
                        }
                        _ => return Err(Error::syntax(SyntaxError::InvalidEscapeSequence, index - 1))
                    };
                    out.push(ch);
                    run = index;
                }
                Some(b) if b <= 0x1F => {
                    return Err(Error::syntax(SyntaxError::StringControlChar, index))
                }
                Some(..) => index += 1,
                None => return Err(Error::syntax(SyntaxError::UnexpectedEof, index))
            }
        }
    }

    /// Combine UTF-16 surrogate pairs, `index` points after the first `\uXXXX`
    fn decode_code_point(&self, code: u32, index: &mut usize) -> Result<char> {
        let invalid = |at| Error::syntax(SyntaxError::InvalidUnicodeCodePoint, at);
        if !(0xD800..0xDC00).contains(&code) {
            return char::from_u32(code).ok_or_else(|| invalid(*index))
        }
        if self.input.as_bytes().get(*index..*index + 2) != Some(b"\\u") {
            return Err(invalid(*index))
        }
        let low = self.parse_hex4(*index + 2)?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(invalid(*index))
        }
        *index += 6;
        let code = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| invalid(*index))
    }

    /// Consume a string until the closing `quote` without decoding it
    fn skip_quoted(&mut self, quote: u8) -> Result<()> {
        let bytes = self.input.as_bytes();
        let mut index = self.index;
        loop {
            match bytes.get(index).copied() {
                Some(b) if b == quote => {
                    self.index = index + 1;
                    return Ok(())
                }
                Some(RS) => index += 2,
                Some(b) if b <= 0x1F => {
                    return Err(Error::syntax(SyntaxError::StringControlChar, index))
                }
                Some(..) => index += 1,
                None => return Err(Error::syntax(SyntaxError::UnexpectedEof, index))
            }
        }
    }
}

/// Parse the text of a number literal as an integer of the target width.
///
/// Integral values written with a fraction or an exponent (`1.0`, `2e3`) are
/// accepted. The digits are scaled exactly, so a value is either represented
/// as written or rejected.
pub(crate) fn parse_integer<T>(text: &str, target: &'static str) -> Result<T>
    where T: core::str::FromStr + TryFrom<i128>
{
    if let Ok(value) = text.parse::<T>() {
        return Ok(value)
    }
    let invalid = || Error::from(DeserializationError::InvalidValue {
        value: text.into(), target
    });
    let out_of_range = || Error::from(DeserializationError::OutOfRange {
        value: text.into(), target
    });
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text)
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
        None => (unsigned, None)
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (mantissa, "")
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !all_digits(whole) || !all_digits(fraction) {
        return Err(invalid())
    }
    let mut scale = match exponent {
        Some(exp) => parse_exponent(exp).ok_or_else(invalid)?,
        None => 0
    };
    scale -= i64::try_from(fraction.len()).map_err(|_| invalid())?;

    let digits = whole.bytes().chain(fraction.bytes())
                 .skip_while(|&b| b == b'0')
                 .collect::<Vec<u8>>();
    let significant = digits.iter().rposition(|&b| b != b'0').map_or(0, |last| last + 1);
    if significant == 0 {
        return T::try_from(0i128).map_err(|_| out_of_range())
    }
    scale += i64::try_from(digits.len() - significant).map_err(|_| invalid())?;
    if scale < 0 {
        return Err(invalid())
    }
    // i128 holds at most 39 decimal digits
    if significant as i64 + scale > 40 {
        return Err(out_of_range())
    }
    let mut magnitude: u128 = 0;
    for &digit in &digits[..significant] {
        magnitude = magnitude.checked_mul(10)
            .and_then(|m| m.checked_add(u128::from(digit - b'0')))
            .ok_or_else(out_of_range)?;
    }
    for _ in 0..scale {
        magnitude = magnitude.checked_mul(10).ok_or_else(out_of_range)?;
    }
    let value = i128::try_from(magnitude).map_err(|_| out_of_range())?;
    let value = if negative { -value } else { value };
    T::try_from(value).map_err(|_| out_of_range())
}

/// Exponent digits with an optional sign, saturated well past any integer width
fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text)
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None
    }
    let exp = digits.bytes().fold(0i64, |acc, b| {
        (acc * 10 + i64::from(b - b'0')).min(1_000_000)
    });
    Some(if negative { -exp } else { exp })
}

/// Parse the text of a number literal, including lenient `NaN` and `Infinity`
pub(crate) fn parse_float(text: &str) -> Result<f64> {
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => text.parse::<f64>().map_err(|_| Error::from(DeserializationError::InvalidValue {
            value: text.into(), target: "number"
        }))
    }
}
