//! Push-style JSON token writer
use std::string::String;
use std::vec::Vec;

use beanmap_write::CharSink;

use crate::context::Context;
use crate::error::{Result, StructuralError, SerializationError};
use super::reader::is_json_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    DanglingName,
    NonEmptyObject,
    EmptyDocument,
    NonEmptyDocument,
}

impl Scope {
    fn describe(self) -> &'static str {
        match self {
            Scope::EmptyArray|Scope::NonEmptyArray => "an array",
            Scope::EmptyObject|Scope::DanglingName|Scope::NonEmptyObject => "an object",
            Scope::EmptyDocument|Scope::NonEmptyDocument => "the document",
        }
    }
}

/// A push-style writer of JSON tokens.
///
/// The writer checks that the tokens it is given form a well-formed document:
/// names only inside of objects, a name before every object member value,
/// matched closings, and a single top-level value unless lenient.
///
/// A member name is held back until its value arrives, so that with
/// `omit_nulls` enabled a name followed by `null` leaves no trace.
///
/// ```
/// use beanmap_json::stream::JsonWriter;
///
/// let mut out = String::new();
/// let mut writer = JsonWriter::new(&mut out);
/// writer.begin_object()?;
/// writer.name("id")?;
/// writer.i64_value(-7)?;
/// writer.name("tags")?;
/// writer.begin_array()?;
/// writer.string_value("a\"b")?;
/// writer.end_array()?;
/// writer.end_object()?;
/// writer.finish()?;
/// assert_eq!(out, r#"{"id":-7,"tags":["a\"b"]}"#);
/// # Ok::<(), beanmap_json::Error>(())
/// ```
pub struct JsonWriter<'w> {
    sink: &'w mut dyn CharSink,
    stack: Vec<Scope>,
    deferred_name: Option<String>,
    lenient: bool,
    omit_nulls: bool,
    indent: Option<usize>,
}

impl<'w> JsonWriter<'w> {
    /// Create a compact strict writer that emits `null` members
    pub fn new(sink: &'w mut dyn CharSink) -> Self {
        let mut stack = Vec::with_capacity(16);
        stack.push(Scope::EmptyDocument);
        JsonWriter {
            sink, stack,
            deferred_name: None,
            lenient: false,
            omit_nulls: false,
            indent: None
        }
    }

    /// Create a writer configured from `ctx`
    pub fn with_context(sink: &'w mut dyn CharSink, ctx: &Context) -> Self {
        let mut writer = Self::new(sink);
        writer.lenient = ctx.lenient;
        writer.omit_nulls = ctx.omit_nulls;
        writer.indent = ctx.indent;
        writer
    }

    pub fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Drop object members whose value is `null`
    pub fn set_omit_nulls(&mut self, omit_nulls: bool) {
        self.omit_nulls = omit_nulls;
    }

    pub fn omit_nulls(&self) -> bool {
        self.omit_nulls
    }

    /// Pretty-print with `indent` spaces per nesting level
    pub fn set_indent(&mut self, indent: Option<usize>) {
        self.indent = indent;
    }

    /// Number of currently open arrays and objects
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn begin_array(&mut self) -> Result<()> {
        self.open(Scope::EmptyArray, "[")
    }

    pub fn end_array(&mut self) -> Result<()> {
        self.close(Scope::EmptyArray, Scope::NonEmptyArray, "an array", "]")
    }

    pub fn begin_object(&mut self) -> Result<()> {
        self.open(Scope::EmptyObject, "{")
    }

    pub fn end_object(&mut self) -> Result<()> {
        self.close(Scope::EmptyObject, Scope::NonEmptyObject, "an object", "}")
    }

    /// Write the name of the next object member
    pub fn name(&mut self, name: &str) -> Result<()> {
        if self.deferred_name.is_some() {
            return Err(StructuralError::DanglingName.into())
        }
        match self.top() {
            Scope::EmptyObject|Scope::NonEmptyObject => {
                self.deferred_name = Some(name.into());
                Ok(())
            }
            Scope::DanglingName => Err(StructuralError::DanglingName.into()),
            _ => Err(StructuralError::NameOutsideObject.into())
        }
    }

    pub fn string_value(&mut self, value: &str) -> Result<()> {
        self.before_value()?;
        self.write_quoted(value)
    }

    pub fn bool_value(&mut self, value: bool) -> Result<()> {
        self.before_value()?;
        self.write(if value { "true" } else { "false" })
    }

    /// Write `null`, or drop the pending member entirely when omitting nulls
    pub fn null_value(&mut self) -> Result<()> {
        if self.omit_nulls && self.deferred_name.is_some() {
            self.deferred_name = None;
            return Ok(())
        }
        self.before_value()?;
        self.write("null")
    }

    pub fn i64_value(&mut self, value: i64) -> Result<()> {
        self.before_value()?;
        // "-9223372036854775808"
        let mut buf = [0u8;20];
        let digits = format_u64(value.unsigned_abs(), &mut buf);
        if value < 0 {
            self.write("-")?;
        }
        self.write(digits)
    }

    pub fn u64_value(&mut self, value: u64) -> Result<()> {
        self.before_value()?;
        // "18446744073709551615"
        let mut buf = [0u8;20];
        let digits = format_u64(value, &mut buf);
        self.write(digits)
    }

    pub fn f32_value(&mut self, value: f32) -> Result<()> {
        if value.is_finite() {
            self.before_value()?;
            let mut buffer = ryu_js::Buffer::new();
            let printed = buffer.format_finite(value);
            self.write(printed)
        }
        else {
            self.non_finite(value.is_nan(), value.is_sign_negative())
        }
    }

    pub fn f64_value(&mut self, value: f64) -> Result<()> {
        if value.is_finite() {
            self.before_value()?;
            let mut buffer = ryu_js::Buffer::new();
            let printed = buffer.format_finite(value);
            self.write(printed)
        }
        else {
            self.non_finite(value.is_nan(), value.is_sign_negative())
        }
    }

    /// Write a number given as its JSON text
    pub fn raw_number(&mut self, text: &str) -> Result<()> {
        let valid = is_json_number(text.as_bytes()) ||
            self.lenient && matches!(text, "NaN"|"Infinity"|"-Infinity");
        if !valid {
            return Err(SerializationError::InvalidNumber(text.into()).into())
        }
        self.before_value()?;
        self.write(text)
    }

    /// Check that a complete document has been written
    pub fn finish(&mut self) -> Result<()> {
        if self.deferred_name.is_some() || self.top() != Scope::NonEmptyDocument {
            return Err(StructuralError::IncompleteDocument.into())
        }
        Ok(())
    }

    fn non_finite(&mut self, nan: bool, negative: bool) -> Result<()> {
        if !self.lenient {
            return Err(SerializationError::NonFiniteNumber.into())
        }
        self.before_value()?;
        self.write(match (nan, negative) {
            (true, _) => "NaN",
            (false, false) => "Infinity",
            (false, true) => "-Infinity",
        })
    }

    #[inline]
    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::EmptyDocument)
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    #[inline]
    fn write(&mut self, s: &str) -> Result<()> {
        Ok(self.sink.write_str(s)?)
    }

    fn open(&mut self, scope: Scope, bracket: &str) -> Result<()> {
        self.before_value()?;
        self.stack.push(scope);
        self.write(bracket)
    }

    fn close(&mut self, empty: Scope, nonempty: Scope, requested: &'static str, bracket: &str) -> Result<()> {
        let top = self.top();
        if self.deferred_name.is_some() {
            return Err(StructuralError::DanglingName.into())
        }
        if top != empty && top != nonempty {
            return Err(StructuralError::MismatchedEnd { requested, actual: top.describe() }.into())
        }
        self.stack.pop();
        if top == nonempty {
            self.newline()?;
        }
        self.write(bracket)
    }

    fn newline(&mut self) -> Result<()> {
        if let Some(indent) = self.indent {
            self.write("\n")?;
            for _ in 0..self.depth() * indent {
                self.write(" ")?;
            }
        }
        Ok(())
    }

    /// Emit separators and the pending member name before a value
    fn before_value(&mut self) -> Result<()> {
        if let Some(name) = self.deferred_name.take() {
            if self.top() == Scope::NonEmptyObject {
                self.write(",")?;
            }
            self.newline()?;
            self.write_quoted(&name)?;
            self.set_top(Scope::DanglingName);
        }
        match self.top() {
            Scope::EmptyDocument => self.set_top(Scope::NonEmptyDocument),
            Scope::NonEmptyDocument => {
                if !self.lenient {
                    return Err(StructuralError::MultipleTopLevelValues.into())
                }
                self.write("\n")?;
            }
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                self.newline()?;
            }
            Scope::NonEmptyArray => {
                self.write(",")?;
                self.newline()?;
            }
            Scope::DanglingName => {
                self.write(if self.indent.is_some() { ": " } else { ":" })?;
                self.set_top(Scope::NonEmptyObject);
            }
            Scope::EmptyObject|Scope::NonEmptyObject => {
                return Err(StructuralError::ValueWithoutName.into())
            }
        }
        Ok(())
    }

    fn write_quoted(&mut self, value: &str) -> Result<()> {
        self.write("\"")?;
        format_escaped_str_contents(&mut *self.sink, value)?;
        self.write("\"")
    }
}

/// Format decimal digits of `v` at the end of `buf`
fn format_u64(mut v: u64, buf: &mut [u8;20]) -> &str {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = (v % 10) as u8 + b'0';
        v /= 10;
        if v == 0 {
            break;
        }
    }
    // SAFETY: only ASCII digits were written to buf[i..]
    unsafe { core::str::from_utf8_unchecked(&buf[i..]) }
}

#[inline(always)]
fn hex_4bit(c: u8) -> char {
    char::from(if c <= 9 { b'0' + c } else { b'A' + (c - 10) })
}

pub(crate) fn format_escaped_str_contents(
    sink: &mut dyn CharSink,
    value: &str,
) -> beanmap_write::SinkResult<()>
{
    let bytes = value.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escape = match byte {
            0x00..=0x1F => ESCAPE[byte as usize],
            QU|BS => byte,
            _ => continue
        };

        if start < i {
            sink.write_str(&value[start..i])?;
        }

        if escape == UU {
            sink.write_str("\\u00")?;
            sink.write_char(hex_4bit(byte >> 4))?;
            sink.write_char(hex_4bit(byte & 0x0F))?;
        }
        else {
            sink.write_char('\\')?;
            sink.write_char(char::from(escape))?;
        }

        start = i + 1;
    }

    if start == bytes.len() {
        return Ok(())
    }
    sink.write_str(&value[start..])
}

const BB: u8 = b'b'; // \x08
const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const FF: u8 = b'f'; // \x0C
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const BS: u8 = b'\\'; // \x5C
const UU: u8 = b'u'; // \x00...\x1F except the ones above

// A value of b'x' at index i means that byte i is escaped as "\x" in JSON.
static ESCAPE: [u8; 32] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    UU, UU, UU, UU, UU, UU, UU, UU, BB, TT, NN, UU, FF, RR, UU, UU, // 0
    UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, UU, // 1
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    fn write_with<F>(setup: impl FnOnce(&mut JsonWriter<'_>), f: F) -> Result<String>
        where F: FnOnce(&mut JsonWriter<'_>) -> Result<()>
    {
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out);
        setup(&mut writer);
        f(&mut writer)?;
        writer.finish()?;
        Ok(out)
    }

    fn compact<F>(f: F) -> Result<String>
        where F: FnOnce(&mut JsonWriter<'_>) -> Result<()>
    {
        write_with(|_| {}, f)
    }

    #[test]
    fn test_write_scalars() {
        assert_eq!(compact(|w| w.i64_value(i64::MIN)).unwrap(), "-9223372036854775808");
        assert_eq!(compact(|w| w.i64_value(0)).unwrap(), "0");
        assert_eq!(compact(|w| w.u64_value(u64::MAX)).unwrap(), "18446744073709551615");
        assert_eq!(compact(|w| w.f64_value(0.4)).unwrap(), "0.4");
        assert_eq!(compact(|w| w.f64_value(1.0)).unwrap(), "1");
        assert_eq!(compact(|w| w.f32_value(-1.5)).unwrap(), "-1.5");
        assert_eq!(compact(|w| w.f64_value(1e21)).unwrap(), "1e+21");
        assert_eq!(compact(|w| w.bool_value(true)).unwrap(), "true");
        assert_eq!(compact(|w| w.null_value()).unwrap(), "null");
        assert_eq!(compact(|w| w.raw_number("-1.25e3")).unwrap(), "-1.25e3");
        assert_eq!(compact(|w| w.string_value(" Hello\r\\ \x08\nW\tor\x0cld\x7f!\"\x00"))
            .unwrap(), "\" Hello\\r\\\\ \\b\\nW\\tor\\fld\x7f!\\\"\\u0000\"");
        assert_eq!(compact(|w| w.string_value("\x1f")).unwrap(), r#""\u001F""#);
    }

    #[test]
    fn test_write_non_finite() {
        let err = compact(|w| w.f64_value(f64::NAN)).unwrap_err();
        assert_eq!(err, Error::Serialization(SerializationError::NonFiniteNumber));
        let err = compact(|w| w.f32_value(f32::INFINITY)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        let out = write_with(|w| w.set_lenient(true), |w| {
            w.begin_array()?;
            w.f64_value(f64::NAN)?;
            w.f64_value(f64::INFINITY)?;
            w.f32_value(f32::NEG_INFINITY)?;
            w.raw_number("NaN")?;
            w.end_array()
        }).unwrap();
        assert_eq!(out, "[NaN,Infinity,-Infinity,NaN]");
        let err = compact(|w| w.raw_number("NaN")).unwrap_err();
        assert_eq!(err, Error::Serialization(SerializationError::InvalidNumber("NaN".into())));
        assert!(compact(|w| w.raw_number("0x1F")).is_err());
    }

    #[test]
    fn test_write_nested() {
        let out = compact(|w| {
            w.begin_object()?;
            w.name("list")?;
            w.begin_array()?;
            w.string_value("Hello")?;
            w.begin_object()?;
            w.end_object()?;
            w.begin_array()?;
            w.end_array()?;
            w.end_array()?;
            w.name("n")?;
            w.null_value()?;
            w.end_object()
        }).unwrap();
        assert_eq!(out, r#"{"list":["Hello",{},[]],"n":null}"#);
    }

    #[test]
    fn test_omit_nulls() {
        let out = write_with(|w| w.set_omit_nulls(true), |w| {
            w.begin_object()?;
            w.name("a")?;
            w.null_value()?;
            w.name("b")?;
            w.i64_value(1)?;
            w.name("c")?;
            w.null_value()?;
            w.name("d")?;
            w.begin_array()?;
            w.null_value()?;
            w.end_array()?;
            w.end_object()
        }).unwrap();
        assert_eq!(out, r#"{"b":1,"d":[null]}"#);
    }

    #[test]
    fn test_indent() {
        let out = write_with(|w| w.set_indent(Some(2)), |w| {
            w.begin_object()?;
            w.name("a")?;
            w.begin_array()?;
            w.i64_value(1)?;
            w.i64_value(2)?;
            w.end_array()?;
            w.name("b")?;
            w.begin_object()?;
            w.end_object()?;
            w.end_object()
        }).unwrap();
        assert_eq!(out, "{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}");
    }

    #[test]
    fn test_structural_errors() {
        let cases: [(fn(&mut JsonWriter<'_>) -> Result<()>, StructuralError); 7] = [
            (|w| w.name("a"), StructuralError::NameOutsideObject),
            (|w| { w.begin_object()?; w.i64_value(1) }, StructuralError::ValueWithoutName),
            (|w| { w.begin_object()?; w.name("a")?; w.name("b") }, StructuralError::DanglingName),
            (|w| { w.begin_object()?; w.name("a")?; w.end_object() }, StructuralError::DanglingName),
            (|w| { w.begin_array()?; w.end_object() },
                StructuralError::MismatchedEnd { requested: "an object", actual: "an array" }),
            (|w| { w.i64_value(1)?; w.i64_value(2) }, StructuralError::MultipleTopLevelValues),
            (|w| w.begin_array(), StructuralError::IncompleteDocument),
        ];
        for (f, expected) in cases {
            let err = compact(f).unwrap_err();
            assert_eq!(err, Error::Structural(expected));
        }
        assert_eq!(compact(|_| Ok(())).unwrap_err(), Error::Structural(StructuralError::IncompleteDocument));
    }

    #[test]
    fn test_lenient_top_level_values() {
        let out = write_with(|w| w.set_lenient(true), |w| {
            w.i64_value(1)?;
            w.string_value("x")
        }).unwrap();
        assert_eq!(out, "1\n\"x\"");
    }

    #[test]
    fn test_sink_error() {
        let mut buf = [0u8;4];
        let mut sink = beanmap_write::SliceSink::new(&mut buf);
        let mut writer = JsonWriter::new(&mut sink);
        let err = writer.string_value("Hello").unwrap_err();
        assert_eq!(err, Error::Sink(beanmap_write::SinkError::BufferFull));
    }
}
