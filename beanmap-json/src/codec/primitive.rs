//! Scalar codecs
//!
//! Every codec here is a unit struct: `instance()` returns a `'static`
//! reference and `shared()` a lazily created [`SharedCodec`].
//!
//! Deserialization accepts a few coercions on top of the exact token kind:
//! numbers from numeric strings, strings from number and boolean tokens,
//! booleans from `"true"`/`"false"` and chars from a numeric code point.
use std::borrow::Cow;
use std::string::{String, ToString};
use std::sync::{Arc, OnceLock};

use log::trace;

use crate::context::Context;
use crate::error::{DeserializationError, Result};
use crate::stream::{JsonReader, JsonWriter, TokenKind, parse_integer, parse_float, is_json_number};
use super::{Codec, SharedCodec, KeyCodec, unexpected};

macro_rules! singleton {
    ($name:ident, $ty:ty) => {
        impl $name {
            /// The static instance
            pub fn instance() -> &'static Self {
                &$name
            }

            /// The process-wide shared instance
            pub fn shared() -> SharedCodec<$ty> {
                static SHARED: OnceLock<SharedCodec<$ty>> = OnceLock::new();
                SHARED.get_or_init(|| Arc::new($name)).clone()
            }
        }
    };
}

/// Read the text of a number literal, or of a string holding one
fn number_text<'de>(reader: &mut JsonReader<'de>, target: &'static str) -> Result<Cow<'de, str>> {
    match reader.peek()? {
        TokenKind::Number => Ok(Cow::Borrowed(reader.next_number()?)),
        TokenKind::String => {
            let text = reader.next_string()?;
            let trimmed = text.trim();
            if is_json_number(trimmed.as_bytes()) || matches!(trimmed, "NaN"|"Infinity"|"-Infinity") {
                trace!("coercing string {:?} to {}", trimmed, target);
                Ok(Cow::Owned(trimmed.into()))
            }
            else {
                Err(DeserializationError::InvalidValue { value: text.into_owned(), target }.into())
            }
        }
        found => Err(unexpected("a number", found))
    }
}

macro_rules! integer_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ident, $write:ident, $wide:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        singleton!($name, $ty);

        impl Codec for $name {
            type Value = $ty;

            fn encode(&self, value: &$ty, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
                writer.$write(<$wide>::from(*value))
            }

            fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<$ty> {
                let text = number_text(reader, stringify!($ty))?;
                parse_integer(&text, stringify!($ty))
            }

            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }
        }

        impl KeyCodec for $name {
            type Key = $ty;

            fn write_key(&self, key: &$ty, _ctx: &Context) -> Result<String> {
                Ok(key.to_string())
            }

            fn read_key(&self, name: &str, _ctx: &Context) -> Result<$ty> {
                if !is_json_number(name.trim().as_bytes()) {
                    return Err(DeserializationError::InvalidValue {
                        value: name.into(), target: stringify!($ty)
                    }.into())
                }
                parse_integer(name.trim(), stringify!($ty))
            }
        }
    };
}

integer_codec!(I8Codec, i8, i64_value, i64);
integer_codec!(I16Codec, i16, i64_value, i64);
integer_codec!(I32Codec, i32, i64_value, i64);
integer_codec!(I64Codec, i64, i64_value, i64);
integer_codec!(U8Codec, u8, u64_value, u64);
integer_codec!(U16Codec, u16, u64_value, u64);
integer_codec!(U32Codec, u32, u64_value, u64);
integer_codec!(U64Codec, u64, u64_value, u64);

/// `f32` codec, rejects finite values beyond the `f32` range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct F32Codec;

singleton!(F32Codec, f32);

impl Codec for F32Codec {
    type Value = f32;

    fn encode(&self, value: &f32, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.f32_value(*value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<f32> {
        let text = number_text(reader, "f32")?;
        let value = parse_float(&text)?;
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(DeserializationError::OutOfRange { value: text.into_owned(), target: "f32" }.into())
        }
        Ok(value as f32)
    }

    fn type_name(&self) -> &'static str {
        "f32"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct F64Codec;

singleton!(F64Codec, f64);

impl Codec for F64Codec {
    type Value = f64;

    fn encode(&self, value: &f64, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.f64_value(*value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<f64> {
        let text = number_text(reader, "f64")?;
        let value = parse_float(&text)?;
        if value.is_infinite() && !text.contains("Infinity") {
            return Err(DeserializationError::OutOfRange { value: text.into_owned(), target: "f64" }.into())
        }
        Ok(value)
    }

    fn type_name(&self) -> &'static str {
        "f64"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StringCodec;

singleton!(StringCodec, String);

impl Codec for StringCodec {
    type Value = String;

    fn encode(&self, value: &String, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.string_value(value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<String> {
        match reader.peek()? {
            TokenKind::String => Ok(reader.next_string()?.into_owned()),
            TokenKind::Number => {
                trace!("coercing a number to a string");
                Ok(reader.next_number()?.into())
            }
            TokenKind::Boolean => {
                trace!("coercing a boolean to a string");
                Ok(reader.next_bool()?.to_string())
            }
            found => Err(unexpected("a string", found))
        }
    }

    fn type_name(&self) -> &'static str {
        "String"
    }
}

impl KeyCodec for StringCodec {
    type Key = String;

    fn write_key(&self, key: &String, _ctx: &Context) -> Result<String> {
        Ok(key.clone())
    }

    fn read_key(&self, name: &str, _ctx: &Context) -> Result<String> {
        Ok(name.into())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoolCodec;

singleton!(BoolCodec, bool);

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DeserializationError::InvalidValue { value: text.into(), target: "bool" }.into())
    }
}

impl Codec for BoolCodec {
    type Value = bool;

    fn encode(&self, value: &bool, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.bool_value(*value)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<bool> {
        match reader.peek()? {
            TokenKind::Boolean => reader.next_bool(),
            TokenKind::String => {
                trace!("coercing a string to a boolean");
                parse_bool(&reader.next_string()?)
            }
            found => Err(unexpected("a boolean", found))
        }
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }
}

impl KeyCodec for BoolCodec {
    type Key = bool;

    fn write_key(&self, key: &bool, _ctx: &Context) -> Result<String> {
        Ok(key.to_string())
    }

    fn read_key(&self, name: &str, _ctx: &Context) -> Result<bool> {
        parse_bool(name)
    }
}

/// A `char` is written as a one-character string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CharCodec;

singleton!(CharCodec, char);

fn single_char(text: &str) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(DeserializationError::InvalidValue { value: text.into(), target: "char" }.into())
    }
}

impl Codec for CharCodec {
    type Value = char;

    fn encode(&self, value: &char, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        let mut buf = [0u8;4];
        writer.string_value(value.encode_utf8(&mut buf))
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<char> {
        match reader.peek()? {
            TokenKind::String => single_char(&reader.next_string()?),
            TokenKind::Number => {
                let text = reader.next_number()?;
                trace!("coercing code point {} to a char", text);
                let code: u32 = parse_integer(text, "char")?;
                char::from_u32(code).ok_or_else(|| DeserializationError::InvalidValue {
                    value: text.into(), target: "char"
                }.into())
            }
            found => Err(unexpected("a string", found))
        }
    }

    fn type_name(&self) -> &'static str {
        "char"
    }
}

impl KeyCodec for CharCodec {
    type Key = char;

    fn write_key(&self, key: &char, _ctx: &Context) -> Result<String> {
        Ok(key.to_string())
    }

    fn read_key(&self, name: &str, _ctx: &Context) -> Result<char> {
        single_char(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{encode, decode, decode_with};
    use crate::error::{Error, ErrorKind};

    #[test]
    fn test_integer_bounds() {
        assert_eq!(encode(&I8Codec, &i8::MIN).unwrap(), "-128");
        assert_eq!(encode(&U16Codec, &u16::MAX).unwrap(), "65535");
        assert_eq!(encode(&I64Codec, &i64::MIN).unwrap(), "-9223372036854775808");
        assert_eq!(decode(&I8Codec, "-128").unwrap(), i8::MIN);
        assert_eq!(decode(&U32Codec, "4294967295").unwrap(), u32::MAX);
        assert_eq!(decode(&U64Codec, "18446744073709551615").unwrap(), u64::MAX);
        assert_eq!(decode(&I16Codec, "1e2").unwrap(), 100);

        let err = decode(&I8Codec, "128").unwrap_err();
        assert_eq!(err, Error::Deserialization(DeserializationError::OutOfRange {
            value: "128".into(), target: "i8"
        }));
        assert_eq!(decode(&U8Codec, "-1").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&I32Codec, "2147483648").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&U64Codec, "18446744073709551616").unwrap_err().kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_numbers_from_strings() {
        assert_eq!(decode(&I32Codec, r#""-17""#).unwrap(), -17);
        assert_eq!(decode(&F64Codec, r#"" 2.5 ""#).unwrap(), 2.5);
        assert!(decode(&F64Codec, r#""NaN""#).unwrap().is_nan());
        let err = decode(&I32Codec, r#""12a""#).unwrap_err();
        assert_eq!(err, Error::Deserialization(DeserializationError::InvalidValue {
            value: "12a".into(), target: "i32"
        }));
    }

    #[test]
    fn test_incompatible_tokens() {
        let err = decode(&I32Codec, "true").unwrap_err();
        assert_eq!(err, Error::Deserialization(DeserializationError::UnexpectedToken {
            expected: "a number", found: TokenKind::Boolean
        }));
        assert_eq!(decode(&StringCodec, "[]").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&BoolCodec, "1").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&CharCodec, "null").unwrap_err().kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_floats() {
        assert_eq!(encode(&F64Codec, &-0.1).unwrap(), "-0.1");
        assert_eq!(encode(&F32Codec, &f32::MAX).unwrap(), "3.4028235e+38");
        assert_eq!(decode(&F32Codec, "3.4028235e38").unwrap(), f32::MAX);
        assert_eq!(decode(&F64Codec, "1.7976931348623157e308").unwrap(), f64::MAX);
        assert_eq!(decode(&F32Codec, "1e39").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&F64Codec, "1e999").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(encode(&F64Codec, &f64::INFINITY).unwrap_err().kind(), ErrorKind::Serialization);
        let ctx = Context::new().lenient(true);
        assert_eq!(decode_with(&F64Codec, "-Infinity", &ctx).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_strings_and_coercions() {
        assert_eq!(encode(&StringCodec, &String::new()).unwrap(), r#""""#);
        assert_eq!(decode(&StringCodec, r#""A\n""#).unwrap(), "A\n");
        assert_eq!(decode(&StringCodec, "12.50").unwrap(), "12.50");
        assert_eq!(decode(&StringCodec, "false").unwrap(), "false");
        assert!(decode(&BoolCodec, r#""true""#).unwrap());
        assert!(decode(&BoolCodec, r#""yes""#).is_err());
        assert_eq!(encode(&CharCodec, &'ł').unwrap(), r#""ł""#);
        assert_eq!(decode(&CharCodec, r#""💣""#).unwrap(), '💣');
        assert_eq!(decode(&CharCodec, "65").unwrap(), 'A');
        assert!(decode(&CharCodec, r#""ab""#).is_err());
        assert!(decode(&CharCodec, "55296").is_err());
    }

    #[test]
    fn test_keys() {
        let ctx = Context::default();
        assert_eq!(I32Codec.write_key(&-3, &ctx).unwrap(), "-3");
        assert_eq!(I32Codec.read_key("-3", &ctx).unwrap(), -3);
        assert!(U8Codec.read_key("x", &ctx).is_err());
        assert!(BoolCodec.read_key("true", &ctx).unwrap());
        assert_eq!(CharCodec.read_key("z", &ctx).unwrap(), 'z');
    }

    #[test]
    fn test_singletons() {
        assert!(Arc::ptr_eq(&StringCodec::shared(), &StringCodec::shared()));
        assert_eq!(U8Codec::instance().type_name(), "u8");
    }
}
