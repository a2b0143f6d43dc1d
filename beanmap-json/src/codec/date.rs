//! Date and time codecs on top of `chrono`
//!
//! Patterns are `chrono` strftime strings. A pattern set on the codec wins over
//! [`Context::date_format`], which wins over the codec's default.
use core::fmt::{self, Write};
use std::string::String;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use log::trace;

use crate::context::Context;
use crate::error::{DeserializationError, Error, Result, SerializationError};
use crate::stream::{JsonReader, JsonWriter, TokenKind, parse_integer};
use super::{Codec, KeyCodec, unexpected};

fn checked_items(pattern: &str) -> Result<StrftimeItems<'_>> {
    let items = StrftimeItems::new(pattern);
    if items.clone().any(|item| matches!(item, Item::Error)) {
        return Err(SerializationError::DateFormat(pattern.into()).into())
    }
    Ok(items)
}

fn render(display: impl fmt::Display, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", display).map_err(|_| SerializationError::DateFormat(pattern.into()))?;
    Ok(out)
}

fn invalid(value: &str, target: &'static str) -> Error {
    DeserializationError::InvalidValue { value: value.into(), target }.into()
}

/// `DateTime<Utc>` codec.
///
/// Without a pattern the value is written as epoch milliseconds, or as an
/// RFC 3339 string when [`Context::write_dates_as_timestamps`] is off. Reading
/// accepts epoch milliseconds, strings matching the pattern, and RFC 3339
/// strings when no pattern is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeCodec {
    pattern: Option<String>
}

impl DateTimeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern<S: Into<String>>(pattern: S) -> Self {
        DateTimeCodec { pattern: Some(pattern.into()) }
    }

    fn pattern<'a>(&'a self, ctx: &'a Context) -> Option<&'a str> {
        self.pattern.as_deref().or(ctx.date_format.as_deref())
    }

    fn format(&self, value: &DateTime<Utc>, ctx: &Context) -> Result<Option<String>> {
        match self.pattern(ctx) {
            Some(pattern) => {
                let items = checked_items(pattern)?;
                render(value.format_with_items(items), pattern).map(Some)
            }
            None if ctx.write_dates_as_timestamps => Ok(None),
            None => Ok(Some(value.to_rfc3339_opts(SecondsFormat::Millis, true)))
        }
    }

    fn from_millis(&self, text: &str) -> Result<DateTime<Utc>> {
        let millis: i64 = parse_integer(text, "DateTime")?;
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| DeserializationError::OutOfRange { value: text.into(), target: "DateTime" }.into())
    }

    fn parse(&self, text: &str, ctx: &Context) -> Result<DateTime<Utc>> {
        match self.pattern(ctx) {
            Some(pattern) => {
                checked_items(pattern)?;
                if let Ok(zoned) = DateTime::parse_from_str(text, pattern) {
                    return Ok(zoned.with_timezone(&Utc))
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                    return Ok(naive.and_utc())
                }
                NaiveDate::parse_from_str(text, pattern)
                    .map(|date| date.and_time(NaiveTime::MIN).and_utc())
                    .map_err(|_| invalid(text, "DateTime"))
            }
            None => match DateTime::parse_from_rfc3339(text) {
                Ok(zoned) => Ok(zoned.with_timezone(&Utc)),
                Err(_) if text.bytes().all(|b| b == b'-' || b.is_ascii_digit()) => {
                    trace!("reading epoch milliseconds from a string");
                    self.from_millis(text)
                }
                Err(_) => Err(invalid(text, "DateTime"))
            }
        }
    }
}

impl Codec for DateTimeCodec {
    type Value = DateTime<Utc>;

    fn encode(&self, value: &DateTime<Utc>, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        match self.format(value, ctx)? {
            Some(text) => writer.string_value(&text),
            None => writer.i64_value(value.timestamp_millis())
        }
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<DateTime<Utc>> {
        match reader.peek()? {
            TokenKind::Number => {
                let text = reader.next_number()?;
                self.from_millis(text)
            }
            TokenKind::String => {
                let text = reader.next_string()?;
                self.parse(&text, ctx)
            }
            found => Err(unexpected("a date", found))
        }
    }

    fn type_name(&self) -> &'static str {
        "DateTime<Utc>"
    }
}

impl KeyCodec for DateTimeCodec {
    type Key = DateTime<Utc>;

    fn write_key(&self, key: &DateTime<Utc>, ctx: &Context) -> Result<String> {
        match self.format(key, ctx)? {
            Some(text) => Ok(text),
            None => Ok(key.timestamp_millis().to_string())
        }
    }

    fn read_key(&self, name: &str, ctx: &Context) -> Result<DateTime<Utc>> {
        self.parse(name, ctx)
    }
}

macro_rules! naive_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $default:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pattern: Option<String>
        }

        impl $name {
            pub const DEFAULT_PATTERN: &'static str = $default;

            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_pattern<S: Into<String>>(pattern: S) -> Self {
                $name { pattern: Some(pattern.into()) }
            }

            fn pattern<'a>(&'a self, ctx: &'a Context) -> &'a str {
                self.pattern.as_deref()
                    .or(ctx.date_format.as_deref())
                    .unwrap_or(Self::DEFAULT_PATTERN)
            }

            fn format(&self, value: &$ty, ctx: &Context) -> Result<String> {
                let pattern = self.pattern(ctx);
                let items = checked_items(pattern)?;
                render(value.format_with_items(items), pattern)
            }

            fn parse(&self, text: &str, ctx: &Context) -> Result<$ty> {
                let pattern = self.pattern(ctx);
                checked_items(pattern)?;
                <$ty>::parse_from_str(text, pattern).map_err(|_| invalid(text, stringify!($ty)))
            }
        }

        impl Codec for $name {
            type Value = $ty;

            fn encode(&self, value: &$ty, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
                let text = self.format(value, ctx)?;
                writer.string_value(&text)
            }

            fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<$ty> {
                match reader.peek()? {
                    TokenKind::String => {
                        let text = reader.next_string()?;
                        self.parse(&text, ctx)
                    }
                    found => Err(unexpected("a date string", found))
                }
            }

            fn type_name(&self) -> &'static str {
                stringify!($ty)
            }
        }

        impl KeyCodec for $name {
            type Key = $ty;

            fn write_key(&self, key: &$ty, ctx: &Context) -> Result<String> {
                self.format(key, ctx)
            }

            fn read_key(&self, name: &str, ctx: &Context) -> Result<$ty> {
                self.parse(name, ctx)
            }
        }
    };
}

naive_codec!(
    /// Calendar date codec, `%Y-%m-%d` by default
    NaiveDateCodec, NaiveDate, "%Y-%m-%d");
naive_codec!(
    /// Wall clock time codec, `%H:%M:%S` by default
    NaiveTimeCodec, NaiveTime, "%H:%M:%S");

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use super::*;
    use crate::codec::tests::{encode, encode_with, decode, decode_with};
    use crate::error::ErrorKind;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 7).unwrap()
    }

    #[test]
    fn test_datetime_millis() {
        let codec = DateTimeCodec::new();
        assert_eq!(encode(&codec, &sample()).unwrap(), "1709214307000");
        assert_eq!(decode(&codec, "1709214307000").unwrap(), sample());
        assert_eq!(decode(&codec, r#""1709214307000""#).unwrap(), sample());
        assert_eq!(decode(&codec, "-1000").unwrap(), Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap());
        assert_eq!(decode(&codec, "true").unwrap_err().kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn test_datetime_rfc3339() {
        let codec = DateTimeCodec::new();
        let ctx = Context::new().write_dates_as_timestamps(false);
        assert_eq!(encode_with(&codec, &sample(), &ctx).unwrap(), r#""2024-02-29T13:45:07.000Z""#);
        assert_eq!(decode(&codec, r#""2024-02-29T14:45:07+01:00""#).unwrap(), sample());
        assert!(decode(&codec, r#""yesterday""#).is_err());
    }

    #[test]
    fn test_datetime_patterns() {
        let ctx = Context::new().date_format("%d.%m.%Y %H:%M");
        let codec = DateTimeCodec::new();
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 0).unwrap();
        assert_eq!(encode_with(&codec, &at, &ctx).unwrap(), r#""29.02.2024 13:45""#);
        assert_eq!(decode_with(&codec, r#""29.02.2024 13:45""#, &ctx).unwrap(), at);

        let codec = DateTimeCodec::with_pattern("%Y/%m/%d");
        assert_eq!(encode_with(&codec, &at, &ctx).unwrap(), r#""2024/02/29""#);
        assert_eq!(decode_with(&codec, r#""2024/02/29""#, &ctx).unwrap(),
                   Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());

        let codec = DateTimeCodec::with_pattern("%Y %Q");
        let err = encode(&codec, &at).unwrap_err();
        assert_eq!(err, Error::Serialization(SerializationError::DateFormat("%Y %Q".into())));
    }

    #[test]
    fn test_naive_codecs() {
        let date = NaiveDate::from_ymd_opt(2001, 9, 11).unwrap();
        assert_eq!(encode(&NaiveDateCodec::new(), &date).unwrap(), r#""2001-09-11""#);
        assert_eq!(decode(&NaiveDateCodec::new(), r#""2001-09-11""#).unwrap(), date);
        let ctx = Context::new().date_format("%m/%d/%Y");
        assert_eq!(encode_with(&NaiveDateCodec::new(), &date, &ctx).unwrap(), r#""09/11/2001""#);
        assert!(decode(&NaiveDateCodec::new(), "20010911").is_err());

        let time = NaiveTime::from_hms_opt(23, 5, 9).unwrap();
        assert_eq!(encode(&NaiveTimeCodec::new(), &time).unwrap(), r#""23:05:09""#);
        assert_eq!(decode(&NaiveTimeCodec::with_pattern("%H%M%S"), r#""230509""#).unwrap(), time);
        assert_eq!(NaiveTimeCodec::new().write_key(&time, &Context::default()).unwrap(), "23:05:09");
    }
}
