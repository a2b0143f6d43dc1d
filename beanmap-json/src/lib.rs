//! Reflection-free JSON bean mapping over [`beanmap-write`](`beanmap_write`) sinks.
/*!

Values are converted by [`Codec`] objects composed by hand (or by generated
code) instead of runtime introspection:

| Native type ->          | Codec                                 | JSON type
|-------------------------|---------------------------------------|--------------------
| `String`,`char`         | [`StringCodec`],[`CharCodec`]         | `string`
| `bool`                  | [`BoolCodec`]                         | `boolean`
| `i8`-`i64`,`u8`-`u64`   | [`I32Codec`] and friends              | `number`
| `f32`,`f64`             | [`F32Codec`],[`F64Codec`]             | `number`
| `DateTime<Utc>`         | [`DateTimeCodec`]                     | `number` or `string`
| `NaiveDate`,`NaiveTime` | [`NaiveDateCodec`],[`NaiveTimeCodec`] | `string`
| `Option<T>`             | [`OptionCodec`]                       | `null` or `T`
| C-like enums            | [`EnumCodec`]                         | `string`
| `Vec<u8>`               | [`ByteArrayCodec`]                    | base-64 `string`
| `Vec<T>`, sets, deques  | [`SeqCodec`], [`PrimitiveArrayCodec`] | `array`
| maps                    | [`MapCodec`]                          | `object`
| beans                   | [`BeanCodec`], [`PolymorphicCodec`]   | `object`

* Bean members are written in the order computed by the
[`FieldOrderResolver`](bean::FieldOrderResolver): own fields first, arranged by
the type's [`PropertyOrder`](bean::PropertyOrder), then inherited fields.
* Unknown members are skipped when reading.
* A single value is accepted where an array is expected.
* The lenient grammar (unquoted names, single quotes, trailing commas, `NaN`)
is enabled with [`Context::lenient`].

```
use beanmap_json::codec::{ListCodec, StringCodec};

let codec = ListCodec::new(StringCodec);
let words: Vec<String> = ["Hello", " ", "World", "!"].map(String::from).into();
let text = beanmap_json::to_string(&codec, &words)?;
assert_eq!(text, r#"["Hello"," ","World","!"]"#);
assert_eq!(beanmap_json::from_str(&codec, &text)?, words);
assert_eq!(beanmap_json::from_str(&codec, r#""alone""#)?, ["alone"]);
# Ok::<(), beanmap_json::Error>(())
```

[`Codec`]: codec::Codec
[`StringCodec`]: codec::StringCodec
[`CharCodec`]: codec::CharCodec
[`BoolCodec`]: codec::BoolCodec
[`I32Codec`]: codec::I32Codec
[`F32Codec`]: codec::F32Codec
[`F64Codec`]: codec::F64Codec
[`DateTimeCodec`]: codec::DateTimeCodec
[`NaiveDateCodec`]: codec::NaiveDateCodec
[`NaiveTimeCodec`]: codec::NaiveTimeCodec
[`OptionCodec`]: codec::OptionCodec
[`EnumCodec`]: codec::EnumCodec
[`ByteArrayCodec`]: codec::ByteArrayCodec
[`SeqCodec`]: codec::SeqCodec
[`PrimitiveArrayCodec`]: codec::PrimitiveArrayCodec
[`MapCodec`]: codec::MapCodec
[`BeanCodec`]: bean::BeanCodec
[`PolymorphicCodec`]: bean::PolymorphicCodec
*/
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::io;
use std::string::String;
use std::vec::Vec;

pub mod error;
pub mod context;
pub mod stream;
pub mod codec;
pub mod bean;
pub mod mapper;

pub use beanmap_write;
pub use beanmap_write::{CharSink, SinkError};

pub use error::{Error, ErrorKind, Result};
pub use context::Context;
pub use codec::{Codec, SharedCodec};
pub use mapper::ObjectMapper;

use stream::{JsonReader, JsonWriter};

/// Serialize `value` as a JSON string with the default [`Context`].
pub fn to_string<C>(codec: &C, value: &C::Value) -> Result<String>
    where C: Codec + ?Sized
{
    to_string_with(codec, value, &Context::default())
}

/// Serialize `value` as a JSON string.
pub fn to_string_with<C>(codec: &C, value: &C::Value, ctx: &Context) -> Result<String>
    where C: Codec + ?Sized
{
    let mut out = String::new();
    to_writer(&mut out, codec, value, ctx)?;
    Ok(out)
}

/// Serialize `value` as JSON to a [`CharSink`] implementation.
///
/// Fails unless exactly one complete value was written.
pub fn to_writer<C>(sink: &mut dyn CharSink, codec: &C, value: &C::Value, ctx: &Context) -> Result<()>
    where C: Codec + ?Sized
{
    let mut writer = JsonWriter::with_context(sink, ctx);
    codec.encode(value, &mut writer, ctx)?;
    writer.finish()
}

/// Deserialize a JSON document with the default [`Context`].
pub fn from_str<C>(codec: &C, input: &str) -> Result<C::Value>
    where C: Codec + ?Sized
{
    from_str_with(codec, input, &Context::default())
}

/// Deserialize a JSON document.
///
/// Anything but whitespace after the value is an error.
pub fn from_str_with<C>(codec: &C, input: &str, ctx: &Context) -> Result<C::Value>
    where C: Codec + ?Sized
{
    read_document(JsonReader::new(input), codec, ctx)
}

/// Deserialize a JSON document from UTF-8 encoded bytes.
pub fn from_slice<C>(codec: &C, input: &[u8], ctx: &Context) -> Result<C::Value>
    where C: Codec + ?Sized
{
    read_document(JsonReader::from_slice(input)?, codec, ctx)
}

/// Read `source` to the end, then deserialize it as a JSON document.
pub fn from_reader<C, R>(codec: &C, mut source: R, ctx: &Context) -> Result<C::Value>
    where C: Codec + ?Sized, R: io::Read
{
    let mut input = Vec::new();
    source.read_to_end(&mut input).map_err(|err| {
        log::debug!("reading JSON input failed: {}", err);
        Error::Sink(SinkError::Io)
    })?;
    from_slice(codec, &input, ctx)
}

fn read_document<C>(mut reader: JsonReader<'_>, codec: &C, ctx: &Context) -> Result<C::Value>
    where C: Codec + ?Sized
{
    reader.set_lenient(ctx.lenient);
    let value = codec.decode(&mut reader, ctx)?;
    reader.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{I32Codec, ListCodec, StringCodec};
    use crate::error::SyntaxError;

    #[test]
    fn test_top_level_helpers() {
        let codec = ListCodec::new(I32Codec);
        let ctx = Context::new().indent(2);
        assert_eq!(to_string_with(&codec, &vec![1, 2], &ctx).unwrap(), "[\n  1,\n  2\n]");
        assert_eq!(from_slice(&codec, b" [1, 2] ", &Context::default()).unwrap(), [1, 2]);
        assert_eq!(from_reader(&codec, &b"[3]"[..], &Context::default()).unwrap(), [3]);

        let mut buf = [0u8; 4];
        let mut sink = beanmap_write::SliceSink::new(&mut buf);
        assert_eq!(to_writer(&mut sink, &codec, &vec![1, 2, 3], &Context::default()).unwrap_err(),
                   Error::Sink(SinkError::BufferFull));
    }

    #[test]
    fn test_trailing_input_and_leniency() {
        assert_eq!(from_str(&StringCodec, r#""a" "b""#).unwrap_err().kind(), ErrorKind::Syntax);
        assert!(matches!(from_slice(&StringCodec, b"\"\xff\"", &Context::default()).unwrap_err(),
                         Error::Syntax { kind: SyntaxError::InvalidUtf8, offset: 1 }));
        let codec = ListCodec::new(StringCodec);
        assert!(from_str(&codec, "[a, 'b',]").is_err());
        let lenient = Context::new().lenient(true);
        assert_eq!(from_str_with(&codec, "[a, 'b',]", &lenient).unwrap(), ["a", "b"]);
    }
}
