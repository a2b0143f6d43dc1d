//! Fixed arrays, primitive arrays and byte arrays
use core::marker::PhantomData;
use std::boxed::Box;
use std::vec::Vec;

use log::trace;

use crate::context::Context;
use crate::error::{DeserializationError, Result};
use crate::stream::{JsonReader, JsonWriter, TokenKind, parse_integer, parse_float};
use super::collection::{decode_elements, encode_elements};
use super::{base64, Codec, unexpected};
use super::primitive::*;

/// Boxed slice codec using the element codec `C`
#[derive(Debug, Clone, Default)]
pub struct ArrayCodec<C>(pub C);

impl<C: Codec> Codec for ArrayCodec<C> {
    type Value = Box<[C::Value]>;

    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        encode_elements(&self.0, value.iter(), writer, ctx)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value> {
        let mut out = Vec::new();
        decode_elements(reader, ctx, "array", |reader| {
            out.push(self.0.decode(reader, ctx)?);
            Ok(())
        })?;
        Ok(out.into_boxed_slice())
    }

    fn type_name(&self) -> &'static str {
        "array"
    }
}

/// Scalars read and written directly by a [`PrimitiveArrayCodec`].
///
/// Number literals are parsed straight from the reader, anything else falls
/// back to the scalar codec and its coercions.
pub trait PrimitiveElement: Copy + Send + Sync + 'static {
    const NAME: &'static str;

    fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self>;

    fn write(self, writer: &mut JsonWriter<'_>) -> Result<()>;
}

macro_rules! primitive_element {
    ($ty:ident, $codec:ident, $write:ident, $wide:ty, $name:literal) => {
        impl PrimitiveElement for $ty {
            const NAME: &'static str = $name;

            #[inline]
            fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self> {
                if reader.peek()? == TokenKind::Number {
                    parse_integer(reader.next_number()?, stringify!($ty))
                }
                else {
                    $codec.decode(reader, ctx)
                }
            }

            #[inline]
            fn write(self, writer: &mut JsonWriter<'_>) -> Result<()> {
                writer.$write(<$wide>::from(self))
            }
        }
    };
}

primitive_element!(i8, I8Codec, i64_value, i64, "i8[]");
primitive_element!(i16, I16Codec, i64_value, i64, "i16[]");
primitive_element!(i32, I32Codec, i64_value, i64, "i32[]");
primitive_element!(i64, I64Codec, i64_value, i64, "i64[]");
primitive_element!(u16, U16Codec, u64_value, u64, "u16[]");
primitive_element!(u32, U32Codec, u64_value, u64, "u32[]");
primitive_element!(u64, U64Codec, u64_value, u64, "u64[]");

impl PrimitiveElement for f32 {
    const NAME: &'static str = "f32[]";

    fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self> {
        F32Codec.decode(reader, ctx)
    }

    fn write(self, writer: &mut JsonWriter<'_>) -> Result<()> {
        writer.f32_value(self)
    }
}

impl PrimitiveElement for f64 {
    const NAME: &'static str = "f64[]";

    #[inline]
    fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self> {
        if reader.peek()? == TokenKind::Number {
            parse_float(reader.next_number()?)
        }
        else {
            F64Codec.decode(reader, ctx)
        }
    }

    fn write(self, writer: &mut JsonWriter<'_>) -> Result<()> {
        writer.f64_value(self)
    }
}

impl PrimitiveElement for bool {
    const NAME: &'static str = "bool[]";

    #[inline]
    fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self> {
        if reader.peek()? == TokenKind::Boolean {
            reader.next_bool()
        }
        else {
            BoolCodec.decode(reader, ctx)
        }
    }

    fn write(self, writer: &mut JsonWriter<'_>) -> Result<()> {
        writer.bool_value(self)
    }
}

impl PrimitiveElement for char {
    const NAME: &'static str = "char[]";

    fn read(reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self> {
        CharCodec.decode(reader, ctx)
    }

    fn write(self, writer: &mut JsonWriter<'_>) -> Result<()> {
        let mut buf = [0u8;4];
        writer.string_value(self.encode_utf8(&mut buf))
    }
}

/// `Vec` codec of primitive values without a per-element codec
pub struct PrimitiveArrayCodec<P> {
    _elem: PhantomData<fn() -> P>
}

impl<P> PrimitiveArrayCodec<P> {
    pub const fn new() -> Self {
        PrimitiveArrayCodec { _elem: PhantomData }
    }
}

impl<P> Default for PrimitiveArrayCodec<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for PrimitiveArrayCodec<P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<P> Copy for PrimitiveArrayCodec<P> {}

impl<P: PrimitiveElement> core::fmt::Debug for PrimitiveArrayCodec<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(P::NAME)
    }
}

impl<P: PrimitiveElement> Codec for PrimitiveArrayCodec<P> {
    type Value = Vec<P>;

    fn encode(&self, value: &Vec<P>, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.begin_array()?;
        for item in value.iter().copied() {
            item.write(writer)?;
        }
        writer.end_array()
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Vec<P>> {
        let mut out = Vec::new();
        decode_elements(reader, ctx, P::NAME, |reader| {
            out.push(P::read(reader, ctx)?);
            Ok(())
        })?;
        Ok(out)
    }

    fn type_name(&self) -> &'static str {
        P::NAME
    }
}

/// `Vec<u8>` codec writing a padded base-64 string.
///
/// Reads base-64 strings as well as arrays of numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteArrayCodec;

impl Codec for ByteArrayCodec {
    type Value = Vec<u8>;

    fn encode(&self, value: &Vec<u8>, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        let mut text = std::string::String::with_capacity((value.len() + 2) / 3 * 4);
        base64::encode(&mut text, value)?;
        writer.string_value(&text)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Vec<u8>> {
        match reader.peek()? {
            TokenKind::String => {
                let text = reader.next_string()?;
                base64::decode(&text).ok_or_else(|| DeserializationError::InvalidValue {
                    value: text.into_owned(), target: "base64"
                }.into())
            }
            TokenKind::BeginArray|TokenKind::Number => {
                trace!("reading bytes from numbers");
                let mut out = Vec::new();
                decode_elements(reader, ctx, "u8[]", |reader| {
                    out.push(parse_integer(reader.next_number()?, "u8")?);
                    Ok(())
                })?;
                Ok(out)
            }
            found => Err(unexpected("a base64 string", found))
        }
    }

    fn type_name(&self) -> &'static str {
        "u8[]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{encode, encode_with, decode};
    use crate::error::ErrorKind;

    #[test]
    fn test_array_codec() {
        let codec = ArrayCodec(StringCodec);
        let value: Box<[std::string::String]> = vec!["x".into(), "y".into()].into_boxed_slice();
        assert_eq!(encode(&codec, &value).unwrap(), r#"["x","y"]"#);
        assert_eq!(decode(&codec, r#"["x","y"]"#).unwrap(), value);
        assert_eq!(decode(&codec, r#""x""#).unwrap().len(), 1);
    }

    #[test]
    fn test_primitive_arrays() {
        let codec = PrimitiveArrayCodec::<i16>::new();
        assert_eq!(encode(&codec, &vec![i16::MIN, 0, i16::MAX]).unwrap(), "[-32768,0,32767]");
        assert_eq!(decode(&codec, "[-32768, \"12\", 32767]").unwrap(), vec![i16::MIN, 12, i16::MAX]);
        assert_eq!(decode(&codec, "5").unwrap(), vec![5]);
        assert_eq!(decode(&codec, "[32768]").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(codec.type_name(), "i16[]");

        let codec = PrimitiveArrayCodec::<f64>::new();
        assert_eq!(encode(&codec, &vec![0.5, -1.0]).unwrap(), "[0.5,-1]");
        assert_eq!(decode(&codec, "[0.5,-1]").unwrap(), vec![0.5, -1.0]);
        let ctx = Context::new().lenient(true);
        assert_eq!(encode_with(&codec, &vec![f64::INFINITY], &ctx).unwrap(), "[Infinity]");

        let codec = PrimitiveArrayCodec::<bool>::new();
        assert_eq!(decode(&codec, r#"[true,"false"]"#).unwrap(), vec![true, false]);
        let codec = PrimitiveArrayCodec::<char>::new();
        assert_eq!(encode(&codec, &vec!['a', 'ł']).unwrap(), r#"["a","ł"]"#);
        let codec = PrimitiveArrayCodec::<u64>::new();
        assert_eq!(decode(&codec, "[18446744073709551615]").unwrap(), vec![u64::MAX]);
        let codec = PrimitiveArrayCodec::<i8>::new();
        assert_eq!(encode(&codec, &vec![i8::MIN, -1, i8::MAX]).unwrap(), "[-128,-1,127]");
        assert_eq!(decode(&codec, "[-128, 1e1, \"7\"]").unwrap(), vec![i8::MIN, 10, 7]);
        assert_eq!(decode(&codec, "[128]").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(codec.type_name(), "i8[]");
    }

    #[test]
    fn test_byte_array_codec() {
        assert_eq!(encode(&ByteArrayCodec, &b"Hello".to_vec()).unwrap(), r#""SGVsbG8=""#);
        assert_eq!(encode(&ByteArrayCodec, &Vec::new()).unwrap(), r#""""#);
        assert_eq!(decode(&ByteArrayCodec, r#""SGVsbG8=""#).unwrap(), b"Hello");
        assert_eq!(decode(&ByteArrayCodec, "[1,2,255]").unwrap(), [1, 2, 255]);
        assert_eq!(decode(&ByteArrayCodec, "7").unwrap(), [7]);
        assert_eq!(decode(&ByteArrayCodec, "[256]").unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&ByteArrayCodec, r#""@@""#).unwrap_err().kind(), ErrorKind::Deserialization);
        assert_eq!(decode(&ByteArrayCodec, "{}").unwrap_err().kind(), ErrorKind::Deserialization);
    }
}
