//! Composable value codecs
//!
//! A [`Codec`] converts between one native value and the JSON tokens that
//! represent it. Codecs carry no per-call state; everything that may vary
//! between calls comes in through the [`Context`]. Composite codecs hold their
//! element codecs by value or through a [`SharedCodec`], so a codec tree can be
//! built once and used from many threads.
use std::sync::Arc;

use crate::context::Context;
use crate::error::{DeserializationError, Error, Result};
use crate::stream::{JsonReader, JsonWriter, TokenKind};

pub mod primitive;
pub mod date;
pub mod base64;
pub mod array;
pub mod collection;
pub mod map;
pub mod option;
pub mod enums;
pub mod lazy;

pub use primitive::*;
pub use date::{DateTimeCodec, NaiveDateCodec, NaiveTimeCodec};
pub use array::{ArrayCodec, ByteArrayCodec, PrimitiveArrayCodec, PrimitiveElement};
pub use collection::{SeqCodec, ListCodec, DequeCodec, SetCodec, HashSetCodec};
pub use map::{KeyCodec, MapCodec, BTreeMapCodec, HashMapCodec};
pub use option::{OptionCodec, BoxCodec};
pub use enums::{EnumCodec, JsonEnum};
pub use lazy::LazyCodec;

/// Paired serializer and deserializer of a single value type
pub trait Codec: Send + Sync {
    type Value;

    /// Write `value` as exactly one JSON value
    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()>;

    /// Read exactly one JSON value
    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value>;

    /// Name of the handled type, for error messages
    fn type_name(&self) -> &'static str;

    /// Wrap this codec for sharing between composite codecs
    fn into_shared(self) -> SharedCodec<Self::Value>
        where Self: Sized + 'static
    {
        Arc::new(self)
    }
}

/// A reference-counted codec trait object
pub type SharedCodec<T> = Arc<dyn Codec<Value = T>>;

impl<C: Codec + ?Sized> Codec for Arc<C> {
    type Value = C::Value;

    #[inline]
    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        (**self).encode(value, writer, ctx)
    }

    #[inline]
    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value> {
        (**self).decode(reader, ctx)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<C: Codec + ?Sized> Codec for &'static C {
    type Value = C::Value;

    #[inline]
    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        (**self).encode(value, writer, ctx)
    }

    #[inline]
    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value> {
        (**self).decode(reader, ctx)
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

pub(crate) fn unexpected(expected: &'static str, found: TokenKind) -> Error {
    DeserializationError::UnexpectedToken { expected, found }.into()
}
