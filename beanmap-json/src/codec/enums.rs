//! Enumerations written by constant name
use core::marker::PhantomData;
use std::string::String;

use crate::context::Context;
use crate::error::{DeserializationError, Result};
use crate::stream::{JsonReader, JsonWriter, TokenKind};
use super::{Codec, KeyCodec, unexpected};

/// A fieldless enumeration with named constants.
///
/// ```
/// use beanmap_json::codec::JsonEnum;
///
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Color { Red, Green }
///
/// impl JsonEnum for Color {
///     const NAME: &'static str = "Color";
///     fn variants() -> &'static [Self] { &[Color::Red, Color::Green] }
///     fn name(&self) -> &'static str {
///         match self { Color::Red => "RED", Color::Green => "GREEN" }
///     }
/// }
///
/// assert_eq!(Color::from_name("GREEN"), Some(Color::Green));
/// ```
pub trait JsonEnum: Copy + Send + Sync + 'static {
    /// Type name used in error messages
    const NAME: &'static str;

    fn variants() -> &'static [Self];

    /// The constant name written to JSON
    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|variant| variant.name() == name)
    }
}

/// Codec for a [`JsonEnum`]
pub struct EnumCodec<E> {
    _enum: PhantomData<fn() -> E>
}

impl<E> EnumCodec<E> {
    pub const fn new() -> Self {
        EnumCodec { _enum: PhantomData }
    }
}

impl<E> Default for EnumCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EnumCodec<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E> Copy for EnumCodec<E> {}

impl<E> core::fmt::Debug for EnumCodec<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("EnumCodec")
    }
}

fn lookup<E: JsonEnum>(name: &str) -> Result<E> {
    E::from_name(name).ok_or_else(|| DeserializationError::UnknownVariant {
        name: name.into(), target: E::NAME
    }.into())
}

impl<E: JsonEnum> Codec for EnumCodec<E> {
    type Value = E;

    fn encode(&self, value: &E, writer: &mut JsonWriter<'_>, _ctx: &Context) -> Result<()> {
        writer.string_value(value.name())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, _ctx: &Context) -> Result<E> {
        match reader.peek()? {
            TokenKind::String => lookup(&reader.next_string()?),
            found => Err(unexpected("an enum constant", found))
        }
    }

    fn type_name(&self) -> &'static str {
        E::NAME
    }
}

impl<E: JsonEnum> KeyCodec for EnumCodec<E> {
    type Key = E;

    fn write_key(&self, key: &E, _ctx: &Context) -> Result<String> {
        Ok(key.name().into())
    }

    fn read_key(&self, name: &str, _ctx: &Context) -> Result<E> {
        lookup(name)
    }
}
