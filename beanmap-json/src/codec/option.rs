//! Nullable and boxed values
use std::boxed::Box;

use crate::context::Context;
use crate::error::{Result, SerializationError};
use crate::stream::{JsonReader, JsonWriter, TokenKind};
use super::Codec;

/// `Option<T>` codec: `None` is `null`.
///
/// A `required` codec refuses to write `None`.
#[derive(Debug, Clone, Default)]
pub struct OptionCodec<C> {
    inner: C,
    required: bool,
}

impl<C> OptionCodec<C> {
    pub fn new(inner: C) -> Self {
        OptionCodec { inner, required: false }
    }

    /// A codec that fails with [`SerializationError::NullValue`] on `None`
    pub fn required(inner: C) -> Self {
        OptionCodec { inner, required: true }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Codec> Codec for OptionCodec<C> {
    type Value = Option<C::Value>;

    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        match value {
            Some(value) => self.inner.encode(value, writer, ctx),
            None if self.required => Err(SerializationError::NullValue(self.inner.type_name()).into()),
            None => writer.null_value()
        }
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value> {
        if reader.peek()? == TokenKind::Null {
            reader.next_null()?;
            return Ok(None)
        }
        self.inner.decode(reader, ctx).map(Some)
    }

    fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }
}

/// `Box<T>` codec, for recursive value types
#[derive(Debug, Clone, Default)]
pub struct BoxCodec<C>(pub C);

impl<C: Codec> Codec for BoxCodec<C> {
    type Value = Box<C::Value>;

    fn encode(&self, value: &Self::Value, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        self.0.encode(value, writer, ctx)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Self::Value> {
        self.0.decode(reader, ctx).map(Box::new)
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}
