//! A reusable read/write facade over a root codec
use std::string::String;
use std::sync::Arc;

use log::trace;

use crate::bean::{BeanCodec, CodecRegistry};
use crate::codec::{unexpected, Codec, SharedCodec};
use crate::context::Context;
use crate::error::{DeserializationError, Result};
use crate::stream::{JsonReader, JsonWriter};
use beanmap_write::CharSink;

/// Reads and writes whole documents of `T` with a fixed default [`Context`].
///
/// With [`Context::wrap_root_value`] set, the value is nested in a single
/// member object named after the root type: `{"Person":{...}}`.
///
/// A mapper is cheap to clone and may be shared between threads.
pub struct ObjectMapper<T> {
    codec: SharedCodec<T>,
    root_name: String,
    ctx: Context,
}

impl<T> Clone for ObjectMapper<T> {
    fn clone(&self) -> Self {
        ObjectMapper {
            codec: Arc::clone(&self.codec),
            root_name: self.root_name.clone(),
            ctx: self.ctx.clone()
        }
    }
}

impl<T: 'static> ObjectMapper<T> {
    /// A mapper named after the codec's type name
    pub fn new(codec: SharedCodec<T>) -> Self {
        let root_name = codec.type_name().into();
        ObjectMapper { codec, root_name, ctx: Context::default() }
    }

    /// A mapper named after the bean's type
    pub fn for_bean(bean: Arc<BeanCodec<T>>) -> Self {
        let root_name = bean.bean_name().into();
        ObjectMapper { codec: bean, root_name, ctx: Context::default() }
    }
}

impl<T> ObjectMapper<T> {
    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Use another member name when wrapping the root value
    pub fn with_root_name<S: Into<String>>(mut self, name: S) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn codec(&self) -> &SharedCodec<T> {
        &self.codec
    }

    pub fn read(&self, input: &str) -> Result<T> {
        self.read_with(input, &self.ctx)
    }

    /// Read a document overriding the mapper's context
    pub fn read_with(&self, input: &str, ctx: &Context) -> Result<T> {
        let mut reader = JsonReader::new(input);
        reader.set_lenient(ctx.lenient);
        let value = if ctx.wrap_root_value {
            self.read_wrapped(&mut reader, ctx)?
        }
        else {
            self.codec.decode(&mut reader, ctx)?
        };
        reader.end()?;
        Ok(value)
    }

    fn read_wrapped(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<T> {
        reader.begin_object()?;
        if !reader.has_next()? {
            return Err(unexpected("a root value member", reader.peek()?))
        }
        let name = reader.next_name()?;
        if name != self.root_name.as_str() {
            return Err(DeserializationError::UnknownProperty {
                name: name.into_owned(),
                target: self.root_name.clone()
            }.into())
        }
        trace!("unwrapping root value {}", self.root_name);
        let value = self.codec.decode(reader, ctx).map_err(|err| err.in_property(&self.root_name))?;
        reader.end_object()?;
        Ok(value)
    }

    pub fn write(&self, value: &T) -> Result<String> {
        self.write_with(value, &self.ctx)
    }

    /// Write a document overriding the mapper's context
    pub fn write_with(&self, value: &T, ctx: &Context) -> Result<String> {
        let mut out = String::new();
        self.write_to_with(&mut out, value, ctx)?;
        Ok(out)
    }

    pub fn write_to(&self, sink: &mut dyn CharSink, value: &T) -> Result<()> {
        self.write_to_with(sink, value, &self.ctx)
    }

    pub fn write_to_with(&self, sink: &mut dyn CharSink, value: &T, ctx: &Context) -> Result<()> {
        let mut writer = JsonWriter::with_context(sink, ctx);
        if ctx.wrap_root_value {
            writer.begin_object()?;
            writer.name(&self.root_name)?;
            self.codec.encode(value, &mut writer, ctx).map_err(|err| err.in_property(&self.root_name))?;
            writer.end_object()?;
        }
        else {
            self.codec.encode(value, &mut writer, ctx)?;
        }
        writer.finish()
    }
}

impl<T> core::fmt::Debug for ObjectMapper<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectMapper")
            .field("codec", &self.codec.type_name())
            .field("root_name", &self.root_name)
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl CodecRegistry {
    /// A mapper over the codec registered for `T`
    pub fn mapper<T: 'static>(&self) -> Result<ObjectMapper<T>> {
        self.get::<T>().map(ObjectMapper::new)
    }
}
