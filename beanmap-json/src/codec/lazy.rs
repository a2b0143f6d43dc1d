//! Late-bound codec references for self-referential types
use std::sync::OnceLock;

use log::trace;

use crate::context::Context;
use crate::error::{ResolutionError, Result};
use crate::stream::{JsonReader, JsonWriter};
use super::{Codec, SharedCodec};

/// A codec slot that is filled after the codec it refers to has been built.
///
/// Use it where a bean refers to itself (directly or through other beans):
/// build the dependent codecs with an `Arc<LazyCodec<T>>`, then [`bind`] the
/// finished codec. Codecs are meant to live for the whole process, so the
/// resulting reference cycle is never torn down.
///
/// [`bind`]: LazyCodec::bind
pub struct LazyCodec<T> {
    name: &'static str,
    cell: OnceLock<SharedCodec<T>>,
}

impl<T> LazyCodec<T> {
    pub fn new(name: &'static str) -> Self {
        LazyCodec { name, cell: OnceLock::new() }
    }

    /// Bind the target codec, returns it back if already bound
    pub fn bind(&self, codec: SharedCodec<T>) -> core::result::Result<(), SharedCodec<T>> {
        trace!("binding lazy codec for {}", self.name);
        self.cell.set(codec)
    }

    pub fn is_bound(&self) -> bool {
        self.cell.get().is_some()
    }

    fn target(&self) -> Result<&SharedCodec<T>> {
        self.cell.get().ok_or_else(|| ResolutionError::Unbound(self.name).into())
    }
}

impl<T> core::fmt::Debug for LazyCodec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyCodec")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<T> Codec for LazyCodec<T> {
    type Value = T;

    fn encode(&self, value: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        self.target()?.encode(value, writer, ctx)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<T> {
        self.target()?.decode(reader, ctx)
    }

    fn type_name(&self) -> &'static str {
        self.name
    }
}
