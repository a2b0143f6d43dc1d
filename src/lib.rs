//! Character sinks for the [`beanmap-json`] token writer.
//!
//! The JSON writer only ever emits valid UTF-8 text, so sinks receive `&str`
//! fragments and never have to validate anything themselves.
//!
//! [`beanmap-json`]: https://docs.rs/beanmap-json
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc;

use core::{fmt, str};

mod foreign;

#[cfg(feature = "std")]
pub use foreign::IoSink;

pub type SinkResult<T> = Result<T, SinkError>;

/// An error returned by [`CharSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SinkError {
    /// Buffer is full
    BufferFull,
    /// The underlying I/O stream failed
    Io,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::BufferFull => f.write_str("buffer is full"),
            SinkError::Io => f.write_str("I/O error while writing"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SinkError {}

/// JSON writers emit text to the implementations of this trait.
pub trait CharSink {
    /// Write a whole string fragment.
    ///
    /// When over capacity return `Err(SinkError::BufferFull)`, a partially
    /// written fragment is never left behind by the provided implementations.
    fn write_str(&mut self, s: &str) -> SinkResult<()>;
    /// Write a single character.
    #[inline]
    fn write_char(&mut self, c: char) -> SinkResult<()> {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf))
    }
}

impl<T: CharSink + ?Sized> CharSink for &'_ mut T {
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        (**self).write_str(s)
    }
    #[inline]
    fn write_char(&mut self, c: char) -> SinkResult<()> {
        (**self).write_char(c)
    }
}

/// Adapts any [`CharSink`] to [`core::fmt::Write`], so `write!` can target it.
///
/// The last sink error is kept, since `fmt::Error` carries no payload.
pub struct FmtSink<'a, S: ?Sized> {
    sink: &'a mut S,
    error: Option<SinkError>,
}

impl<'a, S: CharSink + ?Sized> FmtSink<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        FmtSink { sink, error: None }
    }
    /// Return the sink error that interrupted formatting, if any.
    pub fn take_error(&mut self) -> Option<SinkError> {
        self.error.take()
    }
}

impl<S: CharSink + ?Sized> fmt::Write for FmtSink<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.sink.write_str(s).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

/// A simple slice sink (no allocations)
#[derive(Debug, PartialEq)]
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize
}

impl<'a> SliceSink<'a> {
    /// Create new instance
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceSink { buf, len: 0 }
    }
    /// Return populated length in bytes
    pub fn len(&self) -> usize {
        self.len
    }
    /// Return `true` when nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Return total capacity
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }
    /// Return remaining capacity
    pub fn rem_capacity(&self) -> usize {
        self.buf.len() - self.len
    }
    /// Return the text written so far
    pub fn as_str(&self) -> &str {
        // only whole `&str` fragments are ever copied in
        str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
    /// Split the underlying buffer and return the written text with the
    /// lifetime of the original buffer, together with a sink over the rest.
    pub fn split(self) -> (&'a str, Self) {
        let (res, buf) = self.buf.split_at_mut(self.len);
        let text = str::from_utf8(res).unwrap_or_default();
        (text, Self { buf, len: 0 })
    }
    /// Forget the written text and start over
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl CharSink for SliceSink<'_> {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        let end = self.len + s.len();
        match self.buf.get_mut(self.len..end) {
            Some(chunk) => {
                chunk.copy_from_slice(s.as_bytes());
                self.len = end;
                Ok(())
            }
            None => Err(SinkError::BufferFull)
        }
    }
}
