/// Implementation for foreign types
#[cfg(feature = "std")]
use std::io::{self, Cursor};
#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec, collections::VecDeque};

#[allow(unused_imports)]
use super::*;

#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
impl CharSink for String {
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.push_str(s);
        Ok(())
    }
    #[inline]
    fn write_char(&mut self, c: char) -> SinkResult<()> {
        self.push(c);
        Ok(())
    }
}

#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
impl CharSink for Vec<u8> {
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
impl CharSink for VecDeque<u8> {
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.extend(s.bytes());
        Ok(())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<T> CharSink for Cursor<T>
    where Cursor<T>: io::Write
{
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        io::Write::write_all(self, s.as_bytes()).map_err(|_| SinkError::BufferFull)
    }
}

/// Forwards text to any [`std::io::Write`] implementation.
///
/// Writes are not buffered, wrap the stream in a [`std::io::BufWriter`] when
/// it talks to a file or a socket.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W
}

#[cfg(feature = "std")]
impl<W: io::Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        IoSink { inner }
    }
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<W: io::Write> CharSink for IoSink<W> {
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.inner.write_all(s.as_bytes()).map_err(|_| SinkError::Io)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> CharSink for arrayvec::ArrayString<CAP> {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.try_push_str(s).map_err(|_| SinkError::BufferFull)
    }
    #[inline]
    fn write_char(&mut self, c: char) -> SinkResult<()> {
        self.try_push(c).map_err(|_| SinkError::BufferFull)
    }
}

#[cfg(feature = "arrayvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "arrayvec")))]
impl<const CAP: usize> CharSink for arrayvec::ArrayVec<u8, CAP> {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.try_extend_from_slice(s.as_bytes()).map_err(|_| SinkError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> CharSink for heapless::String<CAP> {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.push_str(s).map_err(|_| SinkError::BufferFull)
    }
}

#[cfg(feature = "heapless")]
#[cfg_attr(docsrs, doc(cfg(feature = "heapless")))]
impl<const CAP: usize> CharSink for heapless::Vec<u8, CAP> {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.extend_from_slice(s.as_bytes()).map_err(|_| SinkError::BufferFull)
    }
}

#[cfg(feature = "smallvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "smallvec")))]
impl<const N: usize> CharSink for smallvec::SmallVec<[u8; N]>
    where [u8; N]: smallvec::Array<Item = u8>
{
    #[inline]
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(feature = "tinyvec")]
#[cfg_attr(docsrs, doc(cfg(feature = "tinyvec")))]
impl<const N: usize> CharSink for tinyvec::ArrayVec<[u8; N]>
    where [u8; N]: tinyvec::Array<Item = u8>
{
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        if self.len() + s.len() > self.capacity() {
            return Err(SinkError::BufferFull)
        }
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
