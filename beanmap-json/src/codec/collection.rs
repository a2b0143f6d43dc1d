//! Sequences and sets
use core::marker::PhantomData;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;
use std::vec::Vec;

use log::trace;

use crate::context::Context;
use crate::error::Result;
use crate::stream::{JsonReader, JsonWriter, TokenKind};
use super::{Codec, unexpected};

/// Decode the elements of an array, or a single value as a one-element array.
///
/// Calls `element` once per element with the reader positioned at it.
pub(crate) fn decode_elements<'de, F>(
        reader: &mut JsonReader<'de>,
        ctx: &Context,
        target: &'static str,
        mut element: F
    ) -> Result<()>
    where F: FnMut(&mut JsonReader<'de>) -> Result<()>
{
    match reader.peek()? {
        TokenKind::BeginArray => {
            reader.begin_array()?;
            while reader.has_next()? {
                element(reader)?;
            }
            reader.end_array()
        }
        found if found.is_value() && ctx.accept_single_value_as_array => {
            trace!("widening a single value to {}", target);
            element(reader)
        }
        found => Err(unexpected("an array", found))
    }
}

/// Write `items` as a JSON array
pub(crate) fn encode_elements<'a, T: 'a, C, I>(
        codec: &C,
        items: I,
        writer: &mut JsonWriter<'_>,
        ctx: &Context
    ) -> Result<()>
    where C: Codec<Value = T> + ?Sized, I: IntoIterator<Item = &'a T>
{
    writer.begin_array()?;
    for item in items {
        codec.encode(item, writer, ctx)?;
    }
    writer.end_array()
}

/// A collection a [`SeqCodec`] can build and iterate
pub trait Collection: Send + Sync {
    type Item;
    type Iter<'a>: Iterator<Item = &'a Self::Item> where Self: 'a;
    const NAME: &'static str;

    fn empty() -> Self;
    fn add(&mut self, item: Self::Item);
    fn items(&self) -> Self::Iter<'_>;
}

impl<T: Send + Sync> Collection for Vec<T> {
    type Item = T;
    type Iter<'a> = core::slice::Iter<'a, T> where Self: 'a;
    const NAME: &'static str = "Vec";

    fn empty() -> Self {
        Vec::new()
    }
    fn add(&mut self, item: T) {
        self.push(item)
    }
    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: Send + Sync> Collection for VecDeque<T> {
    type Item = T;
    type Iter<'a> = std::collections::vec_deque::Iter<'a, T> where Self: 'a;
    const NAME: &'static str = "VecDeque";

    fn empty() -> Self {
        VecDeque::new()
    }
    fn add(&mut self, item: T) {
        self.push_back(item)
    }
    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: Ord + Send + Sync> Collection for BTreeSet<T> {
    type Item = T;
    type Iter<'a> = std::collections::btree_set::Iter<'a, T> where Self: 'a;
    const NAME: &'static str = "BTreeSet";

    fn empty() -> Self {
        BTreeSet::new()
    }
    fn add(&mut self, item: T) {
        self.insert(item);
    }
    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: Eq + Hash + Send + Sync> Collection for HashSet<T> {
    type Item = T;
    type Iter<'a> = std::collections::hash_set::Iter<'a, T> where Self: 'a;
    const NAME: &'static str = "HashSet";

    fn empty() -> Self {
        HashSet::new()
    }
    fn add(&mut self, item: T) {
        self.insert(item);
    }
    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

/// Codec of a collection of values, each handled by the element codec `C`
pub struct SeqCodec<C, Coll> {
    element: C,
    _coll: PhantomData<fn() -> Coll>,
}

pub type ListCodec<C> = SeqCodec<C, Vec<<C as Codec>::Value>>;
pub type DequeCodec<C> = SeqCodec<C, VecDeque<<C as Codec>::Value>>;
pub type SetCodec<C> = SeqCodec<C, BTreeSet<<C as Codec>::Value>>;
pub type HashSetCodec<C> = SeqCodec<C, HashSet<<C as Codec>::Value>>;

impl<C, Coll> SeqCodec<C, Coll> {
    pub fn new(element: C) -> Self {
        SeqCodec { element, _coll: PhantomData }
    }

    pub fn element(&self) -> &C {
        &self.element
    }
}

impl<C: Clone, Coll> Clone for SeqCodec<C, Coll> {
    fn clone(&self) -> Self {
        Self::new(self.element.clone())
    }
}

impl<C: core::fmt::Debug, Coll: Collection> core::fmt::Debug for SeqCodec<C, Coll> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple(Coll::NAME).field(&self.element).finish()
    }
}

impl<C, Coll> Codec for SeqCodec<C, Coll>
    where C: Codec, Coll: Collection<Item = C::Value>
{
    type Value = Coll;

    fn encode(&self, value: &Coll, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        encode_elements(&self.element, value.items(), writer, ctx)
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<Coll> {
        let mut out = Coll::empty();
        decode_elements(reader, ctx, Coll::NAME, |reader| {
            out.add(self.element.decode(reader, ctx)?);
            Ok(())
        })?;
        Ok(out)
    }

    fn type_name(&self) -> &'static str {
        Coll::NAME
    }
}
