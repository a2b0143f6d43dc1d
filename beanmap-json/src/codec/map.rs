//! Maps written as JSON objects
use core::marker::PhantomData;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::string::String;

use crate::context::Context;
use crate::error::{Result, SerializationError};
use crate::stream::{JsonReader, JsonWriter};
use super::Codec;

/// Conversion of map keys to and from JSON member names
pub trait KeyCodec: Send + Sync {
    type Key;

    fn write_key(&self, key: &Self::Key, ctx: &Context) -> Result<String>;

    fn read_key(&self, name: &str, ctx: &Context) -> Result<Self::Key>;
}

impl<K: KeyCodec + ?Sized> KeyCodec for std::sync::Arc<K> {
    type Key = K::Key;

    fn write_key(&self, key: &Self::Key, ctx: &Context) -> Result<String> {
        (**self).write_key(key, ctx)
    }

    fn read_key(&self, name: &str, ctx: &Context) -> Result<Self::Key> {
        (**self).read_key(name, ctx)
    }
}

/// A map a [`MapCodec`] can build and iterate
pub trait MapLike: Send + Sync {
    type Key;
    type Value;
    const NAME: &'static str;

    fn empty() -> Self;
    fn put(&mut self, key: Self::Key, value: Self::Value);
    fn for_each_entry<F>(&self, f: F) -> Result<()>
        where F: FnMut(&Self::Key, &Self::Value) -> Result<()>;
}

impl<K: Ord + Send + Sync, V: Send + Sync> MapLike for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    const NAME: &'static str = "BTreeMap";

    fn empty() -> Self {
        BTreeMap::new()
    }
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
    fn for_each_entry<F>(&self, mut f: F) -> Result<()>
        where F: FnMut(&K, &V) -> Result<()>
    {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }
}

impl<K: Eq + Hash + Send + Sync, V: Send + Sync> MapLike for HashMap<K, V> {
    type Key = K;
    type Value = V;
    const NAME: &'static str = "HashMap";

    fn empty() -> Self {
        HashMap::new()
    }
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }
    fn for_each_entry<F>(&self, mut f: F) -> Result<()>
        where F: FnMut(&K, &V) -> Result<()>
    {
        self.iter().try_for_each(|(k, v)| f(k, v))
    }
}

/// Codec of a map: keys become member names through `K`, values use `V`.
///
/// Two keys converting to the same member name fail to serialize.
/// A repeated member name when reading keeps the last value.
pub struct MapCodec<K, V, M> {
    key: K,
    value: V,
    _map: PhantomData<fn() -> M>,
}

pub type BTreeMapCodec<K, V> = MapCodec<K, V, BTreeMap<<K as KeyCodec>::Key, <V as Codec>::Value>>;
pub type HashMapCodec<K, V> = MapCodec<K, V, HashMap<<K as KeyCodec>::Key, <V as Codec>::Value>>;

impl<K, V, M> MapCodec<K, V, M> {
    pub fn new(key: K, value: V) -> Self {
        MapCodec { key, value, _map: PhantomData }
    }
}

impl<K: Clone, V: Clone, M> Clone for MapCodec<K, V, M> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone(), self.value.clone())
    }
}

impl<K, V, M> core::fmt::Debug for MapCodec<K, V, M>
    where K: core::fmt::Debug, V: core::fmt::Debug, M: MapLike
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple(M::NAME).field(&self.key).field(&self.value).finish()
    }
}

impl<K, V, M> Codec for MapCodec<K, V, M>
    where K: KeyCodec, V: Codec, M: MapLike<Key = K::Key, Value = V::Value>
{
    type Value = M;

    fn encode(&self, map: &M, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        let mut seen = HashSet::new();
        writer.begin_object()?;
        map.for_each_entry(|key, value| {
            let name = self.key.write_key(key, ctx)?;
            if !seen.insert(name.clone()) {
                return Err(SerializationError::DuplicateKey(name).into())
            }
            writer.name(&name)?;
            self.value.encode(value, writer, ctx).map_err(|err| err.in_property(&name))
        })?;
        writer.end_object()
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<M> {
        let mut map = M::empty();
        reader.begin_object()?;
        while reader.has_next()? {
            let name = reader.next_name()?;
            let key = self.key.read_key(&name, ctx).map_err(|err| err.in_property(&name))?;
            let value = self.value.decode(reader, ctx).map_err(|err| err.in_property(&name))?;
            map.put(key, value);
        }
        reader.end_object()?;
        Ok(map)
    }

    fn type_name(&self) -> &'static str {
        M::NAME
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use super::*;
    use crate::codec::{BoolCodec, I32Codec, StringCodec, ListCodec};
    use crate::codec::tests::{encode, decode};
    use crate::error::{Error, ErrorKind};

    /// Keys that collide once lower-cased
    struct CaseInsensitive;

    impl KeyCodec for CaseInsensitive {
        type Key = String;

        fn write_key(&self, key: &String, _ctx: &Context) -> Result<String> {
            Ok(key.to_lowercase())
        }

        fn read_key(&self, name: &str, _ctx: &Context) -> Result<String> {
            Ok(name.into())
        }
    }

    #[test]
    fn test_map_codec() {
        let codec = BTreeMapCodec::new(StringCodec, ListCodec::new(I32Codec));
        let map = BTreeMap::from([("b".to_string(), vec![2]), ("a".to_string(), vec![])]);
        assert_eq!(encode(&codec, &map).unwrap(), r#"{"a":[],"b":[2]}"#);
        assert_eq!(decode(&codec, r#"{"b":[2],"a":[]}"#).unwrap(), map);
        assert_eq!(encode(&codec, &BTreeMap::new()).unwrap(), "{}");
    }

    #[test]
    fn test_non_string_keys() {
        let codec = HashMapCodec::new(I32Codec, BoolCodec);
        let map = decode(&codec, r#"{"-1":true,"7":false}"#).unwrap();
        assert_eq!(map, HashMap::from([(-1, true), (7, false)]));

        let err = decode(&codec, r#"{"x":true}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert!(matches!(err, Error::Property { ref property, .. } if property == "x"));
    }

    #[test]
    fn test_duplicate_keys() {
        let codec = BTreeMapCodec::new(Arc::new(CaseInsensitive), I32Codec);
        let map = BTreeMap::from([("A".to_string(), 1), ("a".to_string(), 2)]);
        let err = encode(&codec, &map).unwrap_err();
        assert_eq!(err, Error::Serialization(SerializationError::DuplicateKey("a".into())));
    }
}
