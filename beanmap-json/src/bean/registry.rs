//! Lookup tables for type descriptors and built codecs
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::string::String;
use std::sync::Arc;

use log::debug;

use crate::codec::SharedCodec;
use crate::error::{ResolutionError, Result};
use super::descriptor::TypeDescriptor;

/// Type descriptors by type name
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, replacing any previous one of the same name
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        debug!("registering type descriptor {}", descriptor.name);
        self.types.insert(descriptor.name.clone(), Arc::new(descriptor));
        self
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Result<&Arc<TypeDescriptor>> {
        self.types.get(name).ok_or_else(|| ResolutionError::UnknownType(name.into()).into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Built codecs by native type
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the codec of `T`, returns the codec it replaces
    pub fn register<T: 'static>(&mut self, codec: SharedCodec<T>) -> Option<SharedCodec<T>> {
        debug!("registering codec {} for {}", codec.type_name(), std::any::type_name::<T>());
        self.codecs.insert(TypeId::of::<T>(), Box::new(codec))
            .and_then(|old| old.downcast::<SharedCodec<T>>().ok())
            .map(|old| *old)
    }

    pub fn get<T: 'static>(&self) -> Result<SharedCodec<T>> {
        self.codecs.get(&TypeId::of::<T>())
            .and_then(|codec| codec.downcast_ref::<SharedCodec<T>>())
            .cloned()
            .ok_or_else(|| ResolutionError::Unregistered(std::any::type_name::<T>()).into())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }
}

impl core::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CodecRegistry").field("len", &self.codecs.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, I32Codec, StringCodec};
    use crate::error::Error;

    #[test]
    fn test_type_registry() {
        let types = TypeRegistry::new().with(TypeDescriptor::new("Person"));
        assert!(types.contains("Person"));
        assert_eq!(types.get("Person").unwrap().name, "Person");
        assert_eq!(types.get("Ghost").unwrap_err(),
                   Error::Resolution(ResolutionError::UnknownType("Ghost".into())));
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn test_codec_registry() {
        let mut codecs = CodecRegistry::new();
        assert!(codecs.register(I32Codec::shared()).is_none());
        assert!(codecs.register(StringCodec::shared()).is_none());
        assert!(codecs.register(I32Codec.into_shared()).is_some());
        assert!(codecs.contains::<i32>());
        assert_eq!(codecs.get::<String>().unwrap().type_name(), "String");
        assert!(matches!(codecs.get::<u8>().err().unwrap(),
                         Error::Resolution(ResolutionError::Unregistered("u8"))));
    }
}
