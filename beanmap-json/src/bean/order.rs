//! Ordered, inheritance-flattened field lists
//!
//! For a (possibly parameterized) bean type the resolver produces the list of
//! serializable fields: the type's own fields first, arranged by its property
//! order directive, followed by the resolved fields of its supertype chain.
//! Field types that refer to type parameters are substituted with the type
//! arguments bound at the use site.
use std::collections::HashMap;
use std::string::String;
use std::sync::{Arc, RwLock};
use std::vec::Vec;

use log::{debug, trace};

use crate::error::{ResolutionError, Result};
use super::descriptor::{FieldDescriptor, TypeRef};
use super::registry::TypeRegistry;

/// A field as seen from a particular use of its declaring type.
///
/// The original descriptor is shared, never modified; the type is the
/// declared type after substituting bound type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    original: Arc<FieldDescriptor>,
    ty: TypeRef,
    declared_in: String,
}

impl ResolvedField {
    pub fn name(&self) -> &str {
        &self.original.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn original(&self) -> &Arc<FieldDescriptor> {
        &self.original
    }

    /// Name of the type that declares this field
    pub fn declared_in(&self) -> &str {
        &self.declared_in
    }

    pub fn is_substituted(&self) -> bool {
        self.ty != self.original.ty
    }
}

/// Resolves and caches ordered field lists
#[derive(Debug)]
pub struct FieldOrderResolver {
    types: TypeRegistry,
    cache: RwLock<HashMap<TypeRef, Arc<[ResolvedField]>>>,
}

impl FieldOrderResolver {
    pub fn new(types: TypeRegistry) -> Self {
        FieldOrderResolver { types, cache: RwLock::new(HashMap::new()) }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The ordered field list of `ty`, computed once per distinct `ty`
    pub fn resolve(&self, ty: &TypeRef) -> Result<Arc<[ResolvedField]>> {
        if let Some(fields) = self.cached(ty) {
            trace!("reusing field order of {}", ty);
            return Ok(fields)
        }
        let mut visiting = Vec::new();
        let mut fields = Vec::new();
        self.collect(ty, &mut visiting, &mut fields)?;
        debug!("resolved {} fields of {}", fields.len(), ty);
        let fields: Arc<[ResolvedField]> = fields.into();
        let mut cache = self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cache.entry(ty.clone()).or_insert(fields).clone())
    }

    fn cached(&self, ty: &TypeRef) -> Option<Arc<[ResolvedField]>> {
        let cache = self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.get(ty).cloned()
    }

    fn collect(&self, ty: &TypeRef, visiting: &mut Vec<String>, out: &mut Vec<ResolvedField>) -> Result<()> {
        let (name, args) = match ty {
            TypeRef::Named { name, args } => (name, args),
            TypeRef::Param(name) => return Err(ResolutionError::UnknownType(name.clone()).into())
        };
        if visiting.contains(name) {
            return Err(ResolutionError::CyclicInheritance(name.clone()).into())
        }
        let descriptor = self.types.get(name)?;
        if !args.is_empty() && args.len() != descriptor.type_params.len() {
            return Err(ResolutionError::TypeArgumentArity {
                type_name: name.clone(),
                expected: descriptor.type_params.len(),
                found: args.len()
            }.into())
        }
        /* a raw use binds nothing and leaves parameters in place */
        let bindings: HashMap<&str, &TypeRef> = descriptor.type_params.iter()
            .map(String::as_str)
            .zip(args)
            .collect();

        let own: Vec<&Arc<FieldDescriptor>> = descriptor.fields.iter()
            .filter(|field| field.is_serializable())
            .collect();
        let own = match &descriptor.order {
            Some(order) => order.apply(own),
            None => own
        };
        out.extend(own.into_iter().map(|field| ResolvedField {
            original: Arc::clone(field),
            ty: field.ty.substitute(&bindings),
            declared_in: name.clone(),
        }));

        if let Some(superclass) = &descriptor.superclass {
            let superclass = superclass.substitute(&bindings);
            trace!("{} extends {}", ty, superclass);
            visiting.push(name.clone());
            self.collect(&superclass, visiting, out)?;
            visiting.pop();
        }
        Ok(())
    }
}
