//! Structural type information supplied by the caller
use core::fmt;
use std::collections::HashMap;
use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

/// A reference to a type at a use site: a named type applied to type
/// arguments, or a type parameter of the enclosing declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Named { name: String, args: Vec<TypeRef> },
    Param(String),
}

impl TypeRef {
    /// A non-generic type, or a raw use of a generic one
    pub fn named<S: Into<String>>(name: S) -> Self {
        TypeRef::Named { name: name.into(), args: Vec::new() }
    }

    pub fn generic<S, I>(name: S, args: I) -> Self
        where S: Into<String>, I: IntoIterator<Item = TypeRef>
    {
        TypeRef::Named { name: name.into(), args: args.into_iter().collect() }
    }

    pub fn param<S: Into<String>>(name: S) -> Self {
        TypeRef::Param(name.into())
    }

    /// Type or parameter name without arguments
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named { name, .. } => name,
            TypeRef::Param(name) => name,
        }
    }

    pub fn args(&self) -> &[TypeRef] {
        match self {
            TypeRef::Named { args, .. } => args,
            TypeRef::Param(..) => &[],
        }
    }

    pub fn is_param(&self) -> bool {
        matches!(self, TypeRef::Param(..))
    }

    /// Replace the type parameters found in `bindings`, at any depth.
    ///
    /// Parameters without a binding are left in place.
    pub fn substitute(&self, bindings: &HashMap<&str, &TypeRef>) -> TypeRef {
        match self {
            TypeRef::Param(name) => match bindings.get(name.as_str()) {
                Some(bound) => (*bound).clone(),
                None => self.clone()
            }
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(bindings)).collect()
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Param(name) => f.write_str(name),
            TypeRef::Named { name, args } => {
                f.write_str(name)?;
                if let Some((first, rest)) = args.split_first() {
                    write!(f, "<{}", first)?;
                    for arg in rest {
                        write!(f, ", {}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

/// A declared field of a bean type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    pub is_static: bool,
    /// Excluded from serialization
    pub ignored: bool,
}

impl FieldDescriptor {
    pub fn new<S: Into<String>>(name: S, ty: TypeRef) -> Self {
        FieldDescriptor { name: name.into(), ty, is_static: false, ignored: false }
    }

    pub fn static_field(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// `true` for fields that take part in serialization
    pub fn is_serializable(&self) -> bool {
        !self.is_static && !self.ignored
    }
}

/// An explicit property order directive of a single type declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyOrder {
    /// Fields written first, in this order
    pub names: Vec<String>,
    /// Sort the fields not named above
    pub alphabetic: bool,
}

impl PropertyOrder {
    pub fn new<I, S>(names: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        PropertyOrder { names: names.into_iter().map(Into::into).collect(), alphabetic: false }
    }

    pub fn alphabetic(mut self) -> Self {
        self.alphabetic = true;
        self
    }

    /// Reorder `fields` of a single declaration
    pub(crate) fn apply<'a>(&self, fields: Vec<&'a Arc<FieldDescriptor>>) -> Vec<&'a Arc<FieldDescriptor>> {
        let mut ordered = Vec::with_capacity(fields.len());
        for name in &self.names {
            if let Some(field) = fields.iter().find(|field| &field.name == name) {
                if !ordered.iter().any(|taken: &&Arc<FieldDescriptor>| Arc::ptr_eq(taken, field)) {
                    ordered.push(*field);
                }
            }
        }
        let mut rest: Vec<_> = fields.into_iter()
            .filter(|field| !self.names.contains(&field.name))
            .collect();
        if self.alphabetic {
            rest.sort_by(|a, b| a.name.cmp(&b.name));
        }
        ordered.extend(rest);
        ordered
    }
}

/// Structure of a bean type: its fields, supertype and type parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<Arc<FieldDescriptor>>,
    /// `None` for types deriving from the root object only
    pub superclass: Option<TypeRef>,
    pub order: Option<PropertyOrder>,
}

impl TypeDescriptor {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TypeDescriptor {
            name: name.into(),
            type_params: Vec::new(),
            fields: Vec::new(),
            superclass: None,
            order: None
        }
    }

    pub fn type_param<S: Into<String>>(mut self, name: S) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(Arc::new(field));
        self
    }

    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn order(mut self, order: PropertyOrder) -> Self {
        self.order = Some(order);
        self
    }
}
