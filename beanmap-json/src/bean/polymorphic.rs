//! Type-tag dispatch among bean subtypes
use std::boxed::Box;
use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use log::trace;

use crate::codec::Codec;
use crate::context::Context;
use crate::error::{DeserializationError, Result, SerializationError};
use crate::stream::{JsonReader, JsonWriter, TokenKind};
use super::codec::BeanCodec;

/// Default name of the type tag member
pub const DEFAULT_TYPE_PROPERTY: &str = "@type";

trait Subtype<T>: Send + Sync {
    fn tag(&self) -> &str;

    /// Write `value` if it is of this subtype
    fn try_encode(&self, value: &T, writer: &mut JsonWriter<'_>, ctx: &Context, property: &str) -> Option<Result<()>>;

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context, property: &str) -> Result<T>;
}

struct BeanSubtype<S, T> {
    tag: String,
    bean: Arc<BeanCodec<S>>,
    wrap: fn(S) -> T,
    unwrap: fn(&T) -> Option<&S>,
}

impl<S, T> Subtype<T> for BeanSubtype<S, T> {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn try_encode(&self, value: &T, writer: &mut JsonWriter<'_>, ctx: &Context, property: &str) -> Option<Result<()>> {
        let bean = (self.unwrap)(value)?;
        Some(self.bean.write_object(bean, writer, ctx, Some((property, &self.tag))))
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context, property: &str) -> Result<T> {
        self.bean.read_object(reader, ctx, Some(property)).map(self.wrap)
    }
}

/// Codec of a closed family of bean types sharing the base value type `T`.
///
/// Every object carries a type tag member naming its subtype. The tag may
/// appear anywhere in the object when reading.
///
/// ```
/// # use std::sync::Arc;
/// use beanmap_json::bean::*;
/// use beanmap_json::codec::F64Codec;
/// use beanmap_json::{to_string, from_str};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Circle { r: f64 }
/// #[derive(Debug, Default, PartialEq)]
/// struct Square { a: f64 }
/// #[derive(Debug, PartialEq)]
/// enum Shape { Circle(Circle), Square(Square) }
///
/// let resolver = FieldOrderResolver::new(TypeRegistry::new()
///     .with(TypeDescriptor::new("Circle").field(FieldDescriptor::new("r", TypeRef::named("double"))))
///     .with(TypeDescriptor::new("Square").field(FieldDescriptor::new("a", TypeRef::named("double")))));
/// let circle = BeanCodec::builder(&resolver, TypeRef::named("Circle"), Circle::default)
///     .field("r", F64Codec, |c: &Circle| &c.r, |c: &mut Circle, v| c.r = v)
///     .build()?;
/// let square = BeanCodec::builder(&resolver, TypeRef::named("Square"), Square::default)
///     .field("a", F64Codec, |s: &Square| &s.a, |s: &mut Square, v| s.a = v)
///     .build()?;
/// let shapes = PolymorphicCodec::new("Shape")
///     .variant("circle", Arc::new(circle), Shape::Circle,
///              |shape| match shape { Shape::Circle(c) => Some(c), _ => None })
///     .variant("square", Arc::new(square), Shape::Square,
///              |shape| match shape { Shape::Square(s) => Some(s), _ => None });
///
/// let text = to_string(&shapes, &Shape::Square(Square { a: 2.0 }))?;
/// assert_eq!(text, r#"{"@type":"square","a":2}"#);
/// assert_eq!(from_str(&shapes, r#"{"r":0.5,"@type":"circle"}"#)?, Shape::Circle(Circle { r: 0.5 }));
/// # Ok::<(), beanmap_json::Error>(())
/// ```
pub struct PolymorphicCodec<T> {
    name: &'static str,
    property: String,
    variants: Vec<Box<dyn Subtype<T>>>,
}

impl<T: 'static> PolymorphicCodec<T> {
    /// An empty family named `name`, tagged with the `@type` member
    pub fn new(name: &'static str) -> Self {
        PolymorphicCodec { name, property: DEFAULT_TYPE_PROPERTY.into(), variants: Vec::new() }
    }

    /// Use another member name for the type tag
    pub fn property<P: Into<String>>(mut self, property: P) -> Self {
        self.property = property.into();
        self
    }

    /// Add the subtype `S` tagged with `tag`.
    ///
    /// `wrap` converts a decoded subtype value to the base type, `unwrap`
    /// selects values of this subtype for encoding.
    pub fn variant<S: 'static, G: Into<String>>(
            mut self,
            tag: G,
            bean: Arc<BeanCodec<S>>,
            wrap: fn(S) -> T,
            unwrap: fn(&T) -> Option<&S>
        ) -> Self
    {
        let tag = tag.into();
        self.variants.retain(|variant| variant.tag() != tag);
        self.variants.push(Box::new(BeanSubtype { tag, bean, wrap, unwrap }));
        self
    }

    /// Add the subtype `S` tagged with its bean's own type info, or its type name
    pub fn bean_variant<S: 'static>(
            self,
            bean: Arc<BeanCodec<S>>,
            wrap: fn(S) -> T,
            unwrap: fn(&T) -> Option<&S>
        ) -> Self
    {
        let tag: String = match bean.type_info() {
            Some((_, tag)) => tag.into(),
            None => bean.bean_name().into()
        };
        self.variant(tag, bean, wrap, unwrap)
    }
}

impl<T> PolymorphicCodec<T> {
    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.variants.iter().map(|variant| variant.tag())
    }

    /// Find the tag member without consuming anything from `reader`
    fn peek_tag(&self, reader: &JsonReader<'_>) -> Result<String> {
        let mut ahead = reader.clone();
        ahead.begin_object()?;
        while ahead.has_next()? {
            let name = ahead.next_name()?;
            if name == self.property.as_str() {
                return match ahead.peek()? {
                    TokenKind::String => Ok(ahead.next_string()?.into_owned()),
                    found => Err(crate::codec::unexpected("a type tag string", found))
                }
            }
            ahead.skip_value()?;
        }
        Err(DeserializationError::MissingTypeTag(self.property.clone()).into())
    }
}

impl<T> Codec for PolymorphicCodec<T> {
    type Value = T;

    fn encode(&self, value: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        for variant in &self.variants {
            if let Some(result) = variant.try_encode(value, writer, ctx, &self.property) {
                return result
            }
        }
        Err(SerializationError::UnmatchedSubtype(self.name).into())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<T> {
        let tag = self.peek_tag(reader)?;
        let variant = self.variants.iter()
            .find(|variant| variant.tag() == tag)
            .ok_or_else(|| DeserializationError::UnknownTypeTag(tag.clone()))?;
        trace!("decoding {} subtype {}", self.name, tag);
        variant.decode(reader, ctx, &self.property)
    }

    fn type_name(&self) -> &'static str {
        self.name
    }
}

impl<T> core::fmt::Debug for PolymorphicCodec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PolymorphicCodec")
            .field("name", &self.name)
            .field("property", &self.property)
            .field("tags", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}
