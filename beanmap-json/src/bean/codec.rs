//! Codecs of bean types built from resolved field lists
use core::any::TypeId;
use core::marker::PhantomData;
use std::boxed::Box;
use std::collections::HashMap;
use std::string::{String, ToString};
use std::vec::Vec;

use log::{debug, trace};

use crate::codec::Codec;
use crate::context::Context;
use crate::error::{DeserializationError, ResolutionError, Result};
use crate::stream::{JsonReader, JsonWriter};
use super::descriptor::TypeRef;
use super::order::{FieldOrderResolver, ResolvedField};

/// Read and write access to one property of a bean
trait Property<T>: Send + Sync {
    fn write(&self, bean: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()>;

    fn read(&self, bean: &mut T, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<()>;
}

struct FieldAccess<T, C, G, S> {
    codec: C,
    getter: G,
    setter: S,
    _bean: PhantomData<fn(&T)>,
}

impl<T, C, G, S> Property<T> for FieldAccess<T, C, G, S>
    where C: Codec,
          G: Fn(&T) -> &C::Value + Send + Sync,
          S: Fn(&mut T, C::Value) + Send + Sync
{
    fn write(&self, bean: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        self.codec.encode((self.getter)(bean), writer, ctx)
    }

    fn read(&self, bean: &mut T, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<()> {
        let value = self.codec.decode(reader, ctx)?;
        (self.setter)(bean, value);
        Ok(())
    }
}

struct BoundField<T> {
    field: ResolvedField,
    property: Box<dyn Property<T>>,
}

/// Builder of a [`BeanCodec`], see [`BeanCodec::builder`]
pub struct BeanCodecBuilder<'r, T> {
    resolver: &'r FieldOrderResolver,
    type_ref: TypeRef,
    instantiate: Box<dyn Fn() -> T + Send + Sync>,
    properties: Vec<(String, Box<dyn Property<T>>)>,
    type_info: Option<(String, String)>,
}

impl<'r, T: 'static> BeanCodecBuilder<'r, T> {
    /// Register the codec and accessors of the property `name`
    pub fn field<C, G, S>(mut self, name: &str, codec: C, getter: G, setter: S) -> Self
        where C: Codec + 'static,
              G: Fn(&T) -> &C::Value + Send + Sync + 'static,
              S: Fn(&mut T, C::Value) + Send + Sync + 'static
    {
        let access = FieldAccess { codec, getter, setter, _bean: PhantomData };
        self.properties.retain(|(known, _)| known != name);
        self.properties.push((name.into(), Box::new(access)));
        self
    }

    /// Write a type tag member `property` with the value `tag` in front of the fields
    pub fn type_info<P: Into<String>, S: Into<String>>(mut self, property: P, tag: S) -> Self {
        self.type_info = Some((property.into(), tag.into()));
        self
    }

    /// Resolve the field order and bind every field to its accessors.
    ///
    /// Fails when a serializable field has no accessors. Accessors of
    /// properties that are not serializable are dropped.
    pub fn build(self) -> Result<BeanCodec<T>> {
        let BeanCodecBuilder { resolver, type_ref, instantiate, mut properties, type_info } = self;
        let resolved = resolver.resolve(&type_ref)?;
        let mut fields = Vec::with_capacity(resolved.len());
        for field in resolved.iter() {
            let position = properties.iter()
                .position(|(name, _)| name == field.name())
                .ok_or_else(|| ResolutionError::MissingAccessor {
                    type_name: type_ref.to_string(),
                    property: field.name().into()
                })?;
            let (_, property) = properties.swap_remove(position);
            fields.push(BoundField { field: field.clone(), property });
        }
        for (name, _) in &properties {
            debug!("dropping accessors of non-serializable property {}.{}", type_ref, name);
        }
        let index = fields.iter().enumerate()
            .map(|(i, bound)| (bound.field.name().to_string(), i))
            .collect();
        debug!("built bean codec for {} with {} fields", type_ref, fields.len());
        Ok(BeanCodec { type_ref, fields, index, instantiate, type_info })
    }
}

/// Codec of a bean `T` writing a JSON object with one member per resolved field.
///
/// Members are written in the resolved field order, unless
/// [`Context::property_order`] names some of them first. Unknown members are
/// skipped when reading, unless [`Context::fail_on_unknown_properties`] is set.
pub struct BeanCodec<T> {
    type_ref: TypeRef,
    fields: Vec<BoundField<T>>,
    index: HashMap<String, usize>,
    instantiate: Box<dyn Fn() -> T + Send + Sync>,
    type_info: Option<(String, String)>,
}

impl<T: 'static> BeanCodec<T> {
    /// Start building the codec of `type_ref`, `instantiate` creates a blank bean
    pub fn builder<F>(resolver: &FieldOrderResolver, type_ref: TypeRef, instantiate: F) -> BeanCodecBuilder<'_, T>
        where F: Fn() -> T + Send + Sync + 'static
    {
        BeanCodecBuilder {
            resolver,
            type_ref,
            instantiate: Box::new(instantiate),
            properties: Vec::new(),
            type_info: None,
        }
    }

    /// The exact native type this codec handles
    pub fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }
}

impl<T> BeanCodec<T> {
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Name of the bean type without type arguments
    pub fn bean_name(&self) -> &str {
        self.type_ref.name()
    }

    /// The type tag property and value, if any
    pub fn type_info(&self) -> Option<(&str, &str)> {
        self.type_info.as_ref().map(|(property, tag)| (property.as_str(), tag.as_str()))
    }

    /// The fields in the order they are written
    pub fn fields(&self) -> impl Iterator<Item = &ResolvedField> + '_ {
        self.fields.iter().map(|bound| &bound.field)
    }

    fn write_field(&self, bound: &BoundField<T>, bean: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        let name = bound.field.name();
        writer.name(name)?;
        bound.property.write(bean, writer, ctx).map_err(|err| err.in_property(name))
    }

    /// Write `bean` as an object, starting with the `tag` member when given
    pub(crate) fn write_object(
            &self,
            bean: &T,
            writer: &mut JsonWriter<'_>,
            ctx: &Context,
            tag: Option<(&str, &str)>
        ) -> Result<()>
    {
        writer.begin_object()?;
        if let Some((property, tag)) = tag {
            writer.name(property)?;
            writer.string_value(tag)?;
        }
        match &ctx.property_order {
            Some(order) => {
                let mut written = vec![false; self.fields.len()];
                for name in order {
                    if let Some(&i) = self.index.get(name) {
                        if !written[i] {
                            written[i] = true;
                            self.write_field(&self.fields[i], bean, writer, ctx)?;
                        }
                    }
                }
                for (bound, _) in self.fields.iter().zip(written).filter(|(_, done)| !done) {
                    self.write_field(bound, bean, writer, ctx)?;
                }
            }
            None => for bound in &self.fields {
                self.write_field(bound, bean, writer, ctx)?;
            }
        }
        writer.end_object()
    }

    /// Read an object into a new bean, ignoring the `tag_property` member
    pub(crate) fn read_object(
            &self,
            reader: &mut JsonReader<'_>,
            ctx: &Context,
            tag_property: Option<&str>
        ) -> Result<T>
    {
        reader.begin_object()?;
        let mut bean = (self.instantiate)();
        while reader.has_next()? {
            let name = reader.next_name()?;
            if let Some(&i) = self.index.get(&*name) {
                self.fields[i].property.read(&mut bean, reader, ctx)
                    .map_err(|err| err.in_property(&name))?;
            }
            else if tag_property == Some(&*name) {
                reader.skip_value()?;
            }
            else if ctx.fail_on_unknown_properties {
                return Err(DeserializationError::UnknownProperty {
                    name: name.into_owned(),
                    target: self.type_ref.to_string()
                }.into())
            }
            else {
                trace!("skipping unknown member {} of {}", name, self.type_ref);
                reader.skip_value()?;
            }
        }
        reader.end_object()?;
        Ok(bean)
    }
}

impl<T> Codec for BeanCodec<T> {
    type Value = T;

    fn encode(&self, value: &T, writer: &mut JsonWriter<'_>, ctx: &Context) -> Result<()> {
        self.write_object(value, writer, ctx, self.type_info())
    }

    fn decode(&self, reader: &mut JsonReader<'_>, ctx: &Context) -> Result<T> {
        let tag_property = self.type_info().map(|(property, _)| property);
        self.read_object(reader, ctx, tag_property)
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }
}

impl<T> core::fmt::Debug for BeanCodec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BeanCodec")
            .field("type_ref", &self.type_ref)
            .field("fields", &self.fields().map(ResolvedField::name).collect::<Vec<_>>())
            .field("type_info", &self.type_info)
            .finish()
    }
}

/// Native type name without its module path
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = core::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let start = base.rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::descriptor::{FieldDescriptor, PropertyOrder, TypeDescriptor};
    use crate::bean::registry::TypeRegistry;
    use crate::codec::{I32Codec, StringCodec, OptionCodec, ListCodec};
    use crate::codec::tests::{encode, encode_with, decode, decode_with};
    use crate::error::{Error, ErrorKind};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Person {
        name: String,
        age: i32,
        email: Option<String>,
        tags: Vec<String>,
        session: u64,
    }

    fn resolver() -> FieldOrderResolver {
        let string = || TypeRef::named("String");
        FieldOrderResolver::new(TypeRegistry::new().with(TypeDescriptor::new("Person")
            .order(PropertyOrder::new(["name"]).alphabetic())
            .field(FieldDescriptor::new("tags", TypeRef::generic("List", [string()])))
            .field(FieldDescriptor::new("name", string()))
            .field(FieldDescriptor::new("email", string()))
            .field(FieldDescriptor::new("age", TypeRef::named("int")))
            .field(FieldDescriptor::new("session", TypeRef::named("long")).ignored())))
    }

    fn person_codec(resolver: &FieldOrderResolver) -> Result<BeanCodec<Person>> {
        BeanCodec::builder(resolver, TypeRef::named("Person"), Person::default)
            .field("name", StringCodec, |p: &Person| &p.name, |p: &mut Person, v| p.name = v)
            .field("age", I32Codec, |p: &Person| &p.age, |p: &mut Person, v| p.age = v)
            .field("email", OptionCodec::new(StringCodec), |p: &Person| &p.email, |p: &mut Person, v| p.email = v)
            .field("tags", ListCodec::new(StringCodec), |p: &Person| &p.tags, |p: &mut Person, v| p.tags = v)
            .build()
    }

    fn sample() -> Person {
        Person {
            name: "Ada".into(),
            age: 36,
            email: None,
            tags: vec!["math".into()],
            session: 0,
        }
    }

    #[test]
    fn test_bean_codec_order_and_round_trip() {
        let resolver = resolver();
        let codec = person_codec(&resolver).unwrap();
        assert_eq!(codec.fields().map(ResolvedField::name).collect::<Vec<_>>(), ["name", "age", "email", "tags"]);
        let text = encode(&codec, &sample()).unwrap();
        assert_eq!(text, r#"{"name":"Ada","age":36,"email":null,"tags":["math"]}"#);
        assert_eq!(decode(&codec, &text).unwrap(), sample());
        assert_eq!(codec.target_type(), TypeId::of::<Person>());
        assert_eq!(codec.type_name(), "Person");
        assert_eq!(codec.bean_name(), "Person");
    }

    #[test]
    fn test_omit_nulls_and_order_override() {
        let resolver = resolver();
        let codec = person_codec(&resolver).unwrap();
        let ctx = Context::new().omit_nulls(true).property_order(["tags", "bogus", "age"]);
        assert_eq!(encode_with(&codec, &sample(), &ctx).unwrap(), r#"{"tags":["math"],"age":36,"name":"Ada"}"#);
    }

    #[test]
    fn test_unknown_members() {
        let resolver = resolver();
        let codec = person_codec(&resolver).unwrap();
        let input = r#"{"extra":{"deep":[1,2,{"x":null}]},"name":"Ada","session":99,"age":36,"tags":"math"}"#;
        let person = decode(&codec, input).unwrap();
        assert_eq!(person, sample());

        let ctx = Context::new().fail_on_unknown_properties(true);
        let err = decode_with(&codec, input, &ctx).unwrap_err();
        assert_eq!(err, Error::Deserialization(DeserializationError::UnknownProperty {
            name: "extra".into(), target: "Person".into()
        }));
    }

    #[test]
    fn test_incompatible_member_fails() {
        let resolver = resolver();
        let codec = person_codec(&resolver).unwrap();
        let err = decode(&codec, r#"{"name":"Ada","age":"old"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
        assert!(err.to_string().starts_with("property `age`: "));
        let err = decode(&codec, r#"{"name":"Ada","age":36"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_missing_and_extra_accessors() {
        let resolver = resolver();
        let err = BeanCodec::builder(&resolver, TypeRef::named("Person"), Person::default)
            .field("name", StringCodec, |p: &Person| &p.name, |p: &mut Person, v| p.name = v)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::Resolution(ResolutionError::MissingAccessor {
            type_name: "Person".into(), property: "age".into()
        }));

        let codec = person_codec(&resolver).unwrap();
        let extra = BeanCodec::builder(&resolver, TypeRef::named("Person"), Person::default)
            .field("session", crate::codec::U64Codec, |p: &Person| &p.session, |p: &mut Person, v| p.session = v)
            .field("name", StringCodec, |p: &Person| &p.name, |p: &mut Person, v| p.name = v)
            .field("age", I32Codec, |p: &Person| &p.age, |p: &mut Person, v| p.age = v)
            .field("email", OptionCodec::new(StringCodec), |p: &Person| &p.email, |p: &mut Person, v| p.email = v)
            .field("tags", ListCodec::new(StringCodec), |p: &Person| &p.tags, |p: &mut Person, v| p.tags = v)
            .build()
            .unwrap();
        let mut person = sample();
        person.session = 7;
        assert_eq!(encode(&extra, &person).unwrap(), encode(&codec, &sample()).unwrap());
    }

    #[test]
    fn test_type_info_member() {
        let resolver = resolver();
        let codec = BeanCodec::builder(&resolver, TypeRef::named("Person"), Person::default)
            .type_info("@type", "person")
            .field("name", StringCodec, |p: &Person| &p.name, |p: &mut Person, v| p.name = v)
            .field("age", I32Codec, |p: &Person| &p.age, |p: &mut Person, v| p.age = v)
            .field("email", OptionCodec::new(StringCodec), |p: &Person| &p.email, |p: &mut Person, v| p.email = v)
            .field("tags", ListCodec::new(StringCodec), |p: &Person| &p.tags, |p: &mut Person, v| p.tags = v)
            .build()
            .unwrap();
        let text = encode(&codec, &sample()).unwrap();
        assert!(text.starts_with(r#"{"@type":"person","name":"Ada""#));
        let ctx = Context::new().fail_on_unknown_properties(true);
        assert_eq!(decode_with(&codec, &text, &ctx).unwrap(), sample());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Person>(), "Person");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<alloc::string::String>");
        assert_eq!(short_type_name::<i32>(), "i32");
    }
}
