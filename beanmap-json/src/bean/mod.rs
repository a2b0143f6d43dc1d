//! Bean types: structural descriptors, field ordering and object codecs
//!
//! Bean codecs are registered by hand or by generated code, there is no
//! runtime introspection. The caller describes each type with a
//! [`TypeDescriptor`], the [`FieldOrderResolver`] flattens the inheritance
//! chain into the ordered list of serializable fields, and a [`BeanCodec`]
//! binds every resolved field to a codec and a getter/setter pair.
pub mod descriptor;
pub mod registry;
pub mod order;
pub mod codec;
pub mod polymorphic;

pub use descriptor::{TypeRef, FieldDescriptor, PropertyOrder, TypeDescriptor};
pub use registry::{TypeRegistry, CodecRegistry};
pub use order::{FieldOrderResolver, ResolvedField};
pub use codec::{BeanCodec, BeanCodecBuilder};
pub use polymorphic::{PolymorphicCodec, DEFAULT_TYPE_PROPERTY};
