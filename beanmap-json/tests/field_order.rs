// field ordering over a generic three-level hierarchy
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use beanmap_json::bean::*;
use beanmap_json::codec::*;
use beanmap_json::{from_str, to_string};

fn string() -> TypeRef { TypeRef::named("String") }
fn long() -> TypeRef { TypeRef::named("Long") }
fn param(name: &str) -> TypeRef { TypeRef::param(name) }

/// ```text
/// Root<T>                          @order("note", alphabetic)
///   T id; String note; Date created; boolean alpha
/// Middle<K, V> extends Root<V>     @order("values")
///   K key; List<V> values; Map<K, V> index
/// Leaf<V> extends Middle<String, V>
///   V value; int count; static int INSTANCES; @ignore String cache
/// ```
fn hierarchy() -> TypeRegistry {
    TypeRegistry::new()
        .with(TypeDescriptor::new("Root")
            .type_param("T")
            .order(PropertyOrder::new(["note"]).alphabetic())
            .field(FieldDescriptor::new("id", param("T")))
            .field(FieldDescriptor::new("note", string()))
            .field(FieldDescriptor::new("created", TypeRef::named("Date")))
            .field(FieldDescriptor::new("alpha", TypeRef::named("boolean"))))
        .with(TypeDescriptor::new("Middle")
            .type_param("K")
            .type_param("V")
            .extends(TypeRef::generic("Root", [param("V")]))
            .order(PropertyOrder::new(["values"]))
            .field(FieldDescriptor::new("key", param("K")))
            .field(FieldDescriptor::new("values", TypeRef::generic("List", [param("V")])))
            .field(FieldDescriptor::new("index", TypeRef::generic("Map", [param("K"), param("V")]))))
        .with(TypeDescriptor::new("Leaf")
            .type_param("V")
            .extends(TypeRef::generic("Middle", [string(), param("V")]))
            .field(FieldDescriptor::new("value", param("V")))
            .field(FieldDescriptor::new("count", TypeRef::named("int")))
            .field(FieldDescriptor::new("INSTANCES", TypeRef::named("int")).static_field())
            .field(FieldDescriptor::new("cache", string()).ignored()))
}

fn summary(fields: &[ResolvedField]) -> Vec<(String, String)> {
    fields.iter().map(|field| (field.name().to_string(), field.ty().to_string())).collect()
}

#[test]
fn three_level_generic_hierarchy() {
    let resolver = FieldOrderResolver::new(hierarchy());
    let fields = resolver.resolve(&TypeRef::generic("Leaf", [long()])).unwrap();
    let expected = [
        ("value", "Long"),
        ("count", "int"),
        ("values", "List<Long>"),
        ("key", "String"),
        ("index", "Map<String, Long>"),
        ("note", "String"),
        ("alpha", "boolean"),
        ("created", "Date"),
        ("id", "Long"),
    ];
    assert_eq!(summary(&fields), expected.map(|(n, t)| (n.to_string(), t.to_string())));
    let declared: Vec<&str> = fields.iter().map(ResolvedField::declared_in).collect();
    assert_eq!(declared, ["Leaf", "Leaf", "Middle", "Middle", "Middle", "Root", "Root", "Root", "Root"]);
}

#[test]
fn two_parameterizations_do_not_mix() {
    let resolver = FieldOrderResolver::new(hierarchy());
    let longs = resolver.resolve(&TypeRef::generic("Leaf", [long()])).unwrap();
    let flags = resolver.resolve(&TypeRef::generic("Leaf", [TypeRef::named("Boolean")])).unwrap();
    let longs_again = resolver.resolve(&TypeRef::generic("Leaf", [long()])).unwrap();
    assert!(Arc::ptr_eq(&longs, &longs_again));

    let id_long = longs.iter().find(|f| f.name() == "id").unwrap();
    let id_flag = flags.iter().find(|f| f.name() == "id").unwrap();
    assert_eq!(id_long.ty(), &long());
    assert_eq!(id_flag.ty(), &TypeRef::named("Boolean"));
    // both derive from the very same declaration, which is left untouched
    assert!(Arc::ptr_eq(id_long.original(), id_flag.original()));
    assert_eq!(id_long.original().ty, param("T"));

    let index = flags.iter().find(|f| f.name() == "index").unwrap();
    assert_eq!(index.ty().to_string(), "Map<String, Boolean>");
    assert_eq!(longs.iter().find(|f| f.name() == "index").unwrap().ty().to_string(), "Map<String, Long>");
}

#[test]
fn raw_use_passes_parameters_through() {
    let resolver = FieldOrderResolver::new(hierarchy());
    let fields = resolver.resolve(&TypeRef::named("Leaf")).unwrap();
    let types: Vec<String> = fields.iter().map(|f| f.ty().to_string()).collect();
    assert_eq!(types, ["V", "int", "List<V>", "String", "Map<String, V>", "String", "boolean", "Date", "V"]);
    assert!(fields[0].ty().is_param());
}

#[test]
fn base_directive_and_subclass_fields() {
    let types = TypeRegistry::new()
        .with(TypeDescriptor::new("Base")
            .order(PropertyOrder::new(["zeta", "beta"]).alphabetic())
            .field(FieldDescriptor::new("omega", long()))
            .field(FieldDescriptor::new("beta", long()))
            .field(FieldDescriptor::new("delta", long()))
            .field(FieldDescriptor::new("zeta", long()))
            .field(FieldDescriptor::new("alpha", long())))
        .with(TypeDescriptor::new("Sub")
            .extends(TypeRef::named("Base"))
            .field(FieldDescriptor::new("yankee", long()))
            .field(FieldDescriptor::new("xray", long())));
    let resolver = FieldOrderResolver::new(types);
    let names: Vec<String> = resolver.resolve(&TypeRef::named("Sub")).unwrap()
        .iter().map(|f| f.name().to_string()).collect();
    assert_eq!(names, ["yankee", "xray", "zeta", "beta", "alpha", "delta", "omega"]);
}

#[test]
fn missing_ancestor_fails_codec_construction() {
    let types = hierarchy().with(TypeDescriptor::new("Stray").extends(TypeRef::named("Nowhere")));
    let resolver = FieldOrderResolver::new(types);
    let err = BeanCodec::builder(&resolver, TypeRef::named("Stray"), || ()).build().unwrap_err();
    assert_eq!(err.kind(), beanmap_json::ErrorKind::Resolution);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct LongLeaf {
    value: i64,
    count: i32,
    values: Vec<i64>,
    key: String,
    index: BTreeMap<String, i64>,
    note: Option<String>,
    alpha: bool,
    created: DateTime<Utc>,
    id: i64,
}

#[test]
fn bean_codec_follows_resolved_order() {
    let resolver = FieldOrderResolver::new(hierarchy());
    let codec = BeanCodec::builder(&resolver, TypeRef::generic("Leaf", [long()]), LongLeaf::default)
        .field("id", I64Codec, |b: &LongLeaf| &b.id, |b: &mut LongLeaf, v| b.id = v)
        .field("note", OptionCodec::new(StringCodec), |b: &LongLeaf| &b.note, |b: &mut LongLeaf, v| b.note = v)
        .field("created", DateTimeCodec::new(), |b: &LongLeaf| &b.created, |b: &mut LongLeaf, v| b.created = v)
        .field("alpha", BoolCodec, |b: &LongLeaf| &b.alpha, |b: &mut LongLeaf, v| b.alpha = v)
        .field("key", StringCodec, |b: &LongLeaf| &b.key, |b: &mut LongLeaf, v| b.key = v)
        .field("values", ListCodec::new(I64Codec), |b: &LongLeaf| &b.values, |b: &mut LongLeaf, v| b.values = v)
        .field("index", BTreeMapCodec::new(StringCodec, I64Codec), |b: &LongLeaf| &b.index, |b: &mut LongLeaf, v| b.index = v)
        .field("value", I64Codec, |b: &LongLeaf| &b.value, |b: &mut LongLeaf, v| b.value = v)
        .field("count", I32Codec, |b: &LongLeaf| &b.count, |b: &mut LongLeaf, v| b.count = v)
        .build()
        .unwrap();

    let leaf = LongLeaf {
        value: 7,
        count: 2,
        values: vec![1, 2],
        key: "k".into(),
        index: BTreeMap::from([("a".to_string(), 1)]),
        note: None,
        alpha: true,
        created: DateTime::from_timestamp_millis(1_709_214_307_000).unwrap(),
        id: 99,
    };
    let text = to_string(&codec, &leaf).unwrap();
    assert_eq!(text, concat!(
        r#"{"value":7,"count":2,"values":[1,2],"key":"k","index":{"a":1},"#,
        r#""note":null,"alpha":true,"created":1709214307000,"id":99}"#));
    assert_eq!(from_str(&codec, &text).unwrap(), leaf);
}
