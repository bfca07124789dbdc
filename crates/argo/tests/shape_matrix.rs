//! Shape matrix: polymorphism, recursion, member options, custom forms and
//! registry behavior under concurrency.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use argo::{
    Codable, CodecError, CodecRegistry, Descriptor, JsonObject, JsonReader, JsonVariants, MapForm, SequenceForm,
    ValueDecoder,
};

// ---------------------------------------------------------------------------
// Polymorphic dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Circle {
    #[json(rename = "X")]
    x: i32,
}

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Rect {
    #[json(rename = "X")]
    x: i32,
    #[json(rename = "Y")]
    y: i32,
}

#[derive(Debug, PartialEq, JsonVariants)]
enum Shape {
    Circle(Circle),
    Rect(Rect),
}

#[test]
fn variant_with_most_matching_members_wins() {
    let shape: Shape = argo::decode_str(r#"{"X": 1, "Y": 2}"#).unwrap();
    assert_eq!(shape, Shape::Rect(Rect { x: 1, y: 2 }));
    let shape: Shape = argo::decode_str(r#"{"Y": 2, "X": 1}"#).unwrap();
    assert_eq!(shape, Shape::Rect(Rect { x: 1, y: 2 }));
}

#[test]
fn ties_go_to_the_first_variant() {
    let shape: Shape = argo::decode_str(r#"{"X": 7}"#).unwrap();
    assert_eq!(shape, Shape::Circle(Circle { x: 7 }));
    let shape: Shape = argo::decode_str("{}").unwrap();
    assert_eq!(shape, Shape::Circle(Circle::default()));
}

#[test]
fn non_objects_go_to_the_first_variant() {
    let shape: Shape = argo::decode_str("null").unwrap();
    assert_eq!(shape, Shape::Circle(Circle::default()));
    assert!(matches!(
        argo::decode_str::<Shape>("[1]"),
        Err(CodecError::MalformedToken { .. })
    ));
}

#[test]
fn variant_members_are_still_checked() {
    let err = argo::decode_str::<Shape>(r#"{"X": 1, "Z": 2}"#).unwrap_err();
    assert!(matches!(err, CodecError::UnknownMember { ref member, .. } if &**member == "Z"), "{err}");
}

#[test]
fn variants_encode_their_concrete_members() {
    assert_eq!(argo::encode(&Shape::Circle(Circle { x: 3 })).unwrap(), r#"{"X": 3}"#);
    assert_eq!(
        argo::encode(&Shape::Rect(Rect { x: 3, y: 4 })).unwrap(),
        r#"{"X": 3, "Y": 4}"#
    );
    let shapes = vec![Shape::Rect(Rect { x: 0, y: 1 }), Shape::Circle(Circle { x: 2 })];
    let text = argo::encode(&shapes).unwrap();
    assert_eq!(text, r#"[{"X": 0, "Y": 1}, {"X": 2}]"#);
    assert_eq!(argo::decode_str::<Vec<Shape>>(&text).unwrap(), shapes);
}

// ---------------------------------------------------------------------------
// Recursive shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Node {
    name: String,
    children: Vec<Node>,
}

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Tree {
    value: i32,
    left: Option<Box<Tree>>,
    right: Option<Box<Tree>>,
}

#[test]
fn self_referencing_lists() {
    let text = r#"{"name": "root", "children": [{"name": "a", "children": []}, {"name": "b", "children": [{"name": "c", "children": []}]}]}"#;
    let root: Node = argo::decode_str(text).unwrap();
    assert_eq!(root.children.len(), 2);
    assert_eq!(root.children[1].children[0].name, "c");
    assert_eq!(argo::encode(&root).unwrap(), text);
}

#[test]
fn self_referencing_options() {
    let tree: Tree = argo::decode_str(r#"{"value": 1, "left": {"value": 2, "left": null}, "right": null}"#).unwrap();
    let left = tree.left.as_deref().unwrap();
    assert_eq!(left.value, 2);
    assert!(left.left.is_none() && left.right.is_none());
    assert!(tree.right.is_none());
    assert_eq!(
        argo::encode(&tree).unwrap(),
        r#"{"value": 1, "left": {"value": 2, "left": null, "right": null}, "right": null}"#
    );
}

// ---------------------------------------------------------------------------
// Member options
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Account {
    #[json(read_only)]
    id: u32,
    r#type: String,
    #[json(skip)]
    cache: Vec<u8>,
}

#[test]
fn read_only_members_encode_but_never_decode() {
    let account = Account {
        id: 4,
        r#type: "admin".to_owned(),
        cache: vec![1],
    };
    assert_eq!(argo::encode(&account).unwrap(), r#"{"id": 4, "type": "admin"}"#);
    let err = argo::decode_str::<Account>(r#"{"id": 4}"#).unwrap_err();
    assert!(matches!(err, CodecError::UnknownMember { .. }));
    let decoded: Account = argo::decode_str(r#"{"type": "user"}"#).unwrap();
    assert_eq!(decoded.r#type, "user");
}

#[test]
fn member_table_reflects_options() {
    let members = argo::members_of::<Account>();
    let names: Vec<_> = members.iter().map(|m| m.name()).collect();
    assert_eq!(names, ["id", "type"]);
    assert!(!members[0].can_write());
    assert!(members[1].can_write());
    assert!(members.iter().all(|m| m.can_read()));
    assert!(members[1].member_type().ends_with("String"));
    assert!(Arc::ptr_eq(&members, &argo::members_of::<Account>()));
}

/// No `Default`, so it can only be written.
#[derive(JsonObject)]
#[json(encode_only)]
struct Report {
    total: u32,
    label: String,
}

#[test]
fn encode_only_objects() {
    let report = Report {
        total: 3,
        label: "ok".to_owned(),
    };
    assert_eq!(argo::encode(&report).unwrap(), r#"{"total": 3, "label": "ok"}"#);
    assert!(matches!(
        argo::decode_str::<Report>(r#"{"total": 3}"#),
        Err(CodecError::UnsupportedType { .. })
    ));
}

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Page<T> {
    items: Vec<T>,
    next: Option<u32>,
}

#[test]
fn generic_objects() {
    let page: Page<Rect> = argo::decode_str(r#"{"items": [{"X": 1, "Y": 2}], "next": 2}"#).unwrap();
    assert_eq!(page.items, [Rect { x: 1, y: 2 }]);
    assert_eq!(page.next, Some(2));
    let page: Page<String> = argo::decode_str(r#"{"items": ["a"]}"#).unwrap();
    assert_eq!(argo::encode(&page).unwrap(), r#"{"items": ["a"], "next": null}"#);
}

// ---------------------------------------------------------------------------
// Custom forms
// ---------------------------------------------------------------------------

/// An immutable list that only grows by copying.
#[derive(Debug, Clone, PartialEq)]
struct Frozen(Arc<[i32]>);

impl Codable for Frozen {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().list(
            SequenceForm::<Self, i32>::new(|frozen, f| frozen.0.iter().try_for_each(f)).builder(
                || Frozen(Arc::from(Vec::new())),
                |frozen, items| {
                    let mut all = frozen.0.to_vec();
                    all.extend(items);
                    Frozen(Arc::from(all))
                },
            ),
        )
    }
}

#[test]
fn list_builders() {
    let frozen: Frozen = argo::decode_str("[3, 1, 2]").unwrap();
    assert_eq!(&*frozen.0, [3, 1, 2]);
    assert_eq!(argo::encode(&frozen).unwrap(), "[3, 1, 2]");
    assert!(argo::decode_str::<Frozen>("[]").unwrap().0.is_empty());
}

/// A map that only grows by copying.
#[derive(Debug, Clone, PartialEq)]
struct Catalog(Arc<BTreeMap<String, u32>>);

impl Codable for Catalog {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().map(
            MapForm::<Self, String, u32>::new(|catalog, f| catalog.0.iter().try_for_each(|(k, v)| f(k, v))).builder(
                || Catalog(Arc::default()),
                |catalog, pairs| {
                    let mut all = (*catalog.0).clone();
                    all.extend(pairs);
                    Catalog(Arc::new(all))
                },
            ),
        )
    }
}

/// Pairs kept in input order.
#[derive(Debug, PartialEq)]
struct Pairs(Vec<(u16, bool)>);

impl Codable for Pairs {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().map(
            MapForm::<Self, u16, bool>::new(|pairs, f| pairs.0.iter().try_for_each(|(k, v)| f(k, v)))
                .collect(|pairs| Pairs(pairs.collect())),
        )
    }
}

#[test]
fn map_builders_and_collectors() {
    let catalog: Catalog = argo::decode_str(r#"{"b": 2, "a": 1}"#).unwrap();
    assert_eq!(catalog.0.get("a"), Some(&1));
    assert_eq!(argo::encode(&catalog).unwrap(), r#"{"a": 1, "b": 2}"#);

    let pairs: Pairs = argo::decode_str(r#"{"9": true, "1": false}"#).unwrap();
    assert_eq!(pairs, Pairs(vec![(9, true), (1, false)]));
    assert_eq!(argo::encode(&pairs).unwrap(), r#"{"9": true, "1": false}"#);
}

/// Encodes as a list but has no way to be rebuilt.
struct Snapshot(Vec<u8>);

impl Codable for Snapshot {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().list(SequenceForm::<Self, u8>::new(|snapshot, f| snapshot.0.iter().try_for_each(f)))
    }
}

#[test]
fn lists_without_constructors_are_encode_only() {
    assert_eq!(argo::encode(&Snapshot(vec![1, 2])).unwrap(), "[1, 2]");
    assert!(matches!(
        argo::decode_str::<Snapshot>("[1]"),
        Err(CodecError::UnsupportedType { .. })
    ));
}

#[test]
fn shapeless_types_are_unsupported() {
    struct Opaque;
    impl Codable for Opaque {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::<Self>::new()
        }
    }
    let err = argo::encode(&Opaque).unwrap_err();
    assert!(matches!(err, CodecError::UnsupportedType { reason: "no shape matched", .. }), "{err}");
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Racer {
    lap: u32,
    tags: Vec<String>,
}

#[test]
fn concurrent_first_use_builds_one_codec() {
    let decoders = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                scope.spawn(move || {
                    let racer: Racer = argo::decode_str(&format!(r#"{{"lap": {i}, "tags": ["t"]}}"#)).unwrap();
                    assert_eq!(racer.lap, i);
                    CodecRegistry::global().decoder::<Racer>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });
    let first = &decoders[0];
    assert!(decoders.iter().all(|d| Arc::ptr_eq(d, first)));
}

/// Upper-cases on the way in.
#[derive(Debug, PartialEq)]
struct Shouty(String);

impl Codable for Shouty {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().text(|text| Shouty(text.to_string()), |shouty| &shouty.0)
    }
}

struct ShoutyDecoder;

impl ValueDecoder<Shouty> for ShoutyDecoder {
    fn decode(&self, reader: &mut JsonReader<'_>) -> argo::Result<Shouty> {
        Ok(Shouty(reader.lex_string()?.to_uppercase()))
    }
}

#[test]
fn registered_codecs_take_precedence() {
    let registry = CodecRegistry::global();
    assert!(registry.register_decoder::<Shouty>(Arc::new(ShoutyDecoder)));
    assert!(!registry.register_decoder::<Shouty>(Arc::new(ShoutyDecoder)));
    assert_eq!(argo::decode_str::<Shouty>(r#""hey""#).unwrap(), Shouty("HEY".to_owned()));
    assert_eq!(argo::encode(&Shouty("hey".to_owned())).unwrap(), r#""hey""#);
}
