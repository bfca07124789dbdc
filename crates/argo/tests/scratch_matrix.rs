//! Scratch matrix: every pooled buffer a decode checks out goes back to its
//! pool, on success and on error.
//!
//! The pools are process-wide, so each test here owns a distinct pool type.

use std::sync::Arc;

use argo::{CodecError, JsonObject, JsonVariants};
use argo_util::shared_pool;

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Tally {
    v: u8,
}

#[test]
fn array_buffers_return_to_the_pool() {
    let pool = shared_pool::<Vec<Tally>>();
    let tallies: Box<[Tally]> = argo::decode_str(r#"[{"v": 1}, {"v": 2}]"#).unwrap();
    assert_eq!(tallies.len(), 2);
    assert_eq!(pool.available(), 1);

    assert!(argo::decode_str::<Box<[Tally]>>(r#"[{"v": 1}, {"v": 300}]"#).is_err());
    assert_eq!(pool.available(), 1);
    assert!(argo::decode_str::<Box<[Tally]>>(r#"[{"v": 1}, oops]"#).is_err());
    assert_eq!(pool.available(), 1);
}

#[test]
fn escape_buffers_return_to_the_pool() {
    let pool = shared_pool::<String>();
    let text: String = argo::decode_str(r#""a\nb""#).unwrap();
    assert_eq!(text, "a\nb");
    let before = pool.available();
    assert!(before >= 1);

    let err = argo::decode_str::<String>(r#""a\nb"#).unwrap_err();
    assert!(matches!(err, CodecError::MalformedToken { .. }), "{err}");
    assert_eq!(pool.available(), before);
    assert!(argo::decode_str::<String>(r#""a\x"#).is_err());
    assert_eq!(pool.available(), before);
}

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Dot {
    #[json(rename = "X")]
    x: i32,
}

#[derive(Debug, Default, PartialEq, JsonObject)]
struct Segment {
    #[json(rename = "X")]
    x: i32,
    #[json(rename = "Len")]
    len: u32,
}

#[derive(Debug, PartialEq, JsonVariants)]
enum Mark {
    Dot(Dot),
    Segment(Segment),
}

#[test]
fn sniffed_names_return_to_the_pool() {
    let pool = shared_pool::<Vec<Arc<str>>>();
    let mark: Mark = argo::decode_str(r#"{"X": 1, "Len": 4}"#).unwrap();
    assert_eq!(mark, Mark::Segment(Segment { x: 1, len: 4 }));
    let before = pool.available();
    assert!(before >= 1);

    assert!(argo::decode_str::<Mark>(r#"{"X": 1, "Len": [4, }"#).is_err());
    assert_eq!(pool.available(), before);
    assert!(argo::decode_str::<Mark>(r#"{"X": 1, "Len": -4}"#).is_err());
    assert_eq!(pool.available(), before);
}
