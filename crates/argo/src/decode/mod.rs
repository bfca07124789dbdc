//! Decode engine.
//!
//! [`JsonReader`] tokenizes straight from the encoded bytes; every decoder is
//! a [`ValueDecoder`] built once by the registry and shared by all calls.

mod any;
mod collections;
mod number;
mod object;
mod reader;
mod string;
mod wrap;

use std::sync::Arc;

use crate::error::Result;

pub use any::LooseObject;
pub(crate) use any::{AnyDecoder, FieldLookupDecoder};
pub(crate) use collections::{
    ArrayDecoder, ListBuilderDecoder, ListCollectDecoder, ListInsertDecoder, MapBuilderDecoder,
    MapCollectDecoder, MapInsertDecoder,
};
pub use number::{BoolDecoder, Magnitude, Number, NumberDecoder, NumberTarget};
pub(crate) use object::{DiscriminatingDecoder, MemberDecoder, ObjectMemberDecoder, TypedMemberDecoder};
pub use reader::JsonReader;
pub(crate) use string::{ParseDecoder, TextDecoder};
pub(crate) use wrap::{MappedDecoder, NullGuardDecoder, NullableDecoder};

/// Decodes one JSON value into a `T`.
///
/// Implementations are immutable and shared across threads; all per-call
/// state lives in the [`JsonReader`].
pub trait ValueDecoder<T>: Send + Sync {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T>;

    /// How many of `names` this decoder recognizes as object members.
    ///
    /// Used to pick a variant of a polymorphic type. Decoders that do not
    /// decode objects recognize none.
    fn matching_member_count(&self, _names: &[Arc<str>]) -> usize {
        0
    }
}
