//! The shape forms a [`Descriptor`](super::Descriptor) is assembled from.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use super::{Codable, EachEntryFn, EachFn, ShapeRule};
use crate::decode::{
    ArrayDecoder, DiscriminatingDecoder, ListBuilderDecoder, ListCollectDecoder, ListInsertDecoder,
    MapBuilderDecoder, MapCollectDecoder, MapInsertDecoder, MappedDecoder, MemberDecoder, NullableDecoder,
    ObjectMemberDecoder, ParseDecoder, TextDecoder, ValueDecoder,
};
use crate::encode::{
    MapEncoder, MemberEncoder, NullableEncoder, ObjectMemberEncoder, ParseEncoder, ProjectedEncoder,
    SequenceEncoder, TextEncoder, TypedVariantArm, ValueEncoder, VariantArm, VariantEncoder,
};
use crate::error::Result;
use crate::member::{members_of, EncodingMember, JsonObject};
use crate::registry::CodecRegistry;

type Decoded<T> = Result<Option<Arc<dyn ValueDecoder<T>>>>;
type Encoded<T> = Result<Option<Arc<dyn ValueEncoder<T>>>>;

pub(crate) struct NullableForm<U>(PhantomData<fn() -> U>);

impl<U> NullableForm<U> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<U: Codable> ShapeRule<Option<U>> for NullableForm<U> {
    fn name(&self) -> &'static str {
        "nullable"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<Option<U>> {
        Ok(Some(Arc::new(NullableDecoder::new(registry.decoder::<U>()?))))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<Option<U>> {
        Ok(Some(Arc::new(NullableEncoder::new(registry.encoder::<U>()?))))
    }
}

pub(crate) struct TransparentForm<T, U> {
    wrap: fn(U) -> T,
    unwrap: fn(&T) -> &U,
}

impl<T, U> TransparentForm<T, U> {
    pub(crate) fn new(wrap: fn(U) -> T, unwrap: fn(&T) -> &U) -> Self {
        Self { wrap, unwrap }
    }
}

impl<T: 'static, U: Codable> ShapeRule<T> for TransparentForm<T, U> {
    fn name(&self) -> &'static str {
        "transparent"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        Ok(Some(Arc::new(MappedDecoder::new(registry.decoder::<U>()?, self.wrap))))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        Ok(Some(Arc::new(ProjectedEncoder::new(registry.encoder::<U>()?, self.unwrap))))
    }
}

/// Fixed-size sequences.
///
/// Decoding collects the elements into a scratch `Vec` and hands it to
/// `materialize`, which may reject a wrong length.
pub struct ArrayForm<T, E> {
    each: EachFn<T, E>,
    materialize: fn(&mut Vec<E>) -> Result<T>,
}

impl<T, E> ArrayForm<T, E> {
    pub fn new(each: EachFn<T, E>, materialize: fn(&mut Vec<E>) -> Result<T>) -> Self {
        Self { each, materialize }
    }
}

impl<T: 'static, E: Codable> ShapeRule<T> for ArrayForm<T, E> {
    fn name(&self) -> &'static str {
        "array"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        let element = registry.decoder::<E>()?;
        Ok(Some(Arc::new(ArrayDecoder::new(element, self.materialize))))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        Ok(Some(Arc::new(SequenceEncoder::new(registry.encoder::<E>()?, self.each))))
    }
}

/// Lists: element enumeration plus up to three ways to build one.
///
/// Decoding prefers `insert`, then `collect`, then `builder`. A form with
/// none of them is encode-only.
pub struct SequenceForm<T, E> {
    each: EachFn<T, E>,
    insert: Option<(fn() -> T, fn(&mut T, E))>,
    collect: Option<fn(&mut dyn Iterator<Item = E>) -> T>,
    builder: Option<(fn() -> T, fn(&T, &mut dyn Iterator<Item = E>) -> T)>,
}

impl<T, E> SequenceForm<T, E> {
    pub fn new(each: EachFn<T, E>) -> Self {
        Self {
            each,
            insert: None,
            collect: None,
            builder: None,
        }
    }

    /// Construct empty, then insert element by element.
    pub fn insert(mut self, new: fn() -> T, insert: fn(&mut T, E)) -> Self {
        self.insert = Some((new, insert));
        self
    }

    /// Build from all elements at once.
    pub fn collect(mut self, collect: fn(&mut dyn Iterator<Item = E>) -> T) -> Self {
        self.collect = Some(collect);
        self
    }

    /// Immutable builder: an empty instance and an "add range" returning a
    /// new instance.
    pub fn builder(mut self, empty: fn() -> T, add_range: fn(&T, &mut dyn Iterator<Item = E>) -> T) -> Self {
        self.builder = Some((empty, add_range));
        self
    }
}

impl<T: 'static, E: Codable> ShapeRule<T> for SequenceForm<T, E> {
    fn name(&self) -> &'static str {
        "list"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        if self.insert.is_none() && self.collect.is_none() && self.builder.is_none() {
            return Ok(None);
        }
        let element = registry.decoder::<E>()?;
        let decoder: Arc<dyn ValueDecoder<T>> = match (self.insert, self.collect, self.builder) {
            (Some((new, insert)), _, _) => Arc::new(ListInsertDecoder::new(element, new, insert)),
            (None, Some(collect), _) => Arc::new(ListCollectDecoder::new(element, collect)),
            (None, None, Some((empty, add_range))) => Arc::new(ListBuilderDecoder::new(element, empty, add_range)),
            (None, None, None) => return Ok(None),
        };
        Ok(Some(decoder))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        Ok(Some(Arc::new(SequenceEncoder::new(registry.encoder::<E>()?, self.each))))
    }
}

/// Key-value associations.
///
/// Keys go through the key codecs: string-like and parsable types only.
/// Decoding prefers `insert`, then `collect`, then `builder`.
pub struct MapForm<T, K, V> {
    each_entry: EachEntryFn<T, K, V>,
    insert: Option<(fn() -> T, fn(&mut T, K, V))>,
    collect: Option<fn(&mut dyn Iterator<Item = (K, V)>) -> T>,
    builder: Option<(fn() -> T, fn(&T, &mut dyn Iterator<Item = (K, V)>) -> T)>,
}

impl<T, K, V> MapForm<T, K, V> {
    pub fn new(each_entry: EachEntryFn<T, K, V>) -> Self {
        Self {
            each_entry,
            insert: None,
            collect: None,
            builder: None,
        }
    }

    pub fn insert(mut self, new: fn() -> T, insert: fn(&mut T, K, V)) -> Self {
        self.insert = Some((new, insert));
        self
    }

    pub fn collect(mut self, collect: fn(&mut dyn Iterator<Item = (K, V)>) -> T) -> Self {
        self.collect = Some(collect);
        self
    }

    pub fn builder(
        mut self,
        empty: fn() -> T,
        add_range: fn(&T, &mut dyn Iterator<Item = (K, V)>) -> T,
    ) -> Self {
        self.builder = Some((empty, add_range));
        self
    }
}

impl<T: 'static, K: Codable, V: Codable> ShapeRule<T> for MapForm<T, K, V> {
    fn name(&self) -> &'static str {
        "map"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        if self.insert.is_none() && self.collect.is_none() && self.builder.is_none() {
            return Ok(None);
        }
        let key = registry.key_decoder::<K>()?;
        let value = registry.decoder::<V>()?;
        let decoder: Arc<dyn ValueDecoder<T>> = match (self.insert, self.collect, self.builder) {
            (Some((new, insert)), _, _) => Arc::new(MapInsertDecoder::new(key, value, new, insert)),
            (None, Some(collect), _) => Arc::new(MapCollectDecoder::new(key, value, collect)),
            (None, None, Some((empty, add_range))) => Arc::new(MapBuilderDecoder::new(key, value, empty, add_range)),
            (None, None, None) => return Ok(None),
        };
        Ok(Some(decoder))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        let key = registry.key_encoder::<K>()?;
        let value = registry.encoder::<V>()?;
        Ok(Some(Arc::new(MapEncoder::new(key, value, self.each_entry))))
    }
}

trait VariantRule<T>: Send + Sync {
    fn decoder(&self, registry: &CodecRegistry) -> Result<Arc<dyn ValueDecoder<T>>>;

    fn arm(&self, registry: &CodecRegistry) -> Result<Box<dyn VariantArm<T>>>;
}

struct Variant<T, V> {
    wrap: fn(V) -> T,
    project: fn(&T) -> Option<&V>,
}

impl<T: 'static, V: Codable> VariantRule<T> for Variant<T, V> {
    fn decoder(&self, registry: &CodecRegistry) -> Result<Arc<dyn ValueDecoder<T>>> {
        Ok(Arc::new(MappedDecoder::new(registry.decoder::<V>()?, self.wrap)))
    }

    fn arm(&self, registry: &CodecRegistry) -> Result<Box<dyn VariantArm<T>>> {
        Ok(Box::new(TypedVariantArm::new(registry.encoder::<V>()?, self.project)))
    }
}

/// The closed set of concrete variants of a polymorphic type.
///
/// Decoding sniffs an object's member names and picks the variant that
/// recognizes the most of them; the first declared variant wins a tie.
/// Encoding asks each variant in order to `project` the value.
pub struct VariantSet<T> {
    variants: Vec<Box<dyn VariantRule<T>>>,
}

impl<T: 'static> VariantSet<T> {
    pub fn new() -> Self {
        Self { variants: Vec::new() }
    }

    pub fn variant<V: Codable>(mut self, wrap: fn(V) -> T, project: fn(&T) -> Option<&V>) -> Self {
        self.variants.push(Box::new(Variant { wrap, project }));
        self
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl<T: 'static> Default for VariantSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ShapeRule<T> for VariantSet<T> {
    fn name(&self) -> &'static str {
        "variants"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        if self.variants.is_empty() {
            return Ok(None);
        }
        let variants = self
            .variants
            .iter()
            .map(|variant| variant.decoder(registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Arc::new(DiscriminatingDecoder::new(variants))))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        if self.variants.is_empty() {
            return Ok(None);
        }
        let arms = self
            .variants
            .iter()
            .map(|variant| variant.arm(registry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Arc::new(VariantEncoder::new(arms))))
    }
}

/// Objects with named members.
///
/// Decoding needs a constructor and at least one writable member; encoding
/// needs at least one member.
pub struct ObjectForm<T> {
    construct: Option<fn() -> T>,
    members: fn() -> Arc<[EncodingMember<T>]>,
}

impl<T: JsonObject> ObjectForm<T> {
    pub fn new(construct: fn() -> T) -> Self {
        Self {
            construct: Some(construct),
            members: members_of::<T>,
        }
    }

    /// Objects that are never decoded.
    pub fn encode_only() -> Self {
        Self {
            construct: None,
            members: members_of::<T>,
        }
    }
}

impl<T: 'static> ShapeRule<T> for ObjectForm<T> {
    fn name(&self) -> &'static str {
        "object"
    }

    fn decoder(&self, registry: &CodecRegistry) -> Decoded<T> {
        let Some(construct) = self.construct else {
            return Ok(None);
        };
        let mut members: HashMap<Arc<str>, Box<dyn MemberDecoder<T>>> = HashMap::new();
        for member in (self.members)().iter() {
            if let Some(decoder) = member.bind_decoder(registry)? {
                members.insert(member.key(), decoder);
            }
        }
        if members.is_empty() {
            return Ok(None);
        }
        Ok(Some(Arc::new(ObjectMemberDecoder::new(construct, members))))
    }

    fn encoder(&self, registry: &CodecRegistry) -> Encoded<T> {
        let members = (self.members)()
            .iter()
            .filter(|member| member.can_read())
            .map(|member| member.bind_encoder(registry))
            .collect::<Result<Vec<Box<dyn MemberEncoder<T>>>>>()?;
        if members.is_empty() {
            return Ok(None);
        }
        Ok(Some(Arc::new(ObjectMemberEncoder::new(members))))
    }
}

/// String-like types.
pub struct TextForm<T> {
    from: fn(Arc<str>) -> T,
    as_str: fn(&T) -> &str,
}

impl<T> TextForm<T> {
    pub fn new(from: fn(Arc<str>) -> T, as_str: fn(&T) -> &str) -> Self {
        Self { from, as_str }
    }
}

impl<T: 'static> TextForm<T> {
    pub(crate) fn bind_decoder(&self) -> Arc<dyn ValueDecoder<T>> {
        Arc::new(TextDecoder::new(self.from))
    }

    pub(crate) fn bind_encoder(&self) -> Arc<dyn ValueEncoder<T>> {
        Arc::new(TextEncoder::new(self.as_str))
    }
}

impl<T: 'static> ShapeRule<T> for TextForm<T> {
    fn name(&self) -> &'static str {
        "text"
    }

    fn decoder(&self, _registry: &CodecRegistry) -> Decoded<T> {
        Ok(Some(self.bind_decoder()))
    }

    fn encoder(&self, _registry: &CodecRegistry) -> Encoded<T> {
        Ok(Some(self.bind_encoder()))
    }
}

/// Scalars stored as their formatted text inside a JSON string.
pub struct ParseForm<T> {
    parse: fn(&str) -> std::result::Result<T, String>,
    format: fn(&T, &mut dyn fmt::Write) -> fmt::Result,
}

impl<T> ParseForm<T> {
    pub fn new(
        parse: fn(&str) -> std::result::Result<T, String>,
        format: fn(&T, &mut dyn fmt::Write) -> fmt::Result,
    ) -> Self {
        Self { parse, format }
    }
}

impl<T> ParseForm<T>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    /// Parses with `FromStr` and formats with `Display`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str() -> Self {
        Self {
            parse: |text| text.parse::<T>().map_err(|e| e.to_string()),
            format: |value, out| write!(out, "{value}"),
        }
    }
}

impl<T: 'static> ParseForm<T> {
    pub(crate) fn bind_decoder(&self) -> Arc<dyn ValueDecoder<T>> {
        Arc::new(ParseDecoder::new(self.parse))
    }

    pub(crate) fn bind_encoder(&self) -> Arc<dyn ValueEncoder<T>> {
        Arc::new(ParseEncoder::new(self.format))
    }
}

impl<T: 'static> ShapeRule<T> for ParseForm<T> {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn decoder(&self, _registry: &CodecRegistry) -> Decoded<T> {
        Ok(Some(self.bind_decoder()))
    }

    fn encoder(&self, _registry: &CodecRegistry) -> Encoded<T> {
        Ok(Some(self.bind_encoder()))
    }
}
