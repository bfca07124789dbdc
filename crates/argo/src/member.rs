//! Member accessor layer.
//!
//! An [`EncodingMember`] is a named get/set pair bound to one declaring type.
//! The member list of a type comes from [`JsonObject::members`], usually
//! generated by `#[derive(JsonObject)]`, and is cached per type by
//! [`members_of`].

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::decode::{MemberDecoder, TypedMemberDecoder};
use crate::encode::{MemberEncoder, TypedMemberEncoder};
use crate::error::Result;
use crate::registry::CodecRegistry;
use crate::shape::Codable;

/// Types with named members.
///
/// ```
/// use argo::{EncodingMember, JsonObject};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl JsonObject for Point {
///     fn members() -> Vec<EncodingMember<Self>> {
///         vec![
///             EncodingMember::<Self>::field("X", |p| &p.x, |p, v| p.x = v),
///             EncodingMember::<Self>::computed("Sum", |p| p.x + p.y),
///         ]
///     }
/// }
///
/// let members = argo::members_of::<Point>();
/// assert_eq!(members[0].name(), "X");
/// assert!(members[0].can_write());
/// assert!(!members[1].can_write());
/// ```
pub trait JsonObject: Sized + Send + 'static {
    fn members() -> Vec<EncodingMember<Self>>;
}

/// How a member's value is read.
pub(crate) enum Getter<T, M> {
    Field(fn(&T) -> &M),
    Computed(fn(&T) -> M),
}

impl<T, M> Clone for Getter<T, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, M> Copy for Getter<T, M> {}

/// Binds one member to the codecs of its type.
pub(crate) trait MemberAccess<T>: Send + Sync {
    fn member_type(&self) -> &'static str;

    fn can_write(&self) -> bool;

    fn bind_decoder(&self, registry: &CodecRegistry) -> Result<Option<Box<dyn MemberDecoder<T>>>>;

    fn bind_encoder(&self, name: &str, registry: &CodecRegistry) -> Result<Box<dyn MemberEncoder<T>>>;
}

struct TypedAccess<T, M> {
    get: Getter<T, M>,
    set: Option<fn(&mut T, M)>,
}

impl<T: 'static, M: Codable> MemberAccess<T> for TypedAccess<T, M> {
    fn member_type(&self) -> &'static str {
        type_name::<M>()
    }

    fn can_write(&self) -> bool {
        self.set.is_some()
    }

    fn bind_decoder(&self, registry: &CodecRegistry) -> Result<Option<Box<dyn MemberDecoder<T>>>> {
        let Some(set) = self.set else {
            return Ok(None);
        };
        Ok(Some(Box::new(TypedMemberDecoder::new(registry.decoder::<M>()?, set))))
    }

    fn bind_encoder(&self, name: &str, registry: &CodecRegistry) -> Result<Box<dyn MemberEncoder<T>>> {
        Ok(Box::new(TypedMemberEncoder::new(name, registry.encoder::<M>()?, self.get)))
    }
}

/// A named member of `T`.
pub struct EncodingMember<T> {
    name: Arc<str>,
    access: Arc<dyn MemberAccess<T>>,
}

impl<T: 'static> EncodingMember<T> {
    /// A readable and writable member.
    pub fn field<M: Codable>(name: &str, get: fn(&T) -> &M, set: fn(&mut T, M)) -> Self {
        Self::with_access(name, Getter::Field(get), Some(set))
    }

    /// A member that is encoded but never assigned.
    pub fn read_only<M: Codable>(name: &str, get: fn(&T) -> &M) -> Self {
        Self::with_access(name, Getter::Field(get), None)
    }

    /// An encode-only member whose value is computed from the instance.
    pub fn computed<M: Codable>(name: &str, compute: fn(&T) -> M) -> Self {
        Self::with_access(name, Getter::Computed(compute), None)
    }

    fn with_access<M: Codable>(name: &str, get: Getter<T, M>, set: Option<fn(&mut T, M)>) -> Self {
        Self {
            name: Arc::from(name),
            access: Arc::new(TypedAccess { get, set }),
        }
    }
}

impl<T> EncodingMember<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the member's declared type.
    pub fn member_type(&self) -> &'static str {
        self.access.member_type()
    }

    pub fn can_read(&self) -> bool {
        true
    }

    pub fn can_write(&self) -> bool {
        self.access.can_write()
    }

    pub(crate) fn key(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub(crate) fn bind_decoder(&self, registry: &CodecRegistry) -> Result<Option<Box<dyn MemberDecoder<T>>>> {
        self.access.bind_decoder(registry)
    }

    pub(crate) fn bind_encoder(&self, registry: &CodecRegistry) -> Result<Box<dyn MemberEncoder<T>>> {
        self.access.bind_encoder(&self.name, registry)
    }
}

impl<T> Clone for EncodingMember<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            access: Arc::clone(&self.access),
        }
    }
}

impl<T> fmt::Debug for EncodingMember<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingMember")
            .field("name", &self.name)
            .field("type", &self.member_type())
            .field("can_write", &self.can_write())
            .finish()
    }
}

static MEMBERS: Lazy<DashMap<TypeId, Box<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

/// The members of `T`, discovered once and cached for the process.
pub fn members_of<T: JsonObject>() -> Arc<[EncodingMember<T>]> {
    let id = TypeId::of::<T>();
    if let Some(found) = MEMBERS
        .get(&id)
        .and_then(|entry| entry.downcast_ref::<Arc<[EncodingMember<T>]>>().cloned())
    {
        return found;
    }
    let members: Arc<[EncodingMember<T>]> = T::members().into();
    trace!(type_name = type_name::<T>(), count = members.len(), "discovered members");
    let entry = MEMBERS.entry(id).or_insert_with(|| Box::new(members.clone()));
    entry
        .downcast_ref::<Arc<[EncodingMember<T>]>>()
        .cloned()
        .unwrap_or(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Pair {
        left: String,
        right: i64,
    }

    impl JsonObject for Pair {
        fn members() -> Vec<EncodingMember<Self>> {
            vec![
                EncodingMember::<Self>::field("left", |p| &p.left, |p, v| p.left = v),
                EncodingMember::<Self>::read_only("right", |p| &p.right),
                EncodingMember::<Self>::computed("len", |p| p.left.len() as u64),
            ]
        }
    }

    #[test]
    fn members_keep_declaration_order() {
        let members = members_of::<Pair>();
        let names: Vec<_> = members.iter().map(EncodingMember::name).collect();
        assert_eq!(names, ["left", "right", "len"]);
        assert_eq!(members[0].member_type(), "alloc::string::String");
        assert!(members[0].can_write());
        assert!(!members[1].can_write());
        assert!(members.iter().all(EncodingMember::can_read));
    }

    #[test]
    fn members_are_cached() {
        let first = members_of::<Pair>();
        let second = members_of::<Pair>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn bound_accessors_read_and_write() {
        let mut pair = Pair::default();
        let registry = CodecRegistry::global();
        let members = members_of::<Pair>();
        let decoder = members[0].bind_decoder(registry).unwrap().unwrap();
        let mut reader = crate::decode::JsonReader::new(
            br#""hi""#,
            argo_buffers::TextEncoding::Utf8,
            Default::default(),
        );
        decoder.decode_into(&mut reader, &mut pair).unwrap();
        assert_eq!(pair.left, "hi");
        assert!(members[1].bind_decoder(registry).unwrap().is_none());
        pair.right = 7;
        let mut out = String::new();
        let mut writer = crate::encode::JsonWriter::new(&mut out, Default::default());
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                writer.write_char('|').unwrap();
            }
            let encoder = member.bind_encoder(registry).unwrap();
            encoder.encode_member(&mut writer, &pair).unwrap();
        }
        assert_eq!(out, r#""left": "hi"|"right": 7|"len": 2"#);
    }
}
