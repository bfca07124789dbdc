//! Member-keyed object decoding and polymorphic dispatch.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use argo_util::{shared_pool, ObjectPool};

use super::{JsonReader, ValueDecoder};
use crate::error::{CodecError, Result};

/// Decodes one member's value straight into the instance being built.
pub(crate) trait MemberDecoder<T>: Send + Sync {
    fn decode_into(&self, reader: &mut JsonReader<'_>, target: &mut T) -> Result<()>;
}

pub(crate) struct TypedMemberDecoder<T, M> {
    decoder: Arc<dyn ValueDecoder<M>>,
    set: fn(&mut T, M),
}

impl<T, M> TypedMemberDecoder<T, M> {
    pub(crate) fn new(decoder: Arc<dyn ValueDecoder<M>>, set: fn(&mut T, M)) -> Self {
        Self { decoder, set }
    }
}

impl<T: 'static, M: 'static> MemberDecoder<T> for TypedMemberDecoder<T, M> {
    fn decode_into(&self, reader: &mut JsonReader<'_>, target: &mut T) -> Result<()> {
        let value = self.decoder.decode(reader)?;
        (self.set)(target, value);
        Ok(())
    }
}

/// Objects with named members.
///
/// Starts from the type's default instance and assigns every key present in
/// the input. A key without a writable member is an error.
pub(crate) struct ObjectMemberDecoder<T> {
    construct: fn() -> T,
    members: HashMap<Arc<str>, Box<dyn MemberDecoder<T>>>,
}

impl<T> ObjectMemberDecoder<T> {
    pub(crate) fn new(construct: fn() -> T, members: HashMap<Arc<str>, Box<dyn MemberDecoder<T>>>) -> Self {
        Self { construct, members }
    }
}

impl<T: 'static> ValueDecoder<T> for ObjectMemberDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut instance = (self.construct)();
        reader.read_object(|reader, key| match self.members.get(&*key) {
            Some(member) => member.decode_into(reader, &mut instance),
            None => Err(CodecError::UnknownMember {
                type_name: type_name::<T>(),
                member: key,
            }),
        })?;
        Ok(instance)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        names
            .iter()
            .filter(|name| self.members.contains_key(&***name))
            .count()
    }
}

/// Picks a variant of a polymorphic type by sniffing the object's keys.
///
/// The keys are collected with every value skipped, the cursor is rewound,
/// and the variant recognizing the most keys decodes the object. Ties go to
/// the variant declared first.
pub(crate) struct DiscriminatingDecoder<T> {
    variants: Vec<Arc<dyn ValueDecoder<T>>>,
    names: Arc<ObjectPool<Vec<Arc<str>>>>,
}

impl<T> DiscriminatingDecoder<T> {
    pub(crate) fn new(variants: Vec<Arc<dyn ValueDecoder<T>>>) -> Self {
        Self {
            variants,
            names: shared_pool(),
        }
    }

    fn best_match(&self, names: &[Arc<str>]) -> Option<&Arc<dyn ValueDecoder<T>>> {
        let (first, rest) = self.variants.split_first()?;
        let mut best = (first, first.matching_member_count(names));
        for variant in rest {
            let count = variant.matching_member_count(names);
            if count > best.1 {
                best = (variant, count);
            }
        }
        Some(best.0)
    }
}

impl<T: 'static> ValueDecoder<T> for DiscriminatingDecoder<T> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let no_match = || CodecError::NoMatchingVariant {
            type_name: type_name::<T>(),
        };
        if !reader.is_token('{') {
            return self.variants.first().ok_or_else(no_match)?.decode(reader);
        }
        let start = reader.position();
        let variant = {
            let mut names = self.names.acquire();
            reader.read_object(|reader, key| {
                names.push(key);
                reader.skip_value()
            })?;
            self.best_match(&names).ok_or_else(no_match)?
        };
        reader.rewind(start);
        variant.decode(reader)
    }

    fn matching_member_count(&self, names: &[Arc<str>]) -> usize {
        self.variants
            .iter()
            .map(|variant| variant.matching_member_count(names))
            .max()
            .unwrap_or(0)
    }
}
