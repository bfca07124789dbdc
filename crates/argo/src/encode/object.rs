//! Member-keyed object encoding and polymorphic dispatch.

use std::any::type_name;
use std::sync::Arc;

use super::{quoted, JsonWriter, ValueEncoder};
use crate::error::{CodecError, Result};
use crate::member::Getter;

/// Writes one `"name": value` pair of an instance.
pub(crate) trait MemberEncoder<T>: Send + Sync {
    fn encode_member(&self, writer: &mut JsonWriter<'_>, instance: &T) -> Result<()>;
}

pub(crate) struct TypedMemberEncoder<T, M> {
    /// Escaped and quoted once, at build time.
    key: String,
    encoder: Arc<dyn ValueEncoder<M>>,
    get: Getter<T, M>,
}

impl<T, M> TypedMemberEncoder<T, M> {
    pub(crate) fn new(name: &str, encoder: Arc<dyn ValueEncoder<M>>, get: Getter<T, M>) -> Self {
        Self {
            key: quoted(name),
            encoder,
            get,
        }
    }
}

impl<T: 'static, M: 'static> MemberEncoder<T> for TypedMemberEncoder<T, M> {
    fn encode_member(&self, writer: &mut JsonWriter<'_>, instance: &T) -> Result<()> {
        writer.write_raw(&self.key)?;
        writer.key_separator()?;
        match self.get {
            Getter::Field(get) => self.encoder.encode(writer, get(instance)),
            Getter::Computed(compute) => self.encoder.encode(writer, &compute(instance)),
        }
    }
}

/// Objects: every readable member in declaration order.
pub(crate) struct ObjectMemberEncoder<T> {
    members: Vec<Box<dyn MemberEncoder<T>>>,
}

impl<T> ObjectMemberEncoder<T> {
    pub(crate) fn new(members: Vec<Box<dyn MemberEncoder<T>>>) -> Self {
        Self { members }
    }
}

impl<T: 'static> ValueEncoder<T> for ObjectMemberEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, instance: &T) -> Result<()> {
        writer.write_char('{')?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                writer.item_separator()?;
            }
            member.encode_member(writer, instance)?;
        }
        writer.write_char('}')
    }
}

/// One variant of a polymorphic type on the encode side.
pub(crate) trait VariantArm<T>: Send + Sync {
    /// Encodes `value` if it is this variant, `None` otherwise.
    fn try_encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Option<Result<()>>;
}

pub(crate) struct TypedVariantArm<T, V> {
    encoder: Arc<dyn ValueEncoder<V>>,
    project: fn(&T) -> Option<&V>,
}

impl<T, V> TypedVariantArm<T, V> {
    pub(crate) fn new(encoder: Arc<dyn ValueEncoder<V>>, project: fn(&T) -> Option<&V>) -> Self {
        Self { encoder, project }
    }
}

impl<T: 'static, V: 'static> VariantArm<T> for TypedVariantArm<T, V> {
    fn try_encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Option<Result<()>> {
        let variant = (self.project)(value)?;
        Some(self.encoder.encode(writer, variant))
    }
}

/// Encodes a polymorphic value with the encoder of its concrete variant.
pub(crate) struct VariantEncoder<T> {
    arms: Vec<Box<dyn VariantArm<T>>>,
}

impl<T> VariantEncoder<T> {
    pub(crate) fn new(arms: Vec<Box<dyn VariantArm<T>>>) -> Self {
        Self { arms }
    }
}

impl<T: 'static> ValueEncoder<T> for VariantEncoder<T> {
    fn encode(&self, writer: &mut JsonWriter<'_>, value: &T) -> Result<()> {
        for arm in &self.arms {
            if let Some(result) = arm.try_encode(writer, value) {
                return result;
            }
        }
        Err(CodecError::NoMatchingVariant {
            type_name: type_name::<T>(),
        })
    }
}
