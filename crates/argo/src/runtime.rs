//! Runtime-typed codec handles.
//!
//! A [`RuntimeType`] carries monomorphized decode and encode entry points
//! for one [`Codable`] type, so a type chosen at runtime can be decoded into
//! a `Box<dyn Any>` or encoded from a `&dyn Any`.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use crate::decode::JsonReader;
use crate::encode::JsonWriter;
use crate::error::{CodecError, Result};
use crate::registry::CodecRegistry;
use crate::shape::Codable;

type DecodeFn = fn(&mut JsonReader<'_>) -> Result<Box<dyn Any + Send>>;
type EncodeFn = fn(&mut JsonWriter<'_>, &dyn Any) -> Result<()>;

/// A type chosen at runtime.
///
/// ```
/// use argo::RuntimeType;
///
/// let runtime = RuntimeType::of::<Vec<u16>>();
/// let value = argo::decode_as(b"[1, 2]", Default::default(), &runtime).unwrap();
/// assert_eq!(value.downcast_ref::<Vec<u16>>(), Some(&vec![1, 2]));
/// assert_eq!(argo::encode_as(&*value, &runtime).unwrap(), "[1, 2]");
/// ```
#[derive(Clone, Copy)]
pub struct RuntimeType {
    id: TypeId,
    name: &'static str,
    decode: DecodeFn,
    encode: EncodeFn,
}

fn decode_boxed<T: Codable>(reader: &mut JsonReader<'_>) -> Result<Box<dyn Any + Send>> {
    let decoder = CodecRegistry::global().decoder::<T>()?;
    let value = decoder.decode(reader)?;
    Ok(Box::new(value))
}

fn encode_any<T: Codable>(writer: &mut JsonWriter<'_>, value: &dyn Any) -> Result<()> {
    let value = value
        .downcast_ref::<T>()
        .ok_or(CodecError::TypeMismatch { expected: type_name::<T>() })?;
    CodecRegistry::global().encoder::<T>()?.encode(writer, value)
}

impl RuntimeType {
    pub fn of<T: Codable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            decode: decode_boxed::<T>,
            encode: encode_any::<T>,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decode(&self, reader: &mut JsonReader<'_>) -> Result<Box<dyn Any + Send>> {
        (self.decode)(reader)
    }

    /// Fails with `TypeMismatch` when `value` is not of this type.
    pub fn encode(&self, writer: &mut JsonWriter<'_>, value: &dyn Any) -> Result<()> {
        (self.encode)(writer, value)
    }
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RuntimeType {}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuntimeType").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rejects_other_types() {
        let runtime = RuntimeType::of::<u32>();
        let mut out = String::new();
        let mut writer = JsonWriter::new(&mut out, Default::default());
        let err = runtime.encode(&mut writer, &"text").unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { expected: "u32" }));
        runtime.encode(&mut writer, &7u32).unwrap();
        assert_eq!(out, "7");
    }

    #[test]
    fn equality_is_by_type() {
        assert_eq!(RuntimeType::of::<String>(), RuntimeType::of::<String>());
        assert_ne!(RuntimeType::of::<String>(), RuntimeType::of::<Option<String>>());
        assert_eq!(RuntimeType::of::<bool>().name(), "bool");
    }
}
