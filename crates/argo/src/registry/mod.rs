//! Codec registry.
//!
//! One process-wide table per codec slot, keyed by `TypeId`. A codec is
//! built the first time its type is requested, outside any lock, and
//! inserted if absent; when two threads race, the first insert wins and the
//! loser's codec is dropped. Entries are never evicted.

mod builtin;
mod deferred;
mod resolve;

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::decode::ValueDecoder;
use crate::encode::ValueEncoder;
use crate::error::Result;
use crate::shape::Codable;

pub(crate) use deferred::{DeferredDecoder, DeferredEncoder};

type Table = DashMap<TypeId, Box<dyn Any + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Decoder,
    Encoder,
    KeyDecoder,
    KeyEncoder,
}

impl Slot {
    fn name(self) -> &'static str {
        match self {
            Slot::Decoder => "decoder",
            Slot::Encoder => "encoder",
            Slot::KeyDecoder => "key decoder",
            Slot::KeyEncoder => "key encoder",
        }
    }
}

thread_local! {
    static BUILDING: RefCell<HashSet<(Slot, TypeId)>> = RefCell::new(HashSet::new());
}

/// Marks a codec as under construction on this thread until dropped.
struct BuildGuard {
    key: (Slot, TypeId),
}

impl BuildGuard {
    /// `None` when the same codec is already being built further up the
    /// stack.
    fn enter(slot: Slot, id: TypeId) -> Option<Self> {
        let key = (slot, id);
        BUILDING
            .with(|building| building.borrow_mut().insert(key))
            .then_some(Self { key })
    }
}

impl Drop for BuildGuard {
    fn drop(&mut self) {
        BUILDING.with(|building| {
            building.borrow_mut().remove(&self.key);
        });
    }
}

static GLOBAL: Lazy<CodecRegistry> = Lazy::new(CodecRegistry::with_builtins);

/// Type-keyed cache of decoders and encoders.
pub struct CodecRegistry {
    decoders: Table,
    encoders: Table,
    key_decoders: Table,
    key_encoders: Table,
}

impl CodecRegistry {
    /// The process-wide registry, with the primitive codecs installed.
    pub fn global() -> &'static CodecRegistry {
        &GLOBAL
    }

    fn with_builtins() -> Self {
        let registry = Self {
            decoders: DashMap::new(),
            encoders: DashMap::new(),
            key_decoders: DashMap::new(),
            key_encoders: DashMap::new(),
        };
        builtin::install(&registry);
        registry
    }

    /// The decoder for `T`, built on first use.
    ///
    /// A request for a `T` whose decoder is already being built on this
    /// thread (a recursive type) returns a deferred handle that resolves
    /// through the registry when first used.
    pub fn decoder<T: Codable>(&self) -> Result<Arc<dyn ValueDecoder<T>>> {
        self.get_or_build::<T, _>(
            Slot::Decoder,
            &self.decoders,
            || Arc::new(DeferredDecoder::<T>::new()) as Arc<dyn ValueDecoder<T>>,
            || resolve::decoder::<T>(self),
        )
    }

    /// The encoder for `T`, built on first use.
    pub fn encoder<T: Codable>(&self) -> Result<Arc<dyn ValueEncoder<T>>> {
        self.get_or_build::<T, _>(
            Slot::Encoder,
            &self.encoders,
            || Arc::new(DeferredEncoder::<T>::new()) as Arc<dyn ValueEncoder<T>>,
            || resolve::encoder::<T>(self),
        )
    }

    /// The decoder for `T` in map key position.
    ///
    /// Keys are always JSON strings, so only string-like and parsable types
    /// have key codecs.
    pub fn key_decoder<T: Codable>(&self) -> Result<Arc<dyn ValueDecoder<T>>> {
        self.get_or_build::<T, _>(
            Slot::KeyDecoder,
            &self.key_decoders,
            || Arc::new(DeferredDecoder::<T>::keys()) as Arc<dyn ValueDecoder<T>>,
            || resolve::key_decoder::<T>(),
        )
    }

    pub fn key_encoder<T: Codable>(&self) -> Result<Arc<dyn ValueEncoder<T>>> {
        self.get_or_build::<T, _>(
            Slot::KeyEncoder,
            &self.key_encoders,
            || Arc::new(DeferredEncoder::<T>::keys()) as Arc<dyn ValueEncoder<T>>,
            || resolve::key_encoder::<T>(),
        )
    }

    /// Installs `decoder` for `T` unless one is already cached. Returns
    /// whether it was installed.
    pub fn register_decoder<T: 'static>(&self, decoder: Arc<dyn ValueDecoder<T>>) -> bool {
        Self::register::<T, _>(&self.decoders, decoder)
    }

    /// Installs `encoder` for `T` unless one is already cached. Returns
    /// whether it was installed.
    pub fn register_encoder<T: 'static>(&self, encoder: Arc<dyn ValueEncoder<T>>) -> bool {
        Self::register::<T, _>(&self.encoders, encoder)
    }

    fn register<T: 'static, C: Clone + Send + Sync + 'static>(table: &Table, codec: C) -> bool {
        let mut installed = false;
        table.entry(TypeId::of::<T>()).or_insert_with(|| {
            installed = true;
            Box::new(codec) as Box<dyn Any + Send + Sync>
        });
        installed
    }

    fn get_or_build<T: 'static, C: Clone + Send + Sync + 'static>(
        &self,
        slot: Slot,
        table: &Table,
        deferred: impl FnOnce() -> C,
        build: impl FnOnce() -> Result<(C, &'static str)>,
    ) -> Result<C> {
        let id = TypeId::of::<T>();
        if let Some(found) = lookup::<C>(table, id) {
            return Ok(found);
        }
        let Some(_guard) = BuildGuard::enter(slot, id) else {
            return Ok(deferred());
        };
        let (built, rule) = build()?;
        debug!(type_name = type_name::<T>(), rule, slot = slot.name(), "built codec");
        let entry = table.entry(id).or_insert_with(|| Box::new(built.clone()) as Box<dyn Any + Send + Sync>);
        Ok(entry.downcast_ref::<C>().cloned().unwrap_or(built))
    }
}

fn lookup<C: Clone + 'static>(table: &Table, id: TypeId) -> Option<C> {
    table.get(&id).and_then(|entry| entry.downcast_ref::<C>().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{EncodingMember, JsonObject};
    use crate::shape::{Descriptor, ObjectForm};
    use crate::CodecError;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Tally {
        count: u32,
    }

    impl JsonObject for Tally {
        fn members() -> Vec<EncodingMember<Self>> {
            vec![EncodingMember::<Self>::field("count", |t| &t.count, |t, v| t.count = v)]
        }
    }

    impl Codable for Tally {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new().object(ObjectForm::new(Tally::default))
        }
    }

    struct Opaque;

    impl Codable for Opaque {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
        }
    }

    #[test]
    fn codecs_are_cached() {
        let registry = CodecRegistry::global();
        let first = registry.decoder::<Tally>().unwrap();
        let second = registry.decoder::<Tally>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let first = registry.encoder::<Vec<Tally>>().unwrap();
        let second = registry.encoder::<Vec<Tally>>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn shapeless_types_are_unsupported() {
        let registry = CodecRegistry::global();
        assert!(matches!(
            registry.decoder::<Opaque>(),
            Err(CodecError::UnsupportedType { .. })
        ));
        assert!(matches!(
            registry.encoder::<Vec<Opaque>>(),
            Err(CodecError::UnsupportedType { .. })
        ));
        assert!(matches!(
            registry.key_decoder::<Tally>(),
            Err(CodecError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn registration_is_first_write_wins() {
        let registry = CodecRegistry::global();
        let decoder: Arc<dyn ValueDecoder<bool>> = Arc::new(crate::decode::BoolDecoder);
        assert!(!registry.register_decoder(decoder));
    }

    #[derive(Default)]
    struct Logged {
        flag: bool,
    }

    impl JsonObject for Logged {
        fn members() -> Vec<EncodingMember<Self>> {
            vec![EncodingMember::<Self>::field("flag", |l| &l.flag, |l, v| l.flag = v)]
        }
    }

    impl Codable for Logged {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new().object(ObjectForm::new(Logged::default))
        }
    }

    #[traced_test]
    #[test]
    fn building_a_codec_is_logged() {
        CodecRegistry::global().decoder::<Logged>().unwrap();
        assert!(logs_contain("built codec"));
        assert!(logs_contain("rule=\"object\""));
    }
}
