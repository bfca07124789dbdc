//! Type shapes.
//!
//! A type tells the registry what it looks like by returning a
//! [`Descriptor`] from [`Codable::descriptor`]. The descriptor lists every
//! shape the type offers; the registry picks the first one that yields a
//! codec, in this order:
//!
//! 1. nullable (`Option<U>`) and transparent pointers (`Box<U>`, `Arc<U>`)
//! 2. [`ArrayForm`]
//! 3. [`MapForm`]
//! 4. [`SequenceForm`]
//! 5. [`VariantSet`]
//! 6. [`ObjectForm`]
//! 7. text, then [`ParseForm`]
//!
//! ```
//! use argo::{Codable, Descriptor, ParseForm};
//!
//! #[derive(Debug, PartialEq)]
//! struct Celsius(f64);
//!
//! impl std::str::FromStr for Celsius {
//!     type Err = std::num::ParseFloatError;
//!     fn from_str(s: &str) -> Result<Self, Self::Err> {
//!         s.trim_end_matches("C").parse().map(Celsius)
//!     }
//! }
//!
//! impl std::fmt::Display for Celsius {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{}C", self.0)
//!     }
//! }
//!
//! impl Codable for Celsius {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::new().parse(ParseForm::from_str())
//!     }
//! }
//!
//! assert_eq!(argo::encode(&Celsius(21.5)).unwrap(), r#""21.5C""#);
//! assert_eq!(argo::decode_str::<Celsius>(r#""-3C""#).unwrap(), Celsius(-3.0));
//! ```

mod forms;

use std::sync::Arc;

use crate::decode::ValueDecoder;
use crate::encode::ValueEncoder;
use crate::error::Result;
use crate::registry::CodecRegistry;

pub use forms::{ArrayForm, MapForm, ObjectForm, ParseForm, SequenceForm, TextForm, VariantSet};
pub(crate) use forms::{NullableForm, TransparentForm};

/// Visits every element of a container.
pub type EachFn<T, E> = fn(&T, &mut dyn FnMut(&E) -> Result<()>) -> Result<()>;

/// Visits every entry of a map.
pub type EachEntryFn<T, K, V> = fn(&T, &mut dyn FnMut(&K, &V) -> Result<()>) -> Result<()>;

/// A type the registry can build codecs for.
pub trait Codable: Sized + Send + 'static {
    fn descriptor() -> Descriptor<Self>;
}

/// One shape of a type, turned into codecs on request.
///
/// `Ok(None)` means the shape does not apply in that direction and the
/// registry moves on to the next one.
pub(crate) trait ShapeRule<T>: Send + Sync {
    fn name(&self) -> &'static str;

    fn decoder(&self, registry: &CodecRegistry) -> Result<Option<Arc<dyn ValueDecoder<T>>>>;

    fn encoder(&self, registry: &CodecRegistry) -> Result<Option<Arc<dyn ValueEncoder<T>>>>;
}

/// The shapes a type offers.
pub struct Descriptor<T> {
    pub(crate) nullable: Option<Box<dyn ShapeRule<T>>>,
    pub(crate) transparent: Option<Box<dyn ShapeRule<T>>>,
    pub(crate) array: Option<Box<dyn ShapeRule<T>>>,
    pub(crate) map: Option<Box<dyn ShapeRule<T>>>,
    pub(crate) list: Option<Box<dyn ShapeRule<T>>>,
    pub(crate) variants: Option<VariantSet<T>>,
    pub(crate) object: Option<ObjectForm<T>>,
    pub(crate) text: Option<TextForm<T>>,
    pub(crate) parse: Option<ParseForm<T>>,
    pub(crate) reference_like: bool,
    pub(crate) null_value: Option<fn() -> T>,
}

impl<T: 'static> Descriptor<T> {
    /// A descriptor with no shapes. Resolving it fails with
    /// `UnsupportedType`.
    pub fn new() -> Self {
        Self {
            nullable: None,
            transparent: None,
            array: None,
            map: None,
            list: None,
            variants: None,
            object: None,
            text: None,
            parse: None,
            reference_like: false,
            null_value: None,
        }
    }

    /// Delegates to the codecs of `U`.
    pub fn transparent<U: Codable>(mut self, wrap: fn(U) -> T, unwrap: fn(&T) -> &U) -> Self {
        self.transparent = Some(Box::new(TransparentForm::new(wrap, unwrap)));
        self
    }

    pub fn array<E: Codable>(mut self, form: ArrayForm<T, E>) -> Self {
        self.array = Some(Box::new(form));
        self
    }

    pub fn map<K: Codable, V: Codable>(mut self, form: MapForm<T, K, V>) -> Self {
        self.map = Some(Box::new(form));
        self
    }

    pub fn list<E: Codable>(mut self, form: SequenceForm<T, E>) -> Self {
        self.list = Some(Box::new(form));
        self
    }

    pub fn variants(mut self, variants: VariantSet<T>) -> Self {
        self.variants = Some(variants);
        self
    }

    pub fn object(mut self, form: ObjectForm<T>) -> Self {
        self.object = Some(form);
        self
    }

    /// String-like: the JSON string is the value.
    pub fn text(mut self, from: fn(Arc<str>) -> T, as_str: fn(&T) -> &str) -> Self {
        self.text = Some(TextForm::new(from, as_str));
        self
    }

    /// Scalar stored as its formatted text inside a JSON string.
    pub fn parse(mut self, form: ParseForm<T>) -> Self {
        self.parse = Some(form);
        self
    }

    /// Marks the type reference-like: `null` is checked for in front of
    /// every shape and rejected unless [`or_null`](Self::or_null) names a
    /// value for it.
    pub fn reference(mut self) -> Self {
        self.reference_like = true;
        self
    }

    /// Reference-like, with `null` decoding into `null_value()`.
    pub fn or_null(mut self, null_value: fn() -> T) -> Self {
        self.reference_like = true;
        self.null_value = Some(null_value);
        self
    }

    /// Value shapes in resolution order.
    pub(crate) fn rules(&self) -> impl Iterator<Item = &dyn ShapeRule<T>> + '_ {
        let boxed = [&self.nullable, &self.transparent, &self.array, &self.map, &self.list]
            .into_iter()
            .filter_map(|rule| rule.as_deref());
        boxed
            .chain(self.variants.iter().map(|rule| rule as &dyn ShapeRule<T>))
            .chain(self.object.iter().map(|rule| rule as &dyn ShapeRule<T>))
            .chain(self.text.iter().map(|rule| rule as &dyn ShapeRule<T>))
            .chain(self.parse.iter().map(|rule| rule as &dyn ShapeRule<T>))
    }
}

impl<T: 'static> Default for Descriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Codable> Descriptor<Option<U>> {
    /// `Option<U>`: `null` is `None`, everything else is `U`.
    pub fn option() -> Self {
        let mut descriptor = Self::new();
        descriptor.nullable = Some(Box::new(NullableForm::<U>::new()));
        descriptor
    }
}
