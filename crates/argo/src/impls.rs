//! `Codable` for standard library types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::decimal::Decimal;
use crate::error::{CodecError, Result};
use crate::shape::{ArrayForm, Codable, Descriptor, MapForm, ParseForm, SequenceForm};
use crate::value::Value;

// Numbers and booleans have pre-registered value codecs; the descriptor only
// serves them as map keys.
macro_rules! parsable {
    ($($t:ty),* $(,)?) => {
        $(
            impl Codable for $t {
                fn descriptor() -> Descriptor<Self> {
                    Descriptor::<Self>::new().parse(ParseForm::from_str())
                }
            }
        )*
    };
}

parsable!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, Decimal);
parsable!(char, IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

/// `null` decodes to `""`, so the two cannot be told apart afterwards.
/// Use `Option<String>` to keep them distinct.
impl Codable for String {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .text(|text| String::from(&*text), String::as_str)
            .or_null(String::new)
    }
}

/// `null` decodes to `""`, as for `String`.
impl Codable for Arc<str> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().text(|text| text, |text| &**text)
    }
}

/// `null` decodes to `""`, as for `String`.
impl Codable for Box<str> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .text(|text| Box::from(&*text), |text| &**text)
            .or_null(Box::default)
    }
}

impl Codable for Value {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
    }
}

impl<T: Codable> Codable for Option<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::option()
    }
}

impl<T: Codable> Codable for Box<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().transparent(Box::new, |boxed| &**boxed)
    }
}

impl<T: Codable + Sync> Codable for Arc<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new().transparent(Arc::new, |shared| &**shared)
    }
}

fn each<'a, T: 'a, I: IntoIterator<Item = &'a T>>(items: I, f: &mut dyn FnMut(&T) -> Result<()>) -> Result<()> {
    items.into_iter().try_for_each(f)
}

impl<T: Codable> Codable for Vec<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(
                SequenceForm::<Self, T>::new(|list, f| each(list, f))
                    .insert(Vec::new, Vec::push)
                    .collect(|items| items.collect()),
            )
            .or_null(Vec::new)
    }
}

impl<T: Codable> Codable for VecDeque<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(SequenceForm::<Self, T>::new(|list, f| each(list, f)).insert(VecDeque::new, VecDeque::push_back))
            .or_null(VecDeque::new)
    }
}

impl<T: Codable + Eq + Hash> Codable for HashSet<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(SequenceForm::<Self, T>::new(|set, f| each(set, f)).insert(HashSet::new, |set, item| {
                set.insert(item);
            }))
            .or_null(HashSet::new)
    }
}

impl<T: Codable + Ord> Codable for BTreeSet<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(SequenceForm::<Self, T>::new(|set, f| each(set, f)).insert(BTreeSet::new, |set, item| {
                set.insert(item);
            }))
            .or_null(BTreeSet::new)
    }
}

impl<T: Codable + Eq + Hash> Codable for IndexSet<T> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(SequenceForm::<Self, T>::new(|set, f| each(set, f)).insert(IndexSet::new, |set, item| {
                set.insert(item);
            }))
            .or_null(IndexSet::new)
    }
}

impl<T: Codable + Sync> Codable for Arc<[T]> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .list(SequenceForm::<Self, T>::new(|list, f| each(list.iter(), f)).collect(|items| items.collect()))
            .or_null(|| Arc::from(Vec::new()))
    }
}

impl<T: Codable> Codable for Box<[T]> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .array(ArrayForm::<Self, T>::new(
                |array, f| each(array.iter(), f),
                |items| Ok(std::mem::take(items).into_boxed_slice()),
            ))
            .or_null(Box::default)
    }
}

impl<T: Codable, const N: usize> Codable for [T; N] {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .array(ArrayForm::<Self, T>::new(|array, f| each(array, f), |items| {
                let found = items.len();
                std::mem::take(items)
                    .try_into()
                    .map_err(|_| CodecError::LengthMismatch { expected: N, found })
            }))
            .reference()
    }
}

fn each_entry<'a, K: 'a, V: 'a, I: IntoIterator<Item = (&'a K, &'a V)>>(
    entries: I,
    f: &mut dyn FnMut(&K, &V) -> Result<()>,
) -> Result<()> {
    entries.into_iter().try_for_each(|(k, v)| f(k, v))
}

impl<K: Codable + Eq + Hash, V: Codable> Codable for HashMap<K, V> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .map(
                MapForm::<Self, K, V>::new(|map, f| each_entry(map, f))
                    .insert(HashMap::new, |map, k, v| {
                        map.insert(k, v);
                    })
                    .collect(|pairs| pairs.collect()),
            )
            .or_null(HashMap::new)
    }
}

impl<K: Codable + Ord, V: Codable> Codable for BTreeMap<K, V> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .map(
                MapForm::<Self, K, V>::new(|map, f| each_entry(map, f))
                    .insert(BTreeMap::new, |map, k, v| {
                        map.insert(k, v);
                    })
                    .collect(|pairs| pairs.collect()),
            )
            .or_null(BTreeMap::new)
    }
}

impl<K: Codable + Eq + Hash, V: Codable> Codable for IndexMap<K, V> {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .map(
                MapForm::<Self, K, V>::new(|map, f| each_entry(map, f))
                    .insert(IndexMap::new, |map, k, v| {
                        map.insert(k, v);
                    })
                    .collect(|pairs| pairs.collect()),
            )
            .or_null(IndexMap::new)
    }
}
