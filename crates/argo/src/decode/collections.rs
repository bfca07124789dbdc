//! Array, list and map decoders.
//!
//! Every shape that cannot be filled in place decodes into a pooled scratch
//! `Vec` first. The guard returned by the pool puts the buffer back on every
//! exit path, errors included.

use std::sync::Arc;

use argo_util::{shared_pool, ObjectPool};

use super::{JsonReader, ValueDecoder};
use crate::error::Result;

fn read_pair<K, V>(
    reader: &mut JsonReader<'_>,
    key: &dyn ValueDecoder<K>,
    value: &dyn ValueDecoder<V>,
) -> Result<(K, V)> {
    let k = key.decode(reader)?;
    reader.consume(':')?;
    let v = value.decode(reader)?;
    Ok((k, v))
}

/// Fixed-size sequences: fill a pooled buffer, then materialize.
pub(crate) struct ArrayDecoder<T, E: Send + 'static> {
    element: Arc<dyn ValueDecoder<E>>,
    materialize: fn(&mut Vec<E>) -> Result<T>,
    pool: Arc<ObjectPool<Vec<E>>>,
}

impl<T, E: Send + 'static> ArrayDecoder<T, E> {
    pub(crate) fn new(element: Arc<dyn ValueDecoder<E>>, materialize: fn(&mut Vec<E>) -> Result<T>) -> Self {
        Self {
            element,
            materialize,
            pool: shared_pool(),
        }
    }
}

impl<T: 'static, E: Send + 'static> ValueDecoder<T> for ArrayDecoder<T, E> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut buffer = self.pool.acquire();
        reader.read_array(|reader| {
            buffer.push(self.element.decode(reader)?);
            Ok(())
        })?;
        (self.materialize)(&mut *buffer)
    }
}

/// Lists with an empty constructor and an insert operation.
pub(crate) struct ListInsertDecoder<T, E> {
    element: Arc<dyn ValueDecoder<E>>,
    new: fn() -> T,
    insert: fn(&mut T, E),
}

impl<T, E> ListInsertDecoder<T, E> {
    pub(crate) fn new(element: Arc<dyn ValueDecoder<E>>, new: fn() -> T, insert: fn(&mut T, E)) -> Self {
        Self { element, new, insert }
    }
}

impl<T: 'static, E: 'static> ValueDecoder<T> for ListInsertDecoder<T, E> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut list = (self.new)();
        reader.read_array(|reader| {
            (self.insert)(&mut list, self.element.decode(reader)?);
            Ok(())
        })?;
        Ok(list)
    }
}

/// Lists built in one go from a sequence of elements.
pub(crate) struct ListCollectDecoder<T, E: Send + 'static> {
    element: Arc<dyn ValueDecoder<E>>,
    collect: fn(&mut dyn Iterator<Item = E>) -> T,
    pool: Arc<ObjectPool<Vec<E>>>,
}

impl<T, E: Send + 'static> ListCollectDecoder<T, E> {
    pub(crate) fn new(element: Arc<dyn ValueDecoder<E>>, collect: fn(&mut dyn Iterator<Item = E>) -> T) -> Self {
        Self {
            element,
            collect,
            pool: shared_pool(),
        }
    }
}

impl<T: 'static, E: Send + 'static> ValueDecoder<T> for ListCollectDecoder<T, E> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut buffer = self.pool.acquire();
        reader.read_array(|reader| {
            buffer.push(self.element.decode(reader)?);
            Ok(())
        })?;
        let list = (self.collect)(&mut buffer.drain(..));
        Ok(list)
    }
}

/// Immutable lists: an empty instance plus an "add range" that returns a
/// new instance.
pub(crate) struct ListBuilderDecoder<T, E: Send + 'static> {
    element: Arc<dyn ValueDecoder<E>>,
    empty: fn() -> T,
    add_range: fn(&T, &mut dyn Iterator<Item = E>) -> T,
    pool: Arc<ObjectPool<Vec<E>>>,
}

impl<T, E: Send + 'static> ListBuilderDecoder<T, E> {
    pub(crate) fn new(
        element: Arc<dyn ValueDecoder<E>>,
        empty: fn() -> T,
        add_range: fn(&T, &mut dyn Iterator<Item = E>) -> T,
    ) -> Self {
        Self {
            element,
            empty,
            add_range,
            pool: shared_pool(),
        }
    }
}

impl<T: 'static, E: Send + 'static> ValueDecoder<T> for ListBuilderDecoder<T, E> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut buffer = self.pool.acquire();
        reader.read_array(|reader| {
            buffer.push(self.element.decode(reader)?);
            Ok(())
        })?;
        let list = (self.add_range)(&(self.empty)(), &mut buffer.drain(..));
        Ok(list)
    }
}

/// Maps with an empty constructor and a two-argument insert.
pub(crate) struct MapInsertDecoder<T, K, V> {
    key: Arc<dyn ValueDecoder<K>>,
    value: Arc<dyn ValueDecoder<V>>,
    new: fn() -> T,
    insert: fn(&mut T, K, V),
}

impl<T, K, V> MapInsertDecoder<T, K, V> {
    pub(crate) fn new(
        key: Arc<dyn ValueDecoder<K>>,
        value: Arc<dyn ValueDecoder<V>>,
        new: fn() -> T,
        insert: fn(&mut T, K, V),
    ) -> Self {
        Self { key, value, new, insert }
    }
}

impl<T: 'static, K: 'static, V: 'static> ValueDecoder<T> for MapInsertDecoder<T, K, V> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut map = (self.new)();
        reader.read_entries(|reader| {
            let (k, v) = read_pair(reader, &*self.key, &*self.value)?;
            (self.insert)(&mut map, k, v);
            Ok(())
        })?;
        Ok(map)
    }
}

/// Maps built in one go from key-value pairs.
pub(crate) struct MapCollectDecoder<T, K: Send + 'static, V: Send + 'static> {
    key: Arc<dyn ValueDecoder<K>>,
    value: Arc<dyn ValueDecoder<V>>,
    collect: fn(&mut dyn Iterator<Item = (K, V)>) -> T,
    pool: Arc<ObjectPool<Vec<(K, V)>>>,
}

impl<T, K: Send + 'static, V: Send + 'static> MapCollectDecoder<T, K, V> {
    pub(crate) fn new(
        key: Arc<dyn ValueDecoder<K>>,
        value: Arc<dyn ValueDecoder<V>>,
        collect: fn(&mut dyn Iterator<Item = (K, V)>) -> T,
    ) -> Self {
        Self {
            key,
            value,
            collect,
            pool: shared_pool(),
        }
    }
}

impl<T: 'static, K: Send + 'static, V: Send + 'static> ValueDecoder<T> for MapCollectDecoder<T, K, V> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut pairs = self.pool.acquire();
        reader.read_entries(|reader| {
            pairs.push(read_pair(reader, &*self.key, &*self.value)?);
            Ok(())
        })?;
        let map = (self.collect)(&mut pairs.drain(..));
        Ok(map)
    }
}

/// Immutable maps: an empty instance plus an "add range" over pairs.
pub(crate) struct MapBuilderDecoder<T, K: Send + 'static, V: Send + 'static> {
    key: Arc<dyn ValueDecoder<K>>,
    value: Arc<dyn ValueDecoder<V>>,
    empty: fn() -> T,
    add_range: fn(&T, &mut dyn Iterator<Item = (K, V)>) -> T,
    pool: Arc<ObjectPool<Vec<(K, V)>>>,
}

impl<T, K: Send + 'static, V: Send + 'static> MapBuilderDecoder<T, K, V> {
    pub(crate) fn new(
        key: Arc<dyn ValueDecoder<K>>,
        value: Arc<dyn ValueDecoder<V>>,
        empty: fn() -> T,
        add_range: fn(&T, &mut dyn Iterator<Item = (K, V)>) -> T,
    ) -> Self {
        Self {
            key,
            value,
            empty,
            add_range,
            pool: shared_pool(),
        }
    }
}

impl<T: 'static, K: Send + 'static, V: Send + 'static> ValueDecoder<T> for MapBuilderDecoder<T, K, V> {
    fn decode(&self, reader: &mut JsonReader<'_>) -> Result<T> {
        let mut pairs = self.pool.acquire();
        reader.read_entries(|reader| {
            pairs.push(read_pair(reader, &*self.key, &*self.value)?);
            Ok(())
        })?;
        let map = (self.add_range)(&(self.empty)(), &mut pairs.drain(..));
        Ok(map)
    }
}
