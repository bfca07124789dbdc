//! Best-effort object pools.
//!
//! An [`ObjectPool`] is a fixed array of slots, each holding at most one idle
//! instance. Claiming a slot uses `try_lock`, so a contended slot is skipped
//! rather than waited on, and an empty pool simply allocates.

use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Slot count used by [`ObjectPool::new`] and the shared pools.
pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Types that can be parked in an [`ObjectPool`].
pub trait Poolable: Default + Send + 'static {
    /// Clears the instance before it goes back into the pool.
    fn reset(&mut self);
}

impl<T: Send + 'static> Poolable for Vec<T> {
    fn reset(&mut self) {
        self.clear();
    }
}

impl Poolable for String {
    fn reset(&mut self) {
        self.clear();
    }
}

/// A fixed-capacity pool of reusable instances.
///
/// # Example
///
/// ```
/// use argo_util::ObjectPool;
///
/// let pool: ObjectPool<Vec<u32>> = ObjectPool::new();
/// {
///     let mut scratch = pool.acquire();
///     scratch.push(1);
/// }
/// assert_eq!(pool.available(), 1);
/// assert!(pool.acquire().is_empty());
/// ```
pub struct ObjectPool<T: Poolable> {
    slots: Box<[Mutex<Option<T>>]>,
}

impl<T: Poolable> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Poolable> ObjectPool<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of idle instances currently parked.
    pub fn available(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.try_lock().is_some_and(|item| item.is_some()))
            .count()
    }

    /// Takes an idle instance, or allocates one.
    pub fn take(&self) -> T {
        for slot in self.slots.iter() {
            if let Some(mut guard) = slot.try_lock() {
                if let Some(item) = guard.take() {
                    return item;
                }
            }
        }
        T::default()
    }

    /// Resets `item` and parks it in the first free slot.
    ///
    /// When every slot is occupied (or contended) the item is dropped.
    pub fn release(&self, mut item: T) {
        item.reset();
        for slot in self.slots.iter() {
            if let Some(mut guard) = slot.try_lock() {
                if guard.is_none() {
                    *guard = Some(item);
                    return;
                }
            }
        }
        tracing::trace!(
            capacity = self.slots.len(),
            item = std::any::type_name::<T>(),
            "pool full; dropping returned instance"
        );
    }

    /// Takes an instance wrapped in a guard that releases it on drop.
    pub fn acquire(&self) -> Pooled<'_, T> {
        Pooled {
            pool: self,
            item: Some(self.take()),
        }
    }
}

/// An instance checked out of an [`ObjectPool`].
///
/// Returned to its pool when dropped, including during unwinding and early
/// returns.
pub struct Pooled<'p, T: Poolable> {
    pool: &'p ObjectPool<T>,
    item: Option<T>,
}

impl<T: Poolable> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` empties the option.
        match &self.item {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T: Poolable> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("pooled item accessed after release"),
        }
    }
}

impl<T: Poolable> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}

static SHARED_POOLS: Lazy<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

/// Returns the process-wide pool for `T`, creating it on first use.
///
/// Pools are never evicted.
pub fn shared_pool<T: Poolable>() -> Arc<ObjectPool<T>> {
    let id = TypeId::of::<T>();
    if let Some(pool) = SHARED_POOLS.get(&id).and_then(|entry| downcast_pool::<T>(entry.value())) {
        return pool;
    }
    let created: Arc<dyn Any + Send + Sync> = Arc::new(ObjectPool::<T>::new());
    let entry = SHARED_POOLS.entry(id).or_insert(created);
    match downcast_pool::<T>(entry.value()) {
        Some(pool) => pool,
        None => unreachable!("shared pool registered under a foreign type id"),
    }
}

fn downcast_pool<T: Poolable>(pool: &Arc<dyn Any + Send + Sync>) -> Option<Arc<ObjectPool<T>>> {
    Arc::clone(pool).downcast::<ObjectPool<T>>().ok()
}
