//! Generational entity pool with lazily created per-key sub-pools.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    marker::PhantomData,
};

use rampart_core::{HostileId, PoolError, ProjectileId};

/// Handle type issued by an [`EntityPool`].
pub trait PoolHandle: Copy + Eq + Debug {
    /// Builds a handle from its slot index and generation.
    fn from_parts(index: u32, generation: u32) -> Self;

    /// Slot index.
    fn slot(&self) -> u32;

    /// Generation of the slot when the handle was issued.
    fn slot_generation(&self) -> u32;
}

impl PoolHandle for HostileId {
    fn from_parts(index: u32, generation: u32) -> Self {
        HostileId::new(index, generation)
    }

    fn slot(&self) -> u32 {
        self.index()
    }

    fn slot_generation(&self) -> u32 {
        self.generation()
    }
}

impl PoolHandle for ProjectileId {
    fn from_parts(index: u32, generation: u32) -> Self {
        ProjectileId::new(index, generation)
    }

    fn slot(&self) -> u32 {
        self.index()
    }

    fn slot_generation(&self) -> u32 {
        self.generation()
    }
}

/// Entity that can be recycled by an [`EntityPool`].
pub trait Poolable {
    /// Prototype key selecting the sub-pool.
    type Key: Copy + Ord + Debug;

    /// Builds a fresh instance of the prototype.
    fn create(key: Self::Key) -> Self;

    /// Resets transient state before the entity becomes active.
    fn on_spawn(&mut self);

    /// Stops the entity before it returns to the pool.
    fn on_despawn(&mut self);
}

#[derive(Debug)]
struct Slot<T: Poolable> {
    key: T::Key,
    generation: u32,
    active: bool,
    value: T,
}

/// Recycling allocator keyed by prototype.
///
/// Storage is never freed: releasing a handle deactivates its slot and bumps
/// the generation, so lookups through stale handles miss.
#[derive(Debug)]
pub struct EntityPool<H, T: Poolable> {
    slots: Vec<Slot<T>>,
    free: BTreeMap<T::Key, BTreeSet<u32>>,
    sizes: BTreeMap<T::Key, usize>,
    capacity: Option<usize>,
    handle: PhantomData<H>,
}

impl<H: PoolHandle, T: Poolable> EntityPool<H, T> {
    /// Creates an empty pool; `capacity` caps every sub-pool when present.
    #[must_use]
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free: BTreeMap::new(),
            sizes: BTreeMap::new(),
            capacity,
            handle: PhantomData,
        }
    }

    /// Activates an entity of the given prototype, reusing an inactive slot first.
    pub fn acquire(&mut self, key: T::Key) -> Result<H, PoolError> {
        let reused = self.free.get_mut(&key).and_then(BTreeSet::pop_first);
        let index = match reused {
            Some(index) => index,
            None => self.grow(key)?,
        };

        let Some(slot) = self.slots.get_mut(index as usize) else {
            return Err(PoolError::Exhausted {
                key: format!("{key:?}"),
                capacity: self.slots.len(),
            });
        };
        slot.value.on_spawn();
        slot.active = true;
        Ok(H::from_parts(index, slot.generation))
    }

    fn grow(&mut self, key: T::Key) -> Result<u32, PoolError> {
        let size = self.size_of(key);
        if let Some(capacity) = self.capacity {
            if size >= capacity {
                return Err(PoolError::Exhausted {
                    key: format!("{key:?}"),
                    capacity,
                });
            }
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| PoolError::Exhausted {
            key: format!("{key:?}"),
            capacity: self.slots.len(),
        })?;
        self.slots.push(Slot {
            key,
            generation: 0,
            active: false,
            value: T::create(key),
        });
        let _ = self.sizes.insert(key, size + 1);
        Ok(index)
    }

    /// Returns an entity to its sub-pool.
    ///
    /// Releasing an inactive, stale or unknown handle logs a warning and
    /// returns `false` without touching the pool.
    pub fn release(&mut self, handle: H) -> bool {
        let Some(slot) = self.slots.get_mut(handle.slot() as usize) else {
            tracing::warn!(?handle, "release of unknown pool handle ignored");
            return false;
        };
        if !slot.active || slot.generation != handle.slot_generation() {
            tracing::warn!(?handle, "release of inactive or stale pool handle ignored");
            return false;
        }

        slot.value.on_despawn();
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        let _ = self
            .free
            .entry(slot.key)
            .or_default()
            .insert(handle.slot());
        true
    }

    /// Looks up an active entity.
    #[must_use]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.slots
            .get(handle.slot() as usize)
            .filter(|slot| slot.active && slot.generation == handle.slot_generation())
            .map(|slot| &slot.value)
    }

    /// Looks up an active entity mutably.
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slots
            .get_mut(handle.slot() as usize)
            .filter(|slot| slot.active && slot.generation == handle.slot_generation())
            .map(|slot| &mut slot.value)
    }

    /// Iterates active entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok()?;
            slot.active
                .then(|| (H::from_parts(index, slot.generation), &slot.value))
        })
    }

    /// Handles of every active entity in slot order.
    #[must_use]
    pub fn handles(&self) -> Vec<H> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Number of slots ever created for the prototype.
    #[must_use]
    pub fn size_of(&self, key: T::Key) -> usize {
        self.sizes.get(&key).copied().unwrap_or(0)
    }

    /// Number of active entities across every prototype.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }
}
