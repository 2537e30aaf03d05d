//! Fixed-capacity recycler for per-track motion state.
//!
//! The pool owns every instance. Callers hold a [`Handle`], an index tagged
//! with the generation of the slot at the time it was handed out. Releasing a
//! slot bumps its generation, so a stale or doubly released handle is rejected
//! instead of corrupting the free list.

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Restores a pooled instance to its initial state before reuse.
pub trait Reset {
    fn reset(&mut self);
}

/// What [`Pool::acquire`] does when every slot is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolPolicy {
    /// Allocate a new slot. The per-frame loop never stalls.
    #[default]
    Grow,
    /// Refuse with [`PoolError::Exhausted`].
    Bounded,
}

/// Exclusive-use reference to a pooled instance, valid until released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    in_use: bool,
}

#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    policy: PoolPolicy,
}

impl<T: Reset + Default> Pool<T> {
    /// Create a pool with `capacity` preallocated instances.
    pub fn new(capacity: usize, policy: PoolPolicy) -> Self {
        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                value: T::default(),
                generation: 0,
                in_use: false,
            })
            .collect();
        // Reversed so the lowest index is handed out first.
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            policy,
        }
    }

    /// Take an instance out of the pool, reset to its initial state.
    pub fn acquire(&mut self) -> Result<Handle, PoolError> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => match self.policy {
                PoolPolicy::Grow => {
                    let index = self.slots.len() as u32;
                    self.slots.push(Slot {
                        value: T::default(),
                        generation: 0,
                        in_use: false,
                    });
                    log::debug!("pool grown to {} slots", self.slots.len());
                    index
                }
                PoolPolicy::Bounded => {
                    return Err(PoolError::Exhausted {
                        capacity: self.slots.len(),
                    });
                }
            },
        };

        let slot = &mut self.slots[index as usize];
        slot.value.reset();
        slot.in_use = true;
        Ok(Handle {
            index,
            generation: slot.generation,
        })
    }
}

impl<T> Pool<T> {
    /// Return an instance to the free list.
    pub fn release(&mut self, handle: Handle) -> Result<(), PoolError> {
        let slot = self
            .slot_mut(&handle)
            .ok_or(PoolError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            })?;
        slot.in_use = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Ok(())
    }

    pub fn get(&self, handle: &Handle) -> Option<&T> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, handle: &Handle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.value)
    }

    /// Total number of slots, in use or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of instances currently handed out.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn policy(&self) -> PoolPolicy {
        self.policy
    }

    fn slot_mut(&mut self, handle: &Handle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.in_use && slot.generation == handle.generation)
    }
}
