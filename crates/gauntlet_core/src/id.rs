//! Generational entity handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle for anything living in a course: characters, obstacles,
/// projectiles.
///
/// The generation is bumped every time an index is recycled, so a handle
/// kept past its entity's destruction never resolves to a newcomer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    /// Lower 32 bits: index, Upper 32 bits: generation
    bits: u64,
}

impl EntityId {
    /// Create a new handle from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    /// Handle that never refers to a live entity
    #[inline]
    pub const fn null() -> Self {
        Self { bits: u64::MAX }
    }

    /// Check if this handle is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.bits == u64::MAX
    }

    /// Get the index portion
    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    /// Get the generation portion
    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Get the raw bits
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

/// Hands out [`EntityId`]s and recycles freed indices with a new generation
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    alive_count: usize,
}

impl EntityAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle
    pub fn allocate(&mut self) -> EntityId {
        self.alive_count += 1;

        if let Some(index) = self.free_list.pop() {
            EntityId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            EntityId::new(index, 0)
        }
    }

    /// Release a handle. Returns false if it was already dead.
    pub fn free(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let slot = &mut self.generations[id.index() as usize];
        *slot = slot.wrapping_add(1);
        self.free_list.push(id.index());
        self.alive_count -= 1;
        true
    }

    /// Check whether a handle still refers to a live entity
    #[inline]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.generations
            .get(id.index() as usize)
            .map_or(false, |&gen| gen == id.generation())
    }

    /// Number of live handles
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }
}
