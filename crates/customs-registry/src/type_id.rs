//! Numeric type id allocation for custom blocks and items.
//!
//! Ids travel as `i16` on the wire. Blocks draw from
//! `[first_block_id, first_item_id)` and items from
//! `[first_item_id, i16::MAX]`, so a block item (whose item id is its block
//! type id) can never collide with a plain item. Ids are never handed out
//! twice, even if the registration that requested one later fails.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::error::RegistryError;

pub const DEFAULT_FIRST_BLOCK_ID: i32 = 10_000;
pub const DEFAULT_FIRST_ITEM_ID: i32 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNamespace {
    Blocks,
    Items,
}

impl TypeNamespace {
    fn as_str(self) -> &'static str {
        match self {
            TypeNamespace::Blocks => "block",
            TypeNamespace::Items => "item",
        }
    }
}

impl fmt::Display for TypeNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct TypeIdAllocator {
    next_block: AtomicI32,
    next_item: AtomicI32,
    block_limit: i32,
    item_limit: i32,
}

impl TypeIdAllocator {
    pub fn new(first_block_id: i32, first_item_id: i32) -> Result<Self, RegistryError> {
        let item_limit = i16::MAX as i32 + 1;
        if first_block_id <= 0 || first_block_id >= first_item_id || first_item_id >= item_limit {
            return Err(RegistryError::InvalidIdRange {
                first_block: first_block_id,
                first_item: first_item_id,
            });
        }
        Ok(Self {
            next_block: AtomicI32::new(first_block_id),
            next_item: AtomicI32::new(first_item_id),
            block_limit: first_item_id,
            item_limit,
        })
    }

    /// Hand out the next id of a namespace.
    pub fn allocate(&self, namespace: TypeNamespace) -> Result<i16, RegistryError> {
        let (counter, limit) = match namespace {
            TypeNamespace::Blocks => (&self.next_block, self.block_limit),
            TypeNamespace::Items => (&self.next_item, self.item_limit),
        };
        let id = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |next| {
                (next < limit).then_some(next + 1)
            })
            .map_err(|_| RegistryError::IdSpaceExhausted {
                namespace: namespace.as_str(),
                limit,
            })?;
        // `id < limit <= i16::MAX + 1`, so this cannot truncate.
        Ok(id as i16)
    }

    /// The id the next allocation in `namespace` would return.
    pub fn peek(&self, namespace: TypeNamespace) -> i32 {
        match namespace {
            TypeNamespace::Blocks => self.next_block.load(Ordering::SeqCst),
            TypeNamespace::Items => self.next_item.load(Ordering::SeqCst),
        }
    }
}

impl Default for TypeIdAllocator {
    fn default() -> Self {
        Self {
            next_block: AtomicI32::new(DEFAULT_FIRST_BLOCK_ID),
            next_item: AtomicI32::new(DEFAULT_FIRST_ITEM_ID),
            block_limit: DEFAULT_FIRST_ITEM_ID,
            item_limit: i16::MAX as i32 + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_per_namespace() {
        let alloc = TypeIdAllocator::default();
        assert_eq!(alloc.allocate(TypeNamespace::Items).unwrap(), 20_000);
        assert_eq!(alloc.allocate(TypeNamespace::Items).unwrap(), 20_001);
        assert_eq!(alloc.allocate(TypeNamespace::Blocks).unwrap(), 10_000);
        assert_eq!(alloc.allocate(TypeNamespace::Items).unwrap(), 20_002);
        assert_eq!(alloc.peek(TypeNamespace::Blocks), 10_001);
    }

    #[test]
    fn block_range_ends_where_items_start() {
        let alloc = TypeIdAllocator::new(100, 102).unwrap();
        assert_eq!(alloc.allocate(TypeNamespace::Blocks).unwrap(), 100);
        assert_eq!(alloc.allocate(TypeNamespace::Blocks).unwrap(), 101);
        assert!(matches!(
            alloc.allocate(TypeNamespace::Blocks),
            Err(RegistryError::IdSpaceExhausted { namespace: "block", limit: 102 })
        ));
        // Exhaustion does not consume anything from the item range.
        assert_eq!(alloc.allocate(TypeNamespace::Items).unwrap(), 102);
    }

    #[test]
    fn item_range_stops_at_i16_max() {
        let alloc = TypeIdAllocator::new(1, i16::MAX as i32).unwrap();
        assert_eq!(alloc.allocate(TypeNamespace::Items).unwrap(), i16::MAX);
        assert!(alloc.allocate(TypeNamespace::Items).is_err());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        assert!(TypeIdAllocator::new(500, 500).is_err());
        assert!(TypeIdAllocator::new(0, 10).is_err());
        assert!(TypeIdAllocator::new(10, 40_000).is_err());
    }

    #[test]
    fn concurrent_allocations_are_unique() {
        let alloc = TypeIdAllocator::default();
        let mut ids: Vec<i16> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        (0..100)
                            .map(|_| alloc.allocate(TypeNamespace::Items).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
    }
}
