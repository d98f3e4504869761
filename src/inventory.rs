//! Bounded deduplicated record stores
//!
//! Both the access-point and station tables are instances of the same
//! bounded, array-backed map keyed by MAC address. A repeat sighting
//! refreshes its slot in place; a first sighting lands at a circular write
//! index, so once the table is full the slot at that index is evicted.
//! That approximates oldest-by-insertion-order, not oldest-by-recency:
//! refreshed slots are never the eviction target until the index wraps
//! back around to them.

use crate::beacon::AccessPoint;
use crate::frame::MacAddr;
use crate::station::Station;

/// Records that identify themselves by a MAC address key.
pub trait Keyed {
    fn key(&self) -> MacAddr;
}

impl Keyed for AccessPoint {
    fn key(&self) -> MacAddr {
        self.bssid
    }
}

impl Keyed for Station {
    fn key(&self) -> MacAddr {
        self.station
    }
}

/// Bounded array-backed map with update-or-insert and circular eviction.
#[derive(Debug, Clone)]
pub struct Inventory<T> {
    slots: Vec<T>,
    write_index: usize,
    capacity: usize,
}

impl<T: Keyed> Inventory<T> {
    /// Create an empty inventory holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            write_index: 0,
            capacity,
        }
    }

    /// Insert or refresh a record; returns whether the key was already
    /// present.
    ///
    /// A known key overwrites its slot in place without moving it or
    /// advancing the write index. An unknown key writes at the circular
    /// index, evicting whatever occupied it once the table is full, and
    /// advances the index modulo capacity.
    pub fn store(&mut self, record: T) -> bool {
        let key = record.key();
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.key() == key) {
            *slot = record;
            return true;
        }

        if self.slots.len() < self.capacity {
            // Until saturation the write index trails one behind the
            // count, so appending and writing at the index coincide.
            self.slots.push(record);
        } else {
            self.slots[self.write_index] = record;
        }
        self.write_index = (self.write_index + 1) % self.capacity;
        false
    }

    /// Look up a record by key.
    pub fn get(&self, key: &MacAddr) -> Option<&T> {
        self.slots.iter().find(|slot| slot.key() == *key)
    }

    /// Occupied slots, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        key: MacAddr,
        value: u32,
    }

    impl Keyed for Entry {
        fn key(&self) -> MacAddr {
            self.key
        }
    }

    fn entry(tag: u8, value: u32) -> Entry {
        Entry {
            key: MacAddr([tag; 6]),
            value,
        }
    }

    #[test]
    fn test_store_is_idempotent_for_repeated_key() {
        let mut inv = Inventory::new(8);

        assert!(!inv.store(entry(1, 10)));
        assert!(inv.store(entry(1, 20)));
        assert!(inv.store(entry(1, 30)));

        assert_eq!(inv.len(), 1);
        assert_eq!(inv.get(&MacAddr([1; 6])).unwrap().value, 30);
    }

    #[test]
    fn test_update_does_not_move_slot_or_advance_index() {
        let mut inv = Inventory::new(3);
        inv.store(entry(1, 1));
        inv.store(entry(2, 2));
        inv.store(entry(3, 3)); // saturated, index back at slot 0

        // Refreshing slot 0 must not make it the next eviction survivor.
        inv.store(entry(1, 100));
        let order: Vec<u32> = inv.iter().map(|e| e.value).collect();
        assert_eq!(order, vec![100, 2, 3]);

        // Next unique key still evicts slot 0, the refreshed record.
        inv.store(entry(4, 4));
        let order: Vec<u32> = inv.iter().map(|e| e.value).collect();
        assert_eq!(order, vec![4, 2, 3]);
    }

    #[test]
    fn test_count_never_exceeds_capacity() {
        let mut inv = Inventory::new(4);
        for tag in 0..20u8 {
            inv.store(entry(tag, tag as u32));
            assert!(inv.len() <= 4);
        }
        assert_eq!(inv.len(), 4);
    }

    #[test]
    fn test_circular_eviction_order() {
        let mut inv = Inventory::new(3);
        inv.store(entry(1, 1));
        inv.store(entry(2, 2));
        inv.store(entry(3, 3));

        // Each further unique key evicts exactly the slot at the circular
        // index, wrapping around the table.
        inv.store(entry(4, 4));
        assert!(inv.get(&MacAddr([1; 6])).is_none());
        inv.store(entry(5, 5));
        assert!(inv.get(&MacAddr([2; 6])).is_none());
        inv.store(entry(6, 6));
        assert!(inv.get(&MacAddr([3; 6])).is_none());
        inv.store(entry(7, 7));
        assert!(inv.get(&MacAddr([4; 6])).is_none());

        assert_eq!(inv.len(), 3);
    }

    #[test]
    fn test_get_on_empty() {
        let inv: Inventory<Entry> = Inventory::new(2);
        assert!(inv.is_empty());
        assert!(inv.get(&MacAddr([9; 6])).is_none());
    }
}
