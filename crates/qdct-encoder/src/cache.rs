//! Per-device recompression cache
//!
//! Holds the most recent compression produced for each device so that it can
//! be tightened later without keeping the original pixels around. Each device
//! has its own slot lock: mutations of one device are serialized while other
//! devices proceed in parallel. The number of slots is bounded and the least
//! recently used device is dropped first.

use qdct_core::CompressedImage;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One device's cache entry, locked for the duration of a mutation
pub type Slot = Arc<Mutex<Option<Arc<CompressedImage>>>>;

#[derive(Debug, Default)]
struct CacheState {
    slots: HashMap<String, Slot>,
    /// Least recently used first
    order: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, device_id: &str) {
        if let Some(pos) = self.order.iter().position(|id| id == device_id) {
            if let Some(id) = self.order.remove(pos) {
                self.order.push_back(id);
            }
        }
    }

    fn remove(&mut self, device_id: &str) -> Option<Slot> {
        let slot = self.slots.remove(device_id)?;
        self.order.retain(|id| id != device_id);
        Some(slot)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounded LRU map from device id to its latest compression
#[derive(Debug)]
pub struct DeviceCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl DeviceCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot for `device_id`, created (and possibly evicting another device) if absent
    pub fn slot(&self, device_id: &str) -> Slot {
        let mut state = lock(&self.state);
        if let Some(slot) = state.slots.get(device_id).cloned() {
            state.touch(device_id);
            return slot;
        }

        while state.slots.len() >= self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.slots.remove(&oldest);
            log::debug!("cache full, evicted device {}", oldest);
        }

        let slot = Slot::default();
        state.slots.insert(device_id.to_string(), slot.clone());
        state.order.push_back(device_id.to_string());
        slot
    }

    /// Slot for `device_id` only if one exists
    pub fn existing_slot(&self, device_id: &str) -> Option<Slot> {
        let mut state = lock(&self.state);
        let slot = state.slots.get(device_id).cloned()?;
        state.touch(device_id);
        Some(slot)
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<CompressedImage>> {
        let slot = self.existing_slot(device_id)?;
        let entry = lock(&slot);
        entry.clone()
    }

    /// Store `image` in its device's slot, returning the previous entry
    pub fn put(&self, image: CompressedImage) -> Option<Arc<CompressedImage>> {
        let slot = self.slot(&image.device_id);
        let mut entry = lock(&slot);
        entry.replace(Arc::new(image))
    }

    /// Drop `device_id` from the cache
    pub fn evict(&self, device_id: &str) -> Option<Arc<CompressedImage>> {
        let slot = lock(&self.state).remove(device_id)?;
        let mut entry = lock(&slot);
        entry.take()
    }

    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.slots.clear();
        state.order.clear();
    }

    /// Number of devices with a cached compression
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.state).slots.values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached device ids, least recently used first
    pub fn devices(&self) -> Vec<String> {
        lock(&self.state).order.iter().cloned().collect()
    }
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self::new(qdct_core::consts::DEFAULT_CACHE_CAPACITY)
    }
}

/// Lock a slot, recovering the entry if a previous holder panicked
pub fn lock_slot(slot: &Slot) -> MutexGuard<'_, Option<Arc<CompressedImage>>> {
    lock(slot)
}
