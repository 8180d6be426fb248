//! A generic per-kind free list for callback objects whose native
//! counterpart can't be destroyed, only reconfigured and re-armed. Modeled
//! generically here because the mechanism is backend-agnostic even though,
//! at present, only the Mentor/Siemens FLI backend needs it (FLI `process`
//! objects cannot be destroyed once created).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub struct CallbackPool<T> {
    free: Mutex<VecDeque<Arc<T>>>,
}

impl<T> CallbackPool<T> {
    pub fn new() -> Self {
        CallbackPool {
            free: Mutex::new(VecDeque::new()),
        }
    }

    /// Pop a spent entry off the free list, or build a new one.
    pub fn acquire_or_else(&self, make: impl FnOnce() -> Arc<T>) -> Arc<T> {
        let mut free = self.free.lock().expect("callback pool poisoned");
        free.pop_front().unwrap_or_else(make)
    }

    /// Return a spent entry to the tail of the free list.
    pub fn release(&self, item: Arc<T>) {
        self.free.lock().expect("callback pool poisoned").push_back(item);
    }

    pub fn len(&self) -> usize {
        self.free.lock().expect("callback pool poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for CallbackPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_released_entries_before_building_new_ones() {
        let pool: CallbackPool<u32> = CallbackPool::new();
        let mut built = 0;
        let a = pool.acquire_or_else(|| {
            built += 1;
            Arc::new(1)
        });
        pool.release(a.clone());
        let b = pool.acquire_or_else(|| {
            built += 1;
            Arc::new(2)
        });
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built, 1);
    }
}
