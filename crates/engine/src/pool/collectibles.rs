//! Fixed-capacity collectible arena.
//!
//! Slots `0..num_enabled` are exactly the active collectibles. Disabling a
//! slot swaps it with the last active one and shrinks the boundary.

use crate::entity::Collectible;
use crate::error::GameError;
use crate::position::SphericalPosition;

#[derive(Debug, Clone)]
pub struct CollectiblePool {
    slots: Vec<Collectible>,
    num_enabled: usize,
}

impl CollectiblePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity as u32).map(Collectible::empty).collect(),
            num_enabled: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn num_enabled(&self) -> usize {
        self.num_enabled
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_enabled == self.slots.len()
    }

    /// The active collectibles, in slot order.
    pub fn enabled(&self) -> &[Collectible] {
        &self.slots[..self.num_enabled]
    }

    pub fn get(&self, slot: usize) -> Option<&Collectible> {
        self.slots.get(slot)
    }

    /// Activate the first free slot.
    pub fn enable(
        &mut self,
        position: SphericalPosition,
        model_index: u32,
    ) -> Result<usize, GameError> {
        let slot = self.num_enabled;
        let c = self
            .slots
            .get_mut(slot)
            .ok_or(GameError::CollectiblePoolFull)?;
        c.position = position;
        c.model_index = model_index;
        c.enabled = true;
        self.num_enabled += 1;
        Ok(slot)
    }

    /// Deactivate `slot`, moving the last active collectible into it.
    /// Returns false if `slot` was not active.
    pub fn disable_and_swap(&mut self, slot: usize) -> bool {
        if slot >= self.num_enabled {
            return false;
        }
        let last = self.num_enabled - 1;
        self.slots[slot].enabled = false;
        self.slots.swap(slot, last);
        // Slot indices belong to the position, not the collectible.
        self.slots[slot].slot = slot as u32;
        self.slots[last].slot = last as u32;
        self.num_enabled = last;
        true
    }

    /// Declare the first `count` slots active and the rest inactive,
    /// clamped to capacity. Returns the count actually applied.
    pub fn set_num_enabled(&mut self, count: usize) -> usize {
        let count = count.min(self.slots.len());
        for (i, c) in self.slots.iter_mut().enumerate() {
            c.enabled = i < count;
        }
        self.num_enabled = count;
        count
    }

    /// Mutable access to any slot, active or not.
    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut Collectible> {
        self.slots.get_mut(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn assert_partitioned(pool: &CollectiblePool) {
        assert!(pool.num_enabled() <= pool.capacity());
        for i in 0..pool.capacity() {
            let c = pool.get(i).unwrap();
            assert_eq!(c.enabled, i < pool.num_enabled(), "slot {i}");
            assert_eq!(c.slot as usize, i);
        }
    }

    fn at(angle: f32) -> SphericalPosition {
        SphericalPosition::from_quat(Quat::from_rotation_x(angle))
    }

    #[test]
    fn enable_fills_in_order_until_full() {
        let mut pool = CollectiblePool::new(3);
        assert_eq!(pool.enable(at(0.1), 0), Ok(0));
        assert_eq!(pool.enable(at(0.2), 1), Ok(1));
        assert_eq!(pool.enable(at(0.3), 2), Ok(2));
        assert!(pool.is_full());
        assert_eq!(pool.enable(at(0.4), 0), Err(GameError::CollectiblePoolFull));
        assert_partitioned(&pool);
    }

    #[test]
    fn disable_swaps_last_active_into_slot() {
        let mut pool = CollectiblePool::new(4);
        for i in 0..3 {
            pool.enable(at(i as f32), i).unwrap();
        }
        assert!(pool.disable_and_swap(0));
        assert_eq!(pool.num_enabled(), 2);
        assert_eq!(pool.get(0).unwrap().model_index, 2);
        assert_eq!(pool.get(1).unwrap().model_index, 1);
        assert_partitioned(&pool);

        assert!(!pool.disable_and_swap(2));
        assert!(!pool.disable_and_swap(9));
        assert_eq!(pool.num_enabled(), 2);
    }

    #[test]
    fn partition_holds_over_mixed_operations() {
        let mut pool = CollectiblePool::new(6);
        let script: &[(bool, usize)] = &[
            (true, 0),
            (true, 0),
            (true, 0),
            (false, 1),
            (true, 0),
            (false, 0),
            (false, 5),
            (true, 0),
            (true, 0),
            (true, 0),
            (true, 0),
            (false, 2),
        ];
        for &(add, slot) in script {
            if add {
                let _ = pool.enable(at(0.0), 0);
            } else {
                pool.disable_and_swap(slot);
            }
            assert_partitioned(&pool);
        }
    }

    #[test]
    fn set_num_enabled_defines_active_set() {
        let mut pool = CollectiblePool::new(4);
        pool.set_num_enabled(3);
        assert_partitioned(&pool);
        pool.set_num_enabled(1);
        assert_eq!(pool.enabled().len(), 1);
        assert_partitioned(&pool);
        assert_eq!(pool.set_num_enabled(10), 4);
        assert_partitioned(&pool);
    }
}
