//! Pick-up spawned around the dome.

use glam::Quat;
use protocol::CollectibleData;

use crate::position::SphericalPosition;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Collectible {
    /// Pool slot this collectible occupies.
    pub slot: u32,
    pub position: SphericalPosition,
    pub model_index: u32,
    pub enabled: bool,
}

impl Collectible {
    pub fn empty(slot: u32) -> Self {
        Self {
            slot,
            ..Default::default()
        }
    }

    pub fn to_data(&self) -> CollectibleData {
        CollectibleData {
            slot: self.slot,
            model_index: self.model_index,
        }
    }

    /// Take replicated state from a sync record. The slot stays as is.
    pub fn apply_record(&mut self, data: &CollectibleData, position: Quat) {
        self.model_index = data.model_index;
        self.position = position.into();
    }
}
