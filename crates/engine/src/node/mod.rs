//! Frame hooks for the two node roles.
//!
//! The frame driver calls, once per frame and in this order:
//! [`FrameHooks::pre_sync`], [`FrameHooks::encode`], [`FrameHooks::decode`]
//! (once for each frame that arrived since the last tick, in arrival order)
//! and [`FrameHooks::post_sync`]. None of the hooks fail; errors are logged
//! and the offending operation dropped.

mod client;
mod master;

pub use client::ClientNode;
pub use master::MasterNode;

use bytes::Bytes;

use crate::game::Game;

pub trait FrameHooks {
    /// Drain input and run the simulation tick. `now` is seconds on the
    /// driver's clock.
    fn pre_sync(&mut self, _now: f32) {}

    /// Serialize this frame's state. Only the master produces frames.
    fn encode(&mut self) -> Option<Bytes> {
        None
    }

    /// Queue a received frame for the next `post_sync`.
    fn decode(&mut self, _data: Bytes) {}

    fn post_sync(&mut self) {}

    fn game(&self) -> &Game;
}

/// Log a rejected game operation at the level its kind deserves.
fn report(op: &str, err: &crate::error::GameError) {
    if err.is_desync() {
        tracing::error!("Desync during {}: {}", op, err);
    } else {
        tracing::warn!("Dropped {}: {}", op, err);
    }
}
