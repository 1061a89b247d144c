//! Entity pools.

mod collectibles;
mod players;

pub use collectibles::CollectiblePool;
pub use players::PlayerPool;
