//! Game entities.
//!
//! The set is closed: players and collectibles.

mod collectible;
mod player;

pub use collectible::Collectible;
pub use player::{PLAYER_MODEL, Player, colours_from_id};
