//! Player/collectible pick-up detection.
//!
//! Two positions touch when the relative rotation between them stays within
//! `distance` radians about both the local X and Y axes. This is a box test
//! on the two decomposed angles, not a great-circle distance.

use crate::pool::{CollectiblePool, PlayerPool};
use crate::position::SphericalPosition;

/// Default angular half-width of the pick-up box.
pub const COLLISION_DISTANCE: f32 = 0.1;

/// A player's new total after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDelta {
    pub player_id: u32,
    pub points: i32,
}

#[inline]
pub fn is_touching(a: SphericalPosition, b: SphericalPosition, distance: f32) -> bool {
    let off = a.angular_offsets(b);
    off.x.abs() <= distance && off.y.abs() <= distance
}

/// Scan every enabled player against every enabled collectible. Each hit
/// awards a point, disables the collectible and records the new total.
///
/// A collected slot is refilled by the swap before the scan moves on, so
/// every collectible is tested and scores at most once per call.
pub fn detect_collisions(
    players: &mut PlayerPool,
    collectibles: &mut CollectiblePool,
    distance: f32,
    deltas: &mut Vec<ScoreDelta>,
) -> usize {
    let mut hits = 0;
    for player in players.iter_mut().filter(|p| p.enabled) {
        let mut j = 0;
        while j < collectibles.num_enabled() {
            let Some(c) = collectibles.get(j) else { break };
            if is_touching(player.position, c.position, distance) {
                let points = player.add_point();
                collectibles.disable_and_swap(j);
                deltas.push(ScoreDelta {
                    player_id: player.id,
                    points,
                });
                hits += 1;
            } else {
                j += 1;
            }
        }
    }
    hits
}
