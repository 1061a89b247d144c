//! Append-only player pool.

use crate::entity::Player;
use crate::error::GameError;

/// Players indexed by id. Ids are handed out by the pool, in order, and
/// never reused; players are disabled rather than removed.
#[derive(Debug, Clone)]
pub struct PlayerPool {
    players: Vec<Player>,
    capacity: usize,
    next_id: u32,
}

impl PlayerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            players: Vec::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Id the next appended player must carry.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Append a player built for the next id.
    pub fn push_with(&mut self, build: impl FnOnce(u32) -> Player) -> Result<u32, GameError> {
        if self.players.len() >= self.capacity {
            return Err(GameError::PlayerPoolFull);
        }
        let id = self.next_id;
        self.players.push(build(id));
        self.next_id += 1;
        Ok(id)
    }

    /// Append a player whose id was chosen elsewhere. The id must be the
    /// next one, anything else means this node has drifted.
    pub fn append(&mut self, player: Player) -> Result<u32, GameError> {
        if player.id != self.next_id {
            return Err(GameError::AppendMismatch {
                id: player.id,
                expected: self.next_id,
            });
        }
        self.push_with(|_| player)
    }

    pub fn get(&self, id: u32) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Mutable access for an id that must exist.
    pub fn get_mut(&mut self, op: &'static str, id: u32) -> Result<&mut Player, GameError> {
        let len = self.players.len();
        self.players
            .get_mut(id as usize)
            .ok_or(GameError::PlayerOutOfRange { op, id, len })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Player> {
        self.players.iter_mut()
    }

    pub fn as_slice(&self) -> &[Player] {
        &self.players
    }

    pub fn enabled_count(&self) -> usize {
        self.players.iter().filter(|p| p.enabled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SphericalPosition;

    #[test]
    fn ids_match_pool_size_before_insert() {
        let mut pool = PlayerPool::new(8);
        for expected in 0..5 {
            assert_eq!(pool.len() as u32, expected);
            let id = pool
                .push_with(|id| Player::debug(id, SphericalPosition::IDENTITY))
                .unwrap();
            assert_eq!(id, expected);
            assert_eq!(pool.get(id).unwrap().id, id);
        }
    }

    #[test]
    fn append_rejects_wrong_id() {
        let mut pool = PlayerPool::new(8);
        let err = pool
            .append(Player::debug(3, SphericalPosition::IDENTITY))
            .unwrap_err();
        assert_eq!(err, GameError::AppendMismatch { id: 3, expected: 0 });
        assert!(err.is_desync());
        assert!(pool.is_empty());

        assert_eq!(
            pool.append(Player::debug(0, SphericalPosition::IDENTITY)),
            Ok(0)
        );
    }

    #[test]
    fn full_pool_rejects_append() {
        let mut pool = PlayerPool::new(1);
        pool.push_with(|id| Player::debug(id, SphericalPosition::IDENTITY))
            .unwrap();
        assert_eq!(
            pool.push_with(|id| Player::debug(id, SphericalPosition::IDENTITY)),
            Err(GameError::PlayerPoolFull)
        );
        assert_eq!(pool.next_id(), 1);
    }

    #[test]
    fn out_of_range_is_distinct_from_absent() {
        let mut pool = PlayerPool::new(4);
        pool.push_with(|id| Player::debug(id, SphericalPosition::IDENTITY))
            .unwrap();
        assert!(pool.get(5).is_none());
        assert_eq!(
            pool.get_mut("disable", 5).unwrap_err(),
            GameError::PlayerOutOfRange {
                op: "disable",
                id: 5,
                len: 1
            }
        );
    }
}
