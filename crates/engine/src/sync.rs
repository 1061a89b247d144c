//! Pool state to and from sync records.
//!
//! Record order is fixed: every player by id, then every enabled
//! collectible by slot. Players below the synced boundary are already known
//! to every node and go out in the delta shape; the rest carry their
//! profile so receivers can create them.

use protocol::{MAX_SYNC_RECORDS, SyncRecord};

use crate::entity::Player;
use crate::error::GameError;
use crate::pool::{CollectiblePool, PlayerPool};

/// Build the ordered record list for one frame.
pub fn snapshot(
    players: &PlayerPool,
    collectibles: &CollectiblePool,
    synced_players: usize,
) -> Vec<SyncRecord> {
    let mut records = Vec::with_capacity(players.len() + collectibles.num_enabled());
    for (index, player) in players.iter().enumerate() {
        records.push(SyncRecord::Player {
            data: player.to_data(index >= synced_players),
            position: player.position.quat(),
        });
    }
    for c in collectibles.enabled() {
        records.push(SyncRecord::Collectible {
            data: c.to_data(),
            position: c.position.quat(),
        });
    }
    records
}

/// What applying a snapshot changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub players_updated: usize,
    pub players_added: usize,
    pub collectibles: usize,
}

/// Overwrite local pools from a master snapshot.
///
/// Known players are updated in place, unknown ones appended from their
/// full record. The collectible active set becomes exactly the received
/// list. The whole snapshot is checked first, so an error leaves the pools
/// untouched.
pub fn apply_snapshot(
    players: &mut PlayerPool,
    collectibles: &mut CollectiblePool,
    records: &[SyncRecord],
) -> Result<ApplySummary, GameError> {
    if records.len() > MAX_SYNC_RECORDS {
        return Err(GameError::OversizedSnapshot {
            count: records.len(),
            limit: MAX_SYNC_RECORDS,
        });
    }

    let summary = check(players, collectibles, records)?;

    let mut slot = 0;
    for record in records {
        match record {
            SyncRecord::Player { data, position } => {
                if (data.id as usize) < players.len() {
                    players
                        .get_mut("sync", data.id)?
                        .apply_record(data, *position);
                } else {
                    players.append(Player::from_record(data, *position)?)?;
                }
            }
            SyncRecord::Collectible { data, position } => {
                if let Some(c) = collectibles.slot_mut(slot) {
                    c.apply_record(data, *position);
                }
                slot += 1;
            }
        }
    }
    collectibles.set_num_enabled(slot);

    Ok(summary)
}

fn check(
    players: &PlayerPool,
    collectibles: &CollectiblePool,
    records: &[SyncRecord],
) -> Result<ApplySummary, GameError> {
    let mut summary = ApplySummary::default();
    let mut known = players.len();
    for record in records {
        match record {
            SyncRecord::Player { data, .. } => {
                let id = data.id as usize;
                if id < known {
                    summary.players_updated += 1;
                    continue;
                }
                if id != known {
                    return Err(GameError::AppendMismatch {
                        id: data.id,
                        expected: known as u32,
                    });
                }
                if !data.is_full() {
                    return Err(GameError::MissingProfile { id: data.id });
                }
                if known >= players.capacity() {
                    return Err(GameError::PlayerPoolFull);
                }
                known += 1;
                summary.players_added += 1;
            }
            SyncRecord::Collectible { .. } => summary.collectibles += 1,
        }
    }
    if summary.collectibles > collectibles.capacity() {
        return Err(GameError::CollectiblePoolFull);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::SphericalPosition;
    use glam::Quat;

    fn master(players: u32, collectibles: u32) -> (PlayerPool, CollectiblePool) {
        let mut pp = PlayerPool::new(16);
        for i in 0..players {
            let pos = SphericalPosition::from_quat(Quat::from_rotation_x(0.1 * i as f32));
            pp.push_with(|id| Player::new(id, format!("n{id}"), pos))
                .unwrap();
        }
        let mut cp = CollectiblePool::new(16);
        for i in 0..collectibles {
            let pos = SphericalPosition::from_quat(Quat::from_rotation_y(0.2 * i as f32));
            cp.enable(pos, i % 3).unwrap();
        }
        (pp, cp)
    }

    #[test]
    fn layout_is_delta_then_full_then_collectibles() {
        let (pp, cp) = master(3, 2);
        let records = snapshot(&pp, &cp, 2);
        assert_eq!(records.len(), 5);
        let shapes: Vec<Option<bool>> = records
            .iter()
            .map(|r| match r {
                SyncRecord::Player { data, .. } => Some(data.is_full()),
                SyncRecord::Collectible { .. } => None,
            })
            .collect();
        assert_eq!(shapes, vec![Some(false), Some(false), Some(true), None, None]);
    }

    #[test]
    fn fresh_receiver_reproduces_master() {
        let (pp, cp) = master(4, 3);
        let records = snapshot(&pp, &cp, 0);

        let (mut rp, mut rc) = master(0, 0);
        let summary = apply_snapshot(&mut rp, &mut rc, &records).unwrap();
        assert_eq!(summary.players_added, 4);
        assert_eq!(summary.collectibles, 3);

        assert_eq!(rp.len(), pp.len());
        for (a, b) in rp.iter().zip(pp.iter()) {
            assert_eq!((a.id, &a.name, a.points), (b.id, &b.name, b.points));
            assert!(a.position.quat().abs_diff_eq(b.position.quat(), 1e-6));
        }
        assert_eq!(rc.num_enabled(), 3);
        for (a, b) in rc.enabled().iter().zip(cp.enabled()) {
            assert!(a.position.quat().abs_diff_eq(b.position.quat(), 1e-6));
            assert_eq!(a.model_index, b.model_index);
        }
    }

    #[test]
    fn five_records_against_two_known() {
        let (mut mp, cp) = master(5, 0);
        for p in mp.iter_mut() {
            p.points = p.id as i32 * 10;
        }
        let records = snapshot(&mp, &cp, 2);

        let (mut rp, mut rc) = master(2, 0);
        let summary = apply_snapshot(&mut rp, &mut rc, &records).unwrap();
        assert_eq!(
            summary,
            ApplySummary {
                players_updated: 2,
                players_added: 3,
                collectibles: 0
            }
        );
        assert_eq!(rp.len(), 5);
        assert_eq!(rp.get(1).unwrap().points, 10);
        assert_eq!(rp.get(4).unwrap().name, "n4");
    }

    #[test]
    fn collectible_count_defines_active_set() {
        let (pp, cp) = master(0, 1);
        let records = snapshot(&pp, &cp, 0);
        let (mut rp, mut rc) = master(0, 5);
        apply_snapshot(&mut rp, &mut rc, &records).unwrap();
        assert_eq!(rc.num_enabled(), 1);
        assert!(!rc.get(1).unwrap().enabled);
    }

    #[test]
    fn delta_for_unknown_player_is_rejected_untouched() {
        let (pp, cp) = master(3, 2);
        let records = snapshot(&pp, &cp, 3);
        let (mut rp, mut rc) = master(1, 4);
        let before = rp.as_slice().to_vec();

        assert_eq!(
            apply_snapshot(&mut rp, &mut rc, &records),
            Err(GameError::MissingProfile { id: 1 })
        );
        assert_eq!(rp.as_slice(), &before[..]);
        assert_eq!(rc.num_enabled(), 4);
    }

    #[test]
    fn id_gap_is_a_desync() {
        let (pp, cp) = master(3, 0);
        let records: Vec<SyncRecord> = snapshot(&pp, &cp, 0).into_iter().skip(1).collect();
        let (mut rp, mut rc) = master(0, 0);
        assert_eq!(
            apply_snapshot(&mut rp, &mut rc, &records),
            Err(GameError::AppendMismatch { id: 1, expected: 0 })
        );
    }

    #[test]
    fn oversized_snapshot_is_a_no_op() {
        let (pp, cp) = master(0, 1);
        let one = snapshot(&pp, &cp, 0).remove(0);
        let records = vec![one; MAX_SYNC_RECORDS + 1];
        let (mut rp, mut rc) = master(0, 0);
        assert!(matches!(
            apply_snapshot(&mut rp, &mut rc, &records),
            Err(GameError::OversizedSnapshot { .. })
        ));
        assert_eq!(rc.num_enabled(), 0);
    }
}
