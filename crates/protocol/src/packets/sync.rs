//! Per-frame sync buffer (master -> render clients).
//!
//! Layout:
//! - `is_game_ended: u8`, `are_stats_visible: u8`, `is_game_started: u8`
//! - `record_count: u32`
//! - records, each starting with a tag byte:
//!   - [`RecordTag::Player`]: id, orientation, turn speed, points, enabled,
//!     profile flag, optional profile (name, model), position
//!   - [`RecordTag::Collectible`]: slot, model index, position

use bytes::Bytes;
use glam::Quat;

use crate::{BinaryReader, BinaryWriter, ProtocolError};

/// Upper bound on records in one frame. Anything larger is treated as a
/// corrupt payload.
pub const MAX_SYNC_RECORDS: usize = 10_000;

/// Record tag bytes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    Player = 0x01,
    Collectible = 0x02,
}

/// Session flags carried at the head of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags {
    pub game_ended: bool,
    pub stats_visible: bool,
    pub game_started: bool,
}

/// One-time player fields, only sent until every node knows the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    /// Geometry the renderer uses for this player.
    pub model: String,
}

/// Player state. `profile` is `Some` in the full shape, `None` in the delta
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerData {
    pub id: u32,
    pub orientation: f32,
    pub turn_speed: f32,
    pub points: i32,
    pub enabled: bool,
    pub profile: Option<PlayerProfile>,
}

impl PlayerData {
    /// Whether this record carries everything needed to create the player.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.profile.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleData {
    /// Pool slot on the master.
    pub slot: u32,
    pub model_index: u32,
}

/// One wire entity for one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncRecord {
    Player { data: PlayerData, position: Quat },
    Collectible { data: CollectibleData, position: Quat },
}

impl SyncRecord {
    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self, SyncRecord::Player { .. })
    }

    #[inline]
    pub fn position(&self) -> Quat {
        match self {
            SyncRecord::Player { position, .. } | SyncRecord::Collectible { position, .. } => {
                *position
            }
        }
    }

    fn write(&self, w: &mut BinaryWriter) {
        match self {
            SyncRecord::Player { data, position } => {
                w.put_u8(RecordTag::Player as u8);
                w.put_u32(data.id);
                w.put_f32(data.orientation);
                w.put_f32(data.turn_speed);
                w.put_i32(data.points);
                w.put_bool(data.enabled);
                match &data.profile {
                    Some(profile) => {
                        w.put_bool(true);
                        w.put_string(&profile.name);
                        w.put_string(&profile.model);
                    }
                    None => w.put_bool(false),
                }
                w.put_quat(*position);
            }
            SyncRecord::Collectible { data, position } => {
                w.put_u8(RecordTag::Collectible as u8);
                w.put_u32(data.slot);
                w.put_u32(data.model_index);
                w.put_quat(*position);
            }
        }
    }

    fn read(r: &mut BinaryReader) -> Result<Self, ProtocolError> {
        let tag = r.get_u8()?;
        match tag {
            t if t == RecordTag::Player as u8 => {
                let id = r.get_u32()?;
                let orientation = r.get_f32()?;
                let turn_speed = r.get_f32()?;
                let points = r.get_i32()?;
                let enabled = r.get_bool()?;
                let profile = if r.get_bool()? {
                    Some(PlayerProfile {
                        name: r.get_string()?,
                        model: r.get_string()?,
                    })
                } else {
                    None
                };
                let position = r.get_quat()?;
                Ok(SyncRecord::Player {
                    data: PlayerData {
                        id,
                        orientation,
                        turn_speed,
                        points,
                        enabled,
                        profile,
                    },
                    position,
                })
            }
            t if t == RecordTag::Collectible as u8 => {
                let slot = r.get_u32()?;
                let model_index = r.get_u32()?;
                let position = r.get_quat()?;
                Ok(SyncRecord::Collectible {
                    data: CollectibleData { slot, model_index },
                    position,
                })
            }
            other => Err(ProtocolError::InvalidRecordTag(other)),
        }
    }
}

/// A complete frame: session flags followed by the ordered record sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncFrame {
    pub flags: FrameFlags,
    pub records: Vec<SyncRecord>,
}

impl SyncFrame {
    /// Serialize the frame.
    pub fn encode(&self) -> Bytes {
        // Players are ~40 bytes with a profile, collectibles 25.
        let mut w = BinaryWriter::with_capacity(7 + self.records.len() * 32);
        w.put_bool(self.flags.game_ended);
        w.put_bool(self.flags.stats_visible);
        w.put_bool(self.flags.game_started);
        w.put_u32(self.records.len() as u32);
        for record in &self.records {
            record.write(&mut w);
        }
        w.finish()
    }

    /// Parse a frame. Rejects record counts above [`MAX_SYNC_RECORDS`] before
    /// reading any record.
    pub fn decode(data: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        let mut r = BinaryReader::new(data);
        let flags = FrameFlags {
            game_ended: r.get_bool()?,
            stats_visible: r.get_bool()?,
            game_started: r.get_bool()?,
        };

        let count = r.get_u32()? as usize;
        if count > MAX_SYNC_RECORDS {
            return Err(ProtocolError::TooManyRecords {
                count,
                limit: MAX_SYNC_RECORDS,
            });
        }

        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(SyncRecord::read(&mut r)?);
        }
        Ok(Self { flags, records })
    }
}
