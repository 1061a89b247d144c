//! Shared protocol crate for the dome arcade.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - The per-frame sync buffer (flags + ordered sync records)
//! - The phone control text protocol

mod binary;
mod error;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::{ControlError, ProtocolError};
pub use packets::{
    CollectibleData, ColourSlot, ControlMessage, FrameFlags, MAX_SYNC_RECORDS, Notification,
    PlayerData, PlayerProfile, SessionEvent, SyncFrame, SyncRecord,
};
