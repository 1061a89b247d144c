//! Render replica.

use std::collections::VecDeque;

use bytes::Bytes;
use protocol::SyncFrame;
use tracing::{debug, warn};

use super::{FrameHooks, report};
use crate::config::{Config, Role};
use crate::game::Game;

pub struct ClientNode {
    game: Game,
    staging: VecDeque<SyncFrame>,
}

impl ClientNode {
    pub fn new(config: &Config) -> Self {
        let mut config = config.clone();
        config.node.role = Role::Client;
        Self {
            game: Game::new(&config),
            staging: VecDeque::new(),
        }
    }
}

impl FrameHooks for ClientNode {
    fn decode(&mut self, data: Bytes) {
        match SyncFrame::decode(data) {
            Ok(frame) => self.staging.push_back(frame),
            Err(e) => warn!("Dropping sync frame: {}", e),
        }
    }

    /// Apply staged frames oldest first, so full player records carried by
    /// an earlier frame land before the deltas that follow them.
    fn post_sync(&mut self) {
        while let Some(frame) = self.staging.pop_front() {
            match self.game.apply_frame(&frame) {
                Ok(summary) if summary.players_added > 0 => {
                    debug!("Sync added {} players", summary.players_added);
                }
                Ok(_) => {}
                Err(e) => report("sync frame", &e),
            }
        }
    }

    fn game(&self) -> &Game {
        &self.game
    }
}
