//! Authoritative node.

use bytes::Bytes;
use protocol::{ControlMessage, Notification};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::{FrameHooks, report};
use crate::config::{Config, Role, StartPolicy};
use crate::game::Game;

pub struct MasterNode {
    game: Game,
    start_policy: StartPolicy,
    /// Control messages from the phone relay.
    inbox: mpsc::UnboundedReceiver<String>,
    /// Messages for the phone relay.
    outbox: mpsc::UnboundedSender<String>,
}

impl MasterNode {
    pub fn new(
        config: &Config,
        inbox: mpsc::UnboundedReceiver<String>,
        outbox: mpsc::UnboundedSender<String>,
    ) -> Self {
        let mut config = config.clone();
        config.node.role = Role::Master;
        Self {
            game: Game::new(&config),
            start_policy: config.session.start,
            inbox,
            outbox,
        }
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    fn dispatch(&mut self, text: &str) {
        let msg = match ControlMessage::parse(text) {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                trace!("Ignoring relay message {:?}", text);
                return;
            }
            Err(e) => {
                warn!("Malformed control message {:?}: {}", text, e);
                return;
            }
        };

        debug!("Control: {}", msg);
        match self.game.handle_control(&msg) {
            Ok(()) => {
                if matches!(msg, ControlMessage::NewPlayer { .. })
                    && self.start_policy == StartPolicy::FirstPlayer
                {
                    self.game.start();
                }
            }
            Err(e) => report("control message", &e),
        }
    }

    fn send(&self, notification: Notification) {
        // The relay task only goes away on shutdown.
        let _ = self.outbox.send(notification.to_string());
    }
}

impl FrameHooks for MasterNode {
    fn pre_sync(&mut self, now: f32) {
        if self.start_policy == StartPolicy::Immediately {
            self.game.start();
        }

        while let Ok(text) = self.inbox.try_recv() {
            self.dispatch(&text);
        }

        let summary = self.game.update(now);
        if summary.spawned > 0 || summary.hits > 0 {
            trace!("Tick: {:?}", summary);
        }

        let queued: Vec<Notification> = self.game.drain_notifications().collect();
        for notification in queued {
            self.send(notification);
        }
    }

    fn encode(&mut self) -> Option<Bytes> {
        Some(self.game.encode_frame().encode())
    }

    fn decode(&mut self, data: Bytes) {
        warn!(
            "Master received a {} byte sync frame, ignoring",
            data.len()
        );
    }

    fn post_sync(&mut self) {
        let reports: Vec<Notification> = self
            .game
            .drain_score_reports()
            .map(|d| Notification::Score {
                id: d.player_id,
                points: d.points,
            })
            .collect();
        for score in reports {
            self.send(score);
        }
    }

    fn game(&self) -> &Game {
        &self.game
    }
}
