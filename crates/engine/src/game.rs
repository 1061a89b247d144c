//! Per-process simulation object.
//!
//! A master `Game` owns the authoritative pools and session and produces
//! sync frames; a client `Game` only overwrites its pools from them.

use glam::{Quat, Vec3};
use protocol::{
    ColourSlot, ControlMessage, FrameFlags, Notification, PlayerData, SessionEvent, SyncFrame,
};
use tracing::{debug, info, warn};

use crate::collision::{self, ScoreDelta};
use crate::config::{Config, GameplayConfig, Role};
use crate::entity::Player;
use crate::error::GameError;
use crate::leaderboard;
use crate::pool::{CollectiblePool, PlayerPool};
use crate::position::SphericalPosition;
use crate::session::{Advance, Session};
use crate::spawn::PositionGenerator;
use crate::sync::{self, ApplySummary};

/// What one call to [`Game::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub spawned: usize,
    pub hits: usize,
    /// The session ended during this call.
    pub ended: bool,
}

pub struct Game {
    role: Role,
    gameplay: GameplayConfig,
    players: PlayerPool,
    collectibles: CollectiblePool,
    spawner: PositionGenerator,
    session: Session,
    stats_visible: bool,
    /// Flags received from the master; only used on clients.
    mirrored: FrameFlags,
    /// Players every node is known to have.
    synced_players: usize,
    last_update: Option<f32>,
    score_reports: Vec<ScoreDelta>,
    outbox: Vec<Notification>,
}

impl Game {
    pub fn new(config: &Config) -> Self {
        Self {
            role: config.node.role,
            gameplay: config.gameplay.clone(),
            players: PlayerPool::new(config.gameplay.max_players),
            collectibles: CollectiblePool::new(config.gameplay.max_collectibles),
            spawner: PositionGenerator::new(&config.spawn),
            session: Session::new(config.session.max_time),
            stats_visible: false,
            mirrored: FrameFlags::default(),
            synced_players: 0,
            last_update: None,
            score_reports: Vec::new(),
            outbox: Vec::new(),
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    pub fn players(&self) -> &PlayerPool {
        &self.players
    }

    pub fn collectibles(&self) -> &CollectiblePool {
        &self.collectibles
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn stats_visible(&self) -> bool {
        self.flags().stats_visible
    }

    /// Session flags as they go on the wire.
    pub fn flags(&self) -> FrameFlags {
        match self.role {
            Role::Master => FrameFlags {
                game_ended: self.session.is_ended(),
                stats_visible: self.stats_visible,
                game_started: self.session.is_started(),
            },
            Role::Client => self.mirrored,
        }
    }

    // ---- Player creation ----

    /// Add a player at `position`, named after its id.
    pub fn add_debug_player(&mut self, position: SphericalPosition) -> Result<u32, GameError> {
        let id = self
            .players
            .push_with(|id| Player::debug(id, position))?;
        debug!("Debug player {} created", id);
        Ok(id)
    }

    /// Create a player this node has not seen from its full sync record.
    pub fn add_player_from_sync(
        &mut self,
        data: &PlayerData,
        position: Quat,
    ) -> Result<u32, GameError> {
        let id = self.players.append(Player::from_record(data, position)?)?;
        debug!("Player {} created from sync", id);
        Ok(id)
    }

    /// Create a phone player at a fresh spawn point. `id` must be the next
    /// id in the pool.
    pub fn add_player(&mut self, id: u32, name: &str) -> Result<u32, GameError> {
        let expected = self.players.next_id();
        if id != expected {
            return Err(GameError::AppendMismatch { id, expected });
        }
        let position = self.spawner.generate();
        let id = self
            .players
            .push_with(|id| Player::new(id, name, position))?;
        debug!("Player {} ({:?}) joined", id, name);
        Ok(id)
    }

    // ---- Player control ----

    pub fn enable_player(&mut self, id: u32) -> Result<(), GameError> {
        self.players.get_mut("enable", id)?.enabled = true;
        Ok(())
    }

    pub fn disable_player(&mut self, id: u32) -> Result<(), GameError> {
        self.players.get_mut("disable", id)?.enabled = false;
        Ok(())
    }

    pub fn set_turn_speed(&mut self, id: u32, rate: f32) -> Result<(), GameError> {
        self.players.get_mut("turn", id)?.turn_speed = rate;
        Ok(())
    }

    pub fn player_colours(&self, id: u32) -> Result<(Vec3, Vec3), GameError> {
        self.players
            .get(id)
            .map(Player::colours)
            .ok_or(GameError::PlayerOutOfRange {
                op: "colour",
                id,
                len: self.players.len(),
            })
    }

    /// Turn every player by the same angle, relative to where it faces now.
    pub fn rotate_all_players(&mut self, delta: f32) {
        for player in self.players.iter_mut() {
            player.orientation += delta;
        }
    }

    /// Apply one inbound control command.
    pub fn handle_control(&mut self, msg: &ControlMessage) -> Result<(), GameError> {
        match msg {
            ControlMessage::NewPlayer { id, name } => self.add_player(*id, name).map(|_| ()),
            ControlMessage::Turn { id, rate } => self.set_turn_speed(*id, *rate),
            ControlMessage::Disable { id } => self.disable_player(*id),
            ControlMessage::Enable { id } => self.enable_player(*id),
            ControlMessage::ColourRequest { id } => {
                let (primary, secondary) = self.player_colours(*id)?;
                self.outbox.push(Notification::Colour {
                    slot: ColourSlot::Primary,
                    colour: primary,
                    id: *id,
                });
                self.outbox.push(Notification::Colour {
                    slot: ColourSlot::Secondary,
                    colour: secondary,
                    id: *id,
                });
                Ok(())
            }
        }
    }

    // ---- Collectibles ----

    pub fn add_debug_collectible(
        &mut self,
        position: SphericalPosition,
        model_index: u32,
    ) -> Result<usize, GameError> {
        self.collectibles.enable(position, model_index)
    }

    fn spawn_burst(&mut self) -> usize {
        let mut spawned = 0;
        for _ in 0..self.players.len() {
            let position = self.spawner.generate();
            let model = self.spawner.model_index();
            if self.collectibles.enable(position, model).is_err() {
                warn!(
                    "Collectible pool full ({}), skipping rest of burst",
                    self.collectibles.capacity()
                );
                break;
            }
            spawned += 1;
        }
        if spawned > 0 {
            debug!(
                "Spawned {} collectibles ({} active)",
                spawned,
                self.collectibles.num_enabled()
            );
        }
        spawned
    }

    // ---- Session ----

    /// Start the session and announce it. No-op once started.
    pub fn start(&mut self) -> bool {
        if self.session.is_started() || !self.session.start() {
            return false;
        }
        self.last_update = None;
        info!("Session started ({}s)", self.session.max_time());
        self.outbox.push(Notification::Session(SessionEvent::Start));
        true
    }

    /// End the session early. Returns false if it had already ended.
    pub fn end(&mut self) -> bool {
        if !self.session.end() {
            return false;
        }
        self.on_ended();
        true
    }

    fn on_ended(&mut self) {
        self.stats_visible = true;
        self.outbox.push(Notification::Session(SessionEvent::End));
        info!(
            "Session ended after {:.1}s\n{}",
            self.session.total_time(),
            self.leaderboard()
        );
    }

    /// Advance the simulation to `now` seconds (any monotonic clock). The
    /// first call after starting only records the time.
    pub fn update(&mut self, now: f32) -> TickSummary {
        let mut summary = TickSummary::default();
        if !self.session.is_running() {
            return summary;
        }
        let Some(last) = self.last_update.replace(now) else {
            return summary;
        };
        let dt = (now - last).max(0.0);

        match self.session.advance(dt) {
            Advance::JustEnded => {
                self.on_ended();
                summary.ended = true;
                return summary;
            }
            Advance::Idle => return summary,
            Advance::Running => {}
        }

        if self.spawner.should_spawn(self.session.total_time()) {
            summary.spawned = self.spawn_burst();
        }

        let speed = self.gameplay.player_speed;
        for player in self.players.iter_mut().filter(|p| p.enabled) {
            player.update(dt, speed);
        }

        summary.hits = collision::detect_collisions(
            &mut self.players,
            &mut self.collectibles,
            self.gameplay.collision_distance,
            &mut self.score_reports,
        );

        if self.session.should_send_time() {
            self.outbox.push(Notification::Time {
                seconds: self.session.total_time() as u32,
            });
        }
        summary
    }

    /// Score changes since the last drain.
    pub fn drain_score_reports(&mut self) -> std::vec::Drain<'_, ScoreDelta> {
        self.score_reports.drain(..)
    }

    /// Outbound relay messages queued since the last drain, score reports
    /// excluded.
    pub fn drain_notifications(&mut self) -> std::vec::Drain<'_, Notification> {
        self.outbox.drain(..)
    }

    pub fn leaderboard(&self) -> String {
        leaderboard::render(self.players.as_slice())
    }

    // ---- Sync ----

    /// Authoritative frame for this tick. Every player present now counts
    /// as known to all nodes afterwards.
    pub fn encode_frame(&mut self) -> SyncFrame {
        let records = sync::snapshot(&self.players, &self.collectibles, self.synced_players);
        self.synced_players = self.players.len();
        SyncFrame {
            flags: self.flags(),
            records,
        }
    }

    /// Send full player records again on the next frame, e.g. after a new
    /// render node connected.
    pub fn resync(&mut self) {
        self.synced_players = 0;
    }

    /// Overwrite local state from a master frame. Never valid on the master.
    pub fn apply_frame(&mut self, frame: &SyncFrame) -> Result<ApplySummary, GameError> {
        if self.is_master() {
            return Err(GameError::AuthoritativeReplay);
        }
        let summary = sync::apply_snapshot(&mut self.players, &mut self.collectibles, &frame.records)?;
        self.mirrored = frame.flags;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(role: Role) -> Config {
        let mut config = Config::default();
        config.node.role = role;
        config.spawn.seed = Some(1);
        config
    }

    fn master() -> Game {
        Game::new(&config(Role::Master))
    }

    #[test]
    fn new_player_needs_next_id() {
        let mut game = master();
        assert_eq!(
            game.add_player(2, "x"),
            Err(GameError::AppendMismatch { id: 2, expected: 0 })
        );
        assert_eq!(game.add_player(0, "x"), Ok(0));
        assert_eq!(game.add_debug_player(SphericalPosition::IDENTITY), Ok(1));
        assert_eq!(game.players().get(1).unwrap().name, "Player 1");
    }

    #[test]
    fn creation_from_sync_record() {
        let mut game = Game::new(&config(Role::Client));
        let mut source = Player::new(0, "Remote", SphericalPosition::IDENTITY);
        source.points = 4;
        assert_eq!(
            game.add_player_from_sync(&source.to_data(true), Quat::IDENTITY),
            Ok(0)
        );
        assert_eq!(game.players().get(0).unwrap().points, 4);

        source.id = 5;
        assert_eq!(
            game.add_player_from_sync(&source.to_data(true), Quat::IDENTITY),
            Err(GameError::AppendMismatch { id: 5, expected: 1 })
        );
    }

    #[test]
    fn debug_helpers() {
        let mut game = master();
        game.add_debug_player(SphericalPosition::IDENTITY).unwrap();
        game.add_debug_player(SphericalPosition::IDENTITY).unwrap();
        game.players.get_mut("test", 1).unwrap().orientation = 0.25;
        game.rotate_all_players(1.5);
        game.rotate_all_players(0.5);
        let orientations: Vec<f32> = game.players().iter().map(|p| p.orientation).collect();
        assert_eq!(orientations, vec![2.0, 2.25]);

        assert_eq!(
            game.add_debug_collectible(SphericalPosition::IDENTITY, 2),
            Ok(0)
        );
        assert_eq!(game.collectibles().enabled()[0].model_index, 2);
    }

    #[test]
    fn control_on_unknown_id_is_out_of_range() {
        let mut game = master();
        let err = game
            .handle_control(&ControlMessage::Disable { id: 0 })
            .unwrap_err();
        assert!(err.is_desync());
        assert!(matches!(
            game.handle_control(&ControlMessage::ColourRequest { id: 4 }),
            Err(GameError::PlayerOutOfRange { op: "colour", .. })
        ));
    }

    #[test]
    fn colour_request_queues_primary_then_secondary() {
        let mut game = master();
        game.add_player(0, "a").unwrap();
        game.handle_control(&ControlMessage::ColourRequest { id: 0 })
            .unwrap();
        let out: Vec<String> = game.drain_notifications().map(|n| n.to_string()).collect();
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("A vec3("));
        assert!(out[1].starts_with("B vec3("));
        assert!(out[1].ends_with(" 0"));
    }

    #[test]
    fn first_update_only_records_time() {
        let mut game = master();
        game.start();
        game.update(100.0);
        assert_eq!(game.session().total_time(), 0.0);
        game.update(100.5);
        assert!((game.session().total_time() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn session_announcements_once() {
        let mut game = master();
        assert!(game.start());
        assert!(!game.start());
        game.update(0.0);
        game.update(30.0);
        let summary = game.update(61.0);
        assert!(summary.ended);
        assert!(game.flags().game_ended);
        assert!(game.stats_visible());
        assert_eq!(game.update(62.0), TickSummary::default());
        assert!(!game.end());

        let texts: Vec<String> = game.drain_notifications().map(|n| n.to_string()).collect();
        assert_eq!(texts.first().map(String::as_str), Some("U start"));
        assert_eq!(texts.iter().filter(|t| *t == "U end").count(), 1);
        assert!(texts.iter().any(|t| t == "T 30"));
    }

    #[test]
    fn spawn_burst_matches_player_count() {
        let mut game = master();
        for i in 0..3 {
            game.add_player(i, "p").unwrap();
        }
        game.start();
        game.update(0.0);
        let summary = game.update(0.016);
        assert_eq!(summary.spawned, 3);
        assert_eq!(game.collectibles().num_enabled() + summary.hits, 3);
    }

    #[test]
    fn only_clients_apply_frames() {
        let mut m = master();
        m.add_player(0, "a").unwrap();
        let frame = m.encode_frame();
        assert_eq!(m.apply_frame(&frame), Err(GameError::AuthoritativeReplay));

        let mut c = Game::new(&config(Role::Client));
        c.apply_frame(&frame).unwrap();
        assert_eq!(c.players().len(), 1);
    }

    #[test]
    fn boundary_advances_after_encode() {
        let mut game = master();
        game.add_player(0, "a").unwrap();
        let first = game.encode_frame();
        let second = game.encode_frame();
        let full = |f: &SyncFrame| match &f.records[0] {
            protocol::SyncRecord::Player { data, .. } => data.is_full(),
            _ => unreachable!(),
        };
        assert!(full(&first));
        assert!(!full(&second));
        game.resync();
        assert!(full(&game.encode_frame()));
    }
}
