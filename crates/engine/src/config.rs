//! Node configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub gameplay: GameplayConfig,
}

impl Config {
    /// Load configuration from `dome.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("dome.toml")
    }

    /// Load configuration from `path`, writing the defaults there when the
    /// file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.node.frame_rate == 0 || self.node.frame_rate > 1000 {
            return Err(format!(
                "node.frame_rate must be in 1..=1000, got {}",
                self.node.frame_rate
            ));
        }
        if !(self.session.max_time > 0.0) {
            return Err(format!(
                "session.max_time must be positive, got {}",
                self.session.max_time
            ));
        }
        if self.spawn.interval_secs < 2 {
            // The burst flag re-arms one second into the interval.
            return Err(format!(
                "spawn.interval_secs must be at least 2, got {}",
                self.spawn.interval_secs
            ));
        }
        if self.spawn.range.iter().any(|r| !(*r >= 0.0) || !r.is_finite()) {
            return Err(format!(
                "spawn.range must hold finite non-negative numbers, got {:?}",
                self.spawn.range
            ));
        }
        if self.spawn.models == 0 {
            return Err("spawn.models must be at least 1".to_string());
        }
        if !(self.gameplay.collision_distance > 0.0) {
            return Err(format!(
                "gameplay.collision_distance must be positive, got {}",
                self.gameplay.collision_distance
            ));
        }
        if self.gameplay.max_players == 0 || self.gameplay.max_collectibles == 0 {
            return Err("gameplay pool capacities must be non-zero".to_string());
        }
        if self.relay.max_message_size == 0 {
            return Err("relay.max_message_size must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Which half of the cluster this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Authoritative simulation, talks to the phone relay.
    #[default]
    Master,
    /// Render replica fed by the master.
    Client,
}

/// Cluster and frame driver settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub role: Role,
    /// Address the master serves sync frames on.
    #[serde(default = "default_sync_bind")]
    pub sync_bind: String,
    /// Master address a client connects to.
    #[serde(default = "default_master_addr")]
    pub master_addr: String,
    /// Frames per second of the frame driver.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            role: Role::default(),
            sync_bind: default_sync_bind(),
            master_addr: default_master_addr(),
            frame_rate: default_frame_rate(),
        }
    }
}

fn default_sync_bind() -> String {
    "0.0.0.0:7700".to_string()
}
fn default_master_addr() -> String {
    "127.0.0.1:7700".to_string()
}
fn default_frame_rate() -> u32 {
    60
}

/// Phone relay websocket.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_url")]
    pub url: String,
    /// Websocket sub-protocol requested on connect.
    #[serde(default = "default_relay_protocol")]
    pub protocol: String,
    /// Inbound messages longer than this are dropped.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            protocol: default_relay_protocol(),
            max_message_size: default_max_message_size(),
            reconnect_delay_ms: default_reconnect_delay(),
        }
    }
}

fn default_relay_url() -> String {
    "ws://localhost:81".to_string()
}
fn default_relay_protocol() -> String {
    "example-protocol".to_string()
}
fn default_max_message_size() -> usize {
    1024
}
fn default_reconnect_delay() -> u64 {
    2000
}

/// When the master starts the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// On the first frame.
    Immediately,
    /// When the first player joins.
    #[default]
    FirstPlayer,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session length in seconds.
    #[serde(default = "default_max_time")]
    pub max_time: f32,
    #[serde(default)]
    pub start: StartPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_time: default_max_time(),
            start: StartPolicy::default(),
        }
    }
}

fn default_max_time() -> f32 {
    60.0
}

/// Collectible spawning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpawnConfig {
    /// Seconds between spawn bursts.
    #[serde(default = "default_spawn_interval")]
    pub interval_secs: u32,
    /// Half-width of the uniform spawn volume per axis. Zero pins an axis
    /// to its offset.
    #[serde(default = "default_spawn_range")]
    pub range: [f32; 3],
    /// Centre of the spawn volume.
    #[serde(default = "default_spawn_offset")]
    pub offset: [f32; 3],
    /// Fixed RNG seed, random when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of collectible model variants.
    #[serde(default = "default_spawn_models")]
    pub models: u32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_spawn_interval(),
            range: default_spawn_range(),
            offset: default_spawn_offset(),
            seed: None,
            models: default_spawn_models(),
        }
    }
}

fn default_spawn_interval() -> u32 {
    4
}
fn default_spawn_range() -> [f32; 3] {
    [1.5, 1.5, 0.0]
}
fn default_spawn_offset() -> [f32; 3] {
    [1.5, 0.0, 0.0]
}
fn default_spawn_models() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameplayConfig {
    /// Angular half-width of the collision box, radians.
    #[serde(default = "default_collision_distance")]
    pub collision_distance: f32,
    /// Forward speed along the heading, radians per second.
    #[serde(default = "default_player_speed")]
    pub player_speed: f32,
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    #[serde(default = "default_max_collectibles")]
    pub max_collectibles: usize,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            collision_distance: default_collision_distance(),
            player_speed: default_player_speed(),
            max_players: default_max_players(),
            max_collectibles: default_max_collectibles(),
        }
    }
}

fn default_collision_distance() -> f32 {
    0.1
}
fn default_player_speed() -> f32 {
    0.5
}
fn default_max_players() -> usize {
    110
}
fn default_max_collectibles() -> usize {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gameplay.max_players, 110);
        assert_eq!(config.gameplay.max_collectibles, 300);
        assert_eq!(config.spawn.interval_secs, 4);
        assert_eq!(config.relay.url, "ws://localhost:81");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [node]
            role = "client"

            [session]
            max_time = 90.0
            start = "immediately"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.role, Role::Client);
        assert_eq!(config.node.frame_rate, 60);
        assert_eq!(config.session.max_time, 90.0);
        assert_eq!(config.session.start, StartPolicy::Immediately);
        assert_eq!(config.spawn.offset, [1.5, 0.0, 0.0]);
        assert_eq!(config.spawn.range, [1.5, 1.5, 0.0]);
    }

    #[test]
    fn defaults_survive_serialization() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.relay.protocol, "example-protocol");
        assert_eq!(parsed.spawn.seed, None);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.spawn.interval_secs = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.spawn.range = [1.5, 1.5, -0.5];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.max_time = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gameplay.max_collectibles = 0;
        assert!(config.validate().is_err());
    }
}
