//! Phone-controlled diver.

use glam::{Quat, Vec3};
use protocol::{PlayerData, PlayerProfile};

use crate::error::GameError;
use crate::position::SphericalPosition;

/// Geometry every player is drawn with.
pub const PLAYER_MODEL: &str = "diver";

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Stable id, equal to the player's index in the pool.
    pub id: u32,
    pub name: String,
    pub model: String,
    pub position: SphericalPosition,
    /// Heading in the local tangent frame, radians from +X.
    pub orientation: f32,
    /// Radians per second the heading changes by.
    pub turn_speed: f32,
    pub points: i32,
    pub enabled: bool,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, position: SphericalPosition) -> Self {
        Self {
            id,
            name: name.into(),
            model: PLAYER_MODEL.to_string(),
            position,
            orientation: 0.0,
            turn_speed: 0.0,
            points: 0,
            enabled: true,
        }
    }

    /// Player created without a phone, named after its id.
    pub fn debug(id: u32, position: SphericalPosition) -> Self {
        Self::new(id, format!("Player {id}"), position)
    }

    /// Build a player from a full-shape sync record.
    pub fn from_record(data: &PlayerData, position: Quat) -> Result<Self, GameError> {
        let profile = data
            .profile
            .as_ref()
            .ok_or(GameError::MissingProfile { id: data.id })?;
        let mut player = Self::new(data.id, profile.name.clone(), position.into());
        player.model = profile.model.clone();
        player.apply_record(data, position);
        Ok(player)
    }

    /// Overwrite replicated state from a sync record of either shape.
    pub fn apply_record(&mut self, data: &PlayerData, position: Quat) {
        self.orientation = data.orientation;
        self.turn_speed = data.turn_speed;
        self.points = data.points;
        self.enabled = data.enabled;
        self.position = position.into();
        if let Some(profile) = &data.profile {
            self.name.clone_from(&profile.name);
            self.model.clone_from(&profile.model);
        }
    }

    /// Replicated state. `full` adds the one-time profile fields.
    pub fn to_data(&self, full: bool) -> PlayerData {
        PlayerData {
            id: self.id,
            orientation: self.orientation,
            turn_speed: self.turn_speed,
            points: self.points,
            enabled: self.enabled,
            profile: full.then(|| PlayerProfile {
                name: self.name.clone(),
                model: self.model.clone(),
            }),
        }
    }

    /// Turn, then move forward along the new heading.
    pub fn update(&mut self, dt: f32, speed: f32) {
        self.orientation += self.turn_speed * dt;
        self.position = self.position.advance(self.orientation, speed * dt);
    }

    /// Award one point and return the new total.
    pub fn add_point(&mut self) -> i32 {
        self.points = self.points.saturating_add(1);
        self.points
    }

    pub fn colours(&self) -> (Vec3, Vec3) {
        colours_from_id(self.id)
    }
}

/// Primary and complementary display colours for a player id, spread around
/// the hue wheel by the golden angle.
pub fn colours_from_id(id: u32) -> (Vec3, Vec3) {
    let hue = (id.wrapping_mul(137) % 360) as f32;
    (
        hsv_to_rgb(hue, 0.55, 0.95),
        hsv_to_rgb((hue + 180.0) % 360.0, 0.55, 0.95),
    )
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Vec3::new(r + m, g + m, b + m)
}
