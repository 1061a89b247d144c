//! Positions on the dome sphere.
//!
//! A position is a unit quaternion. Rotating the local +Z axis by it gives
//! the point on the unit sphere; the local X/Y axes give the tangent frame
//! a player's heading is measured in.

use glam::{EulerRot, Quat, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPosition(Quat);

impl Default for SphericalPosition {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SphericalPosition {
    pub const IDENTITY: Self = Self(Quat::IDENTITY);

    /// Wrap a quaternion, renormalizing it. A degenerate quaternion maps to
    /// the identity.
    pub fn from_quat(q: Quat) -> Self {
        let len = q.length();
        if len.is_finite() && len > f32::EPSILON {
            Self(q / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Build a position from rotation angles (radians) about X, Y and Z,
    /// applied X first. This is how spawn points are projected onto the
    /// sphere.
    pub fn from_angles(angles: Vec3) -> Self {
        Self::from_quat(Quat::from_euler(
            EulerRot::ZYX,
            angles.z,
            angles.y,
            angles.x,
        ))
    }

    #[inline]
    pub fn quat(self) -> Quat {
        self.0
    }

    /// Point on the unit sphere.
    #[inline]
    pub fn point(self) -> Vec3 {
        self.0 * Vec3::Z
    }

    /// `self` followed by the local rotation `rhs`.
    pub fn compose(self, rhs: Quat) -> Self {
        Self::from_quat(self.0 * rhs)
    }

    /// Rotation taking `self` to `other`, expressed in `self`'s frame.
    pub fn relative(self, other: Self) -> Quat {
        (self.0.inverse() * other.0).normalize()
    }

    /// Rotation angles about the local X and Y axes between `self` and
    /// `other`. The Z component of the relative rotation is discarded.
    pub fn angular_offsets(self, other: Self) -> Vec2 {
        let d = self.relative(other);
        let x_angle = f32::atan2(
            2.0 * (d.w * d.x + d.y * d.z),
            1.0 - 2.0 * (d.x * d.x + d.y * d.y),
        );
        let sin_y = (2.0 * (d.w * d.y - d.z * d.x)).clamp(-1.0, 1.0);
        Vec2::new(x_angle, sin_y.asin())
    }

    /// Move `distance` radians along the great circle headed `orientation`
    /// radians from the local +X axis.
    pub fn advance(self, orientation: f32, distance: f32) -> Self {
        if distance == 0.0 {
            return self;
        }
        let (sin, cos) = orientation.sin_cos();
        let axis = Vec3::new(-sin, cos, 0.0);
        self.compose(Quat::from_axis_angle(axis, distance))
    }
}

impl From<Quat> for SphericalPosition {
    fn from(q: Quat) -> Self {
        Self::from_quat(q)
    }
}
