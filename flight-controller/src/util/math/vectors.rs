use core::ops::Sub;

use libm::{asinf, atan2f};
use shared_definitions::config::PitchRollYaw;

/// Unit quaternion attitude as delivered by the estimator, `q0` is the
/// scalar part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub q0: f32,
    pub q1: f32,
    pub q2: f32,
    pub q3: f32,
}

impl Quaternion {
    pub const fn identity() -> Self {
        Self {
            q0: 1.0,
            q1: 0.0,
            q2: 0.0,
            q3: 0.0,
        }
    }

    /// Roll and pitch in radians (ZYX Euler convention).
    pub fn calculate_orientation_angles(&self) -> RotationVector2D {
        let roll = atan2f(
            2.0 * (self.q0 * self.q1 + self.q2 * self.q3),
            1.0 - 2.0 * (self.q1 * self.q1 + self.q2 * self.q2),
        );
        let sin_pitch = 2.0 * (self.q0 * self.q2 - self.q1 * self.q3);
        let pitch = asinf(sin_pitch.clamp(-1.0, 1.0));

        RotationVector2D { pitch, roll }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

/// Body-frame vector, x forward, y right, z down. Angular rates arrive in
/// this frame: x is the roll rate, y the pitch rate.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BodyVector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl BodyVector3D {
    pub fn as_rotation_rates(&self) -> RotationVector3D {
        RotationVector3D {
            pitch: self.y,
            roll: self.x,
            yaw: self.z,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RotationVector3D {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl Sub<RotationVector3D> for RotationVector3D {
    type Output = RotationVector3D;

    fn sub(self, rhs: RotationVector3D) -> Self::Output {
        Self {
            pitch: self.pitch - rhs.pitch,
            roll: self.roll - rhs.roll,
            yaw: self.yaw - rhs.yaw,
        }
    }
}

impl From<PitchRollYaw> for RotationVector3D {
    fn from(value: PitchRollYaw) -> Self {
        Self {
            pitch: value.pitch,
            roll: value.roll,
            yaw: value.yaw,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RotationVector2D {
    pub pitch: f32,
    pub roll: f32,
}
