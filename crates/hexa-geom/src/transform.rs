//! Object placement

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Affine placement of a geometric object: scale, then rotate, then translate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn local_to_global(&self, p: DVec3) -> DVec3 {
        self.rotation * (self.scale * p) + self.position
    }

    /// Inverse of [`Transform::local_to_global`]; zero scale components map to zero
    pub fn global_to_local(&self, p: DVec3) -> DVec3 {
        let q = self.rotation.inverse() * (p - self.position);
        let inv = DVec3::new(
            recip_or_zero(self.scale.x),
            recip_or_zero(self.scale.y),
            recip_or_zero(self.scale.z),
        );
        q * inv
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

fn recip_or_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { 1.0 / v }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::IDENTITY.local_to_global(p), p);
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_round_trip() {
        let t = Transform::from_position(DVec3::new(1.0, -2.0, 0.5))
            .with_rotation(DQuat::from_rotation_y(0.7))
            .with_scale(DVec3::new(2.0, 1.0, 0.5));
        let p = DVec3::new(0.3, 4.0, -1.0);
        let g = t.local_to_global(p);
        assert!(t.global_to_local(g).abs_diff_eq(p, 1e-12));
    }

    #[test]
    fn test_scale_applies_before_rotation() {
        let t = Transform::IDENTITY
            .with_rotation(DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2))
            .with_scale(DVec3::new(2.0, 1.0, 1.0));
        let g = t.local_to_global(DVec3::X);
        assert!(g.abs_diff_eq(DVec3::new(0.0, 2.0, 0.0), 1e-12));
    }
}
