//! Pose type definition

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform (position and orientation) of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Build a pose from xyz and roll/pitch/yaw in radians
    pub fn from_xyz_rpy(xyz: [f32; 3], rpy: [f32; 3]) -> Self {
        Self {
            position: Vec3::from(xyz),
            orientation: Quat::from_euler(EulerRot::XYZ, rpy[0], rpy[1], rpy[2]),
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// Apply `child` in the frame of `self` (parent * child)
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            orientation: (self.orientation * child.orientation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let orientation = self.orientation.inverse();
        Pose {
            position: orientation * -self.position,
            orientation,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * point
    }

    /// Local +Z axis expressed in the parent frame
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_compose_then_inverse_is_identity() {
        let pose = Pose::from_xyz_rpy([1.0, -2.0, 0.5], [0.3, 0.1, -0.7]);
        let round = pose.compose(&pose.inverse());
        assert_abs_diff_eq!(round.position.length(), 0.0, epsilon = 1e-5);
        assert!(round.orientation.abs_diff_eq(Quat::IDENTITY, 1e-5));
    }

    #[test]
    fn test_compose_matches_matrix_product() {
        let parent = Pose::from_xyz_rpy([0.0, 1.0, 0.0], [0.0, std::f32::consts::FRAC_PI_2, 0.0]);
        let child = Pose::from_position(Vec3::new(0.0, 0.0, 2.0));
        let composed = parent.compose(&child).to_mat4();
        let expected = parent.to_mat4() * child.to_mat4();
        assert!(composed.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_forward_follows_orientation() {
        let pose = Pose::from_xyz_rpy([0.0; 3], [0.0, std::f32::consts::FRAC_PI_2, 0.0]);
        assert!(pose.forward().abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(Pose::IDENTITY.forward(), Vec3::Z);
    }
}
