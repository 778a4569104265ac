// SPDX-License-Identifier: CEPL-1.0
pub use glam::{Mat2, Mat4, Vec2, Vec3};

use std::f32::consts::TAU;

/// Planar transform of a scene object: scale, then rotate, then translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2d {
    pub translation: Vec2,
    pub scale: Vec2,
    /// Radians, counter-clockwise.
    pub rotation: f32,
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform2d {
    /// Linear part of the transform (`R * S`). Translation is carried separately.
    pub fn mat2(&self) -> Mat2 {
        let (s, c) = self.rotation.sin_cos();
        let rot = Mat2::from_cols(Vec2::new(c, s), Vec2::new(-s, c));
        let scale = Mat2::from_diagonal(self.scale);
        rot * scale
    }

    /// Applies the full transform to a point.
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.mat2() * p + self.translation
    }

    /// Adds `delta` to the rotation, keeping it in `[0, 2π)`.
    pub fn rotate_wrapped(&mut self, delta: f32) {
        let r = (self.rotation + delta).rem_euclid(TAU);
        // rem_euclid rounds up to TAU for tiny negative inputs
        self.rotation = if r >= TAU { 0.0 } else { r };
    }
}

/// Spatial transform: scale, then Tait-Bryan rotation, then translate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    pub translation: Vec3,
    pub scale: Vec3,
    /// Radians about x, y and z, applied in the order z, x, y.
    pub rotation: Vec3,
}

impl Default for Transform3d {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform3d {
    /// `T * Ry * Rx * Rz * S`.
    pub fn mat4(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_scale(self.scale)
    }

    pub fn apply(&self, p: Vec3) -> Vec3 {
        self.mat4().transform_point3(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_by_default() {
        let m = Transform2d::default().mat2();
        assert_eq!(m, Mat2::IDENTITY);
    }

    #[test]
    fn quarter_turn_maps_x_to_y() {
        let t = Transform2d {
            rotation: FRAC_PI_2,
            ..Default::default()
        };
        let p = t.apply(Vec2::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn scale_applies_before_rotation() {
        let t = Transform2d {
            translation: Vec2::new(0.5, -0.25),
            scale: Vec2::new(2.0, 0.5),
            rotation: FRAC_PI_2,
        };
        // (1, 0) -> scale (2, 0) -> rotate (0, 2) -> translate
        let p = t.apply(Vec2::X);
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.75, epsilon = 1e-6);
    }

    #[test]
    fn rotation_wraps_to_one_turn() {
        let mut t = Transform2d {
            rotation: TAU - 0.005,
            ..Default::default()
        };
        t.rotate_wrapped(0.01);
        assert_relative_eq!(t.rotation, 0.005, epsilon = 1e-4);
        assert!(t.rotation >= 0.0 && t.rotation < TAU);

        t.rotate_wrapped(-0.01);
        assert!(t.rotation >= 0.0 && t.rotation < TAU);
        assert_relative_eq!(t.rotation, TAU - 0.005, epsilon = 1e-4);
    }

    #[test]
    fn tiny_negative_step_from_zero_stays_below_one_turn() {
        let mut t = Transform2d::default();
        t.rotate_wrapped(-1e-9);
        assert!(t.rotation >= 0.0 && t.rotation < TAU, "{}", t.rotation);
    }

    #[test]
    fn transform3d_identity_by_default() {
        assert_eq!(Transform3d::default().mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_negative_z() {
        let t = Transform3d {
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let p = t.apply(Vec3::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn roll_applies_before_pitch() {
        let t = Transform3d {
            rotation: Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2),
            ..Default::default()
        };
        // x -> Rz -> y -> Rx -> z
        let p = t.apply(Vec3::X);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn scale_then_rotate_then_translate_in_3d() {
        let t = Transform3d {
            translation: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
            rotation: Vec3::new(0.0, 0.0, FRAC_PI_2),
        };
        // (1,0,0) -> (2,0,0) -> (0,2,0) -> (1,4,3)
        let p = t.apply(Vec3::X);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 4.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 3.0, epsilon = 1e-6);
    }
}
