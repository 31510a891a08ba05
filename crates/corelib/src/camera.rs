use crate::{Mat4, Vec3};

/// Perspective camera (right-handed, depth in [0, 1]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub aspect: f32,
}

impl Camera {
    /// Vertical field of view of the scene camera, in degrees.
    pub const DEFAULT_FOV_DEG: f32 = 75.0;
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 100.0;

    #[allow(clippy::too_many_arguments)]
    pub fn new_perspective(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y_rad: f32,
        z_near: f32,
        z_far: f32,
        aspect: f32,
    ) -> Self {
        Self {
            eye,
            target,
            up,
            fov_y_rad,
            z_near,
            z_far,
            aspect,
        }
    }

    /// The scene camera: 75° fov, near 0.1, far 100, aimed at the origin.
    pub fn scene_default(eye: Vec3, aspect: f32) -> Self {
        Self::new_perspective(
            eye,
            Vec3::ZERO,
            Vec3::Y,
            Self::DEFAULT_FOV_DEG.to_radians(),
            Self::DEFAULT_NEAR,
            Self::DEFAULT_FAR,
            aspect,
        )
    }

    #[inline]
    pub fn set_position(&mut self, eye: Vec3) {
        self.eye = eye;
    }

    /// Re-aim without moving.
    #[inline]
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    #[inline]
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    #[inline]
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_rad,
            self.aspect.max(1e-6),
            self.z_near,
            self.z_far,
        )
    }

    #[cfg(test)]
    pub(crate) fn proj_view(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_default_aims_at_origin() {
        let cam = Camera::scene_default(Vec3::new(1.0, 2.0, 3.0), 1.5);
        assert_eq!(cam.target, Vec3::ZERO);
        assert!((cam.fov_y_rad - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(cam.z_near, 0.1);
        assert_eq!(cam.z_far, 100.0);
    }

    #[test]
    fn look_at_keeps_position() {
        let mut cam = Camera::scene_default(Vec3::new(1.0, 2.0, 3.0), 1.0);
        cam.look_at(Vec3::new(5.0, 0.0, 0.0));
        cam.look_at(Vec3::ZERO);
        assert_eq!(cam.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cam.target, Vec3::ZERO);
    }
}
