//! Core types: math re-exports, Transform, Camera, scene world and the
//! per-frame animation logic. Renderer-agnostic.

use thiserror::Error;

pub use glam::{EulerRot, Mat4, Quat, Vec3, vec3};

pub mod animation;
pub mod camera;
pub mod clock;
pub mod ecs;
pub mod frame_loop;
pub mod orbit;
pub mod panel;
pub mod populate;
pub mod transform;
pub mod viewport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Scene already populated; refusing to spawn a second copy")]
    AlreadyPopulated,
    #[error("Generic error: {0}")]
    Generic(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform_is_identity_matrix() {
        let t = transform::Transform::identity();
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_uniform_scale_matrix() {
        let t = transform::Transform::from_trs(
            vec3(1.0, 2.0, 3.0),
            vec3(0.0, 0.0, 0.0),
            Vec3::splat(0.5),
        );
        // Last column = translation, diagonal = scale (no rotation).
        let m = t.matrix().to_cols_array();
        assert!((m[12] - 1.0).abs() < 1e-6);
        assert!((m[13] - 2.0).abs() < 1e-6);
        assert!((m[14] - 3.0).abs() < 1e-6);
        assert!((m[0] - 0.5).abs() < 1e-6);
        assert!((m[5] - 0.5).abs() < 1e-6);
        assert!((m[10] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn camera_pv_is_finite() {
        let cam = camera::Camera::new_perspective(
            vec3(4.0, 0.0, 2.8),
            Vec3::ZERO,
            Vec3::Y,
            75f32.to_radians(),
            0.1,
            100.0,
            16.0 / 9.0,
        );
        let pv = cam.proj_view();
        let a = pv.to_cols_array();
        assert!(a.iter().all(|f| f.is_finite()));
    }

    #[test]
    fn core_error_messages() {
        assert!(CoreError::AlreadyPopulated.to_string().contains("already populated"));
        assert_eq!(CoreError::Generic("x".into()).to_string(), "Generic error: x");
    }
}
