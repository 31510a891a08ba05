//! Camera rig: a closed, tilted orbit around a fixed centre.
//!
//! `x` and `y` follow `cos`/`sin` of the same angle while `z` is shifted by
//! a quarter of π, which skews the circle into a Lissajous-like loop.

use std::f32::consts::{FRAC_PI_4, TAU};

use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    pub center: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub angular_rate: f32,
}

impl CameraRig {
    pub const DEFAULT_RADIUS: f32 = 4.0;
    pub const DEFAULT_ANGULAR_RATE: f32 = 0.4;

    pub fn new(center: Vec3, radius: f32, angular_rate: f32) -> Self {
        Self {
            center,
            radius,
            angular_rate,
        }
    }

    /// Camera position after `t` seconds of elapsed time.
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec3 {
        let angle = t * self.angular_rate;
        Vec3::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
            self.center.z + self.radius * (angle + FRAC_PI_4).sin(),
        )
    }

    /// Look-at target; always the orbit centre.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.center
    }

    /// Seconds for one full loop.
    #[inline]
    pub fn period(&self) -> f32 {
        TAU / self.angular_rate
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Self::DEFAULT_RADIUS, Self::DEFAULT_ANGULAR_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3, eps: f32) -> bool {
        (a - b).abs().max_element() < eps
    }

    #[test]
    fn repeated_calls_are_identical() {
        let rig = CameraRig::default();
        for t in [0.0, 0.25, 3.7, 42.0] {
            assert_eq!(rig.position_at(t), rig.position_at(t));
        }
    }

    #[test]
    fn start_of_orbit() {
        let rig = CameraRig::default();
        let p = rig.position_at(0.0);
        assert!((p.x - 4.0).abs() < 1e-6);
        assert!(p.y.abs() < 1e-6);
        assert!((p.z - 4.0 * FRAC_PI_4.sin()).abs() < 1e-6);
        assert!((p.z - 2.828_427).abs() < 1e-4);
    }

    #[test]
    fn orbit_is_periodic() {
        let rig = CameraRig::default();
        assert!((rig.period() - 15.707_963).abs() < 1e-4);
        for t in [0.0, 1.3, 5.0, 9.9] {
            assert!(close(rig.position_at(t), rig.position_at(t + rig.period()), 1e-4));
        }
    }

    #[test]
    fn offset_centre_shifts_orbit() {
        let c = Vec3::new(1.0, -2.0, 3.0);
        let rig = CameraRig::new(c, 4.0, 0.4);
        let base = CameraRig::default();
        for t in [0.0, 2.0, 7.5] {
            assert!(close(rig.position_at(t), base.position_at(t) + c, 1e-5));
        }
        assert_eq!(rig.target(), c);
    }
}
