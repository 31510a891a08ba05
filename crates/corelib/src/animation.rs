//! Per-frame camera animation: Animating moves the camera along the rig,
//! Paused leaves it where it stopped. Both keep rendering.

use crate::camera::Camera;
use crate::orbit::CameraRig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    Animating,
    Paused,
}

/// What one frame tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// 1-based index of this frame.
    pub frame: u64,
    pub state: AnimationState,
    pub camera_moved: bool,
}

#[derive(Debug)]
pub struct AnimationController {
    state: AnimationState,
    rig: CameraRig,
    frames: u64,
}

impl AnimationController {
    /// Starts in the Animating state.
    pub fn new(rig: CameraRig) -> Self {
        Self {
            state: AnimationState::Animating,
            rig,
            frames: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.state == AnimationState::Animating
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self) {
        if self.state != AnimationState::Animating {
            log::info!("Camera animation started");
        }
        self.state = AnimationState::Animating;
    }

    /// Pause and re-aim the camera right away, without waiting for a frame.
    pub fn stop(&mut self, camera: &mut Camera) {
        if self.state != AnimationState::Paused {
            log::info!("Camera animation stopped");
        }
        self.state = AnimationState::Paused;
        camera.look_at(self.rig.target());
    }

    /// Advance one frame. `elapsed` is total clock time in seconds, which
    /// keeps running while paused.
    pub fn tick(&mut self, elapsed: f32, camera: &mut Camera) -> FrameTick {
        self.frames += 1;
        let camera_moved = match self.state {
            AnimationState::Animating => {
                camera.set_position(self.rig.position_at(elapsed));
                true
            }
            AnimationState::Paused => false,
        };
        camera.look_at(self.rig.target());

        FrameTick {
            frame: self.frames,
            state: self.state,
            camera_moved,
        }
    }
}
