//! Control panel actions. The UI layer only maps buttons to these.

use crate::animation::AnimationController;
use crate::camera::Camera;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelAction {
    StartAnimation,
    StopAnimation,
}

impl PanelAction {
    pub const ALL: [PanelAction; 2] = [PanelAction::StartAnimation, PanelAction::StopAnimation];

    /// Button label shown in the panel.
    pub fn label(self) -> &'static str {
        match self {
            PanelAction::StartAnimation => "startAnimation",
            PanelAction::StopAnimation => "stopAnimation",
        }
    }

    pub fn apply(self, controller: &mut AnimationController, camera: &mut Camera) {
        match self {
            PanelAction::StartAnimation => controller.start(),
            PanelAction::StopAnimation => controller.stop(camera),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;
    use crate::animation::AnimationState;
    use crate::orbit::CameraRig;

    #[test]
    fn labels_match_buttons() {
        let labels: Vec<_> = PanelAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["startAnimation", "stopAnimation"]);
    }

    #[test]
    fn actions_toggle_controller() {
        let mut ctl = AnimationController::new(CameraRig::default());
        let mut cam = Camera::scene_default(Vec3::ONE, 1.0);
        cam.look_at(Vec3::X);

        PanelAction::StopAnimation.apply(&mut ctl, &mut cam);
        assert_eq!(ctl.state(), AnimationState::Paused);
        assert_eq!(cam.target, Vec3::ZERO);

        PanelAction::StartAnimation.apply(&mut ctl, &mut cam);
        assert_eq!(ctl.state(), AnimationState::Animating);
    }

    #[test]
    fn stop_during_loading_survives_until_first_frame() {
        let mut ctl = AnimationController::new(CameraRig::default());
        let mut cam = Camera::scene_default(Vec3::new(2.0, -1.0, 3.0), 1.0);

        // clicked before any tick, while assets are still loading
        PanelAction::StopAnimation.apply(&mut ctl, &mut cam);

        let tick = ctl.tick(0.0, &mut cam);
        assert_eq!(tick.state, AnimationState::Paused);
        assert!(!tick.camera_moved);
        assert_eq!(cam.eye, Vec3::new(2.0, -1.0, 3.0));
    }
}
