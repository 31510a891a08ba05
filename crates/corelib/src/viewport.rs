//! Viewport bookkeeping on window resize: camera aspect, output buffer size
//! and the clamped pixel ratio.

use crate::camera::Camera;

/// Highest device pixel ratio the renderer honours.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Size the renderer should draw at. The presentation surface always
/// matches the window (`surface_*`); the scene itself is drawn at
/// `width`x`height` and scaled up when the pixel ratio was clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTarget {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
    pub surface_width: u32,
    pub surface_height: u32,
}

impl RenderTarget {
    /// Whether the scene is drawn smaller than the window.
    pub fn is_downscaled(&self) -> bool {
        self.width != self.surface_width || self.height != self.surface_height
    }
}

#[derive(Debug, Default)]
pub struct ViewportManager {
    last: Option<RenderTarget>,
}

impl ViewportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last target computed by `on_resize`.
    pub fn current(&self) -> Option<RenderTarget> {
        self.last
    }

    /// `physical` is the window's inner size in device pixels.
    /// Updates the camera aspect and returns the new render target.
    pub fn on_resize(
        &mut self,
        physical: (u32, u32),
        scale_factor: f64,
        camera: &mut Camera,
    ) -> RenderTarget {
        let scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        let width = physical.0.max(1);
        let height = physical.1.max(1);
        let logical_w = f64::from(width) / scale_factor;
        let logical_h = f64::from(height) / scale_factor;

        camera.set_aspect(width as f32 / height as f32);

        let pixel_ratio = scale_factor.min(MAX_PIXEL_RATIO);
        let target = RenderTarget {
            width: ((logical_w * pixel_ratio).round() as u32).max(1),
            height: ((logical_h * pixel_ratio).round() as u32).max(1),
            pixel_ratio: pixel_ratio as f32,
            surface_width: width,
            surface_height: height,
        };
        log::debug!(
            "Viewport {}x{} (scale {:.2}) -> render {}x{} @{:.2}",
            width,
            height,
            scale_factor,
            target.width,
            target.height,
            target.pixel_ratio
        );
        self.last = Some(target);
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    fn camera() -> Camera {
        Camera::scene_default(Vec3::ONE, 1.0)
    }

    #[test]
    fn aspect_follows_window() {
        let mut vm = ViewportManager::new();
        let mut cam = camera();
        let rt = vm.on_resize((1920, 1080), 1.0, &mut cam);
        assert!((cam.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!((rt.width, rt.height), (1920, 1080));
        assert_eq!(rt.pixel_ratio, 1.0);
        assert!(!rt.is_downscaled());
        assert_eq!(vm.current(), Some(rt));
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        let mut vm = ViewportManager::new();
        let mut cam = camera();
        // 800x600 logical at 3x density
        let rt = vm.on_resize((2400, 1800), 3.0, &mut cam);
        assert_eq!(rt.pixel_ratio, 2.0);
        assert_eq!((rt.width, rt.height), (1600, 1200));
        assert!((cam.aspect - 4.0 / 3.0).abs() < 1e-6);
        // the window surface keeps its full physical extent
        assert_eq!((rt.surface_width, rt.surface_height), (2400, 1800));
        assert!(rt.is_downscaled());

        let rt = vm.on_resize((1600, 1200), 2.0, &mut cam);
        assert_eq!(rt.pixel_ratio, 2.0);
        assert_eq!((rt.width, rt.height), (1600, 1200));
        assert!(!rt.is_downscaled());

        let rt = vm.on_resize((1200, 900), 1.5, &mut cam);
        assert_eq!(rt.pixel_ratio, 1.5);
        assert_eq!((rt.width, rt.height), (1200, 900));
    }

    #[test]
    fn zero_sized_window_is_clamped() {
        let mut vm = ViewportManager::new();
        let mut cam = camera();
        let rt = vm.on_resize((0, 0), 1.0, &mut cam);
        assert_eq!((rt.width, rt.height), (1, 1));
        assert_eq!((rt.surface_width, rt.surface_height), (1, 1));
        assert!(cam.aspect.is_finite());
    }
}
