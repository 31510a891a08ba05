/// Seconds between FPS refreshes.
const FPS_UPDATE_INTERVAL: f32 = 0.5;

/// Rolling frames-per-second estimate.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    timer: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame that took `delta` seconds.
    pub fn update(&mut self, delta: f32) {
        self.frames += 1;
        self.timer += delta;

        if self.timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frames as f32 / self.timer;
            log::trace!("FPS: {:.1}", self.fps);
            self.frames = 0;
            self.timer = 0.0;
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_interval() {
        let mut counter = FpsCounter::new();
        assert_eq!(counter.fps(), 0.0);
        for _ in 0..40 {
            counter.update(1.0 / 60.0);
        }
        assert!((counter.fps() - 60.0).abs() < 0.5, "fps {}", counter.fps());
    }
}
