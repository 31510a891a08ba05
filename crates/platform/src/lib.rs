//! Platform layer: window, event loop and per-frame orchestration.
//!
//! Assets load on a worker thread while the window opens. The animation
//! controller exists from startup so panel actions always take effect; its
//! clock and per-frame tick begin once the scene is populated.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use asset::loader::{AssetRequest, PendingAssets, load_async};
use corelib::animation::AnimationController;
use corelib::camera::Camera;
use corelib::clock::Clock;
use corelib::frame_loop::{FrameLoop, StopHandle};
use corelib::orbit::CameraRig;
use corelib::populate::{ScenePopulator, random_position};
use corelib::viewport::ViewportManager;
use rand::SeedableRng;
use rand::rngs::StdRng;
use renderer::{GpuState, Overlay};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

pub mod fps;
pub mod scene;
pub mod ui;

use fps::FpsCounter;
use scene::build_scene;
use ui::{LoadStatus, PanelView, UiOverlay};

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub width: u32,
    pub height: u32,
    pub show_fps: bool,
    pub show_ui: bool,
    pub font_path: PathBuf,
    pub matcap_path: PathBuf,
    /// Fixed seed for reproducible placement; entropy when `None`.
    pub seed: Option<u64>,
}

struct App {
    config: RunConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    ui: Option<UiOverlay>,

    camera: Camera,
    viewport: ViewportManager,
    rng: StdRng,

    pending: Option<PendingAssets>,
    populator: ScenePopulator,
    load_status: LoadStatus,
    controller: AnimationController,
    /// Started on population.
    clock: Option<Clock>,

    frame_loop: FrameLoop,
    stop: StopHandle,
    fps: FpsCounter,
    last_frame: Instant,
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let aspect = config.width.max(1) as f32 / config.height.max(1) as f32;
        let camera = Camera::scene_default(random_position(&mut rng), aspect);

        let pending = load_async(AssetRequest::new(&config.font_path, &config.matcap_path));
        let frame_loop = FrameLoop::new();
        let stop = frame_loop.stop_handle();

        Self {
            config,
            window: None,
            gpu: None,
            ui: None,
            camera,
            viewport: ViewportManager::new(),
            rng,
            pending: Some(pending),
            populator: ScenePopulator::new(),
            load_status: LoadStatus::Loading,
            controller: AnimationController::new(CameraRig::default()),
            clock: None,
            frame_loop,
            stop,
            fps: FpsCounter::new(),
            last_frame: Instant::now(),
            fatal: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Orbitext")
                    .with_inner_size(PhysicalSize::new(self.config.width, self.config.height)),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);
        let target = self.viewport.on_resize(
            (size.width, size.height),
            window.scale_factor(),
            &mut self.camera,
        );

        let gpu = pollster::block_on(GpuState::new(window.clone(), self.config.backends, target))?;
        if self.config.show_ui {
            self.ui = Some(UiOverlay::new(window.clone(), gpu.device(), gpu.surface_format()));
        }
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn handle_resize(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let size = window.inner_size();
        let target = self.viewport.on_resize(
            (size.width, size.height),
            window.scale_factor(),
            &mut self.camera,
        );
        log::info!(
            "Resized: {}x{} -> render {}x{} @{:.2}",
            size.width,
            size.height,
            target.width,
            target.height,
            target.pixel_ratio
        );
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(target);
        }
    }

    /// Hand a finished asset load to the populator, once.
    fn poll_assets(&mut self) {
        let Some(result) = self.pending.as_mut().and_then(|p| p.poll()) else {
            return;
        };
        self.pending = None;

        match build_scene(result, &mut self.populator, &mut self.rng) {
            Ok(scene) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.set_scene(&scene.meshes.by_kind(), &scene.world, &scene.matcap);
                }
                self.load_status = LoadStatus::Ready {
                    shapes: scene.report.shapes,
                };
                self.clock = Some(Clock::start());
                log::info!("Animation loop started ({:?})", self.controller.state());
            }
            Err(e) => {
                log::error!("{e:#}");
                self.load_status = LoadStatus::Failed(format!("{e:#}"));
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        // Assets are only applied once the GPU can receive them.
        if self.gpu.is_some() {
            self.poll_assets();
        }

        let now = Instant::now();
        self.fps.update(now.duration_since(self.last_frame).as_secs_f32());
        self.last_frame = now;

        if let Some(ui) = &mut self.ui {
            let view = PanelView {
                animation: self.controller.state(),
                load: &self.load_status,
                fps: self.config.show_fps.then(|| self.fps.fps()),
            };
            for action in ui.run(&view) {
                action.apply(&mut self.controller, &mut self.camera);
            }
        }

        if let Some(clock) = &self.clock {
            let tick = self.controller.tick(clock.elapsed(), &mut self.camera);
            log::trace!("{:?} eye={}", tick, self.camera.eye);
        }

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let overlay = self.ui.as_mut().map(|ui| ui as &mut dyn Overlay);
        match gpu.render(&self.camera, overlay) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface lost/outdated. Recreating...");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory. Exiting.");
                self.stop.stop();
                event_loop.exit();
            }
            Err(e) => log::warn!("Frame skipped: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            log::error!("Failed to initialise graphics: {e:#}");
            self.fatal = Some(e);
            self.stop.stop();
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(ui) = &mut self.ui {
            ui.on_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                self.stop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.handle_resize(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open the window and run until it is closed.
pub fn run(config: RunConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    log::info!(
        "Backend: {:?}, show_fps={}, ui={}, window_size={}x{}",
        config.backends,
        config.show_fps,
        config.show_ui,
        config.width,
        config.height
    );

    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .context("Event loop error")?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
