//! egui control panel drawn as a renderer overlay.

use std::sync::Arc;

use corelib::animation::AnimationState;
use corelib::panel::PanelAction;
use renderer::Overlay;
use winit::event::WindowEvent;
use winit::window::Window;

/// Asset-load progress shown in the panel.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadStatus {
    Loading,
    Ready { shapes: usize },
    Failed(String),
}

/// Everything the panel displays for one frame.
#[derive(Clone, Debug)]
pub struct PanelView<'a> {
    pub animation: AnimationState,
    pub load: &'a LoadStatus,
    pub fps: Option<f32>,
}

struct Prepared {
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

pub struct UiOverlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    window: Arc<Window>,
    prepared: Option<Prepared>,
}

impl UiOverlay {
    pub fn new(window: Arc<Window>, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
            window,
            prepared: None,
        }
    }

    /// Returns `true` if egui consumed the event.
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        self.state.on_window_event(&self.window, event).consumed
    }

    /// Lay out the panel for this frame and return the clicked actions.
    pub fn run(&mut self, view: &PanelView<'_>) -> Vec<PanelAction> {
        let raw_input = self.state.take_egui_input(&self.window);
        let mut clicked = Vec::new();
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Controls")
                .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
                .resizable(false)
                .collapsible(true)
                .show(ctx, |ui| {
                    for action in PanelAction::ALL {
                        if ui.button(action.label()).clicked() && !clicked.contains(&action) {
                            clicked.push(action);
                        }
                    }
                    ui.separator();
                    ui.label(status_line(view));
                    if let Some(fps) = view.fps {
                        ui.label(
                            egui::RichText::new(format!("{fps:.0} FPS"))
                                .color(egui::Color32::from_rgb(74, 158, 255)),
                        );
                    }
                });
        });

        self.state
            .handle_platform_output(&self.window, full_output.platform_output);
        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.prepared = Some(Prepared {
            primitives,
            textures: full_output.textures_delta,
            pixels_per_point: full_output.pixels_per_point,
        });
        clicked
    }
}

fn status_line(view: &PanelView<'_>) -> String {
    let camera = match view.animation {
        AnimationState::Animating => "camera orbiting",
        AnimationState::Paused => "camera paused",
    };
    match view.load {
        LoadStatus::Loading => format!("Loading assets..., {camera}"),
        LoadStatus::Failed(msg) => format!("Load failed: {msg}"),
        LoadStatus::Ready { shapes } => format!("{shapes} shapes, {camera}"),
    }
}

impl Overlay for UiOverlay {
    fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        let Some(prepared) = self.prepared.take() else {
            return;
        };

        for (id, delta) in &prepared.textures.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: prepared.pixels_per_point,
        };
        // Paint callbacks are not used, so no extra command buffers come back.
        let _ = self
            .renderer
            .update_buffers(device, queue, encoder, &prepared.primitives, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &prepared.primitives, &screen);
        }

        for id in &prepared.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_load_and_animation() {
        let loading = LoadStatus::Loading;
        let view = PanelView {
            animation: AnimationState::Paused,
            load: &loading,
            fps: None,
        };
        assert_eq!(status_line(&view), "Loading assets..., camera paused");

        let failed = LoadStatus::Failed("no font".into());
        let view = PanelView {
            animation: AnimationState::Animating,
            load: &failed,
            fps: None,
        };
        assert!(status_line(&view).contains("no font"));

        let ready = LoadStatus::Ready { shapes: 300 };
        let view = PanelView {
            animation: AnimationState::Paused,
            load: &ready,
            fps: Some(60.0),
        };
        assert_eq!(status_line(&view), "300 shapes, camera paused");
    }
}
