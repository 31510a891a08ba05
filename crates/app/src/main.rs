//! Entry point for Orbitext.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use platform::RunConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Backend {
    #[default]
    Auto,
    #[value(alias = "vk")]
    Vulkan,
    #[value(alias = "d3d12")]
    Dx12,
    #[value(alias = "mtl")]
    Metal,
    #[value(alias = "opengl", alias = "gles")]
    Gl,
}

impl Backend {
    fn to_wgpu(self) -> wgpu::Backends {
        match self {
            Backend::Auto => wgpu::Backends::all(),
            Backend::Vulkan => wgpu::Backends::VULKAN,
            Backend::Dx12 => wgpu::Backends::DX12,
            Backend::Metal => wgpu::Backends::METAL,
            Backend::Gl => wgpu::Backends::GL,
        }
    }
}

/// Extruded matcap text orbited by a camera through a field of random shapes.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Typeface JSON font used for the label
    #[arg(long, default_value = "assets/fonts/helvetiker_regular.typeface.json")]
    font: PathBuf,

    /// Matcap texture applied to every mesh
    #[arg(long, default_value = "assets/textures/matcaps/8.png")]
    matcap: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    gpu_backend: Backend,

    /// Window size as WxH
    #[arg(long, value_parser = parse_size)]
    size: Option<(u32, u32)>,

    /// Overrides the width from --size
    #[arg(long)]
    width: Option<u32>,

    /// Overrides the height from --size
    #[arg(long)]
    height: Option<u32>,

    /// Show frames per second in the control panel
    #[arg(long)]
    show_fps: bool,

    /// Hide the control panel
    #[arg(long)]
    no_ui: bool,

    /// Seed for shape placement and the initial camera position
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn window_size(&self) -> (u32, u32) {
        let (w, h) = self.size.unwrap_or((1280, 720));
        (self.width.unwrap_or(w).max(1), self.height.unwrap_or(h).max(1))
    }

    fn into_config(self) -> RunConfig {
        let (width, height) = self.window_size();
        RunConfig {
            backends: self.gpu_backend.to_wgpu(),
            width,
            height,
            show_fps: self.show_fps,
            show_ui: !self.no_ui,
            font_path: self.font,
            matcap_path: self.matcap,
            seed: self.seed,
        }
    }
}

fn parse_size(v: &str) -> Result<(u32, u32), String> {
    let (sw, sh) = v
        .split_once('x')
        .or_else(|| v.split_once('X'))
        .ok_or_else(|| format!("expected WxH, got '{v}'"))?;
    let w = sw.parse::<u32>().map_err(|e| format!("bad width '{sw}': {e}"))?;
    let h = sh.parse::<u32>().map_err(|e| format!("bad height '{sh}': {e}"))?;
    Ok((w, h))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    log::info!(
        "Starting Orbitext. font={}, matcap={}, seed={:?}",
        config.font_path.display(),
        config.matcap_path.display(),
        config.seed
    );

    platform::run(config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_either_separator() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size("1920X1080"), Ok((1920, 1080)));
        assert!(parse_size("800").is_err());
        assert!(parse_size("ax600").is_err());
    }

    #[test]
    fn defaults_match_the_demo() {
        let cli = Cli::try_parse_from(["orbitext"]).unwrap();
        let config = cli.into_config();
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.backends, wgpu::Backends::all());
        assert!(config.show_ui);
        assert!(!config.show_fps);
        assert!(config.font_path.ends_with("helvetiker_regular.typeface.json"));
        assert!(config.matcap_path.ends_with("8.png"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn width_and_height_override_size() {
        let cli = Cli::try_parse_from(["orbitext", "--size", "640x480", "--height", "0"]).unwrap();
        assert_eq!(cli.window_size(), (640, 1));
    }

    #[test]
    fn backend_aliases() {
        let cli = Cli::try_parse_from(["orbitext", "--gpu-backend", "vk", "--no-ui"]).unwrap();
        assert_eq!(cli.gpu_backend, Backend::Vulkan);
        let config = cli.into_config();
        assert_eq!(config.backends, wgpu::Backends::VULKAN);
        assert!(!config.show_ui);
    }
}
