//! Background asset loading. One worker thread reads the font and the
//! matcap texture and hands a single result back over a oneshot channel.

use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result, anyhow};
use futures::channel::oneshot;

use crate::font::Typeface;
use crate::texture::{ColorSpace, TextureData};

#[derive(Clone, Debug)]
pub struct AssetRequest {
    pub font_path: PathBuf,
    pub matcap_path: PathBuf,
}

/// Everything the scene needs before it can be populated.
#[derive(Clone, Debug)]
pub struct LoadedAssets {
    pub font: Typeface,
    pub matcap: TextureData,
}

/// In-flight load. Poll it from the frame loop or await it.
#[derive(Debug)]
pub struct PendingAssets {
    rx: oneshot::Receiver<Result<LoadedAssets>>,
}

impl AssetRequest {
    pub fn new(font_path: impl Into<PathBuf>, matcap_path: impl Into<PathBuf>) -> Self {
        Self {
            font_path: font_path.into(),
            matcap_path: matcap_path.into(),
        }
    }

    /// Load both resources on the calling thread.
    pub fn load_blocking(&self) -> Result<LoadedAssets> {
        let matcap = TextureData::load_png(&self.matcap_path)
            .context("Matcap texture load failed")?
            .with_color_space(ColorSpace::Srgb);
        let font = Typeface::load(&self.font_path).context("Font load failed")?;
        Ok(LoadedAssets { font, matcap })
    }
}

/// Start loading on a worker thread.
pub fn load_async(request: AssetRequest) -> PendingAssets {
    let (tx, rx) = oneshot::channel();
    log::info!(
        "Requesting font {:?} and matcap {:?}",
        request.font_path,
        request.matcap_path
    );

    let spawned = thread::Builder::new()
        .name("asset-loader".into())
        .spawn(move || {
            let result = request.load_blocking();
            if tx.send(result).is_err() {
                log::debug!("Asset load finished after the receiver was dropped");
            }
        });

    if let Err(e) = spawned {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(anyhow!("Failed to spawn asset loader thread: {e}")));
        return PendingAssets { rx };
    }
    PendingAssets { rx }
}

impl PendingAssets {
    /// Non-blocking: `None` while the load is still running.
    pub fn poll(&mut self) -> Option<Result<LoadedAssets>> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(anyhow!("Asset loader exited without a result"))),
        }
    }

    pub async fn wait(self) -> Result<LoadedAssets> {
        self.rx
            .await
            .map_err(|_| anyhow!("Asset loader exited without a result"))?
    }
}
