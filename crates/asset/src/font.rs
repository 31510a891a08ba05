//! Typeface JSON fonts: glyph outlines as compact command strings.
//!
//! Outline commands (font units, y up):
//! `m x y` move, `l x y` line, `q x y cx cy` quadratic, and
//! `b x y c1x c1y c2x c2y` cubic, `z` close. Curves list the end point
//! first. Other tokens are skipped with a warning.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units.
    pub ha: f32,
    #[serde(default)]
    pub x_min: Option<f32>,
    #[serde(default)]
    pub x_max: Option<f32>,
    /// Outline command string; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typeface {
    pub glyphs: HashMap<char, Glyph>,
    #[serde(default)]
    pub family_name: String,
    /// Font units per em.
    pub resolution: f32,
    #[serde(default)]
    pub bounding_box: FontBounds,
    #[serde(default)]
    pub underline_thickness: f32,
}

/// One closed outline, already flattened to a polyline (no repeated
/// closing point).
pub type Contour = Vec<[f32; 2]>;

/// Flattened outline of one laid-out character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    pub ch: char,
    pub contours: Vec<Contour>,
}

impl Typeface {
    pub fn from_json(json: &str) -> Result<Self> {
        let face: Typeface = serde_json::from_str(json).context("Malformed typeface JSON")?;
        if !(face.resolution > 0.0) {
            bail!("Typeface resolution must be positive, got {}", face.resolution);
        }
        Ok(face)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading typeface from {:?}", path);
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read font {:?}", path))?;
        let face = Self::from_json(&json).with_context(|| format!("Failed to parse font {:?}", path))?;
        log::info!(
            "Loaded typeface '{}' with {} glyphs",
            face.family_name,
            face.glyphs.len()
        );
        Ok(face)
    }

    /// Distance between baselines at the given size.
    pub fn line_height(&self, size: f32) -> f32 {
        let b = &self.bounding_box;
        (b.y_max - b.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lay out `text` at `size` and flatten every glyph, `curve_segments`
    /// divisions per curve. Missing glyphs fall back to `?`.
    pub fn layout(&self, text: &str, size: f32, curve_segments: u32) -> Result<Vec<GlyphOutline>> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let divisions = curve_segments.max(1);

        let mut outlines = Vec::new();
        let (mut pen_x, mut pen_y) = (0.0f32, 0.0f32);
        for ch in text.chars() {
            if ch == '\n' {
                pen_x = 0.0;
                pen_y -= line_height;
                continue;
            }

            let glyph = match self.glyphs.get(&ch) {
                Some(g) => g,
                None => {
                    log::error!(
                        "Character '{}' missing from typeface '{}'",
                        ch,
                        self.family_name
                    );
                    match self.glyphs.get(&'?') {
                        Some(g) => g,
                        None => continue,
                    }
                }
            };

            let contours = match &glyph.o {
                Some(o) => flatten_outline(o, scale, [pen_x, pen_y], divisions)
                    .with_context(|| format!("Bad outline for glyph '{}'", ch))?,
                None => Vec::new(),
            };
            if !contours.is_empty() {
                outlines.push(GlyphOutline { ch, contours });
            }
            pen_x += glyph.ha * scale;
        }
        Ok(outlines)
    }
}

/// Parse an outline string into flattened, scaled and offset contours.
pub fn flatten_outline(
    outline: &str,
    scale: f32,
    offset: [f32; 2],
    divisions: u32,
) -> Result<Vec<Contour>> {
    let mut tokens = outline.split_whitespace();
    let mut contours: Vec<Contour> = Vec::new();
    let mut current: Contour = Vec::new();

    let next_point = |tokens: &mut std::str::SplitWhitespace<'_>, cmd: &str| -> Result<[f32; 2]> {
        let mut coord = || -> Result<f32> {
            let token = tokens
                .next()
                .ok_or_else(|| anyhow!("Missing coordinate after '{}'", cmd))?;
            token
                .parse::<f32>()
                .with_context(|| format!("Invalid coordinate '{}' after '{}'", token, cmd))
        };
        let x = coord()?;
        let y = coord()?;
        Ok([x * scale + offset[0], y * scale + offset[1]])
    };

    while let Some(cmd) = tokens.next() {
        match cmd {
            "m" => {
                let p = next_point(&mut tokens, cmd)?;
                finish_contour(&mut contours, std::mem::take(&mut current));
                current.push(p);
            }
            "l" => {
                let p = next_point(&mut tokens, cmd)?;
                current.push(p);
            }
            "q" => {
                let end = next_point(&mut tokens, cmd)?;
                let ctrl = next_point(&mut tokens, cmd)?;
                let start = *current.last().ok_or_else(|| anyhow!("'q' before 'm'"))?;
                for i in 1..=divisions {
                    let t = i as f32 / divisions as f32;
                    current.push(quadratic(start, ctrl, end, t));
                }
            }
            "b" => {
                let end = next_point(&mut tokens, cmd)?;
                let c1 = next_point(&mut tokens, cmd)?;
                let c2 = next_point(&mut tokens, cmd)?;
                let start = *current.last().ok_or_else(|| anyhow!("'b' before 'm'"))?;
                for i in 1..=divisions {
                    let t = i as f32 / divisions as f32;
                    current.push(cubic(start, c1, c2, end, t));
                }
            }
            "z" => finish_contour(&mut contours, std::mem::take(&mut current)),
            other => log::warn!("Skipping unknown outline command '{}'", other),
        }
    }
    finish_contour(&mut contours, current);
    Ok(contours)
}

fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    contour.dedup();
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

fn quadratic(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], t: f32) -> [f32; 2] {
    let k = 1.0 - t;
    [
        k * k * p0[0] + 2.0 * k * t * p1[0] + t * t * p2[0],
        k * k * p0[1] + 2.0 * k * t * p1[1] + t * t * p2[1],
    ]
}

fn cubic(p0: [f32; 2], p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], t: f32) -> [f32; 2] {
    let k = 1.0 - t;
    let (a, b, c, d) = (k * k * k, 3.0 * k * k * t, 3.0 * k * t * t, t * t * t);
    [
        a * p0[0] + b * p1[0] + c * p2[0] + d * p3[0],
        a * p0[1] + b * p1[1] + c * p2[1] + d * p3[1],
    ]
}

/// Signed area (positive for counter-clockwise, y up).
pub fn signed_area(contour: &[[f32; 2]]) -> f32 {
    let n = contour.len();
    let mut sum = 0.0;
    for i in 0..n {
        let [x0, y0] = contour[i];
        let [x1, y1] = contour[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    0.5 * sum
}
