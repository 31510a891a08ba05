//! Extruded, optionally bevelled 3D text built from typeface outlines.
//!
//! Each glyph is swept through a stack of contour layers along +Z. With a
//! bevel, the stack starts at `-bevel_thickness`, widens by up to
//! `bevel_size` on a quarter-circle profile, runs flat for `depth`, and
//! narrows again symmetrically. Caps close the first and last layer.

use std::f32::consts::FRAC_PI_2;

use anyhow::{Result, anyhow};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::font::{Contour, GlyphOutline, Typeface, signed_area};
use crate::mesh::MeshData;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextGeometryParams {
    pub size: f32,
    /// Extrusion length along +Z, bevel excluded.
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextGeometryParams {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

impl TextGeometryParams {
    /// `(outward offset, z)` for every contour layer, front to back.
    fn layers(&self) -> Vec<(f32, f32)> {
        if !self.bevel_enabled || self.bevel_segments == 0 {
            return vec![(0.0, 0.0), (0.0, self.depth)];
        }
        let segs = self.bevel_segments;
        let profile = |b: u32| {
            let t = b as f32 / segs as f32 * FRAC_PI_2;
            (
                self.bevel_size * t.sin() + self.bevel_offset,
                self.bevel_thickness * t.cos(),
            )
        };

        let mut layers = Vec::with_capacity(2 * segs as usize + 2);
        for b in 0..segs {
            let (offset, z) = profile(b);
            layers.push((offset, -z));
        }
        let full = self.bevel_size + self.bevel_offset;
        layers.push((full, 0.0));
        layers.push((full, self.depth));
        for b in (0..segs).rev() {
            let (offset, z) = profile(b);
            layers.push((offset, self.depth + z));
        }
        layers
    }
}

/// Build the extruded mesh for `text`. Not centred.
pub fn text_geometry(face: &Typeface, text: &str, params: &TextGeometryParams) -> Result<MeshData> {
    let outlines = face.layout(text, params.size, params.curve_segments)?;
    let layers = params.layers();

    let mut mesh = MeshData::default();
    for glyph in &outlines {
        extrude_glyph(glyph, &layers, &mut mesh)?;
    }
    log::debug!(
        "Text geometry for {:?}: {} glyphs, {} triangles",
        text,
        outlines.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

fn extrude_glyph(glyph: &GlyphOutline, layers: &[(f32, f32)], mesh: &mut MeshData) -> Result<()> {
    // Fill lies left of travel when the largest contour runs counter-clockwise.
    let outer_sign = glyph
        .contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map_or(1.0, |a| if a < 0.0 { -1.0 } else { 1.0 });

    let offsets: Vec<Vec<[f32; 2]>> = glyph
        .contours
        .iter()
        .map(|c| bevel_vectors(c, outer_sign))
        .collect();

    let layer_points = |ci: usize, (offset, _z): (f32, f32)| -> Contour {
        glyph.contours[ci]
            .iter()
            .zip(&offsets[ci])
            .map(|(p, v)| [p[0] + v[0] * offset, p[1] + v[1] * offset])
            .collect()
    };

    let (Some(&front), Some(&back)) = (layers.first(), layers.last()) else {
        return Ok(());
    };

    // caps
    let front_cap: Vec<Contour> = (0..glyph.contours.len()).map(|ci| layer_points(ci, front)).collect();
    let back_cap: Vec<Contour> = (0..glyph.contours.len()).map(|ci| layer_points(ci, back)).collect();
    for [a, b, c] in tessellate(&front_cap)? {
        let (a, b, c) = if tri_area(a, b, c) > 0.0 { (a, c, b) } else { (a, b, c) };
        mesh.push_flat_triangle(lift(a, front.1), lift(b, front.1), lift(c, front.1));
    }
    for [a, b, c] in tessellate(&back_cap)? {
        let (a, b, c) = if tri_area(a, b, c) < 0.0 { (a, c, b) } else { (a, b, c) };
        mesh.push_flat_triangle(lift(a, back.1), lift(b, back.1), lift(c, back.1));
    }

    // side walls
    for ci in 0..glyph.contours.len() {
        let rings: Vec<Contour> = layers.iter().map(|&l| layer_points(ci, l)).collect();
        let n = glyph.contours[ci].len();
        for (li, pair) in rings.windows(2).enumerate() {
            let (z0, z1) = (layers[li].1, layers[li + 1].1);
            for i in 0..n {
                let j = (i + 1) % n;
                // walk so that the wall faces away from the fill
                let (i, j) = if outer_sign > 0.0 { (i, j) } else { (j, i) };
                let a = lift(pair[0][i], z0);
                let b = lift(pair[0][j], z0);
                let c = lift(pair[1][j], z1);
                let d = lift(pair[1][i], z1);
                mesh.push_flat_triangle(a, b, c);
                mesh.push_flat_triangle(a, c, d);
            }
        }
    }
    Ok(())
}

/// Per-vertex shift that moves both adjacent edges outward by one unit.
fn bevel_vectors(contour: &[[f32; 2]], outer_sign: f32) -> Vec<[f32; 2]> {
    let n = contour.len();
    let away = |from: [f32; 2], to: [f32; 2]| -> [f32; 2] {
        let (dx, dy) = (to[0] - from[0], to[1] - from[1]);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return [0.0, 0.0];
        }
        [dy / len * outer_sign, -dx / len * outer_sign]
    };

    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let cur = contour[i];
            let next = contour[(i + 1) % n];
            let n1 = away(prev, cur);
            let n2 = away(cur, next);
            let denom = 1.0 + n1[0] * n2[0] + n1[1] * n2[1];
            if denom < 1e-6 {
                return n1;
            }
            let mut v = [(n1[0] + n2[0]) / denom, (n1[1] + n2[1]) / denom];
            let len_sq = v[0] * v[0] + v[1] * v[1];
            if len_sq > 2.0 {
                let shrink = (len_sq / 2.0).sqrt();
                v = [v[0] / shrink, v[1] / shrink];
            }
            v
        })
        .collect()
}

fn tessellate(contours: &[Contour]) -> Result<Vec<[[f32; 2]; 3]>> {
    let mut builder = Path::builder();
    for contour in contours {
        let Some((first, rest)) = contour.split_first() else {
            continue;
        };
        builder.begin(point(first[0], first[1]));
        for p in rest {
            builder.line_to(point(p[0], p[1]));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position().to_array()),
        )
        .map_err(|e| anyhow!("Glyph tessellation failed: {:?}", e))?;

    Ok(buffers
        .indices
        .chunks_exact(3)
        .map(|t| [0, 1, 2].map(|k| buffers.vertices[t[k] as usize]))
        .collect())
}

#[inline]
fn tri_area(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

#[inline]
fn lift(p: [f32; 2], z: f32) -> [f32; 3] {
    [p[0], p[1], z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::tests::TEST_FONT;

    fn face() -> Typeface {
        Typeface::from_json(TEST_FONT).unwrap()
    }

    fn flat(depth: f32) -> TextGeometryParams {
        TextGeometryParams {
            size: 1.0,
            depth,
            bevel_enabled: false,
            ..TextGeometryParams::default()
        }
    }

    /// Signed volume by the divergence theorem; positive when every face
    /// points outwards.
    fn volume(mesh: &MeshData) -> f32 {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[t[k] as usize].position);
                let cross = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
            })
            .sum()
    }

    #[test]
    fn label_params_match_scene() {
        let p = TextGeometryParams::default();
        assert_eq!(p.size, 0.5);
        assert_eq!(p.depth, 0.2);
        assert_eq!(p.curve_segments, 5);
        assert_eq!(p.bevel_segments, 4);
        let layers = p.layers();
        assert_eq!(layers.len(), 10);
        assert!((layers[0].1 + 0.03).abs() < 1e-6);
        assert!((layers[9].1 - 0.23).abs() < 1e-6);
        assert!(layers.windows(2).all(|w| w[1].1 >= w[0].1));
    }

    #[test]
    fn square_with_hole_is_closed_and_outward() {
        let mesh = text_geometry(&face(), "O", &flat(0.2)).unwrap();
        assert!(mesh.is_valid());
        // (1 - 0.25) area * 0.2 depth
        assert!((volume(&mesh) - 0.15).abs() < 1e-4, "volume {}", volume(&mesh));

        let aabb = mesh.bounding_box().unwrap();
        assert_eq!(aabb.min, [0.0, 0.0, 0.0]);
        assert!((aabb.max[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn caps_face_away_from_each_other() {
        let mesh = text_geometry(&face(), "O", &flat(0.2)).unwrap();
        let mut front = 0;
        let mut back = 0;
        for v in &mesh.vertices {
            if v.normal == [0.0, 0.0, -1.0] {
                assert_eq!(v.position[2], 0.0);
                front += 1;
            } else if v.normal == [0.0, 0.0, 1.0] {
                assert!((v.position[2] - 0.2).abs() < 1e-6);
                back += 1;
            }
        }
        assert!(front > 0);
        assert_eq!(front, back);
    }

    #[test]
    fn bevel_widens_and_thickens() {
        let params = TextGeometryParams {
            size: 1.0,
            ..TextGeometryParams::default()
        };
        let mesh = text_geometry(&face(), "O", &params).unwrap();
        let aabb = mesh.bounding_box().unwrap();
        assert!((aabb.min[0] + 0.02).abs() < 1e-4);
        assert!((aabb.max[0] - 1.02).abs() < 1e-4);
        assert!((aabb.min[2] + 0.03).abs() < 1e-5);
        assert!((aabb.max[2] - 0.23).abs() < 1e-5);
        assert!(volume(&mesh) > 0.15);
    }

    #[test]
    fn clockwise_outlines_still_face_outwards() {
        let json = TEST_FONT.replace(
            "m 0 0 l 100 0 l 100 100 l 0 100 l 0 0 m 25 25 l 25 75 l 75 75 l 75 25 l 25 25",
            "m 0 0 l 0 100 l 100 100 l 100 0 l 0 0 m 25 25 l 75 25 l 75 75 l 25 75 l 25 25",
        );
        let mesh = text_geometry(&Typeface::from_json(&json).unwrap(), "O", &flat(0.2)).unwrap();
        assert!((volume(&mesh) - 0.15).abs() < 1e-4);
    }

    #[test]
    fn centred_label() {
        let mut mesh = text_geometry(&face(), "OD O", &TextGeometryParams::default()).unwrap();
        mesh.center();
        let c = mesh.bounding_box().unwrap().center();
        assert!(c.iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn blank_text_is_empty() {
        let mesh = text_geometry(&face(), "  ", &TextGeometryParams::default()).unwrap();
        assert!(!mesh.is_valid());
    }
}
