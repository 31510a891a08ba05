//! Scene assembly once assets arrive: shared geometries + populated world.

use anyhow::{Context, Result};
use asset::font::Typeface;
use asset::loader::LoadedAssets;
use asset::mesh::MeshData;
use asset::primitives::{cuboid, sphere, torus};
use asset::text::{TextGeometryParams, text_geometry};
use asset::texture::TextureData;
use corelib::ecs::{MeshKind, World};
use corelib::populate::{PopulationReport, ScenePopulator};
use rand::Rng;

/// Text of the label mesh.
pub const LABEL_TEXT: &str = "Sara te amo <3";

/// One geometry per mesh kind, shared by every instance of that kind.
#[derive(Clone, Debug)]
pub struct SceneMeshes {
    pub label: MeshData,
    pub torus: MeshData,
    pub sphere: MeshData,
    pub cube: MeshData,
}

impl SceneMeshes {
    pub fn build(font: &Typeface) -> Result<Self> {
        let mut label = text_geometry(font, LABEL_TEXT, &TextGeometryParams::default())
            .context("Failed to build label geometry")?;
        label.center();

        Ok(Self {
            label,
            torus: torus(0.3, 0.2, 20, 45),
            sphere: sphere(0.3, 32, 32),
            cube: cuboid(0.3, 0.3, 0.3),
        })
    }

    pub fn get(&self, kind: MeshKind) -> &MeshData {
        match kind {
            MeshKind::Label => &self.label,
            MeshKind::Torus => &self.torus,
            MeshKind::Sphere => &self.sphere,
            MeshKind::Cube => &self.cube,
        }
    }

    pub fn by_kind(&self) -> [(MeshKind, &MeshData); 4] {
        MeshKind::ALL.map(|kind| (kind, self.get(kind)))
    }
}

pub struct LoadedScene {
    pub world: World,
    pub meshes: SceneMeshes,
    pub matcap: TextureData,
    pub report: PopulationReport,
}

/// Turn a finished load into a scene. A failed load, or a failure while
/// building geometry, leaves the world empty and the populator untouched.
pub fn build_scene<R: Rng + ?Sized>(
    loaded: Result<LoadedAssets>,
    populator: &mut ScenePopulator,
    rng: &mut R,
) -> Result<LoadedScene> {
    let assets = loaded.context("Asset load failed")?;
    let meshes = SceneMeshes::build(&assets.font)?;

    let mut world = World::new();
    let report = populator
        .populate(&mut world, rng)
        .context("Scene population failed")?;

    Ok(LoadedScene {
        world,
        meshes,
        matcap: assets.matcap,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use asset::texture::ColorSpace;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::BTreeSet;

    /// Minimal typeface covering the label: every glyph is a unit square.
    fn label_font() -> Typeface {
        let chars: BTreeSet<char> = LABEL_TEXT.chars().filter(|c| *c != ' ').collect();
        let mut glyphs: Vec<String> = chars
            .into_iter()
            .map(|ch| format!(r#""{ch}": {{ "ha": 120, "o": "m 0 0 l 100 0 l 100 100 l 0 100" }}"#))
            .collect();
        glyphs.push(r#"" ": { "ha": 50 }"#.to_string());
        let json = format!(
            r#"{{ "familyName": "Boxes", "resolution": 100, "glyphs": {{ {} }} }}"#,
            glyphs.join(",")
        );
        Typeface::from_json(&json).unwrap()
    }

    fn assets() -> LoadedAssets {
        LoadedAssets {
            font: label_font(),
            matcap: TextureData::solid(8, [180, 180, 200, 255]).with_color_space(ColorSpace::Srgb),
        }
    }

    #[test]
    fn successful_load_populates_everything() {
        let mut populator = ScenePopulator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let scene = build_scene(Ok(assets()), &mut populator, &mut rng).unwrap();

        assert_eq!(scene.report.labels, 1);
        assert_eq!(scene.report.shapes, 300);
        assert_eq!(scene.world.len(), 301);
        for kind in [MeshKind::Torus, MeshKind::Sphere, MeshKind::Cube] {
            assert_eq!(scene.world.count_of(kind), 100);
        }
        assert_eq!(scene.matcap.color_space, ColorSpace::Srgb);
        assert!(scene.meshes.by_kind().iter().all(|(_, m)| m.is_valid()));
    }

    #[test]
    fn label_is_centred() {
        let meshes = SceneMeshes::build(&label_font()).unwrap();
        let c = meshes.label.bounding_box().unwrap().center();
        assert!(c.iter().all(|v| v.abs() < 1e-4), "centre {c:?}");
    }

    #[test]
    fn failed_load_populates_nothing() {
        let mut populator = ScenePopulator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let err = build_scene(Err(anyhow!("font missing")), &mut populator, &mut rng)
            .err()
            .unwrap();

        assert!(format!("{err:#}").contains("font missing"));
        assert!(!populator.is_populated());
    }

    #[test]
    fn second_completion_is_refused() {
        let mut populator = ScenePopulator::new();
        let mut rng = StdRng::seed_from_u64(5);
        build_scene(Ok(assets()), &mut populator, &mut rng).unwrap();
        let err = build_scene(Ok(assets()), &mut populator, &mut rng).err().unwrap();
        assert!(format!("{err:#}").contains("already populated"));
    }
}
