//! Scene population: one label plus a swarm of decorative shapes scattered
//! around the origin.

use std::f32::consts::PI;

use rand::Rng;

use crate::ecs::{MaterialId, MeshKind, Renderable, World};
use crate::transform::Transform;
use crate::{CoreError, CoreResult, Vec3};

/// Decorative shape kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Torus,
    Sphere,
    Cube,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Torus, ShapeKind::Sphere, ShapeKind::Cube];

    pub fn mesh(self) -> MeshKind {
        match self {
            ShapeKind::Torus => MeshKind::Torus,
            ShapeKind::Sphere => MeshKind::Sphere,
            ShapeKind::Cube => MeshKind::Cube,
        }
    }
}

/// Instances spawned per shape kind.
pub const INSTANCES_PER_KIND: usize = 100;
/// Positions are drawn from `[-HALF_EXTENT, HALF_EXTENT)` on each axis.
pub const HALF_EXTENT: f32 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub labels: usize,
    pub shapes: usize,
}

/// Point in `[-5, 5)³`. Also used for the camera's starting position.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
    )
}

/// Random placement for one decorative shape: position in
/// `[-5, 5)³`, x/y rotation in `[0, π)`, uniform scale in `[0, 1)`.
pub fn random_placement<R: Rng + ?Sized>(rng: &mut R) -> Transform {
    let translation = random_position(rng);
    let rotation = Vec3::new(rng.gen_range(0.0..PI), rng.gen_range(0.0..PI), 0.0);
    let scale = rng.gen_range(0.0..1.0);
    Transform::uniform(translation, rotation, scale)
}

/// Spawns the scene at most once.
#[derive(Debug, Default)]
pub struct ScenePopulator {
    populated: bool,
}

impl ScenePopulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Spawn the label (geometry is pre-centred, so identity transform) and
    /// `INSTANCES_PER_KIND` shapes of every kind, all on the matcap material.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        rng: &mut R,
    ) -> CoreResult<PopulationReport> {
        if self.populated {
            log::warn!("Scene population requested twice; ignoring");
            return Err(CoreError::AlreadyPopulated);
        }

        world.spawn(
            Transform::identity(),
            Some(Renderable {
                mesh: MeshKind::Label,
                material: MaterialId::MATCAP,
            }),
        );

        let mut shapes = 0;
        for kind in ShapeKind::ALL {
            let renderable = Renderable {
                mesh: kind.mesh(),
                material: MaterialId::MATCAP,
            };
            for _ in 0..INSTANCES_PER_KIND {
                world.spawn(random_placement(rng), Some(renderable));
                shapes += 1;
            }
        }

        self.populated = true;
        let report = PopulationReport { labels: 1, shapes };
        log::info!(
            "Scene populated: {} label, {} shapes",
            report.labels,
            report.shapes
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn populates_label_and_three_hundred_shapes() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(7);
        let report = ScenePopulator::new().populate(&mut world, &mut rng).unwrap();

        assert_eq!(report, PopulationReport { labels: 1, shapes: 300 });
        assert_eq!(world.len(), 301);
        assert_eq!(world.count_of(MeshKind::Label), 1);
        assert_eq!(world.count_of(MeshKind::Torus), 100);
        assert_eq!(world.count_of(MeshKind::Sphere), 100);
        assert_eq!(world.count_of(MeshKind::Cube), 100);
        assert!(
            world
                .iter_renderables()
                .all(|(_, r)| r.material == MaterialId::MATCAP)
        );
    }

    #[test]
    fn placements_stay_in_range() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(1234);
        ScenePopulator::new().populate(&mut world, &mut rng).unwrap();

        for (t, r) in world.iter_renderables() {
            if r.mesh == MeshKind::Label {
                assert_eq!(*t, Transform::identity());
                continue;
            }
            for c in t.translation.to_array() {
                assert!((-HALF_EXTENT..HALF_EXTENT).contains(&c), "position {c}");
            }
            assert!((0.0..PI).contains(&t.rotation_euler.x));
            assert!((0.0..PI).contains(&t.rotation_euler.y));
            assert_eq!(t.rotation_euler.z, 0.0);
            assert!(t.is_uniform_scale());
            assert!((0.0..1.0).contains(&t.scale.x));
        }
    }

    #[test]
    fn second_population_is_refused() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut populator = ScenePopulator::new();
        populator.populate(&mut world, &mut rng).unwrap();

        let err = populator.populate(&mut world, &mut rng).unwrap_err();
        assert_eq!(err, CoreError::AlreadyPopulated);
        assert_eq!(world.len(), 301);
        assert!(populator.is_populated());
    }

    #[test]
    fn same_seed_same_scene() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(random_placement(&mut a), random_placement(&mut b));
        }
    }
}
