//! Tiny scene world: Entity ids with Transform + Renderable components.
//! Additive only: entities are spawned once and never despawned.

use crate::transform::Transform;

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Geometry slot a renderable draws with. Every entity of the same kind
/// shares one geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    Label,
    Torus,
    Sphere,
    Cube,
}

impl MeshKind {
    pub const ALL: [MeshKind; 4] = [
        MeshKind::Label,
        MeshKind::Torus,
        MeshKind::Sphere,
        MeshKind::Cube,
    ];
}

/// Handle to a material owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// The single matcap material shared by everything in the scene.
    pub const MATCAP: MaterialId = MaterialId(0);
}

/// Renderable component: which shared geometry and material to draw with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    pub mesh: MeshKind,
    pub material: MaterialId,
}

/// Very small world with dense parallel arrays.
#[derive(Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
    len: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with Transform and optional Renderable.
    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.transforms.len() {
            // grow both arrays equally
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.transforms.resize(new_len, Transform::identity());
            self.renderables.resize(new_len, None);
        }

        self.transforms[idx] = t;
        self.renderables[idx] = r;
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[cfg(test)]
    pub(crate) fn transform(&self, e: Entity) -> Option<&Transform> {
        (e < self.len).then(|| &self.transforms[e as usize])
    }

    #[cfg(test)]
    pub(crate) fn renderable(&self, e: Entity) -> Option<&Renderable> {
        if e < self.len {
            self.renderables[e as usize].as_ref()
        } else {
            None
        }
    }

    /// Iterate over (Transform, Renderable) pairs in spawn order.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (&Transform, &Renderable)> {
        (0..self.len as usize)
            .filter_map(move |i| self.renderables[i].as_ref().map(|r| (&self.transforms[i], r)))
    }

    /// Number of renderables drawing with the given geometry.
    pub fn count_of(&self, kind: MeshKind) -> usize {
        self.iter_renderables()
            .filter(|(_, r)| r.mesh == kind)
            .count()
    }
}
