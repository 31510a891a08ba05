//! CPU-side mesh representation shared by every geometry generator.

/// Vertex with position/normal/uv. Values are in object space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Axis-aligned bounds of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Aabb {
    pub fn center(&self) -> [f32; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Returns `true` if both vertex and index buffers are non-empty.
    pub fn is_valid(&self) -> bool {
        !self.vertices.is_empty() && !self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let first = self.vertices.first()?.position;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for v in &self.vertices[1..] {
            for axis in 0..3 {
                aabb.min[axis] = aabb.min[axis].min(v.position[axis]);
                aabb.max[axis] = aabb.max[axis].max(v.position[axis]);
            }
        }
        Some(aabb)
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for v in &mut self.vertices {
            for axis in 0..3 {
                v.position[axis] += offset[axis];
            }
        }
    }

    /// Move the mesh so its bounding-box centre sits at the origin.
    pub fn center(&mut self) {
        if let Some(aabb) = self.bounding_box() {
            let c = aabb.center();
            self.translate([-c[0], -c[1], -c[2]]);
        }
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Append one triangle with its own three vertices and a flat normal.
    /// Degenerate triangles are dropped.
    pub fn push_flat_triangle(&mut self, a: [f32; 3], b: [f32; 3], c: [f32; 3]) {
        let Some(normal) = face_normal(a, b, c) else {
            return;
        };
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(MeshVertex::new(p, normal, [p[0], p[1]]));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Unit normal of a counter-clockwise triangle, `None` when degenerate.
pub fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Option<[f32; 3]> {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len <= f32::EPSILON * 1e-3 || !len.is_finite() {
        return None;
    }
    Some([n[0] / len, n[1] / len, n[2] / len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let data = MeshData::new(vec![MeshVertex::default()], vec![0]);
        assert!(data.is_valid());
        assert!(!MeshData::default().is_valid());
    }

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut mesh = MeshData::default();
        mesh.push_flat_triangle([1.0, 1.0, 1.0], [3.0, 1.0, 1.0], [1.0, 5.0, 2.0]);
        mesh.center();

        let aabb = mesh.bounding_box().unwrap();
        for axis in 0..3 {
            assert!(aabb.center()[axis].abs() < 1e-6);
        }
        assert_eq!(aabb.size(), [2.0, 4.0, 1.0]);
    }

    #[test]
    fn flat_triangle_normal_and_degenerates() {
        let mut mesh = MeshData::default();
        mesh.push_flat_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        mesh.push_flat_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = MeshData::default();
        a.push_flat_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let b = a.clone();
        a.append(&b);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
    }
}
