//! Parametric primitive meshes. Counter-clockwise winding seen from outside,
//! unit normals, UVs in [0, 1].

use std::f32::consts::{PI, TAU};

use crate::mesh::{MeshData, MeshVertex};

/// Ring of `tube`-thick pipe around the Z axis, `radius` from centre to
/// tube centre.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);

    let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;

            let ring = radius + tube * v.cos();
            let position = [ring * u.cos(), ring * u.sin(), tube * v.sin()];
            let normal = normalize([
                position[0] - radius * u.cos(),
                position[1] - radius * u.sin(),
                position[2],
            ]);
            let uv = [i as f32 / tubular as f32, j as f32 / radial as f32];
            vertices.push(MeshVertex::new(position, normal, uv));
        }
    }

    let stride = tubular + 1;
    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData::new(vertices, indices)
}

/// UV sphere centred at the origin. Poles get a single triangle fan.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width = width_segments.max(3);
    let height = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        // shift pole UVs to the middle of their quad
        let u_offset = if iy == 0 {
            0.5 / width as f32
        } else if iy == height {
            -0.5 / width as f32
        } else {
            0.0
        };

        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let (sin_t, cos_t) = (v * PI).sin_cos();
            let (sin_p, cos_p) = (u * TAU).sin_cos();
            let position = [-radius * cos_p * sin_t, radius * cos_t, radius * sin_p * sin_t];
            let normal = normalize(position);
            vertices.push(MeshVertex::new(position, normal, [u + u_offset, 1.0 - v]));
        }
    }

    let stride = width + 1;
    let mut indices = Vec::new();
    for iy in 0..height {
        for ix in 0..width {
            let a = stride * iy + ix + 1;
            let b = stride * iy + ix;
            let c = stride * (iy + 1) + ix;
            let d = stride * (iy + 1) + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData::new(vertices, indices)
}

/// Axis-aligned box centred at the origin, 4 vertices per face.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let half = [width * 0.5, height * 0.5, depth * 0.5];
    // (normal axis, sign, u axis, v axis) with u x v == normal
    const FACES: [(usize, f32, usize, usize); 6] = [
        (0, 1.0, 1, 2),
        (0, -1.0, 2, 1),
        (1, 1.0, 2, 0),
        (1, -1.0, 0, 2),
        (2, 1.0, 0, 1),
        (2, -1.0, 1, 0),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (axis, sign, ua, va) in FACES {
        let base = vertices.len() as u32;
        let mut normal = [0.0; 3];
        normal[axis] = sign;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let mut p = [0.0; 3];
            p[axis] = sign * half[axis];
            p[ua] = su * half[ua];
            p[va] = sv * half[va];
            let uv = [(su + 1.0) * 0.5, (sv + 1.0) * 0.5];
            vertices.push(MeshVertex::new(p, normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData::new(vertices, indices)
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::face_normal;

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every non-degenerate triangle faces the same way as its vertex normals.
    fn assert_outward(mesh: &MeshData) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize]);
            let Some(n) = face_normal(a.position, b.position, c.position) else {
                continue;
            };
            let avg = [
                a.normal[0] + b.normal[0] + c.normal[0],
                a.normal[1] + b.normal[1] + c.normal[1],
                a.normal[2] + b.normal[2] + c.normal[2],
            ];
            assert!(dot(n, avg) > 0.0, "inward triangle {tri:?}");
        }
    }

    fn assert_unit_normals(mesh: &MeshData) {
        for v in &mesh.vertices {
            assert!((dot(v.normal, v.normal) - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_layout() {
        let mesh = torus(0.3, 0.2, 20, 45);
        assert_eq!(mesh.vertices.len(), 21 * 46);
        assert_eq!(mesh.indices.len(), 20 * 45 * 6);
        assert_unit_normals(&mesh);
        assert_outward(&mesh);

        let aabb = mesh.bounding_box().unwrap();
        assert!((aabb.max[0] - 0.5).abs() < 1e-5);
        assert!((aabb.max[2] - 0.2).abs() < 1e-3);
    }

    #[test]
    fn sphere_layout() {
        let mesh = sphere(0.3, 32, 32);
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.triangle_count(), 32 * (32 * 2 - 2));
        assert_unit_normals(&mesh);
        assert_outward(&mesh);
        for v in &mesh.vertices {
            assert!((dot(v.position, v.position).sqrt() - 0.3).abs() < 1e-5);
        }
    }

    #[test]
    fn cuboid_layout() {
        let mesh = cuboid(0.3, 0.3, 0.3);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_unit_normals(&mesh);
        assert_outward(&mesh);
        let aabb = mesh.bounding_box().unwrap();
        assert_eq!(aabb.min, [-0.15; 3]);
        assert_eq!(aabb.max, [0.15; 3]);
    }
}
