//! Per-instance data: one model matrix per entity, grouped by the shared
//! geometry it draws with.

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use corelib::ecs::{MeshKind, World};
use wgpu::{VertexBufferLayout, VertexStepMode};

/// Model matrix, column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    pub const LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
        array_stride: std::mem::size_of::<InstanceRaw>() as u64,
        step_mode: VertexStepMode::Instance,
        attributes: &wgpu::vertex_attr_array![
            3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4
        ],
    };
}

/// Bucket every renderable by mesh kind, keeping spawn order.
pub fn group_instances(world: &World) -> BTreeMap<MeshKind, Vec<InstanceRaw>> {
    let mut groups: BTreeMap<MeshKind, Vec<InstanceRaw>> = BTreeMap::new();
    for (transform, renderable) in world.iter_renderables() {
        groups.entry(renderable.mesh).or_default().push(InstanceRaw {
            model: transform.matrix().to_cols_array_2d(),
        });
    }
    groups
}
