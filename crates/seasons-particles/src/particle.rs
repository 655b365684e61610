//! Particle vertex layout and the indirect argument block shared with WGSL

use bytemuck::{Pod, Zeroable};

/// Particle type tag for the emitter vertex
pub const KIND_EMITTER: u32 = 0;
/// Particle type tag for a live particle
pub const KIND_PARTICLE: u32 = 1;

/// Slot the emitter record occupies in every written buffer. Spawns and
/// survivors are appended after it, so a full buffer never drops the emitter.
pub const EMITTER_SLOT: u32 = 0;

/// Vertices drawn per particle billboard (two triangles)
pub const BILLBOARD_VERTICES: u32 = 6;

/// Compute workgroup size of the stream-out pass
pub const WORKGROUP_SIZE: u32 = 64;

/// One particle record. Matches WGSL `Particle` (48 bytes, 16-byte aligned).
///
/// Lives only on the GPU once uploaded. The single emitter record
/// (`kind == KIND_EMITTER`) spawns live particles during the stream-out pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub age: f32,
    pub velocity: [f32; 3],
    pub kind: u32,
    pub size: [f32; 2],
    pub _pad: [f32; 2],
}

impl ParticleVertex {
    /// The seed record held by the init buffer
    pub fn emitter() -> Self {
        Self {
            position: [0.0; 3],
            age: 0.0,
            velocity: [0.0; 3],
            kind: KIND_EMITTER,
            size: [0.0; 2],
            _pad: [0.0; 2],
        }
    }

    pub fn is_emitter(&self) -> bool {
        self.kind == KIND_EMITTER
    }
}

/// Per-buffer argument block. Matches WGSL `ParticleArgs` (32 bytes).
///
/// The first four words are a `draw_indirect` argument set whose
/// `instance_count` is the live record count; the next three are a
/// `dispatch_workgroups_indirect` argument set for simulating from this buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct ParticleArgs {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
    pub dispatch_x: u32,
    pub dispatch_y: u32,
    pub dispatch_z: u32,
    pub _pad: u32,
}

impl ParticleArgs {
    /// Byte offset of the dispatch arguments inside the block
    pub const DISPATCH_OFFSET: u64 = 16;

    /// An empty target: no records, nothing to dispatch
    pub fn empty() -> Self {
        Self::with_count(0)
    }

    /// Counter state a target starts each simulate pass from: the emitter
    /// slot is already taken
    pub fn target_reset() -> Self {
        Self::with_count(EMITTER_SLOT + 1)
    }

    /// Arguments describing `count` records
    pub fn with_count(count: u32) -> Self {
        Self {
            vertex_count: BILLBOARD_VERTICES,
            instance_count: count,
            first_vertex: 0,
            first_instance: 0,
            dispatch_x: workgroups_for(count),
            dispatch_y: 1,
            dispatch_z: 1,
            _pad: 0,
        }
    }
}

/// Workgroups needed to give every record its own invocation
pub fn workgroups_for(count: u32) -> u32 {
    count.div_ceil(WORKGROUP_SIZE)
}

/// Byte size of a buffer holding `capacity` particle records
pub fn buffer_size(capacity: u32) -> u64 {
    capacity as u64 * std::mem::size_of::<ParticleVertex>() as u64
}
