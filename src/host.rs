//! Contracts for the engine-side collaborators the simulation talks to.
//!
//! The simulation never owns GPU resources or scene objects directly. It
//! allocates render targets, pushes material uniforms, uploads tile meshes and
//! submits render passes through these traits, all borrowed for the duration of
//! a single call via [`Host`].

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::params::ColorFormat;

/// Opaque render target handle issued by a [`RenderTargetAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Texture addressing outside `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Clamp,
    Repeat,
}

/// Render target request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: ColorFormat,
    pub wrap: WrapMode,
    pub power_of_two: bool,
}

/// Allocation failure reported by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationError(pub String);

/// Creates and destroys offscreen colour targets
pub trait RenderTargetAllocator {
    fn allocate(&mut self, desc: RenderTargetDesc) -> Result<TextureHandle, AllocationError>;

    /// Release a target. Handles are never reused by the simulation afterwards.
    fn release(&mut self, handle: TextureHandle);
}

/// Receives shader uniforms for the ocean material
pub trait MaterialSink {
    fn set_texture(&mut self, name: &str, handle: TextureHandle);
    fn set_vector(&mut self, name: &str, value: Vec4);
    fn set_color(&mut self, name: &str, rgba: [f32; 4]);
}

/// Index of a tile in the simulation's tile arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// Per-frame vertex attributes for one tile.
///
/// Tangent `w` carries the foam factor in `[0, 2]`.
#[derive(Debug, Clone, Copy)]
pub struct TileAttributes<'a> {
    pub positions: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub tangents: &'a [Vec4],
}

/// Receives tile geometry. Implementations copy the slices they are given.
pub trait MeshSink {
    /// Called once per epoch with the tile's placement and fixed topology
    fn set_topology(&mut self, tile: TileId, offset: Vec3, uvs: &[Vec2], indices: &[u32]);

    /// Called every tick with freshly synthesized attributes
    fn update_attributes(&mut self, tile: TileId, attributes: TileAttributes<'_>);

    /// Drop the tile's geometry. Called before an epoch rebuild and on teardown.
    fn remove_tile(&mut self, tile: TileId);
}

/// Snapshot of the active camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Right-handed view matrix, camera looks down -Z
    pub world_to_camera: Mat4,

    /// OpenGL-style projection (clip z in [-w, w])
    pub projection: Mat4,

    pub position: Vec3,
    pub rotation: Quat,

    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
}

impl CameraState {
    /// Build a camera looking from `eye` at `target` with +Y up
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let world_to_camera = Mat4::look_at_rh(eye, target, Vec3::Y);
        let (_, rotation, _) = world_to_camera.inverse().to_scale_rotation_translation();
        Self {
            world_to_camera,
            projection: Mat4::perspective_rh_gl(fov_y, aspect, near, far),
            position: eye,
            rotation,
            fov_y,
            aspect,
        }
    }
}

/// Provides the camera the ocean is currently viewed through
pub trait CameraQuery {
    fn active_camera(&self) -> Option<CameraState>;
}

/// Offscreen render submission produced by the reflection projector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    pub kind: PassKind,
    pub target: TextureHandle,
    pub world_to_camera: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub camera_rotation: Quat,

    /// Scene is mirrored; the backend must swap front/back face culling
    pub invert_culling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Reflection,
    Refraction,
}

/// Renders the scene for an offscreen pass
pub trait SceneRenderer {
    fn render(&mut self, pass: &RenderPass);
}

/// Collaborators borrowed for one simulation call
pub struct Host<'a> {
    pub allocator: &'a mut dyn RenderTargetAllocator,
    pub material: &'a mut dyn MaterialSink,
    pub meshes: &'a mut dyn MeshSink,
    pub camera: &'a dyn CameraQuery,
    pub renderer: &'a mut dyn SceneRenderer,
}

/// Source of IID uniform samples in `[0, 1)`
pub trait UniformRandomSource {
    fn next_uniform(&mut self) -> f32;
}

impl<R: rand::Rng> UniformRandomSource for R {
    fn next_uniform(&mut self) -> f32 {
        self.gen::<f32>()
    }
}
