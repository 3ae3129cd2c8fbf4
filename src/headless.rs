//! In-memory collaborators for running the simulation without a GPU.
//!
//! Used by the command-line demo and by tests. Every sink keeps copies of what
//! it receives so results can be inspected after a tick.

use std::collections::{BTreeMap, HashMap};

use glam::{Vec2, Vec3, Vec4};

use crate::host::{
    AllocationError, CameraQuery, CameraState, Host, MaterialSink, MeshSink, RenderPass,
    RenderTargetAllocator, RenderTargetDesc, SceneRenderer, TextureHandle, TileAttributes, TileId,
};
use crate::ocean::OceanVertex;

/// Hands out sequential texture handles and tracks which are live
#[derive(Debug, Default)]
pub struct HeadlessAllocator {
    next: u64,
    pub live: HashMap<TextureHandle, RenderTargetDesc>,
    pub released: Vec<TextureHandle>,
}

impl RenderTargetAllocator for HeadlessAllocator {
    fn allocate(&mut self, desc: RenderTargetDesc) -> Result<TextureHandle, AllocationError> {
        self.next += 1;
        let handle = TextureHandle(self.next);
        self.live.insert(handle, desc);
        Ok(handle)
    }

    fn release(&mut self, handle: TextureHandle) {
        if self.live.remove(&handle).is_some() {
            self.released.push(handle);
        }
    }
}

/// Allocator that runs out of memory after a fixed number of allocations
#[derive(Debug, Default)]
pub struct FailingAllocator {
    remaining: usize,
    pub inner: HeadlessAllocator,
}

impl FailingAllocator {
    pub fn after(successful_allocations: usize) -> Self {
        Self {
            remaining: successful_allocations,
            inner: HeadlessAllocator::default(),
        }
    }
}

impl RenderTargetAllocator for FailingAllocator {
    fn allocate(&mut self, desc: RenderTargetDesc) -> Result<TextureHandle, AllocationError> {
        if self.remaining == 0 {
            return Err(AllocationError(format!(
                "out of video memory for {}x{} target",
                desc.width, desc.height
            )));
        }
        self.remaining -= 1;
        self.inner.allocate(desc)
    }

    fn release(&mut self, handle: TextureHandle) {
        self.inner.release(handle);
    }
}

/// Last value written to each material uniform
#[derive(Debug, Default)]
pub struct MaterialStore {
    pub textures: HashMap<String, TextureHandle>,
    pub vectors: HashMap<String, Vec4>,
    pub colors: HashMap<String, [f32; 4]>,
}

impl MaterialSink for MaterialStore {
    fn set_texture(&mut self, name: &str, handle: TextureHandle) {
        self.textures.insert(name.to_string(), handle);
    }

    fn set_vector(&mut self, name: &str, value: Vec4) {
        self.vectors.insert(name.to_string(), value);
    }

    fn set_color(&mut self, name: &str, rgba: [f32; 4]) {
        self.colors.insert(name.to_string(), rgba);
    }
}

/// Copy of one tile's uploaded geometry
#[derive(Debug, Clone, Default)]
pub struct StoredTile {
    pub offset: Vec3,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub vertices: Vec<OceanVertex>,
}

/// Keeps an interleaved copy of every tile's mesh
#[derive(Debug, Default)]
pub struct MeshStore {
    pub tiles: BTreeMap<TileId, StoredTile>,
    pub uploads: usize,
}

impl MeshStore {
    /// Bytes held in interleaved vertex buffers
    pub fn vertex_bytes(&self) -> usize {
        self.tiles
            .values()
            .map(|t| bytemuck::cast_slice::<OceanVertex, u8>(&t.vertices).len())
            .sum()
    }
}

impl MeshSink for MeshStore {
    fn set_topology(&mut self, tile: TileId, offset: Vec3, uvs: &[Vec2], indices: &[u32]) {
        let stored = self.tiles.entry(tile).or_default();
        stored.offset = offset;
        stored.uvs = uvs.to_vec();
        stored.indices = indices.to_vec();
        stored.vertices.clear();
    }

    fn update_attributes(&mut self, tile: TileId, attributes: TileAttributes<'_>) {
        let stored = self.tiles.entry(tile).or_default();
        stored.vertices = attributes
            .positions
            .iter()
            .zip(attributes.normals)
            .zip(attributes.tangents)
            .zip(stored.uvs.iter().copied().chain(std::iter::repeat(Vec2::ZERO)))
            .map(|(((p, n), t), uv)| OceanVertex {
                position: p.to_array(),
                normal: n.to_array(),
                tangent: t.to_array(),
                uv: uv.to_array(),
            })
            .collect();
        self.uploads += 1;
    }

    fn remove_tile(&mut self, tile: TileId) {
        self.tiles.remove(&tile);
    }
}

/// Camera query returning a settable snapshot
#[derive(Debug, Default)]
pub struct HeadlessCamera {
    pub state: Option<CameraState>,
}

impl CameraQuery for HeadlessCamera {
    fn active_camera(&self) -> Option<CameraState> {
        self.state
    }
}

/// Records submitted render passes instead of drawing them
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub passes: Vec<RenderPass>,
}

impl SceneRenderer for RecordingRenderer {
    fn render(&mut self, pass: &RenderPass) {
        self.passes.push(*pass);
    }
}

/// All collaborators in one place
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub allocator: HeadlessAllocator,
    pub material: MaterialStore,
    pub meshes: MeshStore,
    pub camera: HeadlessCamera,
    pub renderer: RecordingRenderer,
}

impl HeadlessBackend {
    /// Backend with an active camera
    pub fn with_camera(state: CameraState) -> Self {
        Self {
            camera: HeadlessCamera { state: Some(state) },
            ..Default::default()
        }
    }

    /// Borrow every collaborator for one simulation call
    pub fn host(&mut self) -> Host<'_> {
        Host {
            allocator: &mut self.allocator,
            material: &mut self.material,
            meshes: &mut self.meshes,
            camera: &self.camera,
            renderer: &mut self.renderer,
        }
    }
}
