//! Tile mesh topology, per-frame displacement and LOD downsampling.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use super::synth::WaveField;
use crate::params::OceanParameters;

/// Foam is clamped to this ceiling
pub const MAX_FOAM: f32 = 2.0;

/// Interleaved vertex layout for GPU upload (position + normal + tangent/foam + UV)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OceanVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

/// Fixed topology of one LOD level
#[derive(Debug, Clone)]
pub struct LodTopology {
    /// Vertices per row at this level
    pub width: usize,
    /// Vertex rows at this level
    pub height: usize,
    /// Base-grid vertex index for every LOD vertex
    pub remap: Vec<u32>,
    pub uvs: Vec<Vec2>,
    /// Two triangles per quad
    pub indices: Vec<u32>,
}

impl LodTopology {
    fn build(base_width: usize, base_height: usize, base_uvs: &[Vec2], level: usize) -> Self {
        let stride = 1usize << level;
        let quads_x = (base_width - 1) / stride;
        let quads_z = (base_height - 1) / stride;
        let width = quads_x + 1;
        let height = quads_z + 1;

        let mut remap = Vec::with_capacity(width * height);
        for y in (0..base_height).step_by(stride) {
            for x in (0..base_width).step_by(stride) {
                remap.push((y * base_width + x) as u32);
            }
        }
        debug_assert_eq!(remap.len(), width * height);

        let uvs = remap.iter().map(|&i| base_uvs[i as usize]).collect();

        let mut indices = Vec::with_capacity(quads_x * quads_z * 6);
        for y in 0..quads_z {
            for x in 0..quads_x {
                let top_left = (y * width + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((y + 1) * width + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    bottom_left,
                    bottom_right,
                    top_right,
                ]);
            }
        }

        Self {
            width,
            height,
            remap,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.remap.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Per-frame attributes for one LOD level
#[derive(Debug, Clone, Default)]
pub struct LodBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// `w` holds the foam factor
    pub tangents: Vec<Vec4>,
}

impl LodBuffers {
    /// Interleave with the level's UVs for a single vertex buffer upload
    pub fn interleave(&self, uvs: &[Vec2]) -> Vec<OceanVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.tangents)
            .zip(uvs)
            .map(|(((p, n), t), uv)| OceanVertex {
                position: p.to_array(),
                normal: n.to_array(),
                tangent: t.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }
}

/// Builds the base tile grid and writes synthesized fields into every LOD
pub struct MeshLodBuilder {
    /// Quads per side of the FFT grid
    grid_width: usize,
    grid_height: usize,
    tile_size: Vec3,
    choppy_scale: f32,
    foam_growth_rate: f32,
    foam_decay_rate: f32,

    base_positions: Vec<Vec3>,
    base_uvs: Vec<Vec2>,
    levels: Vec<LodTopology>,

    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tangents: Vec<Vec4>,
    foam: Vec<f32>,
    lod_buffers: Vec<LodBuffers>,
}

impl MeshLodBuilder {
    /// Build the base grid and every LOD's index remap and triangles
    pub fn build_topology(params: &OceanParameters) -> Self {
        let (geometry_width, geometry_height) = params.geometry_size();
        let grid_width = params.tile_polygon_width;
        let grid_height = params.tile_polygon_height;
        let size = params.tile_size;

        let spacing = Vec2::new(size.x / grid_width as f32, size.z / grid_height as f32);
        let uv_scale = Vec2::new(1.0 / grid_width as f32, 1.0 / grid_height as f32);

        let vertex_count = geometry_width * geometry_height;
        let mut base_positions = Vec::with_capacity(vertex_count);
        let mut base_uvs = Vec::with_capacity(vertex_count);
        for y in 0..geometry_height {
            for x in 0..geometry_width {
                base_positions.push(Vec3::new(x as f32 * spacing.x, 0.0, y as f32 * spacing.y));
                base_uvs.push(Vec2::new(x as f32, y as f32) * uv_scale);
            }
        }

        let levels: Vec<LodTopology> = (0..params.max_lod())
            .map(|level| LodTopology::build(geometry_width, geometry_height, &base_uvs, level))
            .collect();

        let lod_buffers = levels
            .iter()
            .map(|level| LodBuffers {
                positions: vec![Vec3::ZERO; level.vertex_count()],
                normals: vec![Vec3::Y; level.vertex_count()],
                tangents: vec![Vec4::new(1.0, 0.0, 0.0, 0.0); level.vertex_count()],
            })
            .collect();

        Self {
            grid_width,
            grid_height,
            tile_size: size,
            choppy_scale: params.choppy_scale,
            foam_growth_rate: params.foam_growth_rate,
            foam_decay_rate: params.foam_decay_rate,
            positions: base_positions.clone(),
            normals: vec![Vec3::Y; vertex_count],
            tangents: vec![Vec4::new(1.0, 0.0, 0.0, 0.0); vertex_count],
            foam: vec![0.0; vertex_count],
            base_positions,
            base_uvs,
            levels,
            lod_buffers,
        }
    }

    /// Apply non-epoch parameters (choppiness and foam rates)
    pub fn set_surface_params(&mut self, params: &OceanParameters) {
        self.choppy_scale = params.choppy_scale;
        self.foam_growth_rate = params.foam_growth_rate;
        self.foam_decay_rate = params.foam_decay_rate;
    }

    pub fn levels(&self) -> &[LodTopology] {
        &self.levels
    }

    pub fn lod_buffers(&self) -> &[LodBuffers] {
        &self.lod_buffers
    }

    pub fn base_uvs(&self) -> &[Vec2] {
        &self.base_uvs
    }

    /// Full-resolution displaced positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn foam(&self) -> &[f32] {
        &self.foam
    }

    fn geometry_width(&self) -> usize {
        self.grid_width + 1
    }

    fn geometry_height(&self) -> usize {
        self.grid_height + 1
    }

    /// Write one synthesized field into the base grid and all LOD buffers.
    ///
    /// `wave_scale_realtime` scales vertical displacement. The field is already
    /// normalized by the inverse FFT.
    pub fn update_frame(&mut self, field: &WaveField, wave_scale_realtime: f32, dt: f32) -> &[LodBuffers] {
        debug_assert_eq!((field.width, field.height_dim), (self.grid_width, self.grid_height));

        self.displace(field, wave_scale_realtime);
        self.update_tangents_and_foam(dt);
        self.downsample();
        &self.lod_buffers
    }

    fn displace(&mut self, field: &WaveField, wave_scale: f32) {
        let gw = self.geometry_width();
        let gh = self.geometry_height();
        let width = self.grid_width;

        // A flat sea has no slope information to recover
        let scale_inv = if wave_scale.abs() > f32::EPSILON {
            Some(1.0 / wave_scale)
        } else {
            None
        };

        for y in 0..gh {
            // Last row and last column repeat row/column 0 of the periodic field
            let src_y = y % self.grid_height;
            for x in 0..gw {
                let src = src_y * width + x % width;
                let dst = y * gw + x;

                let h = field.height[src];
                let mut vertex = self.base_positions[dst];
                vertex.x += h.im * self.choppy_scale;
                vertex.y = h.re * wave_scale;
                self.positions[dst] = vertex;

                let t = field.tangent_x[src];
                self.normals[dst] = match scale_inv {
                    Some(inv) => Vec3::new(t.re, inv, t.im).normalize_or(Vec3::Y),
                    None => Vec3::Y,
                };
            }
        }
    }

    fn update_tangents_and_foam(&mut self, dt: f32) {
        let gw = self.geometry_width();
        let gh = self.geometry_height();
        let spacing_x = self.tile_size.x / self.grid_width as f32;
        let tile_offset = Vec3::new(self.tile_size.x, 0.0, 0.0);

        for y in 0..gh {
            for x in 0..gw {
                let idx = y * gw + x;
                let vertex = self.positions[idx];

                // The neighbour of the last column is column 1 of the next tile
                let right = if x + 1 < gw {
                    self.positions[idx + 1]
                } else {
                    self.positions[y * gw + 1] + tile_offset
                };

                let delta = right - vertex;
                let compression = delta.x / spacing_x;
                let foam = step_foam(
                    self.foam[idx],
                    compression,
                    dt,
                    self.foam_growth_rate,
                    self.foam_decay_rate,
                );
                self.foam[idx] = foam;

                self.tangents[idx] = delta.normalize_or(Vec3::X).extend(foam);
            }
        }
    }

    fn downsample(&mut self) {
        for (level, buffers) in self.levels.iter().zip(self.lod_buffers.iter_mut()) {
            for (i, &base) in level.remap.iter().enumerate() {
                let base = base as usize;
                buffers.positions[i] = self.positions[base];
                buffers.normals[i] = self.normals[base];
                buffers.tangents[i] = self.tangents[base];
            }
        }
    }
}

/// Advance one vertex's foam given its horizontal compression.
///
/// Folded-over surface (negative compression) resets foam to 1; strongly
/// compressed surface grows foam; anything else decays. Result is in `[0, 2]`.
pub fn step_foam(foam: f32, compression: f32, dt: f32, growth_rate: f32, decay_rate: f32) -> f32 {
    let next = if compression < 0.0 {
        1.0
    } else if compression < 0.5 {
        foam + growth_rate * dt
    } else {
        foam - decay_rate * dt
    };
    if next.is_nan() {
        return 0.0;
    }
    next.clamp(0.0, MAX_FOAM)
}
