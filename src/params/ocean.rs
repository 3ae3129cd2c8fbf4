//! Ocean wave-model parameters and per-frame surface appearance.

use glam::{Vec2, Vec3};

use crate::error::OceanError;

/// Gravitational acceleration used by the spectrum and dispersion relation (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Upper bound on `tiles_count`; the lattice holds `tiles_count²` tiles
pub const MAX_TILES_PER_AXIS: usize = 256;

/// Parameters fixed for one simulation epoch.
///
/// Changing any of these through `OceanSimulation::set_parameters` rebuilds the
/// spectra, mesh topology and foam state before the next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct OceanParameters {
    /// FFT grid width in quads per tile (vertex grid is `width + 1` wide)
    pub tile_polygon_width: usize,

    /// FFT grid height in quads per tile
    pub tile_polygon_height: usize,

    /// Tiles per axis laid out around the origin
    pub tiles_count: usize,

    /// World-space size of one tile in meters (x, vertical scale, z)
    pub tile_size: Vec3,

    /// World height of the water plane (meters)
    pub origin_height: f32,

    /// Wind speed in m/s. Direction is fixed to +X.
    pub wind_speed: f32,

    /// Time multiplier applied to the dispersion phase (dimensionless)
    pub wave_speed: f32,

    /// Vertical displacement scale at full humidity
    pub wave_scale: f32,

    /// Horizontal (choppy) displacement scale
    pub choppy_scale: f32,

    /// Normal-map FFT grid width
    pub normal_map_width: usize,

    /// Normal-map FFT grid height
    pub normal_map_height: usize,

    /// Normal-map tiling factor: the normal spectrum covers `tile_size / scale`
    pub normal_map_scale: u32,

    /// Reflection/refraction render target width (pixels, power of two)
    pub render_texture_width: u32,

    /// Reflection/refraction render target height (pixels, power of two)
    pub render_texture_height: u32,

    /// Render planar reflection and refraction every tick
    pub reflection_enabled: bool,

    /// Foam gained per second while a vertex is compressed
    pub foam_growth_rate: f32,

    /// Foam lost per second while a vertex is relaxed
    pub foam_decay_rate: f32,
}

impl Default for OceanParameters {
    fn default() -> Self {
        Self {
            tile_polygon_width: 32,
            tile_polygon_height: 32,
            tiles_count: 2,
            tile_size: Vec3::new(150.0, 1.0, 150.0),
            origin_height: 0.0,
            wind_speed: 10.0,
            wave_speed: 0.7,
            wave_scale: 0.1,
            choppy_scale: 2.0,
            normal_map_width: 128,
            normal_map_height: 128,
            normal_map_scale: 8,
            render_texture_width: 128,
            render_texture_height: 128,
            reflection_enabled: false,
            foam_growth_rate: 1.0,
            foam_decay_rate: 0.1,
        }
    }
}

impl OceanParameters {
    /// Wind vector (the model restricts wind to the +X axis)
    pub fn wind(&self) -> Vec2 {
        Vec2::new(self.wind_speed, 0.0)
    }

    /// Horizontal tile extent (x, z)
    pub fn tile_extent(&self) -> Vec2 {
        Vec2::new(self.tile_size.x, self.tile_size.z)
    }

    /// Horizontal extent covered by one normal-map period
    pub fn normal_map_extent(&self) -> Vec2 {
        self.tile_extent() / self.normal_map_scale.max(1) as f32
    }

    /// Vertices per tile side in the base grid (x, z)
    pub fn geometry_size(&self) -> (usize, usize) {
        (self.tile_polygon_width + 1, self.tile_polygon_height + 1)
    }

    /// Number of LOD levels.
    ///
    /// Bounded by the tile count squared and by how often the polygon grid can
    /// be halved before a level collapses to a single quad.
    pub fn max_lod(&self) -> usize {
        let by_tiles = self.tiles_count.saturating_mul(self.tiles_count);
        let min_side = self.tile_polygon_width.min(self.tile_polygon_height).max(1);
        let by_grid = min_side.ilog2() as usize + 1;
        by_tiles.min(by_grid).max(1)
    }

    /// Validate configuration before starting or rebuilding a simulation
    pub fn validate(&self) -> Result<(), OceanError> {
        if self.tile_polygon_width == 0 || self.tile_polygon_height == 0 {
            return Err(OceanError::config(format!(
                "tile polygon resolution must be > 0, got {}x{}",
                self.tile_polygon_width, self.tile_polygon_height
            )));
        }
        if self.normal_map_width == 0 || self.normal_map_height == 0 {
            return Err(OceanError::config(format!(
                "normal map resolution must be > 0, got {}x{}",
                self.normal_map_width, self.normal_map_height
            )));
        }
        if self.tiles_count == 0 || self.tiles_count > MAX_TILES_PER_AXIS {
            return Err(OceanError::config(format!(
                "tiles_count must be in 1..={MAX_TILES_PER_AXIS}, got {}",
                self.tiles_count
            )));
        }
        let size = self.tile_size;
        if !(size.x.is_finite() && size.z.is_finite()) || size.x <= 0.0 || size.z <= 0.0 {
            return Err(OceanError::config(format!(
                "tile size must be positive on x and z, got {size}"
            )));
        }
        if self.normal_map_scale == 0 {
            return Err(OceanError::config("normal_map_scale must be > 0"));
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Err(OceanError::config(format!(
                "wind speed must be finite and >= 0, got {}",
                self.wind_speed
            )));
        }
        if self.reflection_enabled
            && (!self.render_texture_width.is_power_of_two()
                || !self.render_texture_height.is_power_of_two())
        {
            return Err(OceanError::config(format!(
                "render texture size must be a power of two, got {}x{}",
                self.render_texture_width, self.render_texture_height
            )));
        }
        Ok(())
    }

    /// True when `other` requires a spectrum/topology rebuild
    pub(crate) fn epoch_differs(&self, other: &Self) -> bool {
        self.tile_polygon_width != other.tile_polygon_width
            || self.tile_polygon_height != other.tile_polygon_height
            || self.tiles_count != other.tiles_count
            || self.tile_size != other.tile_size
            || self.wind_speed != other.wind_speed
            || self.normal_map_width != other.normal_map_width
            || self.normal_map_height != other.normal_map_height
            || self.normal_map_scale != other.normal_map_scale
    }
}

/// Surface colours and lighting pushed to the material sink
#[derive(Debug, Clone, PartialEq)]
pub struct WaterAppearance {
    /// Colour of the surface highlight (`_SurfaceColor`, linear RGBA)
    pub surface_color: [f32; 4],

    /// Colour of the water body (`_WaterColor`, linear RGBA)
    pub water_color: [f32; 4],

    /// Direction the light travels (`_LightDir`), normalized on push
    pub light_direction: Vec3,
}

impl Default for WaterAppearance {
    fn default() -> Self {
        Self {
            surface_color: [1.0, 1.0, 1.0, 1.0],
            water_color: [0.0, 0.0, 1.0, 1.0],
            light_direction: Vec3::new(0.0, -1.0, 0.5),
        }
    }
}
