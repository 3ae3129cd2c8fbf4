//! FFT ocean surface: spectrum evolution, tiled LOD meshes and the per-frame driver.

mod mesh;
mod synth;
mod system;
mod tiles;

pub use mesh::{step_foam, LodBuffers, LodTopology, MeshLodBuilder, OceanVertex, MAX_FOAM};
pub use synth::{WaveField, WaveFieldSynthesizer};
pub use system::{
    FrameReport, OceanSimulation, LIGHT_DIR_UNIFORM, SURFACE_COLOR_UNIFORM, WATER_COLOR_UNIFORM,
};
pub use tiles::{TileLattice, WaveTile};
