//! Parameter definitions with physical units and documented semantics.
//!
//! All tunables live here with:
//! - Physical units (meters, seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - Validation where a bad value would poison the simulation

mod camera;
mod ocean;
mod render;
mod weather;

// Re-export all types
pub use camera::{CameraPreset, FixedCamera, OrbitCamera};
pub use ocean::{OceanParameters, WaterAppearance, GRAVITY, MAX_TILES_PER_AXIS};
pub use render::{ColorFormat, ReflectionSettings, ViewConfig};
pub use weather::HumiditySettings;
