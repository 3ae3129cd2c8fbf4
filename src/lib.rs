//! fftocean library - FFT ocean surface simulation
//!
//! A Phillips-spectrum wave model evolved in the frequency domain, transformed
//! to a height field with an inverse 2D FFT, written into tiled multi-LOD
//! meshes with foam, plus planar reflection/refraction projection.

pub mod camera;
pub mod cli;
pub mod error;
pub mod fft;
pub mod headless;
pub mod host;
pub mod humidity;
pub mod ocean;
pub mod params;
pub mod reflection;
pub mod spectrum;

pub use error::OceanError;
