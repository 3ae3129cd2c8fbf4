//! Phillips-spectrum sampling of initial wave amplitudes.
//!
//! The spectrum is generated once per parameter epoch and is the static
//! amplitude basis for synthesis; only the phase evolves per frame.

use std::f32::consts::PI;

use glam::Vec2;
use rustfft::num_complex::Complex32;

use crate::error::OceanError;
use crate::host::UniformRandomSource;
use crate::params::{OceanParameters, GRAVITY};

/// Row-major grid of complex amplitudes, index `width * y + x`
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumGrid {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<Complex32>,
}

impl SpectrumGrid {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            samples: vec![Complex32::new(0.0, 0.0); width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Complex32 {
        self.samples[self.width * y + x]
    }

    /// Index of the cell holding frequency `(-kx, -ky)`
    pub fn conjugate_index(&self, x: usize, y: usize) -> usize {
        let nx = (self.width - x) % self.width;
        let ny = (self.height - y) % self.height;
        self.width * ny + nx
    }
}

/// Vertex-displacement and normal-map spectra for one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumPair {
    pub vertex: SpectrumGrid,
    pub normal: SpectrumGrid,
}

/// Signed frequency index for grid index `i` on an axis of length `n`
pub fn fold_frequency(i: usize, n: usize) -> f32 {
    if (i as f32) < n as f32 / 2.0 {
        i as f32
    } else {
        i as f32 - n as f32
    }
}

/// Wave vector for cell `(x, y)` of a `width × height` grid covering `extent`
pub fn wave_vector(x: usize, y: usize, width: usize, height: usize, extent: Vec2) -> Vec2 {
    Vec2::new(
        2.0 * PI * fold_frequency(x, width) / extent.x,
        2.0 * PI * fold_frequency(y, height) / extent.y,
    )
}

/// Phillips spectral density for wave vector `k` under `wind`.
///
/// Energy travelling against the wind is damped to 5% to keep the surface
/// from churning. Zero wavenumber and calm wind give zero density.
pub fn phillips(k: Vec2, wind: Vec2) -> f32 {
    let k2 = k.length_squared();
    if k2 == 0.0 {
        return 0.0;
    }
    let wind_len = wind.length();
    if wind_len == 0.0 {
        return 0.0;
    }

    let a = if k.x > 0.0 { 1.0 } else { 0.05 };
    let l = wind_len * wind_len / GRAVITY;
    let k_len = k2.sqrt();
    let alignment = (k / k_len).dot(wind / wind_len);

    a * (-1.0 / (k2 * l * l) - (k_len * 0.1).powi(2)).exp() / (k2 * k2) * alignment * alignment
}

/// Standard normal variate via Box–Muller
pub fn gaussian<R: UniformRandomSource + ?Sized>(rng: &mut R) -> f32 {
    let mut x1 = rng.next_uniform();
    let x2 = rng.next_uniform();
    if x1 == 0.0 {
        x1 = 0.01;
    }
    (-2.0 * x1.ln()).sqrt() * (2.0 * PI * x2).cos()
}

fn sample_grid<R: UniformRandomSource + ?Sized>(
    width: usize,
    height: usize,
    extent: Vec2,
    wind: Vec2,
    rng: &mut R,
) -> SpectrumGrid {
    let mut grid = SpectrumGrid::zeros(width, height);
    for y in 0..height {
        for x in 0..width {
            let k = wave_vector(x, y, width, height, extent);
            let re = gaussian(rng);
            let im = gaussian(rng);
            grid.samples[width * y + x] = Complex32::new(re, im) * (0.707 * phillips(k, wind).sqrt());
        }
    }
    grid
}

/// Sample both spectra for `params`.
///
/// The vertex spectrum is drawn first, then the normal-map spectrum, each in
/// row-major order, so a seeded source reproduces the same grids bit for bit.
pub fn generate<R: UniformRandomSource + ?Sized>(
    params: &OceanParameters,
    rng: &mut R,
) -> Result<SpectrumPair, OceanError> {
    params.validate()?;

    let wind = params.wind();
    let vertex = sample_grid(
        params.tile_polygon_width,
        params.tile_polygon_height,
        params.tile_extent(),
        wind,
        rng,
    );
    let normal = sample_grid(
        params.normal_map_width,
        params.normal_map_height,
        params.normal_map_extent(),
        wind,
        rng,
    );

    log::debug!(
        "Spectrum generated: vertex {}x{}, normal {}x{}, wind {} m/s",
        vertex.width,
        vertex.height,
        normal.width,
        normal.height,
        params.wind_speed
    );

    Ok(SpectrumPair { vertex, normal })
}
