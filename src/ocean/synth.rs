//! Time evolution of the wave spectrum and inverse transform to a height field.

use glam::{Vec2, Vec3};
use rustfft::num_complex::Complex32;

use crate::fft::Fft2d;
use crate::params::GRAVITY;
use crate::spectrum::{wave_vector, SpectrumGrid};

/// Spatial-domain output of one synthesis step.
///
/// `height.re` is vertical displacement, `height.im` is the choppy horizontal
/// displacement along X, `tangent_x` holds the surface slope (re: X, im: Z).
#[derive(Debug, Clone)]
pub struct WaveField {
    pub width: usize,
    pub height_dim: usize,
    pub height: Vec<Complex32>,
    pub tangent_x: Vec<Complex32>,
}

impl WaveField {
    fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height_dim: height,
            height: vec![Complex32::new(0.0, 0.0); width * height],
            tangent_x: vec![Complex32::new(0.0, 0.0); width * height],
        }
    }
}

/// Evolves a static spectrum to time `t` and inverse-transforms it.
///
/// Owns its FFT plan and output buffers so a tick allocates nothing.
pub struct WaveFieldSynthesizer {
    wave_vectors: Vec<Vec2>,
    wave_speed: f32,
    fft: Fft2d,
    field: WaveField,
}

impl WaveFieldSynthesizer {
    /// Prepare a synthesizer for a `width × height` grid spanning `extent` meters
    pub fn new(width: usize, height: usize, extent: Vec2, wave_speed: f32) -> Self {
        let mut wave_vectors = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                wave_vectors.push(wave_vector(x, y, width, height, extent));
            }
        }

        Self {
            wave_vectors,
            wave_speed,
            fft: Fft2d::new(width, height),
            field: WaveField::zeros(width, height),
        }
    }

    pub fn set_wave_speed(&mut self, wave_speed: f32) {
        self.wave_speed = wave_speed;
    }

    /// Most recent synthesis result
    pub fn field(&self) -> &WaveField {
        &self.field
    }

    /// Synthesize the spatial height and slope fields at `time` seconds
    pub fn synthesize(&mut self, spectrum: &SpectrumGrid, time: f32) -> &WaveField {
        let width = self.fft.width();
        let height = self.fft.height();
        debug_assert_eq!((spectrum.width, spectrum.height), (width, height));

        for y in 0..height {
            for x in 0..width {
                let idx = width * y + x;
                let k = self.wave_vectors[idx];
                let k_len = k.length();

                let phase = (GRAVITY * k_len).sqrt() * time * self.wave_speed;
                let a = Complex32::new(phase.cos(), phase.sin());
                let b = a.conj();

                let mut h = spectrum.samples[idx] * a
                    + spectrum.samples[spectrum.conjugate_index(x, y)].conj() * b;

                self.field.tangent_x[idx] = h * Complex32::new(0.0, k.x) - h * k.y;

                // Choppy waves: lean crests along the wave direction
                if x + y > 0 {
                    h += h * (k.x / k_len);
                }
                self.field.height[idx] = h;
            }
        }

        self.fft.inverse(&mut self.field.height);
        self.fft.inverse(&mut self.field.tangent_x);
        &self.field
    }

    /// Synthesize unit surface normals for a normal-map grid at `time` seconds
    pub fn synthesize_normal_map(&mut self, spectrum: &SpectrumGrid, time: f32, out: &mut Vec<Vec3>) {
        let field = self.synthesize(spectrum, time);
        out.clear();
        out.extend(
            field
                .tangent_x
                .iter()
                .map(|t| Vec3::new(t.re, 1.0, t.im).normalize()),
        );
    }
}
