//! Separable 2D FFT over row-major complex grids.
//!
//! Convention: the forward transform is unnormalized (`e^{-i}` kernel); the
//! inverse transform uses the `e^{+i}` kernel and scales by `1 / (width * height)`,
//! so `inverse(forward(x)) == x` up to rounding.

use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};

/// Planned 2D transform for a fixed `width × height` grid
pub struct Fft2d {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f32>>,
    row_inverse: Arc<dyn Fft<f32>>,
    col_forward: Arc<dyn Fft<f32>>,
    col_inverse: Arc<dyn Fft<f32>>,
    /// Transposed copy used for the column pass
    transposed: Vec<Complex32>,
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

impl Fft2d {
    pub fn new(width: usize, height: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
            transposed: vec![Complex32::new(0.0, 0.0); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Frequency → spatial domain, normalized by `1 / (width * height)`
    pub fn inverse(&mut self, data: &mut [Complex32]) {
        self.process(data, Direction::Inverse);
        let norm = 1.0 / (self.width * self.height) as f32;
        for value in data.iter_mut() {
            *value *= norm;
        }
    }

    /// Spatial → frequency domain, unnormalized
    pub fn forward(&mut self, data: &mut [Complex32]) {
        self.process(data, Direction::Forward);
    }

    fn process(&mut self, data: &mut [Complex32], direction: Direction) {
        debug_assert_eq!(data.len(), self.width * self.height);
        let (rows, cols) = match direction {
            Direction::Forward => (&self.row_forward, &self.col_forward),
            Direction::Inverse => (&self.row_inverse, &self.col_inverse),
        };

        // Rows are contiguous; rustfft transforms each `width` chunk in turn
        rows.process(data);

        // Columns: transpose, transform each `height` chunk, transpose back
        for y in 0..self.height {
            for x in 0..self.width {
                self.transposed[x * self.height + y] = data[y * self.width + x];
            }
        }
        cols.process(&mut self.transposed);
        for x in 0..self.width {
            for y in 0..self.height {
                data[y * self.width + x] = self.transposed[x * self.height + y];
            }
        }
    }
}
