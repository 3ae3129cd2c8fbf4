//! fftocean - headless FFT ocean surface simulation
//!
//! Runs the wave model for a number of ticks against in-memory collaborators,
//! logs per-frame statistics and optionally exports the final height field.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use image::{ImageBuffer, Luma};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use fftocean::camera::CameraSystem;
use fftocean::cli::Args;
use fftocean::headless::HeadlessBackend;
use fftocean::ocean::{LodBuffers, OceanSimulation};
use fftocean::params::{ReflectionSettings, ViewConfig, WaterAppearance};

/// Surface height range seen over a run (meters)
#[derive(Debug, Clone, Copy)]
struct HeightRange {
    min: f32,
    max: f32,
}

impl HeightRange {
    fn new() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    fn include(&mut self, buffers: &LodBuffers) {
        for p in &buffers.positions {
            self.min = self.min.min(p.y);
            self.max = self.max.max(p.y);
        }
    }
}

/// Write heights as 16-bit grayscale, min-max normalized
fn write_heightmap(path: &Path, buffers: &LodBuffers, width: usize, height: usize) -> Result<()> {
    let mut range = HeightRange::new();
    range.include(buffers);
    let span = (range.max - range.min).max(f32::EPSILON);

    let pixels: Vec<u16> = buffers
        .positions
        .iter()
        .map(|p| (((p.y - range.min) / span).clamp(0.0, 1.0) * u16::MAX as f32) as u16)
        .collect();

    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(width as u32, height as u32, pixels)
            .context("height field does not match image dimensions")?;
    image
        .save(path)
        .with_context(|| format!("Failed to write heightmap to {}", path.display()))?;

    info!(
        "Heightmap written to {} ({}x{}, {:.3}m .. {:.3}m)",
        path.display(),
        width,
        height,
        range.min,
        range.max
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("fftocean - headless FFT ocean surface simulation");

    let camera = CameraSystem::new(args.parse_camera_preset(), ViewConfig::default());
    let mut backend = HeadlessBackend::with_camera(camera.camera_state(0.0));

    let mut sim = OceanSimulation::new(
        args.ocean_parameters(),
        WaterAppearance::default(),
        args.humidity_settings(),
        ReflectionSettings::default(),
        StdRng::seed_from_u64(args.seed),
        &mut backend.host(),
    )
    .context("Failed to start ocean simulation")?;

    info!(
        "Simulating {} ticks of {:.4}s: {} tiles, {} LOD levels",
        args.ticks,
        args.dt,
        sim.tiles().len(),
        sim.mesh().levels().len()
    );

    let mut range = HeightRange::new();
    let log_every = (args.ticks / 10).max(1);
    for tick in 0..args.ticks {
        backend.camera.state = Some(camera.camera_state(sim.time_s() + args.dt));
        let report = sim.tick(args.dt, &mut backend.host())?;
        range.include(sim.lod_buffers(0)?);

        if tick % log_every == 0 {
            info!(
                "t={:.2}s humidity={:.3} wave_scale={:.4} reflections={}",
                report.time_s,
                report.humidity,
                report.wave_scale,
                report.reflections.is_some()
            );
        }
    }

    let foam = sim.mesh().foam();
    let foamy = foam.iter().filter(|&&f| f > 0.0).count();
    info!(
        "Heights {:.3}m .. {:.3}m, foam on {}/{} vertices",
        range.min,
        range.max,
        foamy,
        foam.len()
    );
    info!(
        "Uploaded {} tile meshes ({} KiB interleaved), {} offscreen passes",
        backend.meshes.uploads,
        backend.meshes.vertex_bytes() / 1024,
        backend.renderer.passes.len()
    );

    if let Some(path) = &args.heightmap {
        let level = &sim.mesh().levels()[0];
        write_heightmap(path, sim.lod_buffers(0)?, level.width, level.height)?;
    }

    sim.shutdown(&mut backend.host());
    Ok(())
}
