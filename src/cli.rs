//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::params::{CameraPreset, FixedCamera, HumiditySettings, OceanParameters, OrbitCamera};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "fftocean")]
#[command(about = "Headless FFT ocean surface simulation", long_about = None)]
pub struct Args {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "300")]
    pub ticks: u32,

    /// Time step per tick (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0.0166667")]
    pub dt: f32,

    /// Seed for the spectrum and humidity random draws
    #[arg(long, default_value = "1")]
    pub seed: u64,

    /// Tiles per axis
    #[arg(long, default_value = "2")]
    pub tiles: usize,

    /// Quads per tile side (FFT grid size)
    #[arg(long, value_name = "QUADS", default_value = "32")]
    pub resolution: usize,

    /// Tile edge length (meters)
    #[arg(long, value_name = "METERS", default_value = "150")]
    pub tile_size: f32,

    /// Wind speed along +X (m/s)
    #[arg(long, value_name = "M_PER_S", default_value = "10")]
    pub wind: f32,

    /// Vertical displacement scale at full humidity
    #[arg(long, default_value = "0.1")]
    pub wave_scale: f32,

    /// Hold humidity at maximum
    #[arg(long)]
    pub storm: bool,

    /// Render planar reflection and refraction passes every tick
    #[arg(long)]
    pub reflections: bool,

    /// Camera preset: fixed (default), orbit
    #[arg(long, value_name = "PRESET", default_value = "fixed")]
    pub camera_preset: String,

    /// Camera elevation for the fixed and orbit presets (meters above origin)
    #[arg(long, value_name = "METERS", default_value = "30")]
    pub elevation: f32,

    /// Write the final centre-tile height field as a 16-bit grayscale PNG
    #[arg(long, value_name = "PATH")]
    pub heightmap: Option<PathBuf>,
}

impl Args {
    /// Parse camera preset from command-line arguments
    pub fn parse_camera_preset(&self) -> CameraPreset {
        match self.camera_preset.to_lowercase().as_str() {
            "fixed" => {
                info!("Camera: Fixed (elevation: {}m)", self.elevation);
                let mut fixed = FixedCamera::default();
                fixed.position[1] = self.elevation;
                CameraPreset::Fixed(fixed)
            }
            "orbit" => {
                info!("Camera: Orbit (elevation: {}m)", self.elevation);
                CameraPreset::Orbit(OrbitCamera {
                    altitude_m: self.elevation,
                    ..Default::default()
                })
            }
            other => {
                warn!("Unknown camera preset '{}', using fixed", other);
                CameraPreset::Fixed(FixedCamera::default())
            }
        }
    }

    /// Ocean parameters with command-line overrides applied
    pub fn ocean_parameters(&self) -> OceanParameters {
        let defaults = OceanParameters::default();
        OceanParameters {
            tiles_count: self.tiles,
            tile_polygon_width: self.resolution,
            tile_polygon_height: self.resolution,
            tile_size: glam::Vec3::new(self.tile_size, defaults.tile_size.y, self.tile_size),
            wind_speed: self.wind,
            wave_scale: self.wave_scale,
            reflection_enabled: self.reflections,
            ..defaults
        }
    }

    pub fn humidity_settings(&self) -> HumiditySettings {
        HumiditySettings {
            force_storm: self.storm,
            ..Default::default()
        }
    }
}
