//! Camera presets used by the headless host to look at the ocean.

/// Fixed camera position
#[derive(Debug, Clone)]
pub struct FixedCamera {
    /// Camera position (meters)
    pub position: [f32; 3],

    /// Look-at target (meters)
    pub target: [f32; 3],
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            position: [0.0, 30.0, -120.0], // Above the water, behind the tile lattice
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Camera circling the simulation origin
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Orbit radius (meters)
    pub radius_m: f32,

    /// Altitude above the water plane (meters)
    pub altitude_m: f32,

    /// Angular speed (radians per second)
    pub angular_speed_rad_per_s: f32,

    /// Altitude of the look-at point (meters)
    pub target_altitude_m: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius_m: 200.0,
            altitude_m: 40.0,
            angular_speed_rad_per_s: 0.1,
            target_altitude_m: 0.0,
        }
    }
}

/// Camera preset selection
#[derive(Debug, Clone)]
pub enum CameraPreset {
    /// Stationary camera
    Fixed(FixedCamera),

    /// Slow orbit around the tile lattice
    Orbit(OrbitCamera),
}

impl Default for CameraPreset {
    fn default() -> Self {
        Self::Fixed(FixedCamera::default())
    }
}
