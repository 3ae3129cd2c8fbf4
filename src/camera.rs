//! Camera paths for viewing the ocean from the headless host.

use glam::Vec3;

use crate::host::CameraState;
use crate::params::{CameraPreset, FixedCamera, OrbitCamera, ViewConfig};

/// Camera system following a preset path
pub struct CameraSystem {
    preset: CameraPreset,
    view: ViewConfig,
}

impl CameraSystem {
    /// Create new camera system with specified preset
    pub fn new(preset: CameraPreset, view: ViewConfig) -> Self {
        Self { preset, view }
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Arguments
    /// * `time_s` - Current time in seconds
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        match &self.preset {
            CameraPreset::Fixed(params) => Self::compute_fixed_path(params),
            CameraPreset::Orbit(params) => Self::compute_orbit_path(params, time_s),
        }
    }

    fn compute_fixed_path(p: &FixedCamera) -> (Vec3, Vec3) {
        let eye = Vec3::from_array(p.position);
        let target = Vec3::from_array(p.target);
        (eye, target)
    }

    /// Circle the origin at constant altitude, starting on -Z
    fn compute_orbit_path(p: &OrbitCamera, time_s: f32) -> (Vec3, Vec3) {
        let angle = time_s * p.angular_speed_rad_per_s;
        let eye = Vec3::new(
            p.radius_m * angle.sin(),
            p.altitude_m,
            -p.radius_m * angle.cos(),
        );
        let target = Vec3::new(0.0, p.target_altitude_m, 0.0);
        (eye, target)
    }

    /// Camera snapshot for the given time
    pub fn camera_state(&self, time_s: f32) -> CameraState {
        let (eye, target) = self.compute_position_and_target(time_s);

        // Always keep Y as up vector (camera never rolls)
        CameraState::look_at(
            eye,
            target,
            self.view.fov_degrees.to_radians(),
            self.view.aspect_ratio(),
            self.view.near_plane_m,
            self.view.far_plane_m,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn test_fixed_camera_is_stationary() {
        let camera = CameraSystem::new(CameraPreset::default(), ViewConfig::default());
        let (eye0, target0) = camera.compute_position_and_target(0.0);
        let (eye1, target1) = camera.compute_position_and_target(25.0);
        assert_eq!(eye0, eye1);
        assert_eq!(target0, target1);
        assert_eq!(eye0, Vec3::new(0.0, 30.0, -120.0));
    }

    #[test]
    fn test_orbit_keeps_radius_and_altitude() {
        let params = OrbitCamera::default();
        let camera = CameraSystem::new(CameraPreset::Orbit(params.clone()), ViewConfig::default());

        for t in 0..100 {
            let (eye, target) = camera.compute_position_and_target(t as f32 * 0.7);
            let horizontal = Vec3::new(eye.x, 0.0, eye.z).length();
            assert!((horizontal - params.radius_m).abs() < 1e-2, "radius {horizontal} at t={t}");
            assert_eq!(eye.y, params.altitude_m);
            assert_eq!(target, Vec3::new(0.0, params.target_altitude_m, 0.0));
        }

        // Starts behind the origin on -Z
        let (eye0, _) = camera.compute_position_and_target(0.0);
        assert!((eye0 - Vec3::new(0.0, params.altitude_m, -params.radius_m)).length() < 1e-4);
    }

    #[test]
    fn test_camera_state_generation() {
        let camera = CameraSystem::new(CameraPreset::default(), ViewConfig::default());
        let state = camera.camera_state(0.0);

        // Matrices should not be identity or zero
        assert_ne!(state.world_to_camera, Mat4::IDENTITY);
        assert_ne!(state.projection, Mat4::ZERO);
        assert_eq!(state.position, Vec3::new(0.0, 30.0, -120.0));
        assert!((state.aspect - 1280.0 / 720.0).abs() < 1e-6);

        // Origin is in front of the camera (negative view-space z)
        let origin = state.world_to_camera.transform_point3(Vec3::ZERO);
        assert!(origin.z < 0.0);
    }
}
