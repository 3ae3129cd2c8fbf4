//! View and planar reflection configuration.

/// Pixel format requested for reflection/refraction targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorFormat {
    #[default]
    Rgba8,
    Rgba16Float,
}

/// Planar reflection settings that do not require a simulation epoch
#[derive(Debug, Clone)]
pub struct ReflectionSettings {
    /// Distance the oblique clip plane is pushed along the water normal (meters).
    /// Hides seams where geometry touches the surface.
    pub clip_plane_offset_m: f32,

    /// Colour format of both render targets
    pub color_format: ColorFormat,
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            clip_plane_offset_m: 0.02,
            color_format: ColorFormat::Rgba8,
        }
    }
}

/// Main view configuration
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Viewport width (pixels)
    pub width: u32,

    /// Viewport height (pixels)
    pub height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov_degrees: 60.0,
            near_plane_m: 0.3,
            far_plane_m: 1000.0,
        }
    }
}

impl ViewConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}
