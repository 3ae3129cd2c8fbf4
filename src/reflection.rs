//! Planar reflection and refraction passes for the water surface.
//!
//! Both passes render through an oblique projection whose near plane is the
//! water plane, so nothing on the wrong side of the surface leaks into the
//! textures. The reflection pass additionally mirrors the view about the plane.

use glam::{Mat4, Vec3, Vec4};

use crate::error::OceanError;
use crate::host::{
    CameraState, Host, MaterialSink, PassKind, RenderPass, RenderTargetAllocator,
    RenderTargetDesc, TextureHandle, WrapMode,
};
use crate::params::ReflectionSettings;

pub const REFLECTION_UNIFORM: &str = "_Reflection";
pub const REFRACTION_UNIFORM: &str = "_Refraction";
pub const MATERIAL_SIZE_UNIFORM: &str = "_MaterialSize";

/// Reflection matrix about `plane = (n, d)` where `n·p + d = 0` and `n` is unit length
pub fn reflection_matrix(plane: Vec4) -> Mat4 {
    let (x, y, z, w) = (plane.x, plane.y, plane.z, plane.w);
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * x * x, -2.0 * y * x, -2.0 * z * x, 0.0),
        Vec4::new(-2.0 * x * y, 1.0 - 2.0 * y * y, -2.0 * z * y, 0.0),
        Vec4::new(-2.0 * x * z, -2.0 * y * z, 1.0 - 2.0 * z * z, 0.0),
        Vec4::new(-2.0 * w * x, -2.0 * w * y, -2.0 * w * z, 1.0),
    )
}

/// Plane through `position` with `normal`, expressed in the space of `world_to_camera`.
///
/// The plane is pushed `offset` along the normal; `side_sign` flips which half
/// space is kept.
pub fn camera_space_plane(
    world_to_camera: &Mat4,
    position: Vec3,
    normal: Vec3,
    side_sign: f32,
    offset: f32,
) -> Vec4 {
    let offset_position = position + normal * offset;
    let camera_position = world_to_camera.transform_point3(offset_position);
    let camera_normal = world_to_camera.transform_vector3(normal).normalize() * side_sign;
    camera_normal.extend(-camera_position.dot(camera_normal))
}

fn sgn(a: f32) -> f32 {
    if a > 0.0 {
        1.0
    } else if a < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Replace the near plane of an OpenGL-style `projection` with `clip_plane`
/// (camera space), keeping the far plane as close to intact as possible.
pub fn oblique_projection(projection: Mat4, clip_plane: Vec4) -> Mat4 {
    let q = projection.inverse() * Vec4::new(sgn(clip_plane.x), sgn(clip_plane.y), 1.0, 1.0);
    let c = clip_plane * (2.0 / clip_plane.dot(q));

    // Third row becomes c - fourth row
    let mut rows = projection.transpose();
    rows.z_axis = c - rows.w_axis;
    rows.transpose()
}

/// Handles of the two offscreen targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionTargets {
    pub reflection: TextureHandle,
    pub refraction: TextureHandle,
}

/// Camera setup for one offscreen pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassView {
    pub world_to_camera: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

/// Owns the reflection/refraction render targets and builds their passes
#[derive(Debug)]
pub struct PlanarReflectionProjector {
    settings: ReflectionSettings,
    width: u32,
    height: u32,
    material_size: Vec4,
    targets: Option<ReflectionTargets>,
}

impl PlanarReflectionProjector {
    pub fn new(settings: ReflectionSettings, width: u32, height: u32, material_size: Vec4) -> Self {
        Self {
            settings,
            width,
            height,
            material_size,
            targets: None,
        }
    }

    pub fn targets(&self) -> Option<ReflectionTargets> {
        self.targets
    }

    pub fn settings(&self) -> &ReflectionSettings {
        &self.settings
    }

    /// Store the tile size pushed as `_MaterialSize`, updating the material
    /// right away when targets are bound to it
    pub fn set_material_size(&mut self, material_size: Vec4, material: &mut dyn MaterialSink) {
        self.material_size = material_size;
        if self.targets.is_some() {
            material.set_vector(MATERIAL_SIZE_UNIFORM, material_size);
        }
    }

    /// Change target resolution, releasing targets allocated at the old size
    pub fn resize(&mut self, width: u32, height: u32, allocator: &mut dyn RenderTargetAllocator) {
        if (width, height) != (self.width, self.height) {
            self.release(allocator);
            self.width = width;
            self.height = height;
        }
    }

    fn desc(&self) -> RenderTargetDesc {
        RenderTargetDesc {
            width: self.width,
            height: self.height,
            format: self.settings.color_format,
            wrap: WrapMode::Clamp,
            power_of_two: true,
        }
    }

    /// Allocate both targets if needed and bind them to the material.
    ///
    /// On failure nothing stays allocated.
    pub fn ensure_targets(
        &mut self,
        allocator: &mut dyn RenderTargetAllocator,
        material: &mut dyn MaterialSink,
    ) -> Result<ReflectionTargets, OceanError> {
        if let Some(targets) = self.targets {
            return Ok(targets);
        }

        let desc = self.desc();
        let reflection = allocator
            .allocate(desc)
            .map_err(|e| OceanError::ResourceExhaustion(e.0))?;
        let refraction = match allocator.allocate(desc) {
            Ok(handle) => handle,
            Err(e) => {
                allocator.release(reflection);
                return Err(OceanError::ResourceExhaustion(e.0));
            }
        };

        material.set_texture(REFLECTION_UNIFORM, reflection);
        material.set_texture(REFRACTION_UNIFORM, refraction);
        material.set_vector(MATERIAL_SIZE_UNIFORM, self.material_size);

        log::debug!(
            "Allocated reflection targets {}x{}: {:?} / {:?}",
            self.width,
            self.height,
            reflection,
            refraction
        );

        let targets = ReflectionTargets {
            reflection,
            refraction,
        };
        self.targets = Some(targets);
        Ok(targets)
    }

    /// Release both targets. Safe to call when nothing is allocated.
    pub fn release(&mut self, allocator: &mut dyn RenderTargetAllocator) {
        if let Some(targets) = self.targets.take() {
            allocator.release(targets.reflection);
            allocator.release(targets.refraction);
            log::debug!("Released reflection targets");
        }
    }

    fn water_plane(water_height: f32) -> (Vec3, Vec3) {
        (Vec3::new(0.0, water_height, 0.0), Vec3::Y)
    }

    /// Mirrored view for the reflection pass
    pub fn reflection_view(&self, camera: &CameraState, water_height: f32) -> PassView {
        let (position, normal) = Self::water_plane(water_height);
        let offset = self.settings.clip_plane_offset_m;

        let d = -normal.dot(position) - offset;
        let reflection = reflection_matrix(normal.extend(d));

        let world_to_camera = camera.world_to_camera * reflection;
        let clip_plane = camera_space_plane(&world_to_camera, position, normal, 1.0, offset);

        PassView {
            world_to_camera,
            projection: oblique_projection(camera.projection, clip_plane),
            position: reflection.transform_point3(camera.position),
        }
    }

    /// Un-mirrored view clipped to the underwater side for the refraction pass
    pub fn refraction_view(&self, camera: &CameraState, water_height: f32) -> PassView {
        let (position, normal) = Self::water_plane(water_height);
        let offset = self.settings.clip_plane_offset_m;

        let clip_plane =
            camera_space_plane(&camera.world_to_camera, position, normal, -1.0, offset);

        PassView {
            world_to_camera: camera.world_to_camera,
            projection: oblique_projection(camera.projection, clip_plane),
            position: camera.position,
        }
    }

    /// Render reflection then refraction into the owned targets
    pub fn render(
        &mut self,
        camera: &CameraState,
        water_height: f32,
        host: &mut Host<'_>,
    ) -> Result<ReflectionTargets, OceanError> {
        let targets = self.ensure_targets(host.allocator, host.material)?;

        let reflection = self.reflection_view(camera, water_height);
        host.renderer.render(&RenderPass {
            kind: PassKind::Reflection,
            target: targets.reflection,
            world_to_camera: reflection.world_to_camera,
            projection: reflection.projection,
            camera_position: reflection.position,
            camera_rotation: camera.rotation,
            invert_culling: true,
        });

        let refraction = self.refraction_view(camera, water_height);
        host.renderer.render(&RenderPass {
            kind: PassKind::Refraction,
            target: targets.refraction,
            world_to_camera: refraction.world_to_camera,
            projection: refraction.projection,
            camera_position: refraction.position,
            camera_rotation: camera.rotation,
            invert_culling: false,
        });

        Ok(targets)
    }
}
