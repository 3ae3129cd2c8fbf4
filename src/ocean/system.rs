//! Simulation context driving one ocean through its per-frame stages.

use glam::{Vec3, Vec4};
use log::{debug, warn};

use super::mesh::{LodBuffers, MeshLodBuilder};
use super::synth::WaveFieldSynthesizer;
use super::tiles::TileLattice;
use crate::error::OceanError;
use crate::host::{Host, MaterialSink, MeshSink, TileAttributes, TileId, UniformRandomSource};
use crate::humidity::{wave_scale_for, HumidityModulator};
use crate::params::{HumiditySettings, OceanParameters, ReflectionSettings, WaterAppearance};
use crate::reflection::{PlanarReflectionProjector, ReflectionTargets};
use crate::spectrum::{self, SpectrumPair};

pub const SURFACE_COLOR_UNIFORM: &str = "_SurfaceColor";
pub const WATER_COLOR_UNIFORM: &str = "_WaterColor";
pub const LIGHT_DIR_UNIFORM: &str = "_LightDir";

/// Summary of one completed tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Simulation time the surface was synthesized at (seconds)
    pub time_s: f32,
    pub humidity: f32,

    /// Vertical displacement scale applied this tick
    pub wave_scale: f32,

    /// Targets rendered this tick, `None` when reflections were skipped
    pub reflections: Option<ReflectionTargets>,
}

/// Owns every piece of per-ocean state.
///
/// Collaborators are borrowed per call through [`Host`]; the simulation keeps
/// no references to them between calls.
pub struct OceanSimulation<R: UniformRandomSource> {
    params: OceanParameters,
    appearance: WaterAppearance,
    humidity_settings: HumiditySettings,

    spectra: SpectrumPair,
    vertex_synth: WaveFieldSynthesizer,
    normal_synth: WaveFieldSynthesizer,
    mesh: MeshLodBuilder,
    tiles: TileLattice,
    humidity: HumidityModulator,
    projector: PlanarReflectionProjector,

    rng: R,
    time_s: f32,
    ready: bool,
    /// Every tile's topology is currently held by the mesh sink
    topology_uploaded: bool,
    normal_map: Vec<Vec3>,
}

fn material_size(params: &OceanParameters) -> Vec4 {
    params.tile_size.extend(0.0)
}

impl<R: UniformRandomSource> OceanSimulation<R> {
    /// Validate parameters, sample the spectra and upload tile topology.
    ///
    /// Fails with [`OceanError::Configuration`] on invalid parameters or when
    /// the host has no active camera.
    pub fn new(
        params: OceanParameters,
        appearance: WaterAppearance,
        humidity_settings: HumiditySettings,
        reflection: ReflectionSettings,
        mut rng: R,
        host: &mut Host<'_>,
    ) -> Result<Self, OceanError> {
        params.validate()?;
        if host.camera.active_camera().is_none() {
            return Err(OceanError::config("no active camera to view the ocean through"));
        }

        let spectra = spectrum::generate(&params, &mut rng)?;
        let humidity = HumidityModulator::new(humidity_settings.update_frequency_hz, &mut rng);
        let projector = PlanarReflectionProjector::new(
            reflection,
            params.render_texture_width,
            params.render_texture_height,
            material_size(&params),
        );

        let mut sim = Self {
            vertex_synth: Self::vertex_synth(&params),
            normal_synth: Self::normal_synth(&params),
            mesh: MeshLodBuilder::build_topology(&params),
            tiles: TileLattice::new(&params),
            spectra,
            humidity,
            projector,
            params,
            appearance,
            humidity_settings,
            rng,
            time_s: 0.0,
            ready: false,
            topology_uploaded: false,
            normal_map: Vec::new(),
        };

        sim.push_appearance(host.material);
        sim.upload_topology(host.meshes);

        if sim.params.reflection_enabled {
            if let Err(e) = sim.projector.ensure_targets(host.allocator, host.material) {
                warn!("Reflections unavailable at start-up: {e}");
            }
        }

        debug!(
            "Ocean started: {} tiles, {} LOD levels, grid {}x{}",
            sim.tiles.len(),
            sim.mesh.levels().len(),
            sim.params.tile_polygon_width,
            sim.params.tile_polygon_height
        );

        Ok(sim)
    }

    fn vertex_synth(params: &OceanParameters) -> WaveFieldSynthesizer {
        WaveFieldSynthesizer::new(
            params.tile_polygon_width,
            params.tile_polygon_height,
            params.tile_extent(),
            params.wave_speed,
        )
    }

    fn normal_synth(params: &OceanParameters) -> WaveFieldSynthesizer {
        WaveFieldSynthesizer::new(
            params.normal_map_width,
            params.normal_map_height,
            params.normal_map_extent(),
            params.wave_speed,
        )
    }

    fn push_appearance(&self, material: &mut dyn MaterialSink) {
        material.set_color(SURFACE_COLOR_UNIFORM, self.appearance.surface_color);
        material.set_color(WATER_COLOR_UNIFORM, self.appearance.water_color);
        let light = self
            .appearance
            .light_direction
            .normalize_or(Vec3::NEG_Y)
            .extend(0.0);
        material.set_vector(LIGHT_DIR_UNIFORM, light);
    }

    fn upload_topology(&mut self, meshes: &mut dyn MeshSink) {
        let levels = self.mesh.levels();
        for (id, tile) in self.tiles.iter() {
            let level = &levels[tile.lod];
            meshes.set_topology(id, tile.offset, &level.uvs, &level.indices);
        }
        self.topology_uploaded = true;
    }

    fn remove_topology(&mut self, meshes: &mut dyn MeshSink) {
        for (id, _) in self.tiles.iter() {
            meshes.remove_tile(id);
        }
        self.topology_uploaded = false;
    }

    pub fn params(&self) -> &OceanParameters {
        &self.params
    }

    pub fn appearance(&self) -> &WaterAppearance {
        &self.appearance
    }

    pub fn time_s(&self) -> f32 {
        self.time_s
    }

    /// True once a tick has completed since the last epoch
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn tiles(&self) -> &TileLattice {
        &self.tiles
    }

    pub fn mesh(&self) -> &MeshLodBuilder {
        &self.mesh
    }

    /// Normal-map normals from the latest tick, row-major
    pub fn normal_map(&self) -> Result<&[Vec3], OceanError> {
        if !self.ready {
            return Err(OceanError::NotReady);
        }
        Ok(&self.normal_map)
    }

    /// Buffers for LOD `lod`, valid after the first tick
    pub fn lod_buffers(&self, lod: usize) -> Result<&LodBuffers, OceanError> {
        if !self.ready {
            return Err(OceanError::NotReady);
        }
        self.mesh
            .lod_buffers()
            .get(lod)
            .ok_or_else(|| OceanError::OutOfRange(format!("LOD level {lod}")))
    }

    /// Buffers drawn by tile `id`, valid after the first tick
    pub fn tile_buffers(&self, id: TileId) -> Result<&LodBuffers, OceanError> {
        let lod = self
            .tiles
            .iter()
            .find(|(tile_id, _)| *tile_id == id)
            .map(|(_, tile)| tile.lod)
            .ok_or_else(|| OceanError::OutOfRange(format!("tile {}", id.0)))?;
        self.lod_buffers(lod)
    }

    /// Advance by `dt` seconds and run every per-frame stage
    pub fn tick(&mut self, dt: f32, host: &mut Host<'_>) -> Result<FrameReport, OceanError> {
        if !self.topology_uploaded {
            self.upload_topology(host.meshes);
        }

        let dt = dt.max(0.0);
        self.time_s += dt;
        let now = self.time_s;

        let humidity = self
            .humidity
            .tick(now, self.humidity_settings.force_storm, &mut self.rng);
        let wave_scale = wave_scale_for(humidity, self.params.wave_scale);

        let field = self.vertex_synth.synthesize(&self.spectra.vertex, now);
        self.mesh.update_frame(field, wave_scale, dt);
        self.normal_synth
            .synthesize_normal_map(&self.spectra.normal, now, &mut self.normal_map);

        let buffers = self.mesh.lod_buffers();
        for lod in 0..buffers.len() {
            let level = &buffers[lod];
            for (id, _) in self.tiles.at_lod(lod) {
                host.meshes.update_attributes(
                    id,
                    TileAttributes {
                        positions: &level.positions,
                        normals: &level.normals,
                        tangents: &level.tangents,
                    },
                );
            }
        }
        self.ready = true;

        let reflections = if self.params.reflection_enabled {
            match host.camera.active_camera() {
                Some(_) => match self.render_reflections(host) {
                    Ok(targets) => Some(targets),
                    Err(OceanError::ResourceExhaustion(msg)) => {
                        warn!("Skipping reflections this frame: {msg}");
                        None
                    }
                    Err(e) => return Err(e),
                },
                None => {
                    debug!("No active camera, skipping reflections");
                    None
                }
            }
        } else {
            None
        };

        Ok(FrameReport {
            time_s: now,
            humidity,
            wave_scale,
            reflections,
        })
    }

    /// Render reflection and refraction for the host's active camera
    pub fn render_reflections(&mut self, host: &mut Host<'_>) -> Result<ReflectionTargets, OceanError> {
        if !self.ready {
            return Err(OceanError::NotReady);
        }
        let camera = host
            .camera
            .active_camera()
            .ok_or_else(|| OceanError::config("no active camera for reflections"))?;
        self.projector
            .render(&camera, self.params.origin_height, host)
    }

    /// Apply new parameters.
    ///
    /// Grid, tile, wind and normal-map changes start a new epoch: the old
    /// tiles are removed from the mesh sink, spectra, topology and foam are
    /// rebuilt and the simulation is not ready until the next tick. A new
    /// water height re-places the tiles. Other changes take effect on the
    /// next tick.
    pub fn set_parameters(&mut self, params: OceanParameters, host: &mut Host<'_>) -> Result<(), OceanError> {
        params.validate()?;

        if params.epoch_differs(&self.params) {
            let spectra = spectrum::generate(&params, &mut self.rng)?;
            self.remove_topology(host.meshes);
            self.spectra = spectra;
            self.vertex_synth = Self::vertex_synth(&params);
            self.normal_synth = Self::normal_synth(&params);
            self.mesh = MeshLodBuilder::build_topology(&params);
            self.tiles = TileLattice::new(&params);
            self.normal_map.clear();
            self.ready = false;
            debug!(
                "Ocean epoch rebuilt: grid {}x{}, {} tiles",
                params.tile_polygon_width,
                params.tile_polygon_height,
                self.tiles.len()
            );
        } else {
            self.vertex_synth.set_wave_speed(params.wave_speed);
            self.normal_synth.set_wave_speed(params.wave_speed);
            self.mesh.set_surface_params(&params);
            if params.origin_height != self.params.origin_height {
                self.tiles = TileLattice::new(&params);
                self.topology_uploaded = false;
            }
        }

        if params.reflection_enabled {
            self.projector.resize(
                params.render_texture_width,
                params.render_texture_height,
                host.allocator,
            );
        } else {
            self.projector.release(host.allocator);
        }
        self.projector
            .set_material_size(material_size(&params), host.material);

        self.params = params;
        if !self.topology_uploaded {
            self.upload_topology(host.meshes);
        }
        Ok(())
    }

    pub fn set_humidity_settings(&mut self, settings: HumiditySettings) {
        self.humidity.set_update_frequency(settings.update_frequency_hz);
        self.humidity_settings = settings;
    }

    pub fn set_force_storm(&mut self, force_storm: bool) {
        self.humidity_settings.force_storm = force_storm;
    }

    pub fn set_water_colors(&mut self, surface: [f32; 4], water: [f32; 4], material: &mut dyn MaterialSink) {
        self.appearance.surface_color = surface;
        self.appearance.water_color = water;
        self.push_appearance(material);
    }

    pub fn set_light_direction(&mut self, direction: Vec3, material: &mut dyn MaterialSink) {
        self.appearance.light_direction = direction;
        self.push_appearance(material);
    }

    /// Release every render target and remove every tile from the mesh sink.
    /// The simulation can keep ticking; tiles are re-uploaded and targets
    /// reallocated on demand.
    pub fn shutdown(&mut self, host: &mut Host<'_>) {
        self.projector.release(host.allocator);
        self.remove_topology(host.meshes);
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{FailingAllocator, HeadlessBackend};
    use crate::host::{CameraState, Host};
    use crate::reflection::{MATERIAL_SIZE_UNIFORM, REFLECTION_UNIFORM, REFRACTION_UNIFORM};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn camera() -> CameraState {
        CameraState::look_at(
            Vec3::new(0.0, 20.0, -40.0),
            Vec3::ZERO,
            60f32.to_radians(),
            16.0 / 9.0,
            0.3,
            1000.0,
        )
    }

    fn small_params() -> OceanParameters {
        OceanParameters {
            tile_polygon_width: 4,
            tile_polygon_height: 4,
            tiles_count: 2,
            tile_size: Vec3::new(10.0, 1.0, 10.0),
            wind_speed: 10.0,
            normal_map_width: 8,
            normal_map_height: 8,
            normal_map_scale: 2,
            render_texture_width: 64,
            render_texture_height: 64,
            ..Default::default()
        }
    }

    fn start(
        params: OceanParameters,
        backend: &mut HeadlessBackend,
    ) -> OceanSimulation<StdRng> {
        OceanSimulation::new(
            params,
            WaterAppearance::default(),
            HumiditySettings::default(),
            ReflectionSettings::default(),
            StdRng::seed_from_u64(42),
            &mut backend.host(),
        )
        .unwrap()
    }

    /// Numerical Recipes LCG with 24-bit uniforms
    struct Lcg(u32);

    impl UniformRandomSource for Lcg {
        fn next_uniform(&mut self) -> f32 {
            self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (self.0 >> 8) as f32 / (1u32 << 24) as f32
        }
    }

    #[test]
    fn test_seeded_field_and_flat_sea_with_zero_wave_scale() {
        // Row-major (re, im) heights for small_params() at t = 0 from Lcg(12345)
        const EXPECTED: [(f32, f32); 16] = [
            (0.141156, -0.293246),
            (0.335292, 0.122799),
            (-0.145612, 0.293246),
            (-0.330837, -0.122799),
            (0.184123, -0.211660),
            (0.207178, 0.157846),
            (-0.182824, 0.211660),
            (-0.208476, -0.157846),
            (0.052962, -0.136775),
            (0.110293, 0.057809),
            (-0.049987, 0.136775),
            (-0.113269, -0.057809),
            (-0.040084, -0.194375),
            (0.183292, -0.000297),
            (0.040266, 0.194375),
            (-0.183473, 0.000297),
        ];

        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            wave_scale: 0.0,
            ..small_params()
        };
        let mut sim = OceanSimulation::new(
            params,
            WaterAppearance::default(),
            HumiditySettings::default(),
            ReflectionSettings::default(),
            Lcg(12345),
            &mut backend.host(),
        )
        .unwrap();

        let report = sim.tick(0.0, &mut backend.host()).unwrap();
        assert_eq!(report.time_s, 0.0);
        assert_eq!(report.wave_scale, 0.0);

        let field = sim.vertex_synth.field();
        assert_eq!(field.height.len(), EXPECTED.len());
        for (i, (h, &(re, im))) in field.height.iter().zip(EXPECTED.iter()).enumerate() {
            assert!((h.re - re).abs() < 1e-4, "re[{i}] = {} expected {re}", h.re);
            assert!((h.im - im).abs() < 1e-4, "im[{i}] = {} expected {im}", h.im);
        }

        // The DC term is zero, so the field has zero mean
        let mean_re: f32 = field.height.iter().map(|h| h.re).sum();
        assert!(mean_re.abs() < 1e-4);

        let buffers = sim.lod_buffers(0).unwrap();
        assert_eq!(buffers.positions.len(), 25);
        assert!(buffers.positions.iter().all(|p| p.y == 0.0));
        assert!(buffers.normals.iter().all(|n| *n == Vec3::Y));

        // Every tile received the same flat heights
        for stored in backend.meshes.tiles.values() {
            assert!(!stored.vertices.is_empty());
            assert!(stored.vertices.iter().all(|v| v.position[1] == 0.0));
        }
    }

    #[test]
    fn test_buffers_not_ready_before_first_tick() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);

        assert_eq!(sim.lod_buffers(0).unwrap_err(), OceanError::NotReady);
        assert_eq!(sim.tile_buffers(TileId(0)).unwrap_err(), OceanError::NotReady);
        assert_eq!(
            sim.render_reflections(&mut backend.host()).unwrap_err(),
            OceanError::NotReady
        );

        sim.tick(0.016, &mut backend.host()).unwrap();
        assert!(sim.is_ready());
        assert!(sim.tile_buffers(TileId(3)).is_ok());
        assert_eq!(sim.normal_map().unwrap().len(), 64);
    }

    #[test]
    fn test_missing_camera_is_configuration_error() {
        let mut backend = HeadlessBackend::default();
        let result = OceanSimulation::new(
            small_params(),
            WaterAppearance::default(),
            HumiditySettings::default(),
            ReflectionSettings::default(),
            StdRng::seed_from_u64(1),
            &mut backend.host(),
        );
        assert!(matches!(result, Err(OceanError::Configuration(_))));
    }

    #[test]
    fn test_start_uploads_topology_and_appearance() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let sim = start(small_params(), &mut backend);

        assert_eq!(backend.meshes.tiles.len(), 4);
        let centre = &backend.meshes.tiles[&TileId(3)];
        assert_eq!(centre.offset, Vec3::ZERO);
        assert_eq!(centre.indices.len(), 4 * 4 * 2 * 3);

        assert_eq!(
            backend.material.colors.get(SURFACE_COLOR_UNIFORM),
            Some(&sim.appearance().surface_color)
        );
        assert!(backend.material.colors.contains_key(WATER_COLOR_UNIFORM));
        let light = backend.material.vectors[LIGHT_DIR_UNIFORM];
        assert!((light.truncate().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tick_renders_reflections_when_enabled() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            reflection_enabled: true,
            ..small_params()
        };
        let mut sim = start(params, &mut backend);
        assert_eq!(backend.allocator.live.len(), 2);

        let report = sim.tick(0.016, &mut backend.host()).unwrap();
        let targets = report.reflections.unwrap();
        assert_eq!(backend.renderer.passes.len(), 2);
        assert_eq!(backend.material.textures[REFLECTION_UNIFORM], targets.reflection);
        assert_eq!(backend.material.textures[REFRACTION_UNIFORM], targets.refraction);
    }

    #[test]
    fn test_allocation_failure_skips_reflections() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut allocator = FailingAllocator::after(1);
        let params = OceanParameters {
            reflection_enabled: true,
            ..small_params()
        };

        let mut host = Host {
            allocator: &mut allocator,
            material: &mut backend.material,
            meshes: &mut backend.meshes,
            camera: &backend.camera,
            renderer: &mut backend.renderer,
        };
        let mut sim = OceanSimulation::new(
            params,
            WaterAppearance::default(),
            HumiditySettings::default(),
            ReflectionSettings::default(),
            StdRng::seed_from_u64(3),
            &mut host,
        )
        .unwrap();

        let report = sim.tick(0.016, &mut host).unwrap();
        assert!(report.reflections.is_none());
        assert!(sim.is_ready());
        assert!(backend.renderer.passes.is_empty());
        assert!(allocator.inner.live.is_empty());
    }

    #[test]
    fn test_epoch_rebuild_clears_ready() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();
        assert!(sim.is_ready());

        // Non-epoch change keeps the current buffers
        let calmer = OceanParameters {
            choppy_scale: 0.5,
            ..small_params()
        };
        sim.set_parameters(calmer, &mut backend.host()).unwrap();
        assert!(sim.is_ready());

        let finer = OceanParameters {
            tile_polygon_width: 8,
            tile_polygon_height: 8,
            ..small_params()
        };
        sim.set_parameters(finer, &mut backend.host()).unwrap();
        assert!(!sim.is_ready());
        assert_eq!(sim.lod_buffers(0).unwrap_err(), OceanError::NotReady);

        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(sim.lod_buffers(0).unwrap().positions.len(), 81);
        assert_eq!(backend.meshes.tiles[&TileId(3)].indices.len(), 8 * 8 * 2 * 3);
    }

    #[test]
    fn test_invalid_parameters_rejected_without_change() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);
        let bad = OceanParameters {
            tile_size: Vec3::new(-1.0, 1.0, 10.0),
            ..small_params()
        };
        assert!(sim.set_parameters(bad, &mut backend.host()).is_err());
        assert_eq!(sim.params(), &small_params());
    }

    #[test]
    fn test_disabling_reflections_releases_targets() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            reflection_enabled: true,
            ..small_params()
        };
        let mut sim = start(params, &mut backend);
        assert_eq!(backend.allocator.live.len(), 2);

        sim.set_parameters(small_params(), &mut backend.host()).unwrap();
        assert!(backend.allocator.live.is_empty());
        assert_eq!(backend.allocator.released.len(), 2);
    }

    #[test]
    fn test_shutdown_releases_targets() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            reflection_enabled: true,
            ..small_params()
        };
        let mut sim = start(params, &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();

        sim.shutdown(&mut backend.host());
        assert!(backend.allocator.live.is_empty());
        assert!(backend.meshes.tiles.is_empty());
        assert!(!sim.is_ready());

        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(backend.meshes.tiles.len(), 4);
        assert!(backend
            .meshes
            .tiles
            .values()
            .all(|t| t.vertices.len() == 25 || t.vertices.len() == 9));
    }

    #[test]
    fn test_storm_uses_full_wave_scale() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);
        sim.set_force_storm(true);

        for _ in 0..5 {
            let report = sim.tick(0.5, &mut backend.host()).unwrap();
            assert_eq!(report.humidity, 1.0);
            assert_eq!(report.wave_scale, sim.params().wave_scale);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut a = HeadlessBackend::with_camera(camera());
        let mut b = HeadlessBackend::with_camera(camera());
        let mut sim_a = start(small_params(), &mut a);
        let mut sim_b = start(small_params(), &mut b);

        for _ in 0..3 {
            sim_a.tick(0.1, &mut a.host()).unwrap();
            sim_b.tick(0.1, &mut b.host()).unwrap();
        }
        assert_eq!(
            sim_a.lod_buffers(0).unwrap().positions,
            sim_b.lod_buffers(0).unwrap().positions
        );
    }

    #[test]
    fn test_fewer_tiles_removes_stale_tiles() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            tiles_count: 3,
            ..small_params()
        };
        let mut sim = start(params, &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(backend.meshes.tiles.len(), 9);

        let fewer = OceanParameters {
            tile_polygon_width: 8,
            tile_polygon_height: 8,
            ..small_params()
        };
        sim.set_parameters(fewer, &mut backend.host()).unwrap();
        assert_eq!(backend.meshes.tiles.len(), 4);

        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(backend.meshes.tiles.len(), 4);
        let levels = sim.mesh().levels();
        for (id, tile) in sim.tiles().iter() {
            let stored = &backend.meshes.tiles[&id];
            let level = &levels[tile.lod];
            assert_eq!(stored.offset, tile.offset);
            assert_eq!(stored.indices, level.indices);
            assert_eq!(stored.vertices.len(), level.uvs.len());
        }
    }

    #[test]
    fn test_tile_size_change_updates_material_size() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let params = OceanParameters {
            reflection_enabled: true,
            ..small_params()
        };
        let mut sim = start(params.clone(), &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(
            backend.material.vectors[MATERIAL_SIZE_UNIFORM],
            Vec4::new(10.0, 1.0, 10.0, 0.0)
        );

        let larger = OceanParameters {
            tile_size: Vec3::new(40.0, 1.0, 40.0),
            ..params
        };
        sim.set_parameters(larger, &mut backend.host()).unwrap();
        assert_eq!(
            backend.material.vectors[MATERIAL_SIZE_UNIFORM],
            Vec4::new(40.0, 1.0, 40.0, 0.0)
        );

        sim.tick(0.016, &mut backend.host()).unwrap();
        assert_eq!(
            backend.material.vectors[MATERIAL_SIZE_UNIFORM],
            Vec4::new(40.0, 1.0, 40.0, 0.0)
        );
    }

    #[test]
    fn test_origin_height_moves_tiles() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();

        let raised = OceanParameters {
            origin_height: 5.0,
            ..small_params()
        };
        sim.set_parameters(raised, &mut backend.host()).unwrap();
        assert!(sim.is_ready());
        assert_eq!(sim.tiles().get(1, 1).unwrap().offset, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(backend.meshes.tiles[&TileId(3)].offset, Vec3::new(0.0, 5.0, 0.0));

        sim.tick(0.016, &mut backend.host()).unwrap();
        for (id, tile) in sim.tiles().iter() {
            let stored = &backend.meshes.tiles[&id];
            assert_eq!(stored.offset.y, 5.0);
            assert_eq!(stored.offset, tile.offset);
            assert!(!stored.vertices.is_empty());
        }
    }

    #[test]
    fn test_wave_speed_change_reaches_next_tick() {
        let mut a = HeadlessBackend::with_camera(camera());
        let mut b = HeadlessBackend::with_camera(camera());
        let mut c = HeadlessBackend::with_camera(camera());
        let mut steady = start(small_params(), &mut a);
        let mut faster = start(small_params(), &mut b);
        let mut choppier = start(small_params(), &mut c);
        for sim in [&mut steady, &mut faster, &mut choppier] {
            sim.set_force_storm(true);
        }

        let speed = OceanParameters {
            wave_speed: small_params().wave_speed * 2.0 + 0.5,
            ..small_params()
        };
        faster.set_parameters(speed, &mut b.host()).unwrap();

        let chop = OceanParameters {
            choppy_scale: small_params().choppy_scale + 1.0,
            ..small_params()
        };
        choppier.set_parameters(chop, &mut c.host()).unwrap();

        steady.tick(0.5, &mut a.host()).unwrap();
        faster.tick(0.5, &mut b.host()).unwrap();
        choppier.tick(0.5, &mut c.host()).unwrap();

        let base = &steady.lod_buffers(0).unwrap().positions;
        let fast = &faster.lod_buffers(0).unwrap().positions;
        assert_ne!(steady.vertex_synth.field().height, faster.vertex_synth.field().height);
        assert!(base.iter().zip(fast).any(|(p, q)| (p.y - q.y).abs() > 1e-6));

        // Choppiness moves vertices sideways without changing heights
        let chopped = &choppier.lod_buffers(0).unwrap().positions;
        assert!(base.iter().zip(chopped).all(|(p, q)| p.y == q.y));
        assert!(base.iter().zip(chopped).any(|(p, q)| (p.x - q.x).abs() > 1e-6));
    }

    #[test]
    fn test_unknown_lod_and_tile_are_out_of_range() {
        let mut backend = HeadlessBackend::with_camera(camera());
        let mut sim = start(small_params(), &mut backend);
        sim.tick(0.016, &mut backend.host()).unwrap();

        assert!(matches!(sim.lod_buffers(99), Err(OceanError::OutOfRange(_))));
        assert!(matches!(sim.tile_buffers(TileId(99)), Err(OceanError::OutOfRange(_))));
    }
}
