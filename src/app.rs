//! Frame loop context.
//!
//! [`App`] owns everything a running session needs: the current archipelago
//! and the GPU/physics resources that mirror it, the water, the optional
//! embodied player, the orbit camera and the time counter.  Each [`App::tick`]
//! runs one frame in a fixed order:
//!
//! 1. camera damping (free-camera mode)
//! 2. physics step
//! 3. visual transforms synced from physics
//! 4. player input applied
//! 5. water animated
//! 6. exactly one draw

use std::sync::Arc;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::archipelago::{Archipelago, generate_archipelago};
use crate::camera::{OrbitCamera, follow_camera};
use crate::config::{CollisionMode, Config, Locomotion, PlayerConfig};
use crate::error::{Error, Result};
use crate::mesh::box_mesh;
use crate::physics::{BodyHandle, PhysicsBackend, Shape, Transform};
use crate::player::{Key, Mode, Player};
use crate::render::{MeshHandle, Renderer};
use crate::water::Water;

const PLAYER_COLOR: [f32; 3] = [0.85, 0.2, 0.2];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Pointer moved with the button held, in pixels.
    PointerDrag { dx: f32, dy: f32 },
    /// Multiplies the orbit distance.
    Zoom(f32),
    Regenerate,
    EnterEmbodied,
    ExitEmbodied,
}

pub struct App<P: PhysicsBackend, R: Renderer> {
    config: Config,
    physics: P,
    renderer: R,
    rng: ChaCha8Rng,
    archipelago: Archipelago,
    island_meshes: Vec<MeshHandle>,
    island_bodies: Vec<BodyHandle>,
    ground_body: BodyHandle,
    water: Water,
    water_mesh: MeshHandle,
    player: Option<Player>,
    player_mesh: Option<MeshHandle>,
    mode: Mode,
    orbit: OrbitCamera,
    time: f32,
    frame: u64,
}

impl<P: PhysicsBackend, R: Renderer> App<P, R> {
    /// Builds the first archipelago from `seed` and uploads the scene.
    ///
    /// `seed` also seeds the generator that picks the seeds of later
    /// regenerations, so a session replays exactly.
    pub fn new(config: Config, mut physics: P, mut renderer: R, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sea_level = config.terrain.sea_level;

        let floor = Vec3::new(0.0, sea_level - config.physics.sea_floor_depth, 0.0);
        let ground_body = physics.create_static_body(Shape::Plane, floor)?;

        let water = Water::new(config.water.clone(), sea_level);
        let water_mesh = renderer.upload_mesh(water.mesh(), "water")?;

        let island_seed = rng.r#gen::<u32>();
        let archipelago =
            generate_archipelago(&config.terrain, &config.archipelago, island_seed);
        let orbit = OrbitCamera::new(&config.camera);

        let mut app = Self {
            config,
            physics,
            renderer,
            rng,
            archipelago,
            island_meshes: Vec::new(),
            island_bodies: Vec::new(),
            ground_body,
            water,
            water_mesh,
            player: None,
            player_mesh: None,
            mode: Mode::FreeCamera,
            orbit,
            time: 0.0,
            frame: 0,
        };
        app.install_islands()?;
        Ok(app)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn archipelago(&self) -> &Archipelago {
        &self.archipelago
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    pub fn water(&self) -> &Water {
        &self.water
    }

    pub fn ground_body(&self) -> BodyHandle {
        self.ground_body
    }

    /// Seconds of simulated time.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Replaces the archipelago with one from a fresh seed.
    ///
    /// Old island meshes and terrain bodies are released before the new ones
    /// are created.  If a release fails the archipelago is kept, the handles
    /// that could not be released stay tracked and the first error is returned.  An embodied player is respawned above the new terrain.
    /// Returns the new seed.
    pub fn regenerate(&mut self) -> Result<u32> {
        self.release_islands()?;

        let seed = self.rng.r#gen::<u32>();
        self.archipelago =
            generate_archipelago(&self.config.terrain, &self.config.archipelago, seed);
        self.install_islands()?;

        if self.mode == Mode::Embodied {
            self.despawn_player()?;
            self.spawn_player()?;
        }
        log::info!("regenerated archipelago with seed {seed}");
        Ok(seed)
    }

    pub fn handle(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(player) = self.player.as_mut() {
                    player.set_key(key, true);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(player) = self.player.as_mut() {
                    player.set_key(key, false);
                }
            }
            InputEvent::PointerDrag { dx, dy } => {
                let s = self.config.player.drag_sensitivity;
                match self.player.as_mut() {
                    Some(player) => player.drag(dx, s),
                    None => self.orbit.rotate(-dx * s, dy * s),
                }
            }
            InputEvent::Zoom(factor) => {
                if self.mode == Mode::FreeCamera {
                    self.orbit.zoom(factor);
                }
            }
            InputEvent::Regenerate => {
                self.regenerate()?;
            }
            InputEvent::EnterEmbodied => self.enter_embodied()?,
            InputEvent::ExitEmbodied => self.exit_embodied()?,
        }
        Ok(())
    }

    pub fn enter_embodied(&mut self) -> Result<()> {
        if self.mode == Mode::Embodied {
            return Ok(());
        }
        self.spawn_player()?;
        self.mode = Mode::Embodied;
        log::info!("entered embodied mode");
        Ok(())
    }

    /// Removes the player and resets the orbit camera.
    pub fn exit_embodied(&mut self) -> Result<()> {
        if self.mode == Mode::FreeCamera {
            return Ok(());
        }
        self.despawn_player()?;
        self.orbit = OrbitCamera::new(&self.config.camera);
        self.mode = Mode::FreeCamera;
        log::info!("left embodied mode");
        Ok(())
    }

    /// Runs one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        if self.mode == Mode::FreeCamera {
            self.orbit.update();
        }

        self.physics.step(dt);
        self.sync_from_physics()?;
        self.apply_player_input(dt)?;

        self.time += dt;
        self.water.animate(self.time);
        self.renderer.update_mesh(self.water_mesh, self.water.mesh())?;

        let camera = match &self.player {
            Some(player) => follow_camera(player.position, player.yaw, &self.config.camera),
            None => self.orbit.camera(&self.config.camera),
        };
        self.renderer.draw(&camera);
        self.frame += 1;
        Ok(())
    }

    // ── Scene bookkeeping ───────────────────────────────────────────────────

    fn install_islands(&mut self) -> Result<()> {
        for island in &self.archipelago.islands {
            let mesh = self.renderer.upload_mesh(&island.mesh, "island")?;
            self.renderer
                .set_transform(mesh, Transform::from_translation(island.offset))?;
            self.island_meshes.push(mesh);

            let shape = Shape::Heightfield(Arc::new(island.heightfield.clone()));
            let body = self.physics.create_static_body(shape, island.offset)?;
            self.island_bodies.push(body);
        }
        log::debug!(
            "installed {} island mesh(es), {} live bodies",
            self.island_meshes.len(),
            self.physics.body_count()
        );
        Ok(())
    }

    /// Releases every island mesh and body, keeping the ones that failed.
    fn release_islands(&mut self) -> Result<()> {
        let mut first_err: Option<Error> = None;

        for mesh in std::mem::take(&mut self.island_meshes) {
            if let Err(e) = self.renderer.release_mesh(mesh) {
                log::warn!("could not release island mesh {mesh:?}: {e}");
                self.island_meshes.push(mesh);
                first_err = first_err.or(Some(e.into()));
            }
        }
        for body in std::mem::take(&mut self.island_bodies) {
            if let Err(e) = self.physics.remove_body(body) {
                log::warn!("could not remove island body {body:?}: {e}");
                self.island_bodies.push(body);
                first_err = first_err.or(Some(e.into()));
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn spawn_player(&mut self) -> Result<()> {
        let cfg = &self.config.player;
        let half = Vec3::from_array(cfg.half_extents);
        let ground = self.standing_height(0.0, f32::INFINITY, 0.0).unwrap_or(0.0);
        let position = Vec3::new(0.0, ground + half.y + cfg.spawn_clearance, 0.0);

        let mut player = Player::new(position, cfg);
        if cfg.locomotion == Locomotion::Physics {
            let shape = Shape::Box { half_extents: half };
            player.body = Some(self.physics.create_dynamic_body(shape, cfg.mass, position)?);
        }
        let mesh = self.renderer.upload_mesh(&box_mesh(half, PLAYER_COLOR), "player")?;
        self.renderer
            .set_transform(mesh, Transform::from_translation(position))?;

        log::debug!("player spawned at {position}");
        self.player = Some(player);
        self.player_mesh = Some(mesh);
        Ok(())
    }

    fn despawn_player(&mut self) -> Result<()> {
        if let Some(mesh) = self.player_mesh.take() {
            self.renderer.release_mesh(mesh)?;
        }
        if let Some(body) = self.player.take().and_then(|p| p.body) {
            self.physics.remove_body(body)?;
        }
        Ok(())
    }

    fn standing_height(&self, x: f32, from_y: f32, z: f32) -> Option<f32> {
        standing_height(
            &self.archipelago,
            &self.config.player,
            self.config.terrain.sea_level,
            self.config.terrain.sea_level - self.config.physics.sea_floor_depth,
            x,
            from_y,
            z,
        )
    }

    // ── Per-frame phases ────────────────────────────────────────────────────

    fn sync_from_physics(&mut self) -> Result<()> {
        for (&mesh, &body) in self.island_meshes.iter().zip(&self.island_bodies) {
            if let Some(t) = self.physics.transform(body) {
                self.renderer.set_transform(mesh, t)?;
            }
        }

        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        let Some(body) = player.body else {
            return Ok(());
        };
        if let Some(t) = self.physics.transform(body) {
            player.position = t.translation;
        }
        player.velocity = self.physics.velocity(body).unwrap_or(Vec3::ZERO);
        if self.physics.is_grounded(body) {
            player.land();
        } else {
            player.grounded = false;
        }

        let sea_level = self.config.terrain.sea_level;
        let feet = player.position.y - player.half_extents.y;
        if self.config.player.water_is_floor && feet < sea_level {
            player.position.y = sea_level + player.half_extents.y;
            player.velocity.y = player.velocity.y.max(0.0);
            self.physics.set_translation(body, player.position)?;
            self.physics.set_velocity(body, player.velocity)?;
            player.land();
        }
        Ok(())
    }

    fn apply_player_input(&mut self, dt: f32) -> Result<()> {
        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        let cfg = &self.config.player;

        match (cfg.locomotion, player.body) {
            (Locomotion::Physics, Some(body)) => {
                let dir = player.move_direction() * cfg.speed;
                player.velocity = Vec3::new(dir.x, player.velocity.y, dir.z);
                if player.take_jump_request() {
                    player.try_jump(cfg);
                }
                self.physics.set_velocity(body, player.velocity)?;
            }
            _ => {
                let arch = &self.archipelago;
                let sea_level = self.config.terrain.sea_level;
                let floor = sea_level - self.config.physics.sea_floor_depth;
                player.update_kinematic(dt, cfg, |x, from_y, z| {
                    standing_height(arch, cfg, sea_level, floor, x, from_y, z)
                });
            }
        }

        if let Some(mesh) = self.player_mesh {
            let transform = Transform {
                translation: player.position,
                rotation: player.rotation(),
            };
            self.renderer.set_transform(mesh, transform)?;
        }
        Ok(())
    }
}

/// Highest walkable surface at or below `from_y` under `(x, z)`: terrain, the
/// water plane when it counts as floor, and the sea-floor plane.
fn standing_height(
    arch: &Archipelago,
    cfg: &PlayerConfig,
    sea_level: f32,
    floor: f32,
    x: f32,
    from_y: f32,
    z: f32,
) -> Option<f32> {
    let terrain = match cfg.collision {
        CollisionMode::Raycast => arch.raycast_down(x, from_y, z),
        CollisionMode::Footprint => arch.footprint_top(x, z).filter(|&top| top <= from_y),
    };
    let water = cfg.water_is_floor.then_some(sea_level);
    [terrain, water, Some(floor)]
        .into_iter()
        .flatten()
        .filter(|&h| h <= from_y)
        .reduce(f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::TerrainConfig;
    use crate::generation::generate_island;
    use crate::mesh::MeshData;
    use crate::physics::SimpleWorld;
    use crate::render::{HeadlessRenderer, RenderError};

    const DT: f32 = 1.0 / 60.0;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.terrain.resolution = 16;
        config.water.resolution = 8;
        config
    }

    fn app(config: Config) -> App<SimpleWorld, HeadlessRenderer> {
        let physics = SimpleWorld::new(config.physics.gravity);
        App::new(config, physics, HeadlessRenderer::new(), 42).unwrap()
    }

    #[test]
    fn one_draw_per_tick() {
        let mut app = app(small_config());
        for _ in 0..10 {
            app.tick(DT).unwrap();
        }
        assert_eq!(app.renderer().frames(), 10);
        assert_eq!(app.frame(), 10);
        assert!((app.time() - 10.0 * DT).abs() < 1e-5);
    }

    #[test]
    fn scene_meshes_match_islands() {
        let app = app(small_config());
        let islands = app.archipelago().islands.len();
        assert_eq!(app.renderer().count_labelled("island"), islands);
        assert_eq!(app.renderer().live_meshes(), islands + 1);
        // islands plus the sea-floor plane
        assert_eq!(app.physics().body_count(), islands + 1);
    }

    #[test]
    fn embodied_toggle_adds_and_removes_player() {
        let mut app = app(small_config());
        let base = app.renderer().live_meshes();
        app.handle(InputEvent::EnterEmbodied).unwrap();
        app.handle(InputEvent::EnterEmbodied).unwrap();
        assert_eq!(app.mode(), Mode::Embodied);
        assert_eq!(app.renderer().live_meshes(), base + 1);
        app.handle(InputEvent::ExitEmbodied).unwrap();
        assert_eq!(app.mode(), Mode::FreeCamera);
        assert!(app.player().is_none());
        assert_eq!(app.renderer().live_meshes(), base);
    }

    #[test]
    fn free_camera_drag_is_damped() {
        let mut app = app(small_config());
        let yaw = app.orbit().yaw;
        app.handle(InputEvent::PointerDrag { dx: -100.0, dy: 0.0 }).unwrap();
        app.tick(DT).unwrap();
        let moved = app.orbit().yaw - yaw;
        assert!(moved > 0.0 && moved < 1.0);
    }

    #[test]
    fn player_settles_on_standing_surface() {
        let mut app = app(small_config());
        app.enter_embodied().unwrap();
        for _ in 0..180 {
            app.tick(DT).unwrap();
        }
        let player = app.player().unwrap();
        assert!(player.grounded);
        let feet = player.position.y - player.half_extents.y;
        let ground = app.standing_height(player.position.x, player.position.y, player.position.z);
        assert!((feet - ground.unwrap()).abs() < 1e-3);
    }

    #[test]
    fn physics_locomotion_comes_to_rest() {
        let mut config = small_config();
        config.player.locomotion = Locomotion::Physics;
        let mut app = app(config);
        app.enter_embodied().unwrap();
        assert_eq!(app.physics().body_count(), app.archipelago().islands.len() + 2);
        for _ in 0..240 {
            app.tick(DT).unwrap();
        }
        let player = app.player().unwrap();
        assert!(player.grounded);
        assert!(player.position.y - player.half_extents.y >= -1e-3);
        assert!(player.velocity.y.abs() < 1e-3);
    }

    #[test]
    fn footprint_collision_rests_on_box_top() {
        let mut config = small_config();
        config.player.collision = CollisionMode::Footprint;
        let mut app = app(config);
        app.enter_embodied().unwrap();
        for _ in 0..180 {
            app.tick(DT).unwrap();
        }
        let player = app.player().unwrap();
        assert!(player.grounded);
        let feet = player.position.y - player.half_extents.y;
        let top = app
            .archipelago()
            .footprint_top(player.position.x, player.position.z)
            .unwrap();
        assert!((feet - top).abs() < 1e-3);
        assert!((top - app.archipelago().main_island().bounds().1.y).abs() < 1e-6);
    }

    #[test]
    fn footprint_collision_blocks_taller_neighbour() {
        let mut low_cfg = small_config().terrain;
        low_cfg.max_height = 2.0;
        let high_cfg = TerrainConfig {
            max_height: 20.0,
            ..low_cfg.clone()
        };
        let size = low_cfg.size;
        let arch = Archipelago {
            seed: 1,
            placements: Vec::new(),
            islands: vec![
                generate_island(&low_cfg, 1, Vec3::ZERO),
                generate_island(&high_cfg, 1, Vec3::new(size, 0.0, 0.0)),
            ],
        };
        let low_top = arch.islands[0].bounds().1.y;
        let high_top = arch.islands[1].bounds().1.y;

        let cfg = PlayerConfig {
            collision: CollisionMode::Footprint,
            ..PlayerConfig::default()
        };
        let mut player = Player::new(Vec3::new(0.0, low_top + 0.5, 0.0), &cfg);
        assert!(high_top > low_top + 2.0 * player.half_extents.y);

        player.set_key(Key::Right, true);
        for _ in 0..600 {
            player.update_kinematic(DT, &cfg, |x, from_y, z| {
                standing_height(&arch, &cfg, 0.0, -5.0, x, from_y, z)
            });
        }
        assert!(player.position.x < size * 0.5);
        assert!(player.position.x > size * 0.5 - 1.0);
        assert!(player.grounded);
        assert!((player.position.y - player.half_extents.y - low_top).abs() < 1e-3);
    }

    type RenderResult<T> = std::result::Result<T, RenderError>;

    /// Headless renderer whose next mesh release fails.
    struct FlakyRenderer {
        inner: HeadlessRenderer,
        fail_next_release: bool,
    }

    impl Renderer for FlakyRenderer {
        fn upload_mesh(&mut self, mesh: &MeshData, label: &'static str) -> RenderResult<MeshHandle> {
            self.inner.upload_mesh(mesh, label)
        }

        fn update_mesh(&mut self, handle: MeshHandle, mesh: &MeshData) -> RenderResult<()> {
            self.inner.update_mesh(handle, mesh)
        }

        fn release_mesh(&mut self, handle: MeshHandle) -> RenderResult<()> {
            if std::mem::take(&mut self.fail_next_release) {
                return Err(RenderError::UnknownMesh(handle));
            }
            self.inner.release_mesh(handle)
        }

        fn set_transform(&mut self, handle: MeshHandle, transform: Transform) -> RenderResult<()> {
            self.inner.set_transform(handle, transform)
        }

        fn draw(&mut self, camera: &Camera) {
            self.inner.draw(camera)
        }
    }

    #[test]
    fn failed_release_keeps_handle_tracked() {
        let config = small_config();
        let physics = SimpleWorld::new(config.physics.gravity);
        let renderer = FlakyRenderer {
            inner: HeadlessRenderer::new(),
            fail_next_release: false,
        };
        let mut app = App::new(config, physics, renderer, 42).unwrap();
        let islands = app.archipelago().islands.len();
        let seed = app.archipelago().seed;

        app.renderer.fail_next_release = true;
        assert!(app.regenerate().is_err());
        // Only the failed mesh is still live, and it is still tracked.
        assert_eq!(app.renderer().inner.count_labelled("island"), 1);
        assert_eq!(app.island_meshes.len(), 1);
        assert!(app.island_bodies.is_empty());
        assert_eq!(app.archipelago().seed, seed);
        assert_eq!(app.physics().body_count(), 1);
        assert_eq!(app.renderer().inner.releases(), islands as u64 - 1);

        app.regenerate().unwrap();
        let now = app.archipelago().islands.len();
        assert_eq!(app.renderer().inner.count_labelled("island"), now);
        assert_eq!(app.island_meshes.len(), now);
        assert_eq!(app.physics().body_count(), now + 1);
    }

    #[test]
    fn frame_animates_water_and_records_camera() {
        let mut app = app(small_config());
        let floor = app.config().terrain.sea_level - app.config().physics.sea_floor_depth;
        let ground = app.physics().transform(app.ground_body()).unwrap();
        assert_eq!(ground.translation.y, floor);

        for _ in 0..5 {
            app.tick(DT).unwrap();
        }
        let water = app.water();
        for p in &water.mesh().positions {
            assert!((p[1] - water.height_at(p[0], p[2], app.time())).abs() < 1e-5);
        }

        let drawn = app.renderer().last_view_proj().unwrap();
        let expected = app.orbit().camera(&app.config().camera).view_proj();
        assert!(drawn.abs_diff_eq(expected, 1e-6));
    }
}
