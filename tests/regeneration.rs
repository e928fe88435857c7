use island_generator::config::{Config, Locomotion};
use island_generator::physics::{PhysicsBackend, SimpleWorld};
use island_generator::player::{Key, Mode};
use island_generator::render::HeadlessRenderer;
use island_generator::{App, InputEvent};

const DT: f32 = 1.0 / 60.0;

fn small_config() -> Config {
    let mut config = Config::default();
    config.terrain.resolution = 24;
    config.water.resolution = 8;
    config
}

fn start(config: Config, seed: u64) -> App<SimpleWorld, HeadlessRenderer> {
    let physics = SimpleWorld::new(config.physics.gravity);
    App::new(config, physics, HeadlessRenderer::new(), seed).unwrap()
}

#[test]
fn regeneration_releases_previous_meshes() {
    let mut app = start(small_config(), 7);
    app.tick(DT).unwrap();

    for _ in 0..8 {
        let released_before = app.renderer().releases();
        let old_islands = app.archipelago().islands.len();

        app.handle(InputEvent::Regenerate).unwrap();

        let islands = app.archipelago().islands.len();
        assert_eq!(app.renderer().releases() - released_before, old_islands as u64);
        assert_eq!(app.renderer().count_labelled("island"), islands);
        assert_eq!(app.renderer().live_meshes(), islands + 1);
        assert_eq!(app.physics().body_count(), islands + 1);
        app.tick(DT).unwrap();
    }
}

#[test]
fn regeneration_while_embodied_keeps_one_player() {
    let mut app = start(small_config(), 8);
    app.handle(InputEvent::EnterEmbodied).unwrap();
    for _ in 0..3 {
        app.handle(InputEvent::Regenerate).unwrap();
        let islands = app.archipelago().islands.len();
        assert_eq!(app.renderer().count_labelled("player"), 1);
        assert_eq!(app.renderer().live_meshes(), islands + 2);
    }
    assert_eq!(app.mode(), Mode::Embodied);
}

#[test]
fn physics_player_body_is_released_on_exit() {
    let mut config = small_config();
    config.player.locomotion = Locomotion::Physics;
    let mut app = start(config, 9);
    let bodies = app.physics().body_count();

    app.handle(InputEvent::EnterEmbodied).unwrap();
    assert_eq!(app.physics().body_count(), bodies + 1);
    app.handle(InputEvent::Regenerate).unwrap();
    let islands = app.archipelago().islands.len();
    assert_eq!(app.physics().body_count(), islands + 2);

    app.handle(InputEvent::ExitEmbodied).unwrap();
    assert_eq!(app.physics().body_count(), islands + 1);
    assert!(app.player().is_none());
}

#[test]
fn same_seed_replays_the_same_session() {
    let mut a = start(small_config(), 1234);
    let mut b = start(small_config(), 1234);
    for _ in 0..3 {
        let sa = a.regenerate().unwrap();
        let sb = b.regenerate().unwrap();
        assert_eq!(sa, sb);
    }
    assert_eq!(
        a.archipelago().main_island().heightfield,
        b.archipelago().main_island().heightfield
    );
}

#[test]
fn scripted_walk_stays_on_the_surface() {
    let mut app = start(small_config(), 3);
    app.handle(InputEvent::EnterEmbodied).unwrap();
    app.handle(InputEvent::KeyDown(Key::Forward)).unwrap();

    for frame in 0..600 {
        if frame % 90 == 45 {
            app.handle(InputEvent::KeyDown(Key::Jump)).unwrap();
            app.handle(InputEvent::KeyUp(Key::Jump)).unwrap();
        }
        app.tick(DT).unwrap();
        let p = app.player().unwrap();
        let feet = p.position.y - p.half_extents.y;
        // water counts as floor by default
        assert!(feet >= app.config().terrain.sea_level - 1e-3, "frame {frame}: feet at {feet}");
    }
    assert_eq!(app.renderer().frames(), 600);
}
