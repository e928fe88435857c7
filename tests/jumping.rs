use glam::Vec3;
use island_generator::config::{Config, Locomotion, PlayerConfig};
use island_generator::physics::SimpleWorld;
use island_generator::player::{Key, Player};
use island_generator::render::HeadlessRenderer;
use island_generator::{App, InputEvent};

const DT: f32 = 1.0 / 60.0;

fn on_flat_ground(cfg: &PlayerConfig) -> Player {
    let mut p = Player::new(Vec3::new(0.0, 0.5, 0.0), cfg);
    p.update_kinematic(DT, cfg, |_, from, _| (from >= 0.0).then_some(0.0));
    p
}

#[test]
fn refused_jump_leaves_state_untouched() {
    let cfg = PlayerConfig {
        max_jumps: 1,
        ..PlayerConfig::default()
    };
    let mut p = on_flat_ground(&cfg);
    assert!(p.grounded);
    assert!(p.try_jump(&cfg));

    let before = (p.position, p.velocity, p.jumps_used, p.grounded);
    assert!(!p.try_jump(&cfg));
    assert_eq!((p.position, p.velocity, p.jumps_used, p.grounded), before);
}

#[test]
fn jump_count_never_exceeds_limit() {
    let cfg = PlayerConfig {
        max_jumps: 3,
        ..PlayerConfig::default()
    };
    let mut p = on_flat_ground(&cfg);
    let accepted = (0..10)
        .filter(|_| {
            let ok = p.try_jump(&cfg);
            p.update_kinematic(DT, &cfg, |_, from, _| (from >= 0.0).then_some(0.0));
            ok
        })
        .count();
    assert_eq!(accepted, 3);
    assert!(p.jumps_used <= cfg.max_jumps);
}

#[test]
fn embodied_jump_lifts_player() {
    let mut config = Config::default();
    config.terrain.resolution = 24;
    let physics = SimpleWorld::new(config.physics.gravity);
    let mut app = App::new(config, physics, HeadlessRenderer::new(), 5).unwrap();
    app.handle(InputEvent::EnterEmbodied).unwrap();
    for _ in 0..180 {
        app.tick(DT).unwrap();
    }
    let rest = app.player().unwrap().position.y;
    assert!(app.player().unwrap().grounded);

    app.handle(InputEvent::KeyDown(Key::Jump)).unwrap();
    app.tick(DT).unwrap();
    let p = app.player().unwrap();
    assert!(p.position.y > rest);
    assert_eq!(p.jumps_used, 1);
    assert!(!p.grounded);
}

#[test]
fn physics_locomotion_caps_rapid_jumps() {
    let mut config = Config::default();
    config.terrain.resolution = 24;
    config.player.locomotion = Locomotion::Physics;
    let gravity = config.physics.gravity;
    let jump_velocity = config.player.jump_velocity;
    let physics = SimpleWorld::new(gravity);
    let mut app = App::new(config, physics, HeadlessRenderer::new(), 5).unwrap();
    app.handle(InputEvent::EnterEmbodied).unwrap();
    for _ in 0..240 {
        app.tick(DT).unwrap();
    }
    assert!(app.player().unwrap().grounded);

    let mut seen = Vec::new();
    for _ in 0..3 {
        app.handle(InputEvent::KeyDown(Key::Jump)).unwrap();
        app.handle(InputEvent::KeyUp(Key::Jump)).unwrap();
        app.tick(DT).unwrap();
        let p = app.player().unwrap();
        seen.push((p.jumps_used, p.velocity.y));
    }

    assert_eq!(seen[0], (1, jump_velocity));
    assert_eq!(seen[1], (2, jump_velocity));
    // The third press is refused: only gravity acts on the body.
    assert_eq!(seen[2].0, 2);
    assert!((seen[2].1 - (jump_velocity - gravity * DT)).abs() < 1e-4);
    assert!(!app.player().unwrap().grounded);
}
