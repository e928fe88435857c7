use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use island_generator::archipelago::generate_archipelago;
use island_generator::export;
use island_generator::physics::SimpleWorld;
use island_generator::player::Key;
use island_generator::render::HeadlessRenderer;
use island_generator::{App, Config, InputEvent};

#[derive(Parser)]
#[command(author, version, about = "Procedural island archipelago generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate an archipelago and write PNG, legend, JSON and OBJ files
    Generate {
        #[arg(long)]
        seed: Option<u32>,
        /// JSON config; defaults apply to anything it leaves out
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "islands")]
        out: PathBuf,
        /// Also write the intermediate noise stages of the main island
        #[arg(long)]
        noise_maps: bool,
        /// Width of the top-down PNG in pixels
        #[arg(long, default_value_t = 1024)]
        pixels: u32,
    },
    /// Print an ASCII preview and terrain statistics
    Preview {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 100)]
        width: usize,
    },
    /// Run the frame loop headlessly with a scripted walk
    Simulate {
        #[arg(long)]
        seed: Option<u32>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 600)]
        frames: u64,
        /// Spawn the player and walk it around
        #[arg(long)]
        embodied: bool,
    },
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    match Cli::parse().cmd {
        Cmd::Generate {
            seed,
            config,
            out,
            noise_maps,
            pixels,
        } => generate(load_config(config.as_deref())?, pick_seed(seed), &out, noise_maps, pixels),
        Cmd::Preview {
            seed,
            config,
            width,
        } => {
            let config = load_config(config.as_deref())?;
            let seed = pick_seed(seed);
            let arch = generate_archipelago(&config.terrain, &config.archipelago, seed);
            println!("Seed {seed}\n");
            println!("{}", export::preview(&arch, width));
            Ok(())
        }
        Cmd::Simulate {
            seed,
            config,
            frames,
            embodied,
        } => simulate(load_config(config.as_deref())?, pick_seed(seed), frames, embodied),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load(p).with_context(|| format!("load config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn pick_seed(seed: Option<u32>) -> u32 {
    seed.unwrap_or_else(rand::random)
}

fn generate(config: Config, seed: u32, out: &Path, noise_maps: bool, pixels: u32) -> Result<()> {
    let arch = generate_archipelago(&config.terrain, &config.archipelago, seed);

    let dir = out.join(seed.to_string());
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    export::export_png(&arch, &dir.join("island.png"), pixels).context("write island.png")?;
    export::export_legend_png(&arch, &dir.join("legend.png")).context("write legend.png")?;
    export::export_json(&arch, &dir.join("island.json")).context("write island.json")?;
    export::export_obj(&arch, &dir.join("island.obj")).context("write island.obj")?;
    if noise_maps {
        export::export_noise_maps(&config.terrain, seed, &dir).context("write noise maps")?;
    }

    println!("Archipelago generated → {}/", dir.display());
    Ok(())
}

/// Walks forward, turning a little and jumping every 1.5 s.
fn simulate(config: Config, seed: u32, frames: u64, embodied: bool) -> Result<()> {
    let dt = config.physics.fixed_dt;
    let physics = SimpleWorld::new(config.physics.gravity);
    let mut app = App::new(config, physics, HeadlessRenderer::new(), seed as u64)
        .context("start simulation")?;

    if embodied {
        app.handle(InputEvent::EnterEmbodied)?;
        app.handle(InputEvent::KeyDown(Key::Forward))?;
    }

    for frame in 0..frames {
        if embodied && frame % 90 == 45 {
            app.handle(InputEvent::KeyDown(Key::Jump))?;
            app.handle(InputEvent::KeyUp(Key::Jump))?;
        }
        if frame % 30 == 0 {
            app.handle(InputEvent::PointerDrag { dx: 10.0, dy: 0.0 })?;
        }
        app.tick(dt)?;

        if frame % 60 == 0 {
            match app.player() {
                Some(p) => log::info!(
                    "t={:.2}s pos=({:.2}, {:.2}, {:.2}) grounded={} jumps={}",
                    app.time(),
                    p.position.x,
                    p.position.y,
                    p.position.z,
                    p.grounded,
                    p.jumps_used
                ),
                None => log::info!("t={:.2}s orbit yaw={:.3}", app.time(), app.orbit().yaw),
            }
        }
    }

    let r = app.renderer();
    println!(
        "Simulated {} frames: {} live meshes, {} bytes, {} uploads",
        r.frames(),
        r.live_meshes(),
        r.live_bytes(),
        r.uploads()
    );
    Ok(())
}
