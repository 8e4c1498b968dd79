use std::thread;
use std::time::{Duration, Instant};

use tracing::info;
use tracing_subscriber::EnvFilter;

use marionette::{PickInput, Scene, SceneConfig};

const CONFIG_PATH: &str = "scene.toml";
const RUN_SECONDS: f32 = 5.0;
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

fn main() -> marionette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SceneConfig::load_or_default(CONFIG_PATH)?;
    let mut scene = Scene::new(&config)?;

    // No window: the scene runs against the wall clock with idle input.
    let input = PickInput::default();
    let start_time = Instant::now();
    let mut next_report = 1.0;

    loop {
        let frame_start = Instant::now();
        let now = start_time.elapsed().as_secs_f32();
        if now >= RUN_SECONDS {
            break;
        }

        scene.frame(now, &input);

        if now >= next_report {
            let creature = scene.creature().last_sample();
            let plane = scene.plane().last_sample();
            info!(
                time = format_args!("{now:.2}"),
                frames = scene.frame_count(),
                creature = ?creature.map(|s| s.position),
                plane = ?plane.map(|s| s.position),
                particles = scene.particles().len(),
                "scene"
            );
            next_report += 1.0;
        }

        if let Some(remaining) = FRAME_INTERVAL.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    let draw = scene.draw_list();
    info!(
        frames = scene.frame_count(),
        instances = draw.instances.len(),
        particles = draw.particles.len(),
        "done"
    );
    Ok(())
}
