//! restir-render
//!
//! Headless CLI driver: loads a scene description, runs a fixed number of
//! frames through `Renderer`, and writes the final front buffer out as a
//! PPM (the OpenGL pixel-buffer upload path is out of scope; this is its
//! stand-in for inspecting output without a GUI toolkit).

use clap::Parser;
use restir_di::config::SceneConfig;
use restir_di::core::error::{RenderError, RenderResult};
use restir_di::Renderer;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(name = "restir-render", about = "Headless ReSTIR DI renderer driver")]
struct Args {
    /// Path to a TOML scene description (see `SceneConfig`).
    #[arg(long)]
    scene: String,

    /// Number of frames to run before writing output. ReSTIR's temporal
    /// reuse only kicks in from frame 2 onward, so this should be >= 2 to
    /// exercise the full pipeline.
    #[arg(long, default_value_t = 4)]
    frames: u32,

    /// Output PPM path.
    #[arg(long, default_value = "out.ppm")]
    out: String,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> RenderResult<()> {
    let args = Args::parse();

    let config = SceneConfig::load(&args.scene)?;
    let settings = config.settings.clone();
    let scene = config.build()?;
    let (mut renderer, _handle) = Renderer::new(settings, scene);

    for stats in renderer.run_frames(args.frames.max(1)) {
        log::info!(
            "frame {}: {:.2} ms, {} triangles",
            stats.frame_index,
            stats.frame_time.as_secs_f64() * 1000.0,
            stats.triangle_count
        );
    }

    let handle = renderer.handle();
    let front = handle.read_front();
    let settings = renderer.settings();
    write_ppm(&args.out, settings.frame_width, settings.frame_height, &front)?;
    log::info!("wrote {}", args.out);
    Ok(())
}

/// Writes an RGBA8 buffer as a binary PPM (P6), dropping the alpha channel
/// since PPM has no alpha support.
fn write_ppm(path: &str, width: u32, height: u32, rgba: &[u8]) -> RenderResult<()> {
    let mut file = std::fs::File::create(path).map_err(|source| RenderError::ImageWrite {
        path: path.to_string(),
        source,
    })?;
    let header = format!("P6\n{} {}\n255\n", width, height);
    file.write_all(header.as_bytes())
        .and_then(|_| {
            let rgb: Vec<u8> = rgba.chunks_exact(4).flat_map(|p| [p[0], p[1], p[2]]).collect();
            file.write_all(&rgb)
        })
        .map_err(|source| RenderError::ImageWrite {
            path: path.to_string(),
            source,
        })
}
