//! Ember command line renderer.
//!
//! Builds a scene (built-in or from a JSON file), renders it and writes the
//! result as PPM or PNG.

mod output;
mod scene_file;
mod scenes;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use ember_renderer::{render_parallel, Camera, DEFAULT_BUCKET_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::scenes::BuiltinScene;

#[derive(Debug, Parser)]
#[command(name = "ember", version, about = "Monte Carlo ray tracer for sphere scenes")]
struct Args {
    /// Built-in scene to render
    #[arg(long, value_enum, default_value_t = BuiltinScene::Basic)]
    scene: BuiltinScene,

    /// JSON scene file, used instead of --scene
    #[arg(long)]
    scene_file: Option<PathBuf>,

    /// Output path (.ppm or .png); `-` writes PPM to stdout
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Override the image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Override the samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Override the maximum bounce depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed for scene generation and sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Render on the calling thread only
    #[arg(long)]
    serial: bool,

    /// Worker threads for bucket rendering (0 = one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Bucket edge length in pixels
    #[arg(long, default_value_t = DEFAULT_BUCKET_SIZE)]
    bucket_size: u32,

    /// Write linear values without gamma correction
    #[arg(long)]
    no_gamma: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting Ember");

    let start = Instant::now();
    let mut scene = match &args.scene_file {
        Some(path) => scene_file::load_scene(path)
            .with_context(|| format!("Failed to load scene file {}", path.display()))?,
        None => args.scene.build(&mut StdRng::seed_from_u64(args.seed)),
    };
    log::info!("Scene built in {:?} ({} objects)", start.elapsed(), scene.world.len());

    if let Some(width) = args.width {
        scene.camera.image_width = width;
    }
    if let Some(samples) = args.samples {
        scene.camera.samples_per_pixel = samples;
    }
    if let Some(max_depth) = args.max_depth {
        scene.camera.max_depth = max_depth;
    }

    let camera = Camera::new(scene.camera.clone()).context("Invalid camera configuration")?;

    let start = Instant::now();
    let image = if args.serial {
        let mut rng = StdRng::seed_from_u64(args.seed);
        camera.render(&scene.world, &mut rng)
    } else {
        if args.threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(args.threads)
                .build_global()
                .context("Failed to configure the rayon thread pool")?;
        }
        render_parallel(&camera, &scene.world, args.seed, args.bucket_size)
    };
    log::info!("Rendered in {:?}", start.elapsed());

    output::save_image(&image, !args.no_gamma, &args.output)
}
