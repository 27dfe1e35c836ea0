use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glint_render::{render, save, BvhNode, CameraConfig, Hittable, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

mod scenes;
use scenes::SceneName;

#[derive(Debug, clap::Parser)]
#[command(name = "glint", version, about = "Offline CPU path tracer")]
struct CommandLineArguments {
    #[arg(long, value_enum, default_value_t = SceneName::Spheres, help = "Builtin scene to render")]
    scene: SceneName,

    #[arg(short, long, default_value = "output.ppm", help = "Output image (.ppm or .png)")]
    output: PathBuf,

    #[arg(short, long, help = "JSON file with render and camera settings")]
    config: Option<PathBuf>,

    #[arg(long, help = "Image width in pixels")]
    width: Option<u32>,
    #[arg(long, help = "Image height in pixels")]
    height: Option<u32>,
    #[arg(short, long, help = "Samples per pixel")]
    samples: Option<u32>,
    #[arg(short = 'd', long, help = "Maximum ray depth (bounces)")]
    max_depth: Option<u32>,
    #[arg(long, help = "Seed for scene generation and sampling")]
    seed: Option<u64>,

    #[arg(long, help = "Trace against the flat object list instead of a BVH")]
    no_bvh: bool,

    #[arg(long, help = "Print the effective configuration as JSON and exit")]
    dump_config: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

/// Settings file layout. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct FileConfig {
    render: RenderConfig,
    /// Replaces the scene's own camera placement
    camera: Option<CameraConfig>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_overrides(&mut self, args: &CommandLineArguments) {
        let render = &mut self.render;
        if let Some(width) = args.width {
            render.width = width;
        }
        if let Some(height) = args.height {
            render.height = height;
        }
        if let Some(samples) = args.samples {
            render.samples_per_pixel = samples;
        }
        if let Some(max_depth) = args.max_depth {
            render.max_depth = max_depth;
        }
        if let Some(seed) = args.seed {
            render.seed = seed;
        }
    }
}

fn main() -> Result<()> {
    let args = CommandLineArguments::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let mut config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    config.apply_overrides(&args);

    let mut rng = StdRng::seed_from_u64(config.render.seed);
    let scene = args
        .scene
        .build(&mut rng)
        .with_context(|| format!("failed to build scene {:?}", args.scene))?;

    // The background belongs to the scene; the aspect follows the image.
    config.render.background = scene.background;
    let camera_config = config
        .camera
        .unwrap_or(scene.camera)
        .with_aspect(config.render.aspect_ratio());
    config.camera = Some(camera_config);

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    config.render.validate()?;
    let camera = camera_config.build()?;

    log::info!(
        "Scene {:?}: {} objects, {}",
        args.scene,
        scene.world.len(),
        if args.no_bvh { "linear list" } else { "BVH" }
    );
    let world: Box<dyn Hittable> = if args.no_bvh {
        Box::new(scene.world)
    } else {
        Box::new(BvhNode::from_list(scene.world, &mut rng)?)
    };

    let image = render(&camera, world.as_ref(), &config.render);
    save(&image, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}
