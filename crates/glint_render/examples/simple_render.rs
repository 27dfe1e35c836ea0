//! Simple path tracer example.
//!
//! Renders a small glass/metal/diffuse scene and saves it as PPM.

use glint_render::{
    render, save, BvhNode, CameraConfig, Color, Dielectric, HittableList, Lambertian, Metal,
    RenderConfig, Sphere, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Glint Path Tracer - Simple Example");
    println!("==================================");

    let start = std::time::Instant::now();
    let world = build_scene()?;
    let mut rng = StdRng::seed_from_u64(0);
    let world = BvhNode::from_list(world, &mut rng)?;
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig {
        width: 400,
        height: 200,
        samples_per_pixel: 50,
        max_depth: 10,
        ..RenderConfig::default()
    };

    let camera = CameraConfig::default()
        .with_position(
            Vec3::new(-2.0, 2.0, 1.0), // look_from
            Vec3::new(0.0, 0.0, -1.0), // look_at
            Vec3::new(0.0, 1.0, 0.0),  // up
        )
        .with_lens(30.0, 0.1, 1.0)
        .with_aspect(config.aspect_ratio())
        .focused_on_target()
        .build()?;

    println!(
        "Rendering {}x{} @ {} spp...",
        config.width, config.height, config.samples_per_pixel
    );

    let start = std::time::Instant::now();
    let image = render(&camera, &world, &config);
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    save(&image, filename)?;
    println!("Saved to {}", filename);

    Ok(())
}

fn build_scene() -> Result<HittableList, glint_render::SceneError> {
    let mut world = HittableList::new();

    // Ground
    world.push(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0)),
    )?);

    world.push(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    )?);
    world.push(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 0.3),
    )?);
    world.push(Sphere::new(
        Vec3::new(-1.0, 0.0, -1.0),
        0.5,
        Dielectric::new(1.5),
    )?);

    Ok(world)
}
