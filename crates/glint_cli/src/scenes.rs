//! Built-in demo scenes.

use glint_render::{
    Background, CameraConfig, Color, Dielectric, DiffuseLight, HittableList, Lambertian,
    Material, Metal, SceneResult, Sphere, Texture, Vec3,
};
use rand::{Rng, RngCore};

/// Names accepted by `--scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SceneName {
    /// Ground plane of small random spheres around three large ones
    #[default]
    Spheres,
    /// Two large checker-textured spheres
    Checker,
    /// A diffuse sphere lit only by an emissive sphere
    Lights,
    /// Diffuse, metal and glass spheres seen by the default camera
    Glass,
}

/// Objects, viewpoint and background of a demo.
pub struct Scene {
    pub world: HittableList,
    pub camera: CameraConfig,
    pub background: Background,
}

impl SceneName {
    /// Build the scene; random placement draws from `rng`.
    pub fn build(self, rng: &mut dyn RngCore) -> SceneResult<Scene> {
        match self {
            SceneName::Spheres => random_spheres(rng),
            SceneName::Checker => two_checker_spheres(),
            SceneName::Lights => simple_light(),
            SceneName::Glass => glass_trio(),
        }
    }
}

fn sphere<M: Material + 'static>(
    world: &mut HittableList,
    center: Vec3,
    radius: f32,
    material: M,
) -> SceneResult<()> {
    world.push(Sphere::new(center, radius, material)?);
    Ok(())
}

fn checker() -> Texture {
    Texture::checker_colors(Color::new(0.2, 0.3, 0.1), Color::new(0.9, 0.9, 0.9), 10.0)
}

fn random_color(rng: &mut dyn RngCore) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

fn random_spheres(rng: &mut dyn RngCore) -> SceneResult<Scene> {
    let mut world = HittableList::new();

    sphere(
        &mut world,
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Color::splat(0.5)),
    )?;

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat: f32 = rng.gen();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            // Keep clear of the large metal sphere.
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                // Diffuse
                let albedo = random_color(rng) * random_color(rng);
                sphere(&mut world, center, 0.2, Lambertian::new(albedo))?;
            } else if choose_mat < 0.95 {
                // Metal
                let albedo = Color::splat(0.5) + 0.5 * random_color(rng);
                let fuzz = 0.5 * rng.gen::<f32>();
                sphere(&mut world, center, 0.2, Metal::new(albedo, fuzz))?;
            } else {
                // Glass
                sphere(&mut world, center, 0.2, Dielectric::new(1.5))?;
            }
        }
    }

    sphere(&mut world, Vec3::new(0.0, 1.0, 0.0), 1.0, Dielectric::new(1.5))?;
    sphere(
        &mut world,
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    )?;
    sphere(
        &mut world,
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    )?;

    let camera = CameraConfig::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, 10.0);

    Ok(Scene {
        world,
        camera,
        background: Background::Sky,
    })
}

fn two_checker_spheres() -> SceneResult<Scene> {
    let mut world = HittableList::new();
    sphere(
        &mut world,
        Vec3::new(0.0, -10.0, 0.0),
        10.0,
        Lambertian::new(checker()),
    )?;
    sphere(
        &mut world,
        Vec3::new(0.0, 10.0, 0.0),
        10.0,
        Lambertian::new(checker()),
    )?;

    let camera = CameraConfig::default()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);

    Ok(Scene {
        world,
        camera,
        background: Background::Sky,
    })
}

fn simple_light() -> SceneResult<Scene> {
    let mut world = HittableList::new();
    sphere(
        &mut world,
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(checker()),
    )?;
    sphere(
        &mut world,
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Lambertian::new(Color::new(0.6, 0.3, 0.3)),
    )?;
    sphere(
        &mut world,
        Vec3::new(0.0, 7.0, 0.0),
        2.0,
        DiffuseLight::new(Color::splat(4.0)),
    )?;

    let camera = CameraConfig::default()
        .with_position(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 1.0);

    Ok(Scene {
        world,
        camera,
        background: Background::Solid(Color::ZERO),
    })
}

fn glass_trio() -> SceneResult<Scene> {
    let mut world = HittableList::new();
    sphere(
        &mut world,
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5)),
    )?;
    sphere(
        &mut world,
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0)),
    )?;
    sphere(
        &mut world,
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 0.3),
    )?;
    sphere(
        &mut world,
        Vec3::new(-1.0, 0.0, -1.0),
        0.5,
        Dielectric::new(1.5),
    )?;

    Ok(Scene {
        world,
        camera: CameraConfig::default(),
        background: Background::Sky,
    })
}
