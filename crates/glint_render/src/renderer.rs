//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with capped depth
//! - Emission from light materials
//! - Anti-aliasing via multi-sampling
//! - Gamma correction on output

use crate::bucket::{generate_buckets, render_bucket, DEFAULT_BUCKET_SIZE};
use crate::error::{SceneError, SceneResult};
use crate::sampling::{pixel_rng, sample_square};
use crate::{Camera, Hittable};
use glint_math::{Color, Interval, Ray};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Radiance returned by rays that leave the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White-to-blue vertical gradient.
    #[default]
    Sky,
    /// Constant color, e.g. black for scenes lit only by emitters.
    Solid(Color),
}

impl Background {
    /// Color seen along a ray that hit nothing.
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Sky => sky_gradient(ray),
            Background::Solid(color) => *color,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Minimum hit distance; keeps secondary rays off their own surface
    pub shadow_bias: f32,
    /// Seed for the per-pixel random streams
    pub seed: u64,
    /// What rays see when they leave the scene
    pub background: Background,
    /// Edge length of the square render buckets
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 100,
            samples_per_pixel: 100,
            max_depth: 50,
            shadow_bias: 0.001,
            seed: 0,
            background: Background::Sky,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Total number of pixels in the output image.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> SceneResult<()> {
        let invalid = |msg: &str| Err(SceneError::InvalidConfig(msg.to_string()));

        if self.width == 0 || self.height == 0 {
            return invalid("image dimensions must be non-zero");
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be non-zero");
        }
        if self.bucket_size == 0 {
            return invalid("bucket size must be non-zero");
        }
        if !(self.shadow_bias.is_finite() && self.shadow_bias >= 0.0) {
            return invalid("shadow bias must be finite and non-negative");
        }

        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. `depth` counts the bounces taken
/// so far; once it reaches `config.max_depth` only emitted light is returned.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = world.hit(ray, Interval::new(config.shadow_bias, f32::INFINITY)) else {
        return config.background.color(ray);
    };

    // Get emission from material (for lights)
    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);
    if depth >= config.max_depth {
        return emitted;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered_color = ray_color(&result.scattered, world, depth + 1, config, rng);
            emitted + result.attenuation * scattered_color
        }
        // Ray was absorbed - just return emission
        None => emitted,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize one linear channel to 8 bits.
#[inline]
fn channel_to_u8(linear: f32) -> u8 {
    (255.99 * linear_to_gamma(linear).min(1.0)) as u8
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        channel_to_u8(color.x),
        channel_to_u8(color.y),
        channel_to_u8(color.z),
    ]
}

/// Render a single pixel with multi-sampling.
///
/// `(x, row)` are image coordinates with row 0 at the top. The pixel draws
/// from its own generator, so its value does not depend on render order.
/// Coordinates outside the image yield black.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    row: u32,
    config: &RenderConfig,
) -> Color {
    if x >= config.width || row >= config.height {
        return Color::ZERO;
    }

    let pixel_index = row as u64 * config.width as u64 + x as u64;
    let mut rng = pixel_rng(config.seed, pixel_index);

    // Viewport t runs bottom-up.
    let j = (config.height - 1 - row) as f32;
    let i = x as f32;

    let samples = config.samples_per_pixel.max(1);
    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let offset = sample_square(&mut rng);
        let s = (i + 0.5 + offset.x) / config.width as f32;
        let t = (j + 0.5 + offset.y) / config.height as f32;
        let ray = camera.get_ray(s, t, &mut rng);
        pixel_color += ray_color(&ray, world, 0, config, &mut rng);
    }

    // Average the samples
    pixel_color / samples as f32
}

/// Linear-color image, rows stored top-first.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at column `x` of row `row` (row 0 is the top).
    pub fn get(&self, x: u32, row: u32) -> Color {
        self.pixels[self.index(x, row)]
    }

    /// Set the pixel at column `x` of row `row` (row 0 is the top).
    pub fn set(&mut self, x: u32, row: u32, color: Color) {
        let index = self.index(x, row);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, row: u32) -> usize {
        row as usize * self.width as usize + x as usize
    }

    /// Gamma-corrected 8-bit RGB bytes, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color_to_rgb(*color))
            .collect()
    }
}

/// Render the entire scene to an image buffer.
///
/// Buckets are traced in parallel on the rayon pool. The result is the same
/// for a given seed whatever the thread count or bucket size.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> ImageBuffer {
    let start = Instant::now();
    let buckets = generate_buckets(config.width, config.height, config.bucket_size.max(1));
    log::info!(
        "Rendering {}x{} at {} spp, max depth {} ({} buckets)",
        config.width,
        config.height,
        config.samples_per_pixel,
        config.max_depth,
        buckets.len()
    );

    let results: Vec<_> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, world, config))
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in results {
        result.blit(&mut image);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraConfig, DiffuseLight, HittableList, Lambertian, Sphere};
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: Color, b: Color, eps: f32) -> bool {
        (a - b).abs().max_element() < eps
    }

    fn diffuse_sphere_world() -> HittableList {
        let mut world = HittableList::new();
        world.push(
            Sphere::new(
                Vec3::new(0.0, 0.0, -1.0),
                0.5,
                Lambertian::new(Color::new(0.5, 0.5, 0.5)),
            )
            .unwrap(),
        );
        world
    }

    #[test]
    fn test_sky_gradient() {
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        let down = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -2.0, 0.0)));

        assert!(close(up, Color::new(0.5, 0.7, 1.0), 1e-6));
        assert!(close(down, Color::new(1.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_miss_returns_background() {
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);

        let sky = RenderConfig::default();
        assert!(close(
            ray_color(&ray, &world, 0, &sky, &mut rng),
            Color::new(0.5, 0.7, 1.0),
            1e-6
        ));

        let black = RenderConfig {
            background: Background::Solid(Color::ZERO),
            ..RenderConfig::default()
        };
        assert_eq!(ray_color(&ray, &world, 0, &black, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_single_bounce_under_white_sky_is_albedo() {
        // One bounce off a convex diffuse sphere always escapes to the sky.
        let world = diffuse_sphere_world();
        let config = RenderConfig {
            max_depth: 1,
            background: Background::Solid(Color::ONE),
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        for _ in 0..20 {
            let color = ray_color(&ray, &world, 0, &config, &mut rng);
            assert!(close(color, Color::splat(0.5), 1e-6));
        }
    }

    #[test]
    fn test_depth_cap_returns_black_for_diffuse() {
        let world = diffuse_sphere_world();
        let config = RenderConfig {
            max_depth: 0,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_emitters_shine_even_at_depth_cap() {
        let mut world = HittableList::new();
        world.push(
            Sphere::new(
                Vec3::new(0.0, 0.0, -3.0),
                1.0,
                DiffuseLight::new(Color::new(4.0, 2.0, 1.0)),
            )
            .unwrap(),
        );
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        for max_depth in [0, 1, 50] {
            let config = RenderConfig {
                max_depth,
                background: Background::Solid(Color::ZERO),
                ..RenderConfig::default()
            };
            let color = ray_color(&ray, &world, 0, &config, &mut rng);
            assert_eq!(color, Color::new(4.0, 2.0, 1.0));
        }
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::new(4.0, -1.0, 0.25)), [255, 0, 127]);
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let bad = [
            RenderConfig {
                width: 0,
                ..RenderConfig::default()
            },
            RenderConfig {
                height: 0,
                ..RenderConfig::default()
            },
            RenderConfig {
                samples_per_pixel: 0,
                ..RenderConfig::default()
            },
            RenderConfig {
                bucket_size: 0,
                ..RenderConfig::default()
            },
            RenderConfig {
                shadow_bias: -0.1,
                ..RenderConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(SceneError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_config_from_json() {
        let config: RenderConfig = serde_json::from_str(
            r#"{ "width": 64, "samples_per_pixel": 8, "background": { "solid": [0.0, 0.0, 0.0] } }"#,
        )
        .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 100);
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.background, Background::Solid(Color::ZERO));
        assert_eq!(config.shadow_bias, 0.001);

        let sky: RenderConfig = serde_json::from_str(r#"{ "background": "sky" }"#).unwrap();
        assert_eq!(sky.background, Background::Sky);
    }

    #[test]
    fn test_render_orientation() {
        // Empty world: top rows look up into the blue, bottom rows toward white.
        let camera = CameraConfig::default().build().unwrap();
        let config = RenderConfig {
            width: 8,
            height: 4,
            samples_per_pixel: 2,
            ..RenderConfig::default()
        };
        let image = render(&camera, &HittableList::new(), &config);

        assert_eq!(image.pixels.len(), 32);
        assert!(image.get(4, 0).x < image.get(4, 3).x);
    }

    #[test]
    fn test_render_is_deterministic() {
        let camera = CameraConfig::default().build().unwrap();
        let world = diffuse_sphere_world();
        let config = RenderConfig {
            width: 20,
            height: 10,
            samples_per_pixel: 4,
            seed: 7,
            bucket_size: 8,
            ..RenderConfig::default()
        };

        let first = render(&camera, &world, &config);
        let second = render(&camera, &world, &config);
        assert_eq!(first, second);

        // Bucket layout does not change which stream a pixel uses.
        let rebucketed = render(
            &camera,
            &world,
            &RenderConfig {
                bucket_size: 3,
                ..config.clone()
            },
        );
        assert_eq!(first, rebucketed);

        let reseeded = render(&camera, &world, &RenderConfig { seed: 8, ..config });
        assert_ne!(first, reseeded);
    }

    #[test]
    fn test_render_pixel_converges_with_samples() {
        let camera = CameraConfig::default().build().unwrap();
        let world = diffuse_sphere_world();
        let base = RenderConfig {
            width: 20,
            height: 10,
            ..RenderConfig::default()
        };
        // Pixel looking at the sphere's lit upper half.
        let (x, row) = (10, 3);

        let reference = render_pixel(
            &camera,
            &world,
            x,
            row,
            &RenderConfig {
                samples_per_pixel: 20_000,
                seed: 1_000,
                ..base.clone()
            },
        );

        let mean_error = |samples: u32| -> f32 {
            (0..16u64)
                .map(|seed| {
                    let config = RenderConfig {
                        samples_per_pixel: samples,
                        seed,
                        ..base.clone()
                    };
                    (render_pixel(&camera, &world, x, row, &config) - reference).length()
                })
                .sum::<f32>()
                / 16.0
        };

        let coarse = mean_error(4);
        let fine = mean_error(256);
        // Error shrinks like 1/sqrt(spp): 64x the samples should cut it about 8x.
        assert!(fine < coarse / 4.0, "fine = {}, coarse = {}", fine, coarse);
        assert!(fine < 0.05, "fine = {}", fine);
    }

    #[test]
    fn test_render_pixel_outside_image_is_black() {
        let camera = CameraConfig::default().build().unwrap();
        let config = RenderConfig {
            width: 4,
            height: 2,
            samples_per_pixel: 1,
            ..RenderConfig::default()
        };
        let world = HittableList::new();

        assert_eq!(render_pixel(&camera, &world, 0, 2, &config), Color::ZERO);
        assert_eq!(render_pixel(&camera, &world, 4, 0, &config), Color::ZERO);
        // Inside the image the sky is never black.
        assert_ne!(render_pixel(&camera, &world, 3, 1, &config), Color::ZERO);
    }
}
