//! Material trait for surface scattering.

use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::{HitRecord, Texture};
use glint_math::{Color, Point3, Ray, Vec3};
use rand::RngCore;

/// Index of refraction assumed on the outside of every dielectric.
pub const AIR_IOR: f32 = 1.0003;

/// Outcome of a scattering event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Fraction of the scattered ray's radiance that reaches the viewer
    pub attenuation: Color,
    /// The outgoing ray, starting at the hit point
    pub scattered: Ray,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns the attenuation and scattered ray, or `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterResult>;

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _u: f32, _v: f32, _p: Point3) -> Color {
        Color::ZERO
    }
}

impl<M: Material + ?Sized> Material for Box<M> {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        (**self).scatter(ray_in, rec, rng)
    }

    fn emitted(&self, u: f32, v: f32, p: Point3) -> Color {
        (**self).emitted(u, v, p)
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Texture,
}

impl Lambertian {
    /// Create a new Lambertian material from a color or a texture.
    pub fn new(albedo: impl Into<Texture>) -> Self {
        Self {
            albedo: albedo.into(),
        }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough (clamped)
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz can push the ray below the surface; absorb it then.
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, direction),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material. Non-absorbing.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    pub fn ior(&self) -> f32 {
        self.ior
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let direction = ray_in.direction();

        // Grazing rays (dot == 0) count as leaving the medium.
        let inside = direction.dot(rec.normal) >= 0.0;
        let (n1, n2, normal) = if inside {
            (self.ior, AIR_IOR, -rec.normal)
        } else {
            (AIR_IOR, self.ior, rec.normal)
        };

        // Total internal reflection leaves no choice; otherwise one uniform
        // draw picks reflection with the Schlick probability.
        let scattered_direction = match refract(direction, normal, n1, n2) {
            Some(refracted) if gen_f32(rng) >= schlick(direction, normal, n1, n2) => refracted,
            _ => reflect(direction, normal),
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, scattered_direction),
        })
    }
}

/// Diffuse light emitter.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Texture,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color or texture.
    pub fn new(emit: impl Into<Texture>) -> Self {
        Self { emit: emit.into() }
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        // Lights don't scatter rays
        None
    }

    fn emitted(&self, u: f32, v: f32, p: Point3) -> Color {
        self.emit.value(u, v, p)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal. The length of `v` is preserved.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `incoming` through an interface from index `n1` into index `n2`.
///
/// `normal` must be unit length and point against `incoming`. Returns the
/// transmitted direction, or `None` on total internal reflection.
pub fn refract(incoming: Vec3, normal: Vec3, n1: f32, n2: f32) -> Option<Vec3> {
    let unit = incoming.normalize();
    let cos_i = unit.dot(normal);
    let eta = n1 / n2;
    let discriminant = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if discriminant <= 0.0 {
        return None;
    }
    Some(eta * unit - (eta * cos_i + discriminant.sqrt()) * normal)
}

/// Schlick's approximation of the Fresnel reflectance, in [0, 1].
///
/// Leaving a denser medium uses the transmitted angle, so the curve stays
/// continuous up to the critical angle, past which it is 1.
pub fn schlick(incoming: Vec3, normal: Vec3, n1: f32, n2: f32) -> f32 {
    let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
    let mut cosine = (-incoming.normalize().dot(normal)).clamp(0.0, 1.0);

    if n1 > n2 {
        let eta = n1 / n2;
        let sin2_t = eta * eta * (1.0 - cosine * cosine);
        if sin2_t >= 1.0 {
            return 1.0;
        }
        cosine = (1.0 - sin2_t).sqrt();
    }

    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
