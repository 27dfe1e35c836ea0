// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// RGB color, linear space. Components are usually in [0, 1] but emitters may exceed 1.
pub type Color = Vec3;

/// A position in world space.
pub type Point3 = Vec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_color_is_componentwise() {
        let albedo = Color::new(0.5, 0.25, 1.0);
        let light = Color::new(2.0, 4.0, 0.5);
        assert_eq!(albedo * light, Color::new(1.0, 1.0, 0.5));
    }
}
