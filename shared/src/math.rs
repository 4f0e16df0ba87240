use serde::{Deserialize, Serialize};

/// A vector in 2D court space. Positive x points right, positive y points down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    /// Normal of the top and bottom walls.
    pub const HORIZONTAL_WALL: Vector2 = Vector2 { x: 0.0, y: 1.0 };
    /// Normal of the paddle faces.
    pub const VERTICAL_WALL: Vector2 = Vector2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// True when the vector has unit length within `epsilon`.
    pub fn is_unit(&self, epsilon: f32) -> bool {
        (self.magnitude() - 1.0).abs() < epsilon
    }
}

/// Standard 2D dot product.
pub fn dot(a: Vector2, b: Vector2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Divides `v` by its magnitude.
///
/// Returns `None` for the zero vector (or anything with a non-finite
/// magnitude) instead of producing NaN components; callers pick a fresh
/// direction in that case.
pub fn normalize(v: Vector2) -> Option<Vector2> {
    let mag = v.magnitude();
    if mag == 0.0 || !mag.is_finite() {
        None
    } else {
        Some(Vector2 {
            x: v.x / mag,
            y: v.y / mag,
        })
    }
}

/// Mirrors `v` about the plane perpendicular to `normal`: `v - 2(v.n)n`.
///
/// `normal` must be unit length. The result is not re-normalized.
pub fn reflect(v: Vector2, normal: Vector2) -> Vector2 {
    let d = dot(v, normal);
    v.add(&normal.scale(-2.0 * d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_dot_product() {
        assert_eq!(dot(Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0)), 11.0);
        assert_eq!(dot(Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0)), 0.0);
    }

    #[test]
    fn test_normalize() {
        let n = normalize(Vector2::new(3.0, 4.0)).unwrap();
        assert_approx_eq!(n.x, 0.6, 1e-6);
        assert_approx_eq!(n.y, 0.8, 1e-6);
        assert!(n.is_unit(1e-6));
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(Vector2::default()), None);
        assert_eq!(normalize(Vector2::new(f32::NAN, 1.0)), None);
    }

    #[test]
    fn test_reflect_off_horizontal_wall() {
        let v = normalize(Vector2::new(1.0, 1.0)).unwrap();
        let r = reflect(v, Vector2::HORIZONTAL_WALL);
        assert_approx_eq!(r.x, v.x, 1e-6);
        assert_approx_eq!(r.y, -v.y, 1e-6);
    }

    #[test]
    fn test_reflect_off_vertical_wall() {
        let r = reflect(Vector2::new(-1.0, 0.0), Vector2::VERTICAL_WALL);
        assert_eq!(r, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_double_reflection_is_identity() {
        let v = normalize(Vector2::new(0.8, -0.3)).unwrap();
        for normal in [Vector2::HORIZONTAL_WALL, Vector2::VERTICAL_WALL] {
            let back = reflect(reflect(v, normal), normal);
            assert_approx_eq!(back.x, v.x, 1e-6);
            assert_approx_eq!(back.y, v.y, 1e-6);
        }
    }

    #[test]
    fn test_reflection_preserves_magnitude() {
        let v = normalize(Vector2::new(-0.2, 0.9)).unwrap();
        let r = reflect(v, Vector2::HORIZONTAL_WALL);
        assert_approx_eq!(r.magnitude(), 1.0, 1e-6);
    }
}
