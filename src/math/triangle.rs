use rand::Rng;

use super::{Point3, TOLERANCE};

/// A triangle in 3D space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle {
    /// Creates a triangle from its three corners.
    #[must_use]
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// Surface area of the triangle.
    #[must_use]
    pub fn area(&self) -> f64 {
        (self.b - self.a).cross(&(self.c - self.a)).norm() * 0.5
    }

    /// Returns `true` if the triangle has (numerically) zero area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.area() < TOLERANCE
    }

    /// Draws a point uniformly distributed over the triangle's surface.
    ///
    /// Uses the square-root barycentric mapping so samples do not bunch up
    /// at vertex `a`.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3 {
        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();
        let s = r1.sqrt();

        let u = 1.0 - s;
        let v = s * (1.0 - r2);
        let w = s * r2;

        Point3::from(self.a.coords * u + self.b.coords * v + self.c.coords * w)
    }
}
