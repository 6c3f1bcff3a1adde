//! Core geometric primitives: rays, normals, and small vector-math helpers
//! shared across shapes, reflection and lights.

pub mod bounds;
pub mod transform;

pub use bounds::{Bounds2f, Bounds2i, Bounds3f};
pub use transform::{Transform, Transformable};

use crate::{Float, Point3f, Vec3f};
use cgmath::{InnerSpace, Zero};

/// A ray with a parametric interval `[t_min, t_max]`. `dir` is not required
/// to be normalized -- scaling transforms deliberately do not renormalize it
/// (see the open question in the design notes), so `t_min`/`t_max` stay
/// meaningful as "fraction of `dir`" without a sqrt on every transform.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3f,
    pub dir: Vec3f,
    pub t_min: Float,
    pub t_max: Float,
    pub time: Float,
}

impl Ray {
    pub fn new(origin: Point3f, dir: Vec3f) -> Self {
        Ray { origin, dir, t_min: 0.0, t_max: crate::math::INFINITY, time: 0.0 }
    }

    pub fn with_time(origin: Point3f, dir: Vec3f, time: Float) -> Self {
        Ray { origin, dir, t_min: 0.0, t_max: crate::math::INFINITY, time }
    }

    pub fn at(&self, t: Float) -> Point3f {
        self.origin + self.dir * t
    }

    /// Reverses the ray direction in place, keeping the same origin. Used by
    /// the direct-light estimator's 0-bounce "backward tracing" step.
    pub fn reverse(&self) -> Ray {
        Ray { origin: self.origin, dir: -self.dir, t_min: self.t_min, t_max: self.t_max, time: self.time }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Differential {
    pub rx_origin: Point3f,
    pub ry_origin: Point3f,
    pub rx_dir: Vec3f,
    pub ry_dir: Vec3f,
}

#[derive(Debug, Clone, Copy)]
pub struct RayDifferential {
    pub ray: Ray,
    pub diff: Option<Differential>,
}

impl RayDifferential {
    pub fn new(ray: Ray) -> Self {
        RayDifferential { ray, diff: None }
    }

    /// Shrinks the auxiliary rays' footprint towards the main ray -- used
    /// once per pixel sample so that ray-differential-derived texture
    /// filter widths scale down as `1/sqrt(spp)`.
    pub fn scale_differentials(&mut self, s: Float) {
        if let Some(diff) = &mut self.diff {
            diff.rx_origin = self.ray.origin + (diff.rx_origin - self.ray.origin) * s;
            diff.ry_origin = self.ray.origin + (diff.ry_origin - self.ray.origin) * s;
            diff.rx_dir = self.ray.dir + (diff.rx_dir - self.ray.dir) * s;
            diff.ry_dir = self.ray.dir + (diff.ry_dir - self.ray.dir) * s;
        }
    }
}

/// A surface normal. Kept as a distinct newtype (rather than a bare
/// `Vec3f`) so shading code can't accidentally treat an unnormalized
/// direction as a normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal3(pub Vec3f);

impl Normal3 {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Normal3(Vec3f::new(x, y, z))
    }

    pub fn zero() -> Self {
        Normal3(Vec3f::zero())
    }

    pub fn normalize(self) -> Self {
        Normal3(self.0.normalize())
    }

    pub fn dot_vec(&self, v: Vec3f) -> Float {
        self.0.dot(v)
    }

    pub fn abs_dot_vec(&self, v: Vec3f) -> Float {
        self.0.dot(v).abs()
    }

    pub fn cross(&self, v: Vec3f) -> Vec3f {
        self.0.cross(v)
    }

    /// Flips `self` into the hemisphere of `v` if needed.
    pub fn faceforward(self, v: Vec3f) -> Normal3 {
        faceforward_normal(self, v)
    }
}

impl std::ops::Neg for Normal3 {
    type Output = Normal3;
    fn neg(self) -> Normal3 {
        Normal3(-self.0)
    }
}

impl std::ops::Mul<Float> for Normal3 {
    type Output = Normal3;
    fn mul(self, rhs: Float) -> Normal3 {
        Normal3(self.0 * rhs)
    }
}

impl std::ops::MulAssign<Float> for Normal3 {
    fn mul_assign(&mut self, rhs: Float) {
        self.0 *= rhs;
    }
}

impl From<Vec3f> for Normal3 {
    fn from(v: Vec3f) -> Self {
        Normal3(v)
    }
}

pub fn abs_dot(a: Vec3f, b: Vec3f) -> Float {
    a.dot(b).abs()
}

/// Flips `n` so that it lies in the same hemisphere as `v`.
pub fn faceforward(n: Vec3f, v: Vec3f) -> Vec3f {
    if n.dot(v) < 0.0 { -n } else { n }
}

pub fn faceforward_normal(n: Normal3, v: Vec3f) -> Normal3 {
    if n.dot_vec(v) < 0.0 { -n } else { n }
}

/// Builds an orthonormal basis `(v2, v3)` given a unit vector `v1`, using
/// Duff et al.'s branchless construction.
pub fn coordinate_system(v1: Vec3f) -> (Vec3f, Vec3f) {
    let sign = 1.0_f32.copysign(v1.z);
    let a = -1.0 / (sign + v1.z);
    let b = v1.x * v1.y * a;
    let v2 = Vec3f::new(1.0 + sign * v1.x * v1.x * a, sign * b, -sign * v1.x);
    let v3 = Vec3f::new(b, sign + v1.y * v1.y * a, -v1.y);
    (v2, v3)
}

/// Offsets a ray origin away from a surface along its geometric normal by
/// an amount derived from the position's accumulated floating point error,
/// to avoid self-intersection ("shadow acne") without an ad-hoc epsilon.
pub fn offset_ray_origin(p: Point3f, p_err: Vec3f, n: Normal3, w: Vec3f) -> Point3f {
    let d = abs_dot(n.0, p_err);
    let mut offset = n.0 * d;
    if n.dot_vec(w) < 0.0 {
        offset = -offset;
    }
    let mut po = p + offset;
    for i in 0..3 {
        if offset[i] > 0.0 {
            po[i] = crate::err_float::next_float_up(po[i]);
        } else if offset[i] < 0.0 {
            po[i] = crate::err_float::next_float_down(po[i]);
        }
    }
    po
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_coordinate_system_orthonormal() {
        let v1 = Vec3f::new(0.0, 0.0, 1.0);
        let (v2, v3) = coordinate_system(v1);
        assert_abs_diff_eq!(v1.dot(v2), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v1.dot(v3), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v2.dot(v3), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v2.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_faceforward() {
        let n = Vec3f::new(0.0, 0.0, 1.0);
        let v = Vec3f::new(0.0, 0.0, -1.0);
        assert_eq!(faceforward(n, v), -n);
    }

    #[test]
    fn test_ray_reverse() {
        let r = Ray::new(Point3f::new(0.0, 0.0, 0.0), Vec3f::new(1.0, 0.0, 0.0));
        let rev = r.reverse();
        assert_eq!(rev.dir, -r.dir);
        assert_eq!(rev.origin, r.origin);
    }
}
