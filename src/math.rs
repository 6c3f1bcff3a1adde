use crate::err_float::{EFloat, MACHINE_EPSILON};
use crate::{Float, Vec3f, Point3f};

pub const INFINITY: Float = std::f32::INFINITY;
pub const PI: Float = std::f32::consts::PI;

/// Bound shared by the generic `Bounds2`/`Bounds3` types, covering both the
/// integer pixel-bounds and floating point world-bounds use cases.
pub trait Scalar: cgmath::BaseNum + Copy {
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    fn one() -> Self;
    fn zero() -> Self;
    fn max_value() -> Self;
    fn min_value() -> Self;
}

impl Scalar for f32 {
    fn max(self, other: Self) -> Self { f32::max(self, other) }
    fn min(self, other: Self) -> Self { f32::min(self, other) }
    fn one() -> Self { 1.0 }
    fn zero() -> Self { 0.0 }
    fn max_value() -> Self { std::f32::INFINITY }
    fn min_value() -> Self { std::f32::NEG_INFINITY }
}

impl Scalar for i32 {
    fn max(self, other: Self) -> Self { i32::max(self, other) }
    fn min(self, other: Self) -> Self { i32::min(self, other) }
    fn one() -> Self { 1 }
    fn zero() -> Self { 0 }
    fn max_value() -> Self { i32::MAX }
    fn min_value() -> Self { i32::MIN }
}

/// Per-component helpers that cgmath doesn't provide directly.
pub trait ComponentWiseExt {
    fn abs(self) -> Self;
}

impl ComponentWiseExt for Vec3f {
    fn abs(self) -> Self {
        Vec3f::new(self.x.abs(), self.y.abs(), self.z.abs())
    }
}

/// Index of the largest-magnitude component of `v`.
pub fn max_dimension(v: Vec3f) -> usize {
    if v.x > v.y {
        if v.x > v.z { 0 } else { 2 }
    } else {
        if v.y > v.z { 1 } else { 2 }
    }
}

pub fn permute_vec(v: Vec3f, x: usize, y: usize, z: usize) -> Vec3f {
    Vec3f::new(v[x], v[y], v[z])
}

pub fn permute_point(p: Point3f, x: usize, y: usize, z: usize) -> Point3f {
    Point3f::new(p[x], p[y], p[z])
}

/// Angle between `v` and the +z axis.
pub fn spherical_theta(v: Vec3f) -> Float {
    v.z.clamp(-1.0, 1.0).acos()
}

/// Azimuthal angle of `v` about the +z axis, in `[0, 2*PI)`.
pub fn spherical_phi(v: Vec3f) -> Float {
    let p = v.y.atan2(v.x);
    if p < 0.0 { p + 2.0 * PI } else { p }
}

pub fn lerp(t: Float, v1: Float, v2: Float) -> Float {
    (1.0 - t) * v1 + t * v2
}

/// A value that knows how to linearly interpolate with itself; used by
/// `MIPMap` levels and by `Spectrum`.
pub trait Lerp: Copy {
    fn lerp(t: Float, a: Self, b: Self) -> Self;
}

impl Lerp for Float {
    fn lerp(t: Float, a: Self, b: Self) -> Self {
        lerp(t, a, b)
    }
}

/// Solve `a*t^2 + b*t + c = 0` keeping track of conservative error bounds,
/// returning the two roots in increasing order.
pub fn quadratic(a: EFloat, b: EFloat, c: EFloat) -> Option<(EFloat, EFloat)> {
    let discrim: f64 = b.v as f64 * b.v as f64 - 4.0 * a.v as f64 * c.v as f64;
    if discrim < 0.0 {
        return None;
    }

    let root_discrim = discrim.sqrt();
    let root_discrim = EFloat::with_err(root_discrim as Float, MACHINE_EPSILON * root_discrim as Float);

    let q: EFloat = if b.v < 0.0 {
        -0.5 * (b - root_discrim)
    } else {
        -0.5 * (b + root_discrim)
    };

    let t0 = q / a;
    let t1 = c / q;

    if t0.v > t1.v {
        Some((t1, t0))
    } else {
        Some((t0, t1))
    }
}

/// Solves `A * [x, y]^T = b` via Cramer's rule, returning `None` if `A` is
/// (numerically) singular. Used to recover `du/dx, dv/dx` etc. from screen
/// space and surface-parametrization differentials.
pub fn solve_linear_system_2x2(a: cgmath::Matrix2<Float>, b: cgmath::Vector2<Float>) -> Option<cgmath::Vector2<Float>> {
    let det = a.x.x * a.y.y - a.y.x * a.x.y;
    if det.abs() < 1e-10 {
        return None;
    }
    let inv_det = 1.0 / det;
    let x = (a.y.y * b.x - a.y.x * b.y) * inv_det;
    let y = (a.x.x * b.y - a.x.y * b.x) * inv_det;
    Some(cgmath::Vector2::new(x, y))
}

/// Builds a direction vector from spherical coordinates given directly as
/// `sin_theta`/`cos_theta` (saving a repeated `acos`/`sin` round trip in
/// microfacet sampling) and azimuthal angle `phi`, in the canonical basis
/// (x, y as the tangent plane, z as the normal).
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> crate::Vec3f {
    crate::Vec3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Multiply-importance-sampling power heuristic (beta = 2), per Veach.
pub fn power_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f.is_infinite() {
        return 1.0;
    }
    (f * f) / (f * f + g * g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_roots() {
        // t^2 - 3t + 2 = 0 -> t = 1, 2
        let a = EFloat::from(1.0);
        let b = EFloat::from(-3.0);
        let c = EFloat::from(2.0);
        let (t0, t1) = quadratic(a, b, c).unwrap();
        assert!((t0.v - 1.0).abs() < 1e-4);
        assert!((t1.v - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_power_heuristic_symmetry() {
        let w = power_heuristic(1, 0.5, 1, 0.5);
        assert!((w - 0.5).abs() < 1e-6);
    }
}
