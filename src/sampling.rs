use crate::{Point2f, Vec2f, Vec3f, Float, Point3f};
use std::f32;
use rand::Rng;
#[cfg(test)]
use cgmath::InnerSpace;

pub fn concentric_sample_disk(u: Point2f) -> Point2f {
    // map sample from [0, 1] to [-1, 1]
    let u_offset = 2.0 * u - Vec2f::new(1.0, 1.0);
    if u_offset == Point2f::new(0.0, 0.0) {
        return Point2f::new(0.0, 0.0);
    }

    let (theta, r) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, f32::consts::FRAC_PI_4 * (u_offset.y / u_offset.x))
    } else {
        (u_offset.y, f32::consts::FRAC_PI_2 - f32::consts::FRAC_PI_4 * (u_offset.x / u_offset.y))
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

pub fn cosine_sample_hemisphere(u: Point2f) -> Vec3f {
    let d = concentric_sample_disk(u);
    let z = Float::sqrt(Float::max(0.0, 1.0 - d.x * d.x - d.y * d.y));
    Vec3f::new(d.x, d.y, z)
}

pub fn rejection_sample_shere(rng: &mut impl Rng, radius: Float) -> Point3f {
    let p = loop {
        let x = rng.gen_range(-radius, radius);
        let y = rng.gen_range(-radius, radius);
        let z = rng.gen_range(-radius, radius);
        let d = x * x + y * y + z * z;
        if d < radius * radius { break Point3f::new(x, y, z) }
    };
    p
}

/// Uniformly samples barycentric coordinates `[b0, b1]` over a triangle
/// (the third coordinate is `1 - b0 - b1`).
pub fn uniform_sample_triangle(u: Point2f) -> [Float; 2] {
    let su0 = u.x.sqrt();
    [1.0 - su0, u.y * su0]
}

/// Uniformly samples a direction over the full sphere, used for area-light
/// sampling on spheres.
pub fn uniform_sample_sphere(u: Point2f) -> Vec3f {
    let z = 1.0 - 2.0 * u.x;
    let r = Float::sqrt(Float::max(0.0, 1.0 - z * z));
    let phi = 2.0 * f32::consts::PI * u.y;
    Vec3f::new(r * phi.cos(), r * phi.sin(), z)
}

fn find_interval(cdf: &[Float], u: Float) -> usize {
    let mut first = 0usize;
    let mut len = cdf.len();
    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        if cdf[middle] <= u {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    first.saturating_sub(1).min(cdf.len().saturating_sub(2))
}

/// A piecewise-constant 1D probability distribution built over `n` equal
/// width buckets, supporting importance sampling and pdf evaluation.
#[derive(Clone, Debug)]
pub struct Distribution1D {
    pub func: Vec<Float>,
    cdf: Vec<Float>,
    pub func_int: Float,
}

impl Distribution1D {
    pub fn new(f: &[Float]) -> Self {
        let n = f.len();
        let mut cdf = vec![0.0; n + 1];
        for i in 1..=n {
            cdf[i] = cdf[i - 1] + f[i - 1] / n as Float;
        }

        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, c) in cdf.iter_mut().enumerate().skip(1) {
                *c = i as Float / n as Float;
            }
        } else {
            for c in cdf.iter_mut().skip(1) {
                *c /= func_int;
            }
        }

        Distribution1D { func: f.to_vec(), cdf, func_int }
    }

    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Returns `(sampled value in [0,1), pdf, bucket index)`.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        let offset = find_interval(&self.cdf, u);
        let mut du = u - self.cdf[offset];
        let span = self.cdf[offset + 1] - self.cdf[offset];
        if span > 0.0 {
            du /= span;
        }

        let pdf = if self.func_int > 0.0 { self.func[offset] / self.func_int } else { 0.0 };
        let x = (offset as Float + du) / self.count() as Float;
        (x, pdf, offset)
    }

    pub fn discrete_pdf(&self, index: usize) -> Float {
        self.func[index] / (self.func_int * self.count() as Float)
    }
}

/// A piecewise-constant 2D distribution built as a marginal distribution
/// over rows of conditional 1D distributions, used for environment map
/// importance sampling.
#[derive(Clone, Debug)]
pub struct Distribution2D {
    p_conditional_v: Vec<Distribution1D>,
    p_marginal: Distribution1D,
    nu: usize,
}

impl Distribution2D {
    pub fn new(func: &[Float], nu: usize, nv: usize) -> Self {
        assert_eq!(func.len(), nu * nv);
        let p_conditional_v: Vec<Distribution1D> = (0..nv)
            .map(|v| Distribution1D::new(&func[v * nu..(v + 1) * nu]))
            .collect();

        let marginal_func: Vec<Float> = p_conditional_v.iter().map(|d| d.func_int).collect();
        let p_marginal = Distribution1D::new(&marginal_func);

        Distribution2D { p_conditional_v, p_marginal, nu }
    }

    /// Samples `(u, v)` in `[0,1)^2` and returns the joint pdf w.r.t. area.
    pub fn sample_continuous(&self, u: Point2f) -> (Point2f, Float) {
        let (d1, pdf1, v) = self.p_marginal.sample_continuous(u.y);
        let (d0, pdf0, _) = self.p_conditional_v[v].sample_continuous(u.x);
        (Point2f::new(d0, d1), pdf0 * pdf1)
    }

    pub fn pdf(&self, p: Point2f) -> Float {
        let nv = self.p_marginal.count();
        let iu = ((p.x * self.nu as Float) as usize).min(self.nu - 1);
        let iv = ((p.y * nv as Float) as usize).min(nv - 1);
        if self.p_marginal.func_int == 0.0 {
            0.0
        } else {
            self.p_conditional_v[iv].func[iu] / self.p_marginal.func_int
        }
    }
}

#[cfg(test)]
mod dist_tests {
    use super::*;

    #[test]
    fn test_distribution1d_uniform() {
        let f = vec![1.0; 4];
        let d = Distribution1D::new(&f);
        assert!((d.func_int - 1.0).abs() < 1e-6);
        let (x, pdf, _) = d.sample_continuous(0.5);
        assert!((pdf - 1.0).abs() < 1e-6);
        assert!(x >= 0.0 && x <= 1.0);
    }

    #[test]
    fn test_distribution1d_weighted_favors_large_bucket() {
        let f = vec![1.0, 10.0];
        let d = Distribution1D::new(&f);
        let (_, pdf_small, _) = d.sample_continuous(0.01);
        let (_, pdf_big, _) = d.sample_continuous(0.99);
        assert!(pdf_big > pdf_small);
    }

    #[test]
    fn test_distribution2d_pdf_sums_to_integral() {
        let func = vec![1.0, 1.0, 1.0, 1.0];
        let d = Distribution2D::new(&func, 2, 2);
        let (_, pdf) = d.sample_continuous(Point2f::new(0.25, 0.25));
        assert!((pdf - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_sample_triangle_in_range() {
        let [b0, b1] = uniform_sample_triangle(Point2f::new(0.3, 0.7));
        assert!(b0 >= 0.0 && b0 <= 1.0);
        assert!(b1 >= 0.0 && b1 <= 1.0);
        assert!(b0 + b1 <= 1.0001);
    }

    #[test]
    fn test_uniform_sample_sphere_unit_length() {
        let v = uniform_sample_sphere(Point2f::new(0.25, 0.6));
        assert!((v.magnitude() - 1.0).abs() < 1e-5);
    }
}