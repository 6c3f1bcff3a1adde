use crate::geometry::Normal3;
use crate::material::TransportMode;
use crate::math::solve_linear_system_2x2;
use crate::{offset_ray_origin, Float, Point2f, Point3f, Ray, RayDifferential, Vec3f, Vec2f, Differential};
use bumpalo::Bump;
use cgmath::{EuclideanSpace, InnerSpace, Matrix2, Vector2};
use crate::reflection::bsdf::Bsdf;
use crate::primitive::Primitive;

/// The minimal data needed to spawn a new ray from a hit: position (with
/// its accumulated floating point error bound) and time.
#[derive(Clone, Copy)]
pub struct HitPoint {
    pub p: Point3f,
    pub p_err: Vec3f,
    pub time: Float,
}

/// A bare shading point: just enough to spawn shadow/continuation rays from,
/// used by lights (which only need a point+normal, not a full
/// `SurfaceInteraction`) and by `VisibilityTester`.
#[derive(Clone, Copy)]
pub struct SurfaceHit {
    pub p: Point3f,
    pub p_err: Vec3f,
    pub time: Float,
    pub n: Normal3,
}

impl SurfaceHit {
    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        let o = offset_ray_origin(self.p, self.p_err, self.n, dir);
        Ray { origin: o, dir, t_min: 0.0, t_max: crate::math::INFINITY, time: self.time }
    }

    /// A shadow ray from `self` towards `other`, with `t_max` pulled in
    /// slightly short of 1 so the far endpoint's own surface isn't hit.
    pub fn spawn_ray_to_hit(&self, other: SurfaceHit) -> Ray {
        let dir = other.p - self.p;
        let mut ray = self.spawn_ray(dir);
        ray.t_max = 1.0 - 1e-4;
        ray
    }
}

pub struct SurfaceInteraction<'i> {
    pub hit: HitPoint,

    /// (u, v) coordinates from the parametrization of the surface
    pub uv: Point2f,

    pub wo: Vec3f,

    pub n: Normal3,

    pub geom: DiffGeom,

    pub shading_n: Normal3,

    pub shading_geom: DiffGeom,

    pub tex_diffs: Option<TextureDifferentials>,

    pub primitive: Option<&'i dyn Primitive>,
}

impl<'i> SurfaceInteraction<'i> {
    pub fn new(
        p: Point3f,
        p_err: Vec3f,
        time: Float,
        uv: Point2f,
        wo: Vec3f,
        n: Normal3,
        geom: DiffGeom,
    ) -> Self {
        Self {
            hit: HitPoint { p, p_err, time },
            uv,
            wo,
            n,
            geom,

            shading_n: n,
            shading_geom: geom,

            tex_diffs: None,
            primitive: None,
        }
    }

    /// Flips `shading_n` (and the shading partials) into the geometric
    /// hemisphere of `n` if `orientation_swaps` (reverse orientation xor
    /// transform-swaps-handedness), matching the shape that produced `geom`.
    pub fn set_shading_geometry(&mut self, shading_n: Normal3, shading_geom: DiffGeom, orientation_is_authoritative: bool) {
        self.shading_n = shading_n;
        self.shading_geom = shading_geom;
        if orientation_is_authoritative {
            self.n = crate::geometry::faceforward_normal(self.n, shading_n.0);
        } else {
            self.shading_n = crate::geometry::faceforward_normal(shading_n, self.n.0);
        }
    }

    pub fn spawn_ray(&self, dir: Vec3f) -> Ray {
        let o = offset_ray_origin(self.hit.p, self.hit.p_err, self.n, dir);
        Ray { origin: o, dir, t_min: 0.0, t_max: crate::math::INFINITY, time: self.hit.time }
    }

    pub fn spawn_ray_to(&self, target: Point3f) -> Ray {
        let dir = target - self.hit.p;
        let mut ray = self.spawn_ray(dir);
        ray.t_max = 1.0 - 1e-4;
        ray
    }

    pub fn spawn_ray_with_differentials(&self, dir: Vec3f, diff: Option<Differential>) -> RayDifferential {
        let ray = self.spawn_ray(dir);
        RayDifferential { ray, diff }
    }

    /// Emitted radiance towards `w` if this hit landed on an area light,
    /// zero otherwise.
    pub fn emitted_radiance(&self, w: Vec3f) -> crate::spectrum::Spectrum {
        match self.primitive.and_then(|p| p.area_light()) {
            Some(light) => {
                let hit = SurfaceHit { p: self.hit.p, p_err: self.hit.p_err, time: self.hit.time, n: self.n };
                light.emitted_radiance(hit, w)
            }
            None => crate::spectrum::Spectrum::uniform(0.0),
        }
    }

    pub fn compute_scattering_functions<'a>(
        &mut self,
        ray: &RayDifferential,
        arena: &'a Bump,
        allow_multiple_lobes: bool,
        mode: TransportMode,
    ) -> Option<Bsdf<'a>> {
        self.tex_diffs = self.compute_tex_differentials(ray);
        let material = self.primitive.expect("surface interaction has no primitive").material()?;
        Some(material.compute_scattering_functions(self, arena, mode, allow_multiple_lobes))
    }

    fn compute_tex_differentials(&self, ray: &RayDifferential) -> Option<TextureDifferentials> {
        let n = self.n;
        let diff = ray.diff?;
        let d = n.dot_vec(self.hit.p.to_vec());

        let px = {
            let tx = -(n.dot_vec(diff.rx_origin.to_vec()) - d) / n.dot_vec(diff.rx_dir);
            diff.rx_origin + tx * diff.rx_dir
        };

        let py = {
            let ty = -(n.dot_vec(diff.ry_origin.to_vec()) - d) / n.dot_vec(diff.ry_dir);
            diff.ry_origin + ty * diff.ry_dir
        };

        let dpdx = px - self.hit.p;
        let dpdy = py - self.hit.p;

        let (nx, ny, nz) = (n.0.x.abs(), n.0.y.abs(), n.0.z.abs());
        let dim = if nx > ny && nx > nz {
            (1, 2)
        } else if ny > nz {
            (0, 2)
        } else {
            (0, 1)
        };

        let dpdu = self.geom.dpdu;
        let dpdv = self.geom.dpdv;
        let a = Matrix2::from_cols(
            Vector2::new(dpdu[dim.0], dpdu[dim.1]),
            Vector2::new(dpdv[dim.0], dpdv[dim.1]),
        );

        let bx = Vec2f::new(dpdx[dim.0], dpdx[dim.1]);
        let by = Vec2f::new(dpdy[dim.0], dpdy[dim.1]);

        let sx = solve_linear_system_2x2(a, bx);
        let sy = solve_linear_system_2x2(a, by);
        let (dudx, dvdx) = sx.map(|v| (v.x, v.y)).unwrap_or((0.0, 0.0));
        let (dudy, dvdy) = sy.map(|v| (v.x, v.y)).unwrap_or((0.0, 0.0));

        Some(TextureDifferentials { dpdx, dpdy, dudx, dvdx, dudy, dvdy })
    }
}

#[derive(Clone, Copy)]
pub struct DiffGeom {
    pub dpdu: Vec3f,
    pub dpdv: Vec3f,
    pub dndu: Normal3,
    pub dndv: Normal3,
}

/// Partial derivatives used for texture antialiasing.
#[derive(Clone, Copy)]
pub struct TextureDifferentials {
    pub dpdx: Vec3f,
    pub dpdy: Vec3f,

    pub dudx: Float,
    pub dvdx: Float,

    pub dudy: Float,
    pub dvdy: Float,
}

/// Fixed capacity of the intersectable stack in `HitProbe`: deep enough for
/// any realistic acceleration-structure traversal path (kd-tree depth plus
/// a couple of nested transform/instance levels) without heap allocation.
const HIT_PROBE_STACK_DEPTH: usize = 16;

/// Scratch object modeling the probe described in spec §3/§4.2: distinct
/// from `SurfaceInteraction`, it is meant to accumulate the path of
/// intersectables visited on the way to a hit (for composite/instanced
/// primitives), the hit parametric `t`, and a small cache of raw reals
/// (barycentric coordinates, UVs) so a leaf intersection routine and the
/// caller that turns the probe into a full `SurfaceInteraction` don't need
/// a second traversal.
///
/// Not yet threaded through `Primitive`/`BVH`/`IndexedKdtree`: those still
/// intersect directly into an `Option<SurfaceInteraction>` in one step, so
/// this type's only current caller is its own unit test below. It is kept
/// as the shape the probe-based path would take, not as a wired feature.
pub struct HitProbe<'i> {
    hit_stack: arrayvec::ArrayVec<[&'i dyn Primitive; HIT_PROBE_STACK_DEPTH]>,
    hit_ray_t: Float,
    real_cache: [Float; 4],
    hit_detail_channel: u32,
}

impl<'i> HitProbe<'i> {
    pub fn new() -> Self {
        HitProbe {
            hit_stack: arrayvec::ArrayVec::new(),
            hit_ray_t: crate::math::INFINITY,
            real_cache: [0.0; 4],
            hit_detail_channel: 0,
        }
    }

    pub fn clear(&mut self) {
        self.hit_stack.clear();
        self.hit_ray_t = crate::math::INFINITY;
        self.real_cache = [0.0; 4];
        self.hit_detail_channel = 0;
    }

    /// Pushes an intermediate intersectable (e.g. a BVH/kd-tree inner
    /// wrapper) visited on the way to the base hit.
    pub fn push_intermediate_hit(&mut self, intersectable: &'i dyn Primitive) {
        self.hit_stack.push(intersectable);
    }

    /// Pushes the leaf intersectable that actually produced the hit and
    /// records the ray parameter at which it occurred.
    pub fn push_base_hit(&mut self, hit_target: &'i dyn Primitive, hit_ray_t: Float) {
        self.hit_stack.push(hit_target);
        self.hit_ray_t = hit_ray_t;
    }

    pub fn replace_current_hit_with(&mut self, intersectable: &'i dyn Primitive) {
        if let Some(top) = self.hit_stack.last_mut() {
            *top = intersectable;
        } else {
            self.hit_stack.push(intersectable);
        }
    }

    pub fn pop_intermediate_hit(&mut self) -> Option<&'i dyn Primitive> {
        self.hit_stack.pop()
    }

    pub fn current_hit(&self) -> Option<&'i dyn Primitive> {
        self.hit_stack.last().copied()
    }

    pub fn hit_ray_t(&self) -> Float {
        self.hit_ray_t
    }

    pub fn set_channel(&mut self, channel: u32) {
        self.hit_detail_channel = channel;
    }

    pub fn channel(&self) -> u32 {
        self.hit_detail_channel
    }

    pub fn cache_real3(&mut self, values: [Float; 3]) {
        self.real_cache[0] = values[0];
        self.real_cache[1] = values[1];
        self.real_cache[2] = values[2];
    }

    pub fn cached_real3(&self) -> [Float; 3] {
        [self.real_cache[0], self.real_cache[1], self.real_cache[2]]
    }
}

impl<'i> Default for HitProbe<'i> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_probe_push_pop() {
        let mut probe: HitProbe = HitProbe::new();
        assert!(probe.current_hit().is_none());
        probe.set_channel(2);
        probe.cache_real3([0.1, 0.2, 0.3]);
        assert_eq!(probe.channel(), 2);
        assert_eq!(probe.cached_real3(), [0.1, 0.2, 0.3]);
        probe.clear();
        assert_eq!(probe.channel(), 0);
        assert_eq!(probe.cached_real3(), [0.0, 0.0, 0.0]);
    }
}
