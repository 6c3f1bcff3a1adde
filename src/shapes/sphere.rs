use crate::Float;
use crate::geometry::{Transform, Ray, Transformable};
use crate::shapes::Shape;
use crate::geometry::bounds::Bounds3;
use crate::interaction::{SurfaceInteraction, DiffGeom, SurfaceHit};
use crate::err_float::{EFloat, gamma};
use crate::math::quadratic;
use crate::{Point2f, Point3f, Normal3, Vec3f};
use crate::sampling::uniform_sample_sphere;
use cgmath::{EuclideanSpace, InnerSpace};
use std::borrow::Borrow;

pub struct Sphere<T: Borrow<Transform> = Transform> {
    object_to_world: T,
    world_to_object: T,
    reverse_orientation: bool,

    radius: Float,
    z_min: Float,
    z_max: Float,
    theta_min: Float,
    theta_max: Float,
    phi_max: Float,
}

impl<T: Borrow<Transform>> Sphere<T> {
    pub fn new(
        object_to_world: T,
        world_to_object: T,
        reverse_orientation: bool,
        radius: Float,
        z_min: Float,
        z_max: Float,
        phi_max: Float,
    ) -> Self {
        Self {
            object_to_world, world_to_object, reverse_orientation,
            radius,
            z_min: Float::min(z_min, z_max).clamp(-radius, radius),

            z_max: Float::max(z_min, z_max).clamp(-radius, radius),
            theta_min: Float::clamp(z_min / radius, -1.0, 1.0).acos(),
            theta_max: Float::clamp(z_max / radius, -1.0, 1.0).acos(),
            phi_max: phi_max.clamp(0.0, 360.0).to_radians(),
        }
    }

    /// A full, unclipped sphere of the given radius.
    pub fn whole(object_to_world: T, world_to_object: T, radius: Float) -> Self {
        Self::new(object_to_world, world_to_object, false, radius, -radius, radius, 360.0)
    }
}

impl<T: Borrow<Transform> + Send + Sync> Shape for Sphere<T> {
    fn object_bound(&self) -> Bounds3<f32> {
        bounds3f!((-self.radius, -self.radius, self.z_min), (self.radius, self.radius, self.z_max))
    }

    fn object_to_world(&self) -> &Transform {
        self.object_to_world.borrow()
    }

    fn world_to_object(&self) -> &Transform {
        self.world_to_object.borrow()
    }

    fn reverse_orientation(&self) -> bool {
        self.reverse_orientation
    }

    fn area(&self) -> Float {
        self.phi_max * self.radius * (self.z_max - self.z_min)
    }

    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction)> {
        let world_to_object = self.world_to_object.borrow();
        let object_to_world = self.object_to_world.borrow();

        // Transform ray into object space, tracking its origin's error bounds.
        let (o_obj, o_err) = world_to_object.tf_exact_to_err(ray.origin);
        let (d_obj, d_err) = world_to_object.tf_exact_to_err(ray.dir);

        let ox = EFloat::with_err(o_obj.x, o_err.x);
        let oy = EFloat::with_err(o_obj.y, o_err.y);
        let oz = EFloat::with_err(o_obj.z, o_err.z);
        let dx = EFloat::with_err(d_obj.x, d_err.x);
        let dy = EFloat::with_err(d_obj.y, d_err.y);
        let dz = EFloat::with_err(d_obj.z, d_err.z);

        let a = dx * dx + dy * dy + dz * dz;
        let b = (dx * ox + dy * oy + dz * oz) * EFloat::from(2.0);
        let c = ox * ox + oy * oy + oz * oz - EFloat::from(self.radius) * EFloat::from(self.radius);

        let (t0, t1) = quadratic(a, b, c)?;

        if t0.upper_bound() > ray.t_max || t1.lower_bound() <= 0.0 {
            return None;
        }
        let mut t_shape_hit = t0;
        if t_shape_hit.lower_bound() <= 0.0 {
            t_shape_hit = t1;
            if t_shape_hit.upper_bound() > ray.t_max {
                return None;
            }
        }

        let compute_hit = |t: EFloat| -> Option<(Point3f, Float)> {
            let p_hit_raw = o_obj + t.v * d_obj.to_vec();
            // Refine hit point to lie exactly on the sphere.
            let mut p_hit = Point3f::from_vec(p_hit_raw.to_vec() * (self.radius / p_hit_raw.to_vec().magnitude()));
            if p_hit.x == 0.0 && p_hit.y == 0.0 {
                p_hit.x = 1e-5 * self.radius;
            }
            let mut phi = p_hit.y.atan2(p_hit.x);
            if phi < 0.0 {
                phi += 2.0 * std::f32::consts::PI;
            }
            if (self.z_min > -self.radius && p_hit.z < self.z_min)
                || (self.z_max < self.radius && p_hit.z > self.z_max)
                || phi > self.phi_max
            {
                None
            } else {
                Some((p_hit, phi))
            }
        };

        let mut used_t1 = t_shape_hit.v == t1.v;
        let (p_hit, phi) = match compute_hit(t_shape_hit) {
            Some(v) => v,
            None => {
                if used_t1 {
                    return None;
                }
                t_shape_hit = t1;
                used_t1 = true;
                if t_shape_hit.upper_bound() > ray.t_max {
                    return None;
                }
                compute_hit(t_shape_hit)?
            }
        };

        let u = phi / self.phi_max;
        let cos_theta = (p_hit.z / self.radius).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        let v = (theta - self.theta_min) / (self.theta_max - self.theta_min);

        let z_radius = (p_hit.x * p_hit.x + p_hit.y * p_hit.y).sqrt();
        let inv_z_radius = 1.0 / z_radius;
        let cos_phi = p_hit.x * inv_z_radius;
        let sin_phi = p_hit.y * inv_z_radius;
        let dpdu = Vec3f::new(-self.phi_max * p_hit.y, self.phi_max * p_hit.x, 0.0);
        let sin_theta = Float::clamp((1.0 - cos_theta * cos_theta).sqrt(), 0.0, 1.0).max(1e-8);
        let dpdv = (self.theta_max - self.theta_min)
            * Vec3f::new(p_hit.z * cos_phi, p_hit.z * sin_phi, -self.radius * sin_theta);

        let d2p_duu = -self.phi_max * self.phi_max * Vec3f::new(p_hit.x, p_hit.y, 0.0);
        let d2p_duv = (self.theta_max - self.theta_min) * p_hit.z * self.phi_max * Vec3f::new(-sin_phi, cos_phi, 0.0);
        let d2p_dvv = -(self.theta_max - self.theta_min) * (self.theta_max - self.theta_min)
            * Vec3f::new(p_hit.x, p_hit.y, p_hit.z);

        let e1 = dpdu.dot(dpdu);
        let f1 = dpdu.dot(dpdv);
        let g1 = dpdv.dot(dpdv);
        let n = dpdu.cross(dpdv).normalize();
        let e2 = n.dot(d2p_duu);
        let f2 = n.dot(d2p_duv);
        let g2 = n.dot(d2p_dvv);

        let inv_egf2 = 1.0 / (e1 * g1 - f1 * f1);
        let dndu = Normal3(
            (f2 * f1 - e2 * g1) * inv_egf2 * dpdu + (e2 * f1 - f2 * e1) * inv_egf2 * dpdv,
        );
        let dndv = Normal3(
            (g2 * f1 - f2 * g1) * inv_egf2 * dpdu + (f2 * f1 - g2 * e1) * inv_egf2 * dpdv,
        );

        let p_err = gamma(5) * Vec3f::new(p_hit.x.abs(), p_hit.y.abs(), p_hit.z.abs());

        let geom = DiffGeom { dpdu, dpdv, dndu, dndv };
        let mut isect = SurfaceInteraction::new(
            p_hit,
            p_err,
            ray.time,
            Point2f::new(u, v),
            -d_obj,
            Normal3(n),
            geom,
        );

        if self.flip_normals() {
            isect.n *= -1.0;
            isect.shading_n *= -1.0;
        }

        let isect_world = object_to_world.transform(isect);
        Some((t_shape_hit.v, isect_world))
    }

    fn sample(&self, u: Point2f) -> SurfaceHit {
        let object_to_world = self.object_to_world.borrow();
        let p_obj = Point3f::from_vec(self.radius * uniform_sample_sphere(u));
        let n_obj = Normal3(p_obj.to_vec().normalize());
        let p_err = gamma(5) * Vec3f::new(p_obj.x.abs(), p_obj.y.abs(), p_obj.z.abs());

        let (p, p_err) = object_to_world.tf_err_to_err(p_obj, p_err);
        let mut n = object_to_world.transform(n_obj);
        if self.flip_normals() {
            n = Normal3(-n.0);
        }

        SurfaceHit { p, p_err, time: 0.0, n }
    }
}
