use crate::geometry::bounds::Bounds3f;
use crate::geometry::Ray;
use crate::interaction::SurfaceInteraction;
use crate::light::AreaLight;
use crate::material::Material;
use crate::shapes::Shape;
use std::sync::Arc;

/// Anything that can be intersected by a ray and handed off to the
/// acceleration structure: a shape plus the surface-appearance metadata
/// (material, optional area light) needed once a hit is confirmed.
pub trait Primitive: Send + Sync {
    fn world_bound(&self) -> Bounds3f;

    /// Finds the closest intersection along `ray`, shrinking `ray.t_max`
    /// to the hit distance on success. The returned interaction borrows
    /// back from `self` so later shading can look up material/area light.
    fn intersect<'s>(&'s self, ray: &mut Ray) -> Option<SurfaceInteraction<'s>>;

    fn intersect_test(&self, ray: &Ray) -> bool;

    fn material(&self) -> Option<&dyn Material>;

    fn area_light(&self) -> Option<&dyn AreaLight>;
}

/// A single shape paired with its material and (if it's an emitter) area
/// light. The common case of a `Primitive`: most scenes are built entirely
/// out of these, wrapping triangles and spheres.
pub struct GeometricPrimitive<S: Shape> {
    pub shape: S,
    pub material: Option<Arc<dyn Material>>,
    pub light: Option<Arc<dyn AreaLight>>,
}

impl<S: Shape> GeometricPrimitive<S> {
    pub fn new(shape: S, material: Option<Arc<dyn Material>>, light: Option<Arc<dyn AreaLight>>) -> Self {
        Self { shape, material, light }
    }
}

impl<S: Shape> Primitive for GeometricPrimitive<S> {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect<'s>(&'s self, ray: &mut Ray) -> Option<SurfaceInteraction<'s>> {
        let (t_hit, mut isect) = self.shape.intersect(ray)?;
        ray.t_max = t_hit;
        isect.primitive = Some(self as &'s dyn Primitive);
        Some(isect)
    }

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.shape.intersect_test(ray)
    }

    fn material(&self) -> Option<&dyn Material> {
        self.material.as_ref().map(|m| m.as_ref())
    }

    fn area_light(&self) -> Option<&dyn AreaLight> {
        self.light.as_ref().map(|l| l.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::sphere::Sphere;
    use crate::geometry::Transform;

    #[test]
    fn test_geometric_primitive_bound() {
        let tf = Transform::IDENTITY;
        let sphere = Sphere::whole(&tf, &tf, 1.0);
        let prim = GeometricPrimitive { shape: sphere, material: None, light: None };
        let bound = prim.world_bound();
        assert_eq!(bound.min.x, -1.0);
        assert_eq!(bound.max.x, 1.0);
    }
}
