use crate::bvh::BVH;
use crate::light::Light;
use crate::primitive::Primitive;
use crate::spectrum::Spectrum;
use crate::{Bounds3f, Ray, RayDifferential, SurfaceInteraction};
use std::sync::Arc;

/// Accumulates primitives and lights while a scene is being built from a
/// loader, then bakes them into an immutable `Scene` (builds the BVH,
/// preprocesses lights).
#[derive(Default)]
pub struct SceneBuilder {
    primitives: Vec<Box<dyn Primitive>>,
    lights: Vec<Box<dyn Light>>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self { primitives: Vec::new(), lights: Vec::new() }
    }

    pub fn add_primitive(&mut self, prim: Box<dyn Primitive>) -> &mut Self {
        self.primitives.push(prim);
        self
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn build(self) -> Scene {
        let aggregate = BVH::build(self.primitives);
        Scene::new(aggregate, self.lights)
    }
}

/// The cooked, immutable view the renderer queries during `render()`: the
/// acceleration structure over all primitives, plus the lights (already
/// preprocessed against the built aggregate so world-space bounds are
/// available to infinite/distant lights).
pub struct Scene {
    pub primitives_aggregate: BVH<Box<dyn Primitive>>,
    pub lights: Vec<Arc<dyn Light>>,
}

impl Scene {
    pub fn new(primitives: BVH<Box<dyn Primitive>>, mut lights: Vec<Box<dyn Light>>) -> Self {
        for light in &mut lights {
            light.preprocess(&primitives);
        }

        Self {
            primitives_aggregate: primitives,
            lights: lights.into_iter().map(Arc::from).collect(),
        }
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        self.primitives_aggregate.intersect(ray)
    }

    pub fn intersect_test(&self, ray: &Ray) -> bool {
        self.primitives_aggregate.intersect_test(ray)
    }

    pub fn world_bound(&self) -> Bounds3f {
        self.primitives_aggregate.bounds
    }

    /// Sum of every infinite/background light's emitted radiance along a
    /// ray that escaped the scene.
    pub fn environment_emitted_radiance(&self, ray: &RayDifferential) -> Spectrum {
        self.lights.iter().fold(Spectrum::uniform(0.0), |acc, light| {
            acc + light.environment_emitted_radiance(ray)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scene_builder() {
        let scene = SceneBuilder::new().build();
        assert_eq!(scene.lights.len(), 0);
        assert!(scene.world_bound().min.x > scene.world_bound().max.x || scene.world_bound().min.x.is_infinite());
    }
}
