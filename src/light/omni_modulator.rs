//! Wraps any other [`Light`], multiplying its emitted/sampled radiance by
//! a direction-mapped filter — e.g. a tabulated IES photometric
//! distribution baked into a small spherical image. The filter is keyed
//! by the same phi/theta → (u, v) parameterization
//! [`InfiniteAreaLight`](crate::light::infinite::InfiniteAreaLight) uses
//! for its environment map, evaluated in the wrapped light's local frame
//! so the filter orientation follows `light_to_world`.

use cgmath::InnerSpace;

use crate::consts;
use crate::interaction::SurfaceHit;
use crate::light::{Light, LightFlags, LiSample};
use crate::mipmap::MIPMap;
use crate::spectrum::Spectrum;
use crate::{spherical_phi, spherical_theta, Float, Point2f, RayDifferential, Transform, Vec3f};
use std::sync::Arc;

pub struct OmniModulatedLight<L: Light> {
    inner: L,
    filter: Arc<MIPMap<Spectrum>>,
}

impl<L: Light> OmniModulatedLight<L> {
    pub fn new(inner: L, filter: Arc<MIPMap<Spectrum>>) -> Self {
        Self { inner, filter }
    }

    fn filter_towards(&self, world_dir: Vec3f) -> Spectrum {
        let w = self.inner.world_to_light().transform(world_dir).normalize();
        let st = Point2f::new(
            spherical_phi(w) * (1.0 / (2.0 * consts::PI)),
            spherical_theta(w) * consts::FRAC_1_PI,
        );
        self.filter.lookup_trilinear_width(st, 0.0)
    }
}

impl<L: Light> Light for OmniModulatedLight<L> {
    fn flags(&self) -> LightFlags {
        self.inner.flags()
    }

    fn light_to_world(&self) -> &Transform {
        self.inner.light_to_world()
    }

    fn world_to_light(&self) -> &Transform {
        self.inner.world_to_light()
    }

    fn n_samples(&self) -> usize {
        self.inner.n_samples()
    }

    fn preprocess(&mut self, scene_prims: &crate::bvh::BVH) {
        self.inner.preprocess(scene_prims)
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> LiSample {
        let mut sample = self.inner.sample_incident_radiance(reference, u);
        if sample.pdf > 0.0 {
            sample.radiance = sample.radiance * self.filter_towards(sample.wi);
        }
        sample
    }

    fn pdf_incident_radiance(&self, reference: &SurfaceHit, wi: Vec3f) -> Float {
        self.inner.pdf_incident_radiance(reference, wi)
    }

    fn environment_emitted_radiance(&self, ray: &RayDifferential) -> Spectrum {
        let base = self.inner.environment_emitted_radiance(ray);
        if base.is_black() {
            return base;
        }
        base * self.filter_towards(ray.ray.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::infinite::InfiniteAreaLight;
    use crate::mipmap::ImageWrap;
    use crate::spectrum::CoefficientSpectrum;
    use approx::assert_abs_diff_eq;

    #[test]
    fn uniform_filter_does_not_change_emission() {
        let env = InfiniteAreaLight::new_uniform(Spectrum::uniform(2.0), Transform::IDENTITY);
        let filter = Arc::new(MIPMap::new((1, 1), vec![Spectrum::uniform(1.0)], ImageWrap::Repeat));
        let modulated = OmniModulatedLight::new(env, filter);

        let ray = RayDifferential::new(crate::Ray::new(
            crate::Point3f::new(0.0, 0.0, 0.0),
            Vec3f::new(0.0, 0.0, 1.0),
        ));
        let radiance = modulated.environment_emitted_radiance(&ray);
        assert_abs_diff_eq!(radiance.to_rgb()[0], 2.0, epsilon = 1e-4);
    }

    #[test]
    fn half_filter_halves_emission() {
        let env = InfiniteAreaLight::new_uniform(Spectrum::uniform(2.0), Transform::IDENTITY);
        let filter = Arc::new(MIPMap::new((1, 1), vec![Spectrum::uniform(0.5)], ImageWrap::Repeat));
        let modulated = OmniModulatedLight::new(env, filter);

        let ray = RayDifferential::new(crate::Ray::new(
            crate::Point3f::new(0.0, 0.0, 0.0),
            Vec3f::new(0.0, 0.0, 1.0),
        ));
        let radiance = modulated.environment_emitted_radiance(&ray);
        assert_abs_diff_eq!(radiance.to_rgb()[0], 1.0, epsilon = 1e-4);
    }
}
