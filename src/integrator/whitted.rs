use bumpalo::Bump;

use crate::integrator::{uniform_sample_one_light, IntegratorRadiance};
use crate::material::TransportMode;
use crate::reflection::BxDFType;
use crate::sampler::Sampler;
use crate::scene::Scene;
use crate::spectrum::Spectrum;
use crate::RayDifferential;

/// Whitted's original recursive ray tracer, generalized to the scene's
/// full BSDF model: direct lighting via NEE at every non-specular hit,
/// plus recursive tracing through perfectly specular reflection and
/// transmission. Unlike [`super::path::PathIntegrator`] it never samples
/// a new path direction off a glossy/diffuse lobe, so it misses indirect
/// diffuse illumination entirely -- that tradeoff is what makes it cheap.
pub struct WhittedIntegrator {
    pub max_depth: u16,
}

impl IntegratorRadiance for WhittedIntegrator {
    fn preprocess(&mut self, _scene: &Scene, _sampler: &mut dyn Sampler) {}

    fn incident_radiance(
        &self,
        ray: &mut RayDifferential,
        scene: &Scene,
        sampler: &mut dyn Sampler,
        arena: &Bump,
        depth: u16,
    ) -> Spectrum {
        let mut radiance = Spectrum::uniform(0.0);

        let si = scene.intersect(&mut ray.ray);
        let mut si = match si {
            Some(si) => si,
            None => return scene.environment_emitted_radiance(ray),
        };

        radiance += si.emitted_radiance(-ray.ray.dir);

        let bsdf = match si.compute_scattering_functions(ray, arena, true, TransportMode::Radiance) {
            Some(bsdf) => bsdf,
            None => return radiance,
        };

        if bsdf.num_components(BxDFType::all() & !BxDFType::SPECULAR) > 0 {
            radiance += uniform_sample_one_light(&si, &bsdf, scene, arena, sampler);
        }

        if depth + 1 < self.max_depth {
            radiance += self.specular_reflect(ray, &si, &bsdf, scene, sampler, arena, depth);
            radiance += self.specular_transmit(ray, &si, &bsdf, scene, sampler, arena, depth);
        }

        radiance
    }
}



