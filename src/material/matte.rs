use crate::texture::TextureRef;
use crate::spectrum::Spectrum;
use crate::material::{Material, TransportMode};
use crate::interaction::SurfaceInteraction;
use crate::Float;
use bumpalo::Bump;
use cgmath::Deg;
use crate::reflection::bsdf::Bsdf;
use crate::reflection::{LambertianReflection, OrenNayar};

pub struct MatteMaterial {
    diffuse: TextureRef<Spectrum>,
    sigma: TextureRef<Float>,
}

impl MatteMaterial {
    pub fn new(diffuse: TextureRef<Spectrum>, sigma: TextureRef<Float>) -> Self {
        Self { diffuse, sigma }
    }
}

impl Material for MatteMaterial {
    fn compute_scattering_functions<'a>(&self, si: &SurfaceInteraction, arena: &'a Bump, _mode: TransportMode, _allow_multiple_lobes: bool) -> Bsdf<'a> {
        let mut bsdf = Bsdf::new(si, 1.0);

        let r = self.diffuse.evaluate(si).clamp_positive();
        let sigma = self.sigma.evaluate(si);
        if !r.is_black() {
            if sigma == 0.0 {
                let lambertian = arena.alloc(LambertianReflection { r });
                bsdf.add(lambertian);
            } else {
                let oren_nayar = arena.alloc(OrenNayar::new(r, Deg(sigma)));
                bsdf.add(oren_nayar);
            }
        }

        bsdf
    }
}
