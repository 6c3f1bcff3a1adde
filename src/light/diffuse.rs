use crate::Float;
use crate::spectrum::Spectrum;
use std::sync::Arc;
use crate::shapes::Shape;
use crate::{Transform, Point2f, Vec3f};
use crate::interaction::SurfaceHit;
use crate::light::{AreaLight, AreaLightBuilder, Light, LightFlags, LiSample, VisibilityTester};
use cgmath::InnerSpace;

/// An area light whose emission is uniform radiance over one side of a
/// shape's surface (one-sided: only the hemisphere the shape's normal
/// points into emits).
pub struct DiffuseAreaLight<S: Shape> {
    emit: Spectrum,
    shape: Arc<S>,
    area: Float,
    n_samples: usize,
}

impl<S: Shape> DiffuseAreaLight<S> {
    pub fn new(emit: Spectrum, shape: Arc<S>, n_samples: usize) -> Self {
        let area = shape.area();
        Self { emit, shape, area, n_samples }
    }
}

impl<S: Shape> Light for DiffuseAreaLight<S> {
    fn flags(&self) -> LightFlags {
        LightFlags::Area
    }

    fn light_to_world(&self) -> &Transform {
        self.shape.object_to_world()
    }

    fn world_to_light(&self) -> &Transform {
        self.shape.world_to_object()
    }

    fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn sample_incident_radiance(&self, reference: &SurfaceHit, u: Point2f) -> LiSample {
        let p_shape = self.shape.sample(u);
        let mut wi = p_shape.p - reference.p;
        let dist2 = wi.magnitude2();
        let vis = VisibilityTester { p0: *reference, p1: p_shape };

        if dist2 == 0.0 {
            return LiSample { radiance: Spectrum::uniform(0.0), wi: Vec3f::new(0.0, 0.0, 0.0), pdf: 0.0, vis };
        }
        wi /= dist2.sqrt();

        let cos_theta = p_shape.n.abs_dot_vec(-wi);
        let pdf = if cos_theta == 0.0 { 0.0 } else { dist2 / (cos_theta * self.area) };
        let radiance = self.emitted_radiance(p_shape, -wi);

        LiSample { radiance, wi, pdf, vis }
    }

    fn pdf_incident_radiance(&self, reference: &SurfaceHit, wi: Vec3f) -> Float {
        let ray = reference.spawn_ray(wi);
        match self.shape.intersect(&ray) {
            Some((_t, isect)) => {
                let dist2 = (isect.hit.p - reference.p).magnitude2();
                let cos_theta = isect.n.abs_dot_vec(-wi);
                if cos_theta == 0.0 {
                    0.0
                } else {
                    dist2 / (cos_theta * self.area)
                }
            }
            None => 0.0,
        }
    }
}

impl<S: Shape> AreaLight for DiffuseAreaLight<S> {
    fn emitted_radiance(&self, hit: SurfaceHit, w: Vec3f) -> Spectrum {
        if hit.n.dot_vec(w) > 0.0 {
            self.emit
        } else {
            Spectrum::uniform(0.0)
        }
    }

    fn as_light(&self) -> &dyn Light {
        self
    }
}

/// Deferred construction: a `DiffuseAreaLight` needs the shape it's attached
/// to, which isn't known until the primitive owning both is assembled.
pub struct DiffuseAreaLightBuilder {
    pub emit: Spectrum,
    pub n_samples: usize,
}

impl<S: Shape + 'static> AreaLightBuilder<S> for DiffuseAreaLightBuilder {
    type Target = DiffuseAreaLight<S>;

    fn create(self, shape: Arc<S>) -> Self::Target {
        DiffuseAreaLight::new(self.emit, shape, self.n_samples)
    }
}
