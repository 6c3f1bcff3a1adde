//! Shared scene-construction helpers for integration tests. Builds scenes
//! directly through the core constructors (spheres, matte material, BVH)
//! rather than through the scene-description parser, which is out of
//! scope for the core crate.

use std::sync::Arc;

use raytracer::bvh::BVH;
use raytracer::camera::PerspectiveCamera;
use raytracer::filter::BoxFilter;
use raytracer::film::Film;
use raytracer::integrator::{IntegratorRadiance, SamplerIntegrator};
use raytracer::light::Light;
use raytracer::material::matte::MatteMaterial;
use raytracer::primitive::{GeometricPrimitive, Primitive};
use raytracer::sampler::random::RandomSampler;
use raytracer::scene::Scene;
use raytracer::shapes::sphere::Sphere;
use raytracer::spectrum::Spectrum;
use raytracer::texture::ConstantTexture;
use raytracer::{Bounds2f, Point2i, Transform};
use image::{ImageBuffer, Rgb};

/// A single unit sphere at the origin with a perfectly diffuse matte
/// material of the given albedo, wrapped as the sole primitive in the
/// scene along with whatever lights are supplied.
pub fn sphere_scene(albedo: Spectrum, lights: Vec<Box<dyn Light>>) -> Scene {
    let material: Arc<MatteMaterial> = Arc::new(MatteMaterial::new(
        Arc::new(ConstantTexture(albedo)),
        Arc::new(ConstantTexture(0.0)),
    ));

    let sphere = Sphere::whole(Transform::IDENTITY, Transform::IDENTITY, 1.0);
    let material: Arc<dyn raytracer::material::Material> = material;
    let prim = GeometricPrimitive::new(sphere, Some(material), None);
    let prims: Vec<Box<dyn Primitive>> = vec![Box::new(prim)];
    let bvh = BVH::build(prims);

    Scene::new(bvh, lights)
}

/// A camera looking down the -z axis at the origin from `eye`, with a
/// square field of view wide enough to frame a unit sphere.
pub fn looking_at_origin(eye: f32, resolution: Point2i, fov_deg: f32) -> PerspectiveCamera {
    let camera_to_world = Transform::camera_look_at(
        raytracer::Point3f::new(0.0, 0.0, eye),
        raytracer::Point3f::new(0.0, 0.0, 0.0),
        raytracer::Vec3f::new(0.0, 1.0, 0.0),
    );
    let screen_window: Bounds2f = ((-1.0, -1.0), (1.0, 1.0)).into();
    PerspectiveCamera::new(
        camera_to_world,
        resolution,
        screen_window,
        (0.0, 1.0),
        0.0,
        1e6,
        fov_deg,
    )
}

/// Renders `scene` through `camera` at `resolution` with `spp` samples per
/// pixel using the given integrator, returning the developed RGB image.
pub fn render(
    scene: &Scene,
    camera: PerspectiveCamera,
    resolution: Point2i,
    spp: usize,
    integrator: impl IntegratorRadiance,
) -> ImageBuffer<Rgb<f32>, Vec<f32>> {
    let filter = BoxFilter::default();
    let crop_window: Bounds2f = ((0.0, 0.0), (1.0, 1.0)).into();
    let film = Film::new(resolution, crop_window, filter, 1.0);
    let sampler = RandomSampler::new(spp);

    let mut integrator = SamplerIntegrator { camera: Box::new(camera), radiance: integrator };
    integrator.render_parallel(scene, &film, sampler);

    film.into_image_buffer()
}
