//! Standalone renderer CLI: builds a small built-in Cornell-box-style
//! scene directly through the core constructors (the scene-description
//! parser is an external collaborator, out of scope for this crate),
//! runs the path-traced BSDF+NEE estimator over it, and writes the
//! resulting HDR frame to disk.
//!
//! Exit code `0` on success, non-zero on argument or I/O failure, per the
//! "standard renderer invocation" external interface.

use std::fs::File;
use std::process::exit;
use std::sync::Arc;

use clap::{App, Arg};

use raytracer::bvh::BVH;
use raytracer::camera::PerspectiveCamera;
use raytracer::film::Film;
use raytracer::filter::BoxFilter;
use raytracer::integrator::path::PathIntegrator;
use raytracer::integrator::SamplerIntegrator;
use raytracer::light::diffuse::DiffuseAreaLightBuilder;
use raytracer::light::{AreaLightBuilder, Light};
use raytracer::material::matte::MatteMaterial;
use raytracer::material::Material;
use raytracer::primitive::{GeometricPrimitive, Primitive};
use raytracer::sampler::random::RandomSampler;
use raytracer::scene::Scene;
use raytracer::shapes::triangle::TriangleMesh;
use raytracer::shapes::sphere::Sphere;
use raytracer::spectrum::Spectrum;
use raytracer::texture::ConstantTexture;
use raytracer::{Bounds2f, Point2i, Point3f, Transform};

fn matte(albedo: Spectrum) -> Arc<dyn Material> {
    Arc::new(MatteMaterial::new(
        Arc::new(ConstantTexture(albedo)),
        Arc::new(ConstantTexture(0.0)),
    ))
}

/// Two CCW triangles spanning the quad `a, b, c, d`, as a standalone mesh.
fn rectangle(a: Point3f, b: Point3f, c: Point3f, d: Point3f) -> Arc<TriangleMesh> {
    Arc::new(TriangleMesh::new(
        Transform::IDENTITY,
        vec![0, 1, 2, 0, 2, 3],
        vec![a, b, c, d],
        None,
        None,
        None,
        false,
    ))
}

fn matte_rectangle_prims(mesh: &Arc<TriangleMesh>, material: Arc<dyn Material>) -> Vec<Box<dyn Primitive>> {
    mesh.clone()
        .iter_triangles()
        .map(|tri| Box::new(GeometricPrimitive::new(tri, Some(material.clone()), None)) as Box<dyn Primitive>)
        .collect()
}

/// A Cornell-box-lite scene: five matte walls, a diffuse sphere, and a
/// small rectangular area light set into the ceiling.
fn cornell_box_scene() -> Scene {
    let white = matte(Spectrum::uniform(0.73));
    let red = matte(Spectrum::from([0.63, 0.065, 0.05]));
    let green_wall = matte(Spectrum::from([0.14, 0.45, 0.091]));

    let mut prims: Vec<Box<dyn Primitive>> = Vec::new();
    let mut lights: Vec<Box<dyn Light>> = Vec::new();

    let floor = rectangle(
        Point3f::new(-2.0, -2.0, -2.0),
        Point3f::new(2.0, -2.0, -2.0),
        Point3f::new(2.0, -2.0, 2.0),
        Point3f::new(-2.0, -2.0, 2.0),
    );
    prims.extend(matte_rectangle_prims(&floor, white.clone()));

    let ceiling = rectangle(
        Point3f::new(-2.0, 2.0, 2.0),
        Point3f::new(2.0, 2.0, 2.0),
        Point3f::new(2.0, 2.0, -2.0),
        Point3f::new(-2.0, 2.0, -2.0),
    );
    prims.extend(matte_rectangle_prims(&ceiling, white.clone()));

    let back_wall = rectangle(
        Point3f::new(-2.0, -2.0, -2.0),
        Point3f::new(-2.0, 2.0, -2.0),
        Point3f::new(2.0, 2.0, -2.0),
        Point3f::new(2.0, -2.0, -2.0),
    );
    prims.extend(matte_rectangle_prims(&back_wall, white.clone()));

    let left_wall = rectangle(
        Point3f::new(-2.0, -2.0, 2.0),
        Point3f::new(-2.0, 2.0, 2.0),
        Point3f::new(-2.0, 2.0, -2.0),
        Point3f::new(-2.0, -2.0, -2.0),
    );
    prims.extend(matte_rectangle_prims(&left_wall, red));

    let right_wall = rectangle(
        Point3f::new(2.0, -2.0, -2.0),
        Point3f::new(2.0, 2.0, -2.0),
        Point3f::new(2.0, 2.0, 2.0),
        Point3f::new(2.0, -2.0, 2.0),
    );
    prims.extend(matte_rectangle_prims(&right_wall, green_wall));

    let light_quad = rectangle(
        Point3f::new(-0.5, 1.99, 0.5),
        Point3f::new(0.5, 1.99, 0.5),
        Point3f::new(0.5, 1.99, -0.5),
        Point3f::new(-0.5, 1.99, -0.5),
    );
    let light_builder = DiffuseAreaLightBuilder { emit: Spectrum::uniform(3.0), n_samples: 1 };
    for tri_id in 0..2u32 {
        use raytracer::shapes::triangle::Triangle;
        let light_shape = Arc::new(Triangle::new(light_quad.clone(), tri_id));
        let light = Arc::new(light_builder_clone(&light_builder).create(light_shape.clone()));
        let primitive_shape = Triangle::new(light_quad.clone(), tri_id);
        prims.push(Box::new(GeometricPrimitive::new(
            primitive_shape,
            Some(white.clone()),
            Some(light.clone() as Arc<dyn raytracer::light::AreaLight>),
        )) as Box<dyn Primitive>);
        lights.push(Box::new(AreaLightHandle(light)));
    }

    let sphere = Sphere::whole(Transform::IDENTITY, Transform::IDENTITY, 0.8);
    prims.push(Box::new(GeometricPrimitive::new(sphere, Some(white), None)));

    let bvh = BVH::build(prims);
    Scene::new(bvh, lights)
}

fn light_builder_clone(b: &DiffuseAreaLightBuilder) -> DiffuseAreaLightBuilder {
    DiffuseAreaLightBuilder { emit: b.emit, n_samples: b.n_samples }
}

/// `Scene::lights` wants `Box<dyn Light>`; the same emitter is also
/// referenced by its primitive as `Arc<dyn AreaLight>` so direct hits can
/// look up its emission, so the light list holds a thin forwarding
/// wrapper around the shared `Arc`.
struct AreaLightHandle<S: raytracer::shapes::Shape + 'static>(Arc<raytracer::light::diffuse::DiffuseAreaLight<S>>);

impl<S: raytracer::shapes::Shape + 'static> Light for AreaLightHandle<S> {
    fn flags(&self) -> raytracer::light::LightFlags {
        self.0.flags()
    }
    fn light_to_world(&self) -> &Transform {
        self.0.light_to_world()
    }
    fn world_to_light(&self) -> &Transform {
        self.0.world_to_light()
    }
    fn n_samples(&self) -> usize {
        self.0.n_samples()
    }
    fn sample_incident_radiance(
        &self,
        reference: &raytracer::interaction::SurfaceHit,
        u: raytracer::Point2f,
    ) -> raytracer::light::LiSample {
        self.0.sample_incident_radiance(reference, u)
    }
    fn pdf_incident_radiance(&self, reference: &raytracer::interaction::SurfaceHit, wi: raytracer::Vec3f) -> raytracer::Float {
        self.0.pdf_incident_radiance(reference, wi)
    }
}

fn run() -> anyhow::Result<()> {
    let matches = App::new("render")
        .about("Offline path-traced renderer over a built-in demo scene")
        .arg(Arg::with_name("out").long("out").takes_value(true).default_value("render.hdr"))
        .arg(Arg::with_name("width").long("width").takes_value(true).default_value("320"))
        .arg(Arg::with_name("height").long("height").takes_value(true).default_value("240"))
        .arg(Arg::with_name("spp").long("spp").takes_value(true).default_value("64"))
        .arg(Arg::with_name("max-depth").long("max-depth").takes_value(true).default_value("8"))
        .arg(Arg::with_name("threads").long("threads").takes_value(true).default_value("0"))
        .get_matches();

    let width: i32 = matches.value_of("width").unwrap().parse()?;
    let height: i32 = matches.value_of("height").unwrap().parse()?;
    let spp: usize = matches.value_of("spp").unwrap().parse()?;
    let max_depth: u16 = matches.value_of("max-depth").unwrap().parse()?;
    let threads: usize = matches.value_of("threads").unwrap().parse()?;
    let out_path = matches.value_of("out").unwrap().to_string();

    let scene = cornell_box_scene();

    let resolution = Point2i::new(width, height);
    let camera_to_world = Transform::camera_look_at(
        Point3f::new(0.0, 0.0, 6.0),
        Point3f::new(0.0, 0.0, 0.0),
        raytracer::Vec3f::new(0.0, 1.0, 0.0),
    );
    let screen_window: Bounds2f = ((-1.0, -1.0), (1.0, 1.0)).into();
    let camera = PerspectiveCamera::new(camera_to_world, resolution, screen_window, (0.0, 1.0), 0.0, 1e6, 40.0);

    let crop_window: Bounds2f = ((0.0, 0.0), (1.0, 1.0)).into();
    let film = Film::new(resolution, crop_window, BoxFilter::default(), 1.0);
    let sampler = RandomSampler::new(spp);

    let mut integrator = SamplerIntegrator {
        camera: Box::new(camera),
        radiance: PathIntegrator::new(max_depth, 1.0),
    };

    if threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        integrator.render_with_pool(&scene, &film, sampler, &pool);
    } else {
        integrator.render_parallel(&scene, &film, sampler);
    }

    let img = film.into_image_buffer();
    let mut file = File::create(&out_path)?;
    let encoder = image::hdr::HDREncoder::new(&mut file);
    let pixels: Vec<_> = img.pixels().map(|p| *p).collect();
    encoder.encode(pixels.as_slice(), img.width() as usize, img.height() as usize)?;

    tracing::info!(out = %out_path, %width, %height, spp, "render complete");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        exit(1);
    }
}
