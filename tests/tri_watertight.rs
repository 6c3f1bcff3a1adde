/*!
General integration test exercising BVH, triangle intersection and the
watertightness of the triangle intersect routine, plus the "BVH equals
brute force" invariant (spec scenario 5): for many random rays, the
acceleration structure's closest hit must agree with a linear scan.
*/

use std::sync::Arc;

use cgmath::{EuclideanSpace, InnerSpace};
use rand::distributions::{Distribution, UnitSphereSurface};
use rand::{thread_rng, Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

use raytracer::bvh::BVH;
use raytracer::primitive::{GeometricPrimitive, Primitive};
use raytracer::scene::Scene;
use raytracer::shapes::triangle::TriangleMesh;
use raytracer::{Float, Point3f, Ray, Transform, Vec3f};

/// An axis-aligned unit cube centered at the origin, as 12 triangles (2
/// per face, CCW winding as seen from outside).
fn unit_cube_mesh() -> Arc<TriangleMesh> {
    let vertices = vec![
        Point3f::new(-0.5, -0.5, -0.5),
        Point3f::new(0.5, -0.5, -0.5),
        Point3f::new(0.5, 0.5, -0.5),
        Point3f::new(-0.5, 0.5, -0.5),
        Point3f::new(-0.5, -0.5, 0.5),
        Point3f::new(0.5, -0.5, 0.5),
        Point3f::new(0.5, 0.5, 0.5),
        Point3f::new(-0.5, 0.5, 0.5),
    ];

    let quad = |a: u32, b: u32, c: u32, d: u32| [a, b, c, a, c, d];
    let indices: Vec<u32> = [
        quad(0, 3, 2, 1), // -z
        quad(4, 5, 6, 7), // +z
        quad(0, 1, 5, 4), // -y
        quad(3, 7, 6, 2), // +y
        quad(0, 4, 7, 3), // -x
        quad(1, 2, 6, 5), // +x
    ]
    .into_iter()
    .flatten()
    .collect();

    Arc::new(TriangleMesh::new(
        Transform::IDENTITY,
        indices,
        vertices,
        None,
        None,
        None,
        false,
    ))
}

fn cube_scene() -> (Scene, Arc<TriangleMesh>) {
    let mesh = unit_cube_mesh();
    let prims: Vec<Box<dyn Primitive>> = mesh
        .clone()
        .iter_triangles()
        .map(|tri| Box::new(GeometricPrimitive::new(tri, None, None)) as Box<dyn Primitive>)
        .collect();
    let bvh = BVH::build(prims);
    (Scene::new(bvh, vec![]), mesh)
}

#[test]
fn rays_from_outside_hit_the_cube() {
    let (scene, _mesh) = cube_scene();
    let mut rng = thread_rng();
    let surface = UnitSphereSurface::new();

    for [x, y, z] in surface.sample_iter(&mut rng).take(10_000) {
        let dir = Vec3f::new(x as Float, y as Float, z as Float);
        let origin = Point3f::from_vec(dir * 10.0);
        let mut ray = Ray::new(origin, -dir);

        assert!(scene.intersect_test(&ray));
        let isect = scene.intersect(&mut ray).expect("did not intersect cube");
        assert!(ray.t_max.is_finite() && ray.t_max > 0.0);
        assert!(isect.n.0.magnitude() > 0.0);
    }
}

#[test]
fn bvh_matches_brute_force() {
    let (scene, mesh) = cube_scene();

    // An independent brute-force linear scan over the same triangles,
    // bypassing the BVH entirely.
    let brute_prims: Vec<_> = mesh.clone().iter_triangles().collect();

    let mut rng = Xoshiro256Plus::seed_from_u64(7);
    for _ in 0..1000 {
        let origin = Point3f::new(
            rng.gen_range(-5.0, 5.0),
            rng.gen_range(-5.0, 5.0),
            rng.gen_range(-5.0, 5.0),
        );
        let dir = Vec3f::new(
            rng.gen_range(-1.0, 1.0),
            rng.gen_range(-1.0, 1.0),
            rng.gen_range(-1.0, 1.0),
        );

        let mut bvh_ray = Ray::new(origin, dir);
        let bvh_hit = scene.intersect(&mut bvh_ray).map(|_| bvh_ray.t_max);

        use raytracer::shapes::Shape;
        let brute_hit = brute_prims
            .iter()
            .filter_map(|tri| tri.intersect(&Ray::new(origin, dir)).map(|(t, _)| t))
            .fold(None, |acc: Option<Float>, t| match acc {
                Some(best) if best <= t => Some(best),
                _ => Some(t),
            });

        match (bvh_hit, brute_hit) {
            (Some(a), Some(b)) => assert!(
                (a - b).abs() <= 1e-5 * b.abs().max(1.0),
                "bvh t={} brute-force t={}",
                a,
                b
            ),
            (None, None) => {}
            (a, b) => panic!("bvh/brute-force disagreement: {:?} vs {:?}", a, b),
        }
    }
}
