//! A physically-based offline renderer: acceleration structures, surface
//! reflectance models, light transport estimators and a tiled multithreaded
//! sampling driver, in the spirit of pbrt.

#[macro_use]
pub mod macros;
#[macro_use]
pub mod math;

pub mod err_float;
pub mod consts;
pub mod geometry;
pub mod interaction;
pub mod sampling;
pub mod fresnel;
pub mod reflection;
pub mod spectrum;
pub mod texture;
pub mod material;
pub mod shapes;
pub mod primitive;
pub mod bvh;
pub mod kdtree;
pub mod light;
pub mod scene;
pub mod camera;
pub mod sampler;
pub mod filter;
pub mod film;
pub mod blocked_array;
pub mod mipmap;
pub mod imageio;
pub mod integrator;
pub mod photon;
pub mod scheduler;
pub mod loaders;

pub use math::{Scalar, ComponentWiseExt, Lerp, INFINITY, PI};
pub use math::{max_dimension, permute_vec, permute_point, spherical_theta, spherical_phi, lerp, power_heuristic};
pub use geometry::{Ray, RayDifferential, Differential, Normal3};
pub use geometry::{abs_dot, faceforward, faceforward_normal, coordinate_system, offset_ray_origin};
pub use geometry::bounds::{Bounds2f, Bounds2i, Bounds3f};
pub use geometry::transform::{Transform, Transformable};
pub use interaction::SurfaceInteraction;

pub type Float = f32;

pub type Point2f = cgmath::Point2<Float>;
pub type Point3f = cgmath::Point3<Float>;
pub type Point2i = cgmath::Point2<i32>;

pub type Vec2f = cgmath::Vector2<Float>;
pub type Vec3f = cgmath::Vector3<Float>;
pub type Vec2i = cgmath::Vector2<i32>;
