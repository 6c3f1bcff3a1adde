use crate::geometry::bounds::Bounds3f;
use crate::geometry::{Ray, Transform, Transformable};
use crate::interaction::{SurfaceHit, SurfaceInteraction};
use crate::{Float, Point2f};

pub mod sphere;
pub mod triangle;

pub trait Shape: Send + Sync {
    fn object_bound(&self) -> Bounds3f;

    fn world_bound(&self) -> Bounds3f {
        self.object_to_world().transform(self.object_bound())
    }

    fn object_to_world(&self) -> &Transform;

    fn world_to_object(&self) -> &Transform;

    fn reverse_orientation(&self) -> bool;

    fn flip_normals(&self) -> bool {
        self.reverse_orientation() != self.object_to_world().swaps_handedness()
    }

    fn area(&self) -> Float;

    fn intersect(&self, ray: &Ray) -> Option<(Float, SurfaceInteraction)>;

    fn intersect_test(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Samples a point on the shape's surface, used for area-light emission
    /// and for light-sampling strategies that need a point uniformly
    /// distributed by area.
    fn sample(&self, u: Point2f) -> SurfaceHit;

    fn pdf(&self, _hit: &SurfaceHit) -> Float {
        1.0 / self.area()
    }
}
