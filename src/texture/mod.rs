use crate::interaction::SurfaceInteraction;
use std::sync::Arc;

pub mod mapping;
pub mod uv;
pub mod checkerboard;
pub mod image;

pub trait Texture: Send + Sync {
    type Output;

    fn evaluate(&self, si: &SurfaceInteraction) -> Self::Output;
}

/// A shared handle to a texture producing `T`, the common currency that
/// materials and the scene loader pass around.
pub type TextureRef<T> = Arc<dyn Texture<Output = T>>;

pub struct ConstantTexture<T>(pub T);

impl<T: Copy + Send + Sync> Texture for ConstantTexture<T> {
    type Output = T;

    fn evaluate(&self, _si: &SurfaceInteraction) -> T {
        self.0
    }
}
