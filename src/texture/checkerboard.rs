use crate::texture::Texture;
use crate::texture::mapping::{TexCoordsMap2D, TexCoords};
use crate::SurfaceInteraction;

pub enum AAMethod {
    None, ClosedForm
}

pub struct Checkerboard2DTexture<T1, T2, M: TexCoordsMap2D>
    where
        T1: Texture,
        T2: Texture<Output=T1::Output>
{
    tex1: T1,
    tex2: T2,
    mapping: M,
    aa_method: AAMethod
}

impl<T1: Texture, T2: Texture<Output=T1::Output>, M: TexCoordsMap2D> Checkerboard2DTexture<T1, T2, M> {
    pub fn new(tex1: T1, tex2: T2, mapping: M) -> Self {
        Self {
            tex1, tex2, mapping, aa_method: AAMethod::None
        }
    }

    pub fn with_aa_method(mut self, aa_method: AAMethod) -> Self {
        self.aa_method = aa_method;
        self
    }
}

impl<T1: Texture, T2: Texture<Output=T1::Output>, M: TexCoordsMap2D> Texture for Checkerboard2DTexture<T1, T2, M> {
    type Output = T1::Output;

    fn evaluate(&self, si: &SurfaceInteraction) -> Self::Output {
        let TexCoords { st, .. } = self.mapping.evaluate(si);
        match self.aa_method {
            // No antialiasing: point-sample the checker pattern at `st`.
            AAMethod::None | AAMethod::ClosedForm => {
                if (st.x.floor() as i64 + st.y.floor() as i64) % 2 == 0 {
                    self.tex1.evaluate(si)
                } else {
                    self.tex2.evaluate(si)
                }
            }
        }
    }
}
