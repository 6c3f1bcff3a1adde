use crate::{Point2f, Vec2f, SurfaceInteraction, Float};

#[derive(Copy, Clone)]
pub struct TexCoords {
    pub st: Point2f,
    pub dst_dx: Vec2f,
    pub dst_dy: Vec2f,
}

pub trait TexCoordsMap2D: Send + Sync {
    fn evaluate(&self, si: &SurfaceInteraction) -> TexCoords;
}

pub struct UVMapping {
    pub scale_u: Float,
    pub scale_v: Float,
    pub offset_u: Float,
    pub offset_v: Float,
}

impl UVMapping {
    pub fn new(scale_u: Float, scale_v: Float, offset_u: Float, offset_v: Float) -> Self {
        Self { scale_u, scale_v, offset_u, offset_v }
    }
}

impl TexCoordsMap2D for UVMapping {
    fn evaluate(&self, si: &SurfaceInteraction) -> TexCoords {
        let st = Point2f::new(
            self.scale_u * si.uv.x + self.offset_u,
            self.scale_v * si.uv.y + self.offset_v,
        );

        let (dst_dx, dst_dy) = if let Some(diffs) = si.tex_diffs {
            (
                Vec2f::new(self.scale_u * diffs.dudx, self.scale_v * diffs.dvdx),
                Vec2f::new(self.scale_u * diffs.dudy, self.scale_v * diffs.dvdy),
            )
        } else {
            (Vec2f::new(0.0, 0.0), Vec2f::new(0.0, 0.0))
        };

        TexCoords { st, dst_dx, dst_dy }
    }
}
