use glam::{Vec2, Vec3, Vec4};

use super::{ShadingProgram, Varyings, blend};
use crate::generated::shader_atlas::{push_offset, uniform_offset};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetVaryings {
    pub color: Vec3,
}

impl Varyings for OffsetVaryings {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: Vec3) -> Self {
        Self {
            color: blend(a.color, b.color, c.color, weights),
        }
    }
}

fn offset_vertex(position: Vec2, color: Vec3, offset: Vec2) -> (Vec4, OffsetVaryings) {
    let clip_position = (position + offset).extend(0.0).extend(1.0);

    (clip_position, OffsetVaryings { color })
}

fn tinted(varyings: &OffsetVaryings, tint: Vec3) -> Vec4 {
    (varyings.color * tint).extend(1.0)
}

/// The 2d quad demo, with offset and tint passed as push constants
#[derive(Debug, Clone)]
pub struct PushOffset {
    pub push: push_offset::Push,
}

impl PushOffset {
    pub fn new(offset: Vec2, color: Vec3) -> Self {
        Self {
            push: push_offset::Push {
                offset,
                _padding_0: [0; 8],
                color,
                _padding_1: [0; 4],
            },
        }
    }
}

impl ShadingProgram for PushOffset {
    type Vertex = push_offset::Vertex;
    type Varyings = OffsetVaryings;

    fn vertex(&self, vertex: &push_offset::Vertex) -> (Vec4, OffsetVaryings) {
        offset_vertex(vertex.position, vertex.color, self.push.offset)
    }

    fn fragment(&self, varyings: &OffsetVaryings) -> Vec4 {
        tinted(varyings, self.push.color)
    }
}

/// The same demo reading a uniform buffer at set 0, binding 0
#[derive(Debug, Clone)]
pub struct UniformOffset {
    pub ubo: uniform_offset::Ubo,
}

impl UniformOffset {
    pub fn new(offset: Vec2, color: Vec3) -> Self {
        Self {
            ubo: uniform_offset::Ubo {
                offset,
                _padding_0: [0; 8],
                color,
                _padding_1: [0; 4],
            },
        }
    }
}

impl ShadingProgram for UniformOffset {
    type Vertex = uniform_offset::Vertex;
    type Varyings = OffsetVaryings;

    fn vertex(&self, vertex: &uniform_offset::Vertex) -> (Vec4, OffsetVaryings) {
        offset_vertex(vertex.position, vertex.color, self.ubo.offset)
    }

    fn fragment(&self, varyings: &OffsetVaryings) -> Vec4 {
        tinted(varyings, self.ubo.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::renderer::as_gpu_bytes;

    #[test]
    fn vertices_are_translated_by_the_offset() {
        let program = PushOffset::new(Vec2::new(0.25, -0.25), Vec3::ONE);
        let vertex = push_offset::Vertex {
            position: Vec2::new(-0.5, 0.5),
            color: Vec3::X,
        };

        let (clip, varyings) = program.vertex(&vertex);

        assert_eq!(clip, Vec4::new(-0.25, 0.25, 0.0, 1.0));
        assert_eq!(varyings.color, Vec3::X);
    }

    #[test]
    fn fragments_are_tinted() {
        let program = UniformOffset::new(Vec2::ZERO, Vec3::new(0.5, 0.5, 0.5));

        let color = program.fragment(&OffsetVaryings {
            color: Vec3::new(1.0, 0.5, 0.0),
        });

        assert_eq!(color, Vec4::new(0.5, 0.25, 0.0, 1.0));
    }

    #[test]
    fn both_offset_programs_agree() {
        let push = PushOffset::new(Vec2::new(0.1, 0.2), Vec3::new(0.3, 0.6, 0.9));
        let uniform = UniformOffset::new(Vec2::new(0.1, 0.2), Vec3::new(0.3, 0.6, 0.9));

        let (push_clip, push_out) = push.vertex(&push_offset::Vertex {
            position: Vec2::ONE,
            color: Vec3::ONE,
        });
        let (uniform_clip, uniform_out) = uniform.vertex(&uniform_offset::Vertex {
            position: Vec2::ONE,
            color: Vec3::ONE,
        });

        assert_eq!(push_clip, uniform_clip);
        assert_eq!(push.fragment(&push_out), uniform.fragment(&uniform_out));
    }

    #[test]
    fn block_bytes_match_the_std140_layout() {
        let program = PushOffset::new(Vec2::new(1.0, 2.0), Vec3::new(3.0, 4.0, 5.0));

        let bytes = as_gpu_bytes(std::slice::from_ref(&program.push));

        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[4..8], &2.0f32.to_ne_bytes());
        assert_eq!(&bytes[8..16], &[0; 8]);
        assert_eq!(&bytes[16..20], &3.0f32.to_ne_bytes());
        assert_eq!(&bytes[24..28], &5.0f32.to_ne_bytes());
    }
}
