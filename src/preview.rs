//! A small software rasterizer that runs the reference programs,
//! for checking a shader's output without a GPU.
//!
//! Follows Vulkan conventions: normalized device y points down and depth runs
//! from 0 (near) to 1 (far). Triangles are not clipped; any triangle with a
//! vertex behind the eye (w <= 0) is dropped whole.

use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};

use crate::reference::{ShadingProgram, Varyings};

#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    #[error("index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    pub triangles_drawn: usize,
    /// behind the eye or with no area
    pub triangles_skipped: usize,
    /// fragments that passed the depth test
    pub fragments_written: usize,
}

pub struct Rasterizer {
    width: u32,
    height: u32,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

impl Rasterizer {
    pub fn new(width: u32, height: u32, clear_color: Vec4) -> Self {
        let pixel_count = width as usize * height as usize;

        Self {
            width,
            height,
            color: vec![clear_color; pixel_count],
            depth: vec![1.0; pixel_count],
        }
    }

    pub fn draw_indexed<P: ShadingProgram>(
        &mut self,
        program: &P,
        vertices: &[P::Vertex],
        indices: &[u32],
    ) -> Result<DrawStats, PreviewError> {
        if indices.len() % 3 != 0 {
            return Err(PreviewError::PartialTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(PreviewError::IndexOutOfBounds {
                index,
                vertex_count: vertices.len(),
            });
        }

        let shaded: Vec<(Vec4, P::Varyings)> = vertices.iter().map(|v| program.vertex(v)).collect();

        let mut stats = DrawStats::default();
        for triangle in indices.chunks_exact(3) {
            let corners = [
                shaded[triangle[0] as usize],
                shaded[triangle[1] as usize],
                shaded[triangle[2] as usize],
            ];

            if self.draw_triangle(program, corners, &mut stats) {
                stats.triangles_drawn += 1;
            } else {
                stats.triangles_skipped += 1;
            }
        }

        log::debug!("{stats:?}");

        Ok(stats)
    }

    /// returns false if the triangle was skipped
    fn draw_triangle<P: ShadingProgram>(
        &mut self,
        program: &P,
        corners: [(Vec4, P::Varyings); 3],
        stats: &mut DrawStats,
    ) -> bool {
        if corners.iter().any(|(clip, _)| clip.w <= 0.0) {
            return false;
        }

        let size = Vec2::new(self.width as f32, self.height as f32);
        let ndc = corners.map(|(clip, _)| clip.truncate() / clip.w);
        let screen = ndc.map(|p| (p.truncate() + Vec2::ONE) * 0.5 * size);
        let inverse_w = corners.map(|(clip, _)| 1.0 / clip.w);

        let area = edge(screen[0], screen[1], screen[2]);
        if area == 0.0 || !area.is_finite() {
            return false;
        }

        let min = screen[0].min(screen[1]).min(screen[2]).max(Vec2::ZERO);
        let max = screen[0].max(screen[1]).max(screen[2]).min(size);
        let (x_start, y_start) = (min.x.floor() as u32, min.y.floor() as u32);
        let (x_end, y_end) = (max.x.ceil() as u32, max.y.ceil() as u32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                // barycentric weights; dividing by the signed area handles either winding
                let weights = Vec3::new(
                    edge(screen[1], screen[2], sample),
                    edge(screen[2], screen[0], sample),
                    edge(screen[0], screen[1], sample),
                ) / area;
                if weights.min_element() < 0.0 {
                    continue;
                }

                let depth = weights.dot(Vec3::new(ndc[0].z, ndc[1].z, ndc[2].z));
                let pixel = (y * self.width + x) as usize;
                if !(0.0..=1.0).contains(&depth) || depth >= self.depth[pixel] {
                    continue;
                }

                let perspective = weights * Vec3::from_array(inverse_w);
                let perspective = perspective / perspective.element_sum();
                let varyings = P::Varyings::interpolate(
                    &corners[0].1,
                    &corners[1].1,
                    &corners[2].1,
                    perspective,
                );

                self.depth[pixel] = depth;
                self.color[pixel] = program.fragment(&varyings);
                stats.fragments_written += 1;
            }
        }

        true
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.color[(y * self.width + x) as usize])
    }

    /// Channels are clamped to 0..=1; NaN and infinite channels become 0
    pub fn into_image(self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let color = self.color[(y * self.width + x) as usize];
            Rgba(color.to_array().map(to_unorm8))
        })
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

fn to_unorm8(channel: f32) -> u8 {
    if !channel.is_finite() {
        return 0;
    }

    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::camera::Camera;
    use crate::generated::shader_atlas::lit_mesh::GlobalUbo;
    use crate::model::{cube, push_offset_quad};
    use crate::reference::{LitMesh, PushOffset};
    use crate::transform::Transform;

    const CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
    const SIZE: u32 = 64;

    /// passes clip positions and a flat color straight through
    struct Flat;

    #[derive(Clone, Copy)]
    struct FlatColor(Vec4);

    impl Varyings for FlatColor {
        fn interpolate(a: &Self, _b: &Self, _c: &Self, _weights: Vec3) -> Self {
            *a
        }
    }

    impl ShadingProgram for Flat {
        type Vertex = (Vec4, Vec4);
        type Varyings = FlatColor;

        fn vertex(&self, vertex: &(Vec4, Vec4)) -> (Vec4, FlatColor) {
            (vertex.0, FlatColor(vertex.1))
        }

        fn fragment(&self, varyings: &FlatColor) -> Vec4 {
            varyings.0
        }
    }

    fn big_triangle(z: f32, color: Vec4) -> [(Vec4, Vec4); 3] {
        [
            (Vec4::new(-1.0, -1.0, z, 1.0), color),
            (Vec4::new(3.0, -1.0, z, 1.0), color),
            (Vec4::new(-1.0, 3.0, z, 1.0), color),
        ]
    }

    #[test]
    fn offset_quad_covers_the_middle() {
        let mut raster = Rasterizer::new(SIZE, SIZE, CLEAR);
        let quad = push_offset_quad();
        let program = PushOffset::new(Vec2::ZERO, Vec3::ONE);

        let stats = raster
            .draw_indexed(&program, &quad.vertices, &quad.indices)
            .unwrap();

        assert_eq!(stats.triangles_drawn, 2);
        assert_eq!(stats.fragments_written, 32 * 32);
        assert_eq!(raster.pixel(2, 2), Some(CLEAR));
        assert_ne!(raster.pixel(32, 32), Some(CLEAR));
    }

    #[test]
    fn push_constant_offset_moves_the_quad() {
        let mut raster = Rasterizer::new(SIZE, SIZE, CLEAR);
        let quad = push_offset_quad();
        let program = PushOffset::new(Vec2::new(0.5, 0.5), Vec3::ONE);

        raster
            .draw_indexed(&program, &quad.vertices, &quad.indices)
            .unwrap();

        assert_eq!(raster.pixel(20, 20), Some(CLEAR));
        assert_ne!(raster.pixel(50, 50), Some(CLEAR));
    }

    #[test]
    fn interpolates_vertex_colors() {
        let mut raster = Rasterizer::new(SIZE, SIZE, CLEAR);
        let quad = push_offset_quad();
        let program = PushOffset::new(Vec2::ZERO, Vec3::ONE);

        raster
            .draw_indexed(&program, &quad.vertices, &quad.indices)
            .unwrap();

        // the first corner is red and sits at the top left
        let near_red = raster.pixel(16, 16).unwrap();
        assert!(near_red.x > 0.9, "{near_red}");
        assert!(near_red.y < 0.1 && near_red.z < 0.1, "{near_red}");
    }

    #[test]
    fn nearer_fragments_win_regardless_of_order() {
        let near = big_triangle(0.25, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let far = big_triangle(0.75, Vec4::new(0.0, 0.0, 1.0, 1.0));

        for order in [[near, far], [far, near]] {
            let mut raster = Rasterizer::new(8, 8, CLEAR);
            for triangle in order {
                raster.draw_indexed(&Flat, &triangle, &[0, 1, 2]).unwrap();
            }

            assert_eq!(raster.pixel(4, 4), Some(near[0].1));
        }
    }

    #[test]
    fn triangles_behind_the_eye_are_skipped() {
        let mut triangle = big_triangle(0.5, Vec4::ONE);
        triangle[1].0.w = -1.0;
        let mut raster = Rasterizer::new(8, 8, CLEAR);

        let stats = raster.draw_indexed(&Flat, &triangle, &[0, 1, 2]).unwrap();

        assert_eq!(stats.triangles_skipped, 1);
        assert_eq!(stats.fragments_written, 0);
    }

    #[test]
    fn bad_index_buffers_are_errors() {
        let triangle = big_triangle(0.5, Vec4::ONE);
        let mut raster = Rasterizer::new(8, 8, CLEAR);

        assert!(matches!(
            raster.draw_indexed(&Flat, &triangle, &[0, 1, 3]),
            Err(PreviewError::IndexOutOfBounds { index: 3, .. })
        ));
        assert!(matches!(
            raster.draw_indexed(&Flat, &triangle, &[0, 1]),
            Err(PreviewError::PartialTriangle(2))
        ));
    }

    #[test]
    fn non_finite_channels_become_zero() {
        let triangle = big_triangle(0.5, Vec4::new(f32::NAN, f32::INFINITY, 0.5, 2.0));
        let mut raster = Rasterizer::new(8, 8, CLEAR);
        raster.draw_indexed(&Flat, &triangle, &[0, 1, 2]).unwrap();

        let image = raster.into_image();

        assert_eq!(image.get_pixel(4, 4), &Rgba([0, 0, 128, 255]));
    }

    #[test]
    fn lit_cube_is_visible_and_shaded() {
        let mut camera = Camera::default();
        camera.set_perspective(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 10.0);
        camera.set_view_target(Vec3::new(0.0, -1.5, -3.0), Vec3::ZERO, Vec3::NEG_Y);

        let program = LitMesh {
            ubo: GlobalUbo {
                projection: camera.projection(),
                view: camera.view(),
                ambient_light_color: Vec4::new(1.0, 1.0, 1.0, 0.05),
                light_position: Vec4::new(0.0, -2.0, -1.0, 1.0),
                light_color: Vec4::new(1.0, 1.0, 1.0, 4.0),
            },
            push: Transform::default().push_constants(),
        };
        let model = cube(0.5);

        let mut raster = Rasterizer::new(SIZE, SIZE, CLEAR);
        let stats = raster
            .draw_indexed(&program, &model.vertices, &model.indices)
            .unwrap();

        assert_eq!(stats.triangles_drawn, 12);
        assert_eq!(raster.pixel(0, 0), Some(CLEAR));

        let center = raster.pixel(SIZE / 2, SIZE / 2).unwrap();
        assert_ne!(center, CLEAR);
        assert_eq!(center.w, 1.0);
        assert!(center.truncate().max_element() > 0.05);
    }
}
