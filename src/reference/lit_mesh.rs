use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

use super::{ShadingProgram, Varyings, blend};
use crate::generated::shader_atlas::lit_mesh::{GlobalUbo, Push, Vertex};

/// One point light plus ambient, shaded per fragment
#[derive(Debug, Clone)]
pub struct LitMesh {
    pub ubo: GlobalUbo,
    pub push: Push,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitVaryings {
    pub color: Vec3,
    pub position_world: Vec3,
    pub normal_world: Vec3,
    pub uv: Vec2,
}

impl Varyings for LitVaryings {
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: Vec3) -> Self {
        Self {
            color: blend(a.color, b.color, c.color, weights),
            position_world: blend(a.position_world, b.position_world, c.position_world, weights),
            normal_world: blend(a.normal_world, b.normal_world, c.normal_world, weights),
            uv: blend(a.uv, b.uv, c.uv, weights),
        }
    }
}

impl ShadingProgram for LitMesh {
    type Vertex = Vertex;
    type Varyings = LitVaryings;

    fn vertex(&self, vertex: &Vertex) -> (Vec4, LitVaryings) {
        let position_world = self.push.model_matrix * vertex.position.extend(1.0);
        let clip_position = self.ubo.projection * self.ubo.view * position_world;

        let normal_world = (self.push.normal_matrix * vertex.normal.extend(0.0))
            .xyz()
            .normalize();

        let varyings = LitVaryings {
            color: vertex.color,
            position_world: position_world.xyz(),
            normal_world,
            uv: vertex.uv,
        };

        (clip_position, varyings)
    }

    fn fragment(&self, varyings: &LitVaryings) -> Vec4 {
        let direction_to_light = self.ubo.light_position.xyz() - varyings.position_world;
        let attenuation = 1.0 / direction_to_light.dot(direction_to_light);

        let light_color = self.ubo.light_color.xyz() * self.ubo.light_color.w * attenuation;
        let ambient_light = self.ubo.ambient_light_color.xyz() * self.ubo.ambient_light_color.w;
        let cos_angle = varyings
            .normal_world
            .normalize()
            .dot(direction_to_light.normalize())
            .max(0.0);
        let diffuse_light = light_color * cos_angle;

        ((diffuse_light + ambient_light) * varyings.color).extend(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use glam::Mat4;

    use crate::transform::Transform;

    const AMBIENT: Vec4 = Vec4::new(1.0, 1.0, 1.0, 0.1);
    const LIGHT: Vec4 = Vec4::new(1.0, 0.5, 0.25, 2.0);

    fn program(light_position: Vec3) -> LitMesh {
        LitMesh {
            ubo: GlobalUbo {
                projection: Mat4::IDENTITY,
                view: Mat4::IDENTITY,
                ambient_light_color: AMBIENT,
                light_position: light_position.extend(1.0),
                light_color: LIGHT,
            },
            push: Transform::default().push_constants(),
        }
    }

    fn varyings(normal_world: Vec3) -> LitVaryings {
        LitVaryings {
            color: Vec3::new(0.5, 1.0, 1.0),
            position_world: Vec3::ZERO,
            normal_world,
            uv: Vec2::ZERO,
        }
    }

    #[test]
    fn facing_the_light_at_unit_distance() {
        let color = program(Vec3::NEG_Y).fragment(&varyings(Vec3::NEG_Y));

        let expected = (LIGHT.xyz() * LIGHT.w + AMBIENT.xyz() * AMBIENT.w) * Vec3::new(0.5, 1.0, 1.0);
        assert!(color.xyz().abs_diff_eq(expected, 1e-6), "{color}");
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn light_falls_off_with_the_distance_squared() {
        let near = program(Vec3::new(0.0, -1.0, 0.0)).fragment(&varyings(Vec3::NEG_Y));
        let far = program(Vec3::new(0.0, -2.0, 0.0)).fragment(&varyings(Vec3::NEG_Y));

        let ambient = AMBIENT.xyz() * AMBIENT.w * Vec3::new(0.5, 1.0, 1.0);
        let near_diffuse = near.xyz() - ambient;
        let far_diffuse = far.xyz() - ambient;

        assert!((near_diffuse / 4.0).abs_diff_eq(far_diffuse, 1e-6));
    }

    #[test]
    fn back_faces_only_receive_ambient() {
        let color = program(Vec3::NEG_Y).fragment(&varyings(Vec3::Y));

        let ambient = AMBIENT.xyz() * AMBIENT.w * Vec3::new(0.5, 1.0, 1.0);
        assert!(color.xyz().abs_diff_eq(ambient, 1e-6));
    }

    #[test]
    fn fragment_at_the_light_is_not_finite() {
        let color = program(Vec3::ZERO).fragment(&varyings(Vec3::NEG_Y));

        // attenuation divides by a zero distance
        assert!(!color.xyz().is_finite(), "{color}");
        assert_eq!(color.w, 1.0);
    }

    #[test]
    fn unnormalized_normals_are_normalized() {
        let unit = program(Vec3::NEG_Y).fragment(&varyings(Vec3::NEG_Y));
        let long = program(Vec3::NEG_Y).fragment(&varyings(Vec3::new(0.0, -3.0, 0.0)));

        assert!(unit.abs_diff_eq(long, 1e-6));
    }

    #[test]
    fn vertex_stage_moves_into_world_space() {
        let mut lit = program(Vec3::NEG_Y);
        lit.push = Transform {
            translation: Vec3::new(0.0, 0.0, 2.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..Default::default()
        }
        .push_constants();
        lit.ubo.view = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));

        let vertex = Vertex {
            position: Vec3::new(1.0, 0.0, 0.0),
            color: Vec3::ONE,
            normal: Vec3::new(1.0, 0.0, 0.0),
            uv: Vec2::new(0.25, 0.75),
        };

        let (clip, out) = lit.vertex(&vertex);

        assert_eq!(out.position_world, Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(clip, Vec4::new(2.0, 0.0, 3.0, 1.0));
        assert!(out.normal_world.abs_diff_eq(Vec3::X, 1e-6));
        assert_eq!(out.uv, vertex.uv);
    }

    #[test]
    fn interpolation_weights_each_varying() {
        let a = varyings(Vec3::X);
        let b = varyings(Vec3::Y);
        let c = LitVaryings {
            position_world: Vec3::ONE,
            ..varyings(Vec3::Z)
        };

        let mixed = LitVaryings::interpolate(&a, &b, &c, Vec3::new(0.5, 0.25, 0.25));

        assert_eq!(mixed.normal_world, Vec3::new(0.5, 0.25, 0.25));
        assert_eq!(mixed.position_world, Vec3::splat(0.25));
        assert_eq!(mixed.color, a.color);
    }
}
