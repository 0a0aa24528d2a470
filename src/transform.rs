use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::generated::shader_atlas::lit_mesh;

/// Translation, YXZ euler rotation (radians) and per-axis scale of one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// translate * Ry * Rx * Rz * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.translation)
    }

    /// The inverse transpose of the upper 3x3 of `matrix`, in a mat4 for std140.
    /// An axis with zero scale maps normals to zero along it.
    pub fn normal_matrix(&self) -> Mat4 {
        let inverse_scale = Vec3::select(
            self.scale.cmpeq(Vec3::ZERO),
            Vec3::ZERO,
            self.scale.recip(),
        );

        Mat4::from_quat(self.quat()) * Mat4::from_scale(inverse_scale)
    }

    pub fn push_constants(&self) -> lit_mesh::Push {
        lit_mesh::Push {
            model_matrix: self.matrix(),
            normal_matrix: self.normal_matrix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn matrix_scales_rotates_then_translates() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            scale: Vec3::splat(2.0),
        };

        let point = transform.matrix().transform_point3(Vec3::X);

        // yaw of a quarter turn takes +x to -z
        assert!(point.abs_diff_eq(Vec3::new(1.0, 2.0, 1.0), 1e-5), "{point}");
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let transform = Transform {
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..Default::default()
        };

        let normal = transform
            .normal_matrix()
            .transform_vector3(Vec3::new(1.0, 1.0, 0.0));

        assert!(normal.abs_diff_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
        assert!(
            transform
                .normal_matrix()
                .abs_diff_eq(transform.matrix().inverse().transpose(), 1e-6)
        );
    }

    #[test]
    fn zero_scale_axes_are_flattened() {
        let transform = Transform {
            scale: Vec3::new(0.0, 1.0, 1.0),
            ..Default::default()
        };

        let normal = transform.normal_matrix().transform_vector3(Vec3::ONE);

        assert_eq!(normal, Vec3::new(0.0, 1.0, 1.0));
        assert!(normal.is_finite());
    }

    #[test]
    fn push_constants_carry_both_matrices() {
        let transform = Transform {
            translation: Vec3::new(0.0, 0.0, 2.5),
            ..Default::default()
        };

        let push = transform.push_constants();

        assert_eq!(push.model_matrix, Mat4::from_translation(transform.translation));
        assert_eq!(push.normal_matrix, Mat4::IDENTITY);
    }
}
