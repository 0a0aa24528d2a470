//! Projection and view matrices for the lit mesh uniform block.
//!
//! Projections map into Vulkan clip space: x right, y down, depth 0 to 1.
//! World space follows the same convention, so -Y is up.

use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl Camera {
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        // glam's 'bottom' is the edge that lands at clip y = -1, which is our top
        self.projection = Mat4::orthographic_lh(left, right, top, bottom, near, far);
    }

    /// `fov_y` in radians
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_lh(fov_y, aspect, near, far);
    }

    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);

        self.view = view_from_basis(position, u, v, w);
    }

    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// `rotation` is YXZ euler angles in radians, matching `Transform`
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let (s3, c3) = rotation.z.sin_cos();
        let (s2, c2) = rotation.x.sin_cos();
        let (s1, c1) = rotation.y.sin_cos();

        let u = Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1);
        let v = Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3);
        let w = Vec3::new(c2 * s1, -s2, c1 * c2);

        self.view = view_from_basis(position, u, v, w);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }
}

/// rows are the camera basis, so the view matrix is the basis inverse
fn view_from_basis(position: Vec3, u: Vec3, v: Vec3, w: Vec3) -> Mat4 {
    Mat4::from_cols(
        Vec4::new(u.x, v.x, w.x, 0.0),
        Vec4::new(u.y, v.y, w.y, 0.0),
        Vec4::new(u.z, v.z, w.z, 0.0),
        Vec4::new(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn perspective_maps_near_and_far_to_vulkan_depth() {
        let mut camera = Camera::default();
        camera.set_perspective(FRAC_PI_2, 1.0, 0.1, 10.0);

        let near = camera.projection().project_point3(Vec3::new(0.0, 0.0, 0.1));
        let far = camera.projection().project_point3(Vec3::new(0.0, 0.0, 10.0));

        assert!(near.z.abs() < 1e-6);
        assert!((far.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn up_in_the_world_is_up_on_screen() {
        let mut camera = Camera::default();
        camera.set_perspective(FRAC_PI_2, 1.0, 0.1, 10.0);

        let clip = camera.projection().project_point3(Vec3::new(0.0, -1.0, 2.0));

        // vulkan's y axis points down the screen
        assert!(clip.y < 0.0);
    }

    #[test]
    fn orthographic_box_fills_clip_space() {
        let mut camera = Camera::default();
        camera.set_orthographic(-2.0, 2.0, -1.0, 1.0, 0.0, 4.0);

        let top_left = camera.projection().transform_point3(Vec3::new(-2.0, -1.0, 0.0));
        let bottom_right = camera.projection().transform_point3(Vec3::new(2.0, 1.0, 4.0));

        assert!(top_left.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-6));
        assert!(bottom_right.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn view_target_puts_the_target_ahead() {
        let mut camera = Camera::default();
        let position = Vec3::new(0.0, -1.0, -3.0);
        camera.set_view_target(position, Vec3::new(0.0, -1.0, 0.0), Vec3::NEG_Y);

        let target = camera.view().transform_point3(Vec3::new(0.0, -1.0, 0.0));
        let origin = camera.view().transform_point3(position);

        assert!(target.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-6));
        assert!(origin.abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn yxz_view_with_no_rotation_is_a_translation() {
        let mut camera = Camera::default();
        let position = Vec3::new(1.0, 2.0, 3.0);
        camera.set_view_yxz(position, Vec3::ZERO);

        assert_eq!(camera.view(), Mat4::from_translation(-position));
    }

    #[test]
    fn yxz_view_inverts_the_transform_rotation() {
        let rotation = Vec3::new(0.3, 1.1, -0.2);
        let position = Vec3::new(1.0, -0.5, 2.0);
        let transform = crate::transform::Transform {
            translation: position,
            rotation,
            scale: Vec3::ONE,
        };

        let mut camera = Camera::default();
        camera.set_view_yxz(position, rotation);

        let round_trip = camera.view() * transform.matrix();
        assert!(round_trip.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }
}
