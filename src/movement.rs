use std::f32::consts::TAU;

use glam::Vec3;

use crate::input::{InputState, Key};
use crate::transform::Transform;

/// pitch stays just short of straight up or down
const PITCH_LIMIT: f32 = 1.5;

/// Fly-camera style controls over a transform, in a world where -Y is up
#[derive(Debug, Clone, Copy)]
pub struct KeyboardMovementController {
    /// units per second
    pub move_speed: f32,
    /// radians per second
    pub look_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            look_speed: 5.0,
        }
    }
}

impl KeyboardMovementController {
    /// Arrow keys turn, WASD move within the XZ plane relative to the current yaw,
    /// Space and LeftShift move up and down.
    pub fn move_in_plane_xz(&self, dt: f32, input: &InputState, transform: &mut Transform) {
        let mut rotate = Vec3::ZERO;
        if input.is_key_pressed(Key::Right) {
            rotate.y -= 1.0;
        }
        if input.is_key_pressed(Key::Left) {
            rotate.y += 1.0;
        }
        if input.is_key_pressed(Key::Up) {
            rotate.x -= 1.0;
        }
        if input.is_key_pressed(Key::Down) {
            rotate.x += 1.0;
        }

        if rotate.length_squared() > f32::EPSILON {
            transform.rotation += self.look_speed * dt * rotate.normalize();
        }

        transform.rotation.x = transform.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        transform.rotation.y = transform.rotation.y.rem_euclid(TAU);

        let yaw = transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::NEG_Y;

        let mut movement = Vec3::ZERO;
        for (key, direction) in [
            (Key::W, forward),
            (Key::S, -forward),
            (Key::D, right),
            (Key::A, -right),
            (Key::Space, up),
            (Key::LeftShift, -up),
        ] {
            if input.is_key_pressed(key) {
                movement += direction;
            }
        }

        if movement.length_squared() > f32::EPSILON {
            transform.translation += self.move_speed * dt * movement.normalize();
        }
    }
}
