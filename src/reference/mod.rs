//! CPU evaluation of each shader program's vertex and fragment stages,
//! operating on the generated interface types

use glam::{Vec3, Vec4};

mod lit_mesh;
mod offset;

pub use lit_mesh::{LitMesh, LitVaryings};
pub use offset::{OffsetVaryings, PushOffset, UniformOffset};

/// Values written by the vertex stage and read by the fragment stage
pub trait Varyings: Copy {
    /// `weights` are barycentric and sum to one
    fn interpolate(a: &Self, b: &Self, c: &Self, weights: Vec3) -> Self;
}

pub trait ShadingProgram {
    type Vertex;
    type Varyings: Varyings;

    /// returns the clip space position along with the varyings
    fn vertex(&self, vertex: &Self::Vertex) -> (Vec4, Self::Varyings);

    /// returns the color written to output location 0
    fn fragment(&self, varyings: &Self::Varyings) -> Vec4;
}

fn blend<T>(a: T, b: T, c: T, weights: Vec3) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    a * weights.x + b * weights.y + c * weights.z
}
