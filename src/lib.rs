pub mod camera;
pub mod generated;
pub mod input;
pub mod model;
pub mod movement;
pub mod preview;
pub mod reference;
pub mod renderer;
pub mod shaders;
pub mod transform;
pub mod util;

pub use shaders::build_tasks;
