// GENERATED FILE (do not edit directly)

pub mod lit_mesh;
pub mod push_offset;
pub mod uniform_offset;

use crate::shaders::ShaderError;

pub struct ShaderAtlas {
    pub lit_mesh: lit_mesh::Shader,
    pub push_offset: push_offset::Shader,
    pub uniform_offset: uniform_offset::Shader,
}

impl ShaderAtlas {
    pub fn init() -> Result<Self, ShaderError> {
        Ok(Self {
            lit_mesh: lit_mesh::Shader::init()?,
            push_offset: push_offset::Shader::init()?,
            uniform_offset: uniform_offset::Shader::init()?,
        })
    }
}
