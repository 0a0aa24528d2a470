use std::ffi::CString;

use ash::vk;

use crate::renderer::LayoutDescription;
use crate::shaders::json::ReflectionJson;
use crate::shaders::{CompiledStage, ShaderError};

pub struct PrecompiledShader {
    pub entry_point_name: CString,
    pub spv_bytes: Vec<u32>,
}

impl PrecompiledShader {
    pub fn from_compiled(compiled: CompiledStage) -> Result<Self, ShaderError> {
        let entry_point_name = CString::new(compiled.entry_point_name).map_err(|err| {
            ShaderError::InvalidEntryPointName {
                file_name: compiled.file_name.clone(),
                entry_point_name: String::from_utf8_lossy(&err.into_vec()).into_owned(),
            }
        })?;

        Ok(Self {
            entry_point_name,
            spv_bytes: compiled.shader_bytecode,
        })
    }
}

pub struct PrecompiledShaders {
    pub vert: PrecompiledShader,
    pub frag: PrecompiledShader,
}

/// The host-side description of one generated program,
/// enough to build a pipeline layout and shader modules
pub trait ShaderAtlasEntry {
    fn program_name(&self) -> &str;
    fn vertex_binding_descriptions(&self) -> Vec<vk::VertexInputBindingDescription>;
    fn vertex_attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription>;
    fn layout_bindings(&self) -> Vec<Vec<LayoutDescription>>;
    fn push_constant_ranges(&self) -> Vec<vk::PushConstantRange>;
    fn precompiled_shaders(&self) -> &PrecompiledShaders;
    fn reflection_json(&self) -> &ReflectionJson;
}
