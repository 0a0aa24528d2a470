// GENERATED FILE (do not edit directly)

//! generated from glsl shaders: lit_mesh.vert, lit_mesh.frag

use ash::vk;
use serde::Serialize;

use crate::renderer::LayoutDescription;
use crate::renderer::gpu_write::GPUWrite;
#[allow(unused)]
use crate::renderer::vertex_description::VertexDescription;
use crate::shaders::atlas::{PrecompiledShader, PrecompiledShaders, ShaderAtlasEntry};
use crate::shaders::json::ReflectionJson;
use crate::shaders::{ReflectedShader, ShaderError, ShaderSource, reflect_program};

pub const PROGRAM_NAME: &str = "lit_mesh";

pub const VERTEX_SOURCE: ShaderSource = ShaderSource::from_static(
    "lit_mesh.vert",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/shaders/source/lit_mesh.vert"
    )),
);

pub const FRAGMENT_SOURCE: ShaderSource = ShaderSource::from_static(
    "lit_mesh.frag",
    include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/shaders/source/lit_mesh.frag"
    )),
);

#[derive(Debug, Clone, Serialize)]
#[repr(C, align(16))]
pub struct GlobalUbo {
    pub projection: glam::Mat4,
    pub view: glam::Mat4,
    pub ambient_light_color: glam::Vec4,
    pub light_position: glam::Vec4,
    pub light_color: glam::Vec4,
}

unsafe impl GPUWrite for GlobalUbo {}
const _: () = assert!(std::mem::size_of::<GlobalUbo>() == 176);

#[derive(Debug, Clone, Serialize)]
#[repr(C, align(16))]
pub struct Push {
    pub model_matrix: glam::Mat4,
    pub normal_matrix: glam::Mat4,
}

unsafe impl GPUWrite for Push {}
const _: () = assert!(std::mem::size_of::<Push>() == 128);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[repr(C)]
pub struct Vertex {
    pub position: glam::Vec3,
    pub color: glam::Vec3,
    pub normal: glam::Vec3,
    pub uv: glam::Vec2,
}

unsafe impl GPUWrite for Vertex {}

impl VertexDescription for Vertex {
    fn binding_descriptions() -> Vec<vk::VertexInputBindingDescription> {
        vec![
            vk::VertexInputBindingDescription::default()
                .binding(0)
                .stride(std::mem::size_of::<Self>() as u32)
                .input_rate(vk::VertexInputRate::VERTEX),
        ]
    }

    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescription> {
        vec![
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Self, position) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Self, color) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(2)
                .format(vk::Format::R32G32B32_SFLOAT)
                .offset(std::mem::offset_of!(Self, normal) as u32),
            vk::VertexInputAttributeDescription::default()
                .binding(0)
                .location(3)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(std::mem::offset_of!(Self, uv) as u32),
        ]
    }
}

pub struct Shader {
    reflection_json: ReflectionJson,
    precompiled: PrecompiledShaders,
}

impl Shader {
    pub fn init() -> Result<Self, ShaderError> {
        let ReflectedShader {
            vertex_shader,
            fragment_shader,
            reflection_json,
        } = reflect_program(PROGRAM_NAME, &VERTEX_SOURCE, &FRAGMENT_SOURCE)?;

        let precompiled = PrecompiledShaders {
            vert: PrecompiledShader::from_compiled(vertex_shader)?,
            frag: PrecompiledShader::from_compiled(fragment_shader)?,
        };

        Ok(Self {
            reflection_json,
            precompiled,
        })
    }
}

impl ShaderAtlasEntry for Shader {
    fn program_name(&self) -> &str {
        PROGRAM_NAME
    }

    fn vertex_binding_descriptions(&self) -> Vec<vk::VertexInputBindingDescription> {
        Vertex::binding_descriptions()
    }

    fn vertex_attribute_descriptions(&self) -> Vec<vk::VertexInputAttributeDescription> {
        Vertex::attribute_descriptions()
    }

    fn layout_bindings(&self) -> Vec<Vec<LayoutDescription>> {
        self.reflection_json.layout_bindings()
    }

    fn push_constant_ranges(&self) -> Vec<vk::PushConstantRange> {
        self.reflection_json.push_constant_ranges()
    }

    fn precompiled_shaders(&self) -> &PrecompiledShaders {
        &self.precompiled
    }

    fn reflection_json(&self) -> &ReflectionJson {
        &self.reflection_json
    }
}
