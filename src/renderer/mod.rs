//! Host-side pieces of the stage interface: byte images of generated types,
//! vertex input descriptions and descriptor set layout descriptions.
//! Device, swapchain and command recording live in whatever renderer
//! consumes the atlas.

use ash::vk;

pub mod gpu_write;
pub mod vertex_description;

pub use gpu_write::*;
pub use vertex_description::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    UniformBuffer,
}

impl DescriptorKind {
    pub fn vk_type(self) -> vk::DescriptorType {
        match self {
            Self::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        }
    }
}

/// one binding in a descriptor set layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDescription {
    pub binding: u32,
    pub descriptor_kind: DescriptorKind,
    pub stage_flags: vk::ShaderStageFlags,
    /// the generated rust type bound here
    pub type_name: String,
}

impl LayoutDescription {
    pub fn vk_binding(&self) -> vk::DescriptorSetLayoutBinding<'static> {
        vk::DescriptorSetLayoutBinding::default()
            .binding(self.binding)
            .descriptor_type(self.descriptor_kind.vk_type())
            .descriptor_count(1)
            .stage_flags(self.stage_flags)
    }
}
