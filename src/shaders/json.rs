use ash::vk;
use serde::{Deserialize, Serialize};

use crate::renderer::{DescriptorKind, LayoutDescription};

/// Everything the host needs to know about one vertex + fragment program,
/// as reflected from the compiled GLSL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionJson {
    pub program_name: String,
    pub vertex_entry_point: EntryPoint,
    pub fragment_entry_point: EntryPoint,
    /// vertex stage inputs, ordered by location
    pub vertex_inputs: Vec<InterfaceVariable>,
    /// vertex stage outputs consumed by the fragment stage, ordered by location
    pub varyings: Vec<InterfaceVariable>,
    pub fragment_outputs: Vec<InterfaceVariable>,
    /// ordered by (set, binding)
    pub uniform_blocks: Vec<UniformBlock>,
    pub push_constant: Option<PushConstantBlock>,
}

impl ReflectionJson {
    /// descriptor set layouts, outer index is the set
    pub fn layout_bindings(&self) -> Vec<Vec<LayoutDescription>> {
        let set_count = self
            .uniform_blocks
            .iter()
            .map(|block| block.set as usize + 1)
            .max()
            .unwrap_or(0);

        let mut sets = vec![vec![]; set_count];
        for block in &self.uniform_blocks {
            sets[block.set as usize].push(LayoutDescription {
                binding: block.binding,
                descriptor_kind: DescriptorKind::UniformBuffer,
                stage_flags: stage_flags(&block.stages),
                type_name: block.block.type_name.clone(),
            });
        }

        sets
    }

    pub fn push_constant_ranges(&self) -> Vec<vk::PushConstantRange> {
        let Some(push) = &self.push_constant else {
            return vec![];
        };

        vec![
            vk::PushConstantRange::default()
                .stage_flags(stage_flags(&push.stages))
                .offset(0)
                .size(push.block.size),
        ]
    }
}

fn stage_flags(stages: &[StageKind]) -> vk::ShaderStageFlags {
    stages
        .iter()
        .fold(vk::ShaderStageFlags::empty(), |flags, stage| {
            flags | stage.vk_flag()
        })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub source_file_name: String,
    pub entry_point_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub fn vk_flag(self) -> vk::ShaderStageFlags {
        match self {
            Self::Vertex => vk::ShaderStageFlags::VERTEX,
            Self::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }
}

/// a location-bound stage input or output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceVariable {
    pub name: String,
    pub location: u32,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformBlock {
    pub set: u32,
    pub binding: u32,
    pub instance_name: String,
    pub stages: Vec<StageKind>,
    pub block: BlockType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConstantBlock {
    pub instance_name: String,
    pub stages: Vec<StageKind>,
    pub block: BlockType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockType {
    pub type_name: String,
    /// rounded up to the 16 byte std140 struct alignment
    pub size: u32,
    pub fields: Vec<BlockField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockField {
    pub name: String,
    pub offset: u32,
    pub size: u32,
    pub value_type: ValueType,
}

/// The 32-bit scalar, vector and square matrix types the atlas supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Float,
    Uint,
    Int,
    Vec2,
    Vec3,
    Vec4,
    IVec2,
    IVec3,
    IVec4,
    UVec2,
    UVec3,
    UVec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ValueType {
    /// the matching field type in generated rust code
    pub fn rust_type_name(self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Uint => "u32",
            Self::Int => "i32",
            Self::Vec2 => "glam::Vec2",
            Self::Vec3 => "glam::Vec3",
            Self::Vec4 => "glam::Vec4",
            Self::IVec2 => "glam::IVec2",
            Self::IVec3 => "glam::IVec3",
            Self::IVec4 => "glam::IVec4",
            Self::UVec2 => "glam::UVec2",
            Self::UVec3 => "glam::UVec3",
            Self::UVec4 => "glam::UVec4",
            Self::Mat2 => "glam::Mat2",
            // std140 pads each mat3 column to 16 bytes
            Self::Mat3 => "glam::Mat3A",
            Self::Mat4 => "glam::Mat4",
        }
    }

    /// the vertex attribute format, if the type can be a vertex input
    pub fn vk_format(self) -> Option<vk::Format> {
        match self {
            Self::Float => Some(vk::Format::R32_SFLOAT),
            Self::Uint => Some(vk::Format::R32_UINT),
            Self::Int => Some(vk::Format::R32_SINT),
            Self::Vec2 => Some(vk::Format::R32G32_SFLOAT),
            Self::Vec3 => Some(vk::Format::R32G32B32_SFLOAT),
            Self::Vec4 => Some(vk::Format::R32G32B32A32_SFLOAT),
            Self::IVec2 => Some(vk::Format::R32G32_SINT),
            Self::IVec3 => Some(vk::Format::R32G32B32_SINT),
            Self::IVec4 => Some(vk::Format::R32G32B32A32_SINT),
            Self::UVec2 => Some(vk::Format::R32G32_UINT),
            Self::UVec3 => Some(vk::Format::R32G32B32_UINT),
            Self::UVec4 => Some(vk::Format::R32G32B32A32_UINT),
            Self::Mat2 | Self::Mat3 | Self::Mat4 => None,
        }
    }

    /// the ash constant path, for generated code
    pub fn vk_format_path(self) -> Option<&'static str> {
        match self {
            Self::Float => Some("vk::Format::R32_SFLOAT"),
            Self::Uint => Some("vk::Format::R32_UINT"),
            Self::Int => Some("vk::Format::R32_SINT"),
            Self::Vec2 => Some("vk::Format::R32G32_SFLOAT"),
            Self::Vec3 => Some("vk::Format::R32G32B32_SFLOAT"),
            Self::Vec4 => Some("vk::Format::R32G32B32A32_SFLOAT"),
            Self::IVec2 => Some("vk::Format::R32G32_SINT"),
            Self::IVec3 => Some("vk::Format::R32G32B32_SINT"),
            Self::IVec4 => Some("vk::Format::R32G32B32A32_SINT"),
            Self::UVec2 => Some("vk::Format::R32G32_UINT"),
            Self::UVec3 => Some("vk::Format::R32G32B32_UINT"),
            Self::UVec4 => Some("vk::Format::R32G32B32A32_UINT"),
            Self::Mat2 | Self::Mat3 | Self::Mat4 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(type_name: &str, size: u32) -> BlockType {
        BlockType {
            type_name: type_name.to_string(),
            size,
            fields: vec![],
        }
    }

    fn reflection(
        uniform_blocks: Vec<UniformBlock>,
        push_constant: Option<PushConstantBlock>,
    ) -> ReflectionJson {
        let entry_point = |file: &str| EntryPoint {
            source_file_name: file.to_string(),
            entry_point_name: "main".to_string(),
        };

        ReflectionJson {
            program_name: "test".to_string(),
            vertex_entry_point: entry_point("test.vert"),
            fragment_entry_point: entry_point("test.frag"),
            vertex_inputs: vec![],
            varyings: vec![],
            fragment_outputs: vec![],
            uniform_blocks,
            push_constant,
        }
    }

    #[test]
    fn layout_bindings_group_blocks_by_set() {
        let json = reflection(
            vec![
                UniformBlock {
                    set: 0,
                    binding: 0,
                    instance_name: "ubo".to_string(),
                    stages: vec![StageKind::Vertex, StageKind::Fragment],
                    block: block("GlobalUbo", 176),
                },
                UniformBlock {
                    set: 2,
                    binding: 1,
                    instance_name: "material".to_string(),
                    stages: vec![StageKind::Fragment],
                    block: block("Material", 16),
                },
            ],
            None,
        );

        let sets = json.layout_bindings();

        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].len(), 1);
        assert!(sets[1].is_empty());
        assert_eq!(sets[2][0].binding, 1);
        assert_eq!(
            sets[0][0].stage_flags,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
        );
        assert_eq!(sets[2][0].type_name, "Material");
    }

    #[test]
    fn push_constant_range_covers_the_block() {
        let json = reflection(
            vec![],
            Some(PushConstantBlock {
                instance_name: "push".to_string(),
                stages: vec![StageKind::Vertex],
                block: block("Push", 128),
            }),
        );

        let ranges = json.push_constant_ranges();

        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].offset, 0);
        assert_eq!(ranges[0].size, 128);
        assert_eq!(ranges[0].stage_flags, vk::ShaderStageFlags::VERTEX);

        assert!(reflection(vec![], None).push_constant_ranges().is_empty());
    }

    #[test]
    fn matrices_are_not_vertex_formats() {
        assert_eq!(ValueType::Vec3.vk_format(), Some(vk::Format::R32G32B32_SFLOAT));
        assert_eq!(ValueType::Mat4.vk_format(), None);
        assert_eq!(ValueType::Mat3.rust_type_name(), "glam::Mat3A");
    }

    #[test]
    fn integer_vectors_keep_their_signedness() {
        assert_eq!(ValueType::IVec2.vk_format(), Some(vk::Format::R32G32_SINT));
        assert_eq!(ValueType::UVec4.vk_format(), Some(vk::Format::R32G32B32A32_UINT));
        assert_eq!(
            ValueType::UVec3.vk_format_path(),
            Some("vk::Format::R32G32B32_UINT")
        );
        assert_eq!(ValueType::IVec3.rust_type_name(), "glam::IVec3");
    }
}
