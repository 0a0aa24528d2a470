use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use askama::Template;
use heck::ToSnakeCase;

use crate::util::relative_path;

use super::json::*;
use super::{FRAGMENT_FILE_SUFFIX, ReflectedShader, VERTEX_FILE_SUFFIX, prepare_reflected_shader};

pub struct Config {
    /// whether to write rust code (or only shader spirv & json)
    pub generate_rust_source: bool,
    /// the directory to write the 'generated' module into
    pub rust_source_dir: PathBuf,
    /// the directory to read glsl files from
    pub shaders_source_dir: PathBuf,
    /// the directory to write shader spirv & json to
    pub compiled_shaders_dir: PathBuf,
}

/// the rust type generated for each program's vertex inputs
const VERTEX_TYPE_NAME: &str = "Vertex";

pub fn write_precompiled_shaders(config: &Config) -> anyhow::Result<()> {
    let program_names = program_names(&config.shaders_source_dir)?;

    let mut generated_source_files = vec![];

    // generate top-level rust modules
    if config.generate_rust_source {
        add_top_level_rust_modules(&program_names, &mut generated_source_files)?;
    }

    std::fs::create_dir_all(&config.compiled_shaders_dir)?;

    // generate per-program files
    for program_name in &program_names {
        let ReflectedShader {
            vertex_shader,
            fragment_shader,
            reflection_json,
        } = prepare_reflected_shader(program_name, &config.shaders_source_dir)
            .with_context(|| format!("failed to prepare shader program {program_name}"))?;

        if config.generate_rust_source {
            let source_file = build_generated_source_file(&reflection_json)?;
            generated_source_files.push(source_file);
        }

        let json = serde_json::to_string_pretty(&reflection_json)?;
        let json_path = config
            .compiled_shaders_dir
            .join(format!("{program_name}.json"));
        std::fs::write(json_path, json)?;

        for compiled in [&vertex_shader, &fragment_shader] {
            let spv_path = config
                .compiled_shaders_dir
                .join(format!("{}.spv", compiled.file_name));
            std::fs::write(spv_path, compiled.spv_bytes())?;
        }
    }

    for source_file in &generated_source_files {
        write_generated_file(config, source_file)?;
    }

    log::info!(
        "prepared {} shader programs into {:?}",
        program_names.len(),
        config.compiled_shaders_dir
    );

    Ok(())
}

/// every `<name>.vert` with a matching `<name>.frag`, sorted by name
pub fn program_names(shaders_source_dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut file_names: Vec<String> = vec![];
    for entry in std::fs::read_dir(shaders_source_dir)
        .with_context(|| format!("failed to read shader directory {shaders_source_dir:?}"))?
    {
        let dir_entry =
            entry.with_context(|| format!("failed to read an entry of {shaders_source_dir:?}"))?;
        if let Some(file_name) = dir_entry.file_name().to_str() {
            file_names.push(file_name.to_string());
        }
    }

    let mut program_names = vec![];
    for file_name in &file_names {
        let Some(program_name) = file_name.strip_suffix(VERTEX_FILE_SUFFIX) else {
            continue;
        };

        let fragment_file_name = format!("{program_name}{FRAGMENT_FILE_SUFFIX}");
        if file_names.contains(&fragment_file_name) {
            program_names.push(program_name.to_string());
        } else {
            log::warn!("skipping {file_name}: no matching {fragment_file_name}");
        }
    }

    program_names.sort();

    Ok(program_names)
}

fn add_top_level_rust_modules(
    program_names: &[String],
    generated_source_files: &mut Vec<GeneratedFile>,
) -> anyhow::Result<()> {
    let shader_atlas_module = ShaderAtlasModule {
        module_names: program_names.to_vec(),
    };

    let shader_atlas_file = GeneratedFile {
        relative_path: relative_path(["generated", "shader_atlas.rs"]),
        content: shader_atlas_module.render()?,
    };
    generated_source_files.push(shader_atlas_file);

    let top_generated_module = GeneratedFile {
        relative_path: relative_path(["generated.rs"]),
        content: "pub mod shader_atlas;\n".to_string(),
    };
    generated_source_files.push(top_generated_module);

    Ok(())
}

/// generate the matching rust source for a vertex + fragment program
fn build_generated_source_file(reflection_json: &ReflectionJson) -> anyhow::Result<GeneratedFile> {
    let mut struct_defs = vec![];

    for uniform_block in &reflection_json.uniform_blocks {
        let def = block_struct_definition(&uniform_block.block);
        try_add_struct_def(&mut struct_defs, def)?;
    }

    if let Some(push_constant) = &reflection_json.push_constant {
        let def = block_struct_definition(&push_constant.block);
        try_add_struct_def(&mut struct_defs, def)?;
    }

    let mut vertex_impl_block = None;
    if !reflection_json.vertex_inputs.is_empty() {
        let mut fields = vec![];
        let mut attribute_descriptions = vec![];

        for input in &reflection_json.vertex_inputs {
            let Some(format) = input.value_type.vk_format_path() else {
                bail!(
                    "vertex input '{}' in {} has no vertex attribute format: {:?}",
                    input.name,
                    reflection_json.program_name,
                    input.value_type
                );
            };

            let field_name = input.name.to_snake_case();
            fields.push(GeneratedStructFieldDefinition::new(
                field_name.clone(),
                input.value_type.rust_type_name().to_string(),
            ));
            attribute_descriptions.push(VertexAttributeDescription {
                field_name,
                format: format.to_string(),
                location: input.location,
            });
        }

        let def = GeneratedStructDefinition {
            type_name: VERTEX_TYPE_NAME.to_string(),
            fields,
            trait_derives: vec!["Debug", "Clone", "Copy", "PartialEq", "Serialize"],
            alignment: Alignment::VertexAttributes,
            expected_size: None,
        };
        try_add_struct_def(&mut struct_defs, def)?;

        vertex_impl_block = Some(VertexImplBlock {
            type_name: VERTEX_TYPE_NAME.to_string(),
            attribute_descriptions,
        });
    }

    let program_name = reflection_json.program_name.clone();
    let relative_file_path =
        relative_path(["generated", "shader_atlas", &format!("{program_name}.rs")]);

    let vertex_file_name = reflection_json.vertex_entry_point.source_file_name.clone();
    let fragment_file_name = reflection_json
        .fragment_entry_point
        .source_file_name
        .clone();
    let module_doc_lines = vec![format!(
        "generated from glsl shaders: {vertex_file_name}, {fragment_file_name}"
    )];

    let content = ShaderAtlasEntryModule {
        module_doc_lines,
        program_name,
        vertex_file_name,
        fragment_file_name,
        struct_defs,
        vertex_impl_block,
    }
    .render()?;

    Ok(GeneratedFile {
        relative_path: relative_file_path,
        content,
    })
}

#[derive(Template)]
#[template(path = "shader_atlas.rs.askama", escape = "none")]
struct ShaderAtlasModule {
    module_names: Vec<String>,
}

#[derive(Template)]
#[template(path = "shader_atlas_entry.rs.askama", escape = "none")]
struct ShaderAtlasEntryModule {
    module_doc_lines: Vec<String>,
    program_name: String,
    vertex_file_name: String,
    fragment_file_name: String,
    struct_defs: Vec<GeneratedStructDefinition>,
    vertex_impl_block: Option<VertexImplBlock>,
}

impl ShaderAtlasEntryModule {
    fn vertex_impl(&self) -> Option<&VertexImplBlock> {
        self.vertex_impl_block.as_ref()
    }

    fn binding_descriptions_expr(&self) -> String {
        match &self.vertex_impl_block {
            Some(block) => format!("{}::binding_descriptions()", block.type_name),
            None => "vec![]".to_string(),
        }
    }

    fn attribute_descriptions_expr(&self) -> String {
        match &self.vertex_impl_block {
            Some(block) => format!("{}::attribute_descriptions()", block.type_name),
            None => "vec![]".to_string(),
        }
    }
}

/// A uniform or push constant block as a std140 struct, padded to the
/// reflected member offsets
fn block_struct_definition(block: &BlockType) -> GeneratedStructDefinition {
    let (fields, expected_size) = generate_std140_struct_fields(&block.fields, block.size);

    GeneratedStructDefinition {
        type_name: block.type_name.clone(),
        fields,
        trait_derives: vec!["Debug", "Clone", "Serialize"],
        alignment: Alignment::Std140,
        expected_size: Some(expected_size),
    }
}

/// Generates fields for a std140 struct, inserting padding as needed.
/// Returns (fields, expected_size).
fn generate_std140_struct_fields(
    source_fields: &[BlockField],
    block_size: u32,
) -> (Vec<GeneratedStructFieldDefinition>, usize) {
    let mut generated_fields = Vec::new();
    let mut current_offset: usize = 0;
    let mut padding_index: usize = 0;

    for source_field in source_fields {
        let expected_offset = source_field.offset as usize;

        // Insert padding if needed
        if expected_offset > current_offset {
            let padding_size = expected_offset - current_offset;
            generated_fields.push(GeneratedStructFieldDefinition::padding(
                padding_index,
                padding_size,
            ));
            padding_index += 1;
        }

        generated_fields.push(GeneratedStructFieldDefinition::new(
            source_field.name.to_snake_case(),
            source_field.value_type.rust_type_name().to_string(),
        ));
        current_offset = expected_offset + source_field.size as usize;
    }

    // std140 always uses 16-byte struct alignment
    let expected_size = align_to(current_offset.max(block_size as usize), 16);

    // Add trailing padding if needed
    if expected_size > current_offset {
        let padding_size = expected_size - current_offset;
        generated_fields.push(GeneratedStructFieldDefinition::padding(
            padding_index,
            padding_size,
        ));
    }

    (generated_fields, expected_size)
}

#[derive(Debug)]
struct GeneratedStructDefinition {
    type_name: String,
    fields: Vec<GeneratedStructFieldDefinition>,
    trait_derives: Vec<&'static str>,
    alignment: Alignment,
    expected_size: Option<usize>, // For compile-time size assertion
}

impl GeneratedStructDefinition {
    fn trait_derive_line(&self) -> Option<String> {
        if self.trait_derives.is_empty() {
            return None;
        }

        let trait_list = self.trait_derives.join(", ");

        Some(format!("#[derive({trait_list})]"))
    }

    fn repr(&self) -> String {
        self.alignment.annotation()
    }

    fn expected_size(&self) -> Option<usize> {
        self.expected_size
    }
}

#[derive(Debug)]
struct GeneratedStructFieldDefinition {
    field_name: String,
    type_name: String,
}

impl GeneratedStructFieldDefinition {
    fn new(field_name: String, type_name: String) -> Self {
        Self {
            field_name,
            type_name,
        }
    }

    fn padding(index: usize, size: usize) -> Self {
        Self {
            field_name: format!("_padding_{index}"),
            type_name: format!("[u8; {size}]"),
        }
    }
}

struct GeneratedFile {
    /// the path relative to the rust 'src' dir
    relative_path: PathBuf,
    content: String,
}

fn write_generated_file(config: &Config, source_file: &GeneratedFile) -> anyhow::Result<()> {
    let absolute_path = config.rust_source_dir.join(&source_file.relative_path);

    if let Some(parent) = absolute_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = source_file.content.clone();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    std::fs::write(&absolute_path, content)?;

    log::debug!("wrote {absolute_path:?}");

    Ok(())
}

struct VertexImplBlock {
    type_name: String,
    attribute_descriptions: Vec<VertexAttributeDescription>,
}

struct VertexAttributeDescription {
    field_name: String,
    format: String,
    location: u32,
}

/// Rounds up to the next multiple of alignment
fn align_to(offset: usize, alignment: usize) -> usize {
    offset.div_ceil(alignment) * alignment
}

/// Adds a struct definition if it doesn't already exist.
/// Errors if a struct with the same name exists but has incompatible fields.
fn try_add_struct_def(
    struct_defs: &mut Vec<GeneratedStructDefinition>,
    new_def: GeneratedStructDefinition,
) -> anyhow::Result<()> {
    if let Some(existing) = struct_defs
        .iter()
        .find(|d| d.type_name == new_def.type_name)
    {
        // Verify compatibility by comparing fields
        let fields_match = existing.fields.len() == new_def.fields.len()
            && existing
                .fields
                .iter()
                .zip(&new_def.fields)
                .all(|(a, b)| a.field_name == b.field_name && a.type_name == b.type_name);

        if !fields_match {
            bail!(
                "Incompatible struct definitions for '{}': fields differ",
                new_def.type_name
            );
        }
        // Already exists with matching fields, skip
    } else {
        struct_defs.push(new_def);
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Alignment {
    /// #[repr(C, align(16))] - used for uniform and push constant blocks
    Std140,
    /// #[repr(C)] - tightly packed vertex attributes
    VertexAttributes,
}

impl Alignment {
    fn annotation(&self) -> String {
        match self {
            Self::Std140 => "#[repr(C, align(16))]".to_string(),
            Self::VertexAttributes => "#[repr(C)]".to_string(),
        }
    }
}
