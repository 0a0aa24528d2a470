use std::borrow::Cow;
use std::path::{Path, PathBuf};

use naga::valid::{Capabilities, ValidationFlags, Validator};

pub mod atlas;
pub mod build_tasks;
pub mod json;
mod reflect;
pub mod watch;

use json::{ReflectionJson, StageKind};

pub const VERTEX_FILE_SUFFIX: &str = ".vert";
pub const FRAGMENT_FILE_SUFFIX: &str = ".frag";

/// GLSL text for a single stage; the stage is taken from the file extension
#[derive(Debug, Clone)]
pub struct ShaderSource {
    pub file_name: Cow<'static, str>,
    pub text: Cow<'static, str>,
}

impl ShaderSource {
    pub const fn from_static(file_name: &'static str, text: &'static str) -> Self {
        Self {
            file_name: Cow::Borrowed(file_name),
            text: Cow::Borrowed(text),
        }
    }

    pub fn read(path: &Path) -> Result<Self, ShaderError> {
        let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .and_then(|os_str| os_str.to_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        Ok(Self {
            file_name: Cow::Owned(file_name),
            text: Cow::Owned(text),
        })
    }

    pub fn stage(&self) -> Result<StageKind, ShaderError> {
        StageKind::from_file_name(&self.file_name)
    }
}

impl StageKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, ShaderError> {
        if file_name.ends_with(VERTEX_FILE_SUFFIX) {
            Ok(Self::Vertex)
        } else if file_name.ends_with(FRAGMENT_FILE_SUFFIX) {
            Ok(Self::Fragment)
        } else {
            Err(ShaderError::UnknownStage(file_name.to_string()))
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("failed to read shader source {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't infer a shader stage from {0:?}, expected a .vert or .frag file")]
    UnknownStage(String),
    #[error("failed to parse {file_name}:\n{message}")]
    Parse { file_name: String, message: String },
    #[error("{file_name} failed validation:\n{message}")]
    Validation { file_name: String, message: String },
    #[error("failed to write spir-v for {file_name}: {message}")]
    SpirV { file_name: String, message: String },
    #[error("{file_name} has no {stage:?} entry point")]
    MissingEntryPoint { file_name: String, stage: StageKind },
    #[error("entry point name {entry_point_name:?} in {file_name} contains a nul byte")]
    InvalidEntryPointName {
        file_name: String,
        entry_point_name: String,
    },
    #[error("unsupported type for {context}: {type_description}")]
    UnsupportedType {
        context: String,
        type_description: String,
    },
    #[error("stage interface mismatch in {program_name}: {message}")]
    InterfaceMismatch {
        program_name: String,
        message: String,
    },
}

pub struct CompiledStage {
    pub stage: StageKind,
    pub file_name: String,
    pub entry_point_name: String,
    pub module: naga::Module,
    pub shader_bytecode: Vec<u32>,
}

impl CompiledStage {
    /// spir-v words in file byte order
    pub fn spv_bytes(&self) -> Vec<u8> {
        self.shader_bytecode
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect()
    }
}

pub struct ReflectedShader {
    pub vertex_shader: CompiledStage,
    pub fragment_shader: CompiledStage,
    pub reflection_json: ReflectionJson,
}

/// The sources are written for Vulkan's y-down clip space, so positions pass
/// through untouched. Debug info is left out so debug and release builds
/// write identical words.
fn spirv_options() -> naga::back::spv::Options<'static> {
    naga::back::spv::Options {
        flags: naga::back::spv::WriterFlags::LABEL_VARYINGS,
        ..Default::default()
    }
}

/// parse, validate and write spir-v for one GLSL stage
pub fn compile_stage(source: &ShaderSource) -> Result<CompiledStage, ShaderError> {
    let stage = source.stage()?;
    let naga_stage = stage.naga_stage();
    let file_name = source.file_name.to_string();

    let mut frontend = naga::front::glsl::Frontend::default();
    let options = naga::front::glsl::Options::from(naga_stage);
    let module = frontend
        .parse(&options, &source.text)
        .map_err(|errors| ShaderError::Parse {
            file_name: file_name.clone(),
            message: errors.emit_to_string(&source.text),
        })?;

    let info = Validator::new(ValidationFlags::all(), Capabilities::PUSH_CONSTANT)
        .validate(&module)
        .map_err(|err| ShaderError::Validation {
            file_name: file_name.clone(),
            message: err.emit_to_string(&source.text),
        })?;

    let entry_point_name = module
        .entry_points
        .iter()
        .find(|entry_point| entry_point.stage == naga_stage)
        .map(|entry_point| entry_point.name.clone())
        .ok_or_else(|| ShaderError::MissingEntryPoint {
            file_name: file_name.clone(),
            stage,
        })?;

    let pipeline_options = naga::back::spv::PipelineOptions {
        shader_stage: naga_stage,
        entry_point: entry_point_name.clone(),
    };
    let shader_bytecode = naga::back::spv::write_vec(
        &module,
        &info,
        &spirv_options(),
        Some(&pipeline_options),
    )
    .map_err(|err| ShaderError::SpirV {
        file_name: file_name.clone(),
        message: err.to_string(),
    })?;

    log::debug!(
        "compiled {file_name} ({} spir-v words)",
        shader_bytecode.len()
    );

    Ok(CompiledStage {
        stage,
        file_name,
        entry_point_name,
        module,
        shader_bytecode,
    })
}

/// compile and reflect a `<program_name>.vert` / `<program_name>.frag` pair
pub fn reflect_program(
    program_name: &str,
    vertex_source: &ShaderSource,
    fragment_source: &ShaderSource,
) -> Result<ReflectedShader, ShaderError> {
    let vertex_shader = compile_stage(vertex_source)?;
    let fragment_shader = compile_stage(fragment_source)?;

    for (compiled, expected) in [
        (&vertex_shader, StageKind::Vertex),
        (&fragment_shader, StageKind::Fragment),
    ] {
        if compiled.stage != expected {
            return Err(ShaderError::InterfaceMismatch {
                program_name: program_name.to_string(),
                message: format!("{} is not a {expected:?} shader", compiled.file_name),
            });
        }
    }

    let reflection_json =
        reflect::program_reflection(program_name, &vertex_shader, &fragment_shader)?;

    log::info!(
        "reflected {program_name}: {} vertex inputs, {} uniform blocks, push constants: {}",
        reflection_json.vertex_inputs.len(),
        reflection_json.uniform_blocks.len(),
        reflection_json.push_constant.is_some()
    );

    Ok(ReflectedShader {
        vertex_shader,
        fragment_shader,
        reflection_json,
    })
}

/// read a program's two stages from a shader source directory
pub fn prepare_reflected_shader(
    program_name: &str,
    search_path: &Path,
) -> Result<ReflectedShader, ShaderError> {
    let vertex_path = search_path.join(format!("{program_name}{VERTEX_FILE_SUFFIX}"));
    let fragment_path = search_path.join(format!("{program_name}{FRAGMENT_FILE_SUFFIX}"));

    let vertex_source = ShaderSource::read(&vertex_path)?;
    let fragment_source = ShaderSource::read(&fragment_path)?;

    reflect_program(program_name, &vertex_source, &fragment_source)
}
