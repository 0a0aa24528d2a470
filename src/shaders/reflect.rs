use naga::{
    AddressSpace, Binding, Expression, Function, Handle, Module, Scalar, Statement, TypeInner,
    VectorSize,
};

use super::json::*;
use super::{CompiledStage, ShaderError};

const STD140_STRUCT_ALIGNMENT: u32 = 16;

/// the location-bound interface and resource blocks of one stage
struct StageInterface {
    inputs: Vec<InterfaceVariable>,
    outputs: Vec<InterfaceVariable>,
    uniform_blocks: Vec<UniformBlock>,
    push_constant: Option<PushConstantBlock>,
}

pub(super) fn program_reflection(
    program_name: &str,
    vertex_shader: &CompiledStage,
    fragment_shader: &CompiledStage,
) -> Result<ReflectionJson, ShaderError> {
    let vertex = reflect_stage(vertex_shader)?;
    let fragment = reflect_stage(fragment_shader)?;

    let mismatch = |message: String| ShaderError::InterfaceMismatch {
        program_name: program_name.to_string(),
        message,
    };

    for input in &fragment.inputs {
        let Some(varying) = vertex.outputs.iter().find(|v| v.location == input.location) else {
            return Err(mismatch(format!(
                "fragment input '{}' at location {} is never written by the vertex stage",
                input.name, input.location
            )));
        };

        if varying.value_type != input.value_type {
            return Err(mismatch(format!(
                "location {} is written as {:?} but read as {:?}",
                input.location, varying.value_type, input.value_type
            )));
        }
    }

    let mut uniform_blocks = vertex.uniform_blocks;
    for block in fragment.uniform_blocks {
        match uniform_blocks
            .iter_mut()
            .find(|b| b.set == block.set && b.binding == block.binding)
        {
            Some(existing) => {
                if !same_layout(&existing.block, &block.block) {
                    return Err(mismatch(format!(
                        "set {} binding {} has different layouts in each stage",
                        block.set, block.binding
                    )));
                }
                existing.stages.extend(block.stages);
            }
            None => uniform_blocks.push(block),
        }
    }
    uniform_blocks.sort_by_key(|b| (b.set, b.binding));

    let push_constant = match (vertex.push_constant, fragment.push_constant) {
        (Some(mut vert_push), Some(frag_push)) => {
            if !same_layout(&vert_push.block, &frag_push.block) {
                return Err(mismatch(
                    "the push constant block has different layouts in each stage".to_string(),
                ));
            }
            vert_push.stages.extend(frag_push.stages);
            Some(vert_push)
        }
        (vert_push, frag_push) => vert_push.or(frag_push),
    };

    Ok(ReflectionJson {
        program_name: program_name.to_string(),
        vertex_entry_point: EntryPoint {
            source_file_name: vertex_shader.file_name.clone(),
            entry_point_name: vertex_shader.entry_point_name.clone(),
        },
        fragment_entry_point: EntryPoint {
            source_file_name: fragment_shader.file_name.clone(),
            entry_point_name: fragment_shader.entry_point_name.clone(),
        },
        vertex_inputs: vertex.inputs,
        varyings: vertex.outputs,
        fragment_outputs: fragment.outputs,
        uniform_blocks,
        push_constant,
    })
}

// names may differ between stages, the bytes may not
fn same_layout(a: &BlockType, b: &BlockType) -> bool {
    a.size == b.size
        && a.fields.len() == b.fields.len()
        && a.fields
            .iter()
            .zip(&b.fields)
            .all(|(x, y)| x.offset == y.offset && x.value_type == y.value_type)
}

fn reflect_stage(compiled: &CompiledStage) -> Result<StageInterface, ShaderError> {
    let module = &compiled.module;
    let Some(entry_point) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == compiled.entry_point_name)
    else {
        return Err(ShaderError::MissingEntryPoint {
            file_name: compiled.file_name.clone(),
            stage: compiled.stage,
        });
    };
    let function = &entry_point.function;

    let mut inputs = vec![];
    for (index, argument) in function.arguments.iter().enumerate() {
        let Some(Binding::Location { location, .. }) = &argument.binding else {
            // builtins like gl_FragCoord are not part of the host interface
            continue;
        };

        let name = argument
            .name
            .clone()
            .or_else(|| stored_argument_name(module, function, index as u32))
            .unwrap_or_else(|| format!("location_{location}"));
        let value_type = value_type(module, argument.ty, &name)?;

        inputs.push(InterfaceVariable {
            name,
            location: *location,
            value_type,
        });
    }
    inputs.sort_by_key(|v| v.location);

    let mut outputs = vec![];
    if let Some(result) = &function.result {
        match (&result.binding, &module.types[result.ty].inner) {
            (Some(Binding::Location { location, .. }), _) => {
                let name = returned_name(module, function, None)
                    .unwrap_or_else(|| format!("location_{location}"));
                let value_type = value_type(module, result.ty, &name)?;
                outputs.push(InterfaceVariable {
                    name,
                    location: *location,
                    value_type,
                });
            }

            (None, TypeInner::Struct { members, .. }) => {
                for (index, member) in members.iter().enumerate() {
                    let Some(Binding::Location { location, .. }) = &member.binding else {
                        continue;
                    };

                    let name = member
                        .name
                        .clone()
                        .or_else(|| returned_name(module, function, Some(index)))
                        .unwrap_or_else(|| format!("location_{location}"));
                    let value_type = value_type(module, member.ty, &name)?;
                    outputs.push(InterfaceVariable {
                        name,
                        location: *location,
                        value_type,
                    });
                }
            }

            _ => {}
        }
    }
    outputs.sort_by_key(|v| v.location);

    let mut uniform_blocks = vec![];
    let mut push_constant = None;
    for (_, global) in module.global_variables.iter() {
        let instance_name = global.name.clone().unwrap_or_default();

        match global.space {
            AddressSpace::Uniform => {
                let Some(resource_binding) = &global.binding else {
                    continue;
                };

                uniform_blocks.push(UniformBlock {
                    set: resource_binding.group,
                    binding: resource_binding.binding,
                    block: block_type(module, global.ty, &instance_name)?,
                    instance_name,
                    stages: vec![compiled.stage],
                });
            }

            AddressSpace::PushConstant => {
                push_constant = Some(PushConstantBlock {
                    block: block_type(module, global.ty, &instance_name)?,
                    instance_name,
                    stages: vec![compiled.stage],
                });
            }

            _ => {}
        }
    }

    Ok(StageInterface {
        inputs,
        outputs,
        uniform_blocks,
        push_constant,
    })
}

fn block_type(
    module: &Module,
    ty: Handle<naga::Type>,
    instance_name: &str,
) -> Result<BlockType, ShaderError> {
    let block = &module.types[ty];
    let TypeInner::Struct { members, .. } = &block.inner else {
        return Err(ShaderError::UnsupportedType {
            context: format!("block '{instance_name}'"),
            type_description: format!("{:?}", block.inner),
        });
    };

    let mut fields = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        let name = member
            .name
            .clone()
            .unwrap_or_else(|| format!("field_{index}"));
        let context = format!("{instance_name}.{name}");

        fields.push(BlockField {
            value_type: value_type(module, member.ty, &context)?,
            size: module.types[member.ty].inner.size(module.to_ctx()),
            offset: member.offset,
            name,
        });
    }

    let end = fields.last().map(|f| f.offset + f.size).unwrap_or(0);

    Ok(BlockType {
        type_name: block
            .name
            .clone()
            .unwrap_or_else(|| instance_name.to_string()),
        size: end.div_ceil(STD140_STRUCT_ALIGNMENT) * STD140_STRUCT_ALIGNMENT,
        fields,
    })
}

fn value_type(
    module: &Module,
    ty: Handle<naga::Type>,
    context: &str,
) -> Result<ValueType, ShaderError> {
    let inner = &module.types[ty].inner;
    let value_type = match *inner {
        TypeInner::Scalar(Scalar::F32) => Some(ValueType::Float),
        TypeInner::Scalar(Scalar::U32) => Some(ValueType::Uint),
        TypeInner::Scalar(Scalar::I32) => Some(ValueType::Int),

        TypeInner::Vector {
            size,
            scalar: Scalar::F32,
        } => Some(match size {
            VectorSize::Bi => ValueType::Vec2,
            VectorSize::Tri => ValueType::Vec3,
            VectorSize::Quad => ValueType::Vec4,
        }),
        TypeInner::Vector {
            size,
            scalar: Scalar::I32,
        } => Some(match size {
            VectorSize::Bi => ValueType::IVec2,
            VectorSize::Tri => ValueType::IVec3,
            VectorSize::Quad => ValueType::IVec4,
        }),
        TypeInner::Vector {
            size,
            scalar: Scalar::U32,
        } => Some(match size {
            VectorSize::Bi => ValueType::UVec2,
            VectorSize::Tri => ValueType::UVec3,
            VectorSize::Quad => ValueType::UVec4,
        }),

        TypeInner::Matrix {
            columns,
            rows,
            scalar: Scalar::F32,
        } if columns == rows => Some(match columns {
            VectorSize::Bi => ValueType::Mat2,
            VectorSize::Tri => ValueType::Mat3,
            VectorSize::Quad => ValueType::Mat4,
        }),

        _ => None,
    };

    value_type.ok_or_else(|| ShaderError::UnsupportedType {
        context: context.to_string(),
        type_description: format!("{inner:?}"),
    })
}

/// The GLSL frontend copies each entry point argument into the global that
/// declared it; recover that global's name
fn stored_argument_name(module: &Module, function: &Function, index: u32) -> Option<String> {
    function.body.iter().find_map(|statement| match statement {
        Statement::Store { pointer, value }
            if matches!(function.expressions[*value], Expression::FunctionArgument(i) if i == index) =>
        {
            global_name(module, function, *pointer)
        }
        _ => None,
    })
}

/// The name of the global loaded into the returned value (or one of its
/// composed members)
fn returned_name(module: &Module, function: &Function, member: Option<usize>) -> Option<String> {
    function.body.iter().find_map(|statement| {
        let Statement::Return { value: Some(value) } = statement else {
            return None;
        };

        match (member, &function.expressions[*value]) {
            (None, _) => global_name(module, function, *value),
            (Some(index), Expression::Compose { components, .. }) => components
                .get(index)
                .and_then(|component| global_name(module, function, *component)),
            (Some(_), _) => None,
        }
    })
}

fn global_name(module: &Module, function: &Function, expr: Handle<Expression>) -> Option<String> {
    match function.expressions[expr] {
        Expression::Load { pointer } => global_name(module, function, pointer),
        Expression::GlobalVariable(handle) => module.global_variables[handle].name.clone(),
        _ => None,
    }
}
