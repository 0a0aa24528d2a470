pub mod shader_atlas;
