use vulkan_glsl_atlas::build_tasks::{self, Config};
use vulkan_glsl_atlas::shaders::watch;
use vulkan_glsl_atlas::util::manifest_path;

pub fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let config = Config {
        generate_rust_source: env_flag("GENERATE_RUST_SOURCE"),
        rust_source_dir: manifest_path(["src"]),
        shaders_source_dir: manifest_path(["shaders", "source"]),
        compiled_shaders_dir: manifest_path(["shaders", "compiled"]),
    };

    build_tasks::write_precompiled_shaders(&config)?;

    if env_flag("WATCH") {
        watch::watch_and_rebuild(&config)?;
    }

    Ok(())
}

/// set, non-empty and not "false"
fn env_flag(name: &str) -> bool {
    match std::env::var(name).ok() {
        None => false,
        Some(s) if s.is_empty() => false,
        Some(s) if s.to_lowercase() == "false" => false,
        _ => true,
    }
}
