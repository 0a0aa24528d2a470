//! Renders one shader program on the CPU and writes the result as a png.
//!
//! usage: preview <lit_mesh|push_offset|uniform_offset> <out.png> [model.obj]

use std::path::PathBuf;

use anyhow::{Context, bail};
use glam::{Vec2, Vec3, Vec4};

use vulkan_glsl_atlas::camera::Camera;
use vulkan_glsl_atlas::generated::shader_atlas::{
    ShaderAtlas, lit_mesh, push_offset, uniform_offset,
};
use vulkan_glsl_atlas::model::{self, Model};
use vulkan_glsl_atlas::preview::Rasterizer;
use vulkan_glsl_atlas::reference::{LitMesh, PushOffset, UniformOffset};
use vulkan_glsl_atlas::shaders::atlas::ShaderAtlasEntry;
use vulkan_glsl_atlas::transform::Transform;

const DEFAULT_SIZE: u32 = 512;
const CLEAR_COLOR: Vec4 = Vec4::new(0.01, 0.01, 0.01, 1.0);

struct Args {
    program_name: String,
    out_path: PathBuf,
    model_path: Option<PathBuf>,
    size: u32,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);

    let (Some(program_name), Some(out_path)) = (args.next(), args.next()) else {
        bail!("usage: preview <lit_mesh|push_offset|uniform_offset> <out.png> [model.obj]");
    };
    let model_path = args.next().map(PathBuf::from);

    let size = match std::env::var("PREVIEW_SIZE") {
        Ok(s) => s
            .parse()
            .with_context(|| format!("PREVIEW_SIZE is not a pixel count: {s:?}"))?,
        Err(_) => DEFAULT_SIZE,
    };

    Ok(Args {
        program_name,
        out_path: PathBuf::from(out_path),
        model_path,
        size,
    })
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = parse_args()?;

    // compiling the atlas checks the glsl still matches the generated types
    let atlas = ShaderAtlas::init()?;
    let mut raster = Rasterizer::new(args.size, args.size, CLEAR_COLOR);

    let stats = match args.program_name.as_str() {
        lit_mesh::PROGRAM_NAME => {
            let model = match &args.model_path {
                Some(path) => model::load_obj(path)?,
                None => model::cube(0.5),
            };
            let program = lit_scene(&model);
            log::info!("drawing {}", atlas.lit_mesh.program_name());
            raster.draw_indexed(&program, &model.vertices, &model.indices)?
        }
        push_offset::PROGRAM_NAME => {
            let quad = model::push_offset_quad();
            let program = PushOffset::new(Vec2::new(0.25, -0.25), Vec3::new(0.9, 0.9, 0.9));
            log::info!("drawing {}", atlas.push_offset.program_name());
            raster.draw_indexed(&program, &quad.vertices, &quad.indices)?
        }
        uniform_offset::PROGRAM_NAME => {
            let quad = model::uniform_offset_quad();
            let program = UniformOffset::new(Vec2::new(0.25, -0.25), Vec3::new(0.5, 0.5, 0.5));
            log::info!("drawing {}", atlas.uniform_offset.program_name());
            raster.draw_indexed(&program, &quad.vertices, &quad.indices)?
        }
        other => bail!("unknown shader program: {other}"),
    };

    log::info!(
        "{} triangles drawn, {} skipped, {} fragments",
        stats.triangles_drawn,
        stats.triangles_skipped,
        stats.fragments_written
    );

    raster
        .into_image()
        .save(&args.out_path)
        .with_context(|| format!("failed to write {:?}", args.out_path))?;

    Ok(())
}

/// a camera above and in front of the model, with a light off to one side
fn lit_scene(model: &Model) -> LitMesh {
    let radius = model
        .vertices
        .iter()
        .map(|v| v.position.length())
        .fold(0.0_f32, f32::max)
        .max(0.01);

    let mut camera = Camera::default();
    camera.set_perspective(50_f32.to_radians(), 1.0, 0.1 * radius, 10.0 * radius);
    camera.set_view_target(
        Vec3::new(0.0, -1.0, -2.5) * radius,
        Vec3::ZERO,
        Vec3::NEG_Y,
    );

    let transform = Transform {
        rotation: Vec3::new(0.0, 0.5, 0.0),
        ..Default::default()
    };

    LitMesh {
        ubo: lit_mesh::GlobalUbo {
            projection: camera.projection(),
            view: camera.view(),
            ambient_light_color: Vec4::new(1.0, 1.0, 1.0, 0.02),
            light_position: (Vec3::new(-1.0, -1.5, -1.0) * radius).extend(1.0),
            light_color: Vec4::new(1.0, 1.0, 1.0, 2.0 * radius * radius),
        },
        push: transform.push_constants(),
    }
}
