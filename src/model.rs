use std::io::BufRead;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::generated::shader_atlas::{lit_mesh, push_offset, uniform_offset};

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("failed to load obj")]
    Load(#[from] tobj::LoadError),
    #[error("model has no triangles")]
    Empty,
    #[error("index {index} is out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: u32, vertex_count: usize },
}

/// Indexed triangle list ready to hand to a vertex and index buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<V> {
    pub vertices: Vec<V>,
    pub indices: Vec<u32>,
}

impl<V> Mesh<V> {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn validated(self) -> Result<Self, ModelError> {
        if self.indices.len() < 3 {
            return Err(ModelError::Empty);
        }

        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ModelError::IndexOutOfBounds {
                index,
                vertex_count,
            });
        }

        Ok(self)
    }
}

pub type Model = Mesh<lit_mesh::Vertex>;

/// missing vertex colors are white
const DEFAULT_COLOR: Vec3 = Vec3::ONE;
/// missing normals point along +Y
const DEFAULT_NORMAL: Vec3 = Vec3::Y;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Loads every model in an obj file into one mesh.
/// Materials are ignored.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Model, ModelError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;

    let model = merge_models(&models)?;
    log::info!(
        "loaded {path:?}: {} vertices, {} triangles",
        model.vertices.len(),
        model.triangle_count()
    );

    Ok(model)
}

pub fn from_obj_reader(reader: &mut impl BufRead) -> Result<Model, ModelError> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_mtl_path| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    merge_models(&models)
}

fn merge_models(models: &[tobj::Model]) -> Result<Model, ModelError> {
    let mut vertices = vec![];
    let mut indices = vec![];

    for model in models {
        let mesh = &model.mesh;
        let base_index = vertices.len() as u32;

        for i in 0..mesh.positions.len() / 3 {
            vertices.push(lit_mesh::Vertex {
                position: vec3_at(&mesh.positions, i).unwrap_or(Vec3::ZERO),
                color: vec3_at(&mesh.vertex_color, i).unwrap_or(DEFAULT_COLOR),
                normal: vec3_at(&mesh.normals, i).unwrap_or(DEFAULT_NORMAL),
                uv: vec2_at(&mesh.texcoords, i).unwrap_or(Vec2::ZERO),
            });
        }

        indices.extend(mesh.indices.iter().map(|index| base_index + index));
    }

    Mesh { vertices, indices }.validated()
}

fn vec3_at(values: &[f32], i: usize) -> Option<Vec3> {
    values.get(3 * i..3 * i + 3).map(Vec3::from_slice)
}

fn vec2_at(values: &[f32], i: usize) -> Option<Vec2> {
    values.get(2 * i..2 * i + 2).map(Vec2::from_slice)
}

/// An axis-aligned cube centered on the origin, one solid color per face
pub fn cube(half_extent: f32) -> Model {
    // (outward normal, face color)
    let faces = [
        (Vec3::NEG_X, Vec3::new(0.9, 0.9, 0.9)),
        (Vec3::X, Vec3::new(0.8, 0.8, 0.1)),
        (Vec3::NEG_Y, Vec3::new(0.9, 0.6, 0.1)),
        (Vec3::Y, Vec3::new(0.8, 0.1, 0.1)),
        (Vec3::Z, Vec3::new(0.1, 0.1, 0.8)),
        (Vec3::NEG_Z, Vec3::new(0.1, 0.8, 0.1)),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, color) in faces {
        // two axes spanning the face
        let tangent = if normal.x != 0.0 { Vec3::Y } else { Vec3::X };
        let bitangent = normal.cross(tangent);

        let base_index = vertices.len() as u32;
        for (s, t) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = half_extent * (normal + s * tangent + t * bitangent);
            vertices.push(lit_mesh::Vertex {
                position,
                color,
                normal,
                uv: Vec2::new((s + 1.0) / 2.0, (t + 1.0) / 2.0),
            });
        }

        indices.extend([0, 1, 2, 0, 2, 3].map(|i| base_index + i));
    }

    Mesh { vertices, indices }
}

/// the corners of the 2d offset demo quad, in clip space
const QUAD_CORNERS: [(Vec2, Vec3); 4] = [
    (Vec2::new(-0.5, -0.5), Vec3::new(1.0, 0.0, 0.0)),
    (Vec2::new(0.5, -0.5), Vec3::new(0.0, 1.0, 0.0)),
    (Vec2::new(0.5, 0.5), Vec3::new(0.0, 0.0, 1.0)),
    (Vec2::new(-0.5, 0.5), Vec3::new(1.0, 0.0, 1.0)),
];

const QUAD_INDICES: [u32; 6] = [0, 3, 1, 1, 3, 2];

pub fn push_offset_quad() -> Mesh<push_offset::Vertex> {
    Mesh {
        vertices: QUAD_CORNERS
            .map(|(position, color)| push_offset::Vertex { position, color })
            .to_vec(),
        indices: QUAD_INDICES.to_vec(),
    }
}

pub fn uniform_offset_quad() -> Mesh<uniform_offset::Vertex> {
    Mesh {
        vertices: QUAD_CORNERS
            .map(|(position, color)| uniform_offset::Vertex { position, color })
            .to_vec(),
        indices: QUAD_INDICES.to_vec(),
    }
}
