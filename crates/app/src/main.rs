//! Entry point for objscene.
//! Loads shaders and OBJ meshes, assembles the demo scene and plans a frame.

use std::path::PathBuf;

use anyhow::{Context, Result};
use asset::{GeometryData, ShaderSources};
use corelib::{
    Color, DrawMode, MeshId, Vec3,
    camera::Camera,
    light::Light,
    scene::{Renderable, Scene},
    transform::Transform,
    vec3,
};
use renderer::{FramePlan, GeometryUpload, RenderResult, UniformBlock, basic_layout};

const DEMO_MODELS: [&str; 3] = ["models/cube.obj", "models/icosphere.obj", "models/plane.obj"];
const DEFAULT_VERTEX_SHADER: &str = "shaders/basic.vert.glsl";
const DEFAULT_FRAGMENT_SHADER: &str = "shaders/basic.frag.glsl";
const PALETTE: [Color; 3] = [Color::WHITE, Color::GREEN, Color::GREY];

/// How meshes are placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// Cube, icosphere and ground plane, each with its own draw mode.
    Demo,
    /// User-supplied meshes side by side along X.
    Row { wireframe: bool },
}

#[derive(Clone, Debug, PartialEq)]
struct AppConfig {
    models: Vec<PathBuf>,
    wireframe: bool,
    width: u32,
    height: u32,
    vertex_shader: PathBuf,
    fragment_shader: PathBuf,
}

impl AppConfig {
    /// Positional args are OBJ paths; flags use `--key=value`.
    fn from_args(args: &[String]) -> Self {
        let mut models = Vec::new();
        let mut wireframe = false;
        let mut w: Option<u32> = None;
        let mut h: Option<u32> = None;
        let mut vertex_shader = PathBuf::from(DEFAULT_VERTEX_SHADER);
        let mut fragment_shader = PathBuf::from(DEFAULT_FRAGMENT_SHADER);

        for arg in args {
            if arg == "--wireframe" {
                wireframe = true;
            } else if let Some(v) = arg.strip_prefix("--wireframe=") {
                wireframe = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on" | "yes");
            } else if let Some(v) = arg.strip_prefix("--size=") {
                if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                    if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                        w = Some(pw);
                        h = Some(ph);
                    }
                }
            } else if let Some(v) = arg.strip_prefix("--width=") {
                if let Ok(pw) = v.parse::<u32>() {
                    w = Some(pw);
                }
            } else if let Some(v) = arg.strip_prefix("--height=") {
                if let Ok(ph) = v.parse::<u32>() {
                    h = Some(ph);
                }
            } else if let Some(v) = arg.strip_prefix("--vertex-shader=") {
                vertex_shader = PathBuf::from(v);
            } else if let Some(v) = arg.strip_prefix("--fragment-shader=") {
                fragment_shader = PathBuf::from(v);
            } else if arg.starts_with("--") {
                log::warn!("Ignoring unknown flag {arg}");
            } else {
                models.push(PathBuf::from(arg));
            }
        }

        Self {
            models,
            wireframe,
            width: w.unwrap_or(1280).max(1),
            height: h.unwrap_or(720).max(1),
            vertex_shader,
            fragment_shader,
        }
    }

    /// Demo scene when no OBJ paths were given.
    fn layout(&self) -> Layout {
        if self.models.is_empty() {
            Layout::Demo
        } else {
            Layout::Row {
                wireframe: self.wireframe,
            }
        }
    }

    fn model_paths(&self) -> Vec<PathBuf> {
        if self.models.is_empty() {
            DEMO_MODELS.iter().map(PathBuf::from).collect()
        } else {
            self.models.clone()
        }
    }
}

/// Parse every mesh on its own thread; the first failure aborts.
fn load_meshes(paths: &[PathBuf]) -> Result<Vec<GeometryData>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| s.spawn(move || asset::load_obj_from_path(path)))
            .collect();
        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("Mesh loader panicked: {}", path.display()))?
            })
            .collect()
    })
}

/// `(triangle, line)` index counts per mesh, computed once.
fn index_counts(meshes: &[GeometryData]) -> RenderResult<Vec<(u32, u32)>> {
    meshes
        .iter()
        .map(|mesh| {
            let upload = GeometryUpload::from_data(mesh);
            Ok((
                upload.index_count(DrawMode::Triangles)?,
                upload.index_count(DrawMode::Lines)?,
            ))
        })
        .collect()
}

fn demo_object(slot: usize) -> Option<(Transform, Color, DrawMode)> {
    match slot {
        0 => Some((Transform::from_position(vec3(1.5, 1.0, 0.0)), Color::WHITE, DrawMode::Lines)),
        1 => Some((Transform::from_position(vec3(-1.5, 1.0, 0.0)), Color::GREEN, DrawMode::Lines)),
        2 => Some((
            Transform::identity().with_scale(vec3(4.0, 1.0, 4.0)),
            Color::GREY,
            DrawMode::Triangles,
        )),
        _ => None,
    }
}

fn row_object(slot: usize, mesh_count: usize, wireframe: bool) -> (Transform, Color, DrawMode) {
    let spacing = 3.0;
    let center = (mesh_count.saturating_sub(1)) as f32 / 2.0;
    let x = (slot as f32 - center) * spacing;
    (
        Transform::from_position(vec3(x, 1.0, 0.0)),
        PALETTE[slot % PALETTE.len()],
        DrawMode::from_wireframe(wireframe),
    )
}

fn build_scene(mesh_count: usize, layout: Layout) -> Scene {
    let mut scene = Scene::new();
    for i in 0..mesh_count {
        let (transform, color, draw_mode) = match layout {
            Layout::Demo => demo_object(i).unwrap_or_else(|| row_object(i, mesh_count, false)),
            Layout::Row { wireframe } => row_object(i, mesh_count, wireframe),
        };
        scene.spawn(
            transform,
            Some(Renderable {
                mesh: i as MeshId,
                color,
                draw_mode,
            }),
        );
    }
    scene.add_light(Light::ambient(Color::rgb(0.15, 0.15, 0.15)));
    scene.add_light(Light::point(Color::WHITE, vec3(4.0, 6.0, 4.0)));
    scene
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = AppConfig::from_args(&args);
    let layout = config.layout();
    let paths = config.model_paths();
    log::info!(
        "Starting objscene. models={}, layout={:?}, viewport={}x{}",
        paths.len(),
        layout,
        config.width,
        config.height
    );

    let shaders = ShaderSources::load(&config.vertex_shader, &config.fragment_shader)
        .context("Failed to load shaders")?;
    log::debug!(
        "Shader program sources: vertex {}B, fragment {}B",
        shaders.vertex.len(),
        shaders.fragment.len()
    );

    let meshes = load_meshes(&paths).context("Failed to load meshes")?;
    for (path, mesh) in paths.iter().zip(&meshes) {
        log::info!(
            "{}: {} vertices, {} faces, {} edges, normals={}",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count(),
            mesh.line_count(),
            mesh.has_normals()
        );
        if !mesh.is_valid() {
            log::warn!("{} contains no triangles", path.display());
        }
    }
    let counts = index_counts(&meshes)?;

    let scene = build_scene(meshes.len(), layout);
    let mut camera = Camera::new(vec3(-8.0, 5.0, 8.0), Vec3::ZERO, Vec3::Y, 45.0, 1.0, 0.1, 30.0);
    camera.resize(config.width, config.height);

    let plan = FramePlan::build(&scene, &camera, |mesh, mode| {
        counts
            .get(mesh as usize)
            .map(|&(triangles, lines)| match mode {
                DrawMode::Triangles => triangles,
                DrawMode::Lines => lines,
            })
    })?;

    let mut block = UniformBlock::new(basic_layout());
    for draw in &plan.draws {
        plan.write_uniforms(draw, &mut block)?;
        log::debug!(
            "draw entity={} mesh={} {:?} indices={} uniforms={}B",
            draw.entity,
            draw.mesh,
            draw.topology,
            draw.index_count,
            block.as_bytes().len()
        );
    }

    log::info!(
        "Frame planned: {} draws, {} indices, {} lights",
        plan.draws.len(),
        plan.total_indices(),
        scene.lights().len()
    );
    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
