//! voxtrace: trace a synthetic instanced scene and report hit statistics.
//!
//! Usage: `voxtrace [options.json]`. Without an argument the default render
//! options are used.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::fs;
use std::sync::Arc;
use voxtrace_core::{
    Geometry, Hair, HairWidths, Mat4, ParticleSurface, Plane, Scene, Torus, TriangleMesh, Vec3,
};
use voxtrace_renderer::{render, Camera, RenderOptions};

/// Particles per cloud geometry.
const CLOUD_PARTICLES: usize = 20_000;

/// Strands in the hair tuft, and segments per strand.
const HAIR_STRANDS: usize = 2_000;
const HAIR_SEGMENTS: usize = 4;

fn load_options(path: Option<&str>) -> Result<RenderOptions> {
    let Some(path) = path else {
        return Ok(RenderOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let options = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    log::info!("Loaded render options from {}", path);
    Ok(options)
}

/// A ground plane, a ring of cubes, a few instanced particle clouds,
/// a torus and a tuft of hair.
fn build_scene(rng: &mut StdRng) -> Result<Scene> {
    let mut scene = Scene::new();

    let ground = Arc::new(Geometry::new(Arc::new(Plane::new(
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::Y,
    ))));
    scene.add_instance(ground, Mat4::IDENTITY)?;

    let cube = Arc::new(Geometry::new(Arc::new(TriangleMesh::cube(1.0))));
    for i in 0..16 {
        let angle = i as f32 / 16.0 * std::f32::consts::TAU;
        let placement = Mat4::from_translation(Vec3::new(angle.cos() * 6.0, -0.5, angle.sin() * 6.0))
            * Mat4::from_rotation_y(angle);
        scene.add_instance(cube.clone(), placement)?;
    }

    let centers = (0..CLOUD_PARTICLES)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
        })
        .collect();
    let cloud = Arc::new(Geometry::new(Arc::new(ParticleSurface::new(centers, 0.01))));
    for (x, z) in [(-2.0, -2.0), (2.0, -2.0), (0.0, 1.0)] {
        scene.add_instance(
            cloud.clone(),
            Mat4::from_translation(Vec3::new(x, 1.0, z)) * Mat4::from_scale(Vec3::splat(0.8)),
        )?;
    }

    let torus = Arc::new(Geometry::new(Arc::new(Torus::new(0.3, 1.2))));
    scene.add_instance(
        torus,
        Mat4::from_translation(Vec3::new(0.0, 0.5, -5.0))
            * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2),
    )?;

    let mut points = Vec::with_capacity(HAIR_STRANDS * (HAIR_SEGMENTS + 1));
    for _ in 0..HAIR_STRANDS {
        let mut p = Vec3::new(rng.gen_range(-0.5..0.5), -1.0, rng.gen_range(-0.5..0.5));
        let lean = Vec3::new(rng.gen_range(-0.05..0.05), 0.25, rng.gen_range(-0.05..0.05));
        for _ in 0..=HAIR_SEGMENTS {
            points.push(p);
            p += lean;
        }
    }
    let hair = Hair::new(HAIR_SEGMENTS, points, HairWidths::Constant(0.01));
    scene.add_instance(
        Arc::new(Geometry::new(Arc::new(hair))),
        Mat4::from_translation(Vec3::new(3.5, 0.0, 2.0)),
    )?;
    Ok(scene)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let options = load_options(args.get(1).map(String::as_str))?;

    let mut rng = StdRng::seed_from_u64(1);
    let mut scene = build_scene(&mut rng)?;

    let camera = Camera::new()
        .with_position(Vec3::new(0.0, 4.0, 12.0), Vec3::ZERO, Vec3::Y)
        .with_fov(45.0);
    let buffer = render(&mut scene, &camera, &options)?;

    let mut per_instance = vec![0usize; scene.num_instances()];
    for sample in buffer.samples.iter().flatten() {
        per_instance[sample.instance] += 1;
    }
    println!("{}x{} pixels, {:.1}% covered", buffer.width, buffer.height, buffer.coverage() * 100.0);
    for (id, count) in per_instance.iter().enumerate().filter(|(_, c)| **c > 0) {
        println!("  instance {:>3}: {} pixels", id, count);
    }
    Ok(())
}
