//! Multi-threaded render driver.

use crate::{generate_buckets, render_bucket, BucketResult, Camera, RenderOptions};
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;
use voxtrace_core::{IntersectionState, Scene, SceneError};

/// What a primary ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSample {
    /// Id of the instance in the scene's instance table
    pub instance: usize,
    /// Primitive id within the instance's geometry
    pub id: usize,
    pub u: f32,
    pub v: f32,
    /// Distance along the (unit length) primary ray
    pub t: f32,
}

/// Per-pixel hits of a finished render, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct HitBuffer {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<Option<HitSample>>,
}

impl HitBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            samples: vec![None; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&HitSample> {
        self.samples[(y * self.width + x) as usize].as_ref()
    }

    /// Copy a traced bucket into place.
    pub fn insert(&mut self, result: &BucketResult) {
        let b = &result.bucket;
        for (row, chunk) in result.samples.chunks(b.width as usize).enumerate() {
            let start = ((b.y + row as u32) * self.width + b.x) as usize;
            self.samples[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }

    /// Fraction of pixels whose ray hit something.
    pub fn coverage(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self.samples.iter().filter(|s| s.is_some()).count();
        hits as f64 / self.samples.len() as f64
    }
}

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("scene build failed: {0}")]
    Scene(#[from] SceneError),

    #[error("failed to create render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid render options: {0}")]
    InvalidOptions(String),
}

/// Build `scene` with the requested accelerator and trace one ray per pixel.
///
/// `camera` supplies the view; the image size comes from `options`.
pub fn render(
    scene: &mut Scene,
    camera: &Camera,
    options: &RenderOptions,
) -> Result<HitBuffer, RenderError> {
    let options = options.clone().sanitized();
    if options.accel.is_empty() {
        return Err(RenderError::InvalidOptions("empty accelerator name".to_string()));
    }
    scene.set_accel(&options.accel);
    scene.build()?;
    let scene: &Scene = scene;

    let mut camera = camera
        .clone()
        .with_resolution(options.resolution_x, options.resolution_y);
    camera.initialize();

    let threads = options.thread_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("voxtrace-worker-{i}"))
        .build()?;

    let buckets = generate_buckets(camera.image_width, camera.image_height, options.bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets on {} threads",
        camera.image_width,
        camera.image_height,
        buckets.len(),
        threads
    );

    let start = Instant::now();
    let results: Vec<BucketResult> = pool.install(|| {
        buckets
            .par_iter()
            .map_init(IntersectionState::new, |state, bucket| {
                render_bucket(bucket, &camera, scene, state)
            })
            .collect()
    });

    let mut buffer = HitBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        buffer.insert(result);
    }
    log::info!(
        "Render done in {:?}, coverage {:.1}%",
        start.elapsed(),
        buffer.coverage() * 100.0
    );
    Ok(buffer)
}
