//! voxtrace renderer - multi-threaded bucket tracing over a voxtrace scene.
//!
//! Splits the image into buckets, hands them to a rayon pool and traces one
//! primary ray per pixel. Every worker keeps its own
//! [`voxtrace_core::IntersectionState`] for the whole render.

mod bucket;
mod camera;
mod options;
mod renderer;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
pub use camera::Camera;
pub use options::{RenderOptions, MAX_RESOLUTION};
pub use renderer::{render, HitBuffer, HitSample, RenderError};
