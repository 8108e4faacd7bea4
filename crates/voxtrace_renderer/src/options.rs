//! Render settings, loadable from JSON.

use serde::{Deserialize, Serialize};

/// Largest accepted image dimension.
pub const MAX_RESOLUTION: u32 = 16384;

const MIN_BUCKET_SIZE: u32 = 16;
const MAX_BUCKET_SIZE: u32 = 512;

/// User-facing render options.
///
/// Missing fields take their defaults, so `{}` is a valid options file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Worker threads, 0 for one per available CPU
    pub threads: usize,
    /// Top-level accelerator name
    pub accel: String,
    pub resolution_x: u32,
    pub resolution_y: u32,
    /// Bucket edge in pixels
    pub bucket_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            threads: 0,
            accel: "auto".to_string(),
            resolution_x: 640,
            resolution_y: 480,
            bucket_size: 32,
        }
    }
}

impl RenderOptions {
    /// Clamp out-of-range values, warning about each adjustment.
    pub fn sanitized(mut self) -> Self {
        let rx = self.resolution_x.clamp(1, MAX_RESOLUTION);
        let ry = self.resolution_y.clamp(1, MAX_RESOLUTION);
        if (rx, ry) != (self.resolution_x, self.resolution_y) {
            log::warn!(
                "Resolution {}x{} out of range, using {}x{}",
                self.resolution_x,
                self.resolution_y,
                rx,
                ry
            );
            self.resolution_x = rx;
            self.resolution_y = ry;
        }
        let bucket = self.bucket_size.clamp(MIN_BUCKET_SIZE, MAX_BUCKET_SIZE);
        if bucket != self.bucket_size {
            log::warn!("Bucket size {} out of range, using {}", self.bucket_size, bucket);
            self.bucket_size = bucket;
        }
        self
    }

    /// Worker count with 0 resolved to the available parallelism.
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        }
    }
}
