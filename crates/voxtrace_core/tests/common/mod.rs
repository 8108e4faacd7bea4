//! Helpers shared by the integration tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::Rng;
use voxtrace_core::{AccelerationStructure, IntersectionState, ParticleSurface, Ray, Vec3};

/// Everything a trace reports, with floats compared bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub instance: Option<usize>,
    pub id: usize,
    pub u: u32,
    pub v: u32,
    pub t: u32,
}

impl Hit {
    pub fn record(ray: &Ray, state: &IntersectionState) -> Option<Hit> {
        state.hit().then(|| Hit {
            instance: state.instance,
            id: state.id,
            u: state.u.to_bits(),
            v: state.v.to_bits(),
            t: ray.max().to_bits(),
        })
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Trace one ray directly against an accelerator, as if inside instance 0.
pub fn trace(accel: &dyn AccelerationStructure, ray: Ray) -> Option<Hit> {
    let mut state = IntersectionState::new();
    trace_with(accel, ray, &mut state)
}

pub fn trace_with(
    accel: &dyn AccelerationStructure,
    mut ray: Ray,
    state: &mut IntersectionState,
) -> Option<Hit> {
    state.reset();
    state.current = Some(0);
    accel.intersect(&mut ray, state);
    Hit::record(&ray, state)
}

pub fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

pub fn random_cloud(rng: &mut StdRng, count: usize, extent: f32, radius: f32) -> ParticleSurface {
    ParticleSurface::new((0..count).map(|_| random_point(rng, extent)).collect(), radius)
}

/// Rays from a shell around the origin aimed somewhere inside it.
pub fn random_rays(rng: &mut StdRng, count: usize, extent: f32) -> Vec<Ray> {
    (0..count)
        .map(|_| {
            let origin = random_point(rng, extent * 2.0);
            let target = random_point(rng, extent * 0.5);
            Ray::new(origin, target - origin)
        })
        .collect()
}
