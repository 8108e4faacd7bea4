//! Shared accelerators traced from many threads with private states.

mod common;

use common::{init_logging, random_cloud, random_rays, trace_with, Hit};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread;
use voxtrace_core::{
    AccelerationStructure, Geometry, Instance, IntersectionState, Mat4, PrimitiveList, Ray, Scene,
    UniformGrid, Vec3,
};

const WORKERS: usize = 8;
const RAYS_PER_WORKER: usize = 400;

#[test]
fn shared_grid_matches_single_threaded_trace() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(1234);
    let list: Arc<dyn PrimitiveList> = Arc::new(random_cloud(&mut rng, 3000, 10.0, 0.3));
    let mut grid = UniformGrid::new();
    grid.build(list).unwrap();

    let batches: Vec<Vec<Ray>> = (0..WORKERS)
        .map(|_| random_rays(&mut rng, RAYS_PER_WORKER, 10.0))
        .collect();

    let grid = &grid;
    let parallel: Vec<Vec<Option<Hit>>> = thread::scope(|s| {
        let handles: Vec<_> = batches
            .iter()
            .map(|rays| {
                s.spawn(move || {
                    let mut state = IntersectionState::new();
                    rays.iter()
                        .map(|&ray| trace_with(grid, ray, &mut state))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // re-trace each ray in isolation with a fresh state
    for (rays, results) in batches.iter().zip(&parallel) {
        for (&ray, result) in rays.iter().zip(results) {
            let mut state = IntersectionState::new();
            assert_eq!(&trace_with(grid, ray, &mut state), result);
        }
    }
    assert!(parallel.iter().flatten().any(Option::is_some));
}

#[test]
fn shared_scene_matches_single_threaded_trace() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(99);
    let cloud = Arc::new(Geometry::new(Arc::new(random_cloud(&mut rng, 500, 2.0, 0.1))));
    let mut scene = Scene::new();
    for i in 0..27 {
        let offset = Vec3::new((i % 3) as f32, ((i / 3) % 3) as f32, (i / 9) as f32) * 6.0;
        scene
            .add_instance(cloud.clone(), Mat4::from_translation(offset - Vec3::splat(6.0)))
            .unwrap();
    }
    scene.build().unwrap();

    let rays = random_rays(&mut rng, WORKERS * RAYS_PER_WORKER, 10.0);
    let trace_scene = |ray: Ray, state: &mut IntersectionState| {
        let mut ray = ray;
        scene.trace(&mut ray, state);
        Hit::record(&ray, state)
    };

    let expected: Vec<Option<Hit>> = rays
        .iter()
        .map(|&ray| trace_scene(ray, &mut IntersectionState::new()))
        .collect();

    let parallel: Vec<Option<Hit>> = thread::scope(|s| {
        let handles: Vec<_> = rays
            .chunks(RAYS_PER_WORKER)
            .map(|chunk| {
                s.spawn(move || {
                    let mut state = IntersectionState::new();
                    chunk.iter().map(|&ray| trace_scene(ray, &mut state)).collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(parallel, expected);
    assert!(expected.iter().any(|h| h.map_or(false, |h| h.instance.is_some())));
}

#[test]
fn lazy_geometry_build_races_safely() {
    let mut rng = StdRng::seed_from_u64(5);
    let geometry = Arc::new(Geometry::with_accel(
        Arc::new(random_cloud(&mut rng, 2000, 3.0, 0.1)),
        "uniformgrid",
    ));
    let instance = Instance::new(0, geometry.clone(), Mat4::IDENTITY).unwrap();
    let rays = random_rays(&mut rng, 200, 3.0);

    let instance = &instance;
    let rays = &rays;
    let results: Vec<Vec<Option<Hit>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                s.spawn(move || {
                    let mut state = IntersectionState::new();
                    rays.iter()
                        .map(|&ray| {
                            let mut ray = ray;
                            state.reset();
                            instance.intersect(&mut ray, &mut state);
                            Hit::record(&ray, &state)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(geometry.is_built());
    assert_eq!(geometry.accel().name(), "uniformgrid");
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
