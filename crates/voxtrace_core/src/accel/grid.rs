//! Uniform grid acceleration structure.
//!
//! Primitive-bound space is cut into a regular lattice of voxels, each
//! holding the ids of the primitives whose bounds overlap it. Rays walk the
//! occupied voxels front to back with incremental 3D-DDA stepping.

use crate::primitive::primitive_bounds;
use crate::{AccelError, AccelerationStructure, IntersectionState, PrimitiveList};
use std::sync::Arc;
use std::time::{Duration, Instant};
use voxtrace_math::{BoundingBox, Ray, Vec3};

/// Hard cap on voxels per axis, bounding memory on flat or elongated scenes.
pub const MAX_RESOLUTION: usize = 128;

/// Direction components below this magnitude never change voxel along their axis.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Occupancy figures gathered at the end of a build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStats {
    pub cells: usize,
    pub used_cells: usize,
    pub empty_cells: usize,
    /// Percentage of cells holding at least one primitive
    pub occupancy: f64,
    pub objects_per_cell: f64,
    pub objects_per_used_cell: f64,
    pub cells_per_object: f64,
    /// Primitives with non-finite bounds, kept outside the lattice
    pub unplaced: usize,
    pub build_time: Duration,
}

/// Regular voxel lattice over the bounds of a primitive list.
pub struct UniformGrid {
    resolution: [i32; 3],
    primitives: Option<Arc<dyn PrimitiveList>>,
    bounds: BoundingBox,
    /// Primitive ids per voxel, x fastest then y then z. Empty voxels hold nothing.
    cells: Vec<Option<Box<[u32]>>>,
    /// Primitives that could not be placed in any voxel, tested on every ray
    unplaced: Box<[u32]>,
    voxel_size: Vec3,
    inv_voxel_size: Vec3,
    stats: Option<GridStats>,
}

impl UniformGrid {
    /// An unbuilt grid: a single empty voxel that every ray misses.
    pub fn new() -> Self {
        Self {
            resolution: [1, 1, 1],
            primitives: None,
            bounds: BoundingBox::EMPTY,
            cells: vec![None],
            unplaced: Box::default(),
            voxel_size: Vec3::ZERO,
            inv_voxel_size: Vec3::ZERO,
            stats: None,
        }
    }

    /// Voxel counts along x, y and z.
    pub fn resolution(&self) -> [usize; 3] {
        self.resolution.map(|n| n as usize)
    }

    /// Enlarged bounds the lattice spans.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    /// Statistics of the last successful build.
    pub fn stats(&self) -> Option<&GridStats> {
        self.stats.as_ref()
    }

    /// Primitive ids stored in voxel `[ix, iy, iz]`, `None` if the voxel is empty.
    pub fn cell(&self, index: [usize; 3]) -> Option<&[u32]> {
        let [nx, ny, _] = self.resolution();
        let idx = index[0] + nx * index[1] + nx * ny * index[2];
        self.cells.get(idx).and_then(|c| c.as_deref())
    }

    /// Voxel containing `p`, clamped into the lattice.
    pub fn voxel_of(&self, p: Vec3) -> [usize; 3] {
        self.grid_index(p).map(|i| i as usize)
    }

    fn grid_index(&self, p: Vec3) -> [i32; 3] {
        let mut out = [0; 3];
        for (axis, slot) in out.iter_mut().enumerate() {
            let i = ((p[axis] - self.bounds.minimum[axis]) * self.inv_voxel_size[axis]) as i32;
            *slot = i.clamp(0, self.resolution[axis] - 1);
        }
        out
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn log_stats(&self, stats: &GridStats) {
        log::debug!("Uniform grid statistics:");
        log::debug!("  * Grid cells:          {}", stats.cells);
        log::debug!("  * Used cells:          {}", stats.used_cells);
        log::debug!("  * Empty cells:         {}", stats.empty_cells);
        log::debug!("  * Occupancy:           {:.2}%", stats.occupancy);
        log::debug!("  * Objects/Cell:        {:.3}", stats.objects_per_cell);
        log::debug!("  * Objects/Used Cell:   {:.3}", stats.objects_per_used_cell);
        log::debug!("  * Cells/Object:        {:.3}", stats.cells_per_object);
        log::debug!("  * Unplaced objects:    {}", stats.unplaced);
        log::debug!("  * Build time:          {:?}", stats.build_time);
    }
}

impl Default for UniformGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// Finite, non-inverted bounds can be mapped onto the lattice.
fn is_placeable(b: &BoundingBox) -> bool {
    b.is_finite() && !b.is_empty()
}

/// Voxel count along one axis for a target voxel edge `s`.
fn axis_resolution(extent: f32, s: f64) -> i32 {
    // Saturating casts map inf to i32::MAX and NaN to 0, both clamped below.
    ((extent as f64 / s + 0.5) as i32).clamp(1, MAX_RESOLUTION as i32)
}

impl AccelerationStructure for UniformGrid {
    fn build(&mut self, primitives: Arc<dyn PrimitiveList>) -> Result<(), AccelError> {
        let start = Instant::now();
        self.reset();

        let n = primitives.num_primitives();
        if n == 0 {
            return Err(AccelError::EmptyPrimitiveList);
        }
        if primitives.world_bounds(None).is_none() {
            return Err(AccelError::UnboundedPrimitiveList);
        }

        // The lattice spans only primitives with usable bounds
        let mut bounds = BoundingBox::EMPTY;
        let mut unplaced = Vec::new();
        for id in 0..n {
            let b = primitive_bounds(primitives.as_ref(), id);
            if is_placeable(&b) {
                bounds.include_box(&b);
            } else {
                unplaced.push(id as u32);
            }
        }
        if !unplaced.is_empty() {
            log::warn!(
                "Uniform grid: {} of {} primitives have non-finite bounds, testing them on every ray",
                unplaced.len(),
                n
            );
        }

        if bounds.is_empty() {
            log::warn!("Uniform grid: no primitive has finite bounds");
        } else {
            if bounds.extents() == Vec3::ZERO {
                log::warn!("Uniform grid: all primitives collapse to a single point");
            }
            // One primitive per voxel on average
            bounds.enlarge_ulps();
            let w = bounds.extents();
            let placed = n - unplaced.len();
            let s = ((w.x as f64 * w.y as f64 * w.z as f64) / placed as f64).cbrt();
            let resolution = [
                axis_resolution(w.x, s),
                axis_resolution(w.y, s),
                axis_resolution(w.z, s),
            ];
            let voxel_size = w / Vec3::new(
                resolution[0] as f32,
                resolution[1] as f32,
                resolution[2] as f32,
            );
            self.bounds = bounds;
            self.resolution = resolution;
            self.voxel_size = voxel_size;
            self.inv_voxel_size = voxel_size.recip();
        }
        log::debug!(
            "Creating grid: {}x{}x{} ...",
            self.resolution[0],
            self.resolution[1],
            self.resolution[2]
        );

        // First pass: tally ids into growable per-voxel lists
        let [nx, ny, nz] = self.resolution();
        let total = nx * ny * nz;
        let mut build_cells: Vec<Option<Vec<u32>>> = (0..total).map(|_| None).collect();
        let mut num_cells_per_object = 0usize;
        for id in 0..n {
            let b = primitive_bounds(primitives.as_ref(), id);
            if !is_placeable(&b) {
                continue;
            }
            let imin = self.voxel_of(b.minimum);
            let imax = self.voxel_of(b.maximum);
            for iz in imin[2]..=imax[2] {
                for iy in imin[1]..=imax[1] {
                    for ix in imin[0]..=imax[0] {
                        let idx = ix + nx * iy + nx * ny * iz;
                        build_cells[idx].get_or_insert_with(Vec::new).push(id as u32);
                        num_cells_per_object += 1;
                    }
                }
            }
        }

        // Second pass: freeze occupied voxels into exact-size arrays
        log::debug!("Building cells ...");
        let mut num_empty = 0usize;
        let mut num_in_full = 0usize;
        self.cells = build_cells
            .into_iter()
            .map(|cell| match cell {
                Some(ids) if !ids.is_empty() => {
                    num_in_full += ids.len();
                    Some(ids.into_boxed_slice())
                }
                _ => {
                    num_empty += 1;
                    None
                }
            })
            .collect();
        self.primitives = Some(primitives);
        let num_unplaced = unplaced.len();
        self.unplaced = unplaced.into_boxed_slice();

        let used = total - num_empty;
        let stats = GridStats {
            cells: total,
            used_cells: used,
            empty_cells: num_empty,
            occupancy: 100.0 * used as f64 / total as f64,
            objects_per_cell: num_in_full as f64 / total as f64,
            objects_per_used_cell: if used > 0 {
                num_in_full as f64 / used as f64
            } else {
                0.0
            },
            cells_per_object: num_cells_per_object as f64 / n as f64,
            unplaced: num_unplaced,
            build_time: start.elapsed(),
        };
        self.log_stats(&stats);
        self.stats = Some(stats);
        Ok(())
    }

    fn intersect(&self, ray: &mut Ray, state: &mut IntersectionState) {
        let Some(primitives) = self.primitives.as_deref() else {
            return;
        };
        for &id in self.unplaced.iter() {
            primitives.intersect_primitive(ray, id as usize, state);
        }
        if self.bounds.is_empty() {
            return;
        }
        let Some(span) = self.bounds.intersect_ray(ray) else {
            return;
        };
        // box is hit at [interval_min, interval_max]
        let mut interval_min = span.min;
        let interval_max = span.max;
        let org = ray.origin + ray.direction * interval_min;
        let dir = ray.direction;

        // locate the starting voxel and set up 3D-DDA vars
        let mut index = self.grid_index(org);
        let mut step = [0i32; 3];
        let mut stop = [0i32; 3];
        let mut delta = [0f32; 3];
        let mut next = [f32::INFINITY; 3];
        for axis in 0..3 {
            let lo = self.bounds.minimum[axis];
            let w = self.voxel_size[axis];
            let d = dir[axis];
            let inv_d = 1.0 / d;
            let i = index[axis];
            if d.abs() < PARALLEL_EPSILON {
                stop[axis] = i;
            } else if d > 0.0 {
                step[axis] = 1;
                stop[axis] = self.resolution[axis];
                delta[axis] = w * inv_d;
                next[axis] = interval_min + ((i + 1) as f32 * w + lo - org[axis]) * inv_d;
            } else {
                step[axis] = -1;
                stop[axis] = -1;
                delta[axis] = -w * inv_d;
                next[axis] = interval_min + (i as f32 * w + lo - org[axis]) * inv_d;
            }
        }
        let [nx, ny, _] = self.resolution;
        let cell_step = [step[0], step[1] * nx, step[2] * nx * ny];
        let mut cell = index[0] + index[1] * nx + index[2] * nx * ny;

        // trace through the grid
        loop {
            // ties go to x, then y, then z
            let axis = if next[0] < next[1] && next[0] < next[2] {
                0
            } else if next[1] < next[2] {
                1
            } else {
                2
            };
            if let Some(ids) = &self.cells[cell as usize] {
                for &id in ids.iter() {
                    primitives.intersect_primitive(ray, id as usize, state);
                }
                if state.hit() && ray.max() < next[axis] && ray.max() < interval_max {
                    return;
                }
            }
            interval_min = next[axis];
            if interval_min > interval_max {
                return;
            }
            index[axis] += step[axis];
            if index[axis] == stop[axis] {
                return;
            }
            next[axis] += delta[axis];
            cell += cell_step[axis];
        }
    }

    fn name(&self) -> &'static str {
        "uniformgrid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxList, ParticleSurface, Plane};

    fn built(list: impl PrimitiveList + 'static) -> UniformGrid {
        let mut grid = UniformGrid::new();
        grid.build(Arc::new(list)).unwrap();
        grid
    }

    fn trace(grid: &UniformGrid, origin: Vec3, dir: Vec3) -> (Ray, IntersectionState) {
        let mut ray = Ray::new(origin, dir);
        let mut state = IntersectionState::new();
        state.current = Some(0);
        grid.intersect(&mut ray, &mut state);
        (ray, state)
    }

    fn sphere_row(count: usize) -> ParticleSurface {
        ParticleSurface::new(
            (0..count).map(|i| Vec3::new(i as f32 * 2.0, 0.0, 0.0)).collect(),
            0.5,
        )
    }

    #[test]
    fn test_unit_cube_hit_and_miss() {
        let grid = built(BoxList::unit_cube());
        assert_eq!(grid.resolution(), [1, 1, 1]);

        let (ray, state) = trace(&grid, Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(state.hit());
        assert_eq!(state.id, 0);
        assert!((ray.max() - 4.5).abs() < 1e-5);

        let (ray, state) = trace(&grid, Vec3::new(5.0, 5.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!state.hit());
        assert_eq!(ray.max(), f32::INFINITY);
    }

    #[test]
    fn test_resolution_is_capped() {
        // 100k tiny spheres spread along a line: the long axis wants far more than 128 voxels
        let spheres = ParticleSurface::new(
            (0..100_000).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect(),
            0.1,
        );
        let grid = built(spheres);
        let [nx, ny, nz] = grid.resolution();
        assert_eq!(nx, MAX_RESOLUTION);
        assert!((1..=MAX_RESOLUTION).contains(&ny));
        assert!((1..=MAX_RESOLUTION).contains(&nz));
        assert_eq!(grid.stats().unwrap().cells, nx * ny * nz);
    }

    #[test]
    fn test_voxel_size_reproduces_extent() {
        let grid = built(sphere_row(50));
        let res = grid.resolution();
        let extents = grid.bounds().extents();
        for axis in 0..3 {
            let rebuilt = grid.voxel_size()[axis] * res[axis] as f32;
            assert!((rebuilt - extents[axis]).abs() <= extents[axis] * 1e-5);
        }
    }

    #[test]
    fn test_every_primitive_is_in_all_its_voxels() {
        let list = sphere_row(40);
        let grid = built(list.clone());
        for id in 0..list.num_primitives() {
            let lo = Vec3::new(
                list.primitive_bound(id, 0),
                list.primitive_bound(id, 2),
                list.primitive_bound(id, 4),
            );
            let hi = Vec3::new(
                list.primitive_bound(id, 1),
                list.primitive_bound(id, 3),
                list.primitive_bound(id, 5),
            );
            let imin = grid.voxel_of(lo);
            let imax = grid.voxel_of(hi);
            for iz in imin[2]..=imax[2] {
                for iy in imin[1]..=imax[1] {
                    for ix in imin[0]..=imax[0] {
                        let cell = grid.cell([ix, iy, iz]).expect("voxel should be occupied");
                        assert!(cell.contains(&(id as u32)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_nearest_along_axis_both_directions() {
        let grid = built(sphere_row(10));

        let (ray, state) = trace(&grid, Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert_eq!(state.id, 0);
        assert!((ray.max() - 4.5).abs() < 1e-4);

        let (ray, state) = trace(&grid, Vec3::new(30.0, 0.0, 0.0), Vec3::NEG_X);
        assert_eq!(state.id, 9);
        assert!((ray.max() - 11.5).abs() < 1e-4);
    }

    #[test]
    fn test_origin_inside_grid() {
        let grid = built(sphere_row(10));
        let (_, state) = trace(&grid, Vec3::new(9.0, 0.0, 0.0), Vec3::X);
        assert_eq!(state.id, 5);
    }

    #[test]
    fn test_stats_are_consistent() {
        let grid = built(sphere_row(20));
        let stats = grid.stats().unwrap();
        assert_eq!(stats.used_cells + stats.empty_cells, stats.cells);
        assert!(stats.occupancy > 0.0 && stats.occupancy <= 100.0);
        assert!(stats.cells_per_object >= 1.0);
    }

    #[test]
    fn test_empty_list_falls_back_to_single_voxel() {
        let mut grid = UniformGrid::new();
        let err = grid.build(Arc::new(BoxList::new(vec![]))).unwrap_err();
        assert_eq!(err, AccelError::EmptyPrimitiveList);
        assert_eq!(grid.resolution(), [1, 1, 1]);

        let (_, state) = trace(&grid, Vec3::ZERO, Vec3::Z);
        assert!(!state.hit());
    }

    #[test]
    fn test_unbounded_list_is_rejected() {
        let mut grid = UniformGrid::new();
        let err = grid
            .build(Arc::new(Plane::new(Vec3::ZERO, Vec3::Y)))
            .unwrap_err();
        assert_eq!(err, AccelError::UnboundedPrimitiveList);
    }

    #[test]
    fn test_rebuild_after_failure_replaces_old_content() {
        let mut grid = built(sphere_row(5));
        assert!(grid.build(Arc::new(BoxList::new(vec![]))).is_err());
        let (_, state) = trace(&grid, Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(!state.hit());
    }

    #[test]
    fn test_non_finite_primitive_is_tested_outside_the_lattice() {
        let spheres = ParticleSurface::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(f32::INFINITY, 0.0, 0.0),
                Vec3::new(4.0, 0.0, 0.0),
            ],
            0.5,
        );
        let grid = built(spheres);
        assert_eq!(grid.stats().unwrap().unplaced, 1);
        assert!(grid.bounds().is_finite());
        assert!(grid.bounds().maximum.x < 5.0);

        let (ray, state) = trace(&grid, Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert_eq!(state.id, 0);
        assert!((ray.max() - 4.5).abs() < 1e-4);
        let (_, state) = trace(&grid, Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(state.id, 1);
    }

    #[test]
    fn test_only_non_finite_primitives() {
        let grid = built(ParticleSurface::new(vec![Vec3::splat(f32::NAN)], 1.0));
        assert_eq!(grid.resolution(), [1, 1, 1]);
        assert_eq!(grid.stats().unwrap().unplaced, 1);
        let (_, state) = trace(&grid, Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(!state.hit());
    }

    #[test]
    fn test_degenerate_point_bounds() {
        // A zero-radius particle collapses to a point; the ulp enlargement keeps the grid usable
        let grid = built(ParticleSurface::new(vec![Vec3::new(1.0, 1.0, 1.0)], 0.0));
        assert_eq!(grid.resolution(), [1, 1, 1]);
        assert!(grid.bounds().contains(Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_axis_parallel_direction_components() {
        // direction with tiny y/z components is treated as never leaving its row
        let grid = built(sphere_row(10));
        let (_, state) = trace(&grid, Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 1e-8, -1e-8));
        assert_eq!(state.id, 0);
    }
}
