//! Scene: the instance table and the top-level accelerator over it.

use crate::error::SceneResult;
use crate::{
    accel, AccelerationStructure, Geometry, Instance, InstanceList, IntersectionState,
    NullAccelerator,
};
use std::collections::HashSet;
use std::sync::Arc;
use voxtrace_math::{BoundingBox, Mat4, Ray};

/// Summary of a built scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStats {
    pub instances: usize,
    pub infinite_instances: usize,
    /// Primitives over all instances, counting shared geometry once per instance
    pub primitives: usize,
    pub accel: &'static str,
    pub bounds: BoundingBox,
}

/// A set of placed geometry that rays can be traced against.
///
/// Bounded instances go into the top-level accelerator; unbounded ones
/// (planes and the like) are kept aside and tested linearly on every ray.
/// Tracing takes `&self` and may run on any number of threads at once.
pub struct Scene {
    instances: Vec<Arc<Instance>>,
    infinite: InstanceList,
    accel_type: String,
    accel: Option<Arc<dyn AccelerationStructure>>,
    bounds: BoundingBox,
    dirty: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            infinite: InstanceList::default(),
            accel_type: "auto".to_string(),
            accel: None,
            bounds: BoundingBox::EMPTY,
            dirty: true,
        }
    }

    /// Place `geometry` in the scene and return the new instance's id.
    pub fn add_instance(&mut self, geometry: Arc<Geometry>, object_to_world: Mat4) -> SceneResult<usize> {
        let id = self.instances.len();
        let instance = Instance::new(id, geometry, object_to_world)?;
        self.instances.push(Arc::new(instance));
        self.dirty = true;
        Ok(id)
    }

    /// Select the top-level accelerator type for the next build.
    pub fn set_accel(&mut self, name: &str) {
        if self.accel_type != name {
            self.accel_type = name.to_string();
            self.dirty = true;
        }
    }

    /// Prepare the scene for tracing.
    ///
    /// Does nothing if neither the instances nor the accelerator type
    /// changed since the last successful build. Per-geometry accelerators
    /// are built here too; a geometry that fails to build is logged and
    /// misses every ray, only a failing top-level build is an error.
    pub fn build(&mut self) -> SceneResult<()> {
        if !self.dirty && self.accel.is_some() {
            return Ok(());
        }

        let (bounded, infinite): (Vec<_>, Vec<_>) = self
            .instances
            .iter()
            .cloned()
            .partition(|instance| !instance.is_infinite());

        let mut seen = HashSet::new();
        for instance in &self.instances {
            let geometry = instance.geometry();
            if seen.insert(Arc::as_ptr(geometry)) {
                if let Err(e) = geometry.build_accel() {
                    log::error!("Instance {}: geometry accelerator build failed: {}", instance.id(), e);
                }
            }
        }
        self.infinite = InstanceList::new(infinite);

        let accel: Box<dyn AccelerationStructure> = if bounded.is_empty() {
            log::warn!("No finite instances in the scene, top-level accelerator is empty");
            self.bounds = BoundingBox::EMPTY;
            Box::new(NullAccelerator::new())
        } else {
            // Instances with non-finite bounds are left out of the reported extent
            self.bounds = bounded
                .iter()
                .filter_map(|instance| instance.bounds())
                .filter(|b| b.is_finite())
                .fold(BoundingBox::EMPTY, |acc, b| BoundingBox::surrounding(&acc, &b));
            let list = Arc::new(InstanceList::new(bounded));
            let mut accel = accel::create(&self.accel_type, list.len());
            if let Err(e) = accel.build(list) {
                log::error!("Top-level accelerator build failed: {}", e);
                self.accel = None;
                return Err(e.into());
            }
            accel
        };
        self.accel = Some(Arc::from(accel));
        self.dirty = false;

        let stats = self.stats();
        log::info!("Scene stats:");
        log::info!("  * Infinite instances:  {}", stats.infinite_instances);
        log::info!("  * Instances:           {}", stats.instances);
        log::info!("  * Primitives:          {}", stats.primitives);
        log::info!("  * Instance accel:      {}", stats.accel);
        if !stats.bounds.is_empty() {
            log::info!("  * Scene bounds:        {}", stats.bounds);
            log::info!("  * Scene center:        {}", stats.bounds.center());
            log::info!("  * Scene diameter:      {:.2}", stats.bounds.extents().length());
        }
        Ok(())
    }

    /// Find the closest hit along `ray`, recording it in `state`.
    ///
    /// `state` is reset first. Before the first `build` only unbounded
    /// instances can be hit.
    pub fn trace(&self, ray: &mut Ray, state: &mut IntersectionState) {
        state.reset();
        for instance in self.infinite.iter() {
            instance.intersect(ray, state);
        }
        state.current = None;
        if let Some(accel) = &self.accel {
            accel.intersect(ray, state);
        }
    }

    /// True if anything blocks `ray` within its range.
    pub fn trace_shadow(&self, ray: &mut Ray, state: &mut IntersectionState) -> bool {
        self.trace(ray, state);
        state.hit()
    }

    /// Instance by id, as reported in [`IntersectionState::instance`].
    pub fn instance(&self, id: usize) -> Option<&Arc<Instance>> {
        self.instances.get(id)
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// World bounds of the finite instances as of the last build.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Handle to the current top-level accelerator.
    ///
    /// A rebuild installs a new accelerator; handles taken before it keep
    /// the old one alive and usable.
    pub fn accelerator(&self) -> Option<Arc<dyn AccelerationStructure>> {
        self.accel.clone()
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            instances: self.instances.len(),
            infinite_instances: self.infinite.len(),
            primitives: self
                .instances
                .iter()
                .map(|i| i.geometry().num_primitives())
                .sum(),
            accel: self.accel.as_ref().map_or("none", |a| a.name()),
            bounds: self.bounds,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
