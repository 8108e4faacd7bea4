//! Two-level instancing.
//!
//! A [`Geometry`] holds one primitive list and its accelerator in local
//! space. Any number of [`Instance`]s place it in the world with their own
//! transform, so the accelerator is built once however many copies appear.
//! The scene's top-level accelerator is built over an [`InstanceList`],
//! which presents each instance as a single primitive.

use crate::{accel, AccelError, AccelerationStructure, IntersectionState, PrimitiveList, SceneError};
use crate::error::SceneResult;
use std::sync::{Arc, OnceLock};
use voxtrace_math::{BoundingBox, Mat4, Ray, TransformExt, Vec3};

/// A primitive list together with its lazily built accelerator.
pub struct Geometry {
    primitives: Arc<dyn PrimitiveList>,
    accel_type: String,
    accel: OnceLock<Box<dyn AccelerationStructure>>,
}

impl Geometry {
    /// Wrap `primitives`, letting the accelerator be picked automatically.
    pub fn new(primitives: Arc<dyn PrimitiveList>) -> Self {
        Self::with_accel(primitives, "auto")
    }

    /// Wrap `primitives` with a named accelerator type (see [`accel::create`]).
    pub fn with_accel(primitives: Arc<dyn PrimitiveList>, accel_type: &str) -> Self {
        Self {
            primitives,
            accel_type: accel_type.to_string(),
            accel: OnceLock::new(),
        }
    }

    pub fn primitives(&self) -> &Arc<dyn PrimitiveList> {
        &self.primitives
    }

    pub fn num_primitives(&self) -> usize {
        self.primitives.num_primitives()
    }

    pub fn world_bounds(&self, local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        self.primitives.world_bounds(local_to_world)
    }

    /// True once the accelerator exists.
    pub fn is_built(&self) -> bool {
        self.accel.get().is_some()
    }

    /// The accelerator, built on first use.
    ///
    /// Concurrent first calls block until a single build finishes. A failed
    /// build is logged and leaves a structure every ray misses.
    pub fn accel(&self) -> &dyn AccelerationStructure {
        self.accel
            .get_or_init(|| {
                let (accel, result) = self.create_accel();
                if let Err(e) = result {
                    log::error!("Geometry accelerator build failed: {}", e);
                }
                accel
            })
            .as_ref()
    }

    /// Build the accelerator now rather than on the first ray.
    ///
    /// Returns the build error if this call performed a failed build; an
    /// already built geometry returns `Ok`.
    pub fn build_accel(&self) -> Result<(), AccelError> {
        let mut result = Ok(());
        self.accel.get_or_init(|| {
            let (accel, r) = self.create_accel();
            result = r;
            accel
        });
        result
    }

    fn create_accel(&self) -> (Box<dyn AccelerationStructure>, Result<(), AccelError>) {
        let n = self.primitives.num_primitives();
        // unbounded lists can only be scanned linearly
        let name = if self.primitives.world_bounds(None).is_none() {
            "null"
        } else {
            self.accel_type.as_str()
        };
        let mut accel = accel::create(name, n);
        let result = accel.build(self.primitives.clone());
        (accel, result)
    }
}

/// One placement of a [`Geometry`] in the world.
pub struct Instance {
    id: usize,
    geometry: Arc<Geometry>,
    object_to_world: Mat4,
    world_to_object: Mat4,
    bounds: Option<BoundingBox>,
}

impl Instance {
    /// Place `geometry` with the local-to-world transform `object_to_world`.
    ///
    /// `id` is the instance's index in the scene's instance table; it is
    /// what hits on this instance report in [`IntersectionState::instance`].
    pub fn new(id: usize, geometry: Arc<Geometry>, object_to_world: Mat4) -> SceneResult<Self> {
        let world_to_object = object_to_world
            .try_inverse()
            .ok_or(SceneError::SingularTransform)?;
        let bounds = geometry.world_bounds(Some(&object_to_world));
        Ok(Self {
            id,
            geometry,
            object_to_world,
            world_to_object,
            bounds,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub fn object_to_world(&self) -> &Mat4 {
        &self.object_to_world
    }

    pub fn world_to_object(&self) -> &Mat4 {
        &self.world_to_object
    }

    /// World-space bounds, `None` for unbounded geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn is_infinite(&self) -> bool {
        self.bounds.is_none()
    }

    /// Intersect the world-space `ray` with this instance.
    ///
    /// The ray is taken into local space and handed to the geometry's
    /// accelerator with this instance as the current one. Any hit found
    /// there clips the local ray, and the clip is carried back to `ray`.
    pub fn intersect(&self, ray: &mut Ray, state: &mut IntersectionState) {
        let mut local = ray.transform(&self.world_to_object);
        let parent = state.current.replace(self.id);
        self.geometry.accel().intersect(&mut local, state);
        state.current = parent;
        ray.set_max(local.max());
    }

    pub fn transform_world_to_object(&self, p: Vec3) -> Vec3 {
        self.world_to_object.transform_point3(p)
    }

    pub fn transform_object_to_world(&self, p: Vec3) -> Vec3 {
        self.object_to_world.transform_point3(p)
    }

    /// Local surface normal to world space, unnormalized.
    pub fn transform_normal_object_to_world(&self, n: Vec3) -> Vec3 {
        self.world_to_object.transpose().transform_vector3(n)
    }
}

/// Instances presented as the primitives of the top level.
#[derive(Default, Clone)]
pub struct InstanceList {
    instances: Vec<Arc<Instance>>,
}

impl InstanceList {
    pub fn new(instances: Vec<Arc<Instance>>) -> Self {
        Self { instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Arc<Instance>> {
        self.instances.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Instance>> {
        self.instances.iter()
    }

    /// Primitive count of the geometry behind instance `i`.
    pub fn num_primitives_of(&self, i: usize) -> usize {
        self.instances[i].geometry().num_primitives()
    }
}

impl PrimitiveList for InstanceList {
    fn num_primitives(&self) -> usize {
        self.instances.len()
    }

    fn primitive_bound(&self, id: usize, edge_index: usize) -> f32 {
        match self.instances[id].bounds() {
            Some(b) => b.edge(edge_index),
            None if edge_index & 1 == 0 => f32::NEG_INFINITY,
            None => f32::INFINITY,
        }
    }

    fn intersect_primitive(&self, ray: &mut Ray, id: usize, state: &mut IntersectionState) {
        self.instances[id].intersect(ray, state);
    }

    fn world_bounds(&self, local_to_world: Option<&Mat4>) -> Option<BoundingBox> {
        let mut bounds = BoundingBox::EMPTY;
        for instance in &self.instances {
            bounds.include_box(&instance.bounds()?);
        }
        Some(match local_to_world {
            Some(m) => m.transform_bounds(&bounds),
            None => bounds,
        })
    }
}
