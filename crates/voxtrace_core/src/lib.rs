//! voxtrace core - spatial acceleration and two-level ray intersection.
//!
//! This crate provides:
//!
//! - **Primitive lists**: the [`PrimitiveList`] capability every geometry kind
//!   implements (count, per-primitive bounds, exact intersection)
//! - **Accelerators**: [`UniformGrid`], [`Bvh`] and [`NullAccelerator`] behind
//!   the [`AccelerationStructure`] trait, plus the [`accel::create`] factory
//! - **Instancing**: [`Geometry`] shared by many [`Instance`]s, and the
//!   [`InstanceList`] the top-level accelerator is built over
//! - **Scene**: [`Scene::trace`] tying the two levels together
//!
//! # Example
//!
//! ```ignore
//! let cube = Arc::new(Geometry::new(Arc::new(BoxList::unit_cube())));
//! let mut scene = Scene::new();
//! scene.add_instance(cube, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)))?;
//! scene.build()?;
//!
//! let mut state = IntersectionState::new();
//! let mut ray = Ray::new(Vec3::new(10.0, 0.0, 5.0), Vec3::NEG_Z);
//! scene.trace(&mut ray, &mut state);
//! assert!(state.hit());
//! ```

pub mod accel;
pub mod error;
pub mod instance;
pub mod primitive;
pub mod primitives;
pub mod scene;
pub mod state;

// Re-export commonly used types
pub use accel::{AccelerationStructure, Bvh, GridStats, NullAccelerator, UniformGrid};
pub use error::{AccelError, SceneError};
pub use instance::{Geometry, Instance, InstanceList};
pub use primitive::PrimitiveList;
pub use primitives::{BoxList, Hair, HairWidths, ParticleSurface, Plane, Torus, TriangleMesh};
pub use scene::{Scene, SceneStats};
pub use state::{IntersectionState, StackNode, MAX_STACK_SIZE};

/// Re-export the math types the public API is expressed in
pub use voxtrace_math::{BoundingBox, Interval, Mat4, Ray, Vec3};
