//! Concrete primitive lists.
//!
//! Each kind implements [`crate::PrimitiveList`] so it can be placed in any
//! accelerator, either directly or behind an instance.

mod boxes;
mod hair;
mod particles;
mod plane;
mod torus;
mod triangle_mesh;

pub use boxes::BoxList;
pub use hair::{Hair, HairWidths};
pub use particles::ParticleSurface;
pub use plane::Plane;
pub use torus::Torus;
pub use triangle_mesh::TriangleMesh;
