use crate::{AccelError, AccelerationStructure, IntersectionState, PrimitiveList};
use std::sync::Arc;
use voxtrace_math::Ray;

/// No acceleration: every primitive is tested for every ray.
///
/// The right choice for a handful of primitives, where any structure costs
/// more than it saves.
#[derive(Default)]
pub struct NullAccelerator {
    primitives: Option<Arc<dyn PrimitiveList>>,
}

impl NullAccelerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccelerationStructure for NullAccelerator {
    fn build(&mut self, primitives: Arc<dyn PrimitiveList>) -> Result<(), AccelError> {
        self.primitives = Some(primitives);
        Ok(())
    }

    fn intersect(&self, ray: &mut Ray, state: &mut IntersectionState) {
        let Some(primitives) = &self.primitives else {
            return;
        };
        for id in 0..primitives.num_primitives() {
            primitives.intersect_primitive(ray, id, state);
        }
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
