//! Per-ray, per-worker intersection context.

/// Depth of one traversal stack. Two of them live back to back in every
/// [`IntersectionState`].
pub const MAX_STACK_SIZE: usize = 64;

/// Floats reserved for robust bounding-slab scratch math.
const ROBUST_STACK_SIZE: usize = 53 * 256;

/// Traversal stack entry for tree-based accelerators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StackNode {
    pub node: u32,
    pub near: f32,
    pub far: f32,
}

/// Records the closest hit found so far and carries the scratch space
/// accelerators need while traversing.
///
/// Each render worker owns one state and reuses it for every ray it traces;
/// [`IntersectionState::reset`] clears the hit between rays, nothing is ever
/// reallocated.
///
/// Instances are referred to by their id in the scene's instance table.
/// `current` is the instance being descended into and is set by the caller
/// before recursing; `instance` is the instance owning the recorded hit.
#[derive(Debug, Clone)]
pub struct IntersectionState {
    pub u: f32,
    pub v: f32,
    pub id: usize,
    pub instance: Option<usize>,
    pub current: Option<usize>,
    stack: Box<[StackNode]>,
    robust_stack: Box<[f32]>,
}

impl IntersectionState {
    /// Allocate both traversal stacks and the robust scratch array.
    pub fn new() -> Self {
        Self {
            u: 0.0,
            v: 0.0,
            id: 0,
            instance: None,
            current: None,
            stack: vec![StackNode::default(); MAX_STACK_SIZE * 2].into_boxed_slice(),
            robust_stack: vec![0.0; ROBUST_STACK_SIZE].into_boxed_slice(),
        }
    }

    /// Forget the recorded hit and the current instance. Called once per traced ray.
    #[inline]
    pub fn reset(&mut self) {
        self.instance = None;
        self.current = None;
    }

    /// First usable stack slot for the accelerator about to traverse.
    ///
    /// Top-level traversal (no current instance) uses the lower half, the
    /// instance-local traversal the upper half, so descending into an
    /// instance never clobbers the outer accelerator's pending entries.
    #[inline]
    pub fn stack_top(&self) -> usize {
        if self.current.is_none() {
            0
        } else {
            MAX_STACK_SIZE
        }
    }

    /// Stack entry at an absolute slot.
    #[inline]
    pub fn stack_node(&self, slot: usize) -> StackNode {
        self.stack[slot]
    }

    /// Overwrite the stack entry at an absolute slot.
    #[inline]
    pub fn set_stack_node(&mut self, slot: usize, node: StackNode) {
        self.stack[slot] = node;
    }

    /// Scratch floats for bounding-box based intersection code.
    pub fn robust_stack(&mut self) -> &mut [f32] {
        &mut self.robust_stack
    }

    /// True if a hit has been recorded since the last reset.
    #[inline]
    pub fn hit(&self) -> bool {
        self.instance.is_some()
    }

    /// Record a hit on primitive `id` of the current instance, at surface
    /// parameters `(u, v)`. The caller has already clipped the ray.
    #[inline]
    pub fn set_intersection(&mut self, id: usize, u: f32, v: f32) {
        self.instance = self.current;
        self.id = id;
        self.u = u;
        self.v = v;
    }
}

impl Default for IntersectionState {
    fn default() -> Self {
        Self::new()
    }
}
