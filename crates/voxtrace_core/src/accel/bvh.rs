//! Bounding volume hierarchy over a primitive list.
//!
//! Median split on the longest centroid axis, flattened into a node array.
//! Traversal is iterative and keeps its pending nodes in the
//! [`IntersectionState`] stack, so nested instance traversal stays
//! allocation free.

use crate::{
    primitive::primitive_bounds, AccelError, AccelerationStructure, IntersectionState,
    PrimitiveList, StackNode, MAX_STACK_SIZE,
};
use std::sync::Arc;
use std::time::Instant;
use voxtrace_math::{BoundingBox, Ray, Vec3};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Depth at which splitting stops. Each level pushes at most one pending
/// node, so this keeps traversal inside one half of the state stack.
const MAX_DEPTH: usize = MAX_STACK_SIZE - 1;

#[derive(Debug, Clone)]
enum BvhNode {
    Branch { bbox: BoundingBox, left: u32, right: u32 },
    Leaf { bbox: BoundingBox, start: u32, count: u32 },
}

impl BvhNode {
    fn bbox(&self) -> &BoundingBox {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

struct BuildItem {
    id: u32,
    bounds: BoundingBox,
    centroid: Vec3,
}

/// Binary tree accelerator, preferred for very large primitive counts.
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Primitive ids in leaf order
    ids: Vec<u32>,
    /// Primitives with non-finite bounds, tested on every ray
    unplaced: Vec<u32>,
    primitives: Option<Arc<dyn PrimitiveList>>,
    depth: usize,
}

impl Bvh {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            ids: Vec::new(),
            unplaced: Vec::new(),
            primitives: None,
            depth: 0,
        }
    }

    /// Number of nodes in the flattened tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of primitives kept outside the tree.
    pub fn unplaced_count(&self) -> usize {
        self.unplaced.len()
    }

    /// Deepest leaf level, the root being level 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Recursive construction; returns the index of the created node.
    fn build_node(&mut self, items: &mut [BuildItem], depth: usize) -> u32 {
        self.depth = self.depth.max(depth);
        let bbox = items
            .iter()
            .fold(BoundingBox::EMPTY, |acc, item| {
                BoundingBox::surrounding(&acc, &item.bounds)
            });
        let index = self.nodes.len() as u32;

        if items.len() <= LEAF_MAX_SIZE || depth >= MAX_DEPTH {
            let start = self.ids.len() as u32;
            self.ids.extend(items.iter().map(|item| item.id));
            self.nodes.push(BvhNode::Leaf {
                bbox,
                start,
                count: items.len() as u32,
            });
            return index;
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = items.iter().fold(BoundingBox::EMPTY, |mut acc, item| {
            acc.include_point(item.centroid);
            acc
        });
        let axis = centroid_bounds.longest_axis();
        items.sort_unstable_by(|a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Reserve the slot, children are patched in after recursion
        self.nodes.push(BvhNode::Leaf {
            bbox,
            start: 0,
            count: 0,
        });
        let mid = items.len() / 2;
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = self.build_node(left_items, depth + 1);
        let right = self.build_node(right_items, depth + 1);
        self.nodes[index as usize] = BvhNode::Branch { bbox, left, right };
        index
    }
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelerationStructure for Bvh {
    fn build(&mut self, primitives: Arc<dyn PrimitiveList>) -> Result<(), AccelError> {
        let start = Instant::now();
        *self = Self::new();

        let n = primitives.num_primitives();
        if n == 0 {
            return Err(AccelError::EmptyPrimitiveList);
        }
        if primitives.world_bounds(None).is_none() {
            return Err(AccelError::UnboundedPrimitiveList);
        }

        let mut items = Vec::with_capacity(n);
        for id in 0..n {
            let bounds = primitive_bounds(primitives.as_ref(), id);
            if bounds.is_finite() && !bounds.is_empty() {
                items.push(BuildItem {
                    id: id as u32,
                    bounds,
                    centroid: bounds.center(),
                });
            } else {
                self.unplaced.push(id as u32);
            }
        }
        if !self.unplaced.is_empty() {
            log::warn!(
                "BVH: {} of {} primitives have non-finite bounds, testing them on every ray",
                self.unplaced.len(),
                n
            );
        }
        if !items.is_empty() {
            self.nodes.reserve(2 * items.len() / LEAF_MAX_SIZE + 1);
            self.ids.reserve(items.len());
            self.build_node(&mut items, 0);
        }
        self.primitives = Some(primitives);

        log::debug!(
            "BVH: {} primitives, {} nodes, depth {}, built in {:?}",
            n,
            self.nodes.len(),
            self.depth,
            start.elapsed()
        );
        Ok(())
    }

    fn intersect(&self, ray: &mut Ray, state: &mut IntersectionState) {
        let Some(primitives) = self.primitives.as_deref() else {
            return;
        };
        for &id in &self.unplaced {
            primitives.intersect_primitive(ray, id as usize, state);
        }
        let Some(root) = self.nodes.first() else {
            return;
        };
        if root.bbox().intersect_ray(ray).is_none() {
            return;
        }

        let base = state.stack_top();
        let mut top = base;
        let mut node = 0u32;
        'traverse: loop {
            match &self.nodes[node as usize] {
                BvhNode::Branch { left, right, .. } => {
                    let l = self.nodes[*left as usize].bbox().intersect_ray(ray);
                    let r = self.nodes[*right as usize].bbox().intersect_ray(ray);
                    match (l, r) {
                        (Some(ls), Some(rs)) => {
                            // visit the nearer child first, defer the other
                            let (near, far, far_span) = if ls.min <= rs.min {
                                (*left, *right, rs)
                            } else {
                                (*right, *left, ls)
                            };
                            state.set_stack_node(
                                top,
                                StackNode {
                                    node: far,
                                    near: far_span.min,
                                    far: far_span.max,
                                },
                            );
                            top += 1;
                            node = near;
                            continue 'traverse;
                        }
                        (Some(_), None) => {
                            node = *left;
                            continue 'traverse;
                        }
                        (None, Some(_)) => {
                            node = *right;
                            continue 'traverse;
                        }
                        (None, None) => {}
                    }
                }
                BvhNode::Leaf { start, count, .. } => {
                    let start = *start as usize;
                    for &id in &self.ids[start..start + *count as usize] {
                        primitives.intersect_primitive(ray, id as usize, state);
                    }
                }
            }

            // pop the next pending node still in front of the closest hit
            loop {
                if top == base {
                    return;
                }
                top -= 1;
                let pending = state.stack_node(top);
                if pending.near <= ray.max() {
                    node = pending.node;
                    continue 'traverse;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "bvh"
    }
}
