use log::debug;

use super::math::{Aabb, Ray};
use super::object::{Hit, SMALL_T};
use super::world::SceneObject;

/// One intersectable unit of the scene: a whole object, or a single
/// sub-part of a composite one (one triangle of a mesh).
#[derive(Debug, Clone)]
pub struct Entry {
    pub object: usize,
    pub part: Option<usize>,
    pub bounds: Aabb,
}

#[derive(Debug)]
enum Node {
    Inner {
        bounds: Aabb,
        left: usize,
        right: usize,
    },
    Leaf {
        bounds: Aabb,
        start: usize,
        end: usize,
    },
}

/// Bounding volume tree over the flattened entry list. Built once before
/// rendering starts, read only afterwards; closest-hit queries descend the
/// tree pruning every box the ray cannot reach closer than the best hit so
/// far, and return exactly the hit a linear scan would.
pub struct Hierarchy {
    entries: Vec<Entry>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

// below this many entries a node stays a leaf
const LEAF_SIZE: usize = 4;

impl Hierarchy {
    /// Flatten the objects into entries, one per `(object, part)` pair.
    pub fn new(objects: &[SceneObject]) -> Hierarchy {
        let mut entries = Vec::new();
        for (index, object) in objects.iter().enumerate() {
            let parts = object.geometry.number_parts();
            if parts <= 1 {
                entries.push(Entry {
                    object: index,
                    part: None,
                    bounds: object.geometry.bounding_box(None),
                });
            } else {
                for part in 0..parts {
                    entries.push(Entry {
                        object: index,
                        part: Some(part),
                        bounds: object.geometry.bounding_box(Some(part)),
                    });
                }
            }
        }
        Hierarchy {
            entries,
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Sort the entries by box centroid along the widest axis of the scene,
    /// so contiguous ranges are spatially coherent before the tree is built.
    pub fn reorder_entries(&mut self) {
        let total = self
            .entries
            .iter()
            .fold(Aabb::empty(), |bounds, entry| bounds.union(&entry.bounds));
        if total.is_empty() {
            return;
        }
        let axis = total.largest_axis();
        self.entries.sort_by(|a, b| {
            a.bounds
                .center()
                .axis(axis)
                .total_cmp(&b.bounds.center().axis(axis))
        });
    }

    /// Organize the entries into the tree by recursive median splits; each
    /// range is re-sorted along its own widest axis before splitting.
    pub fn build_tree(&mut self) {
        self.nodes.clear();
        if self.entries.is_empty() {
            self.root = None;
            return;
        }
        let root = self.build_range(0, self.entries.len());
        self.root = Some(root);
        debug!(
            "hierarchy: {} entries organized into {} nodes",
            self.entries.len(),
            self.nodes.len()
        );
    }

    fn build_range(&mut self, start: usize, end: usize) -> usize {
        let bounds = self.entries[start..end]
            .iter()
            .fold(Aabb::empty(), |bounds, entry| bounds.union(&entry.bounds));
        if end - start <= LEAF_SIZE {
            self.nodes.push(Node::Leaf { bounds, start, end });
        } else {
            let axis = bounds.largest_axis();
            self.entries[start..end].sort_by(|a, b| {
                a.bounds
                    .center()
                    .axis(axis)
                    .total_cmp(&b.bounds.center().axis(axis))
            });
            let middle = start + (end - start) / 2;
            let left = self.build_range(start, middle);
            let right = self.build_range(middle, end);
            self.nodes.push(Node::Inner {
                bounds,
                left,
                right,
            });
        }
        self.nodes.len() - 1
    }

    /// Closest hit of the ray against every entry reachable through the
    /// tree. Identical to the linear scan over the objects.
    pub fn closest_intersection(&self, objects: &[SceneObject], ray: &Ray) -> Option<Hit> {
        let root = self.root?;
        let mut closest: Option<Hit> = None;
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            let node_bounds = match &self.nodes[index] {
                Node::Inner { bounds, .. } => bounds,
                Node::Leaf { bounds, .. } => bounds,
            };
            // skip the whole subtree when its box cannot contain anything
            // nearer than the best hit found so far
            match node_bounds.intersect_ray(ray) {
                None => continue,
                Some(entry_t) => {
                    if let Some(hit) = closest {
                        if entry_t >= hit.dist {
                            continue;
                        }
                    }
                }
            }
            match &self.nodes[index] {
                Node::Inner { left, right, .. } => {
                    stack.push(*left);
                    stack.push(*right);
                }
                Node::Leaf { start, end, .. } => {
                    for entry in &self.entries[*start..*end] {
                        let Some(entry_t) = entry.bounds.intersect_ray(ray) else {
                            continue;
                        };
                        if let Some(hit) = closest {
                            if entry_t >= hit.dist {
                                continue;
                            }
                        }
                        let Some(intersection) =
                            objects[entry.object].geometry.intersect(ray, entry.part)
                        else {
                            continue;
                        };
                        if intersection.dist <= SMALL_T {
                            continue;
                        }
                        if closest.map_or(true, |hit| intersection.dist < hit.dist) {
                            closest = Some(Hit {
                                object: entry.object,
                                dist: intersection.dist,
                                part: intersection.part,
                            });
                        }
                    }
                }
            }
        }
        closest
    }
}
