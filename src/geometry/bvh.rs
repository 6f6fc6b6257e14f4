//! Binary bounding volume hierarchy (spec §4.1), grounded on
//! `original_source/src/painter/shapes/object_bvh.h`'s delegation to a
//! generic `geometry::Bvh<N,T>` (itself outside the retrieved source
//! pack) through exactly the two callback shapes the core is documented
//! to use: `intersect(ray, max_distance, leaf_callback)` and its
//! `intersect_any` bool-returning sibling (spec §9 "Callback-driven BVH
//! traversal").
//!
//! Construction is a deterministic top-down surface-area-heuristic (SAH)
//! split, bucketed along the bounding box's longest axis, matching the
//! "deterministic top-down construction using surface-area heuristic"
//! requirement of spec §4.1. Leaf construction stops once a node holds at
//! most `LEAF_SIZE` objects or a split fails to reduce the SAH cost.

use crate::math::{BoundingBox, Ray};
use num_traits::Float;

const LEAF_SIZE: usize = 4;
const SAH_BUCKETS: usize = 12;

/// One entry fed to the builder: its bounding box, a relative
/// intersection-cost estimate (from `Shape::intersection_cost`), and the
/// caller's own index for that object.
#[derive(Debug, Clone, Copy)]
pub struct BvhObject<const N: usize, T> {
    pub bounds: BoundingBox<N, T>,
    pub cost: T,
    pub index: usize,
}

enum Node<const N: usize, T> {
    Leaf {
        bounds: BoundingBox<N, T>,
        indices: Vec<usize>,
    },
    Inner {
        bounds: BoundingBox<N, T>,
        left: Box<Node<N, T>>,
        right: Box<Node<N, T>>,
    },
}

pub struct Bvh<const N: usize, T> {
    root: Option<Node<N, T>>,
}

impl<const N: usize, T: Float + Send + Sync> Bvh<N, T> {
    pub fn build(objects: Vec<BvhObject<N, T>>) -> Self {
        if objects.is_empty() {
            return Bvh { root: None };
        }
        Bvh {
            root: Some(build_node(objects)),
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox<N, T>> {
        self.root.as_ref().map(node_bounds)
    }

    /// Traverses in near-first order, pruning by AABB distance. At each
    /// leaf, `leaf_callback(indices, current_max_distance)` is invoked;
    /// its `Some((distance, hit))` result tightens the running max
    /// distance. Never inspects objects directly — only through the
    /// callback, so the scene can run its own bounding-then-exact
    /// min-heap logic inside each leaf (spec §4.5 step 3).
    pub fn intersect<Hit>(
        &self,
        ray: &Ray<N, T>,
        max_distance: T,
        mut leaf_callback: impl FnMut(&[usize], T) -> Option<(T, Hit)>,
    ) -> Option<(T, Hit)> {
        let root = self.root.as_ref()?;
        let mut best: Option<(T, Hit)> = None;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let current_max = best.as_ref().map_or(max_distance, |(d, _)| *d);
            let bounds = node_bounds(node);
            if bounds.intersect(&ray.with_max_distance(current_max)).is_none() {
                continue;
            }
            match node {
                Node::Leaf { indices, .. } => {
                    if let Some((d, hit)) = leaf_callback(indices, current_max) {
                        best = Some((d, hit));
                    }
                }
                Node::Inner { left, right, .. } => {
                    // Near-first ordering is approximated by testing
                    // both children's entry distance and visiting the
                    // closer one last (since this is a stack, LIFO).
                    let dl = left_entry_distance(left, ray, current_max);
                    let dr = left_entry_distance(right, ray, current_max);
                    match (dl, dr) {
                        (Some(a), Some(b)) if a <= b => {
                            stack.push(right);
                            stack.push(left);
                        }
                        (Some(_), Some(_)) => {
                            stack.push(left);
                            stack.push(right);
                        }
                        (Some(_), None) => stack.push(left),
                        (None, Some(_)) => stack.push(right),
                        (None, None) => {}
                    }
                }
            }
        }
        best
    }

    /// `intersect_any` variant: `leaf_callback` returns `bool`; traversal
    /// short-circuits on the first `true` (spec §4.1).
    pub fn intersect_any(
        &self,
        ray: &Ray<N, T>,
        max_distance: T,
        mut leaf_callback: impl FnMut(&[usize]) -> bool,
    ) -> bool {
        let Some(root) = self.root.as_ref() else {
            return false;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let bounds = node_bounds(node);
            if bounds.intersect(&ray.with_max_distance(max_distance)).is_none() {
                continue;
            }
            match node {
                Node::Leaf { indices, .. } => {
                    if leaf_callback(indices) {
                        return true;
                    }
                }
                Node::Inner { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        false
    }
}

fn node_bounds<const N: usize, T: Float>(node: &Node<N, T>) -> BoundingBox<N, T> {
    match node {
        Node::Leaf { bounds, .. } => *bounds,
        Node::Inner { bounds, .. } => *bounds,
    }
}

fn left_entry_distance<const N: usize, T: Float>(
    node: &Node<N, T>,
    ray: &Ray<N, T>,
    max_distance: T,
) -> Option<T> {
    node_bounds(node)
        .intersect(&ray.with_max_distance(max_distance))
        .map(|(t0, _)| t0)
}

fn build_node<const N: usize, T: Float + Send + Sync>(mut objects: Vec<BvhObject<N, T>>) -> Node<N, T> {
    let bounds = objects
        .iter()
        .fold(BoundingBox::empty(), |b, o| b.union(&o.bounds));

    if objects.len() <= LEAF_SIZE {
        return Node::Leaf {
            bounds,
            indices: objects.into_iter().map(|o| o.index).collect(),
        };
    }

    let axis = bounds.longest_axis();
    objects.sort_by(|a, b| {
        let ca = a.bounds.center().components[axis];
        let cb = b.bounds.center().components[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let split = sah_split(&objects, axis, &bounds);

    match split {
        Some(mid) if mid > 0 && mid < objects.len() => {
            let right_objs = objects.split_off(mid);
            let left_objs = objects;
            let (left, right) = rayon_or_sequential_build(left_objs, right_objs);
            Node::Inner {
                bounds,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        _ => Node::Leaf {
            bounds,
            indices: objects.into_iter().map(|o| o.index).collect(),
        },
    }
}

#[cfg(feature = "threads")]
fn rayon_or_sequential_build<const N: usize, T: Float + Send + Sync>(
    left: Vec<BvhObject<N, T>>,
    right: Vec<BvhObject<N, T>>,
) -> (Node<N, T>, Node<N, T>) {
    rayon::join(|| build_node(left), || build_node(right))
}

#[cfg(not(feature = "threads"))]
fn rayon_or_sequential_build<const N: usize, T: Float + Send + Sync>(
    left: Vec<BvhObject<N, T>>,
    right: Vec<BvhObject<N, T>>,
) -> (Node<N, T>, Node<N, T>) {
    (build_node(left), build_node(right))
}

/// Bucketed SAH evaluation along `axis`: partitions `objects` (already
/// sorted by centroid on that axis) into `SAH_BUCKETS` buckets, evaluates
/// the cost of every bucket boundary as a candidate split, and returns
/// the object-count offset of the cheapest split, or `None` if the
/// cheapest split is not better than keeping the node as one leaf.
fn sah_split<const N: usize, T: Float>(
    objects: &[BvhObject<N, T>],
    axis: usize,
    bounds: &BoundingBox<N, T>,
) -> Option<usize> {
    let n = objects.len();
    let min_c = bounds.min.components[axis];
    let max_c = bounds.max.components[axis];
    let extent = max_c - min_c;
    if extent <= T::zero() {
        return Some(n / 2);
    }

    let bucket_of = |c: T| -> usize {
        let f = (c - min_c) / extent;
        let b = (f * T::from(SAH_BUCKETS).unwrap()).to_usize().unwrap_or(0);
        b.min(SAH_BUCKETS - 1)
    };

    let mut bucket_count = [0usize; SAH_BUCKETS];
    let mut bucket_bounds: Vec<Option<BoundingBox<N, T>>> = vec![None; SAH_BUCKETS];
    let mut bucket_cost = [T::zero(); SAH_BUCKETS];
    for o in objects {
        let b = bucket_of(o.bounds.center().components[axis]);
        bucket_count[b] += 1;
        bucket_cost[b] = bucket_cost[b] + o.cost;
        bucket_bounds[b] = Some(match bucket_bounds[b] {
            Some(existing) => existing.union(&o.bounds),
            None => o.bounds,
        });
    }

    let whole_cost: T = bucket_cost.iter().fold(T::zero(), |a, &b| a + b);
    let whole_surface = bounds.surface();

    let mut best_cost = whole_cost;
    let mut best_split = n / 2;
    let mut left_count = 0usize;
    let mut left_bounds: Option<BoundingBox<N, T>> = None;
    let mut left_cost = T::zero();

    for split in 0..SAH_BUCKETS - 1 {
        left_count += bucket_count[split];
        left_cost = left_cost + bucket_cost[split];
        if let Some(lb) = bucket_bounds[split] {
            left_bounds = Some(match left_bounds {
                Some(existing) => existing.union(&lb),
                None => lb,
            });
        }
        if left_count == 0 || left_count == n {
            continue;
        }
        let right_count = n - left_count;
        let right_cost = whole_cost - left_cost;
        let left_surface = left_bounds.map_or(T::zero(), |b| b.surface());
        // Remaining buckets' union approximates the right bounds; a full
        // re-scan per split is unnecessary for this heuristic's purpose.
        let right_bounds = bucket_bounds[split + 1..]
            .iter()
            .flatten()
            .fold(None::<BoundingBox<N, T>>, |acc, b| {
                Some(match acc {
                    Some(a) => a.union(b),
                    None => *b,
                })
            });
        let right_surface = right_bounds.map_or(T::zero(), |b| b.surface());

        let cost = T::from(0.125).unwrap()
            + (left_surface * left_cost * T::from(left_count as f64).unwrap()
                + right_surface * right_cost * T::from(right_count as f64).unwrap())
                / whole_surface.max(T::epsilon());

        if cost < best_cost {
            best_cost = cost;
            best_split = left_count;
        }
    }

    if best_split == 0 || best_split == n {
        None
    } else {
        Some(best_split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector;

    fn v(c: [f64; 3]) -> Vector<3, f64> {
        Vector { components: c }
    }

    fn unit_box(center: f64) -> BoundingBox<3, f64> {
        BoundingBox::new(v([center - 0.1, -0.1, -0.1]), v([center + 0.1, 0.1, 0.1]))
    }

    #[test]
    fn finds_nearest_of_many_boxes() {
        let objects: Vec<_> = (0..50)
            .map(|i| BvhObject {
                bounds: unit_box(i as f64 * 2.0),
                cost: 1.0,
                index: i,
            })
            .collect();
        let bvh = Bvh::build(objects);

        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        let hit = bvh.intersect(&ray, f64::INFINITY, |indices, current_max| {
            indices
                .iter()
                .filter_map(|&i| {
                    let d = i as f64 * 2.0 - 0.1 - ray.origin.components[0];
                    (d > 0.0 && d < current_max).then_some((d, i))
                })
                .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
        });
        assert_eq!(hit.map(|(_, i)| i), Some(0));
    }

    #[test]
    fn intersect_any_short_circuits() {
        let objects: Vec<_> = (0..20)
            .map(|i| BvhObject {
                bounds: unit_box(i as f64 * 2.0),
                cost: 1.0,
                index: i,
            })
            .collect();
        let bvh = Bvh::build(objects);
        let ray = Ray::new(v([-5.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        assert!(bvh.intersect_any(&ray, f64::INFINITY, |indices| !indices.is_empty()));
    }

    #[test]
    fn empty_bvh_has_no_hits() {
        let bvh: Bvh<3, f64> = Bvh::build(vec![]);
        let ray = Ray::new(v([0.0, 0.0, 0.0]), v([1.0, 0.0, 0.0]), f64::INFINITY);
        assert!(bvh
            .intersect(&ray, f64::INFINITY, |_, _| Some((1.0, ())))
            .is_none());
    }
}
