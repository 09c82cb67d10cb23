use std::{cmp::Ordering, collections::BinaryHeap};

use glam::DVec3;
use rstar::{ParentNode, PointDistance, RTree, RTreeNode, RTreeObject, AABB};

use crate::voronoi::Generator;

pub(crate) fn build_rtree(generators: &[Generator]) -> RTree<Generator> {
    RTree::bulk_load(generators.to_vec())
}

/// Candidate neighbours of `loc` by increasing distance.
pub(crate) fn nn_iter<'a>(
    rtree: &'a RTree<Generator>,
    loc: DVec3,
) -> Box<dyn Iterator<Item = (usize, Option<DVec3>)> + 'a> {
    Box::new(rtree.nearest_neighbor_iter(&loc.to_array()).map(|g| (g.id(), None)))
}

/// Candidate neighbours of `loc` by increasing distance, including the
/// periodic images of all generators along the `periodic` axes. Images come
/// with the shift that maps the generator onto them.
pub(crate) fn wrapping_nn_iter<'a>(
    rtree: &'a RTree<Generator>,
    loc: DVec3,
    width: DVec3,
    periodic: [bool; 3],
) -> Box<dyn Iterator<Item = (usize, Option<DVec3>)> + 'a> {
    Box::new(PeriodicImages::new(rtree.root(), loc, width, periodic))
}

/// A subtree (or a single generator) of the R-tree, translated by `shift`,
/// together with its squared distance to the query point.
struct Candidate<'a> {
    node: &'a RTreeNode<Generator>,
    distance_2: f64,
    shift: DVec3,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, so the binary heap pops the closest candidate first
        other.distance_2.total_cmp(&self.distance_2)
    }
}

/// Best-first traversal of the R-tree and its periodic copies.
///
/// Every copy of the tree is translated by a multiple of the box width along
/// the periodic axes, so each generator is yielded once per image (3, 9 or 27
/// times).
struct PeriodicImages<'a> {
    heap: BinaryHeap<Candidate<'a>>,
    loc: DVec3,
}

impl<'a> PeriodicImages<'a> {
    fn new(root: &'a ParentNode<Generator>, loc: DVec3, width: DVec3, periodic: [bool; 3]) -> Self {
        let mut images = Self {
            heap: BinaryHeap::with_capacity(27 * root.children().len()),
            loc,
        };
        let offsets = |axis: usize| if periodic[axis] { -1..=1 } else { 0..=0 };
        for i in offsets(0) {
            for j in offsets(1) {
                for k in offsets(2) {
                    let shift = DVec3::new(i as f64, j as f64, k as f64) * width;
                    images.push_children(root.children(), shift);
                }
            }
        }
        images
    }

    fn push_children(&mut self, children: &'a [RTreeNode<Generator>], shift: DVec3) {
        // Translating the query point by `-shift` is the same as translating
        // the subtree by `shift`
        let query = (self.loc - shift).to_array();
        self.heap.extend(children.iter().map(|node| {
            let distance_2 = match node {
                RTreeNode::Parent(parent) => parent.envelope().distance_2(&query),
                RTreeNode::Leaf(generator) => generator.distance_2(&query),
            };
            Candidate {
                node,
                distance_2,
                shift,
            }
        }));
    }
}

impl Iterator for PeriodicImages<'_> {
    type Item = (usize, Option<DVec3>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Candidate { node, shift, .. }) = self.heap.pop() {
            match node {
                RTreeNode::Parent(parent) => self.push_children(parent.children(), shift),
                RTreeNode::Leaf(generator) => {
                    let shift = (shift != DVec3::ZERO).then_some(shift);
                    return Some((generator.id(), shift));
                }
            }
        }

        None
    }
}

impl RTreeObject for Generator {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.loc().to_array())
    }
}

impl PointDistance for Generator {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        self.loc().distance_squared(DVec3::from_array(*point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generators() -> Vec<Generator> {
        [
            DVec3::new(0.1, 0.5, 0.5),
            DVec3::new(0.4, 0.5, 0.5),
            DVec3::new(0.95, 0.5, 0.5),
        ]
        .into_iter()
        .enumerate()
        .map(|(id, loc)| Generator::new(id, loc))
        .collect()
    }

    #[test]
    fn test_nn_iter_sorted() {
        let generators = generators();
        let rtree = build_rtree(&generators);
        let ids: Vec<usize> = nn_iter(&rtree, generators[0].loc()).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_wrapping_nn_iter() {
        let generators = generators();
        let rtree = build_rtree(&generators);
        let mut candidates = wrapping_nn_iter(&rtree, generators[0].loc(), DVec3::ONE, [true, false, false]);

        assert_eq!(candidates.next(), Some((0, None)));
        // the image of generator 2 across the lower x boundary is closest
        let (id, shift) = candidates.next().unwrap();
        assert_eq!(id, 2);
        assert_eq!(shift, Some(DVec3::NEG_X));
        assert_eq!(candidates.next(), Some((1, None)));
        // only images along x exist: 3 copies of each generator
        assert_eq!(candidates.count(), 6);
    }

    #[test]
    fn test_wrapping_nn_iter_sorted() {
        let generators: Vec<Generator> = (0..50)
            .map(|i| {
                let t = i as f64 / 50.;
                Generator::new(i, DVec3::new(t, (7. * t).fract(), (13. * t).fract()))
            })
            .collect();
        let rtree = build_rtree(&generators);
        let loc = DVec3::new(0.05, 0.9, 0.5);
        let periodic = [true, true, false];

        let distances: Vec<f64> = wrapping_nn_iter(&rtree, loc, DVec3::ONE, periodic)
            .map(|(id, shift)| loc.distance_squared(generators[id].loc() + shift.unwrap_or(DVec3::ZERO)))
            .collect();
        assert_eq!(distances.len(), 9 * generators.len());
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1] + 1e-15));
    }
}
