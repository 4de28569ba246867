//! Coordinate arithmetic and routing on a D-dimensional torus.

use crate::TopologyError;
use serde::{Deserialize, Serialize};
use topostress_types::NodeIndex;

/// A regular torus of `extent^dimensions` nodes.
///
/// Linear indices decompose into coordinates by mixed-radix division with
/// base `extent` on every axis, axis 0 varying fastest:
///
/// ```text
/// index = x0 + x1 * S + x2 * S^2 + ...
/// ```
///
/// All coordinate arithmetic wraps modulo `extent`; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorusGrid {
    dimensions: u32,
    extent: u32,
    order: u32,
    node_count: u32,
}

impl TorusGrid {
    /// Create a torus, validating its shape.
    ///
    /// `order` is how many hops along one axis still count as adjacent.
    pub fn new(dimensions: u32, extent: u32, order: u32) -> Result<Self, TopologyError> {
        if dimensions == 0 {
            return Err(TopologyError::ZeroDimensions);
        }
        if extent == 0 {
            return Err(TopologyError::ZeroExtent);
        }
        if extent == 1 {
            return Err(TopologyError::DegenerateGrid);
        }
        if order == 0 {
            return Err(TopologyError::ZeroOrder);
        }
        let node_count = extent
            .checked_pow(dimensions)
            .ok_or(TopologyError::GridTooLarge { dimensions, extent })?;

        Ok(Self {
            dimensions,
            extent,
            order,
            node_count,
        })
    }

    /// Number of axes.
    pub fn dimensions(&self) -> u32 {
        self.dimensions
    }

    /// Nodes per axis.
    pub fn extent(&self) -> u32 {
        self.extent
    }

    /// Hops per axis considered adjacent.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Total number of nodes, `extent^dimensions`.
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    /// Whether `index` lies on this torus.
    pub fn contains(&self, index: NodeIndex) -> bool {
        index.0 < self.node_count
    }

    /// Decompose a linear index into one coordinate per axis.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not on the torus.
    pub fn coordinates_of(&self, index: NodeIndex) -> Vec<u32> {
        assert!(
            self.contains(index),
            "{index} is outside a torus of {} nodes",
            self.node_count
        );
        let mut rest = index.0;
        (0..self.dimensions)
            .map(|_| {
                let coordinate = rest % self.extent;
                rest /= self.extent;
                coordinate
            })
            .collect()
    }

    /// Re-linearize coordinates into an index.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate count differs from the dimension count or a
    /// coordinate is out of range.
    pub fn index_of(&self, coordinates: &[u32]) -> NodeIndex {
        assert_eq!(
            coordinates.len(),
            self.dimensions as usize,
            "coordinate count must match grid dimensions"
        );
        let index = coordinates.iter().rev().fold(0u32, |acc, &coordinate| {
            assert!(
                coordinate < self.extent,
                "coordinate {coordinate} outside extent {}",
                self.extent
            );
            acc * self.extent + coordinate
        });
        NodeIndex(index)
    }

    /// The node reached by moving `direction` steps along `axis`, wrapping
    /// around. Other axes are unchanged.
    pub fn neighbor_index(&self, index: NodeIndex, axis: u32, direction: i64) -> NodeIndex {
        assert!(
            axis < self.dimensions,
            "axis {axis} outside a {}-dimensional grid",
            self.dimensions
        );
        let mut coordinates = self.coordinates_of(index);
        let slot = &mut coordinates[axis as usize];
        *slot = (i64::from(*slot) + direction).rem_euclid(i64::from(self.extent)) as u32;
        self.index_of(&coordinates)
    }

    /// Adjacency of `index`: for each axis, hops `1..=order` in the `+` then
    /// `-` direction. Duplicates (small extents wrap onto the same node) and
    /// the node itself are dropped.
    pub fn neighbors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        // Hops past half the extent only revisit nodes already reached.
        let max_hop = self.order.min(self.extent / 2);
        let mut neighbors = Vec::with_capacity(2 * self.dimensions as usize * max_hop as usize);
        for axis in 0..self.dimensions {
            for hop in 1..=i64::from(max_hop) {
                for direction in [hop, -hop] {
                    let neighbor = self.neighbor_index(index, axis, direction);
                    if neighbor != index && !neighbors.contains(&neighbor) {
                        neighbors.push(neighbor);
                    }
                }
            }
        }
        neighbors
    }

    /// Shorter way round from `from` to `to` on one axis: hop count and
    /// direction, `+1` when both ways are equally long. `None` when the
    /// coordinates coincide.
    fn axis_route(&self, from: u32, to: u32) -> Option<(u32, i64)> {
        let extent = u64::from(self.extent);
        let forward = (u64::from(to) + extent - u64::from(from)) % extent;
        if forward == 0 {
            return None;
        }
        let backward = extent - forward;
        // Both are below `extent`, so they fit back into u32.
        Some(if forward <= backward {
            (forward as u32, 1)
        } else {
            (backward as u32, -1)
        })
    }

    /// Sum of per-axis torus distances: the hop count of a greedy route.
    pub fn distance(&self, from: NodeIndex, to: NodeIndex) -> u64 {
        self.coordinates_of(from)
            .into_iter()
            .zip(self.coordinates_of(to))
            .map(|(a, b)| self.axis_route(a, b).map_or(0, |(hops, _)| u64::from(hops)))
            .sum()
    }

    /// Next hop of a greedy dimension-order route, or `None` when `current`
    /// already is the destination.
    ///
    /// Steps one hop along the axis with the largest remaining torus distance
    /// (lowest axis on ties), in the shorter wrap direction (`+1` when both
    /// ways are equally long). Every hop lowers [`distance`](Self::distance)
    /// by exactly one.
    pub fn route_hop(&self, current: NodeIndex, destination: NodeIndex) -> Option<NodeIndex> {
        let from = self.coordinates_of(current);
        let to = self.coordinates_of(destination);

        let mut best: Option<(u32, u32, i64)> = None;
        for (axis, (&a, &b)) in from.iter().zip(&to).enumerate() {
            let Some((distance, step)) = self.axis_route(a, b) else {
                continue;
            };
            if best.map_or(true, |(_, longest, _)| distance > longest) {
                best = Some((axis as u32, distance, step));
            }
        }

        best.map(|(axis, _, step)| self.neighbor_index(current, axis, step))
    }

    /// Full greedy route from `from` to `to`, excluding `from` and including
    /// `to`.
    pub fn route(&self, from: NodeIndex, to: NodeIndex) -> Vec<NodeIndex> {
        let mut path = Vec::new();
        let mut current = from;
        while let Some(next) = self.route_hop(current, to) {
            path.push(next);
            current = next;
        }
        path
    }
}
