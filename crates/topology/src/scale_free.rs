//! Barabasi-Albert preferential-attachment generator.

use crate::graph::{self, node, Graph};
use rand::Rng;
use topostress_types::NodeIndex;

/// Bounds on a single attachment weight: `degree^a` stays summable for large
/// exponents and never underflows to zero for very negative ones.
const MAX_WEIGHT: f64 = 1e200;
const MIN_WEIGHT: f64 = 1e-200;

/// Neighbor lists of a scale-free graph, see [`build`], in ascending index
/// order.
pub(crate) fn generate(
    node_count: usize,
    m: usize,
    a: f64,
    rng: &mut impl Rng,
) -> Vec<Vec<NodeIndex>> {
    let graph = build(node_count, m, a, rng);
    (0..node_count)
        .map(|i| {
            let mut neighbors: Vec<usize> = graph::neighbors(&graph, i).collect();
            neighbors.sort_unstable();
            neighbors.into_iter().map(|n| NodeIndex(n as u32)).collect()
        })
        .collect()
}

/// Grow a graph of `node_count` nodes: a clique over nodes `0..=m`, then each
/// later node attaches to `m` distinct earlier nodes picked with probability
/// proportional to `degree^a`.
///
/// Weights are accumulated in insertion order, so when a draw lands on a
/// boundary the earlier node wins. Every new node attaches to the existing
/// component, so the result is connected.
///
/// Callers validate `0 < m < node_count` and a finite `a`.
pub(crate) fn build(node_count: usize, m: usize, a: f64, rng: &mut impl Rng) -> Graph {
    let weight = |degree: usize| (degree as f64).powf(a).clamp(MIN_WEIGHT, MAX_WEIGHT);

    let mut graph = graph::with_nodes(node_count, m * (m + 1) / 2 + (node_count - m - 1) * m);
    // Tracked alongside the graph: counting petgraph neighbors walks the
    // whole edge list of a hub.
    let mut degrees = vec![0usize; node_count];
    for i in 0..=m {
        for j in (i + 1)..=m {
            graph.add_edge(node(i), node(j), ());
        }
        degrees[i] = m;
    }

    let mut weights = WeightTree::new(node_count);
    for (i, &degree) in degrees.iter().enumerate().take(m + 1) {
        weights.set(i, weight(degree));
    }

    let mut targets = Vec::with_capacity(m);
    for new_node in (m + 1)..node_count {
        // Sample without replacement: zero a target's weight once picked.
        targets.clear();
        for _ in 0..m {
            let target = weights.sample(rng, new_node);
            weights.set(target, 0.0);
            targets.push(target);
        }

        for &target in &targets {
            graph.add_edge(node(new_node), node(target), ());
            degrees[target] += 1;
            weights.set(target, weight(degrees[target]));
        }
        degrees[new_node] = m;
        weights.set(new_node, weight(m));
    }

    graph
}

/// Fenwick tree over attachment weights: O(log n) update and weighted
/// sampling.
struct WeightTree {
    tree: Vec<f64>,
    values: Vec<f64>,
}

impl WeightTree {
    fn new(len: usize) -> Self {
        Self {
            tree: vec![0.0; len + 1],
            values: vec![0.0; len],
        }
    }

    fn set(&mut self, index: usize, value: f64) {
        let delta = value - self.values[index];
        self.values[index] = value;
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    fn total(&self) -> f64 {
        let mut sum = 0.0;
        let mut i = self.tree.len() - 1;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }

    /// First index whose running sum exceeds `target`.
    fn find(&self, mut target: f64) -> usize {
        let mut position = 0;
        let mut step = (self.tree.len() - 1).next_power_of_two();
        while step > 0 {
            let next = position + step;
            if next < self.tree.len() && self.tree[next] <= target {
                position = next;
                target -= self.tree[next];
            }
            step >>= 1;
        }
        position
    }

    /// Draw an index in `0..limit` with probability proportional to its
    /// weight. Indices at or past `limit` must carry zero weight.
    fn sample(&self, rng: &mut impl Rng, limit: usize) -> usize {
        let total = self.total();
        let index = if total > 0.0 {
            self.find(rng.gen::<f64>() * total)
        } else {
            limit
        };
        if index < limit && self.values[index] > 0.0 {
            return index;
        }
        // Float drift put the draw on a zero-weight slot; take the nearest
        // earlier live slot, falling back to the first live one.
        let upper = index.min(limit);
        (0..upper)
            .rev()
            .chain(upper..limit)
            .find(|&i| self.values[i] > 0.0)
            .expect("preferential attachment ran out of candidates")
    }
}
