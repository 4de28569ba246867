//! Topology construction for topostress.
//!
//! A [`Topology`] assigns every logical process an ordered, non-empty
//! neighbor list. It is built once by [`TopologyBuilder`] from one of three
//! models and is read-only afterwards, so it can be shared behind an `Arc`
//! by every node handler.
//!
//! | model | parameters | construction |
//! |---|---|---|
//! | [`TopologyModel::SmallWorld`] | `k`, `beta` | ring lattice, then random rewiring |
//! | [`TopologyModel::ScaleFree`] | `m`, `a` | seed clique, then preferential attachment |
//! | [`TopologyModel::Grid`] | `D`, `S`, `order` | D-dimensional torus |
//!
//! Grid topologies also expose a [`TorusGrid`] resolver for coordinate
//! arithmetic and greedy dimension-order routing.

mod error;
mod graph;
mod grid;
mod model;
mod scale_free;
mod small_world;
mod topology;

pub use error::{ParseModelError, TopologyError};
pub use grid::TorusGrid;
pub use model::TopologyModel;
pub use topology::{DegreeStats, Topology, TopologyBuilder, TOPOLOGY_RNG_STREAM};
