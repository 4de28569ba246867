//! Topology configuration errors.

use thiserror::Error;

/// Invalid topology parameters, detected before generation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    #[error("topology needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("duplicate node name {0:?}")]
    DuplicateName(String),

    #[error("small-world k must be positive")]
    ZeroRingDegree,

    #[error("small-world k must be even, got {0}")]
    OddRingDegree(u32),

    #[error("small-world k ({k}) must be less than the node count ({nodes})")]
    RingDegreeTooLarge { k: u32, nodes: usize },

    #[error("small-world beta must lie in [0, 1], got {0}")]
    InvalidRewireProbability(f64),

    #[error("scale-free m must be positive")]
    ZeroAttachment,

    #[error("scale-free m ({m}) must be less than the node count ({nodes})")]
    AttachmentTooLarge { m: u32, nodes: usize },

    #[error("scale-free exponent must be finite, got {0}")]
    InvalidAttachmentExponent(f64),

    #[error("grid needs at least one dimension")]
    ZeroDimensions,

    #[error("grid extent must be at least 1")]
    ZeroExtent,

    #[error("grid of extent 1 leaves every node without neighbors")]
    DegenerateGrid,

    #[error("grid order must be at least 1")]
    ZeroOrder,

    #[error("grid {extent}^{dimensions} does not fit in a 32-bit node index")]
    GridTooLarge { dimensions: u32, extent: u32 },

    #[error("grid holds {expected} nodes but {actual} names were given")]
    GridSizeMismatch { expected: usize, actual: usize },

    #[error("{0} nodes do not fit in a 32-bit node index")]
    TooManyNodes(usize),
}

/// Errors parsing a topology selection from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseModelError {
    #[error("invalid choice of network: {0:?}")]
    UnknownTopology(String),

    #[error("{model} expects {expected} comma-separated parameters, got {actual:?}")]
    WrongParamCount {
        model: &'static str,
        expected: &'static str,
        actual: String,
    },

    #[error("{model} parameter {name} is not a valid number: {value:?}")]
    InvalidParam {
        model: &'static str,
        name: &'static str,
        value: String,
    },
}
