//! Topology model selection and parameter validation.

use crate::{ParseModelError, TopologyError, TorusGrid};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_order() -> u32 {
    1
}

/// Graph model used to generate a topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum TopologyModel {
    /// Watts-Strogatz small-world rewiring.
    SmallWorld {
        /// Ring neighbors per node before rewiring (even, `< N`).
        k: u32,
        /// Probability of rewiring each lattice edge.
        beta: f64,
    },

    /// Barabasi-Albert preferential attachment.
    ScaleFree {
        /// Edges added per new node (`< N`).
        m: u32,
        /// Attachment exponent: targets are weighted by `degree^a`.
        a: f64,
    },

    /// Regular multi-dimensional torus.
    Grid {
        /// Number of axes.
        dimensions: u32,
        /// Nodes per axis.
        extent: u32,
        /// Hops per axis considered adjacent.
        #[serde(default = "default_order")]
        order: u32,
    },
}

impl TopologyModel {
    /// A torus with first-order adjacency.
    pub fn grid(dimensions: u32, extent: u32) -> Self {
        TopologyModel::Grid {
            dimensions,
            extent,
            order: 1,
        }
    }

    /// Canonical name, as accepted by [`parse`](Self::parse).
    pub fn kind_name(&self) -> &'static str {
        match self {
            TopologyModel::SmallWorld { .. } => "Watts-Strogatz",
            TopologyModel::ScaleFree { .. } => "Barabasi-Albert",
            TopologyModel::Grid { .. } => "Torus",
        }
    }

    /// Whether this model is a torus grid.
    pub fn is_grid(&self) -> bool {
        matches!(self, TopologyModel::Grid { .. })
    }

    /// Whether [`parse`](Self::parse) reads `kind` as the torus model.
    pub fn is_grid_name(kind: &str) -> bool {
        matches!(kind.trim().to_ascii_lowercase().as_str(), "torus" | "grid")
    }

    /// The torus resolver for grid models.
    pub fn torus(&self) -> Result<Option<TorusGrid>, TopologyError> {
        match *self {
            TopologyModel::Grid {
                dimensions,
                extent,
                order,
            } => TorusGrid::new(dimensions, extent, order).map(Some),
            _ => Ok(None),
        }
    }

    /// Node count implied by the model itself (grids only).
    pub fn implied_node_count(&self) -> Result<Option<usize>, TopologyError> {
        Ok(self.torus()?.map(|grid| grid.node_count()))
    }

    /// Check the parameters against a node count. Called before any
    /// generation work starts.
    pub fn validate(&self, node_count: usize) -> Result<(), TopologyError> {
        if node_count < 2 {
            return Err(TopologyError::TooFewNodes(node_count));
        }
        if u32::try_from(node_count).is_err() {
            return Err(TopologyError::TooManyNodes(node_count));
        }

        match *self {
            TopologyModel::SmallWorld { k, beta } => {
                if k == 0 {
                    return Err(TopologyError::ZeroRingDegree);
                }
                if k % 2 != 0 {
                    return Err(TopologyError::OddRingDegree(k));
                }
                if k as usize >= node_count {
                    return Err(TopologyError::RingDegreeTooLarge {
                        k,
                        nodes: node_count,
                    });
                }
                if !(0.0..=1.0).contains(&beta) {
                    return Err(TopologyError::InvalidRewireProbability(beta));
                }
            }
            TopologyModel::ScaleFree { m, a } => {
                if m == 0 {
                    return Err(TopologyError::ZeroAttachment);
                }
                if m as usize >= node_count {
                    return Err(TopologyError::AttachmentTooLarge {
                        m,
                        nodes: node_count,
                    });
                }
                if !a.is_finite() {
                    return Err(TopologyError::InvalidAttachmentExponent(a));
                }
            }
            TopologyModel::Grid { .. } => {
                let expected = self.implied_node_count()?.unwrap_or_default();
                if expected != node_count {
                    return Err(TopologyError::GridSizeMismatch {
                        expected,
                        actual: node_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse a model from a network type name and its comma-separated
    /// parameters.
    ///
    /// | type | params |
    /// |---|---|
    /// | `Watts-Strogatz`, `small-world` | `k,beta` |
    /// | `Barabasi-Albert`, `scale-free` | `m,a` |
    /// | `Torus`, `grid` | `dimensions,extent[,order]` |
    pub fn parse(kind: &str, params: &str) -> Result<Self, ParseModelError> {
        let fields: Vec<&str> = params.split(',').map(str::trim).collect();

        match kind.trim().to_ascii_lowercase().as_str() {
            "watts-strogatz" | "small-world" | "smallworld" => {
                const MODEL: &str = "Watts-Strogatz";
                let [k, beta] = fields.as_slice() else {
                    return Err(wrong_count(MODEL, "2 (k,beta)", params));
                };
                Ok(TopologyModel::SmallWorld {
                    k: number(MODEL, "k", k)?,
                    beta: number(MODEL, "beta", beta)?,
                })
            }
            "barabasi-albert" | "scale-free" | "scalefree" => {
                const MODEL: &str = "Barabasi-Albert";
                let [m, a] = fields.as_slice() else {
                    return Err(wrong_count(MODEL, "2 (m,a)", params));
                };
                Ok(TopologyModel::ScaleFree {
                    m: number(MODEL, "m", m)?,
                    a: number(MODEL, "a", a)?,
                })
            }
            "torus" | "grid" => {
                const MODEL: &str = "Torus";
                let (dimensions, extent, order) = match *fields.as_slice() {
                    [d, s] => (d, s, None),
                    [d, s, o] => (d, s, Some(o)),
                    _ => {
                        return Err(wrong_count(
                            MODEL,
                            "2 or 3 (dimensions,extent[,order])",
                            params,
                        ))
                    }
                };
                Ok(TopologyModel::Grid {
                    dimensions: number(MODEL, "dimensions", dimensions)?,
                    extent: number(MODEL, "extent", extent)?,
                    order: order
                        .map(|o| number(MODEL, "order", o))
                        .transpose()?
                        .unwrap_or_else(default_order),
                })
            }
            _ => Err(ParseModelError::UnknownTopology(kind.to_string())),
        }
    }
}

impl fmt::Display for TopologyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyModel::SmallWorld { k, beta } => write!(f, "Watts-Strogatz(k={k}, beta={beta})"),
            TopologyModel::ScaleFree { m, a } => write!(f, "Barabasi-Albert(m={m}, a={a})"),
            TopologyModel::Grid {
                dimensions,
                extent,
                order,
            } => write!(f, "Torus({extent}^{dimensions}, order={order})"),
        }
    }
}

fn wrong_count(model: &'static str, expected: &'static str, actual: &str) -> ParseModelError {
    ParseModelError::WrongParamCount {
        model,
        expected,
        actual: actual.to_string(),
    }
}

fn number<T: std::str::FromStr>(
    model: &'static str,
    name: &'static str,
    value: &str,
) -> Result<T, ParseModelError> {
    value.parse().map_err(|_| ParseModelError::InvalidParam {
        model,
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_network_names() {
        assert!(TopologyModel::is_grid_name(" Torus"));
        assert!(!TopologyModel::is_grid_name("small-world"));
        assert_eq!(
            TopologyModel::parse("Watts-Strogatz", "30,0.1").unwrap(),
            TopologyModel::SmallWorld { k: 30, beta: 0.1 }
        );
        assert_eq!(
            TopologyModel::parse("Barabasi-Albert", "3, 1.0").unwrap(),
            TopologyModel::ScaleFree { m: 3, a: 1.0 }
        );
        assert_eq!(
            TopologyModel::parse("torus", "2,3").unwrap(),
            TopologyModel::grid(2, 3)
        );
        assert_eq!(
            TopologyModel::parse("grid", "3,4,2").unwrap(),
            TopologyModel::Grid {
                dimensions: 3,
                extent: 4,
                order: 2
            }
        );
    }

    #[test]
    fn test_parse_unknown_names_the_value() {
        let err = TopologyModel::parse("Erdos-Renyi", "0.1").unwrap_err();
        assert_eq!(err, ParseModelError::UnknownTopology("Erdos-Renyi".into()));
        assert!(err.to_string().contains("Erdos-Renyi"));
    }

    #[test]
    fn test_parse_rejects_bad_params() {
        assert!(matches!(
            TopologyModel::parse("small-world", "4"),
            Err(ParseModelError::WrongParamCount { .. })
        ));
        assert!(matches!(
            TopologyModel::parse("small-world", "four,0.1"),
            Err(ParseModelError::InvalidParam { name: "k", .. })
        ));
        assert!(matches!(
            TopologyModel::parse("torus", "2,3,1,1"),
            Err(ParseModelError::WrongParamCount { .. })
        ));
    }

    #[test]
    fn test_validate_small_world() {
        let model = |k, beta| TopologyModel::SmallWorld { k, beta };
        assert!(model(4, 0.5).validate(10).is_ok());
        assert_eq!(
            model(10, 0.1).validate(10),
            Err(TopologyError::RingDegreeTooLarge { k: 10, nodes: 10 })
        );
        assert_eq!(model(3, 0.1).validate(10), Err(TopologyError::OddRingDegree(3)));
        assert_eq!(model(0, 0.1).validate(10), Err(TopologyError::ZeroRingDegree));
        assert_eq!(
            model(4, 1.5).validate(10),
            Err(TopologyError::InvalidRewireProbability(1.5))
        );
    }

    #[test]
    fn test_validate_scale_free() {
        let model = |m, a| TopologyModel::ScaleFree { m, a };
        assert!(model(3, 1.0).validate(10).is_ok());
        assert_eq!(
            model(10, 1.0).validate(10),
            Err(TopologyError::AttachmentTooLarge { m: 10, nodes: 10 })
        );
        assert_eq!(model(0, 1.0).validate(10), Err(TopologyError::ZeroAttachment));
        assert!(matches!(
            model(2, f64::NAN).validate(10),
            Err(TopologyError::InvalidAttachmentExponent(_))
        ));
    }

    #[test]
    fn test_validate_grid() {
        assert!(TopologyModel::grid(2, 3).validate(9).is_ok());
        assert_eq!(
            TopologyModel::grid(2, 3).validate(10),
            Err(TopologyError::GridSizeMismatch {
                expected: 9,
                actual: 10
            })
        );
        assert_eq!(
            TopologyModel::grid(0, 3).validate(9),
            Err(TopologyError::ZeroDimensions)
        );
        assert_eq!(TopologyModel::grid(2, 3).implied_node_count(), Ok(Some(9)));
    }

    #[test]
    fn test_too_few_nodes() {
        assert_eq!(
            TopologyModel::SmallWorld { k: 2, beta: 0.0 }.validate(1),
            Err(TopologyError::TooFewNodes(1))
        );
    }
}
