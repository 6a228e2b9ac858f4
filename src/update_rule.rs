//! Neuron update rules instantiated when a genome is materialized.
//!
//! Node genes carry an [`UpdateRule`] tag. The set of rules is closed: a
//! materialized [`Network`](crate::network::Network) resolves each tag to its
//! transfer function directly, without any registry or dynamic dispatch.

use serde::{Deserialize, Serialize};

/// Transfer functions available to neurons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UpdateRule {
    /// Linear: f(x) = x
    #[default]
    Linear,
    /// Logistic sigmoid: f(x) = 1 / (1 + e^(-x))
    Sigmoidal,
    /// Hyperbolic tangent: f(x) = tanh(x)
    Tanh,
    /// Rectified linear: f(x) = max(0, x)
    ReLU,
    /// Binary threshold: f(x) = 1 if x > 0 else 0
    Binary,
    /// Gaussian: f(x) = e^(-x^2)
    Gaussian,
    /// Sine: f(x) = sin(x)
    Sine,
}

impl UpdateRule {
    /// All available update rules.
    pub const ALL: [Self; 7] = [
        Self::Linear,
        Self::Sigmoidal,
        Self::Tanh,
        Self::ReLU,
        Self::Binary,
        Self::Gaussian,
        Self::Sine,
    ];

    /// Apply this rule to a neuron's summed input.
    ///
    /// NaN propagates unchanged. Infinite inputs map to the rule's limit
    /// where one exists.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }

        match self {
            Self::Linear => x,
            Self::Sigmoidal => {
                if x == f64::INFINITY {
                    return 1.0;
                }
                if x == f64::NEG_INFINITY {
                    return 0.0;
                }
                // exp overflows past ~709
                let clamped = x.clamp(-700.0, 700.0);
                1.0 / (1.0 + (-clamped).exp())
            }
            Self::Tanh => x.tanh(),
            Self::ReLU => x.max(0.0),
            Self::Binary => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Gaussian => {
                if x.is_infinite() || x.abs() > 40.0 {
                    0.0
                } else {
                    (-x * x).exp()
                }
            }
            Self::Sine => {
                if x.is_infinite() {
                    return 0.0;
                }
                x.sin()
            }
        }
    }
}
