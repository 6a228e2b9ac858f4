//! Pool configuration.
//!
//! Rates and the weight-mutation amplitude are probabilities in `[0, 1]`;
//! setters clamp them silently. Weight bounds are validated instead: an
//! inverted pair is rejected and leaves the configuration untouched.

use serde::{Deserialize, Serialize};

use crate::error::NeatError;
use crate::update_rule::UpdateRule;

/// Configuration shared by every genome of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Fraction of the population removed each generation.
    elimination_rate: f64,
    /// Probability of a new-node mutation per `mutate()` call.
    new_node_mutation_rate: f64,
    /// Probability of a new-connection mutation per `mutate()` call.
    new_connection_mutation_rate: f64,
    /// Scale applied to the random perturbation of each weight.
    weight_mutation_amplitude: f64,
    /// Lowest weight a connection may hold.
    weight_floor: f64,
    /// Highest weight a connection may hold.
    weight_ceiling: f64,
    /// Update rule given to hidden nodes created by mutation.
    pub hidden_update_rule: UpdateRule,
    /// Number of evaluation worker threads; `None` uses rayon's default.
    pub evaluation_threads: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            elimination_rate: 0.5,
            new_node_mutation_rate: 0.05,
            new_connection_mutation_rate: 0.05,
            weight_mutation_amplitude: 0.1,
            weight_floor: -10.0,
            weight_ceiling: 10.0,
            hidden_update_rule: UpdateRule::Sigmoidal,
            evaluation_threads: None,
        }
    }
}

/// Clamp a probability into `[0, 1]`, mapping NaN to 0.
fn prob_clip(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn check_bounds(floor: f64, ceiling: f64) -> Result<(), NeatError> {
    if floor.is_finite() && ceiling.is_finite() && floor <= ceiling {
        Ok(())
    } else {
        Err(NeatError::InvalidConfiguration { floor, ceiling })
    }
}

impl PoolConfig {
    /// Parse a configuration from JSON.
    ///
    /// Missing fields take their defaults and out-of-range rates are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::Config`] for malformed JSON and
    /// [`NeatError::InvalidConfiguration`] for inverted weight bounds.
    pub fn from_json(json: &str) -> Result<Self, NeatError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate()?;
        config.set_elimination_rate(config.elimination_rate);
        config.set_new_node_mutation_rate(config.new_node_mutation_rate);
        config.set_new_connection_mutation_rate(config.new_connection_mutation_rate);
        config.set_weight_mutation_amplitude(config.weight_mutation_amplitude);
        Ok(config)
    }

    /// Check the weight bounds.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if floor > ceiling or a
    /// bound is not finite.
    pub fn validate(&self) -> Result<(), NeatError> {
        check_bounds(self.weight_floor, self.weight_ceiling)
    }

    #[must_use]
    pub const fn elimination_rate(&self) -> f64 {
        self.elimination_rate
    }

    pub fn set_elimination_rate(&mut self, rate: f64) {
        self.elimination_rate = prob_clip(rate);
    }

    #[must_use]
    pub const fn new_node_mutation_rate(&self) -> f64 {
        self.new_node_mutation_rate
    }

    pub fn set_new_node_mutation_rate(&mut self, rate: f64) {
        self.new_node_mutation_rate = prob_clip(rate);
    }

    #[must_use]
    pub const fn new_connection_mutation_rate(&self) -> f64 {
        self.new_connection_mutation_rate
    }

    pub fn set_new_connection_mutation_rate(&mut self, rate: f64) {
        self.new_connection_mutation_rate = prob_clip(rate);
    }

    #[must_use]
    pub const fn weight_mutation_amplitude(&self) -> f64 {
        self.weight_mutation_amplitude
    }

    pub fn set_weight_mutation_amplitude(&mut self, amplitude: f64) {
        self.weight_mutation_amplitude = prob_clip(amplitude);
    }

    #[must_use]
    pub const fn weight_floor(&self) -> f64 {
        self.weight_floor
    }

    #[must_use]
    pub const fn weight_ceiling(&self) -> f64 {
        self.weight_ceiling
    }

    /// Set the lowest allowed weight.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if `floor` exceeds the current ceiling.
    pub fn set_weight_floor(&mut self, floor: f64) -> Result<(), NeatError> {
        check_bounds(floor, self.weight_ceiling)?;
        self.weight_floor = floor;
        Ok(())
    }

    /// Set the highest allowed weight.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if `ceiling` is below the current floor.
    pub fn set_weight_ceiling(&mut self, ceiling: f64) -> Result<(), NeatError> {
        check_bounds(self.weight_floor, ceiling)?;
        self.weight_ceiling = ceiling;
        Ok(())
    }

    /// Set both weight bounds at once.
    ///
    /// Moving both bounds past the old ones (e.g. from `[-10, 10]` to
    /// `[20, 30]`) only works through this method.
    ///
    /// # Errors
    ///
    /// Returns [`NeatError::InvalidConfiguration`] if `floor > ceiling`.
    pub fn set_weight_bounds(&mut self, floor: f64, ceiling: f64) -> Result<(), NeatError> {
        check_bounds(floor, ceiling)?;
        self.weight_floor = floor;
        self.weight_ceiling = ceiling;
        Ok(())
    }

    /// Clip a weight into the configured bounds.
    #[must_use]
    pub fn clip_weight(&self, weight: f64) -> f64 {
        weight.clamp(self.weight_floor, self.weight_ceiling)
    }
}
