//! Spreading parameters shared by the SIR and SAR engines.

use crate::SimulationError;
use serde::{Deserialize, Serialize};

/// Rates, degree exponents and horizon of one continuous-time run.
///
/// The transmission hazard along an arc `u → v` is
/// `lambda · deg(u)^alpha · deg(v)^beta`; recovery is exponential with rate
/// `gamma`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadParams {
    /// Base transmission rate, `>= 0`.
    pub lambda: f64,
    /// Recovery rate, `>= 0`. Zero means nodes never recover.
    pub gamma: f64,
    /// Logical end time, `> 0`. Events at or after it are discarded.
    pub horizon: f64,
    /// Exponent applied to the source node's degree.
    pub alpha: f64,
    /// Exponent applied to the target node's degree.
    pub beta: f64,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            gamma: 1.0,
            horizon: 200.0,
            alpha: 0.0,
            beta: 0.0,
        }
    }
}

impl SpreadParams {
    /// Parameters with no degree modulation.
    pub fn new(lambda: f64, gamma: f64, horizon: f64) -> Self {
        Self {
            lambda,
            gamma,
            horizon,
            ..Default::default()
        }
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the source-degree exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the target-degree exponent.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Check ranges. Called by every engine constructor.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.lambda >= 0.0 && self.lambda.is_finite()) {
            return Err(SimulationError::config(format!(
                "lambda must be a non-negative finite rate, got {}",
                self.lambda
            )));
        }
        if !(self.gamma >= 0.0 && self.gamma.is_finite()) {
            return Err(SimulationError::config(format!(
                "gamma must be a non-negative finite rate, got {}",
                self.gamma
            )));
        }
        // +inf is a legal horizon: the run ends when the queue drains.
        if self.horizon.is_nan() || self.horizon <= 0.0 {
            return Err(SimulationError::config(format!(
                "horizon must be positive, got {}",
                self.horizon
            )));
        }
        if self.alpha.is_nan() || self.beta.is_nan() {
            return Err(SimulationError::config("degree exponents must not be NaN"));
        }
        Ok(())
    }

    /// Hazard of transmission from a node of degree `source_degree` to one
    /// of degree `target_degree`.
    ///
    /// Degree 0 is raised as if it were 1, so `0^negative` never produces an
    /// infinite rate. This only matters for the isolated seed case.
    pub fn effective_rate(&self, source_degree: usize, target_degree: usize) -> f64 {
        let k = source_degree.max(1) as f64;
        let kp = target_degree.max(1) as f64;
        self.lambda * k.powf(self.alpha) * kp.powf(self.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpreadParams::default().validate().is_ok());
        assert!(SpreadParams::new(0.0, 0.0, f64::INFINITY).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let base = SpreadParams::default();
        for bad in [
            base.with_lambda(-0.1),
            base.with_lambda(f64::NAN),
            base.with_gamma(-1.0),
            base.with_horizon(0.0),
            base.with_horizon(-5.0),
            base.with_horizon(f64::NAN),
            base.with_alpha(f64::NAN),
        ] {
            let err = bad.validate().unwrap_err();
            assert!(matches!(err, SimulationError::InvalidConfiguration(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_effective_rate_scales_with_degrees() {
        let p = SpreadParams::new(0.5, 1.0, 10.0).with_alpha(1.0).with_beta(-1.0);
        assert_eq!(p.effective_rate(4, 2), 0.5 * 4.0 / 2.0);
    }

    #[test]
    fn test_degree_zero_is_treated_as_one() {
        let p = SpreadParams::new(2.0, 1.0, 10.0).with_alpha(-2.0).with_beta(-3.0);
        assert_eq!(p.effective_rate(0, 0), 2.0);
        assert!(p.effective_rate(0, 1).is_finite());
    }

    #[test]
    fn test_zero_lambda_gives_zero_rate() {
        let p = SpreadParams::new(0.0, 1.0, 10.0).with_alpha(3.0);
        assert_eq!(p.effective_rate(10, 10), 0.0);
    }
}
