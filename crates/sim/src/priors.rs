//! Prior distributions for model parameters.
//!
//! Priors are configured by name and a flat parameter list, the way they are
//! given on the command line:
//!
//! - `uniform [low, high]`: draws in `[low, high)`
//! - `gamma [shape, loc, scale]`: `loc + scale * Gamma(shape, 1)`
//! - `exponential [loc, scale]`: `loc + scale * Exp(1)`
//!
//! A [`Prior`] is validated once and can then be sampled any number of times.
//! Sampling never touches global random state; callers pass the RNG.

use core::fmt;
use std::str::FromStr;

use rand::distr::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Exp1, Gamma};
use serde::{Deserialize, Serialize};

use crate::errors::{AbissError, Result};

/// Supported prior families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorKind {
    Uniform,
    Gamma,
    Exponential,
}

impl PriorKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Gamma => "gamma",
            Self::Exponential => "exponential",
        }
    }

    /// Number of values in the parameter list.
    pub const fn param_count(self) -> usize {
        match self {
            Self::Uniform => 2,
            Self::Gamma => 3,
            Self::Exponential => 2,
        }
    }

    const fn param_names(self) -> &'static str {
        match self {
            Self::Uniform => "[min max]",
            Self::Gamma => "[alpha loc scale]",
            Self::Exponential => "[loc scale]",
        }
    }
}

impl fmt::Display for PriorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriorKind {
    type Err = AbissError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "gamma" => Ok(Self::Gamma),
            "exponential" => Ok(Self::Exponential),
            _ => Err(AbissError::invalid_argument(format!(
                "Distribution {s} not implemented (select from 'uniform', 'gamma' or 'exponential')"
            ))),
        }
    }
}

/// Prior as written in a run configuration.
///
/// The distribution stays a plain string here so that an unknown name is
/// reported as an invalid argument naming the value, not as a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    pub distribution: String,
    pub params: Vec<f64>,
}

impl PriorConfig {
    pub fn new(distribution: impl Into<String>, params: Vec<f64>) -> Self {
        Self {
            distribution: distribution.into(),
            params,
        }
    }

    pub fn uniform(low: f64, high: f64) -> Self {
        Self::new("uniform", vec![low, high])
    }

    pub fn gamma(shape: f64, loc: f64, scale: f64) -> Self {
        Self::new("gamma", vec![shape, loc, scale])
    }

    pub fn exponential(loc: f64, scale: f64) -> Self {
        Self::new("exponential", vec![loc, scale])
    }
}

#[derive(Debug, Clone)]
enum Law {
    Constant(f64),
    Uniform(Uniform<f64>),
    Gamma { loc: f64, gamma: Gamma<f64> },
    Exponential { loc: f64, scale: f64 },
}

/// A validated prior distribution.
#[derive(Debug, Clone)]
pub struct Prior {
    kind: PriorKind,
    params: Vec<f64>,
    law: Law,
}

impl Prior {
    /// Validate `params` for `kind`.
    pub fn new(kind: PriorKind, params: &[f64]) -> Result<Self> {
        if params.len() != kind.param_count() {
            return Err(AbissError::invalid_argument(format!(
                "{kind} prior takes {} parameters {}, got {}",
                kind.param_count(),
                kind.param_names(),
                params.len()
            )));
        }
        if let Some(bad) = params.iter().find(|v| !v.is_finite()) {
            return Err(AbissError::invalid_argument(format!(
                "{kind} prior parameters must be finite, got {bad}"
            )));
        }

        let law = match kind {
            PriorKind::Uniform => {
                let (low, high) = (params[0], params[1]);
                if low > high {
                    return Err(AbissError::invalid_argument(format!(
                        "uniform prior needs min <= max, got [{low}, {high}]"
                    )));
                } else if low == high {
                    Law::Constant(low)
                } else {
                    let uniform = Uniform::new(low, high).map_err(|e| {
                        AbissError::invalid_argument(format!("uniform prior [{low}, {high}]: {e}"))
                    })?;
                    Law::Uniform(uniform)
                }
            }
            PriorKind::Gamma => {
                let (shape, loc, scale) = (params[0], params[1], params[2]);
                let gamma = Gamma::new(shape, scale).map_err(|e| {
                    AbissError::invalid_argument(format!(
                        "gamma prior (alpha={shape}, scale={scale}): {e}"
                    ))
                })?;
                Law::Gamma { loc, gamma }
            }
            PriorKind::Exponential => {
                let (loc, scale) = (params[0], params[1]);
                if scale <= 0.0 {
                    return Err(AbissError::invalid_argument(format!(
                        "exponential prior needs scale > 0, got {scale}"
                    )));
                }
                Law::Exponential { loc, scale }
            }
        };

        Ok(Self {
            kind,
            params: params.to_vec(),
            law,
        })
    }

    /// Parse and validate a configured prior.
    pub fn from_config(config: &PriorConfig) -> Result<Self> {
        let kind: PriorKind = config.distribution.parse()?;
        Self::new(kind, &config.params)
    }

    pub fn kind(&self) -> PriorKind {
        self.kind
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Draw one value.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.law {
            Law::Constant(value) => *value,
            Law::Uniform(uniform) => uniform.sample(rng),
            Law::Gamma { loc, gamma } => loc + gamma.sample(rng),
            Law::Exponential { loc, scale } => {
                let unit: f64 = Exp1.sample(rng);
                loc + scale * unit
            }
        }
    }

    /// Draw `n` values; `n == 0` gives an empty vector.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.draw(rng)).collect()
    }
}

impl fmt::Display for Prior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.kind, self.params)
    }
}

/// Draw `n` values from the named distribution.
///
/// The name and parameters are validated even when `n == 0`.
pub fn sample<R: Rng + ?Sized>(
    distribution: &str,
    params: &[f64],
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    let kind: PriorKind = distribution.parse()?;
    Ok(Prior::new(kind, params)?.sample(n, rng))
}

/// The three priors of a run: population sizes, split times and migration.
#[derive(Debug, Clone)]
pub struct PriorSet {
    pub ne: Prior,
    pub tau: Prior,
    pub migration: Prior,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    #[test]
    fn test_zero_draws_is_empty() {
        let values = sample("uniform", &[0.0, 1.0], 0, &mut rng()).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_uniform_within_bounds() {
        let values = sample("uniform", &[2.0, 5.0], 1000, &mut rng()).unwrap();
        assert_eq!(values.len(), 1000);
        assert!(values.iter().all(|&v| (2.0..5.0).contains(&v)));
    }

    #[test]
    fn test_uniform_degenerate_is_constant() {
        let values = sample("uniform", &[3.0, 3.0], 5, &mut rng()).unwrap();
        assert_eq!(values, vec![3.0; 5]);
    }

    #[test]
    fn test_gamma_shifted_by_loc() {
        let values = sample("gamma", &[2.0, 10.0, 1.5], 500, &mut rng()).unwrap();
        assert!(values.iter().all(|&v| v >= 10.0));

        // Mean of loc + Gamma(shape, scale) is loc + shape * scale = 13
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 13.0).abs() < 0.5, "mean was {mean}");
    }

    #[test]
    fn test_exponential_shifted_by_loc() {
        let values = sample("exponential", &[1.0, 2.0], 2000, &mut rng()).unwrap();
        assert!(values.iter().all(|&v| v >= 1.0));

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 3.0).abs() < 0.3, "mean was {mean}");
    }

    #[test]
    fn test_unknown_distribution_named_in_error() {
        let err = sample("lognormal", &[0.0, 1.0], 3, &mut rng()).unwrap_err();
        assert!(matches!(err, AbissError::InvalidArgument(_)));
        assert!(err.to_string().contains("lognormal"));
    }

    #[test]
    fn test_case_insensitive_names() {
        assert_eq!("Uniform".parse::<PriorKind>().unwrap(), PriorKind::Uniform);
        assert_eq!("GAMMA".parse::<PriorKind>().unwrap(), PriorKind::Gamma);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Prior::new(PriorKind::Uniform, &[0.0]).is_err());
        assert!(Prior::new(PriorKind::Uniform, &[5.0, 1.0]).is_err());
        assert!(Prior::new(PriorKind::Gamma, &[0.0, 0.0, 1.0]).is_err());
        assert!(Prior::new(PriorKind::Gamma, &[1.0, 0.0, -1.0]).is_err());
        assert!(Prior::new(PriorKind::Exponential, &[0.0, 0.0]).is_err());
        assert!(Prior::new(PriorKind::Uniform, &[0.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_same_seed_same_draws() {
        let prior = Prior::from_config(&PriorConfig::uniform(0.0, 100.0)).unwrap();
        assert_eq!(prior.sample(10, &mut rng()), prior.sample(10, &mut rng()));
    }

    #[test]
    fn test_config_serde_shape() {
        let config: PriorConfig =
            serde_json::from_str(r#"{"distribution": "gamma", "params": [2.0, 0.0, 1.0]}"#)
                .unwrap();
        assert_eq!(config, PriorConfig::gamma(2.0, 0.0, 1.0));
    }
}
