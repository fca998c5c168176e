use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("weight {name} must be a non-negative number, got {value}")]
    NegativeWeight { name: &'static str, value: f64 },

    #[error("weights must sum to 1.0, got {0}")]
    BadSum(f64),

    #[error("unknown selection policy: {0}")]
    Unknown(String),
}

/// Relative importance of fee, completion time and security when ranking quotes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawWeights")]
pub struct Weights {
    fee: f64,
    time: f64,
    security: f64,
}

#[derive(Deserialize)]
struct RawWeights {
    fee: f64,
    time: f64,
    security: f64,
}

impl TryFrom<RawWeights> for Weights {
    type Error = PolicyError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Weights::new(raw.fee, raw.time, raw.security)
    }
}

impl Weights {
    /// Build a weight vector. Each weight must be non-negative and the sum must be 1.0.
    pub fn new(fee: f64, time: f64, security: f64) -> Result<Self, PolicyError> {
        for (name, value) in [("fee", fee), ("time", time), ("security", security)] {
            // NaN fails this comparison too
            if !(value >= 0.0) || !value.is_finite() {
                return Err(PolicyError::NegativeWeight { name, value });
            }
        }
        let sum = fee + time + security;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PolicyError::BadSum(sum));
        }
        Ok(Self {
            fee,
            time,
            security,
        })
    }

    const fn fixed(fee: f64, time: f64, security: f64) -> Self {
        Self {
            fee,
            time,
            security,
        }
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn security(&self) -> f64 {
        self.security
    }
}

/// Named route selection preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    Balanced,
    Cheapest,
    Fastest,
    Safest,
    Custom(Weights),
}

impl SelectionPolicy {
    pub fn weights(&self) -> Weights {
        match self {
            SelectionPolicy::Balanced => Weights::fixed(0.34, 0.33, 0.33),
            SelectionPolicy::Cheapest => Weights::fixed(0.80, 0.10, 0.10),
            SelectionPolicy::Fastest => Weights::fixed(0.10, 0.80, 0.10),
            SelectionPolicy::Safest => Weights::fixed(0.10, 0.10, 0.80),
            SelectionPolicy::Custom(weights) => *weights,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SelectionPolicy::Balanced => "balanced",
            SelectionPolicy::Cheapest => "cheapest",
            SelectionPolicy::Fastest => "fastest",
            SelectionPolicy::Safest => "safest",
            SelectionPolicy::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionPolicy {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(SelectionPolicy::Balanced),
            "cheapest" => Ok(SelectionPolicy::Cheapest),
            "fastest" => Ok(SelectionPolicy::Fastest),
            "safest" => Ok(SelectionPolicy::Safest),
            other => Err(PolicyError::Unknown(other.to_string())),
        }
    }
}
