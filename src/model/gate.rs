//! A node's named output and its transfer function.

use serde::{Deserialize, Serialize};

use super::Channel;
use crate::{Error, Result};

/// Tunable parameters of a gate's transfer function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateParameters {
    /// Magnitudes below this are cut to zero.
    pub threshold: f64,
    pub amplification: f64,
    pub min: f64,
    pub max: f64,
    /// Share of the previous activation carried into the next tick.
    pub decay: f64,
}

impl Default for GateParameters {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            amplification: 1.0,
            min: -1.0,
            max: 1.0,
            decay: 0.0,
        }
    }
}

impl GateParameters {
    /// Reject parameter sets the transfer function cannot honor.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("threshold", self.threshold),
            ("amplification", self.amplification),
            ("decay", self.decay),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(Error::InvalidGateParameters(format!("{name} must be finite, got {v}")));
            }
        }
        if self.min.is_nan() || self.max.is_nan() {
            return Err(Error::InvalidGateParameters("min/max must not be NaN".into()));
        }
        if self.min > self.max {
            return Err(Error::InvalidGateParameters(format!(
                "min ({}) exceeds max ({})",
                self.min, self.max
            )));
        }
        if self.threshold < 0.0 {
            return Err(Error::InvalidGateParameters(format!(
                "threshold must be >= 0, got {}",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(Error::InvalidGateParameters(format!(
                "decay must lie in [0, 1], got {}",
                self.decay
            )));
        }
        Ok(())
    }

    /// Apply a partial update, returning the merged set without touching `self`.
    pub fn merged(&self, update: &GateParameterUpdate) -> GateParameters {
        GateParameters {
            threshold: update.threshold.unwrap_or(self.threshold),
            amplification: update.amplification.unwrap_or(self.amplification),
            min: update.min.unwrap_or(self.min),
            max: update.max.unwrap_or(self.max),
            decay: update.decay.unwrap_or(self.decay),
        }
    }
}

/// Partial gate parameter change; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateParameterUpdate {
    pub threshold: Option<f64>,
    pub amplification: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub decay: Option<f64>,
}

impl GateParameterUpdate {
    pub fn threshold(mut self, v: f64) -> Self {
        self.threshold = Some(v);
        self
    }

    pub fn amplification(mut self, v: f64) -> Self {
        self.amplification = Some(v);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn decay(mut self, v: f64) -> Self {
        self.decay = Some(v);
        self
    }
}

/// A node's named output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    pub channel: Channel,
    pub activation: f64,
    pub parameters: GateParameters,
}

impl Gate {
    pub fn new(channel: Channel, parameters: GateParameters) -> Self {
        Self { channel, activation: 0.0, parameters }
    }

    /// Compute the activation this gate would take for pre-activation `input`.
    ///
    /// Pure: reads only `input`, the parameters and the current (previous-tick)
    /// activation.
    pub fn transfer(&self, input: f64) -> f64 {
        let p = &self.parameters;
        let mut raw = p.amplification * input;
        if p.decay > 0.0 {
            raw += p.decay * self.activation;
        }
        if raw.is_nan() {
            return 0.0;
        }
        if raw.abs() < p.threshold {
            return 0.0;
        }
        raw.clamp(p.min, p.max)
    }
}
