//! # World Adapter Boundary
//!
//! The contract between a nodenet and whatever environment feeds its
//! Sensors and consumes its Actors.
//!
//! ## Implementations
//!
//! | Adapter | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryWorld` | `memory` | In-memory values for embedding and tests |
//!
//! Adapter I/O is async and never overlaps a tick: the runner reads sensors,
//! releases everything, steps the net under its lock, then writes actuators.

pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::net::StepReport;
use crate::netapi::NetApi;
use crate::{Error, Result};

pub use memory::MemoryWorld;

// ============================================================================
// WorldAdapter trait
// ============================================================================

#[async_trait]
pub trait WorldAdapter: Send + Sync {
    /// Current sensor readings keyed by datasource.
    async fn read_sensors(&self) -> Result<HashMap<String, f64>>;

    /// Push actuator values keyed by datatarget.
    async fn write_actuators(&self, values: &HashMap<String, f64>) -> Result<()>;
}

// ============================================================================
// WorldRunner
// ============================================================================

/// Drives a net against a world adapter, one sense/step/act cycle at a time.
pub struct WorldRunner<W: WorldAdapter> {
    net: NetApi,
    world: W,
}

impl<W: WorldAdapter> WorldRunner<W> {
    pub fn new(net: NetApi, world: W) -> Self {
        Self { net, world }
    }

    pub fn net(&self) -> &NetApi {
        &self.net
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    /// Read sensors, tick once, write actuators.
    pub async fn cycle(&self) -> Result<StepReport> {
        let readings = self.world.read_sensors().await?;
        if let Some(bad) = readings.values().find(|v| !v.is_finite()) {
            return Err(Error::InvalidActivation(*bad));
        }
        let mut sources: Vec<(&String, &f64)> = readings.iter().collect();
        sources.sort_by(|a, b| a.0.cmp(b.0));
        for (datasource, value) in sources {
            self.net.set_sensor_value(datasource, *value)?;
        }

        let report = self.net.step();

        let actuators = self.net.actuator_values();
        self.world.write_actuators(&actuators).await?;
        debug!(
            step = report.step,
            sensors = readings.len(),
            actuators = actuators.len(),
            "world cycle"
        );
        Ok(report)
    }

    /// Run `n` cycles, stopping at the first adapter error.
    pub async fn run(&self, n: u64) -> Result<Option<StepReport>> {
        let mut last = None;
        for _ in 0..n {
            last = Some(self.cycle().await?);
        }
        Ok(last)
    }

    pub fn into_parts(self) -> (NetApi, W) {
        (self.net, self.world)
    }
}
