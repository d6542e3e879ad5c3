//! In-memory world adapter.
//!
//! Sensor values are whatever was last stored with [`MemoryWorld::set_sensor`];
//! actuator writes are kept for inspection. Clones share state, so a test can
//! hand one clone to a [`WorldRunner`](super::WorldRunner) and watch through
//! another.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::WorldAdapter;
use crate::Result;

#[derive(Clone, Default)]
pub struct MemoryWorld {
    inner: Arc<MemoryWorldInner>,
}

#[derive(Default)]
struct MemoryWorldInner {
    sensors: RwLock<HashMap<String, f64>>,
    actuators: RwLock<HashMap<String, f64>>,
    /// number of completed `write_actuators` calls
    writes: RwLock<u64>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sensor(&self, datasource: impl Into<String>, value: f64) {
        self.inner.sensors.write().insert(datasource.into(), value);
    }

    /// Last value written for `datatarget`, if any.
    pub fn actuator(&self, datatarget: &str) -> Option<f64> {
        self.inner.actuators.read().get(datatarget).copied()
    }

    pub fn actuators(&self) -> HashMap<String, f64> {
        self.inner.actuators.read().clone()
    }

    pub fn write_count(&self) -> u64 {
        *self.inner.writes.read()
    }
}

#[async_trait]
impl WorldAdapter for MemoryWorld {
    async fn read_sensors(&self) -> Result<HashMap<String, f64>> {
        Ok(self.inner.sensors.read().clone())
    }

    async fn write_actuators(&self, values: &HashMap<String, f64>) -> Result<()> {
        let mut actuators = self.inner.actuators.write();
        for (target, value) in values {
            actuators.insert(target.clone(), *value);
        }
        *self.inner.writes.write() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sensors_round_trip_through_trait() {
        let world = MemoryWorld::new();
        world.set_sensor("light", 0.5);
        let readings = world.read_sensors().await.unwrap();
        assert_eq!(readings.get("light"), Some(&0.5));
    }

    #[tokio::test]
    async fn test_actuator_writes_merge() {
        let world = MemoryWorld::new();
        let observer = world.clone();
        world
            .write_actuators(&HashMap::from([("left".to_string(), 1.0)]))
            .await
            .unwrap();
        world
            .write_actuators(&HashMap::from([("right".to_string(), -0.5)]))
            .await
            .unwrap();
        assert_eq!(observer.actuator("left"), Some(1.0));
        assert_eq!(observer.actuator("right"), Some(-0.5));
        assert_eq!(observer.write_count(), 2);
    }
}
