//! Concurrent store for the current sensor reading and actuator state.
//!
//! [`StateStore`] keeps both halves of the hub state behind one
//! [`tokio::sync::RwLock`]. Every mutation is a single write-lock
//! critical section and returns the post-mutation value, so callers build
//! broadcasts from exactly what they wrote.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use super::actuator::{ActuatorState, ActuatorValue};
use super::sensor::{SensorPatch, SensorReading};

/// Point-in-time copy of the whole hub state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Latest sensor reading.
    pub sensors: SensorReading,
    /// Current actuator values.
    pub actuators: ActuatorState,
}

/// Process-wide state shared by every connection.
///
/// # Concurrency
///
/// - Snapshots may be taken concurrently.
/// - Updates are serialized; a snapshot never observes half an update.
#[derive(Debug, Default)]
pub struct StateStore {
    state: RwLock<Snapshot>,
}

impl StateStore {
    /// Creates a store in the cold-start state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a consistent copy of sensors and actuators.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Merges `patch` into the sensor reading and stamps `last_update`.
    ///
    /// Returns the reading as it stands after the update.
    pub async fn update_sensors(&self, patch: &SensorPatch) -> SensorReading {
        let mut state = self.state.write().await;
        state.sensors.apply(patch, Utc::now());
        state.sensors.clone()
    }

    /// Merges `changes` into the actuator state.
    ///
    /// Returns the full actuator state after the update.
    pub async fn update_actuators<I>(&self, changes: I) -> ActuatorState
    where
        I: IntoIterator<Item = (String, ActuatorValue)>,
    {
        let mut state = self.state.write().await;
        state.actuators.merge(changes);
        state.actuators.clone()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::actuator::{LED, SERVO_ANGLE};

    #[tokio::test]
    async fn cold_start_is_zeroed() {
        let store = StateStore::new();
        let snap = store.snapshot().await;
        assert!(snap.sensors.temperature.abs() < f64::EPSILON);
        assert!(snap.sensors.last_update.is_none());
        assert_eq!(snap.actuators.get(LED), Some(&ActuatorValue::Bool(false)));
    }

    #[tokio::test]
    async fn update_sensors_returns_post_write_value() {
        let store = StateStore::new();
        let patch = SensorPatch {
            temperature: Some(21.5),
            ..SensorPatch::default()
        };
        let written = store.update_sensors(&patch).await;
        assert!((written.temperature - 21.5).abs() < f64::EPSILON);
        assert!(written.last_update.is_some());
        assert_eq!(store.snapshot().await.sensors, written);
    }

    #[tokio::test]
    async fn update_actuators_merges() {
        let store = StateStore::new();
        let after = store
            .update_actuators([(SERVO_ANGLE.to_string(), ActuatorValue::Integer(90))])
            .await;
        assert_eq!(after.get(SERVO_ANGLE), Some(&ActuatorValue::Integer(90)));
        assert_eq!(after.get(LED), Some(&ActuatorValue::Bool(false)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_distinct_keys_all_survive() {
        let store = Arc::new(StateStore::new());
        let mut handles = Vec::new();
        for i in 0..64_i64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update_actuators([(format!("aux_{i}"), ActuatorValue::Integer(i))])
                    .await
            }));
        }
        for handle in handles {
            let Ok(_) = handle.await else {
                panic!("update task panicked");
            };
        }

        let snap = store.snapshot().await;
        assert_eq!(snap.actuators.len(), 64 + 3);
        for i in 0..64_i64 {
            assert_eq!(
                snap.actuators.get(&format!("aux_{i}")),
                Some(&ActuatorValue::Integer(i))
            );
        }
    }
}
