//! Domain layer: hub state, connection registry and outbound events.
//!
//! This module contains the state shared across every connection: the
//! sensor/actuator store, the registry that maps connections to rooms and
//! devices, and the catalogue of events the hub emits.

pub mod actuator;
pub mod connection_id;
pub mod hub_event;
pub mod registry;
pub mod room;
pub mod sensor;
pub mod state_store;

pub use actuator::{ActuatorState, ActuatorValue};
pub use connection_id::ConnectionId;
pub use hub_event::{DeviceTransition, HubEvent};
pub use registry::{ConnectionRegistry, Outbox};
pub use room::Room;
pub use sensor::{SensorPatch, SensorReading};
pub use state_store::{Snapshot, StateStore};
