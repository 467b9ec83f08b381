//! Event router: one dispatch table from inbound events to handlers.
//!
//! Every handler follows the same pattern: mutate the store or registry,
//! then emit events built from the value the mutation returned. Handlers
//! address audiences by [`Room`], never by connection list, except for
//! replies to the originating connection.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::command_dispatcher::{ActuatorCommand, CommandDispatcher};
use super::inbound_event::InboundEvent;
use crate::domain::{
    ActuatorState, ConnectionId, ConnectionRegistry, DeviceTransition, HubEvent, Room,
    SensorPatch, SensorReading, StateStore,
};
use crate::error::HubError;

/// Hub state as reported by `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubStatus {
    /// Latest sensor reading.
    pub sensors: SensorReading,
    /// Current actuator values.
    pub actuators: ActuatorState,
    /// Distinct registered devices.
    pub connected_devices: usize,
}

/// Routes inbound events to their handlers.
///
/// Owns the shared [`StateStore`] and [`ConnectionRegistry`]; cloning is
/// cheap and every clone sees the same state.
#[derive(Debug, Clone)]
pub struct EventRouter {
    store: Arc<StateStore>,
    registry: Arc<ConnectionRegistry>,
    dispatcher: CommandDispatcher,
}

impl EventRouter {
    /// Creates a router over the shared store and registry.
    #[must_use]
    pub fn new(store: Arc<StateStore>, registry: Arc<ConnectionRegistry>) -> Self {
        let dispatcher = CommandDispatcher::new(Arc::clone(&store), Arc::clone(&registry));
        Self {
            store,
            registry,
            dispatcher,
        }
    }

    /// Returns a reference to the inner [`StateStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Returns a reference to the inner [`ConnectionRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Decodes a wire event and handles it on behalf of `conn`.
    ///
    /// Any error is reported back to `conn` as an `error` event.
    pub async fn route(&self, conn: ConnectionId, name: &str, data: Value) {
        let result = match InboundEvent::parse(name, data) {
            Ok(event) => self.handle(conn, event).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.reject(conn, &err).await;
        }
    }

    /// Sends `err` back to `conn` as an `error` event.
    pub async fn reject(&self, conn: ConnectionId, err: &HubError) {
        tracing::warn!(connection_id = %conn, code = err.error_code(), error = %err, "event rejected");
        self.registry
            .send_to(conn, HubEvent::error(err.to_string()))
            .await;
    }

    /// Runs the handler for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if a `control_actuator` command is
    /// rejected. All other events always succeed.
    pub async fn handle(&self, conn: ConnectionId, event: InboundEvent) -> Result<(), HubError> {
        tracing::debug!(connection_id = %conn, event = event.name(), "inbound event");
        match event {
            InboundEvent::DeviceConnect { device_id } => {
                self.on_device_connect(conn, device_id.as_deref()).await;
            }
            InboundEvent::SensorReport(patch) => self.on_sensor_report(conn, &patch).await,
            InboundEvent::ActuatorReport(changes) => self.on_actuator_report(changes).await,
            InboundEvent::WebJoin => self.on_web_join(conn).await,
            InboundEvent::ControlActuator { actuator, value } => {
                self.control(actuator.as_deref().unwrap_or_default(), value)
                    .await?;
            }
            InboundEvent::DeviceJoin => {
                self.registry.join_room(conn, Room::Devices).await;
                tracing::info!(connection_id = %conn, room = %Room::Devices, "joined room");
            }
            InboundEvent::Disconnect => self.on_disconnect(conn).await,
        }
        Ok(())
    }

    /// Commits an actuator command from the live channel or REST facade.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Validation`] if the value does not parse.
    pub async fn control(&self, actuator: &str, raw: Value) -> Result<ActuatorCommand, HubError> {
        self.dispatcher.dispatch(actuator, raw).await
    }

    /// Current sensors, actuators and device count.
    pub async fn status(&self) -> HubStatus {
        let snapshot = self.store.snapshot().await;
        HubStatus {
            sensors: snapshot.sensors,
            actuators: snapshot.actuators,
            connected_devices: self.registry.device_count().await,
        }
    }

    async fn on_device_connect(&self, conn: ConnectionId, device_id: Option<&str>) {
        let registration = self.registry.register_device(conn, device_id).await;
        tracing::info!(
            connection_id = %conn,
            device_id = %registration.device_id,
            total_devices = registration.total_devices,
            "device connected"
        );

        self.registry
            .send_to(conn, HubEvent::connection_ack(registration.device_id.clone()))
            .await;
        self.registry
            .broadcast(
                Room::Web,
                HubEvent::DeviceStatus {
                    transition: DeviceTransition::Connected,
                    device_id: registration.device_id,
                    total_devices: registration.total_devices,
                },
            )
            .await;
    }

    async fn on_sensor_report(&self, conn: ConnectionId, patch: &SensorPatch) {
        let reading = self.store.update_sensors(patch).await;
        tracing::debug!(connection_id = %conn, ?reading, "sensor reading stored");
        self.registry
            .broadcast(Room::Web, HubEvent::SensorUpdate(reading))
            .await;
        self.registry.send_to(conn, HubEvent::data_received()).await;
    }

    async fn on_actuator_report(&self, changes: Map<String, Value>) {
        let actuators = self
            .store
            .update_actuators(changes.into_iter().map(|(k, v)| (k, v.into())))
            .await;
        self.registry
            .broadcast(Room::Web, HubEvent::ActuatorUpdate(actuators))
            .await;
    }

    async fn on_web_join(&self, conn: ConnectionId) {
        let store = &self.store;
        self.registry
            .join_room_with(conn, Room::Web, |connected_devices| async move {
                let snapshot = store.snapshot().await;
                HubEvent::InitialData {
                    sensors: snapshot.sensors,
                    actuators: snapshot.actuators,
                    connected_devices,
                }
            })
            .await;
        tracing::info!(connection_id = %conn, room = %Room::Web, "joined room");
    }

    async fn on_disconnect(&self, conn: ConnectionId) {
        let detached = self.registry.detach(conn).await;
        tracing::info!(
            connection_id = %conn,
            room = ?detached.room,
            released = ?detached.released_devices,
            "connection closed"
        );
        if !detached.released_devices.is_empty() && tracing::enabled!(tracing::Level::DEBUG) {
            let remaining = self.registry.devices().await;
            tracing::debug!(remaining = ?remaining, "device registry after release");
        }

        for device_id in detached.released_devices {
            self.registry
                .broadcast(
                    Room::Web,
                    HubEvent::DeviceStatus {
                        transition: DeviceTransition::Disconnected,
                        device_id,
                        total_devices: detached.total_devices,
                    },
                )
                .await;
        }
    }
}
