//! Connection registry: live connections, room membership and devices.
//!
//! [`ConnectionRegistry`] owns one outbound queue per live connection and
//! indexes connections by [`Room`]. It also tracks the set of registered
//! device ids together with the connections that claimed them, so the
//! device count drops when the last claimant disconnects.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::{ConnectionId, HubEvent, Room};

/// Device id used when a device connects without one.
pub const UNKNOWN_DEVICE: &str = "unknown";

/// Sending half of a connection's outbound queue.
pub type Outbox = mpsc::Sender<Arc<HubEvent>>;

/// Result of [`ConnectionRegistry::register_device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistration {
    /// Id the device was registered under, after sentinel substitution.
    pub device_id: String,
    /// Distinct registered devices after registration.
    pub total_devices: usize,
}

/// What a connection left behind when it was detached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detached {
    /// Room the connection was a member of.
    pub room: Option<Room>,
    /// Device ids that lost their last claimant and left the registry.
    pub released_devices: Vec<String>,
    /// Distinct registered devices after the detach.
    pub total_devices: usize,
}

#[derive(Debug)]
struct ConnectionEntry {
    outbox: Outbox,
    room: Option<Room>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<Room, HashSet<ConnectionId>>,
    /// Device id → connections that registered it.
    devices: BTreeMap<String, HashSet<ConnectionId>>,
}

impl RegistryInner {
    fn place(&mut self, conn: ConnectionId, room: Room) -> bool {
        if !self.connections.contains_key(&conn) {
            return false;
        }
        self.leave_room(conn);
        if let Some(entry) = self.connections.get_mut(&conn) {
            entry.room = Some(room);
        }
        self.rooms.entry(room).or_default().insert(conn);
        true
    }

    fn leave_room(&mut self, conn: ConnectionId) -> Option<Room> {
        let room = self.connections.get_mut(&conn)?.room.take()?;
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&conn);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
        Some(room)
    }
}

/// Process-wide registry shared by every connection handler.
///
/// All state sits behind a single [`tokio::sync::RwLock`], so each
/// operation is atomic with respect to every other.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a live connection with its outbound queue. It joins no room.
    pub async fn attach(&self, conn: ConnectionId, outbox: Outbox) {
        let mut inner = self.inner.write().await;
        inner
            .connections
            .insert(conn, ConnectionEntry { outbox, room: None });
    }

    /// Removes a connection, its room membership and its device claims.
    pub async fn detach(&self, conn: ConnectionId) -> Detached {
        let mut inner = self.inner.write().await;
        let room = inner.leave_room(conn);
        inner.connections.remove(&conn);

        let mut released_devices = Vec::new();
        inner.devices.retain(|device_id, claimants| {
            if claimants.remove(&conn) && claimants.is_empty() {
                released_devices.push(device_id.clone());
                return false;
            }
            true
        });

        Detached {
            room,
            released_devices,
            total_devices: inner.devices.len(),
        }
    }

    /// Registers `device_id` as claimed by `conn`.
    ///
    /// Missing or blank ids fall back to [`UNKNOWN_DEVICE`]. Registering an
    /// id that is already present leaves the device count unchanged.
    pub async fn register_device(
        &self,
        conn: ConnectionId,
        device_id: Option<&str>,
    ) -> DeviceRegistration {
        let device_id = match device_id.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => UNKNOWN_DEVICE.to_string(),
        };
        let mut inner = self.inner.write().await;
        inner
            .devices
            .entry(device_id.clone())
            .or_default()
            .insert(conn);
        DeviceRegistration {
            device_id,
            total_devices: inner.devices.len(),
        }
    }

    /// Drops `device_id` from the registry regardless of claimants.
    ///
    /// Returns `true` if the id was registered.
    pub async fn remove_device(&self, device_id: &str) -> bool {
        self.inner.write().await.devices.remove(device_id).is_some()
    }

    /// Number of distinct registered devices.
    pub async fn device_count(&self) -> usize {
        self.inner.read().await.devices.len()
    }

    /// Registered device ids in lexical order.
    pub async fn devices(&self) -> Vec<String> {
        self.inner.read().await.devices.keys().cloned().collect()
    }

    /// Places `conn` in `room`, leaving any previous room.
    ///
    /// Returns `false` if the connection is not attached.
    pub async fn join_room(&self, conn: ConnectionId, room: Room) -> bool {
        let mut inner = self.inner.write().await;
        inner.place(conn, room)
    }

    /// Places `conn` in `room` and queues a welcome event for it first.
    ///
    /// `welcome` receives the current device count and runs while the
    /// registry is locked, so no room broadcast can reach `conn` between
    /// building the welcome and joining: anything committed after it was
    /// built is delivered after it. Returns `false` if the connection is
    /// not attached, in which case `welcome` is not called.
    pub async fn join_room_with<F, Fut>(&self, conn: ConnectionId, room: Room, welcome: F) -> bool
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = HubEvent>,
    {
        let mut inner = self.inner.write().await;
        let Some(outbox) = inner.connections.get(&conn).map(|entry| entry.outbox.clone()) else {
            return false;
        };
        let event = welcome(inner.devices.len()).await;
        deliver(conn, &outbox, Arc::new(event));
        inner.place(conn, room)
    }

    /// Room `conn` currently belongs to.
    pub async fn room_of(&self, conn: ConnectionId) -> Option<Room> {
        self.inner
            .read()
            .await
            .connections
            .get(&conn)
            .and_then(|entry| entry.room)
    }

    /// Current members of `room`.
    pub async fn members_of(&self, room: Room) -> HashSet<ConnectionId> {
        self.inner
            .read()
            .await
            .rooms
            .get(&room)
            .cloned()
            .unwrap_or_default()
    }

    /// Queues `event` for every member of `room`.
    ///
    /// Membership is copied before delivery, so joins and leaves during
    /// fan-out are harmless. A member whose queue is full or closed misses
    /// this event; nobody else is affected. Returns the number of members
    /// the event was queued for.
    pub async fn broadcast(&self, room: Room, event: HubEvent) -> usize {
        let targets: Vec<(ConnectionId, Outbox)> = {
            let inner = self.inner.read().await;
            inner
                .rooms
                .get(&room)
                .into_iter()
                .flatten()
                .filter_map(|id| {
                    inner
                        .connections
                        .get(id)
                        .map(|entry| (*id, entry.outbox.clone()))
                })
                .collect()
        };

        let event = Arc::new(event);
        let mut delivered = 0;
        for (conn, outbox) in targets {
            if deliver(conn, &outbox, Arc::clone(&event)) {
                delivered += 1;
            }
        }
        tracing::debug!(%room, event = event.event_name(), delivered, "room broadcast");
        delivered
    }

    /// Queues `event` for a single connection.
    ///
    /// Returns `false` if the connection is unknown or could not take it.
    pub async fn send_to(&self, conn: ConnectionId, event: HubEvent) -> bool {
        let outbox = {
            let inner = self.inner.read().await;
            match inner.connections.get(&conn) {
                Some(entry) => entry.outbox.clone(),
                None => return false,
            }
        };
        deliver(conn, &outbox, Arc::new(event))
    }
}

fn deliver(conn: ConnectionId, outbox: &Outbox, event: Arc<HubEvent>) -> bool {
    match outbox.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            tracing::warn!(
                connection_id = %conn,
                event = event.event_name(),
                "outbound queue full, dropping event"
            );
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(connection_id = %conn, "outbound queue closed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn attached(
        registry: &ConnectionRegistry,
        capacity: usize,
    ) -> (ConnectionId, mpsc::Receiver<Arc<HubEvent>>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(capacity);
        registry.attach(id, tx).await;
        (id, rx)
    }

    #[tokio::test]
    async fn duplicate_registration_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();
        let first = registry.register_device(conn, Some("dev1")).await;
        let second = registry.register_device(conn, Some("dev1")).await;
        assert_eq!(first.total_devices, 1);
        assert_eq!(second.total_devices, 1);
        assert_eq!(registry.device_count().await, 1);
    }

    #[tokio::test]
    async fn blank_id_falls_back_to_unknown() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();
        let missing = registry.register_device(conn, None).await;
        let blank = registry.register_device(conn, Some("  ")).await;
        assert_eq!(missing.device_id, UNKNOWN_DEVICE);
        assert_eq!(blank.device_id, UNKNOWN_DEVICE);
        assert_eq!(registry.devices().await, vec![UNKNOWN_DEVICE.to_string()]);
    }

    #[tokio::test]
    async fn remove_device_drops_count() {
        let registry = ConnectionRegistry::new();
        let conn = ConnectionId::new();
        registry.register_device(conn, Some("dev1")).await;
        registry.register_device(conn, Some("dev2")).await;
        assert!(registry.remove_device("dev1").await);
        assert!(!registry.remove_device("dev1").await);
        assert_eq!(registry.devices().await, vec!["dev2".to_string()]);
    }

    #[tokio::test]
    async fn join_room_replaces_previous_room() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = attached(&registry, 8).await;

        assert!(registry.join_room(conn, Room::Web).await);
        assert!(registry.join_room(conn, Room::Devices).await);

        assert_eq!(registry.room_of(conn).await, Some(Room::Devices));
        assert!(registry.members_of(Room::Web).await.is_empty());
        assert!(registry.members_of(Room::Devices).await.contains(&conn));
    }

    #[tokio::test]
    async fn join_room_with_queues_welcome_before_room_traffic() {
        let registry = ConnectionRegistry::new();
        let (conn, mut rx) = attached(&registry, 8).await;
        registry.register_device(conn, Some("dev1")).await;

        let joined = registry
            .join_room_with(conn, Room::Web, |devices| async move {
                HubEvent::error(format!("devices={devices}"))
            })
            .await;
        assert!(joined);
        registry.broadcast(Room::Web, HubEvent::data_received()).await;

        let Ok(first) = rx.try_recv() else {
            panic!("welcome should be queued");
        };
        assert_eq!(*first, HubEvent::error("devices=1"));
        let Ok(second) = rx.try_recv() else {
            panic!("room broadcast should follow the welcome");
        };
        assert_eq!(second.event_name(), "data_received");

        let unknown = registry
            .join_room_with(ConnectionId::new(), Room::Web, |_| async {
                panic!("welcome built for unknown connection")
            })
            .await;
        assert!(!unknown);
    }

    #[tokio::test]
    async fn join_room_rejects_unknown_connection() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.join_room(ConnectionId::new(), Room::Web).await);
        assert!(registry.members_of(Room::Web).await.is_empty());
    }

    #[tokio::test]
    async fn broadcast_reaches_room_members_only() {
        let registry = ConnectionRegistry::new();
        let (web, mut web_rx) = attached(&registry, 8).await;
        let (dev, mut dev_rx) = attached(&registry, 8).await;
        let (_idle, mut idle_rx) = attached(&registry, 8).await;
        registry.join_room(web, Room::Web).await;
        registry.join_room(dev, Room::Devices).await;

        let delivered = registry.broadcast(Room::Web, HubEvent::data_received()).await;
        assert_eq!(delivered, 1);

        let Ok(event) = web_rx.try_recv() else {
            panic!("web member should receive the broadcast");
        };
        assert_eq!(event.event_name(), "data_received");
        assert!(dev_rx.try_recv().is_err());
        assert!(idle_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_queue_does_not_block_other_members() {
        let registry = ConnectionRegistry::new();
        let (slow, _slow_rx) = attached(&registry, 1).await;
        let (fast, mut fast_rx) = attached(&registry, 8).await;
        registry.join_room(slow, Room::Web).await;
        registry.join_room(fast, Room::Web).await;

        assert_eq!(registry.broadcast(Room::Web, HubEvent::data_received()).await, 2);
        assert_eq!(registry.broadcast(Room::Web, HubEvent::data_received()).await, 1);

        assert!(fast_rx.try_recv().is_ok());
        assert!(fast_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn detach_releases_sole_claims_only() {
        let registry = ConnectionRegistry::new();
        let (a, _a_rx) = attached(&registry, 8).await;
        let (b, _b_rx) = attached(&registry, 8).await;
        registry.join_room(a, Room::Devices).await;
        registry.register_device(a, Some("dev1")).await;
        registry.register_device(a, Some("shared")).await;
        registry.register_device(b, Some("shared")).await;

        let detached = registry.detach(a).await;
        assert_eq!(detached.room, Some(Room::Devices));
        assert_eq!(detached.released_devices, vec!["dev1".to_string()]);
        assert_eq!(detached.total_devices, 1);
        assert!(registry.members_of(Room::Devices).await.is_empty());
        assert!(!registry.send_to(a, HubEvent::data_received()).await);

        let detached = registry.detach(b).await;
        assert_eq!(detached.released_devices, vec!["shared".to_string()]);
        assert_eq!(registry.device_count().await, 0);
    }

    #[tokio::test]
    async fn send_to_targets_one_connection() {
        let registry = ConnectionRegistry::new();
        let (a, mut a_rx) = attached(&registry, 8).await;
        let (_b, mut b_rx) = attached(&registry, 8).await;

        assert!(registry.send_to(a, HubEvent::error("nope")).await);
        assert!(a_rx.try_recv().is_ok());
        assert!(b_rx.try_recv().is_err());
    }
}
