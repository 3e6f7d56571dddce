//! Room membership registry and per-room message log.
//!
//! The registry maintains bidirectional mappings: client → current room and
//! room → ordered members. A client is in exactly one room at a time; every
//! connection starts in room 0 until its first explicit join. Rooms come
//! into existence when first referenced and are never destroyed.
//!
//! All mutations are serialized under one internal mutex. Readers take
//! snapshots under the lock and iterate outside it, so broadcast fan-out
//! never holds the registry up.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Stable identifier for a connected client, assigned at accept.
pub type ClientId = u64;

/// Room identifier chosen by clients at join time.
pub type RoomId = i64;

/// The implicit room every client occupies before an explicit join.
pub const LOBBY_ROOM: RoomId = 0;

#[derive(Debug, Default)]
struct RoomState {
    /// Client → current room.
    client_rooms: HashMap<ClientId, RoomId>,
    /// Room → ordered members, unique per room.
    room_members: HashMap<RoomId, Vec<ClientId>>,
    /// Room → append-only broadcast log (in-process observation only).
    message_log: HashMap<RoomId, Vec<String>>,
}

impl RoomState {
    fn remove_member(&mut self, room: RoomId, client: ClientId) {
        if let Some(members) = self.room_members.get_mut(&room) {
            members.retain(|&m| m != client);
        }
    }
}

/// Registry of room membership, self-synchronized.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    state: Mutex<RoomState>,
}

impl RoomRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place a newly accepted client in the lobby room.
    pub fn register(&self, client: ClientId) {
        self.join(client, LOBBY_ROOM);
    }

    /// Move a client into `room`, leaving its current room first.
    ///
    /// Joining the room the client is already in leaves membership
    /// unchanged (one entry). Returns the room the client came from, if it
    /// was registered.
    pub fn join(&self, client: ClientId, room: RoomId) -> Option<RoomId> {
        let mut state = self.lock();

        let old_room = state.client_rooms.get(&client).copied();
        if let Some(old) = old_room {
            if old != room {
                state.remove_member(old, client);
            }
        }

        state.client_rooms.insert(client, room);
        let members = state.room_members.entry(room).or_default();
        if !members.contains(&client) {
            members.push(client);
        }

        old_room
    }

    /// Remove a client from its room and from the registry entirely.
    ///
    /// Called on disconnect. Returns the room it occupied, if any.
    pub fn leave(&self, client: ClientId) -> Option<RoomId> {
        let mut state = self.lock();

        let room = state.client_rooms.remove(&client)?;
        state.remove_member(room, client);
        Some(room)
    }

    /// The room a client currently occupies.
    #[must_use]
    pub fn room_of(&self, client: ClientId) -> Option<RoomId> {
        self.lock().client_rooms.get(&client).copied()
    }

    /// Snapshot of a room's members, in join order.
    #[must_use]
    pub fn members(&self, room: RoomId) -> Vec<ClientId> {
        self.lock().room_members.get(&room).cloned().unwrap_or_default()
    }

    /// Snapshot of the members of `client`'s current room.
    ///
    /// An unregistered client reads the lobby room, matching where its
    /// traffic would have been routed.
    #[must_use]
    pub fn members_of(&self, client: ClientId) -> Vec<ClientId> {
        let state = self.lock();
        let room = state.client_rooms.get(&client).copied().unwrap_or(LOBBY_ROOM);
        state.room_members.get(&room).cloned().unwrap_or_default()
    }

    /// Append a broadcast message to the sender's room log and snapshot
    /// the room's members for fan-out.
    ///
    /// The append and the snapshot happen under one lock acquisition, so
    /// the log order matches the order recipients observe from any single
    /// sender. The snapshot includes the sender; fan-out excludes it.
    pub fn record_broadcast(&self, sender: ClientId, message: &str) -> Vec<ClientId> {
        let mut state = self.lock();

        let room = state.client_rooms.get(&sender).copied().unwrap_or(LOBBY_ROOM);
        state.message_log.entry(room).or_default().push(message.to_string());
        state.room_members.get(&room).cloned().unwrap_or_default()
    }

    /// Snapshot of a room's broadcast log.
    #[must_use]
    pub fn room_log(&self, room: RoomId) -> Vec<String> {
        self.lock().message_log.get(&room).cloned().unwrap_or_default()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.lock().client_rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_places_client_in_lobby() {
        let registry = RoomRegistry::new();

        registry.register(1);

        assert_eq!(registry.room_of(1), Some(LOBBY_ROOM));
        assert_eq!(registry.members(LOBBY_ROOM), vec![1]);
    }

    #[test]
    fn join_moves_between_rooms() {
        let registry = RoomRegistry::new();

        registry.register(1);
        let old = registry.join(1, 7);

        assert_eq!(old, Some(LOBBY_ROOM));
        assert_eq!(registry.room_of(1), Some(7));
        assert!(registry.members(LOBBY_ROOM).is_empty());
        assert_eq!(registry.members(7), vec![1]);
    }

    #[test]
    fn join_is_idempotent() {
        let registry = RoomRegistry::new();

        registry.join(1, 7);
        registry.join(1, 7);

        assert_eq!(registry.members(7), vec![1]);
    }

    #[test]
    fn members_keep_join_order() {
        let registry = RoomRegistry::new();

        registry.join(3, 7);
        registry.join(1, 7);
        registry.join(2, 7);

        assert_eq!(registry.members(7), vec![3, 1, 2]);
    }

    #[test]
    fn leave_removes_from_both_maps() {
        let registry = RoomRegistry::new();

        registry.join(1, 7);
        registry.join(2, 7);

        assert_eq!(registry.leave(1), Some(7));
        assert_eq!(registry.room_of(1), None);
        assert_eq!(registry.members(7), vec![2]);
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn leave_unknown_client_is_noop() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.leave(99), None);
    }

    #[test]
    fn record_broadcast_appends_and_snapshots() {
        let registry = RoomRegistry::new();

        registry.join(1, 7);
        registry.join(2, 7);
        registry.join(3, 4);

        let members = registry.record_broadcast(1, "CLIENT alice: hello");

        assert_eq!(members, vec![1, 2]);
        assert_eq!(registry.room_log(7), vec!["CLIENT alice: hello".to_string()]);
        assert!(registry.room_log(4).is_empty());
    }

    #[test]
    fn unregistered_sender_broadcasts_to_lobby() {
        let registry = RoomRegistry::new();

        registry.register(2);
        let members = registry.record_broadcast(99, "CLIENT ghost: boo");

        assert_eq!(members, vec![2]);
        assert_eq!(registry.room_log(LOBBY_ROOM).len(), 1);
    }
}
