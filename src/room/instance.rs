//! Room entity and member-list management
//!
//! This module contains the core room logic: host resolution, member
//! bookkeeping, and the liveness rule the reaper enforces.

use crate::types::{
    GameId, Identity, NatType, Platform, RoomId, RoomMood, RoomSlot, RoomState, UserId,
};
use crate::utils::{current_timestamp, generate_room_id, next_room_sequence};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A `(username, optional user id)` pair in a room's member list.
///
/// The user id is `None` for placeholder entries whose username could not be
/// resolved through the user-lookup collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMember {
    pub username: String,
    pub user_id: Option<UserId>,
}

/// An active play session.
///
/// Member order is significant: index 0 is always the host, and later
/// entries appear in join order. Rooms are treated as snapshots by callers;
/// a mutated copy must be written back through `RoomDirectory::update_room`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Process-local creation sequence, used as a deterministic tie-break
    /// when ranking candidate rooms.
    pub sequence: u64,
    pub platform: Platform,
    pub game: GameId,
    pub members: Vec<RoomMember>,
    pub nat_type: NatType,
    pub state: RoomState,
    pub mood: RoomMood,
    pub slot: RoomSlot,
    pub passed_no_join_point: bool,
    pub created_at: DateTime<Utc>,
    pub last_contact: DateTime<Utc>,
}

impl Room {
    /// Create a new room with the caller as sole host
    pub fn new(host: &Identity, nat_type: NatType) -> Self {
        let now = current_timestamp();
        Self {
            id: generate_room_id(),
            sequence: next_room_sequence(),
            platform: host.platform,
            game: host.game.clone(),
            members: vec![RoomMember {
                username: host.username.clone(),
                user_id: Some(host.user_id),
            }],
            nat_type,
            state: RoomState::Idle,
            mood: RoomMood::default(),
            slot: RoomSlot::default(),
            passed_no_join_point: false,
            created_at: now,
            last_contact: now,
        }
    }

    /// The member at index 0, if any
    pub fn host(&self) -> Option<&RoomMember> {
        self.members.first()
    }

    /// Check whether the given caller is this room's host
    pub fn is_hosted_by(&self, identity: &Identity) -> bool {
        match self.host() {
            Some(member) => match member.user_id {
                Some(id) => id == identity.user_id,
                None => member.username == identity.username,
            },
            None => false,
        }
    }

    pub fn contains_user_id(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == Some(user_id))
    }

    pub fn contains_username(&self, username: &str) -> bool {
        self.members.iter().any(|m| m.username == username)
    }

    /// Append a member entry, preserving join order.
    ///
    /// Adding a username that is already present is a no-op; returns whether
    /// the member list changed.
    pub fn add_member(&mut self, username: &str, user_id: Option<UserId>) -> bool {
        if self.contains_username(username) {
            return false;
        }
        self.members.push(RoomMember {
            username: username.to_string(),
            user_id,
        });
        true
    }

    /// Remove the member entry for the given caller, matching by user id
    /// first and falling back to username for placeholder entries.
    pub fn remove_member(&mut self, identity: &Identity) -> Option<RoomMember> {
        let index = self.members.iter().position(|m| {
            m.user_id == Some(identity.user_id)
                || (m.user_id.is_none() && m.username == identity.username)
        })?;
        Some(self.members.remove(index))
    }

    /// Record that a command touched this room
    pub fn touch(&mut self) {
        self.last_contact = current_timestamp();
    }

    /// A room is alive iff it has members and was contacted within the TTL
    pub fn is_alive_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.members.is_empty() && now - self.last_contact < ttl
    }

    /// Liveness check against the current clock
    pub fn is_alive(&self, ttl: Duration) -> bool {
        self.is_alive_at(current_timestamp(), ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelType;

    fn test_identity(user_id: UserId, username: &str) -> Identity {
        Identity {
            user_id,
            username: username.to_string(),
            platform: Platform::Console,
            game: "mainline".to_string(),
        }
    }

    #[test]
    fn test_new_room_has_caller_as_sole_host() {
        let host = test_identity(1, "alice");
        let room = Room::new(&host, NatType::Open);

        assert_eq!(room.members.len(), 1);
        assert!(room.is_hosted_by(&host));
        assert_eq!(room.host().unwrap().username, "alice");
        assert_eq!(room.slot.level_type, LevelType::Pod);
        assert_eq!(room.state, RoomState::Idle);
    }

    #[test]
    fn test_add_member_is_idempotent() {
        let host = test_identity(1, "alice");
        let mut room = Room::new(&host, NatType::Open);

        assert!(room.add_member("bob", Some(2)));
        assert!(!room.add_member("bob", Some(2)));
        assert_eq!(room.members.len(), 2);
    }

    #[test]
    fn test_placeholder_member_has_no_user_id() {
        let host = test_identity(1, "alice");
        let mut room = Room::new(&host, NatType::Open);

        assert!(room.add_member("stranger", None));
        let member = room.members.last().unwrap();
        assert_eq!(member.username, "stranger");
        assert!(member.user_id.is_none());
    }

    #[test]
    fn test_non_host_member_is_not_host() {
        let host = test_identity(1, "alice");
        let joiner = test_identity(2, "bob");
        let mut room = Room::new(&host, NatType::Open);
        room.add_member("bob", Some(2));

        assert!(room.contains_user_id(2));
        assert!(!room.is_hosted_by(&joiner));
    }

    #[test]
    fn test_remove_member_matches_placeholder_by_username() {
        let host = test_identity(1, "alice");
        let mut room = Room::new(&host, NatType::Open);
        room.add_member("bob", None);

        let bob = test_identity(2, "bob");
        let removed = room.remove_member(&bob).unwrap();
        assert_eq!(removed.username, "bob");
        assert_eq!(room.members.len(), 1);
    }

    #[test]
    fn test_liveness_rule() {
        let host = test_identity(1, "alice");
        let ttl = Duration::minutes(3);
        let mut room = Room::new(&host, NatType::Open);

        assert!(room.is_alive(ttl));

        // Stale contact
        room.last_contact = current_timestamp() - Duration::minutes(4);
        assert!(!room.is_alive(ttl));

        // Fresh contact but empty member list
        room.touch();
        room.members.clear();
        assert!(!room.is_alive(ttl));
    }

    #[test]
    fn test_sequence_reflects_creation_order() {
        let a = Room::new(&test_identity(1, "alice"), NatType::Open);
        let b = Room::new(&test_identity(2, "bob"), NatType::Open);
        assert!(b.sequence > a.sequence);
    }
}
