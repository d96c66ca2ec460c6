//! Shared, thread-safe store of all active rooms
//!
//! The directory is the single mutable resource shared by command handlers,
//! the reaper, and the statistics aggregator. Lookups by user, game/platform,
//! and level are derived on read from the primary map so the indices can
//! never diverge from it under concurrent writes.
//!
//! Get-operations return snapshots: a caller mutates its copy and writes it
//! back via `update_room`, which is last-write-wins per room id. No version
//! check is performed; two callers racing on the same room can overwrite
//! each other.

use crate::error::{CoordinatorError, Result};
use crate::room::instance::Room;
use crate::types::{LevelType, Platform, RoomId, UserId};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::RwLock;

/// The shared room store
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: RwLock<HashMap<RoomId, Room>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    fn read_lock(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<RoomId, Room>>> {
        self.rooms
            .read()
            .map_err(|_| CoordinatorError::InternalError {
                message: "Failed to acquire rooms lock".to_string(),
            })
            .map_err(Into::into)
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<RoomId, Room>>> {
        self.rooms
            .write()
            .map_err(|_| CoordinatorError::InternalError {
                message: "Failed to acquire rooms lock".to_string(),
            })
            .map_err(Into::into)
    }

    /// Snapshot of all currently-stored rooms, including ones the reaper has
    /// not caught up with yet
    pub fn get_all_rooms(&self) -> Result<Vec<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms.values().cloned().collect())
    }

    /// Look up a room by id. Memberless rooms have no valid host and are
    /// never returned.
    pub fn get_room_by_uuid(&self, id: RoomId) -> Result<Option<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .get(&id)
            .filter(|room| !room.members.is_empty())
            .cloned())
    }

    /// Resolve the room a user currently belongs to, as host or member,
    /// optionally filtered to a platform/game pair.
    ///
    /// When a user appears in several rooms (their old room going stale
    /// while another host listed them), the most recently created room wins
    /// so resolution stays deterministic.
    pub fn get_room_by_user_id(
        &self,
        user_id: UserId,
        platform: Option<Platform>,
        game: Option<&str>,
    ) -> Result<Option<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| !room.members.is_empty())
            .filter(|room| platform.is_none_or(|p| room.platform == p))
            .filter(|room| game.is_none_or(|g| room.game == g))
            .filter(|room| room.contains_user_id(user_id))
            .max_by_key(|room| room.sequence)
            .cloned())
    }

    /// Same as `get_room_by_user_id` but keyed on username, which also
    /// matches placeholder members that never resolved to a user id
    pub fn get_room_by_username(
        &self,
        username: &str,
        platform: Option<Platform>,
        game: Option<&str>,
    ) -> Result<Option<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| !room.members.is_empty())
            .filter(|room| platform.is_none_or(|p| room.platform == p))
            .filter(|room| game.is_none_or(|g| room.game == g))
            .filter(|room| room.contains_username(username))
            .max_by_key(|room| room.sequence)
            .cloned())
    }

    /// Insert a new room, replacing any prior room with the same id
    pub fn add_room(&self, room: Room) -> Result<()> {
        let mut rooms = self.write_lock()?;
        rooms.insert(room.id, room);
        Ok(())
    }

    /// Delete a room; returns whether it existed
    pub fn remove_room(&self, id: RoomId) -> Result<bool> {
        let mut rooms = self.write_lock()?;
        Ok(rooms.remove(&id).is_some())
    }

    /// Replace semantics: the whole room value is written back under its id,
    /// last write wins
    pub fn update_room(&self, room: Room) -> Result<()> {
        let mut rooms = self.write_lock()?;
        rooms.insert(room.id, room);
        Ok(())
    }

    /// Remove a room only if it is no longer alive.
    ///
    /// The liveness re-check happens under the write lock, so a room that
    /// was touched between the reaper's snapshot and this call survives.
    pub fn remove_room_if_dead(&self, id: RoomId, ttl: Duration) -> Result<bool> {
        let mut rooms = self.write_lock()?;
        match rooms.get(&id) {
            Some(room) if !room.is_alive(ttl) => {
                rooms.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Count players across all rooms running the given game
    pub fn get_players_in_game(&self, game: &str) -> Result<usize> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| room.game == game)
            .map(|room| room.members.len())
            .sum())
    }

    /// Count players across all rooms on the given platform
    pub fn get_players_on_platform(&self, platform: Platform) -> Result<usize> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| room.platform == platform)
            .map(|room| room.members.len())
            .sum())
    }

    /// All rooms currently playing the given level
    pub fn get_rooms_in_level(&self, level_type: LevelType, level_id: i64) -> Result<Vec<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| !room.members.is_empty())
            .filter(|room| room.slot.level_type == level_type && room.slot.level_id == level_id)
            .cloned()
            .collect())
    }

    /// All rooms for a (game, platform) pair
    pub fn get_rooms_by_game_and_platform(
        &self,
        game: &str,
        platform: Platform,
    ) -> Result<Vec<Room>> {
        let rooms = self.read_lock()?;
        Ok(rooms
            .values()
            .filter(|room| !room.members.is_empty())
            .filter(|room| room.game == game && room.platform == platform)
            .cloned()
            .collect())
    }

    /// Number of stored rooms, memberless ones included
    pub fn room_count(&self) -> Result<usize> {
        let rooms = self.read_lock()?;
        Ok(rooms.len())
    }
}
