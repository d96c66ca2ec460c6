//! Common types used throughout the room coordination service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for rooms
pub type RoomId = Uuid;

/// Unique identifier for users (assigned by the upstream user service)
pub type UserId = i64;

/// Identifier for the game title a session belongs to
pub type GameId = String;

/// Platform a client is connecting from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Console,
    Handheld,
    Portable,
    Web,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Console => write!(f, "Console"),
            Platform::Handheld => write!(f, "Handheld"),
            Platform::Portable => write!(f, "Portable"),
            Platform::Web => write!(f, "Web"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(Platform::Console),
            "handheld" => Ok(Platform::Handheld),
            "portable" => Ok(Platform::Portable),
            "web" => Ok(Platform::Web),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Network reachability classification of a host.
///
/// Strict hosts can only be joined by Open clients; that constraint is
/// applied when ranking candidate rooms, not by the directory itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NatType {
    #[default]
    Open,
    Moderate,
    Strict,
}

impl TryFrom<u8> for NatType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(NatType::Open),
            2 => Ok(NatType::Moderate),
            3 => Ok(NatType::Strict),
            other => Err(other),
        }
    }
}

/// Client-reported activity phase of a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    #[default]
    Idle,
    Loading,
    DivingIn,
    WaitingForPlayers,
}

impl TryFrom<i64> for RoomState {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoomState::Idle),
            1 => Ok(RoomState::Loading),
            2 => Ok(RoomState::DivingIn),
            3 => Ok(RoomState::WaitingForPlayers),
            other => Err(other),
        }
    }
}

/// The host's current join-acceptance policy.
///
/// Declaration order matters: `Ord` ranks `AllowingAll` highest, which is
/// what candidate ranking relies on (most permissive rooms first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomMood {
    RejectingAll,
    RejectingAllButFriends,
    RejectingOnlyFriends,
    AllowingAll,
}

impl Default for RoomMood {
    fn default() -> Self {
        RoomMood::AllowingAll
    }
}

impl TryFrom<u8> for RoomMood {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RoomMood::RejectingAll),
            1 => Ok(RoomMood::RejectingAllButFriends),
            2 => Ok(RoomMood::RejectingOnlyFriends),
            3 => Ok(RoomMood::AllowingAll),
            other => Err(other),
        }
    }
}

/// Kind of level a room is currently associated with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelType {
    Story,
    Online,
    Moon,
    /// The lobby state every room starts in
    #[default]
    Pod,
    Dlc,
}

impl TryFrom<i64> for LevelType {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LevelType::Story),
            1 => Ok(LevelType::Online),
            2 => Ok(LevelType::Moon),
            3 => Ok(LevelType::Pod),
            4 => Ok(LevelType::Dlc),
            other => Err(other),
        }
    }
}

/// The level/slot a room is currently playing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSlot {
    pub level_type: LevelType,
    pub level_id: i64,
}

/// Authenticated caller identity, supplied by the upstream transport layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
    pub platform: Platform,
    pub game: GameId,
}

/// A user record resolved through the external user-lookup collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Aggregate counts over the room directory, recomputed on demand
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoomStatistics {
    pub player_count: usize,
    pub players_in_pod_count: usize,
    pub room_count: usize,
    pub per_game: HashMap<GameId, usize>,
    pub per_platform: HashMap<Platform, usize>,
}
