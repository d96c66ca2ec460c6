//! Matchmaking command handlers
//!
//! Each handler follows the same shape: resolve-or-create the caller's room,
//! validate the payload fully, apply fields, persist through the directory.
//! Validation happens before any mutation, so a rejected command leaves the
//! directory untouched.

use crate::command::payload::SerializedRoomData;
use crate::error::{CoordinatorError, Result};
use crate::room::directory::RoomDirectory;
use crate::room::instance::Room;
use crate::types::{Identity, NatType, RoomMood};
use crate::user::UserLookup;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared dependencies handed to every handler
#[derive(Clone)]
pub struct CommandContext {
    pub directory: Arc<RoomDirectory>,
    pub users: Arc<dyn UserLookup>,
    /// Rooms older than this are not offered as join candidates
    pub room_ttl: Duration,
}

impl CommandContext {
    pub fn new(directory: Arc<RoomDirectory>, users: Arc<dyn UserLookup>, room_ttl: Duration) -> Self {
        Self {
            directory,
            users,
            room_ttl,
        }
    }

    /// Resolve the room the caller currently belongs to, as host or member,
    /// for their (platform, game) pair.
    ///
    /// A caller another host enlisted before they ever authenticated exists
    /// only as a placeholder entry with no user id, so a miss on the user-id
    /// index falls back to the username index.
    fn resolve_room(&self, identity: &Identity) -> Result<Option<Room>> {
        if let Some(room) = self.directory.get_room_by_user_id(
            identity.user_id,
            Some(identity.platform),
            Some(&identity.game),
        )? {
            return Ok(Some(room));
        }

        self.directory.get_room_by_username(
            &identity.username,
            Some(identity.platform),
            Some(&identity.game),
        )
    }

    /// Resolve the caller's room, creating and inserting a fresh one with
    /// the caller as sole host if none exists
    fn resolve_or_create_room(&self, identity: &Identity, nat_type: NatType) -> Result<Room> {
        if let Some(room) = self.resolve_room(identity)? {
            return Ok(room);
        }

        let room = Room::new(identity, nat_type);
        info!(
            "Created room {} for '{}' ({}, {})",
            room.id, identity.username, identity.game, identity.platform
        );
        self.directory.add_room(room.clone())?;
        Ok(room)
    }
}

/// Apply the optional state/slot/mood/no-join-point fields common to
/// `CreateRoom` and `UpdateRoomData`. The payload accessors must have been
/// validated by the caller beforehand.
fn apply_room_fields(room: &mut Room, payload: &SerializedRoomData) -> Result<()> {
    if let Some(state) = payload.room_state()? {
        room.state = state;
    }
    if let Some(slot) = payload.requested_slot()? {
        room.slot = slot;
    }
    if let Some(mood) = payload.mood()? {
        room.mood = mood;
    }
    if let Some(passed) = payload.passed_no_join_point {
        room.passed_no_join_point = passed;
    }
    Ok(())
}

/// `CreateRoom`: create-or-reuse the caller's room, splitting the caller out
/// of someone else's room when they are a non-host member (host migration).
pub async fn create_room(
    ctx: &CommandContext,
    identity: &Identity,
    payload: &SerializedRoomData,
) -> Result<()> {
    // Validate everything up front so a bad payload never mutates state.
    payload.requested_slot()?;
    payload.mood()?;
    payload.room_state()?;
    let nat_type = payload.nat_type()?.unwrap_or_default();

    let mut room = ctx.resolve_or_create_room(identity, nat_type)?;

    if !room.is_hosted_by(identity) {
        // Room splitting: the caller becomes sole host of a brand-new room.
        // The old room keeps a stale member entry until its host refreshes
        // the list; membership lookups resolve to the newer room meanwhile.
        info!(
            "Splitting '{}' out of room {} into a new room",
            identity.username, room.id
        );
        room = Room::new(identity, nat_type);
        ctx.directory.add_room(room.clone())?;
    }

    room.touch();
    if let Some(nat) = payload.nat_type()? {
        room.nat_type = nat;
    }
    apply_room_fields(&mut room, payload)?;

    ctx.directory.update_room(room)?;
    Ok(())
}

/// `UpdateRoomData`: same field application as `CreateRoom`, but host-only.
/// The NAT array must carry exactly one value, and a caller who is not the
/// host of their resolved room is rejected instead of being split out.
pub async fn update_room_data(
    ctx: &CommandContext,
    identity: &Identity,
    payload: &SerializedRoomData,
) -> Result<()> {
    let nat_type = payload.required_nat_type()?;
    payload.requested_slot()?;
    payload.mood()?;
    payload.room_state()?;

    let mut room = ctx.resolve_or_create_room(identity, nat_type)?;

    if !room.is_hosted_by(identity) {
        return Err(CoordinatorError::NotRoomHost {
            room_id: room.id.to_string(),
        }
        .into());
    }

    room.touch();
    room.nat_type = nat_type;
    apply_room_fields(&mut room, payload)?;

    ctx.directory.update_room(room)?;
    Ok(())
}

/// `UpdatePlayersInRoom`: refresh the caller's member list from the
/// `Players` field, resolving usernames through the user-lookup
/// collaborator. Unresolvable names become placeholder entries, duplicates
/// are no-ops, and members the host no longer reports are dropped. The host
/// entry itself always survives.
pub async fn update_players_in_room(
    ctx: &CommandContext,
    identity: &Identity,
    payload: &SerializedRoomData,
) -> Result<()> {
    let players = payload
        .players
        .as_ref()
        .ok_or_else(|| CoordinatorError::InvalidPayload {
            reason: "Players field is required".to_string(),
        })?;

    let mut room = ctx.resolve_or_create_room(identity, payload.nat_type()?.unwrap_or_default())?;

    // Stale members not in the reported list are aged out here.
    let host_username = room.host().map(|h| h.username.clone());
    room.members.retain(|member| {
        Some(&member.username) == host_username.as_ref() || players.contains(&member.username)
    });

    for username in players {
        if room.contains_username(username) {
            continue;
        }
        match ctx.users.get_user_by_username(username).await? {
            Some(user) => {
                room.add_member(username, Some(user.id));
            }
            None => {
                debug!(
                    "Username '{}' did not resolve, adding placeholder member",
                    username
                );
                room.add_member(username, None);
            }
        }
    }

    room.touch();
    ctx.directory.update_room(room)?;
    Ok(())
}

/// `FindBestRoom`: confirm that at least one joinable room exists for the
/// caller. Candidates are ranked by descending mood (most permissive first),
/// ties broken by creation order; the client queries and joins separately.
pub async fn find_best_room(
    ctx: &CommandContext,
    identity: &Identity,
    payload: &SerializedRoomData,
) -> Result<()> {
    let mut own_room = ctx
        .resolve_room(identity)?
        .ok_or(CoordinatorError::NoActiveRoom)?;

    // The searcher reports their own NAT in the payload; fall back to what
    // their room already recorded.
    let caller_nat = payload.nat_type()?.unwrap_or(own_room.nat_type);

    let mut candidates: Vec<Room> = ctx
        .directory
        .get_rooms_by_game_and_platform(&identity.game, identity.platform)?
        .into_iter()
        .filter(|room| room.id != own_room.id)
        .filter(|room| room.is_alive(ctx.room_ttl))
        .filter(|room| room.mood != RoomMood::RejectingAll)
        .filter(|room| !room.passed_no_join_point)
        .filter(|room| nat_compatible(caller_nat, room.nat_type))
        .collect();

    candidates.sort_by(|a, b| b.mood.cmp(&a.mood).then(a.sequence.cmp(&b.sequence)));

    // Searching counts as contact, keeping the waiting room alive while the
    // client polls.
    own_room.touch();
    ctx.directory.update_room(own_room)?;

    if candidates.is_empty() {
        return Err(CoordinatorError::NoCandidateRooms.into());
    }

    debug!(
        "Found {} candidate rooms for '{}', best: {}",
        candidates.len(),
        identity.username,
        candidates[0].id
    );
    Ok(())
}

/// Strict hosts are only reachable by Open clients
fn nat_compatible(caller: NatType, host: NatType) -> bool {
    match host {
        NatType::Strict => caller == NatType::Open,
        NatType::Open | NatType::Moderate => true,
    }
}
