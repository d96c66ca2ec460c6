//! Utility functions for the room coordination service

use crate::types::RoomId;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static NEXT_ROOM_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique room ID.
///
/// Version-7 UUIDs embed a millisecond timestamp in their high bits, so ids
/// sort by creation time.
pub fn generate_room_id() -> RoomId {
    Uuid::now_v7()
}

/// Hand out the next room creation sequence number.
///
/// Sequence numbers are process-local and strictly increasing; they give
/// candidate ranking a deterministic tie-break in insertion order.
pub fn next_room_sequence() -> u64 {
    NEXT_ROOM_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}
