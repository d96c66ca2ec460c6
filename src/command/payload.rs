//! Wire payload shared by all matchmaking commands
//!
//! Every field is optional at the serde level; each handler decides which
//! ones it requires. The accessors here reconcile the legacy duplicate
//! fields (`Slot`/`Slots`, `HostMood`/`Mood`) and validate element counts
//! before any handler mutates shared state.

use crate::error::{CoordinatorError, Result};
use crate::types::{NatType, RoomMood, RoomSlot, RoomState};
use serde::{Deserialize, Serialize};

/// JSON body of an inbound matchmaking command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SerializedRoomData {
    pub player: Option<String>,
    pub players: Option<Vec<String>>,
    pub reservations: Option<Vec<i64>>,
    /// Despite the plural name, holds at most one value per room
    pub nat_type: Option<Vec<u8>>,
    /// Legacy duplicate of `Slots`; wins when both are present
    pub slot: Option<Vec<i64>>,
    pub slots: Option<Vec<i64>>,
    pub room_state: Option<i64>,
    /// Wins over `Mood` when both are present
    pub host_mood: Option<u8>,
    pub mood: Option<u8>,
    pub passed_no_join_point: Option<bool>,
    pub locations: Option<Vec<String>>,
    pub language: Option<u8>,
    pub build_version: Option<i64>,
    pub search: Option<String>,
}

impl SerializedRoomData {
    /// The requested slot, if either legacy field is present.
    ///
    /// Whichever field is used must contain exactly two integers,
    /// `[level type, level id]`.
    pub fn requested_slot(&self) -> Result<Option<RoomSlot>> {
        let raw = match self.slot.as_ref().or(self.slots.as_ref()) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        if raw.len() != 2 {
            return Err(CoordinatorError::InvalidPayload {
                reason: format!("Slots must contain exactly 2 integers, got {}", raw.len()),
            }
            .into());
        }

        let level_type = raw[0]
            .try_into()
            .map_err(|v| CoordinatorError::InvalidPayload {
                reason: format!("Unknown level type: {}", v),
            })?;

        Ok(Some(RoomSlot {
            level_type,
            level_id: raw[1],
        }))
    }

    /// NAT value when present; the array may hold zero or one element
    pub fn nat_type(&self) -> Result<Option<NatType>> {
        let raw = match self.nat_type.as_ref() {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match raw.as_slice() {
            [] => Ok(None),
            [value] => {
                let nat =
                    (*value)
                        .try_into()
                        .map_err(|v| CoordinatorError::InvalidPayload {
                            reason: format!("Unknown NAT type: {}", v),
                        })?;
                Ok(Some(nat))
            }
            _ => Err(CoordinatorError::InvalidPayload {
                reason: format!("NatType must contain at most 1 element, got {}", raw.len()),
            }
            .into()),
        }
    }

    /// NAT value for commands that require it (exactly one element)
    pub fn required_nat_type(&self) -> Result<NatType> {
        match self.nat_type.as_deref() {
            Some([value]) => {
                (*value)
                    .try_into()
                    .map_err(|v| CoordinatorError::InvalidPayload {
                        reason: format!("Unknown NAT type: {}", v),
                    })
                    .map_err(Into::into)
            }
            Some(other) => Err(CoordinatorError::InvalidPayload {
                reason: format!("NatType must contain exactly 1 element, got {}", other.len()),
            }
            .into()),
            None => Err(CoordinatorError::InvalidPayload {
                reason: "NatType field is required".to_string(),
            }
            .into()),
        }
    }

    /// Mood with `HostMood` taking precedence over the legacy `Mood` field
    pub fn mood(&self) -> Result<Option<RoomMood>> {
        match self.host_mood.or(self.mood) {
            Some(raw) => {
                let mood = raw
                    .try_into()
                    .map_err(|v| CoordinatorError::InvalidPayload {
                        reason: format!("Unknown room mood: {}", v),
                    })?;
                Ok(Some(mood))
            }
            None => Ok(None),
        }
    }

    pub fn room_state(&self) -> Result<Option<RoomState>> {
        match self.room_state {
            Some(raw) => {
                let state = raw
                    .try_into()
                    .map_err(|v| CoordinatorError::InvalidPayload {
                        reason: format!("Unknown room state: {}", v),
                    })?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LevelType;

    #[test]
    fn test_deserialize_pascal_case_fields() {
        let payload: SerializedRoomData = serde_json::from_str(
            r#"{
                "Players": ["alice", "bob"],
                "NatType": [1],
                "Slots": [1, 42],
                "RoomState": 2,
                "HostMood": 3,
                "PassedNoJoinPoint": true,
                "BuildVersion": 17
            }"#,
        )
        .unwrap();

        assert_eq!(payload.players.as_ref().unwrap().len(), 2);
        assert_eq!(payload.nat_type().unwrap(), Some(NatType::Open));
        assert_eq!(payload.room_state().unwrap(), Some(RoomState::DivingIn));
        assert_eq!(payload.passed_no_join_point, Some(true));
        assert_eq!(payload.build_version, Some(17));
    }

    #[test]
    fn test_empty_body_is_all_none() {
        let payload: SerializedRoomData = serde_json::from_str("{}").unwrap();
        assert!(payload.players.is_none());
        assert!(payload.requested_slot().unwrap().is_none());
        assert!(payload.nat_type().unwrap().is_none());
        assert!(payload.mood().unwrap().is_none());
    }

    #[test]
    fn test_slot_wins_over_slots() {
        let payload = SerializedRoomData {
            slot: Some(vec![1, 10]),
            slots: Some(vec![2, 20]),
            ..Default::default()
        };

        let slot = payload.requested_slot().unwrap().unwrap();
        assert_eq!(slot.level_type, LevelType::Online);
        assert_eq!(slot.level_id, 10);
    }

    #[test]
    fn test_slots_require_exactly_two_integers() {
        let payload = SerializedRoomData {
            slots: Some(vec![1]),
            ..Default::default()
        };
        assert!(payload.requested_slot().is_err());

        let payload = SerializedRoomData {
            slots: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert!(payload.requested_slot().is_err());
    }

    #[test]
    fn test_host_mood_wins_over_mood() {
        let payload = SerializedRoomData {
            host_mood: Some(3),
            mood: Some(0),
            ..Default::default()
        };
        assert_eq!(payload.mood().unwrap(), Some(RoomMood::AllowingAll));

        let payload = SerializedRoomData {
            mood: Some(0),
            ..Default::default()
        };
        assert_eq!(payload.mood().unwrap(), Some(RoomMood::RejectingAll));
    }

    #[test]
    fn test_required_nat_rejects_wrong_element_counts() {
        let missing = SerializedRoomData::default();
        assert!(missing.required_nat_type().is_err());

        let empty = SerializedRoomData {
            nat_type: Some(vec![]),
            ..Default::default()
        };
        assert!(empty.required_nat_type().is_err());

        let two = SerializedRoomData {
            nat_type: Some(vec![1, 2]),
            ..Default::default()
        };
        assert!(two.required_nat_type().is_err());

        let one = SerializedRoomData {
            nat_type: Some(vec![3]),
            ..Default::default()
        };
        assert_eq!(one.required_nat_type().unwrap(), NatType::Strict);
    }
}
