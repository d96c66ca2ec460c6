//! On-demand aggregate counts over the room directory
//!
//! The aggregator scans a snapshot and never mutates the directory;
//! eventually-consistent counts under concurrent mutation are acceptable.

use crate::error::Result;
use crate::room::directory::RoomDirectory;
use crate::types::{LevelType, RoomStatistics};
use std::collections::HashSet;
use std::sync::Arc;

/// Computes `RoomStatistics` from a directory snapshot
pub struct RoomStatisticsAggregator {
    directory: Arc<RoomDirectory>,
}

impl RoomStatisticsAggregator {
    pub fn new(directory: Arc<RoomDirectory>) -> Self {
        Self { directory }
    }

    pub fn collect(&self) -> Result<RoomStatistics> {
        let rooms = self.directory.get_all_rooms()?;
        let mut stats = RoomStatistics::default();
        let mut distinct_players: HashSet<String> = HashSet::new();

        for room in &rooms {
            if room.members.is_empty() {
                continue;
            }

            stats.room_count += 1;
            if room.slot.level_type == LevelType::Pod {
                stats.players_in_pod_count += room.members.len();
            }

            *stats.per_game.entry(room.game.clone()).or_default() += room.members.len();
            *stats.per_platform.entry(room.platform).or_default() += room.members.len();

            for member in &room.members {
                distinct_players.insert(member.username.clone());
            }
        }

        stats.player_count = distinct_players.len();
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::instance::Room;
    use crate::types::{Identity, NatType, Platform, RoomSlot};

    fn identity(user_id: i64, username: &str, platform: Platform, game: &str) -> Identity {
        Identity {
            user_id,
            username: username.to_string(),
            platform,
            game: game.to_string(),
        }
    }

    #[test]
    fn test_empty_directory_yields_zero_stats() {
        let directory = Arc::new(RoomDirectory::new());
        let aggregator = RoomStatisticsAggregator::new(directory);

        let stats = aggregator.collect().unwrap();
        assert_eq!(stats.player_count, 0);
        assert_eq!(stats.room_count, 0);
        assert!(stats.per_game.is_empty());
    }

    #[test]
    fn test_counts_across_games_and_platforms() {
        let directory = Arc::new(RoomDirectory::new());

        let mut pod_room = Room::new(
            &identity(1, "alice", Platform::Console, "mainline"),
            NatType::Open,
        );
        pod_room.add_member("bob", Some(2));

        let mut level_room = Room::new(
            &identity(3, "carol", Platform::Web, "sequel"),
            NatType::Open,
        );
        level_room.slot = RoomSlot {
            level_type: LevelType::Online,
            level_id: 9,
        };

        directory.add_room(pod_room).unwrap();
        directory.add_room(level_room).unwrap();

        let aggregator = RoomStatisticsAggregator::new(directory);
        let stats = aggregator.collect().unwrap();

        assert_eq!(stats.room_count, 2);
        assert_eq!(stats.player_count, 3);
        // Only the pod room's members count toward the pod total
        assert_eq!(stats.players_in_pod_count, 2);
        assert_eq!(stats.per_game.get("mainline"), Some(&2));
        assert_eq!(stats.per_game.get("sequel"), Some(&1));
        assert_eq!(stats.per_platform.get(&Platform::Console), Some(&2));
        assert_eq!(stats.per_platform.get(&Platform::Web), Some(&1));
    }

    #[test]
    fn test_distinct_player_count_dedupes_stale_members() {
        let directory = Arc::new(RoomDirectory::new());

        // "alice" hosts her own room and lingers as a stale member of bob's
        let alice_room = Room::new(
            &identity(1, "alice", Platform::Console, "mainline"),
            NatType::Open,
        );
        let mut bob_room = Room::new(
            &identity(2, "bob", Platform::Console, "mainline"),
            NatType::Open,
        );
        bob_room.add_member("alice", Some(1));

        directory.add_room(alice_room).unwrap();
        directory.add_room(bob_room).unwrap();

        let aggregator = RoomStatisticsAggregator::new(directory);
        let stats = aggregator.collect().unwrap();
        assert_eq!(stats.player_count, 2);
        assert_eq!(stats.room_count, 2);
    }

    #[test]
    fn test_memberless_rooms_are_skipped() {
        let directory = Arc::new(RoomDirectory::new());
        let mut room = Room::new(
            &identity(1, "alice", Platform::Console, "mainline"),
            NatType::Open,
        );
        room.members.clear();
        directory.add_room(room).unwrap();

        let aggregator = RoomStatisticsAggregator::new(directory);
        let stats = aggregator.collect().unwrap();
        assert_eq!(stats.room_count, 0);
        assert_eq!(stats.player_count, 0);
    }
}
