//! Performance benchmarks for room directory operations

use chrono::Duration;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use room_coordinator::room::{Room, RoomDirectory, RoomStatisticsAggregator};
use room_coordinator::types::{Identity, NatType, Platform};
use std::sync::Arc;

fn identity(user_id: i64, username: String, platform: Platform, game: &str) -> Identity {
    Identity {
        user_id,
        username,
        platform,
        game: game.to_string(),
    }
}

fn populate_directory(room_count: i64) -> Arc<RoomDirectory> {
    let directory = Arc::new(RoomDirectory::new());
    let platforms = [
        Platform::Console,
        Platform::Handheld,
        Platform::Portable,
        Platform::Web,
    ];
    let games = ["mainline", "spinoff", "legacy"];

    for i in 0..room_count {
        let host = identity(
            i,
            format!("player-{}", i),
            platforms[(i % 4) as usize],
            games[(i % 3) as usize],
        );
        let room = Room::new(&host, NatType::Open);
        directory.add_room(room).unwrap();
    }

    directory
}

fn bench_user_resolution(c: &mut Criterion) {
    let directory = populate_directory(1000);

    c.bench_function("resolve_user_in_1000_rooms", |b| {
        b.iter(|| {
            directory
                .get_room_by_user_id(black_box(500), Some(Platform::Console), Some("mainline"))
                .unwrap()
        })
    });
}

fn bench_candidate_filtering(c: &mut Criterion) {
    let directory = populate_directory(1000);

    c.bench_function("candidates_by_game_and_platform_1000_rooms", |b| {
        b.iter(|| {
            directory
                .get_rooms_by_game_and_platform(black_box("mainline"), Platform::Console)
                .unwrap()
        })
    });
}

fn bench_statistics_collection(c: &mut Criterion) {
    let directory = populate_directory(1000);
    let aggregator = RoomStatisticsAggregator::new(directory);

    c.bench_function("collect_statistics_1000_rooms", |b| {
        b.iter(|| aggregator.collect().unwrap())
    });
}

fn bench_room_churn(c: &mut Criterion) {
    c.bench_function("add_and_remove_room", |b| {
        let directory = RoomDirectory::new();
        let host = identity(1, "player-1".to_string(), Platform::Console, "mainline");

        b.iter(|| {
            let room = Room::new(&host, NatType::Open);
            let id = room.id;
            directory.add_room(room).unwrap();
            directory.remove_room(black_box(id)).unwrap();
        })
    });
}

fn bench_liveness_sweep(c: &mut Criterion) {
    let directory = populate_directory(1000);
    let ttl = Duration::minutes(3);

    c.bench_function("liveness_scan_1000_rooms", |b| {
        b.iter(|| {
            directory
                .get_all_rooms()
                .unwrap()
                .iter()
                .filter(|room| room.is_alive(black_box(ttl)))
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_user_resolution,
    bench_candidate_filtering,
    bench_statistics_collection,
    bench_room_churn,
    bench_liveness_sweep
);
criterion_main!(benches);
