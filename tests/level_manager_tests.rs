//! Integration tests for multi-depth level management and transitions.

use delve::{
    ConnectivityValidator, GenerationConfig, LevelManager, StairDirection, Theme, TileType,
};

/// Regression for the historical stack-overflow bug class: a deep cave on
/// a large map must flood fill without recursion-depth failures.
#[test]
fn test_deep_large_map_generation() {
    let config = GenerationConfig {
        default_width: 100,
        default_height: 100,
        max_depth: 30,
        ..Default::default()
    };
    let mut manager = LevelManager::new(config, 90210).unwrap();
    let level = manager.get_or_generate(30).unwrap();

    // Depth 30 with the default cave frequency resolves to a cave.
    assert_eq!(level.theme(), Theme::Cave);
    assert_eq!(level.grid().width(), 100);
    assert_eq!(level.grid().height(), 100);
    assert!(ConnectivityValidator::is_fully_connected(
        level.grid(),
        level.spawn()
    ));
}

/// Walking the full depth range produces valid stairs everywhere.
#[test]
fn test_stairs_across_all_depths() {
    let config = GenerationConfig {
        default_width: 60,
        default_height: 40,
        max_depth: 12,
        ..Default::default()
    };
    let mut manager = LevelManager::new(config, 5150).unwrap();

    for depth in 1..=12u32 {
        let level = manager.get_or_generate(depth).unwrap();

        if depth == 1 {
            assert!(level.stairs_up().is_none(), "depth 1 has up stairs");
        } else {
            let up = level.stairs_up().expect("missing up stairs");
            assert_eq!(level.grid().get(up), TileType::StairsUp);
            assert_eq!(level.grid().count_tiles(|t| t == TileType::StairsUp), 1);
        }

        if depth == 12 {
            assert!(level.stairs_down().is_none(), "terminal depth has down stairs");
        } else {
            let down = level.stairs_down().expect("missing down stairs");
            assert_eq!(level.grid().get(down), TileType::StairsDown);
            assert_eq!(level.grid().count_tiles(|t| t == TileType::StairsDown), 1);
        }
    }
}

/// Descending and climbing back lands beside the matching stairs each time.
#[test]
fn test_round_trip_transitions() {
    let mut manager = LevelManager::new(GenerationConfig::default(), 1999).unwrap();
    assert_eq!(manager.current_depth(), 1);

    let arrival = manager.transition_to(2, StairDirection::Down).unwrap();
    assert_eq!(manager.current_depth(), 2);
    let below = manager.level(2).unwrap();
    let up = below.stairs_up().unwrap();
    assert!(arrival.manhattan_distance(up) <= 1);
    assert!(!below.is_blocked(arrival.x, arrival.y));

    let back = manager.transition_to(1, StairDirection::Up).unwrap();
    assert_eq!(manager.current_depth(), 1);
    let town = manager.level(1).unwrap();
    let down = town.stairs_down().unwrap();
    assert!(back.manhattan_distance(down) <= 1);
    assert!(!town.is_blocked(back.x, back.y));
}

/// A revisited depth serves the cached level rather than regenerating;
/// gameplay mutations survive the round trip.
#[test]
fn test_cache_survives_transitions() {
    let mut manager = LevelManager::new(GenerationConfig::default(), 333).unwrap();

    manager.transition_to(2, StairDirection::Down).unwrap();
    let fingerprint = manager.level(2).unwrap().grid().clone();

    manager.transition_to(1, StairDirection::Up).unwrap();
    manager.transition_to(2, StairDirection::Down).unwrap();

    assert_eq!(manager.level(2).unwrap().grid(), &fingerprint);
}

/// Sessions with independent managers do not share cache state.
#[test]
fn test_sessions_are_independent() {
    let config = GenerationConfig::default();
    let mut a = LevelManager::new(config.clone(), 77).unwrap();
    let mut b = LevelManager::new(config, 78).unwrap();

    a.get_or_generate(2).unwrap();
    assert!(b.level(2).is_none());
    b.get_or_generate(3).unwrap();
    assert!(a.level(3).is_none());
}

/// The theme schedule holds over a long descent.
#[test]
fn test_theme_schedule() {
    let config = GenerationConfig {
        max_depth: 15,
        cave_frequency: 5,
        ..Default::default()
    };
    let mut manager = LevelManager::new(config, 31).unwrap();
    let expectations = [
        (1u32, Theme::Town),
        (2, Theme::Dungeon),
        (4, Theme::Dungeon),
        (5, Theme::Cave),
        (10, Theme::Cave),
        (11, Theme::Dungeon),
    ];
    for (depth, theme) in expectations {
        assert_eq!(
            manager.get_or_generate(depth).unwrap().theme(),
            theme,
            "depth {depth}"
        );
    }
}
