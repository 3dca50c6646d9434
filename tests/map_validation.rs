use proptest::prelude::*;
use std::path::PathBuf;
use warzone_board_game::board::Board;
use warzone_board_game::error::GameError;
use warzone_board_game::game_config::{JsonMapLoader, MapLoader};

fn maps_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("maps")
}

/// `size` territories in a bidirectional ring, split into `continents`
/// consecutive runs.
fn ring(size: usize, continents: usize) -> Board {
    let mut board = Board::new("ring");
    for c in 0..continents {
        board.add_continent(&format!("C{}", c), 1).unwrap();
    }
    let run = size / continents;
    for i in 0..size {
        let continent = (i / run).min(continents - 1);
        board
            .add_territory(&format!("T{}", i), &format!("C{}", continent))
            .unwrap();
    }
    for i in 0..size {
        let next = (i + 1) % size;
        board.add_adjacency(&format!("T{}", i), &format!("T{}", next)).unwrap();
        board.add_adjacency(&format!("T{}", next), &format!("T{}", i)).unwrap();
    }
    board
}

fn cut(board: &mut Board, size: usize, at: usize) {
    let next = (at + 1) % size;
    board.remove_adjacency(&format!("T{}", at), &format!("T{}", next)).unwrap();
    board.remove_adjacency(&format!("T{}", next), &format!("T{}", at)).unwrap();
}

#[test]
fn bundled_map_is_valid() {
    let loader = JsonMapLoader::new(maps_dir());
    let board = loader.load("europe").unwrap();
    assert_eq!(board.territories.len(), 11);
    assert_eq!(board.continents.len(), 3);
    board.validate().unwrap();
}

#[test]
fn one_way_edges_count_for_reachability_only_forwards() {
    let mut board = Board::new("arrow");
    board.add_continent("Line", 1).unwrap();
    board.add_territory("First", "Line").unwrap();
    board.add_territory("Second", "Line").unwrap();
    board.add_adjacency("Second", "First").unwrap();
    board.add_adjacency("First", "Second").unwrap();
    assert!(board.validate().is_ok());

    board.remove_adjacency("First", "Second").unwrap();
    board.add_territory("Third", "Line").unwrap();
    board.add_adjacency("First", "Third").unwrap();
    board.add_adjacency("Third", "First").unwrap();
    // Second points at First, but nothing points back at Second.
    let error = board.validate().unwrap_err();
    assert!(matches!(error, GameError::InvalidMap(_)));
    assert_eq!(error.to_string(), "Second in continent Line is not reachable");
}

#[test]
fn removing_a_continent_then_validating_reports_the_gap() {
    let loader = JsonMapLoader::new(maps_dir());
    let mut board = loader.load("europe").unwrap();
    board.remove_continent("Northern").unwrap();
    assert!(board.find_territory("Finland").is_none());
    assert!(board.validate().is_ok());
    board.remove_territory("Poland").unwrap();
    assert!(board.validate().is_ok());
    board.remove_territory("Ukraine").unwrap();
    // Russia's remaining neighbours were Poland, Ukraine and Finland.
    let error = board.validate().unwrap_err();
    assert_eq!(error.to_string(), "Russia does not possess any neighbour, hence isn't reachable!");
}

proptest! {
    #[test]
    fn rings_are_always_valid(size in 3usize..40, continents in 1usize..4) {
        prop_assume!(size >= continents * 2);
        prop_assert!(ring(size, continents).validate().is_ok());
    }

    #[test]
    fn a_single_cut_keeps_a_one_continent_ring_valid(size in 3usize..40, at in 0usize..40) {
        let mut board = ring(size, 1);
        cut(&mut board, size, at % size);
        prop_assert!(board.validate().is_ok());
    }

    #[test]
    fn two_cuts_always_invalidate(size in 4usize..40, a in 0usize..40, b in 0usize..40, continents in 1usize..4) {
        prop_assume!(size >= continents * 2);
        let (a, b) = (a % size, b % size);
        prop_assume!(a != b);
        let mut board = ring(size, continents);
        cut(&mut board, size, a);
        cut(&mut board, size, b);
        prop_assert!(matches!(board.validate(), Err(GameError::InvalidMap(_))));
    }

    #[test]
    fn removing_territories_leaves_no_dangling_ids(size in 3usize..30, victim in 0usize..30) {
        let mut board = ring(size, 1);
        let name = format!("T{}", victim % size);
        let id = board.territory_id(&name).unwrap();
        board.remove_territory(&name).unwrap();
        prop_assert!(board.territories.values().all(|t| !t.is_adjacent(id)));
        prop_assert!(board.continents.values().all(|c| !c.territories.contains(&id)));
    }
}
