//! Integration tests for the Frontier board engine.
//!
//! These exercise full flows across the generator, rules, and simulator: the
//! initial-placement turn, speculative staging with rollback, and the atomic
//! commit back onto the authoritative board.

use frontier_core::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn standard_board(seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(&BoardConfig::standard(), &mut rng).expect("standard config must generate")
}

/// Deterministically pick a spot from a staged step.
fn first_vertex(step: &NextStep) -> VertexCoord {
    match step {
        NextStep::Settlement(set) | NextStep::City(set) => *set.iter().min().unwrap(),
        NextStep::Road(_) => panic!("expected a vertex step"),
    }
}

fn first_edge(step: &NextStep) -> EdgeCoord {
    match step {
        NextStep::Road(set) => *set.iter().min().unwrap(),
        _ => panic!("expected a road step"),
    }
}

#[test]
fn test_standard_generation_is_deterministic() {
    let a = standard_board(42);
    let b = standard_board(42);

    let mut tiles_a: Vec<_> = a.tiles().map(|t| (t.coord, t.terrain, t.token)).collect();
    let mut tiles_b: Vec<_> = b.tiles().map(|t| (t.coord, t.terrain, t.token)).collect();
    tiles_a.sort();
    tiles_b.sort();

    assert_eq!(tiles_a, tiles_b);
    assert_eq!(a.robber(), b.robber());
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn test_initial_placement_turn_end_to_end() {
    let board = standard_board(42);
    let mut sim = BuildSimulator::new(&board, 0, BuildMode::InitialPlacement);

    // Step 1: a settlement anywhere on the open board.
    let step = sim.next_valid_spots().expect("sequence has just begun");
    assert_eq!(step.kind(), BuildKind::Settlement);
    assert_eq!(step.len(), 54, "every vertex of an empty board is open");
    let vertex = first_vertex(step);
    assert!(sim.build(BuildAction::Settlement(vertex)));

    // Step 2: a road pinned to that settlement.
    let step = sim.next_valid_spots().expect("a road is still owed");
    assert_eq!(step.kind(), BuildKind::Road);
    let edge = first_edge(step);
    assert!(edge.endpoints().contains(&vertex), "road pins to the settlement");
    assert!(sim.build(BuildAction::Road(edge)));

    // Step 3: the sequence is complete.
    assert!(sim.next_valid_spots().is_none());

    // Unwind both actions; the private board returns to pristine.
    assert!(sim.rollback());
    assert!(sim.rollback());
    assert!(!sim.rollback());
    assert_eq!(sim.peek(), None);
    assert_eq!(sim.board().settlements().count(), 0);
    assert_eq!(sim.board().roads().count(), 0);
}

#[test]
fn test_commit_applies_the_sequence_atomically() {
    let mut authoritative = standard_board(42);
    let mut sim = BuildSimulator::new(&authoritative, 0, BuildMode::InitialPlacement);

    let vertex = first_vertex(sim.next_valid_spots().unwrap());
    assert!(sim.build(BuildAction::Settlement(vertex)));
    let edge = first_edge(sim.next_valid_spots().unwrap());
    assert!(sim.build(BuildAction::Road(edge)));

    let actions = sim.commit(&mut authoritative).expect("sequence must commit");
    assert_eq!(actions.len(), 2);
    assert_eq!(authoritative.settlement_owner(&vertex), Some(0));
    assert_eq!(authoritative.road_owner(&edge), Some(0));
}

#[test]
fn test_commit_rejects_a_stale_sequence() {
    let mut authoritative = standard_board(42);
    let mut sim = BuildSimulator::new(&authoritative, 0, BuildMode::InitialPlacement);

    let vertex = first_vertex(sim.next_valid_spots().unwrap());
    assert!(sim.build(BuildAction::Settlement(vertex)));
    let edge = first_edge(sim.next_valid_spots().unwrap());
    assert!(sim.build(BuildAction::Road(edge)));

    // Meanwhile another player grabs the same vertex on the real board.
    authoritative.update_settlement(Settlement::new(vertex, 1));

    let err = sim.commit(&mut authoritative).unwrap_err();
    assert_eq!(
        err,
        CommitError::Rejected {
            action: BuildAction::Settlement(vertex)
        }
    );
    // The authoritative board kept only the opponent's settlement.
    assert_eq!(authoritative.settlement_owner(&vertex), Some(1));
    assert_eq!(authoritative.roads().count(), 0);
}

#[test]
fn test_two_players_alternate_initial_placements() {
    let mut board = standard_board(7);

    for player in [0u8, 1, 0, 1] {
        let mut sim = BuildSimulator::new(&board, player, BuildMode::InitialPlacement);
        let vertex = first_vertex(sim.next_valid_spots().unwrap());
        assert!(sim.build(BuildAction::Settlement(vertex)));
        let edge = first_edge(sim.next_valid_spots().unwrap());
        assert!(sim.build(BuildAction::Road(edge)));
        sim.commit(&mut board).expect("placement must commit");
    }

    assert_eq!(board.settlements().count(), 4);
    assert_eq!(board.roads().count(), 4);

    // The distance rule held across all four placements.
    for settlement in board.settlements() {
        for neighbor in settlement.coord.adjacent_vertices() {
            assert_eq!(board.settlement_owner(&neighbor), None);
        }
    }
}

#[test]
fn test_road_grant_extends_the_network() {
    let mut board = standard_board(9);

    // Settle a player first.
    let mut sim = BuildSimulator::new(&board, 0, BuildMode::InitialPlacement);
    let vertex = first_vertex(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Settlement(vertex));
    let edge = first_edge(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Road(edge));
    sim.commit(&mut board).unwrap();

    // A two-road grant, staged and committed in one step.
    let mut grant = BuildSimulator::new(&board, 0, BuildMode::RoadOnly { limit: 2 });
    for _ in 0..2 {
        let step = grant.next_valid_spots().expect("grant roads remain");
        let edge = first_edge(step);
        assert!(grant.build(BuildAction::Road(edge)));
    }
    assert!(grant.next_valid_spots().is_none());
    grant.commit(&mut board).expect("grant must commit");

    assert_eq!(board.roads().count(), 3);
    for road in board.roads() {
        assert_eq!(road.owner, 0);
    }
}

#[test]
fn test_city_upgrade_flow() {
    let mut board = standard_board(13);

    let mut sim = BuildSimulator::new(&board, 2, BuildMode::InitialPlacement);
    let vertex = first_vertex(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Settlement(vertex));
    let edge = first_edge(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Road(edge));
    sim.commit(&mut board).unwrap();

    let mut upgrade = BuildSimulator::new(&board, 2, BuildMode::CityOnly { limit: 1 });
    let step = upgrade.next_valid_spots().unwrap();
    assert_eq!(step.kind(), BuildKind::City);
    assert_eq!(first_vertex(step), vertex);
    assert!(upgrade.build(BuildAction::City(vertex)));
    upgrade.commit(&mut board).unwrap();

    let settlement = board.settlement(&vertex).unwrap();
    assert!(settlement.is_city());
    assert_eq!(settlement.owner, 2);
}

#[test]
fn test_board_survives_the_wire_format() {
    let mut board = standard_board(21);

    let mut sim = BuildSimulator::new(&board, 3, BuildMode::InitialPlacement);
    let vertex = first_vertex(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Settlement(vertex));
    let edge = first_edge(sim.next_valid_spots().unwrap());
    sim.build(BuildAction::Road(edge));
    sim.commit(&mut board).unwrap();

    let json = board.to_json().unwrap();
    let restored = Board::from_json(&json).unwrap();

    assert_eq!(restored.tile_count(), 19);
    assert_eq!(restored.settlement_owner(&vertex), Some(3));
    assert_eq!(restored.road_owner(&edge), Some(3));
    assert_eq!(restored.robber(), board.robber());

    // The rebuilt universes still back the rules.
    assert_eq!(restored.vertex_universe().len(), 54);
    assert!(!rules::is_settlement_spot_valid(&restored, vertex, None));
}

#[test]
fn test_rule_queries_agree_with_commit_checks() {
    let mut board = standard_board(17);

    // Two settled players.
    for player in [0u8, 1] {
        let mut sim = BuildSimulator::new(&board, player, BuildMode::InitialPlacement);
        let vertex = first_vertex(sim.next_valid_spots().unwrap());
        sim.build(BuildAction::Settlement(vertex));
        let edge = first_edge(sim.next_valid_spots().unwrap());
        sim.build(BuildAction::Road(edge));
        sim.commit(&mut board).unwrap();
    }

    // Every BFS road spot passes the single-coordinate re-check.
    for edge in rules::valid_road_spots(&board, 0, None) {
        assert!(rules::is_road_spot_valid(&board, edge, 0));
        assert_eq!(board.road_owner(&edge), None);
    }

    // Every settlement spot passes its re-check too.
    for vertex in rules::valid_settlement_spots(&board, Some(0)) {
        assert!(rules::is_settlement_spot_valid(&board, vertex, Some(0)));
    }
}
