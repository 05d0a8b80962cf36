//! Placement legality: pure queries over a board.
//!
//! The set-returning queries drive spot pickers; the single-coordinate
//! predicates back both those queries and an independent re-check at commit
//! time, so a stale or tampered spot set can never smuggle an illegal
//! placement onto the authoritative board.

use crate::board::{Board, PlayerId};
use crate::hex::{EdgeCoord, VertexCoord};
use std::collections::{HashSet, VecDeque};

/// Whether a settlement may be placed on `vertex`. With an `owner` the
/// vertex must also touch one of that player's roads; `None` waives the
/// connectivity clause (each player's first settlement of the game).
pub fn is_settlement_spot_valid(
    board: &Board,
    vertex: VertexCoord,
    owner: Option<PlayerId>,
) -> bool {
    if !board.contains_vertex(&vertex) || board.settlement(&vertex).is_some() {
        return false;
    }
    // Distance rule: all three neighboring vertices must be unoccupied.
    if vertex
        .adjacent_vertices()
        .iter()
        .any(|n| board.settlement(n).is_some())
    {
        return false;
    }
    match owner {
        Some(player) => vertex
            .touching_edges()
            .iter()
            .any(|e| board.road_owner(e) == Some(player)),
        None => true,
    }
}

/// Every vertex where a settlement may be placed.
pub fn valid_settlement_spots(board: &Board, owner: Option<PlayerId>) -> HashSet<VertexCoord> {
    board
        .vertex_universe()
        .iter()
        .copied()
        .filter(|&v| is_settlement_spot_valid(board, v, owner))
        .collect()
}

/// Whether `owner` may place a road on `edge`: the edge is free and one of
/// its endpoints connects to the player's network. An opposing settlement on
/// an endpoint seals that endpoint.
pub fn is_road_spot_valid(board: &Board, edge: EdgeCoord, owner: PlayerId) -> bool {
    if !board.contains_edge(&edge) || board.road(&edge).is_some() {
        return false;
    }
    edge.endpoints()
        .iter()
        .any(|&vertex| match board.settlement_owner(&vertex) {
            Some(p) if p == owner => true,
            Some(_) => false,
            None => vertex
                .touching_edges()
                .iter()
                .any(|e| *e != edge && board.road_owner(e) == Some(owner)),
        })
}

/// Whether `edge` touches the given settlement vertex. Used during initial
/// placement, where the road must pin to the settlement just placed rather
/// than the player's wider network.
pub fn is_road_connected_to_settlement(
    board: &Board,
    edge: EdgeCoord,
    vertex: VertexCoord,
) -> bool {
    board.settlement(&vertex).is_some() && edge.endpoints().contains(&vertex)
}

/// Every edge reachable from the player's road network, found by walking
/// outward from the seed vertices (all of the player's settlements when
/// `seeds` is `None`).
///
/// An edge owned by the player is traversed through; a free edge is a result
/// but is not traversed past; a vertex holding another player's settlement
/// prunes traversal entirely, since roads cannot be built through an
/// opposing settlement.
pub fn valid_road_spots(
    board: &Board,
    owner: PlayerId,
    seeds: Option<&[VertexCoord]>,
) -> HashSet<EdgeCoord> {
    let seeds: Vec<VertexCoord> = match seeds {
        Some(list) => list.to_vec(),
        None => board
            .settlements()
            .filter(|s| s.owner == owner)
            .map(|s| s.coord)
            .collect(),
    };

    let mut spots = HashSet::new();
    let mut visited: HashSet<VertexCoord> = seeds.iter().copied().collect();
    let mut frontier: VecDeque<VertexCoord> = seeds.into_iter().collect();

    while let Some(vertex) = frontier.pop_front() {
        if board.settlement_owner(&vertex).is_some_and(|p| p != owner) {
            continue;
        }
        for neighbor in vertex.adjacent_vertices() {
            let edge = EdgeCoord::between(vertex, neighbor);
            if !board.contains_edge(&edge) {
                continue;
            }
            match board.road_owner(&edge) {
                None => {
                    spots.insert(edge);
                }
                Some(p) if p == owner => {
                    if visited.insert(neighbor) {
                        frontier.push_back(neighbor);
                    }
                }
                Some(_) => {}
            }
        }
    }
    spots
}

/// The player's upgradeable settlements. Cities are upgrades of existing
/// settlements, not new coordinates.
pub fn valid_city_spots(board: &Board, owner: PlayerId) -> HashSet<VertexCoord> {
    board
        .settlements()
        .filter(|s| s.owner == owner && !s.is_city())
        .map(|s| s.coord)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BuildingLevel, Road, Settlement, TerrainKind, Tile};
    use crate::generator::board_coords;
    use crate::hex::HexCoord;

    fn seven_tile_board() -> Board {
        let tiles = board_coords(1)
            .into_iter()
            .map(|coord| Tile::new(coord, TerrainKind::Pasture, None));
        Board::from_tiles(tiles, HexCoord::origin())
    }

    #[test]
    fn test_every_vertex_is_open_on_an_empty_board() {
        let board = seven_tile_board();
        let spots = valid_settlement_spots(&board, None);
        assert_eq!(spots.len(), board.vertex_universe().len());
    }

    #[test]
    fn test_distance_rule_blocks_neighboring_vertices() {
        let mut board = seven_tile_board();
        let vertex = VertexCoord::new(1, 0, 0);
        board.update_settlement(Settlement::new(vertex, 0));

        let spots = valid_settlement_spots(&board, None);
        assert!(!spots.contains(&vertex));
        for neighbor in vertex.adjacent_vertices() {
            assert!(!spots.contains(&neighbor));
            assert!(!is_settlement_spot_valid(&board, neighbor, None));
        }

        // Nothing in the result is adjacent to any occupied vertex.
        for spot in &spots {
            assert!(!spot.adjacent_vertices().contains(&vertex));
        }
    }

    #[test]
    fn test_settlement_spots_for_a_player_require_a_road() {
        let mut board = seven_tile_board();
        board.update_settlement(Settlement::new(VertexCoord::new(1, 0, 0), 0));

        // No roads yet: nowhere to extend to.
        assert!(valid_settlement_spots(&board, Some(0)).is_empty());

        // A road two edges out opens exactly its far vertices.
        board.update_road(Road::new(EdgeCoord::new(1, -1, 0), 0));
        board.update_road(Road::new(EdgeCoord::new(1, -2, 1), 0));
        let spots = valid_settlement_spots(&board, Some(0));
        assert!(spots.contains(&VertexCoord::new(1, -1, 1)));
        // The road endpoint next to the settlement fails the distance rule.
        assert!(!spots.contains(&VertexCoord::new(0, -1, 0)));
    }

    #[test]
    fn test_road_spots_start_from_the_settlement() {
        let mut board = seven_tile_board();
        let vertex = VertexCoord::new(1, 0, 0);
        board.update_settlement(Settlement::new(vertex, 0));

        let spots = valid_road_spots(&board, 0, None);
        let expected: HashSet<EdgeCoord> = vertex.touching_edges().into_iter().collect();
        assert_eq!(spots, expected);
    }

    #[test]
    fn test_road_spots_chain_along_the_network() {
        let mut board = seven_tile_board();
        let vertex = VertexCoord::new(1, 0, 0);
        board.update_settlement(Settlement::new(vertex, 0));
        board.update_road(Road::new(EdgeCoord::new(1, -1, 0), 0));

        let spots = valid_road_spots(&board, 0, None);

        // Reachable through the owned road, two hops from the settlement.
        assert!(spots.contains(&EdgeCoord::new(1, -2, 1)));
        assert!(spots.contains(&EdgeCoord::new(0, -1, 1)));
        // Never an edge that is already taken.
        assert!(!spots.contains(&EdgeCoord::new(1, -1, 0)));
        for road in board.roads() {
            assert!(!spots.contains(&road.coord));
        }
    }

    #[test]
    fn test_opposing_settlement_prunes_the_search() {
        let mut board = seven_tile_board();
        board.update_settlement(Settlement::new(VertexCoord::new(1, 0, 0), 0));
        board.update_road(Road::new(EdgeCoord::new(1, -1, 0), 0));
        // Opponent settles on the far end of the road.
        board.update_settlement(Settlement::new(VertexCoord::new(0, -1, 0), 1));

        let spots = valid_road_spots(&board, 0, None);
        assert!(!spots.contains(&EdgeCoord::new(1, -2, 1)));
        assert!(!spots.contains(&EdgeCoord::new(0, -1, 1)));
        assert!(!is_road_spot_valid(&board, EdgeCoord::new(1, -2, 1), 0));

        // The player's other two settlement edges are still open.
        assert!(spots.contains(&EdgeCoord::new(1, 0, -1)));
        assert!(spots.contains(&EdgeCoord::new(2, -1, -1)));
    }

    #[test]
    fn test_explicit_seeds_override_the_settlement_scan() {
        let mut board = seven_tile_board();
        board.update_settlement(Settlement::new(VertexCoord::new(1, 0, 0), 0));
        board.update_settlement(Settlement::new(VertexCoord::new(-1, 0, 0), 0));

        let seeds = [VertexCoord::new(1, 0, 0)];
        let spots = valid_road_spots(&board, 0, Some(&seeds));

        // Only edges around the seeded settlement are reachable.
        assert!(spots.contains(&EdgeCoord::new(1, -1, 0)));
        assert!(!spots.contains(&EdgeCoord::new(-1, 1, 0)));
    }

    #[test]
    fn test_city_spots_are_the_players_settlements() {
        let mut board = seven_tile_board();
        let mine = VertexCoord::new(1, 0, 0);
        let theirs = VertexCoord::new(-1, 0, 0);
        board.update_settlement(Settlement::new(mine, 0));
        board.update_settlement(Settlement::new(theirs, 1));

        let spots = valid_city_spots(&board, 0);
        assert_eq!(spots, HashSet::from([mine]));

        // Already-upgraded settlements are no longer candidates.
        let mut upgraded = board.settlement(&mine).unwrap().clone();
        upgraded.level = BuildingLevel::City;
        board.update_settlement(upgraded);
        assert!(valid_city_spots(&board, 0).is_empty());
    }

    #[test]
    fn test_pinned_road_check() {
        let mut board = seven_tile_board();
        let vertex = VertexCoord::new(1, 0, 0);
        board.update_settlement(Settlement::new(vertex, 0));

        assert!(is_road_connected_to_settlement(
            &board,
            EdgeCoord::new(1, -1, 0),
            vertex
        ));
        // An edge elsewhere on the board does not touch the settlement.
        assert!(!is_road_connected_to_settlement(
            &board,
            EdgeCoord::new(-1, 1, 0),
            vertex
        ));
        // No settlement at the vertex at all.
        assert!(!is_road_connected_to_settlement(
            &board,
            EdgeCoord::new(-1, 1, 0),
            VertexCoord::new(-1, 0, 0)
        ));
    }
}
