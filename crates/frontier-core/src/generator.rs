//! Deterministic, seeded board generation.
//!
//! Terrain comes from a shuffled pool dealt over the tiles in canonical
//! enumeration order. Number tokens are dealt along a spiral that starts at a
//! randomly chosen board corner and winds inward to the center, skipping
//! deserts; walking the fixed token sequence along that spiral is how the
//! physical rulebook keeps the high-probability tokens apart without an
//! explicit adjacency check.
//!
//! Generation is a pure function of the config and the injected RNG: the same
//! seed reproduces the same board, which is what replays and regression
//! fixtures rely on.

use crate::board::{Board, TerrainKind, Tile};
use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Fatal generation failures. A mismatched pool is never truncated or
/// wrapped; generation fails outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("terrain pool holds {pool} entries but the board has {tiles} tiles")]
    TerrainPoolMismatch { pool: usize, tiles: usize },
    #[error("token list holds {tokens} entries but {slots} tiles take tokens")]
    TokenCountMismatch { tokens: usize, slots: usize },
}

/// Inputs to board generation. The RNG is injected separately so callers
/// control seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Rings around the center tile; 2 gives the standard 19-tile board.
    pub radius: i32,
    /// Terrain distribution. The list order is part of the config: the pool
    /// is flattened in this order before shuffling, so reordering entries
    /// changes what a given seed produces.
    pub terrain_counts: Vec<(TerrainKind, usize)>,
    /// Number tokens in the canonical order the spiral deals them out.
    pub number_tokens: Vec<u8>,
}

impl BoardConfig {
    /// The standard board: 19 tiles, rulebook terrain distribution, rulebook
    /// token sequence.
    pub fn standard() -> Self {
        Self {
            radius: 2,
            terrain_counts: vec![
                (TerrainKind::Forest, 4),
                (TerrainKind::Pasture, 4),
                (TerrainKind::Field, 4),
                (TerrainKind::Hill, 3),
                (TerrainKind::Mountain, 3),
                (TerrainKind::Desert, 1),
            ],
            number_tokens: vec![5, 2, 6, 3, 8, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11],
        }
    }
}

/// Every tile coordinate of a board with the given radius: the center first,
/// then each ring outward. This is the canonical enumeration order.
pub fn board_coords(radius: i32) -> Vec<HexCoord> {
    assert!(radius >= 0, "board radius cannot be negative");
    let mut coords = vec![HexCoord::origin()];
    for ring in 1..=radius {
        coords.extend(ring_coords(ring, 0));
    }
    coords
}

/// The `6 * radius` coordinates of one ring, walked in a fixed rotational
/// direction starting from the given corner (0..6).
fn ring_coords(radius: i32, corner: usize) -> Vec<HexCoord> {
    let mut coords = Vec::with_capacity(6 * radius as usize);
    let mut cursor = HexCoord::origin().offset(HexCoord::DIRECTIONS[corner], radius);
    for side in 0..6 {
        let step = HexCoord::DIRECTIONS[(corner + side + 2) % 6];
        for _ in 0..radius {
            coords.push(cursor);
            cursor = cursor.offset(step, 1);
        }
    }
    coords
}

/// Spiral traversal: the outermost ring first, starting at the given corner,
/// winding inward ring by ring and finishing on the center tile. Visits every
/// board tile exactly once.
fn spiral_coords(radius: i32, corner: usize) -> Vec<HexCoord> {
    let mut coords = Vec::new();
    for ring in (1..=radius).rev() {
        coords.extend(ring_coords(ring, corner));
    }
    coords.push(HexCoord::origin());
    coords
}

/// Generate a board from the config using the injected RNG.
pub fn generate<R: Rng>(config: &BoardConfig, rng: &mut R) -> Result<Board, GenerateError> {
    let coords = board_coords(config.radius);

    // Flatten the terrain distribution into a pool and deal one entry per
    // tile in enumeration order.
    let mut pool: Vec<TerrainKind> = config
        .terrain_counts
        .iter()
        .flat_map(|&(kind, count)| std::iter::repeat(kind).take(count))
        .collect();
    if pool.len() != coords.len() {
        return Err(GenerateError::TerrainPoolMismatch {
            pool: pool.len(),
            tiles: coords.len(),
        });
    }
    pool.shuffle(rng);
    let mut terrain: HashMap<HexCoord, TerrainKind> =
        coords.iter().copied().zip(pool).collect();

    let desert_count = terrain.values().filter(|k| k.is_desert()).count();
    let slots = coords.len() - desert_count;
    if config.number_tokens.len() != slots {
        return Err(GenerateError::TokenCountMismatch {
            tokens: config.number_tokens.len(),
            slots,
        });
    }

    // Deal number tokens along a spiral from a random corner. Deserts take no
    // token; the first one seen becomes the robber's starting tile.
    let corner = rng.gen_range(0..6);
    debug!(corner, radius = config.radius, "dealing tokens along spiral");
    let mut tokens = config.number_tokens.iter().copied();
    let mut tiles = Vec::with_capacity(coords.len());
    let mut robber = None;
    for coord in spiral_coords(config.radius, corner) {
        let kind = terrain
            .remove(&coord)
            .expect("spiral visits every board tile exactly once");
        let token = if kind.is_desert() {
            robber.get_or_insert(coord);
            None
        } else {
            // Cannot run dry: the counts were checked up front.
            tokens.next()
        };
        tiles.push(Tile::new(coord, kind, token));
    }

    // A desert-free distribution parks the robber on the center tile.
    let robber = robber.unwrap_or(HexCoord::origin());
    Ok(Board::from_tiles(tiles, robber))
}
