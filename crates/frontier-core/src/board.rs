//! Board state: tiles, roads, settlements, trading posts, and the robber.
//!
//! Collections are keyed by coordinate; since every coordinate serializes as
//! its canonical `"q,r,s"` id, a serialized board is a set of id-keyed maps.
//! The tile set is fixed once a board is constructed (only a tile's terrain
//! or token may be overridden afterwards), so the derived vertex and edge
//! universes are computed once and memoized.
//!
//! The board itself stays permissive: it stores what it is told. Placement
//! legality lives in [`crate::rules`], and the mutation entry points here are
//! reserved for the turn controller that owns the board.

use crate::hex::{EdgeCoord, HexCoord, VertexCoord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Player identifier (0-3 for a 4-player game).
pub type PlayerId = u8;

/// Terrain of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Forest,
    Hill,
    Pasture,
    Field,
    Mountain,
    Desert,
}

impl TerrainKind {
    /// All terrain kinds.
    pub const ALL: [TerrainKind; 6] = [
        TerrainKind::Forest,
        TerrainKind::Hill,
        TerrainKind::Pasture,
        TerrainKind::Field,
        TerrainKind::Mountain,
        TerrainKind::Desert,
    ];

    /// The resource this terrain yields, if any.
    pub fn resource(self) -> Option<Resource> {
        match self {
            TerrainKind::Forest => Some(Resource::Lumber),
            TerrainKind::Hill => Some(Resource::Brick),
            TerrainKind::Pasture => Some(Resource::Wool),
            TerrainKind::Field => Some(Resource::Grain),
            TerrainKind::Mountain => Some(Resource::Ore),
            TerrainKind::Desert => None,
        }
    }

    pub fn is_desert(self) -> bool {
        matches!(self, TerrainKind::Desert)
    }
}

/// Resource types, one per productive terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Lumber,
    Brick,
    Wool,
    Grain,
    Ore,
}

impl Resource {
    /// All resource types.
    pub const ALL: [Resource; 5] = [
        Resource::Lumber,
        Resource::Brick,
        Resource::Wool,
        Resource::Grain,
        Resource::Ore,
    ];
}

/// A single tile on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coord: HexCoord,
    pub terrain: TerrainKind,
    /// Production number token. Deserts never carry one.
    pub token: Option<u8>,
}

impl Tile {
    /// Create a tile. Panics if a desert is given a number token; that is a
    /// programmer error.
    pub fn new(coord: HexCoord, terrain: TerrainKind, token: Option<u8>) -> Self {
        assert!(
            !(terrain.is_desert() && token.is_some()),
            "desert tiles never carry a number token"
        );
        Self {
            coord,
            terrain,
            token,
        }
    }

    /// Canonical id of this tile.
    pub fn id(&self) -> String {
        self.coord.to_string()
    }
}

/// Building level of a settlement spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingLevel {
    Settlement,
    City,
}

/// A settlement (or its city upgrade) on a vertex. Created once, upgraded in
/// place, never re-owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub coord: VertexCoord,
    pub owner: PlayerId,
    pub level: BuildingLevel,
}

impl Settlement {
    pub fn new(coord: VertexCoord, owner: PlayerId) -> Self {
        Self {
            coord,
            owner,
            level: BuildingLevel::Settlement,
        }
    }

    pub fn is_city(&self) -> bool {
        self.level == BuildingLevel::City
    }

    /// Canonical id of this settlement's vertex.
    pub fn id(&self) -> String {
        self.coord.to_string()
    }
}

/// A road on an edge. Created once; the owner never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub coord: EdgeCoord,
    pub owner: PlayerId,
}

impl Road {
    pub fn new(coord: EdgeCoord, owner: PlayerId) -> Self {
        Self { coord, owner }
    }

    /// Canonical id of this road's edge.
    pub fn id(&self) -> String {
        self.coord.to_string()
    }
}

/// A trading post anchored on a coastal tile. Post generation is an open
/// extension point; the board only stores and serves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingPost {
    pub coord: HexCoord,
    /// Which of the tile's six vertex directions connect to the post.
    pub vertex_indices: Vec<u8>,
    /// Exchange ratio per resource (3 for a 3:1 post).
    pub trades: HashMap<Resource, u8>,
}

/// The complete board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    tiles: HashMap<HexCoord, Tile>,
    roads: HashMap<EdgeCoord, Road>,
    settlements: HashMap<VertexCoord, Settlement>,
    trading_posts: HashMap<HexCoord, TradingPost>,
    robber: HexCoord,
    #[serde(skip)]
    vertex_universe: OnceLock<HashSet<VertexCoord>>,
    #[serde(skip)]
    edge_universe: OnceLock<HashSet<EdgeCoord>>,
}

impl Board {
    /// Build a board from its tiles and the robber's starting tile. Panics if
    /// the robber is not on one of the tiles.
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>, robber: HexCoord) -> Self {
        let tiles: HashMap<HexCoord, Tile> = tiles.into_iter().map(|t| (t.coord, t)).collect();
        assert!(
            tiles.contains_key(&robber),
            "robber must start on a board tile"
        );
        Self {
            tiles,
            roads: HashMap::new(),
            settlements: HashMap::new(),
            trading_posts: HashMap::new(),
            robber,
            vertex_universe: OnceLock::new(),
            edge_universe: OnceLock::new(),
        }
    }

    // ==================== Queries ====================

    pub fn tile(&self, coord: &HexCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn road(&self, coord: &EdgeCoord) -> Option<&Road> {
        self.roads.get(coord)
    }

    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    pub fn settlement(&self, coord: &VertexCoord) -> Option<&Settlement> {
        self.settlements.get(coord)
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.settlements.values()
    }

    pub fn trading_post(&self, coord: &HexCoord) -> Option<&TradingPost> {
        self.trading_posts.get(coord)
    }

    pub fn trading_posts(&self) -> impl Iterator<Item = &TradingPost> {
        self.trading_posts.values()
    }

    /// The tile the robber currently occupies.
    pub fn robber(&self) -> HexCoord {
        self.robber
    }

    /// Owner of the settlement at a vertex, if any.
    pub fn settlement_owner(&self, coord: &VertexCoord) -> Option<PlayerId> {
        self.settlements.get(coord).map(|s| s.owner)
    }

    /// Owner of the road on an edge, if any.
    pub fn road_owner(&self, coord: &EdgeCoord) -> Option<PlayerId> {
        self.roads.get(coord).map(|r| r.owner)
    }

    /// The tiles around a vertex that actually exist on this board.
    pub fn tiles_at_vertex(&self, vertex: &VertexCoord) -> Vec<&Tile> {
        vertex
            .adjacent_hexes()
            .iter()
            .filter_map(|h| self.tiles.get(h))
            .collect()
    }

    /// Every vertex enumerated by some tile of this board. Computed once;
    /// the tile set never grows, so no invalidation is needed.
    pub fn vertex_universe(&self) -> &HashSet<VertexCoord> {
        self.vertex_universe
            .get_or_init(|| self.tiles.keys().flat_map(|t| t.vertices()).collect())
    }

    /// Every edge enumerated by some tile of this board.
    pub fn edge_universe(&self) -> &HashSet<EdgeCoord> {
        self.edge_universe
            .get_or_init(|| self.tiles.keys().flat_map(|t| t.edges()).collect())
    }

    /// Whether a vertex is part of this board.
    pub fn contains_vertex(&self, coord: &VertexCoord) -> bool {
        self.vertex_universe().contains(coord)
    }

    /// Whether an edge is part of this board.
    pub fn contains_edge(&self, coord: &EdgeCoord) -> bool {
        self.edge_universe().contains(coord)
    }

    // ==================== Mutations ====================
    //
    // Reserved for the owning controller; everything below trusts its caller
    // to have validated the placement through `crate::rules`.

    /// Override the terrain or token of an existing tile. Returns false when
    /// no tile exists at the coordinate; the tile set itself never grows.
    pub fn update_tile(&mut self, tile: Tile) -> bool {
        match self.tiles.get_mut(&tile.coord) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    pub fn update_road(&mut self, road: Road) {
        self.roads.insert(road.coord, road);
    }

    pub fn update_settlement(&mut self, settlement: Settlement) {
        self.settlements.insert(settlement.coord, settlement);
    }

    pub fn remove_road(&mut self, coord: &EdgeCoord) -> Option<Road> {
        self.roads.remove(coord)
    }

    pub fn remove_settlement(&mut self, coord: &VertexCoord) -> Option<Settlement> {
        self.settlements.remove(coord)
    }

    pub fn update_trading_post(&mut self, post: TradingPost) {
        self.trading_posts.insert(post.coord, post);
    }

    /// Move the robber. Returns false (and leaves it in place) when the
    /// target is not a board tile.
    pub fn move_robber(&mut self, to: HexCoord) -> bool {
        if !self.tiles.contains_key(&to) {
            return false;
        }
        self.robber = to;
        true
    }

    // ==================== Serialization ====================

    /// Serialize to JSON. Coordinates appear as their canonical ids.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON produced by [`Board::to_json`].
    pub fn from_json(json: &str) -> serde_json::Result<Board> {
        serde_json::from_str(json)
    }
}
