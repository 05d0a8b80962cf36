//! Frontier - core engine for a hex-grid settlement game.
//!
//! This crate provides the rules kernel of the game:
//! - Cube coordinates for tiles, vertices, and edges, with the canonical
//!   `"q,r,s"` id as the wire format
//! - The board: keyed collections of tiles, roads, settlements, and trading
//!   posts, plus the robber
//! - Seeded, deterministic board generation (pool shuffle plus spiral token
//!   walk)
//! - Pure placement rules for settlements, roads, and city upgrades
//! - A rollback-capable build simulator that stages a whole multi-step build
//!   turn before one atomic commit
//!
//! # Architecture
//!
//! Everything here is synchronous, single-threaded, and free of I/O. The
//! renderer, turn controller, and any transport layer are collaborators that
//! call in through the board accessors and the simulator; they never reach
//! into rule internals. Randomness is injected (`rand::Rng`), so a seed
//! reproduces a board exactly.
//!
//! # Modules
//!
//! - [`hex`]: coordinate classes and their algebra
//! - [`board`]: board state and accessors
//! - [`generator`]: seeded board generation
//! - [`rules`]: placement legality queries
//! - [`simulator`]: speculative build sequencing and commit

pub mod board;
pub mod generator;
pub mod hex;
pub mod rules;
pub mod simulator;

// Re-export commonly used types
pub use board::{
    Board, BuildingLevel, PlayerId, Resource, Road, Settlement, TerrainKind, Tile, TradingPost,
};
pub use generator::{generate, BoardConfig, GenerateError};
pub use hex::{CoordError, EdgeCoord, HexCoord, VertexCoord};
pub use simulator::{BuildAction, BuildKind, BuildMode, BuildSimulator, CommitError, NextStep};
