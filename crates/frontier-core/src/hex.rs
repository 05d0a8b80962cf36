//! Cube coordinates for the hex board: tiles, vertices, and edges.
//!
//! Every location on the board is an integer triplet `(q, r, s)`. Three
//! coordinate classes are told apart by arithmetic constraints:
//!
//! - [`HexCoord`] identifies a tile: `q + r + s == 0`
//! - [`VertexCoord`] identifies a corner where settlements are built:
//!   `|q + r + s| == 1`
//! - [`EdgeCoord`] identifies a border where roads are built: exactly two of
//!   `|q|, |r|, |s|` are odd
//!
//! The sign of a vertex's component sum is its *pole*; poles alternate around
//! every hex, and an edge is always the pointwise sum of a positive-pole and a
//! negative-pole vertex. Tiles, vertices, and edges are stored in separate
//! collections and never share a keyspace.
//!
//! The canonical id of any coordinate is the string `"q,r,s"`. Formatting and
//! parsing round-trip exactly, and the serde representation is that same
//! string, so boards serialize to id-keyed maps. Pixel projection is a
//! presentation concern and lives outside this crate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a coordinate id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// The id is not three comma-separated integers.
    #[error("malformed coordinate id `{0}`, expected `q,r,s`")]
    Malformed(String),
    /// The triplet parsed but fails the class constraint.
    #[error("coordinate ({q},{r},{s}) is not a valid {class} coordinate")]
    WrongClass {
        q: i32,
        r: i32,
        s: i32,
        class: &'static str,
    },
}

/// Corner offsets of a hex in rotational order. Index 0 sits at 30 degrees,
/// each following index steps 60 degrees counterclockwise. Offsets alternate
/// between positive and negative pole.
const VERTEX_OFFSETS: [(i32, i32, i32); 6] = [
    (1, 0, 0),
    (0, -1, 0),
    (0, 0, 1),
    (-1, 0, 0),
    (0, 1, 0),
    (0, 0, -1),
];

/// A tile position on the hex grid. Components always sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl HexCoord {
    /// The six neighbor directions in rotational order, starting east.
    pub const DIRECTIONS: [HexCoord; 6] = [
        HexCoord::new(1, 0, -1),
        HexCoord::new(1, -1, 0),
        HexCoord::new(0, -1, 1),
        HexCoord::new(-1, 0, 1),
        HexCoord::new(-1, 1, 0),
        HexCoord::new(0, 1, -1),
    ];

    /// Create a tile coordinate. Panics unless `q + r + s == 0`; passing a
    /// triplet of the wrong class is a programmer error.
    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        assert!(q + r + s == 0, "hex coordinate components must sum to zero");
        Self { q, r, s }
    }

    /// Create a tile coordinate, or `None` if the triplet is not tile-class.
    pub const fn try_new(q: i32, r: i32, s: i32) -> Option<Self> {
        if q + r + s == 0 {
            Some(Self { q, r, s })
        } else {
            None
        }
    }

    /// The center of the board.
    pub const fn origin() -> Self {
        Self { q: 0, r: 0, s: 0 }
    }

    pub const fn q(&self) -> i32 {
        self.q
    }

    pub const fn r(&self) -> i32 {
        self.r
    }

    pub const fn s(&self) -> i32 {
        self.s
    }

    /// Step `steps` times in the given direction.
    pub const fn offset(self, direction: HexCoord, steps: i32) -> Self {
        Self {
            q: self.q + direction.q * steps,
            r: self.r + direction.r * steps,
            s: self.s + direction.s * steps,
        }
    }

    /// The six neighboring tiles in rotational order.
    pub fn neighbors(self) -> [HexCoord; 6] {
        Self::DIRECTIONS.map(|d| self.offset(d, 1))
    }

    /// Distance to another tile in hex steps.
    pub fn distance_to(self, other: HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s - other.s).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The six corner vertices of this tile. Index 0 sits at 30 degrees and
    /// each following index steps 60 degrees; downstream projection code
    /// relies on this ordering.
    pub fn vertices(self) -> [VertexCoord; 6] {
        VERTEX_OFFSETS.map(|(dq, dr, ds)| VertexCoord::new(self.q + dq, self.r + dr, self.s + ds))
    }

    /// The six boundary edges of this tile, edge `i` joining vertices `i`
    /// and `i + 1`.
    pub fn edges(self) -> [EdgeCoord; 6] {
        let corners = self.vertices();
        std::array::from_fn(|i| EdgeCoord::between(corners[i], corners[(i + 1) % 6]))
    }
}

/// A corner position where three tiles meet. Components always sum to +1
/// or -1 (the vertex's pole).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl VertexCoord {
    /// Create a vertex coordinate. Panics unless `|q + r + s| == 1`; passing
    /// a triplet of the wrong class is a programmer error.
    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        let sum = q + r + s;
        assert!(
            sum == 1 || sum == -1,
            "vertex coordinate components must sum to +1 or -1"
        );
        Self { q, r, s }
    }

    /// Create a vertex coordinate, or `None` if the triplet is not
    /// vertex-class.
    pub const fn try_new(q: i32, r: i32, s: i32) -> Option<Self> {
        let sum = q + r + s;
        if sum == 1 || sum == -1 {
            Some(Self { q, r, s })
        } else {
            None
        }
    }

    pub const fn q(&self) -> i32 {
        self.q
    }

    pub const fn r(&self) -> i32 {
        self.r
    }

    pub const fn s(&self) -> i32 {
        self.s
    }

    /// The component sum, +1 or -1. Adjacent vertices always have opposite
    /// poles.
    pub const fn pole(&self) -> i32 {
        self.q + self.r + self.s
    }

    /// The three tile coordinates around this vertex. All three are always
    /// class-valid; at the board boundary some will not exist as tiles, so
    /// callers intersect with the board's tile set.
    pub fn adjacent_hexes(self) -> [HexCoord; 3] {
        let p = self.pole();
        [
            HexCoord::new(self.q - p, self.r, self.s),
            HexCoord::new(self.q, self.r - p, self.s),
            HexCoord::new(self.q, self.r, self.s - p),
        ]
    }

    /// The three vertices one edge away, each of opposite pole.
    pub fn adjacent_vertices(self) -> [VertexCoord; 3] {
        let p = self.pole();
        [
            VertexCoord::new(self.q - p, self.r - p, self.s),
            VertexCoord::new(self.q - p, self.r, self.s - p),
            VertexCoord::new(self.q, self.r - p, self.s - p),
        ]
    }

    /// The three edges incident to this vertex.
    pub fn touching_edges(self) -> [EdgeCoord; 3] {
        self.adjacent_vertices().map(|n| EdgeCoord::between(self, n))
    }
}

/// A border position between two tiles. Exactly two components are odd, and
/// the triplet is the pointwise sum of the edge's two endpoint vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeCoord {
    q: i32,
    r: i32,
    s: i32,
}

impl EdgeCoord {
    /// Create an edge coordinate. Panics unless exactly two of the components
    /// are odd; passing a triplet of the wrong class is a programmer error.
    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        assert!(
            (q & 1) + (r & 1) + (s & 1) == 2,
            "edge coordinate must have exactly two odd components"
        );
        Self { q, r, s }
    }

    /// Create an edge coordinate, or `None` if the triplet is not edge-class.
    pub const fn try_new(q: i32, r: i32, s: i32) -> Option<Self> {
        if (q & 1) + (r & 1) + (s & 1) == 2 {
            Some(Self { q, r, s })
        } else {
            None
        }
    }

    pub const fn q(&self) -> i32 {
        self.q
    }

    pub const fn r(&self) -> i32 {
        self.r
    }

    pub const fn s(&self) -> i32 {
        self.s
    }

    /// The edge joining two adjacent vertices: their pointwise sum. Panics if
    /// the vertices do not share an edge; that is a programmer error.
    pub fn between(a: VertexCoord, b: VertexCoord) -> EdgeCoord {
        assert!(
            a.adjacent_vertices().contains(&b),
            "vertices do not share an edge"
        );
        EdgeCoord::new(a.q + b.q, a.r + b.r, a.s + b.s)
    }

    /// Like [`EdgeCoord::between`] but returns `None` for non-adjacent
    /// vertices instead of panicking.
    pub fn try_between(a: VertexCoord, b: VertexCoord) -> Option<EdgeCoord> {
        if a.adjacent_vertices().contains(&b) {
            Some(EdgeCoord::new(a.q + b.q, a.r + b.r, a.s + b.s))
        } else {
            None
        }
    }

    /// The two endpoint vertices. The even component halves exactly; the two
    /// odd components round once up and once down.
    pub fn endpoints(self) -> [VertexCoord; 2] {
        let hi = |c: i32| (c + 1).div_euclid(2);
        let lo = |c: i32| c.div_euclid(2);
        [
            VertexCoord::new(hi(self.q), hi(self.r), hi(self.s)),
            VertexCoord::new(lo(self.q), lo(self.r), lo(self.s)),
        ]
    }
}

/// Wire format shared by all coordinate classes: the canonical id `"q,r,s"`.
/// `Display`/`FromStr` round-trip exactly, and serde reuses them so the id is
/// also the serialized form (including as JSON map keys).
macro_rules! coord_wire_format {
    ($ty:ident, $class:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{},{},{}", self.q, self.r, self.s)
            }
        }

        impl FromStr for $ty {
            type Err = CoordError;

            fn from_str(text: &str) -> Result<Self, CoordError> {
                let components: Vec<i32> = text
                    .split(',')
                    .map(|part| part.trim().parse())
                    .collect::<Result<_, _>>()
                    .map_err(|_| CoordError::Malformed(text.to_string()))?;
                let &[q, r, s] = components.as_slice() else {
                    return Err(CoordError::Malformed(text.to_string()));
                };
                $ty::try_new(q, r, s).ok_or(CoordError::WrongClass {
                    q,
                    r,
                    s,
                    class: $class,
                })
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let id = String::deserialize(deserializer)?;
                id.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

coord_wire_format!(HexCoord, "hex");
coord_wire_format!(VertexCoord, "vertex");
coord_wire_format!(EdgeCoord, "edge");
