//! Speculative build sequencing with rollback.
//!
//! A [`BuildSimulator`] wraps a private clone of the authoritative board and
//! drives it through the placement rules, so a whole multi-step build turn
//! (the initial settlement-plus-road pair, a multi-road grant) is validated
//! and staged locally before a single atomic commit. Nothing touches the
//! authoritative board until every step of the sequence has passed, so a
//! half-finished turn can never leak out.

use crate::board::{Board, BuildingLevel, PlayerId, Road, Settlement};
use crate::hex::{EdgeCoord, VertexCoord};
use crate::rules;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

/// What kind of build sequence the simulator enforces. Per-kind maxima are
/// supplied by the caller through the variant data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildMode {
    /// Exactly one settlement, then one road pinned to that settlement.
    InitialPlacement,
    /// Up to `limit` roads (a road-building grant).
    RoadOnly { limit: u32 },
    /// Up to `limit` settlements.
    SettlementOnly { limit: u32 },
    /// Up to `limit` city upgrades.
    CityOnly { limit: u32 },
}

/// The kind of a single build action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildKind {
    Settlement,
    Road,
    City,
}

/// One speculative placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildAction {
    Settlement(VertexCoord),
    Road(EdgeCoord),
    City(VertexCoord),
}

impl BuildAction {
    pub fn kind(&self) -> BuildKind {
        match self {
            BuildAction::Settlement(_) => BuildKind::Settlement,
            BuildAction::Road(_) => BuildKind::Road,
            BuildAction::City(_) => BuildKind::City,
        }
    }

    /// Canonical id of the target coordinate.
    pub fn id(&self) -> String {
        match self {
            BuildAction::Settlement(v) | BuildAction::City(v) => v.to_string(),
            BuildAction::Road(e) => e.to_string(),
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildAction::Settlement(v) => write!(f, "settlement at {v}"),
            BuildAction::Road(e) => write!(f, "road at {e}"),
            BuildAction::City(v) => write!(f, "city at {v}"),
        }
    }
}

/// The next legal step of a sequence: what to build and where it may go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Settlement(HashSet<VertexCoord>),
    Road(HashSet<EdgeCoord>),
    City(HashSet<VertexCoord>),
}

impl NextStep {
    pub fn kind(&self) -> BuildKind {
        match self {
            NextStep::Settlement(_) => BuildKind::Settlement,
            NextStep::Road(_) => BuildKind::Road,
            NextStep::City(_) => BuildKind::City,
        }
    }

    /// Number of legal spots in this step.
    pub fn len(&self) -> usize {
        match self {
            NextStep::Settlement(set) | NextStep::City(set) => set.len(),
            NextStep::Road(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the action matches this step's kind and staged spot set.
    pub fn allows(&self, action: &BuildAction) -> bool {
        match (self, action) {
            (NextStep::Settlement(set), BuildAction::Settlement(v)) => set.contains(v),
            (NextStep::Road(set), BuildAction::Road(e)) => set.contains(e),
            (NextStep::City(set), BuildAction::City(v)) => set.contains(v),
            _ => false,
        }
    }
}

/// Commit-time rejection: an action that was staged against the private
/// clone no longer holds up against the authoritative board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("{action} no longer passes validation against the authoritative board")]
    Rejected { action: BuildAction },
}

/// Rollback-capable sequencer for multi-step build turns.
#[derive(Debug, Clone)]
pub struct BuildSimulator {
    player: PlayerId,
    mode: BuildMode,
    board: Board,
    stack: Vec<BuildAction>,
    staged: Option<NextStep>,
}

impl BuildSimulator {
    /// Start a sequence for `player` against a private clone of `board`.
    pub fn new(board: &Board, player: PlayerId, mode: BuildMode) -> Self {
        Self {
            player,
            mode,
            board: board.clone(),
            stack: Vec::new(),
            staged: None,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// The speculative board, with every staged action applied.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The staged actions, oldest first.
    pub fn actions(&self) -> &[BuildAction] {
        &self.stack
    }

    /// Read-only top of the build stack.
    pub fn peek(&self) -> Option<&BuildAction> {
        self.stack.last()
    }

    /// How many actions of a kind are already staged.
    fn built(&self, kind: BuildKind) -> u32 {
        self.stack.iter().filter(|a| a.kind() == kind).count() as u32
    }

    fn limit(&self, kind: BuildKind) -> u32 {
        match (self.mode, kind) {
            (BuildMode::InitialPlacement, BuildKind::Settlement | BuildKind::Road) => 1,
            (BuildMode::InitialPlacement, BuildKind::City) => 0,
            (BuildMode::RoadOnly { limit }, BuildKind::Road) => limit,
            (BuildMode::RoadOnly { .. }, _) => 0,
            (BuildMode::SettlementOnly { limit }, BuildKind::Settlement) => limit,
            (BuildMode::SettlementOnly { .. }, _) => 0,
            (BuildMode::CityOnly { limit }, BuildKind::City) => limit,
            (BuildMode::CityOnly { .. }, _) => 0,
        }
    }

    /// Whether the required sequence has been fully staged.
    pub fn is_complete(&self) -> bool {
        match self.mode {
            BuildMode::InitialPlacement => self.stack.len() >= 2,
            BuildMode::RoadOnly { limit } => self.built(BuildKind::Road) >= limit,
            BuildMode::SettlementOnly { limit } => self.built(BuildKind::Settlement) >= limit,
            BuildMode::CityOnly { limit } => self.built(BuildKind::City) >= limit,
        }
    }

    /// Compute and stage the next legal step. `None` means the sequence is
    /// complete. Must be called before every [`BuildSimulator::build`]; the
    /// staged set is what `build` validates against.
    pub fn next_valid_spots(&mut self) -> Option<&NextStep> {
        self.staged = self.compute_next_step();
        self.staged.as_ref()
    }

    fn compute_next_step(&self) -> Option<NextStep> {
        if self.is_complete() {
            return None;
        }
        let step = match self.mode {
            BuildMode::InitialPlacement => match self.stack.as_slice() {
                // First settlement of the game: the connectivity clause is
                // waived, any open vertex that passes the distance rule goes.
                [] => NextStep::Settlement(rules::valid_settlement_spots(&self.board, None)),
                // The road pins to the settlement just placed, not to the
                // player's wider network.
                [BuildAction::Settlement(anchor)] => {
                    let spots = anchor
                        .touching_edges()
                        .into_iter()
                        .filter(|e| self.board.contains_edge(e) && self.board.road(e).is_none())
                        .collect();
                    NextStep::Road(spots)
                }
                _ => unreachable!("initial placement alternates settlement then road"),
            },
            BuildMode::RoadOnly { .. } => {
                NextStep::Road(rules::valid_road_spots(&self.board, self.player, None))
            }
            BuildMode::SettlementOnly { .. } => NextStep::Settlement(
                rules::valid_settlement_spots(&self.board, Some(self.player)),
            ),
            BuildMode::CityOnly { .. } => {
                NextStep::City(rules::valid_city_spots(&self.board, self.player))
            }
        };
        Some(step)
    }

    /// Stage one build action. Validates strictly against the spot set from
    /// the most recent [`BuildSimulator::next_valid_spots`] call; the set is
    /// never recomputed here, so a decision is only ever made against the
    /// data the caller saw.
    ///
    /// Returns false on a wrong action kind, a coordinate outside the staged
    /// set, or an exceeded per-kind limit; the private board and the stack
    /// are left untouched. Calling this without a staged step is a
    /// programmer error and panics.
    pub fn build(&mut self, action: BuildAction) -> bool {
        let staged = self
            .staged
            .as_ref()
            .expect("next_valid_spots must be computed before build");
        if !staged.allows(&action) {
            trace!(%action, "build rejected: outside the staged spot set");
            return false;
        }
        let kind = action.kind();
        if self.built(kind) >= self.limit(kind) {
            trace!(%action, "build rejected: per-kind limit reached");
            return false;
        }

        apply(&mut self.board, self.player, action);
        self.stack.push(action);
        self.staged = None;
        debug!(%action, depth = self.stack.len(), "staged build");
        true
    }

    /// Pop the most recent action and exactly reverse its board mutation.
    /// Returns false when there is nothing to roll back.
    pub fn rollback(&mut self) -> bool {
        let Some(action) = self.stack.pop() else {
            return false;
        };
        match action {
            BuildAction::Settlement(vertex) => {
                self.board.remove_settlement(&vertex);
            }
            BuildAction::Road(edge) => {
                self.board.remove_road(&edge);
            }
            BuildAction::City(vertex) => {
                let mut settlement = self
                    .board
                    .settlement(&vertex)
                    .expect("a rolled-back city upgrade must still be on the board")
                    .clone();
                settlement.level = BuildingLevel::Settlement;
                self.board.update_settlement(settlement);
            }
        }
        // Whatever was staged no longer reflects the board.
        self.staged = None;
        debug!(%action, depth = self.stack.len(), "rolled back");
        true
    }

    /// Apply the staged sequence to the authoritative board as one atomic
    /// step. Every action is independently re-validated with the rule
    /// predicates before anything is written; on rejection the authoritative
    /// board is untouched and the error names the offending action.
    pub fn commit(self, target: &mut Board) -> Result<Vec<BuildAction>, CommitError> {
        let mut preview = target.clone();
        let mut anchor: Option<VertexCoord> = None;

        for &action in &self.stack {
            let ok = match action {
                BuildAction::Settlement(vertex) => {
                    let owner = match self.mode {
                        BuildMode::InitialPlacement => None,
                        _ => Some(self.player),
                    };
                    let valid = rules::is_settlement_spot_valid(&preview, vertex, owner);
                    if valid {
                        anchor = Some(vertex);
                    }
                    valid
                }
                BuildAction::Road(edge) => match (self.mode, anchor) {
                    (BuildMode::InitialPlacement, Some(vertex)) => {
                        preview.contains_edge(&edge)
                            && preview.road(&edge).is_none()
                            && rules::is_road_connected_to_settlement(&preview, edge, vertex)
                    }
                    _ => rules::is_road_spot_valid(&preview, edge, self.player),
                },
                BuildAction::City(vertex) => preview
                    .settlement(&vertex)
                    .is_some_and(|s| s.owner == self.player && !s.is_city()),
            };
            if !ok {
                return Err(CommitError::Rejected { action });
            }
            apply(&mut preview, self.player, action);
        }

        *target = preview;
        debug!(
            player = self.player,
            actions = self.stack.len(),
            "committed build sequence"
        );
        Ok(self.stack)
    }
}

/// The one place a build action turns into board mutations; `build` and
/// `commit` both go through here so the speculative and committed boards
/// cannot drift.
fn apply(board: &mut Board, player: PlayerId, action: BuildAction) {
    match action {
        BuildAction::Settlement(vertex) => {
            board.update_settlement(Settlement::new(vertex, player));
        }
        BuildAction::Road(edge) => {
            board.update_road(Road::new(edge, player));
        }
        BuildAction::City(vertex) => {
            let mut settlement = board
                .settlement(&vertex)
                .expect("a staged city upgrade must target an existing settlement")
                .clone();
            settlement.level = BuildingLevel::City;
            board.update_settlement(settlement);
        }
    }
}
