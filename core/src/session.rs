use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Won,
    Lost,
}

impl GamePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Playing
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    /// At least one cell was opened.
    Revealed,
    /// A mine hit was suppressed by an active SafetyNet.
    Shielded,
    Won,
    Exploded,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl core::ops::BitOr for RevealOutcome {
    type Output = RevealOutcome;

    /// Merge of per-cell outcomes; the terminal ones dominate, so a chord
    /// sweep reports the same result whatever order neighbors are visited.
    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Shielded, _) | (_, Shielded) => Shielded,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// One play-through: a board plus the timing and bookkeeping state that
/// lives and dies with it. Recreated wholesale on reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    difficulty: Difficulty,
    config: GameConfig,
    board: Board,
    placed: bool,
    started_at: Option<Duration>,
    elapsed: Duration,
    combo: ComboState,
    misplaced_flags: BTreeSet<Coord2>,
    exploded_at: Option<Coord2>,
    phase: GamePhase,
}

impl GameSession {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_config(difficulty, difficulty.config())
    }

    /// Session over an arbitrary configuration, for replays and benches.
    pub fn with_config(difficulty: Difficulty, config: GameConfig) -> Self {
        Self {
            difficulty,
            config,
            board: Board::new(config.side),
            placed: false,
            started_at: None,
            elapsed: Duration::ZERO,
            combo: ComboState::default(),
            misplaced_flags: BTreeSet::new(),
            exploded_at: None,
            phase: GamePhase::Playing,
        }
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    pub const fn is_placed(&self) -> bool {
        self.placed
    }

    pub const fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub const fn combo(&self) -> &ComboState {
        &self.combo
    }

    pub const fn exploded_at(&self) -> Option<Coord2> {
        self.exploded_at
    }

    pub const fn misplaced_flags(&self) -> &BTreeSet<Coord2> {
        &self.misplaced_flags
    }

    /// Outstanding-flag countdown: configured mines minus flags placed.
    /// Says nothing about where the mines actually are.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.board.mine_count()) - i32::from(self.board.flag_count())
    }

    /// Runs the seeded placer if the board is still empty. The first
    /// reveal-like action's target becomes the exclusion-zone center.
    pub fn ensure_placed(&mut self, seed: u64, first_click: Coord2, now: Duration) -> Result<()> {
        if self.phase.is_terminal() {
            return Err(GameError::AlreadyEnded);
        }
        if self.placed {
            return Ok(());
        }
        RandomMinePlacer::new(self.config, seed).place(&mut self.board, first_click)?;
        self.finish_placement(now);
        Ok(())
    }

    /// Places an explicit layout, for deterministic boards and replays.
    pub fn place_mines(&mut self, mines: &[Coord2], now: Duration) -> Result<()> {
        if self.phase.is_terminal() || self.placed {
            return Err(GameError::AlreadyEnded);
        }
        for &coords in mines {
            self.board.place_mine(coords)?;
        }
        self.finish_placement(now);
        Ok(())
    }

    fn finish_placement(&mut self, now: Duration) {
        self.placed = true;
        self.started_at = Some(now);
        // flags placed before the mines existed may have landed on cells
        // that just became mines; those are not misplaced
        self.misplaced_flags
            .retain(|&coords| !self.board.cell_at(coords).is_mine());
    }

    /// Opens one cell. Out-of-bounds, revealed, and flagged targets are a
    /// silent no-op. `shielded` suppresses a mine hit without opening it.
    pub fn reveal(&mut self, coords: Coord2, now: Duration, shielded: bool) -> RevealOutcome {
        if self.phase.is_terminal() {
            return RevealOutcome::NoChange;
        }
        let outcome = self.reveal_single(coords, now, shielded);
        self.apply_outcome(outcome);
        outcome
    }

    /// Reveals every unflagged hidden neighbor of a satisfied numbered cell.
    /// `None` when the cell is not applicable or its flag count does not
    /// match; that is a normal outcome, not an error.
    pub fn chord(
        &mut self,
        coords: Coord2,
        now: Duration,
        shielded: bool,
    ) -> Option<RevealOutcome> {
        if self.phase.is_terminal() || !self.board.in_bounds(coords) {
            return None;
        }
        if self.board.tile_at(coords) != Tile::Revealed {
            return None;
        }
        let Cell::Clear(count) = self.board.cell_at(coords) else {
            return None;
        };
        if count == 0 {
            return None;
        }

        let flagged: u8 = self
            .board
            .neighbors(coords)
            .filter(|&pos| self.board.tile_at(pos) == Tile::Flagged)
            .count() as u8;
        if flagged != count {
            return None;
        }

        let mut merged = RevealOutcome::NoChange;
        for pos in self.board.neighbors(coords) {
            merged = merged | self.reveal_single(pos, now, shielded);
        }
        self.apply_outcome(merged);
        Some(merged)
    }

    /// Flag toggle on any unrevealed cell, allowed before and after
    /// placement. Maintains the misplaced-flag set.
    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if self.phase.is_terminal() || !self.board.in_bounds(coords) {
            return MarkOutcome::NoChange;
        }

        match self.board.tile_at(coords) {
            Tile::Hidden => {
                self.board.set_flag(coords, true);
                if !self.board.cell_at(coords).is_mine() {
                    self.misplaced_flags.insert(coords);
                }
                MarkOutcome::Changed
            }
            Tile::Flagged => {
                self.board.set_flag(coords, false);
                self.misplaced_flags.remove(&coords);
                MarkOutcome::Changed
            }
            Tile::Revealed => MarkOutcome::NoChange,
        }
    }

    fn reveal_single(&mut self, coords: Coord2, now: Duration, shielded: bool) -> RevealOutcome {
        if !self.board.in_bounds(coords) || self.board.tile_at(coords) != Tile::Hidden {
            return RevealOutcome::NoChange;
        }

        match self.board.cell_at(coords) {
            Cell::Mine if shielded => {
                log::debug!("mine hit at {coords:?} shielded");
                RevealOutcome::Shielded
            }
            Cell::Mine => {
                self.exploded_at.get_or_insert(coords);
                RevealOutcome::Exploded
            }
            Cell::Clear(count) => {
                self.open_cell(coords, now);
                if count == 0 {
                    self.flood_fill(coords, now);
                }
                if self.board.unrevealed_count() == self.board.mine_count() {
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
        }
    }

    /// Iterative frontier walk over the connected zero region: marks cells
    /// visited before enqueuing so each is opened exactly once, bounding
    /// stack usage independent of region size.
    fn flood_fill(&mut self, origin: Coord2, now: Duration) {
        let mut visited = BTreeSet::from([origin]);
        let mut frontier = VecDeque::from([origin]);
        let mut opened: u32 = 0;

        while let Some(coords) = frontier.pop_front() {
            for pos in self.board.neighbors(coords) {
                if !visited.insert(pos) {
                    continue;
                }
                if self.board.tile_at(pos) != Tile::Hidden {
                    continue;
                }
                // a zero cell has no mine neighbors, so `pos` is clear
                let Cell::Clear(count) = self.board.cell_at(pos) else {
                    continue;
                };
                log::trace!("flood fill opens {pos:?}");
                self.open_cell(pos, now);
                opened += 1;
                if count == 0 {
                    frontier.push_back(pos);
                }
            }
        }
        log::debug!("flood fill from {origin:?} opened {opened} cells");
    }

    fn open_cell(&mut self, coords: Coord2, now: Duration) {
        self.board.mark_revealed(coords);
        self.combo.record(now);
    }

    fn apply_outcome(&mut self, outcome: RevealOutcome) {
        match outcome {
            RevealOutcome::Exploded => {
                log::debug!("mine triggered at {:?}, game lost", self.exploded_at);
                self.phase = GamePhase::Lost;
            }
            RevealOutcome::Won => {
                log::debug!("all safe cells open, game won");
                self.phase = GamePhase::Won;
            }
            _ => {}
        }
    }
}
