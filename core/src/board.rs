use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Validated (side, mine count) pair for a square board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub side: Coord,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(side: Coord, mines: CellCount) -> Self {
        Self { side, mines }
    }

    /// Rejects configurations that cannot satisfy the safe-first-click
    /// guarantee: the worst-case exclusion zone removes 9 candidate cells,
    /// so `mines + 9` must still fit the board.
    pub fn new(side: Coord, mines: CellCount) -> Result<Self> {
        if side == 0 {
            return Err(GameError::InvalidCoords);
        }
        if mines == 0 || mines.saturating_add(9) > square(side) {
            return Err(GameError::InsufficientMineCapacity);
        }
        Ok(Self::new_unchecked(side, mines))
    }

    pub const fn total_cells(&self) -> CellCount {
        square(self.side)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked(8, 10),
            Self::Medium => GameConfig::new_unchecked(15, 35),
            Self::Hard => GameConfig::new_unchecked(20, 80),
        }
    }

    pub const fn save_key(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
        }
    }

    pub fn from_save_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.save_key() == key)
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }
}

/// Square grid owning cell contents and per-cell visibility, plus the
/// counters derived from them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    contents: Array2<Cell>,
    tiles: Array2<Tile>,
    side: Coord,
    mine_count: CellCount,
    revealed_count: CellCount,
    flag_count: CellCount,
}

impl Board {
    /// Empty board: every cell `Clear(0)` and hidden, no mines yet.
    pub fn new(side: Coord) -> Self {
        let dim = (side, side).to_nd_index();
        Self {
            contents: Array2::default(dim),
            tiles: Array2::default(dim),
            side,
            mine_count: 0,
            revealed_count: 0,
            flag_count: 0,
        }
    }

    pub const fn side(&self) -> Coord {
        self.side
    }

    pub const fn size(&self) -> Coord2 {
        (self.side, self.side)
    }

    pub const fn in_bounds(&self, coords: Coord2) -> bool {
        coords.0 < self.side && coords.1 < self.side
    }

    fn validate(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell(&self, coords: Coord2) -> Result<Cell> {
        Ok(self.cell_at(self.validate(coords)?))
    }

    pub fn tile(&self, coords: Coord2) -> Result<Tile> {
        Ok(self.tile_at(self.validate(coords)?))
    }

    /// Unchecked lookup for hot paths that pre-validate bounds.
    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.contents[coords.to_nd_index()]
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.tiles[coords.to_nd_index()]
    }

    /// Turns a cell into a mine and bumps the count of every clear
    /// 8-neighbor. Placing on an existing mine is a no-op.
    pub fn place_mine(&mut self, coords: Coord2) -> Result<()> {
        let coords = self.validate(coords)?;
        if self.cell_at(coords).is_mine() {
            return Ok(());
        }

        self.contents[coords.to_nd_index()] = Cell::Mine;
        self.mine_count += 1;
        for neighbor in self.neighbors(coords) {
            if let Cell::Clear(count) = self.cell_at(neighbor) {
                self.contents[neighbor.to_nd_index()] = Cell::Clear(count + 1);
            }
        }
        Ok(())
    }

    /// Lazy, restartable walk over the up-to-8 in-bounds neighbors.
    pub fn neighbors(&self, coords: Coord2) -> AreaIter {
        AreaIter::around(coords, self.size(), 1)
    }

    pub const fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub const fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub const fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub const fn total_cells(&self) -> CellCount {
        square(self.side)
    }

    pub const fn unrevealed_count(&self) -> CellCount {
        self.total_cells() - self.revealed_count
    }

    pub(crate) fn mark_revealed(&mut self, coords: Coord2) {
        debug_assert_eq!(self.tile_at(coords), Tile::Hidden);
        self.tiles[coords.to_nd_index()] = Tile::Revealed;
        self.revealed_count += 1;
    }

    pub(crate) fn set_flag(&mut self, coords: Coord2, flagged: bool) {
        self.tiles[coords.to_nd_index()] = if flagged { Tile::Flagged } else { Tile::Hidden };
        if flagged {
            self.flag_count += 1;
        } else {
            self.flag_count -= 1;
        }
    }
}
