use serde::{Deserialize, Serialize};

/// Fixed content of one grid cell, immutable once placement is done.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Mine,
    /// A safe cell carrying the count of mines in its 8-neighborhood.
    Clear(u8),
}

impl Cell {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Clear(0)
    }
}

/// Player-facing visibility of one cell. A single enum makes
/// `revealed ∩ flagged = ∅` structural.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Hidden,
    Revealed,
    Flagged,
}

impl Tile {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clear_and_hidden() {
        assert_eq!(Cell::default(), Cell::Clear(0));
        assert_eq!(Tile::default(), Tile::Hidden);
    }

    #[test]
    fn unrevealed_covers_hidden_and_flagged() {
        assert!(Tile::Hidden.is_unrevealed());
        assert!(Tile::Flagged.is_unrevealed());
        assert!(!Tile::Revealed.is_unrevealed());
    }
}
