use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::*;

/// Per-cell projection handed to the render layer. Mine positions only
/// appear in terminal phases; a mid-game snapshot cannot leak placement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileView {
    Hidden,
    Flag,
    Open(u8),
    /// An untriggered mine, shown after a loss.
    Mine,
    /// The mine that ended the game.
    Blast,
    /// A flag that sat on a safe cell, shown after a loss.
    WrongFlag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub charges: u8,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementView {
    pub kind: AchievementKind,
    pub unlocked: bool,
    pub unlocked_at: Option<Duration>,
}

/// Immutable per-frame view of everything the presentation layer needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub tiles: Array2<TileView>,
    pub mines_left: i32,
    pub elapsed: Duration,
    pub combo: u32,
    pub max_combo: u32,
    pub power_ups: [PowerUpView; 3],
    pub achievements: Vec<AchievementView>,
    /// Unlocks fresh enough to flash on screen, oldest first.
    pub notices: Vec<AchievementKind>,
    pub theme: usize,
    pub best_time: Option<Duration>,
}

impl Snapshot {
    pub(crate) fn capture(
        session: &GameSession,
        power_ups: &PowerUps,
        achievements: &Achievements,
        best_time: Option<Duration>,
        theme: usize,
        now: Duration,
    ) -> Self {
        Self {
            difficulty: session.difficulty(),
            phase: session.phase(),
            tiles: project(session),
            mines_left: session.mines_left(),
            elapsed: session.elapsed(),
            combo: session.combo().current(),
            max_combo: session.combo().max(),
            power_ups: PowerUpKind::ALL.map(|kind| PowerUpView {
                kind,
                charges: power_ups.charges(kind),
                active: power_ups.is_active(kind),
            }),
            achievements: achievements
                .iter()
                .map(|entry| AchievementView {
                    kind: entry.kind(),
                    unlocked: entry.unlocked(),
                    unlocked_at: entry.unlocked_at(),
                })
                .collect(),
            notices: achievements.recent_unlocks(now),
            theme,
            best_time,
        }
    }
}

fn project(session: &GameSession) -> Array2<TileView> {
    let board = session.board();
    let mut tiles = Array2::from_elem(board.size().to_nd_index(), TileView::Hidden);
    for x in 0..board.side() {
        for y in 0..board.side() {
            let coords = (x, y);
            tiles[coords.to_nd_index()] = match session.phase() {
                GamePhase::Playing => view_playing(board, coords),
                GamePhase::Won => view_won(board, coords),
                GamePhase::Lost => view_lost(board, session.exploded_at(), coords),
            };
        }
    }
    tiles
}

fn view_playing(board: &Board, coords: Coord2) -> TileView {
    match board.tile_at(coords) {
        Tile::Hidden => TileView::Hidden,
        Tile::Flagged => TileView::Flag,
        Tile::Revealed => open_view(board, coords),
    }
}

/// Won boards render the remaining mines auto-flagged.
fn view_won(board: &Board, coords: Coord2) -> TileView {
    match board.cell_at(coords) {
        Cell::Mine => TileView::Flag,
        Cell::Clear(count) => TileView::Open(count),
    }
}

fn view_lost(board: &Board, exploded_at: Option<Coord2>, coords: Coord2) -> TileView {
    match (board.cell_at(coords), board.tile_at(coords)) {
        (Cell::Mine, _) if Some(coords) == exploded_at => TileView::Blast,
        (Cell::Mine, Tile::Flagged) => TileView::Flag,
        (Cell::Mine, _) => TileView::Mine,
        (Cell::Clear(_), Tile::Flagged) => TileView::WrongFlag,
        (Cell::Clear(_), Tile::Revealed) => open_view(board, coords),
        (Cell::Clear(_), Tile::Hidden) => TileView::Hidden,
    }
}

fn open_view(board: &Board, coords: Coord2) -> TileView {
    match board.cell_at(coords) {
        Cell::Clear(count) => TileView::Open(count),
        // a revealed mine cannot exist; render it as a blast if it ever does
        Cell::Mine => TileView::Blast,
    }
}
