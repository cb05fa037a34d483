use rand::prelude::*;

use crate::*;

/// Strategy placing a full mine layout onto an empty board, honoring the
/// safe-first-click guarantee. Consumed by value; one placer per board.
pub trait MinePlacer {
    fn place(self, board: &mut Board, first_click: Coord2) -> Result<()>;
}

/// Uniform placement over every cell outside the first-click exclusion zone
/// (Chebyshev distance > 1), driven by an injected seed so layouts replay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomMinePlacer {
    config: GameConfig,
    seed: u64,
}

impl RandomMinePlacer {
    pub const fn new(config: GameConfig, seed: u64) -> Self {
        Self { config, seed }
    }
}

impl MinePlacer for RandomMinePlacer {
    fn place(self, board: &mut Board, first_click: Coord2) -> Result<()> {
        let mines = usize::from(self.config.mines);
        let side = board.side();
        let candidates: Vec<Coord2> = (0..side)
            .flat_map(|x| (0..side).map(move |y| (x, y)))
            .filter(|&coords| chebyshev(coords, first_click) > 1)
            .collect();

        // Unreachable for configs accepted by GameConfig::new, still checked.
        if candidates.len() < mines {
            log::warn!(
                "cannot place {} mines in {} candidate cells",
                mines,
                candidates.len()
            );
            return Err(GameError::InsufficientMineCapacity);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        for &coords in candidates.choose_multiple(&mut rng, mines) {
            board.place_mine(coords)?;
        }

        // double check mine count
        if board.mine_count() != self.config.mines {
            log::warn!(
                "placed mine count mismatch, actual: {}, requested: {}",
                board.mine_count(),
                self.config.mines
            );
        }
        log::debug!(
            "placed {} mines on a {}x{} board around {:?}",
            board.mine_count(),
            side,
            side,
            first_click
        );
        Ok(())
    }
}
