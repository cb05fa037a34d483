use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::*;

/// Number of themes the frontend ships. Theme content is presentation
/// data; the engine only tracks the index and which ones were visited.
pub const THEME_COUNT: usize = 3;

/// Best completion time per difficulty; `None` until the first win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    best: [Option<Duration>; 3],
}

impl HighScores {
    pub fn best(&self, difficulty: Difficulty) -> Option<Duration> {
        self.best[difficulty.index()]
    }

    /// Min-update; returns whether `elapsed` set a new best.
    pub fn record(&mut self, difficulty: Difficulty, elapsed: Duration) -> bool {
        let slot = &mut self.best[difficulty.index()];
        if slot.is_none_or(|best| elapsed < best) {
            *slot = Some(elapsed);
            true
        } else {
            false
        }
    }

    pub(crate) fn set_best(&mut self, difficulty: Difficulty, elapsed: Duration) {
        self.best[difficulty.index()] = Some(elapsed);
    }
}

/// Top-level state machine: owns the clock, the session, and everything
/// that outlives a session. One logical frame is at most one input
/// operation followed by one `tick`. All inputs are infallible; anything
/// invalid degrades to a no-op.
pub struct GameController {
    clock: Box<dyn GameClock>,
    rng: SmallRng,
    difficulty: Difficulty,
    session: GameSession,
    power_ups: PowerUps,
    achievements: Achievements,
    high_scores: HighScores,
    theme: usize,
    themes_tried: BTreeSet<usize>,
}

impl GameController {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_parts(difficulty, Box::new(MonotonicClock::default()), rand::random())
    }

    /// Fully injected construction for tests and replays: a controlled
    /// clock and a master seed every placement seed derives from.
    pub fn with_parts(difficulty: Difficulty, clock: Box<dyn GameClock>, seed: u64) -> Self {
        Self {
            clock,
            rng: SmallRng::seed_from_u64(seed),
            difficulty,
            session: GameSession::new(difficulty),
            power_ups: PowerUps::default(),
            achievements: Achievements::default(),
            high_scores: HighScores::default(),
            theme: 0,
            themes_tried: BTreeSet::new(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn power_ups(&self) -> &PowerUps {
        &self.power_ups
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn theme(&self) -> usize {
        self.theme
    }

    pub fn reveal(&mut self, coords: Coord2) {
        if self.session.phase().is_terminal() || !self.session.board().in_bounds(coords) {
            return;
        }
        if self.session.board().tile_at(coords) == Tile::Flagged {
            return;
        }
        let now = self.clock.now();
        if self.ensure_started(coords, now).is_err() {
            return;
        }
        let shielded = self.power_ups.shield_active();
        let outcome = self.session.reveal(coords, now, shielded);
        self.after_outcome(outcome, now);
    }

    pub fn toggle_flag(&mut self, coords: Coord2) {
        if self.session.phase().is_terminal() {
            return;
        }
        self.session.toggle_flag(coords);
    }

    /// Chord-reveal; reports whether the flag count matched and the chord
    /// applied, regardless of whether any cell needed opening.
    pub fn chord(&mut self, coords: Coord2) -> bool {
        if self.session.phase().is_terminal() {
            return false;
        }
        let now = self.clock.now();
        let shielded = self.power_ups.shield_active();
        match self.session.chord(coords, now, shielded) {
            Some(outcome) => {
                self.after_outcome(outcome, now);
                true
            }
            None => false,
        }
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind, coords: Coord2) {
        if self.session.phase().is_terminal() {
            return;
        }
        if kind == PowerUpKind::RevealArea && !self.session.board().in_bounds(coords) {
            return;
        }
        let now = self.clock.now();
        let elapsed = self.session.elapsed();
        if self.power_ups.activate(kind, now, elapsed) == ActivateOutcome::Activated
            && kind == PowerUpKind::RevealArea
        {
            self.reveal_area(coords, now);
        }
    }

    pub fn reset(&mut self) {
        log::debug!("session reset on {:?}", self.difficulty);
        self.session = GameSession::new(self.difficulty);
        self.power_ups.reset_actives();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.reset();
    }

    /// Advances to the next theme and records the visit; returns the new
    /// index for the frontend.
    pub fn cycle_theme(&mut self) -> usize {
        self.theme = (self.theme + 1) % THEME_COUNT;
        self.themes_tried.insert(self.theme);
        self.theme
    }

    /// Once per frame: refresh elapsed time (honoring a TimeFreeze pin),
    /// expire power-ups, evaluate achievements.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if !self.session.phase().is_terminal() {
            let elapsed = self.current_elapsed(now);
            self.session.set_elapsed(elapsed);
        }
        self.power_ups.update(now);
        self.achievements
            .check(&self.session, self.themes_tried.len(), now);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            &self.session,
            &self.power_ups,
            &self.achievements,
            self.high_scores.best(self.difficulty),
            self.theme,
            self.clock.now(),
        )
    }

    /// Persistent state for the embedding layer to write out.
    pub fn save_data(&self) -> SaveData {
        let mut data = SaveData::default();
        for difficulty in Difficulty::ALL {
            if let Some(best) = self.high_scores.best(difficulty) {
                data.high_scores
                    .insert(difficulty.save_key().into(), best.as_secs_f64());
            }
        }
        for entry in self.achievements.iter() {
            data.achievements
                .insert(entry.kind().save_key().into(), entry.unlocked());
        }
        for kind in PowerUpKind::ALL {
            data.power_up_charges
                .insert(kind.save_key().into(), u32::from(self.power_ups.charges(kind)));
        }
        data.themes_tried = self.themes_tried.clone();
        data
    }

    /// Applies persisted state; unknown keys are ignored with a warning
    /// and hydrated unlocks never flash notifications.
    pub fn hydrate(&mut self, data: &SaveData) {
        for (key, &secs) in &data.high_scores {
            match Difficulty::from_save_key(key) {
                Some(difficulty) => match Duration::try_from_secs_f64(secs) {
                    Ok(best) => self.high_scores.set_best(difficulty, best),
                    Err(_) => log::warn!("ignoring invalid best time for {key}"),
                },
                None => log::warn!("ignoring best time for unknown difficulty {key}"),
            }
        }
        for (key, &unlocked) in &data.achievements {
            match AchievementKind::from_save_key(key) {
                Some(kind) => {
                    if unlocked {
                        self.achievements.hydrate_unlock(kind);
                    }
                }
                None => log::warn!("ignoring unknown achievement {key}"),
            }
        }
        for (key, &charges) in &data.power_up_charges {
            match PowerUpKind::from_save_key(key) {
                Some(kind) => {
                    let charges = charges.min(u32::from(u8::MAX)) as u8;
                    self.power_ups.set_charges(kind, charges);
                }
                None => log::warn!("ignoring charges for unknown power-up {key}"),
            }
        }
        for &index in &data.themes_tried {
            if index < THEME_COUNT {
                self.themes_tried.insert(index);
            } else {
                log::warn!("ignoring out-of-range theme index {index}");
            }
        }
    }

    /// Draws a fresh placement seed and runs the placer if the board is
    /// still empty; the action's target centers the exclusion zone.
    fn ensure_started(&mut self, first_click: Coord2, now: Duration) -> Result<()> {
        if self.session.is_placed() {
            return Ok(());
        }
        let seed = self.rng.r#gen();
        self.session.ensure_placed(seed, first_click, now)
    }

    fn reveal_area(&mut self, center: Coord2, now: Duration) {
        if self.ensure_started(center, now).is_err() {
            return;
        }
        let shielded = self.power_ups.shield_active();
        let mut merged = RevealOutcome::NoChange;
        for coords in AreaIter::covering(center, self.session.board().size(), 2) {
            // mines inside the blast zone are never auto-revealed
            if self.session.board().cell_at(coords).is_mine() {
                continue;
            }
            merged = merged | self.session.reveal(coords, now, shielded);
        }
        self.after_outcome(merged, now);
    }

    fn after_outcome(&mut self, outcome: RevealOutcome, now: Duration) {
        if outcome == RevealOutcome::Won {
            let elapsed = self.current_elapsed(now);
            self.session.set_elapsed(elapsed);
            if self.high_scores.record(self.difficulty, elapsed) {
                log::info!("new best time on {:?}: {:.2?}", self.difficulty, elapsed);
            }
        }
    }

    /// Wall-derived play time, overridden by an active TimeFreeze pin.
    fn current_elapsed(&self, now: Duration) -> Duration {
        self.power_ups.pinned_elapsed().unwrap_or_else(|| {
            self.session
                .started_at()
                .map(|started| now.saturating_sub(started))
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(seed: u64) -> (GameController, ManualClock) {
        let clock = ManualClock::new();
        let controller =
            GameController::with_parts(Difficulty::Easy, Box::new(clock.clone()), seed);
        (controller, clock)
    }

    fn mine_cells(board: &Board) -> Vec<Coord2> {
        cells_of(board, true)
    }

    fn safe_cells(board: &Board) -> Vec<Coord2> {
        cells_of(board, false)
    }

    fn cells_of(board: &Board, mined: bool) -> Vec<Coord2> {
        let mut cells = Vec::new();
        for x in 0..board.side() {
            for y in 0..board.side() {
                if board.cell_at((x, y)).is_mine() == mined {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    fn win(controller: &mut GameController) {
        let cells = safe_cells(controller.session().board());
        for coords in cells {
            controller.reveal(coords);
        }
        assert_eq!(controller.session().phase(), GamePhase::Won);
    }

    #[test]
    fn first_reveal_places_mines_outside_the_safe_zone() {
        let (mut controller, _clock) = controller(11);
        let first_click = (4, 4);

        controller.reveal(first_click);

        let board = controller.session().board();
        assert!(controller.session().is_placed());
        assert_eq!(board.mine_count(), Difficulty::Easy.config().mines);
        assert_eq!(board.tile_at(first_click), Tile::Revealed);
        for coords in mine_cells(board) {
            assert!(chebyshev(coords, first_click) > 1);
        }
    }

    #[test]
    fn revealing_a_flagged_cell_does_not_start_the_game() {
        let (mut controller, _clock) = controller(11);
        controller.toggle_flag((4, 4));
        controller.reveal((4, 4));

        assert!(!controller.session().is_placed());
        assert_eq!(controller.session().board().tile_at((4, 4)), Tile::Flagged);
    }

    #[test]
    fn terminal_phase_ignores_inputs_until_reset() {
        let (mut controller, _clock) = controller(11);
        controller.reveal((4, 4));
        let mine = mine_cells(controller.session().board())[0];
        controller.reveal(mine);
        assert_eq!(controller.session().phase(), GamePhase::Lost);

        let before = controller.session().clone();
        controller.reveal(safe_cells(before.board())[0]);
        controller.toggle_flag((0, 0));
        assert!(!controller.chord((4, 4)));
        controller.activate_power_up(PowerUpKind::SafetyNet, (0, 0));
        assert_eq!(controller.session(), &before);
        assert_eq!(controller.power_ups().charges(PowerUpKind::SafetyNet), 3);

        controller.reset();
        assert_eq!(controller.session().phase(), GamePhase::Playing);
        assert!(!controller.session().is_placed());
    }

    #[test]
    fn winning_records_the_high_score_and_first_win() {
        let (mut controller, clock) = controller(11);
        clock.set(Duration::from_secs(2));
        controller.reveal((4, 4));
        clock.set(Duration::from_secs(14));
        controller.tick();
        win(&mut controller);
        controller.tick();

        let best = controller.high_scores().best(Difficulty::Easy);
        assert_eq!(best, Some(Duration::from_secs(12)));
        assert!(controller.achievements().is_unlocked(AchievementKind::FirstWin));
        assert!(controller.achievements().is_unlocked(AchievementKind::SpeedDemon));
        assert_eq!(controller.snapshot().best_time, best);
    }

    #[test]
    fn slower_wins_keep_the_existing_best() {
        let (mut controller, clock) = controller(11);
        clock.set(Duration::from_secs(1));
        controller.reveal((4, 4));
        clock.set(Duration::from_secs(9));
        win(&mut controller);
        assert_eq!(
            controller.high_scores().best(Difficulty::Easy),
            Some(Duration::from_secs(8))
        );

        controller.reset();
        clock.set(Duration::from_secs(20));
        controller.reveal((4, 4));
        clock.set(Duration::from_secs(50));
        win(&mut controller);
        assert_eq!(
            controller.high_scores().best(Difficulty::Easy),
            Some(Duration::from_secs(8))
        );
    }

    #[test]
    fn safety_net_suppresses_a_mine_reveal() {
        let (mut controller, _clock) = controller(11);
        controller.reveal((4, 4));
        let mine = mine_cells(controller.session().board())[0];

        controller.activate_power_up(PowerUpKind::SafetyNet, mine);
        controller.reveal(mine);

        assert_eq!(controller.session().phase(), GamePhase::Playing);
        assert_eq!(controller.session().board().tile_at(mine), Tile::Hidden);
        assert_eq!(controller.power_ups().charges(PowerUpKind::SafetyNet), 2);
    }

    #[test]
    fn safety_net_expires_back_to_normal_losses() {
        let (mut controller, clock) = controller(11);
        controller.reveal((4, 4));
        let mine = mine_cells(controller.session().board())[0];

        controller.activate_power_up(PowerUpKind::SafetyNet, mine);
        clock.set(Duration::from_millis(10_001));
        controller.tick();
        controller.reveal(mine);

        assert_eq!(controller.session().phase(), GamePhase::Lost);
    }

    #[test]
    fn time_freeze_pins_elapsed_until_expiry() {
        let (mut controller, clock) = controller(11);
        clock.set(Duration::from_secs(1));
        controller.reveal((4, 4));
        clock.set(Duration::from_secs(3));
        controller.tick();
        assert_eq!(controller.session().elapsed(), Duration::from_secs(2));

        controller.activate_power_up(PowerUpKind::TimeFreeze, (0, 0));
        clock.set(Duration::from_secs(6));
        controller.tick();
        assert_eq!(controller.session().elapsed(), Duration::from_secs(2));

        // strict expiry: the tick that crosses t+5 still reads the pin,
        // the next one resumes wall-derived time
        clock.set(Duration::from_millis(8_500));
        controller.tick();
        assert_eq!(controller.session().elapsed(), Duration::from_secs(2));
        clock.set(Duration::from_secs(9));
        controller.tick();
        assert_eq!(controller.session().elapsed(), Duration::from_secs(8));
    }

    #[test]
    fn reveal_area_opens_safe_cells_and_starts_the_board() {
        let (mut controller, _clock) = controller(11);
        let center = (4, 4);

        controller.activate_power_up(PowerUpKind::RevealArea, center);

        let board = controller.session().board();
        assert!(controller.session().is_placed());
        assert_eq!(controller.power_ups().charges(PowerUpKind::RevealArea), 2);
        for coords in AreaIter::covering(center, board.size(), 2) {
            if board.cell_at(coords).is_mine() {
                assert_eq!(board.tile_at(coords), Tile::Hidden);
            } else {
                assert_eq!(board.tile_at(coords), Tile::Revealed);
            }
        }
    }

    #[test]
    fn reset_keeps_charges_and_clears_actives() {
        let (mut controller, _clock) = controller(11);
        controller.reveal((4, 4));
        controller.activate_power_up(PowerUpKind::SafetyNet, (0, 0));
        controller.cycle_theme();

        controller.reset();

        assert_eq!(controller.power_ups().charges(PowerUpKind::SafetyNet), 2);
        assert!(!controller.power_ups().shield_active());
        assert_eq!(controller.session().combo().current(), 0);
        assert_eq!(controller.theme(), 1);
        assert!(!controller.session().is_placed());
    }

    #[test]
    fn cycling_every_theme_unlocks_theme_explorer() {
        let (mut controller, _clock) = controller(11);
        assert_eq!(controller.cycle_theme(), 1);
        assert_eq!(controller.cycle_theme(), 2);
        assert_eq!(controller.cycle_theme(), 0);

        controller.tick();
        assert!(
            controller
                .achievements()
                .is_unlocked(AchievementKind::ThemeExplorer)
        );
    }

    #[test]
    fn hydration_restores_state_and_ignores_unknown_keys() {
        let (mut controller, _clock) = controller(11);
        let mut data = SaveData::default();
        data.high_scores.insert("EASY".into(), 12.25);
        data.high_scores.insert("NIGHTMARE".into(), 1.0);
        data.high_scores.insert("HARD".into(), f64::INFINITY);
        data.achievements.insert("first_win".into(), true);
        data.achievements.insert("moonwalk".into(), true);
        data.power_up_charges.insert("freeze".into(), 1);
        data.power_up_charges.insert("warp".into(), 9);
        data.themes_tried.extend([0, 1, 7]);

        controller.hydrate(&data);

        assert_eq!(
            controller.high_scores().best(Difficulty::Easy),
            Some(Duration::from_secs_f64(12.25))
        );
        assert_eq!(controller.high_scores().best(Difficulty::Hard), None);
        assert!(controller.achievements().is_unlocked(AchievementKind::FirstWin));
        assert_eq!(controller.power_ups().charges(PowerUpKind::TimeFreeze), 1);
        assert_eq!(controller.power_ups().charges(PowerUpKind::RevealArea), 3);
        assert!(controller.snapshot().notices.is_empty());
    }

    #[test]
    fn save_data_round_trips_through_hydration() {
        let (mut first, clock) = controller(11);
        clock.set(Duration::from_secs(1));
        first.reveal((4, 4));
        clock.set(Duration::from_secs(10));
        win(&mut first);
        first.tick();
        first.activate_power_up(PowerUpKind::SafetyNet, (0, 0));
        first.cycle_theme();
        let saved = first.save_data();

        let (mut second, _clock) = controller(99);
        second.hydrate(&saved);

        assert_eq!(second.save_data(), saved);
        assert_eq!(
            second.high_scores().best(Difficulty::Easy),
            first.high_scores().best(Difficulty::Easy)
        );
    }

    #[test]
    fn chord_on_an_untouched_board_reports_not_applicable() {
        let (mut controller, _clock) = controller(11);
        assert!(!controller.chord((4, 4)));
        assert!(!controller.session().is_placed());
    }
}
