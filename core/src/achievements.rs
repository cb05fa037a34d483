use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::*;

/// How long a fresh unlock stays visible as a notification event.
pub const NOTICE_WINDOW: Duration = Duration::from_secs(3);

const SPEED_DEMON_LIMIT: Duration = Duration::from_secs(30);
const COMBO_MASTER_TARGET: u32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AchievementKind {
    FirstWin,
    SpeedDemon,
    ComboMaster,
    Perfectionist,
    ThemeExplorer,
    HardVictory,
}

impl AchievementKind {
    pub const ALL: [Self; 6] = [
        Self::FirstWin,
        Self::SpeedDemon,
        Self::ComboMaster,
        Self::Perfectionist,
        Self::ThemeExplorer,
        Self::HardVictory,
    ];

    pub const fn save_key(self) -> &'static str {
        match self {
            Self::FirstWin => "first_win",
            Self::SpeedDemon => "speed_demon",
            Self::ComboMaster => "combo_master",
            Self::Perfectionist => "perfectionist",
            Self::ThemeExplorer => "theme_explorer",
            Self::HardVictory => "hard_victory",
        }
    }

    pub fn from_save_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.save_key() == key)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::FirstWin => "First Victory",
            Self::SpeedDemon => "Speed Demon",
            Self::ComboMaster => "Combo Master",
            Self::Perfectionist => "Perfectionist",
            Self::ThemeExplorer => "Theme Explorer",
            Self::HardVictory => "Expert",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::FirstWin => "Win your first game",
            Self::SpeedDemon => "Win in under 30 seconds",
            Self::ComboMaster => "Get a 10x combo",
            Self::Perfectionist => "Win without misplacing any flags",
            Self::ThemeExplorer => "Try all themes",
            Self::HardVictory => "Win on hard difficulty",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::FirstWin => 0,
            Self::SpeedDemon => 1,
            Self::ComboMaster => 2,
            Self::Perfectionist => 3,
            Self::ThemeExplorer => 4,
            Self::HardVictory => 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    kind: AchievementKind,
    unlocked: bool,
    unlocked_at: Option<Duration>,
}

impl Achievement {
    const fn new(kind: AchievementKind) -> Self {
        Self {
            kind,
            unlocked: false,
            unlocked_at: None,
        }
    }

    pub const fn kind(&self) -> AchievementKind {
        self.kind
    }

    pub const fn unlocked(&self) -> bool {
        self.unlocked
    }

    pub const fn unlocked_at(&self) -> Option<Duration> {
        self.unlocked_at
    }
}

/// Unlock ledger evaluated once per tick against the session snapshot.
/// Unlocks are idempotent and never re-lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    entries: [Achievement; 6],
    recent: Vec<(AchievementKind, Duration)>,
}

impl Default for Achievements {
    fn default() -> Self {
        Self {
            entries: [
                Achievement::new(AchievementKind::FirstWin),
                Achievement::new(AchievementKind::SpeedDemon),
                Achievement::new(AchievementKind::ComboMaster),
                Achievement::new(AchievementKind::Perfectionist),
                Achievement::new(AchievementKind::ThemeExplorer),
                Achievement::new(AchievementKind::HardVictory),
            ],
            recent: Vec::new(),
        }
    }
}

impl Achievements {
    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    pub fn is_unlocked(&self, kind: AchievementKind) -> bool {
        self.entries[kind.index()].unlocked
    }

    pub fn get(&self, kind: AchievementKind) -> &Achievement {
        &self.entries[kind.index()]
    }

    /// Unlocks within the notice window, oldest first.
    pub fn recent_unlocks(&self, now: Duration) -> Vec<AchievementKind> {
        self.recent
            .iter()
            .filter(|&&(_, at)| now.saturating_sub(at) < NOTICE_WINDOW)
            .map(|&(kind, _)| kind)
            .collect()
    }

    /// Evaluates every predicate unconditionally; order never matters
    /// because each unlock is idempotent.
    pub fn check(&mut self, session: &GameSession, themes_visited: usize, now: Duration) {
        self.recent
            .retain(|&(_, at)| now.saturating_sub(at) < NOTICE_WINDOW);

        if session.phase() == GamePhase::Won {
            self.unlock(AchievementKind::FirstWin, now);
            if session.elapsed() < SPEED_DEMON_LIMIT {
                self.unlock(AchievementKind::SpeedDemon, now);
            }
            if session.difficulty() == Difficulty::Hard {
                self.unlock(AchievementKind::HardVictory, now);
            }
            if session.misplaced_flags().is_empty() {
                self.unlock(AchievementKind::Perfectionist, now);
            }
        }

        if session.combo().max() >= COMBO_MASTER_TARGET {
            self.unlock(AchievementKind::ComboMaster, now);
        }

        if themes_visited == THEME_COUNT {
            self.unlock(AchievementKind::ThemeExplorer, now);
        }
    }

    fn unlock(&mut self, kind: AchievementKind, now: Duration) {
        let entry = &mut self.entries[kind.index()];
        if entry.unlocked {
            return;
        }
        entry.unlocked = true;
        entry.unlocked_at = Some(now);
        self.recent.push((kind, now));
        log::info!("achievement unlocked: {}", kind.title());
    }

    /// Restores a persisted unlock without a timestamp or notification.
    pub(crate) fn hydrate_unlock(&mut self, kind: AchievementKind) {
        self.entries[kind.index()].unlocked = true;
    }
}
