use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Consumable gameplay modifiers. Each kind starts a run with 3 charges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Instant: opens every safe cell within Chebyshev distance 2 of the
    /// target. Never observed active.
    RevealArea,
    /// Pins the elapsed timer to its activation value for 5 seconds.
    TimeFreeze,
    /// Suppresses mine-triggered losses for 10 seconds.
    SafetyNet,
}

impl PowerUpKind {
    pub const ALL: [Self; 3] = [Self::RevealArea, Self::TimeFreeze, Self::SafetyNet];

    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::RevealArea => None,
            Self::TimeFreeze => Some(Duration::from_secs(5)),
            Self::SafetyNet => Some(Duration::from_secs(10)),
        }
    }

    pub const fn save_key(self) -> &'static str {
        match self {
            Self::RevealArea => "reveal",
            Self::TimeFreeze => "freeze",
            Self::SafetyNet => "safety",
        }
    }

    pub fn from_save_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.save_key() == key)
    }

    const fn index(self) -> usize {
        match self {
            Self::RevealArea => 0,
            Self::TimeFreeze => 1,
            Self::SafetyNet => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActivateOutcome {
    Activated,
    /// The kind is already running; no charge is consumed.
    AlreadyActive,
    /// No charges left; nothing changes, charges never go negative.
    NoCharges,
}

/// Shared per-kind record of the tagged-variant design: one lifecycle shape
/// for all kinds, dispatching on `kind` where behavior differs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpState {
    kind: PowerUpKind,
    active: bool,
    activated_at: Option<Duration>,
    /// Elapsed play time captured at activation; TimeFreeze only.
    pinned_elapsed: Option<Duration>,
}

impl PowerUpState {
    const fn new(kind: PowerUpKind) -> Self {
        Self {
            kind,
            active: false,
            activated_at: None,
            pinned_elapsed: None,
        }
    }

    fn clear(&mut self) {
        self.active = false;
        self.activated_at = None;
        self.pinned_elapsed = None;
    }
}

pub const INITIAL_CHARGES: u8 = 3;

/// The full power-up rack: one state and one charge counter per kind.
/// Charges persist across board resets; active flags do not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUps {
    states: [PowerUpState; 3],
    charges: [u8; 3],
}

impl Default for PowerUps {
    fn default() -> Self {
        Self {
            states: [
                PowerUpState::new(PowerUpKind::RevealArea),
                PowerUpState::new(PowerUpKind::TimeFreeze),
                PowerUpState::new(PowerUpKind::SafetyNet),
            ],
            charges: [INITIAL_CHARGES; 3],
        }
    }
}

impl PowerUps {
    pub fn charges(&self, kind: PowerUpKind) -> u8 {
        self.charges[kind.index()]
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.states[kind.index()].active
    }

    /// Elapsed value the timer is pinned to while TimeFreeze runs.
    pub fn pinned_elapsed(&self) -> Option<Duration> {
        let state = &self.states[PowerUpKind::TimeFreeze.index()];
        if state.active { state.pinned_elapsed } else { None }
    }

    /// Whether mine hits are currently suppressed. Scoped to SafetyNet
    /// alone; see DESIGN.md for the divergence from the reference behavior.
    pub fn shield_active(&self) -> bool {
        self.is_active(PowerUpKind::SafetyNet)
    }

    /// Consumes one charge and starts the effect. `elapsed` is the play
    /// time at activation, captured by TimeFreeze as its pin value.
    pub fn activate(
        &mut self,
        kind: PowerUpKind,
        now: Duration,
        elapsed: Duration,
    ) -> ActivateOutcome {
        let index = kind.index();
        if self.states[index].active {
            return ActivateOutcome::AlreadyActive;
        }
        if self.charges[index] == 0 {
            log::debug!("{kind:?} activation ignored, no charges left");
            return ActivateOutcome::NoCharges;
        }

        self.charges[index] -= 1;
        if kind.duration().is_some() {
            let state = &mut self.states[index];
            state.active = true;
            state.activated_at = Some(now);
            state.pinned_elapsed = (kind == PowerUpKind::TimeFreeze).then_some(elapsed);
        }
        log::debug!(
            "{kind:?} activated, {} charges left",
            self.charges[index]
        );
        ActivateOutcome::Activated
    }

    /// Per-tick poll expiring timed effects. Expiry is strict: an effect
    /// activated at `t` with duration `d` still runs at `t + d`.
    pub fn update(&mut self, now: Duration) {
        for state in &mut self.states {
            let Some(duration) = state.kind.duration() else {
                continue;
            };
            let activated_at = match (state.active, state.activated_at) {
                (true, Some(at)) => at,
                _ => continue,
            };
            if now.saturating_sub(activated_at) > duration {
                log::debug!("{:?} expired", state.kind);
                state.clear();
            }
        }
    }

    /// Session reset: running effects stop, charges are kept.
    pub fn reset_actives(&mut self) {
        for state in &mut self.states {
            state.clear();
        }
    }

    pub(crate) fn set_charges(&mut self, kind: PowerUpKind, charges: u8) {
        self.charges[kind.index()] = charges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn activation_consumes_exactly_one_charge() {
        let mut rack = PowerUps::default();
        let outcome = rack.activate(PowerUpKind::SafetyNet, secs(1), secs(0));

        assert_eq!(outcome, ActivateOutcome::Activated);
        assert_eq!(rack.charges(PowerUpKind::SafetyNet), 2);
        assert!(rack.shield_active());
    }

    #[test]
    fn zero_charges_is_a_silent_noop() {
        let mut rack = PowerUps::default();
        rack.set_charges(PowerUpKind::TimeFreeze, 0);

        let before = rack.clone();
        let outcome = rack.activate(PowerUpKind::TimeFreeze, secs(1), secs(0));

        assert_eq!(outcome, ActivateOutcome::NoCharges);
        assert_eq!(rack, before);
    }

    #[test]
    fn double_activation_does_not_burn_a_second_charge() {
        let mut rack = PowerUps::default();
        rack.activate(PowerUpKind::SafetyNet, secs(0), secs(0));
        let outcome = rack.activate(PowerUpKind::SafetyNet, secs(2), secs(0));

        assert_eq!(outcome, ActivateOutcome::AlreadyActive);
        assert_eq!(rack.charges(PowerUpKind::SafetyNet), 2);
    }

    #[test]
    fn reveal_area_is_never_observed_active() {
        let mut rack = PowerUps::default();
        rack.activate(PowerUpKind::RevealArea, secs(0), secs(0));

        assert!(!rack.is_active(PowerUpKind::RevealArea));
        assert_eq!(rack.charges(PowerUpKind::RevealArea), 2);
    }

    #[test]
    fn expiry_is_strict_on_the_duration_boundary() {
        let mut rack = PowerUps::default();
        rack.activate(PowerUpKind::TimeFreeze, secs(3), secs(2));

        rack.update(secs(8));
        assert!(rack.is_active(PowerUpKind::TimeFreeze));
        assert_eq!(rack.pinned_elapsed(), Some(secs(2)));

        rack.update(Duration::from_millis(8001));
        assert!(!rack.is_active(PowerUpKind::TimeFreeze));
        assert_eq!(rack.pinned_elapsed(), None);
    }

    #[test]
    fn multiple_kinds_run_simultaneously() {
        let mut rack = PowerUps::default();
        rack.activate(PowerUpKind::TimeFreeze, secs(0), secs(0));
        rack.activate(PowerUpKind::SafetyNet, secs(1), secs(1));

        rack.update(secs(4));
        assert!(rack.is_active(PowerUpKind::TimeFreeze));
        assert!(rack.is_active(PowerUpKind::SafetyNet));

        // freeze lapses first, the shield outlives it
        rack.update(secs(6));
        assert!(!rack.is_active(PowerUpKind::TimeFreeze));
        assert!(rack.shield_active());
    }

    #[test]
    fn reset_clears_actives_but_keeps_charges() {
        let mut rack = PowerUps::default();
        rack.activate(PowerUpKind::SafetyNet, secs(0), secs(0));
        rack.reset_actives();

        assert!(!rack.shield_active());
        assert_eq!(rack.charges(PowerUpKind::SafetyNet), 2);
    }
}
