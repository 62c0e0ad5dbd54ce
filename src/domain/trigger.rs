//! Edge-triggered threshold detector.
//!
//! Only a below-to-above crossing authorizes the external risk assessment.
//! Staying above, staying below, and falling back below all reuse the local
//! placeholder assessment.

use serde::{Deserialize, Serialize};

/// Cross-cycle memory needed for edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdState {
    /// Whether the previous cycle's spread was at or above the trigger.
    pub was_above_threshold: bool,
}

/// Transition observed by one evaluation of the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Below to above: the only transition that fires the assessor.
    Crossed,
    /// Above to above.
    Sustained,
    /// Above to below.
    Cleared,
    /// Below to below.
    Quiet,
}

impl Transition {
    /// True when this transition authorizes calling the external assessor.
    #[must_use]
    pub const fn fires(self) -> bool {
        matches!(self, Self::Crossed)
    }
}

/// Two-state edge detector over spread basis points.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTrigger {
    trigger_bps: i64,
}

impl ThresholdTrigger {
    /// Trigger firing at `trigger_bps` and above.
    #[must_use]
    pub const fn new(trigger_bps: i64) -> Self {
        Self { trigger_bps }
    }

    /// Threshold in basis points.
    #[must_use]
    pub const fn trigger_bps(&self) -> i64 {
        self.trigger_bps
    }

    /// Whether a spread sits at or above the trigger.
    #[must_use]
    pub const fn is_above(&self, spread_bps: i64) -> bool {
        spread_bps >= self.trigger_bps
    }

    /// Classify the transition from the previous state without mutating it.
    #[must_use]
    pub const fn classify(&self, state: ThresholdState, spread_bps: i64) -> Transition {
        match (state.was_above_threshold, self.is_above(spread_bps)) {
            (false, true) => Transition::Crossed,
            (true, true) => Transition::Sustained,
            (true, false) => Transition::Cleared,
            (false, false) => Transition::Quiet,
        }
    }

    /// Classify against the previous state, then record this cycle's side.
    ///
    /// The state is always updated, after the transition has been decided.
    pub fn observe(&self, state: &mut ThresholdState, spread_bps: i64) -> Transition {
        let transition = self.classify(*state, spread_bps);
        state.was_above_threshold = self.is_above(spread_bps);
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_on_new_crossings() {
        let trigger = ThresholdTrigger::new(800);
        let mut state = ThresholdState::default();
        let sequence = [50, 850, 900, 40, 860];

        let fired: Vec<usize> = sequence
            .iter()
            .enumerate()
            .filter(|(_, bps)| trigger.observe(&mut state, **bps).fires())
            .map(|(i, _)| i)
            .collect();

        assert_eq!(fired, vec![1, 4]);
    }

    #[test]
    fn sequence_transitions_are_classified() {
        let trigger = ThresholdTrigger::new(800);
        let mut state = ThresholdState::default();
        let transitions: Vec<Transition> = [50, 850, 900, 40, 860]
            .iter()
            .map(|bps| trigger.observe(&mut state, *bps))
            .collect();

        assert_eq!(
            transitions,
            vec![
                Transition::Quiet,
                Transition::Crossed,
                Transition::Sustained,
                Transition::Cleared,
                Transition::Crossed,
            ]
        );
        assert!(state.was_above_threshold);
    }

    #[test]
    fn exactly_at_trigger_counts_as_above() {
        let trigger = ThresholdTrigger::new(500);
        assert_eq!(
            trigger.classify(ThresholdState::default(), 500),
            Transition::Crossed
        );
    }

    #[test]
    fn classify_does_not_mutate() {
        let trigger = ThresholdTrigger::new(500);
        let state = ThresholdState::default();
        let _ = trigger.classify(state, 900);
        assert!(!state.was_above_threshold);
    }
}
