//! Cross-cycle engine memory for one asset.

use rust_decimal::Decimal;

use crate::domain::{SpreadHistory, ThresholdState};

/// The only state that survives between cycles.
///
/// Owned by the per-asset single-flight lock; nothing outside a running
/// cycle mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    history: SpreadHistory,
    threshold: ThresholdState,
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(crate::domain::spread::DEFAULT_HISTORY_WINDOW)
    }
}

impl EngineState {
    /// Empty state with a history of `history_window` samples.
    #[must_use]
    pub fn new(history_window: usize) -> Self {
        Self {
            history: SpreadHistory::with_capacity(history_window),
            threshold: ThresholdState::default(),
        }
    }

    /// Seed the history, e.g. from a previous run.
    #[must_use]
    pub fn with_history(mut self, values: &[Decimal]) -> Self {
        for value in values {
            self.history.push(*value);
        }
        self
    }

    /// Rolling spread history.
    #[must_use]
    pub const fn history(&self) -> &SpreadHistory {
        &self.history
    }

    /// Trigger state from the last data-bearing cycle.
    #[must_use]
    pub const fn threshold(&self) -> ThresholdState {
        self.threshold
    }

    pub(crate) fn history_mut(&mut self) -> &mut SpreadHistory {
        &mut self.history
    }

    pub(crate) fn threshold_mut(&mut self) -> &mut ThresholdState {
        &mut self.threshold
    }
}
