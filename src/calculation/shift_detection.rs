//! Shift detection.
//!
//! Chooses between a day plan and its alternative shift candidates based on
//! when the employee actually arrived and left.

use crate::models::{DayPlanConfig, MINUTES_PER_DAY, ShiftCandidate, TimeWindow};

/// The result of shift detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDetection<'a> {
    /// No alternatives, or nothing booked: the default plan applies.
    NotRequired,
    /// A candidate matched; its plan applies.
    Detected {
        /// Position of the candidate in the alternatives list.
        index: usize,
        /// The matching candidate.
        candidate: &'a ShiftCandidate,
    },
    /// No candidate matched; the default plan applies and the day is flagged.
    NotDetected,
}

impl<'a> ShiftDetection<'a> {
    /// Returns the plan to apply given the `default` plan.
    pub fn plan(&self, default: &'a DayPlanConfig) -> &'a DayPlanConfig {
        match self {
            ShiftDetection::Detected { candidate, .. } => &candidate.plan,
            ShiftDetection::NotRequired | ShiftDetection::NotDetected => default,
        }
    }
}

fn window_matches(window: Option<&TimeWindow>, minutes: Option<i32>) -> bool {
    match (window, minutes) {
        (None, _) => true,
        (Some(window), Some(minutes)) => window.contains(minutes),
        (Some(_), None) => false,
    }
}

/// Detects which shift candidate applies to the day.
///
/// # Arguments
///
/// * `first_come` - The day's first arrival as a clock time
/// * `last_go` - The day's last departure as a clock time
/// * `candidates` - The alternatives configured on the default plan
///
/// # Behavior
///
/// - No candidates, or neither time known: [`ShiftDetection::NotRequired`]
/// - A candidate matches when its arrival window contains `first_come` and
///   its departure window contains `last_go`; an absent window matches
///   anything
/// - Several matches: the narrowest arrival window wins, then list order
/// - No match: [`ShiftDetection::NotDetected`]
///
/// # Example
///
/// ```
/// use zmi_engine::calculation::{detect_shift, ShiftDetection};
/// use zmi_engine::models::{DayPlanConfig, ShiftCandidate, TimeWindow};
///
/// let late = ShiftCandidate {
///     arrival: Some(TimeWindow::new(780, 900)),
///     departure: None,
///     plan: DayPlanConfig::fixed("LATE", 840, 1320, 480),
/// };
/// let candidates = vec![late];
///
/// let detection = detect_shift(Some(835), Some(1325), &candidates);
/// assert!(matches!(detection, ShiftDetection::Detected { index: 0, .. }));
/// ```
pub fn detect_shift(
    first_come: Option<i32>,
    last_go: Option<i32>,
    candidates: &[ShiftCandidate],
) -> ShiftDetection<'_> {
    if candidates.is_empty() || (first_come.is_none() && last_go.is_none()) {
        return ShiftDetection::NotRequired;
    }

    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| {
            window_matches(candidate.arrival.as_ref(), first_come)
                && window_matches(candidate.departure.as_ref(), last_go)
        })
        // min_by_key keeps the first of equal keys
        .min_by_key(|(_, candidate)| {
            candidate
                .arrival
                .map_or(MINUTES_PER_DAY, |window| window.width())
        })
        .map_or(ShiftDetection::NotDetected, |(index, candidate)| {
            ShiftDetection::Detected { index, candidate }
        })
}
