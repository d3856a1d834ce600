//! Opening-hours filter.

use drange_core::{Candidate, EligibilityMap};

/// Whether a restaurant with the `[open, close)` window is open at `now`.
///
/// All three values are `HHMM` integers. A window with `open > close`
/// wraps past midnight. `open == close` is an empty window.
#[must_use]
pub fn is_open(open: u16, close: u16, now: u16) -> bool {
    if open <= close {
        open <= now && now < close
    } else {
        now >= open || now < close
    }
}

/// Keeps the candidates that are open at `now`.
///
/// Candidates without a schedule are dropped. Survivors take the radius of
/// their schedule. Input order is preserved.
#[must_use]
pub fn filter_open(candidates: Vec<Candidate>, schedules: &EligibilityMap, now: u16) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter_map(|mut candidate| {
            let schedule = schedules.get(&candidate.id)?;
            if !is_open(schedule.open, schedule.close, now) {
                return None;
            }
            candidate.radius = schedule.radius;
            Some(candidate)
        })
        .collect()
}
