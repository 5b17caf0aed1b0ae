//! Autocomplete handlers for Discord slash command parameters.
//!
//! Period arguments suggest the current month and the months before it, most recent
//! first, so settling last month is one keystroke away.

use crate::{bot::BotData, core::period::Period, errors::Error};

/// Number of months offered, the current one included.
const SUGGESTED_MONTHS: usize = 12;

/// Recent periods ending at `current`, newest first, filtered by `partial`.
#[must_use]
pub fn recent_periods(current: Period, partial: &str) -> Vec<String> {
    let partial = partial.trim();
    std::iter::successors(Some(current), |p| Some(p.previous()))
        .take(SUGGESTED_MONTHS)
        .map(|p| p.to_string())
        .filter(|p| p.contains(partial))
        .collect()
}

/// Provides autocomplete suggestions for `YYYY-MM` period arguments.
pub async fn autocomplete_period(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let current = Period::containing(chrono::Utc::now().date_naive());
    recent_periods(current, partial)
}
