//! Completed-task performance report.

use crate::domain::UserId;
use crate::ports::CompletedTally;

/// Length of the reporting window, in days.
pub(super) const REPORT_WINDOW_DAYS: i64 = 30;

/// Per-user row of the performance report.
///
/// The display name is a placeholder synthesized from the user id; user
/// identity lives outside this crate and no lookup is performed.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    /// Owner of the completed tasks.
    pub user_id: UserId,
    /// Placeholder display name derived from the id.
    pub display_name: String,
    /// Tasks completed within the window.
    pub completed: u64,
    /// Completed tasks per day over the window, rounded to 2 decimals.
    pub daily_average: f64,
}

impl PerformanceRow {
    pub(super) fn from_tally(tally: CompletedTally) -> Self {
        Self {
            user_id: tally.owner,
            display_name: format!("Usuário {}", tally.owner),
            completed: tally.completed,
            daily_average: daily_average(tally.completed),
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "report averages operate on small task counts where float rounding is acceptable"
)]
fn daily_average(completed: u64) -> f64 {
    let raw = completed as f64 / REPORT_WINDOW_DAYS as f64;
    (raw * 100.0).round() / 100.0
}
