//! Static activity table: a fixed event-log collection rendered once at
//! startup. Stateless apart from its mock input.

use crate::surface::{ActivityRow, Badge, Row, Surface};

pub const ACTIVITY_BODY_ID: &str = "activityBody";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub time: String,
    pub user: String,
    pub action: String,
    pub status: String,
}

impl ActivityRecord {
    pub fn new(
        time: impl Into<String>,
        user: impl Into<String>,
        action: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            user: user.into(),
            action: action.into(),
            status: status.into(),
        }
    }
}

/// The fixed mock collection shown on the overview panel.
pub fn activity_log() -> Vec<ActivityRecord> {
    vec![
        ActivityRecord::new("08:05", "Shikhar", "Logged in", "Success"),
        ActivityRecord::new("08:18", "Admin", "Updated pricing", "Pending"),
        ActivityRecord::new("09:02", "Priya", "Exported report", "Success"),
        ActivityRecord::new("09:10", "Aman", "Reset password", "Failed"),
        ActivityRecord::new("10:22", "Meera", "Invited user", "Success"),
    ]
}

/// Total mapping from status text to a visual class. Anything outside
/// {Success, Pending} falls through to the "bad" class; unknown statuses are
/// never an error.
pub fn badge_for_status(status: &str) -> Badge {
    match status {
        "Success" => Badge::Ok,
        "Pending" => Badge::Warn,
        _ => Badge::Bad,
    }
}

/// Pure row generation from a record collection.
pub fn activity_rows(records: &[ActivityRecord]) -> Vec<Row> {
    records
        .iter()
        .map(|record| {
            Row::Activity(ActivityRow {
                time: record.time.clone(),
                user: record.user.clone(),
                action: record.action.clone(),
                status: record.status.clone(),
                badge: badge_for_status(&record.status),
            })
        })
        .collect()
}

pub fn render_activity(records: &[ActivityRecord], surface: &mut dyn Surface) {
    surface.replace_rows(ACTIVITY_BODY_ID, activity_rows(records));
}
