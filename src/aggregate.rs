//! Turns probe results into ordered, timestamped report rows.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::models::{ProbeOutcome, Status, StatusRecord, Target};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub fn aggregate(pairs: Vec<(Target, ProbeOutcome)>) -> Vec<StatusRecord> {
    aggregate_with_clock(pairs, Local::now)
}

/// Orders rows by target kind, then by input position (camera suffix for
/// cameras). Each row is stamped when it is built.
pub fn aggregate_with_clock<F>(mut pairs: Vec<(Target, ProbeOutcome)>, now: F) -> Vec<StatusRecord>
where
    F: Fn() -> DateTime<Local>,
{
    pairs.sort_by_key(|(target, _)| (target.kind, target.sequence));

    pairs
        .into_iter()
        .map(|(target, outcome)| {
            if let Some(reason) = outcome.reason() {
                debug!(address = %target.id, errored = outcome.errored_out(), "offline: {}", reason);
            }
            let captured = now();
            StatusRecord {
                date: captured.format(DATE_FORMAT).to_string(),
                time: captured.format(TIME_FORMAT).to_string(),
                kind: target.kind,
                name: target.display_name,
                location: target.location,
                target: target.id,
                status: Status::from(&outcome),
            }
        })
        .collect()
}
