//! Helpers shared by command handlers.

use chrono::NaiveDate;

use adxview_core::RangePreset;

use crate::cli::RangeArgs;

/// Resolve the effective date range for a report command.
///
/// An explicit `--start`/`--end` pair wins; otherwise the `--range` preset
/// (default last7Days) is resolved against the local date.
pub fn resolve_range(args: &RangeArgs) -> (NaiveDate, NaiveDate) {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        return (start, end);
    }
    let today = chrono::Local::now().date_naive();
    let range = args.range.unwrap_or(RangePreset::Last7Days).resolve(today);
    (range.start, range.end)
}
