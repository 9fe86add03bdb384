//! Named date range presets for report queries.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use strum::{Display, EnumIter, EnumString};

/// An inclusive date range with a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: &'static str,
}

/// Relative date ranges resolved against a reference day.
///
/// Weeks run Sunday through Saturday. `ThisWeek` and `ThisMonth` may extend
/// past the reference day; the backend simply returns no rows for future
/// dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum RangePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisWeek,
    ThisMonth,
}

impl RangePreset {
    /// Resolve the preset against `today`.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        match self {
            Self::Today => DateRange {
                start: today,
                end: today,
                label: "Today",
            },
            Self::Yesterday => {
                let day = today - Days::new(1);
                DateRange {
                    start: day,
                    end: day,
                    label: "Yesterday",
                }
            }
            Self::Last7Days => DateRange {
                start: today - Days::new(7),
                end: today,
                label: "Last 7 days",
            },
            Self::Last30Days => DateRange {
                start: today - Days::new(30),
                end: today,
                label: "Last 30 days",
            },
            Self::ThisWeek => {
                let start = week_start(today);
                DateRange {
                    start,
                    end: start + Days::new(6),
                    label: "This week",
                }
            }
            Self::ThisMonth => DateRange {
                start: today.with_day(1).unwrap_or(today),
                end: month_end(today),
                label: "This month",
            },
        }
    }
}

/// Most recent Sunday on or before `day`.
fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = day.weekday().days_since(Weekday::Sun);
    day - Days::new(u64::from(offset))
}

/// Last day of the month containing `day`.
fn month_end(day: NaiveDate) -> NaiveDate {
    let next_month = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    };
    next_month.map_or(day, |d| d - Days::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    // 2026-03-11 is a Wednesday.
    const REF: &str = "2026-03-11";

    #[test]
    fn today_and_yesterday_are_single_days() {
        let today = RangePreset::Today.resolve(date(REF));
        assert_eq!(today.start, date("2026-03-11"));
        assert_eq!(today.end, date("2026-03-11"));

        let yesterday = RangePreset::Yesterday.resolve(date(REF));
        assert_eq!(yesterday.start, date("2026-03-10"));
        assert_eq!(yesterday.end, date("2026-03-10"));
    }

    #[test]
    fn rolling_windows_count_back_from_today() {
        let week = RangePreset::Last7Days.resolve(date(REF));
        assert_eq!(week.start, date("2026-03-04"));
        assert_eq!(week.end, date(REF));

        let month = RangePreset::Last30Days.resolve(date(REF));
        assert_eq!(month.start, date("2026-02-09"));
        assert_eq!(month.end, date(REF));
    }

    #[test]
    fn this_week_runs_sunday_through_saturday() {
        let week = RangePreset::ThisWeek.resolve(date(REF));
        assert_eq!(week.start, date("2026-03-08"));
        assert_eq!(week.end, date("2026-03-14"));

        // A Sunday is its own week start.
        let week = RangePreset::ThisWeek.resolve(date("2026-03-08"));
        assert_eq!(week.start, date("2026-03-08"));
    }

    #[test]
    fn this_month_covers_the_calendar_month() {
        let month = RangePreset::ThisMonth.resolve(date(REF));
        assert_eq!(month.start, date("2026-03-01"));
        assert_eq!(month.end, date("2026-03-31"));

        // February in a non-leap year.
        let feb = RangePreset::ThisMonth.resolve(date("2026-02-15"));
        assert_eq!(feb.end, date("2026-02-28"));

        // December rolls the year over.
        let dec = RangePreset::ThisMonth.resolve(date("2026-12-05"));
        assert_eq!(dec.end, date("2026-12-31"));
    }

    #[test]
    fn preset_names_parse_from_camel_case() {
        assert_eq!("last7Days".parse::<RangePreset>().unwrap(), RangePreset::Last7Days);
        assert_eq!("thisWeek".parse::<RangePreset>().unwrap(), RangePreset::ThisWeek);
        assert_eq!(RangePreset::Last30Days.to_string(), "last30Days");
    }
}
