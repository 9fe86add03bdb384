//! Metric column descriptors and row field access.
//!
//! Each report kind carries a static table of [`MetricColumn`]s describing
//! which fields are shown, how they are labelled and how they aggregate.
//! Summaries, chart series and CSV export are all driven off these tables so
//! a field is never summed in one place and averaged in another.

use chrono::NaiveDate;

use crate::models::{ContentHealth, PlatformStats, VideoHealth};
use crate::query::ReportKind;

/// A single value pulled out of a report row by field key.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view of the value. Text fields contribute zero.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Text(_) => 0.0,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// How a column folds across a set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Mean,
}

/// A displayable report column.
#[derive(Debug, Clone, Copy)]
pub struct MetricColumn {
    /// Field key understood by [`ReportRow::field`].
    pub key: &'static str,
    /// Human-readable column header.
    pub label: &'static str,
    /// How the column aggregates in summaries. `None` for identity columns
    /// like the date, which are excluded from summaries.
    pub aggregate: Option<Aggregation>,
}

const fn sum(key: &'static str, label: &'static str) -> MetricColumn {
    MetricColumn {
        key,
        label,
        aggregate: Some(Aggregation::Sum),
    }
}

const fn mean(key: &'static str, label: &'static str) -> MetricColumn {
    MetricColumn {
        key,
        label,
        aggregate: Some(Aggregation::Mean),
    }
}

const DATE: MetricColumn = MetricColumn {
    key: "date",
    label: "Date",
    aggregate: None,
};

static PLATFORM_COLUMNS: [MetricColumn; 7] = [
    DATE,
    sum("totalRequests", "Total Requests"),
    sum("multiImpression", "Multi Impression"),
    mean("bidRate", "Bid Rate"),
    mean("timeoutRate", "Timeout Rate"),
    sum("deals", "Deals"),
    sum("invalidRequests", "Invalid Requests"),
];

static CONTENT_COLUMNS: [MetricColumn; 9] = [
    DATE,
    sum("totalRequests", "Total Requests"),
    sum("title", "Title"),
    sum("series", "Series"),
    sum("episode", "Episode"),
    sum("genre", "Genre"),
    sum("language", "Language"),
    sum("length", "Length"),
    sum("livestream", "Livestream"),
];

static VIDEO_COLUMNS: [MetricColumn; 9] = [
    DATE,
    mean("percentCtv", "CTV %"),
    sum("placement", "Placement"),
    sum("protocols", "Protocols"),
    sum("linearity", "Linearity"),
    sum("skip", "Skip"),
    sum("startDelay", "Start Delay"),
    sum("minDuration", "Min Duration"),
    sum("maxDuration", "Max Duration"),
];

/// The display columns for a report kind, in table order.
pub fn table_columns(kind: ReportKind) -> &'static [MetricColumn] {
    match kind {
        ReportKind::Platform => &PLATFORM_COLUMNS,
        ReportKind::Content => &CONTENT_COLUMNS,
        ReportKind::Video => &VIDEO_COLUMNS,
    }
}

/// Field keys charted for a report kind, as (bar, line) series groups.
pub fn chart_keys(kind: ReportKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        ReportKind::Platform => (
            &["totalRequests", "multiImpression"],
            &["bidRate", "timeoutRate"],
        ),
        ReportKind::Content => (&["title", "series", "episode", "genre"], &[]),
        ReportKind::Video => (&["placement", "protocols", "skip", "linearity"], &[]),
    }
}

/// Row-level access shared by all report types.
pub trait ReportRow {
    /// The day the row aggregates.
    fn date(&self) -> NaiveDate;

    /// Look up a field by its column key. Returns `None` for unknown keys.
    fn field(&self, key: &str) -> Option<FieldValue>;
}

impl ReportRow for PlatformStats {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        Some(match key {
            "date" => FieldValue::Text(self.date.to_string()),
            "totalRequests" => FieldValue::Int(self.total_requests),
            "multiImpression" => FieldValue::Int(self.multi_impression),
            "bidRate" => FieldValue::Float(self.bid_rate),
            "timeoutRate" => FieldValue::Float(self.timeout_rate),
            "deals" => FieldValue::Int(self.deals),
            "invalidRequests" => FieldValue::Int(self.invalid_requests),
            _ => return None,
        })
    }
}

impl ReportRow for ContentHealth {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        Some(match key {
            "date" => FieldValue::Text(self.date.to_string()),
            "platform" => FieldValue::Text(self.platform.clone()),
            "totalRequests" => FieldValue::Int(self.total_requests),
            "title" => FieldValue::Int(self.title),
            "series" => FieldValue::Int(self.series),
            "episode" => FieldValue::Int(self.episode),
            "genre" => FieldValue::Int(self.genre),
            "language" => FieldValue::Int(self.language),
            "length" => FieldValue::Int(self.length),
            "livestream" => FieldValue::Int(self.livestream),
            _ => return None,
        })
    }
}

impl ReportRow for VideoHealth {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        Some(match key {
            "date" => FieldValue::Text(self.date.to_string()),
            "platform" => FieldValue::Text(self.platform.clone()),
            "percentCtv" => FieldValue::Float(self.percent_ctv),
            "placement" => FieldValue::Int(self.placement),
            "protocols" => FieldValue::Int(self.protocols),
            "linearity" => FieldValue::Int(self.linearity),
            "skip" => FieldValue::Int(self.skip),
            "startDelay" => FieldValue::Int(self.start_delay),
            "minDuration" => FieldValue::Int(self.min_duration),
            "maxDuration" => FieldValue::Int(self.max_duration),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_column_resolves_on_its_row_type() {
        let row = PlatformStats {
            date: "2026-03-01".parse().unwrap(),
            total_requests: 100,
            multi_impression: 5,
            big_guidance: 0,
            addressable: 0,
            compliance_strings: 0,
            deals: 3,
            tmax: 0,
            invalid_requests: 2,
            timeout_rate: 0.1,
            bid_rate: 0.8,
            created_at: chrono::Utc::now(),
        };
        for col in table_columns(ReportKind::Platform) {
            assert!(row.field(col.key).is_some(), "missing field {}", col.key);
        }
        assert!(row.field("nope").is_none());
    }

    #[test]
    fn rates_average_and_counters_sum() {
        let by_key = |key: &str| {
            table_columns(ReportKind::Platform)
                .iter()
                .find(|c| c.key == key)
                .unwrap()
                .aggregate
        };
        assert_eq!(by_key("bidRate"), Some(Aggregation::Mean));
        assert_eq!(by_key("timeoutRate"), Some(Aggregation::Mean));
        assert_eq!(by_key("totalRequests"), Some(Aggregation::Sum));
        assert_eq!(by_key("date"), None);
    }
}
